//! Action-Plan View
//!
//! Concrete next steps derived from the forecast and its metrics.

use console::style;

use crate::types::TrainingResult;

pub fn render(result: &TrainingResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", style("Action Plan").bold()));

    let predictions = &result.forecast.predictions;
    if predictions.is_empty() {
        out.push_str("  • Re-run training; the service returned an empty forecast.\n");
        return out;
    }

    let first = predictions[0];
    let last = predictions[predictions.len() - 1];
    if last > first {
        out.push_str("  • Demand trends upward: review capacity and stock levels for the horizon.\n");
    } else if last < first {
        out.push_str("  • Demand trends downward: revisit purchasing commitments before they land.\n");
    } else {
        out.push_str("  • Demand is flat: current planning assumptions can stand.\n");
    }

    match result.metrics.mape {
        Some(mape) if mape > 30.0 => {
            out.push_str(
                "  • Model error is high: add more history or review the column mapping before trusting the numbers.\n",
            );
        }
        Some(mape) if mape > 10.0 => {
            out.push_str("  • Treat point forecasts as directional; plan with ranges, not exact values.\n");
        }
        Some(_) => {
            out.push_str("  • Error is low; the forecast can drive week-level commitments.\n");
        }
        None => {
            out.push_str("  • No error metric was reported; validate against a held-out period manually.\n");
        }
    }

    out.push_str("  • Re-upload fresh data at the end of each period to keep the model honest.\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Forecast, Metrics};

    #[test]
    fn test_upward_trend_action() {
        let result = TrainingResult {
            forecast: Forecast {
                predictions: vec![1.0, 3.0],
                dates: vec![],
            },
            metrics: Metrics {
                mape: Some(5.0),
                ..Default::default()
            },
        };
        let text = render(&result);
        assert!(text.contains("upward"));
        assert!(text.contains("Error is low"));
    }

    #[test]
    fn test_high_error_caution() {
        let result = TrainingResult {
            forecast: Forecast {
                predictions: vec![3.0, 1.0],
                dates: vec![],
            },
            metrics: Metrics {
                mape: Some(40.0),
                ..Default::default()
            },
        };
        let text = render(&result);
        assert!(text.contains("downward"));
        assert!(text.contains("error is high"));
    }
}
