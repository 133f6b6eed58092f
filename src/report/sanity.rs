//! Sanity-Check View
//!
//! Mechanical plausibility checks over the returned result, so an obviously
//! broken forecast is flagged before anyone acts on it.

use console::style;

use crate::types::TrainingResult;

/// MAPE below this reads as a solid fit
const MAPE_GOOD: f64 = 10.0;
/// MAPE above this deserves an explicit warning
const MAPE_POOR: f64 = 30.0;

pub fn render(result: &TrainingResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", style("Sanity Checks").bold()));

    let predictions = &result.forecast.predictions;

    check(
        &mut out,
        !predictions.is_empty(),
        "forecast contains predictions",
    );
    check(
        &mut out,
        predictions.iter().all(|v| v.is_finite()),
        "all predicted values are finite",
    );

    match result.metrics.mape {
        Some(mape) if mape <= MAPE_GOOD => {
            check(&mut out, true, &format!("MAPE {:.1}% is within target", mape));
        }
        Some(mape) if mape <= MAPE_POOR => {
            out.push_str(&format!(
                "  {} MAPE {:.1}% is acceptable but not tight\n",
                style("~").yellow(),
                mape
            ));
        }
        Some(mape) => {
            check(
                &mut out,
                false,
                &format!("MAPE {:.1}% exceeds the {:.0}% alert threshold", mape, MAPE_POOR),
            );
        }
        None => {
            out.push_str(&format!(
                "  {} service reported no error metric\n",
                style("~").yellow()
            ));
        }
    }

    if !result.forecast.dates.is_empty() {
        check(
            &mut out,
            result.forecast.dates.len() == predictions.len(),
            "date labels align with predictions",
        );
    }

    out
}

fn check(out: &mut String, ok: bool, label: &str) {
    let mark = if ok {
        style("✓").green()
    } else {
        style("✗").red()
    };
    out.push_str(&format!("  {} {}\n", mark, label));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Forecast, Metrics};

    fn result(predictions: Vec<f64>, mape: Option<f64>) -> TrainingResult {
        TrainingResult {
            forecast: Forecast {
                predictions,
                dates: vec![],
            },
            metrics: Metrics {
                mape,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_good_mape_passes() {
        let text = render(&result(vec![1.0, 2.0], Some(5.0)));
        assert!(text.contains("within target"));
        assert!(!text.contains("✗"));
    }

    #[test]
    fn test_poor_mape_flagged() {
        let text = render(&result(vec![1.0, 2.0], Some(45.0)));
        assert!(text.contains("exceeds"));
    }

    #[test]
    fn test_non_finite_predictions_flagged() {
        let text = render(&result(vec![1.0, f64::NAN], Some(5.0)));
        assert!(text.contains("✗"));
    }
}
