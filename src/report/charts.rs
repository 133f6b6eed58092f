//! Charts View
//!
//! Terminal sparkline of the prediction series.

use console::style;

use crate::types::TrainingResult;

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn render(result: &TrainingResult) -> String {
    let predictions = &result.forecast.predictions;
    let mut out = String::new();
    out.push_str(&format!("{}\n", style("Forecast Chart").bold()));

    if predictions.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }

    out.push_str("  ");
    out.push_str(&sparkline(predictions));
    out.push('\n');

    let min = predictions.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = predictions.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    out.push_str(&format!("  min {:.2}  max {:.2}\n", min, max));

    if !result.forecast.dates.is_empty() {
        let first = &result.forecast.dates[0];
        let last = &result.forecast.dates[result.forecast.dates.len() - 1];
        out.push_str(&format!("  {} … {}\n", first, last));
    }

    out
}

fn sparkline(values: &[f64]) -> String {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if !v.is_finite() {
                return '?';
            }
            if span <= f64::EPSILON {
                return BARS[0];
            }
            let norm = (v - min) / span;
            let idx = ((norm * (BARS.len() - 1) as f64).round() as usize).min(BARS.len() - 1);
            BARS[idx]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Forecast, Metrics};

    #[test]
    fn test_sparkline_shape() {
        let line = sparkline(&[0.0, 0.5, 1.0]);
        assert_eq!(line.chars().count(), 3);
        assert!(line.starts_with('▁'));
        assert!(line.ends_with('█'));
    }

    #[test]
    fn test_sparkline_constant_series() {
        assert_eq!(sparkline(&[5.0, 5.0]), "▁▁");
    }

    #[test]
    fn test_render_includes_bounds() {
        let result = TrainingResult {
            forecast: Forecast {
                predictions: vec![1.0, 2.0, 3.0],
                dates: vec!["2024-01-01".into(), "2024-01-02".into(), "2024-01-03".into()],
            },
            metrics: Metrics::default(),
        };
        let text = render(&result);
        assert!(text.contains("min 1.00"));
        assert!(text.contains("max 3.00"));
        assert!(text.contains("2024-01-01 … 2024-01-03"));
    }
}
