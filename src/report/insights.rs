//! Insights View
//!
//! Top-line narrative summary of the forecast.

use console::style;

use crate::types::TrainingResult;

pub fn render(result: &TrainingResult) -> String {
    let predictions = &result.forecast.predictions;
    let mut out = String::new();
    out.push_str(&format!("{}\n", style("Forecast Insights").bold()));

    if predictions.is_empty() {
        out.push_str("  The service returned no predictions.\n");
        return out;
    }

    let count = predictions.len();
    let sum: f64 = predictions.iter().sum();
    let mean = sum / count as f64;
    let min = predictions.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = predictions.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    out.push_str(&format!("  Horizon: {} periods\n", count));
    out.push_str(&format!(
        "  Range:   {:.2} to {:.2} (mean {:.2})\n",
        min, max, mean
    ));

    let first = predictions[0];
    let last = predictions[count - 1];
    let trend = if last > first {
        "upward"
    } else if last < first {
        "downward"
    } else {
        "flat"
    };
    out.push_str(&format!("  Trend:   {}\n", trend));

    if let Some(mape) = result.metrics.mape {
        out.push_str(&format!(
            "  The model's mean absolute percentage error is {:.1}%.\n",
            mape
        ));
    }

    out
}
