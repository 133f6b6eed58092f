//! Results Presentation
//!
//! Stateless fan-out over the final training result: four independently
//! selectable read-only views sharing nothing but the source object.
//! Rendering a view has no side effects and issues no network calls.

mod charts;
mod insights;
mod plan;
mod sanity;

use crate::types::TrainingResult;

/// The selectable result views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultView {
    Insights,
    Charts,
    Sanity,
    Plan,
}

impl ResultView {
    pub const ALL: [ResultView; 4] = [
        ResultView::Insights,
        ResultView::Charts,
        ResultView::Sanity,
        ResultView::Plan,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Insights => "insights",
            Self::Charts => "charts",
            Self::Sanity => "sanity",
            Self::Plan => "plan",
        }
    }
}

impl std::str::FromStr for ResultView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "insights" => Ok(Self::Insights),
            "charts" => Ok(Self::Charts),
            "sanity" => Ok(Self::Sanity),
            "plan" => Ok(Self::Plan),
            _ => Err(format!(
                "Unknown view '{}'. Valid values: insights, charts, sanity, plan",
                s
            )),
        }
    }
}

/// Render one view of the result
pub fn render(view: ResultView, result: &TrainingResult) -> String {
    match view {
        ResultView::Insights => insights::render(result),
        ResultView::Charts => charts::render(result),
        ResultView::Sanity => sanity::render(result),
        ResultView::Plan => plan::render(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Forecast, Metrics};

    #[test]
    fn test_view_from_str() {
        assert_eq!("charts".parse::<ResultView>().unwrap(), ResultView::Charts);
        assert_eq!("PLAN".parse::<ResultView>().unwrap(), ResultView::Plan);
        assert!("pie".parse::<ResultView>().is_err());
    }

    #[test]
    fn test_all_views_render_without_mutating_source() {
        let result = TrainingResult {
            forecast: Forecast {
                predictions: vec![1.0, 2.0, 3.0],
                dates: vec![],
            },
            metrics: Metrics {
                mape: Some(5.0),
                ..Default::default()
            },
        };
        let before = result.forecast.predictions.clone();

        for view in ResultView::ALL {
            let text = render(view, &result);
            assert!(!text.is_empty(), "view {} rendered nothing", view.name());
        }

        assert_eq!(result.forecast.predictions, before);
    }
}
