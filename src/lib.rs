// Library exports for dashgraph

pub mod aggregate;
pub mod coerce;
pub mod config;
pub mod csv_reader;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod ir;
pub mod options;
pub mod palette;
pub mod parser;
pub mod series;
pub mod store;

pub use aggregate::{aggregate, AggregatedSeries, AggregationKind, RowLimit};
pub use coerce::coerce;
pub use config::{ChartConfig, ChartKind, SettingsPatch, WidgetId, WidgetKind};
pub use dashboard::{Dashboard, FormValues, Renderer};
pub use data::{CellValue, Dataset, Row};
pub use error::{DashboardError, FallbackReason, StoreError};
pub use ir::{Axis, Series, SeriesData, SeriesPayload};
pub use options::ChartOptions;
pub use series::{build_series, SeriesBuilder};
pub use store::ConfigStore;

use serde::Deserialize;

/// Engine-wide settings. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineOptions {
    /// Row limit given to newly created widgets
    #[serde(default)]
    pub row_limit: RowLimit,
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    /// Rows inspected when deciding whether a scatter X column is numeric
    #[serde(default = "default_scatter_sample_size")]
    pub scatter_sample_size: usize,
    /// Color of new widgets; first palette entry when unset
    #[serde(default)]
    pub default_color: Option<String>,
}

fn default_palette() -> Vec<String> {
    palette::category10_hex().into_iter().map(String::from).collect()
}

fn default_scatter_sample_size() -> usize { 100 }

impl EngineOptions {
    pub fn palette(&self) -> palette::ColorPalette {
        palette::ColorPalette::new(self.palette.clone())
    }

    pub fn widget_color(&self) -> String {
        self.default_color
            .clone()
            .unwrap_or_else(|| self.palette().color_at(0).to_string())
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            row_limit: RowLimit::default(),
            palette: default_palette(),
            scatter_sample_size: default_scatter_sample_size(),
            default_color: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_options_defaults_from_empty_json() {
        let opts: EngineOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.row_limit, RowLimit::Top(20));
        assert_eq!(opts.scatter_sample_size, 100);
        assert_eq!(opts.palette.len(), 10);
        assert_eq!(opts.widget_color(), "#1f77b4");
    }

    #[test]
    fn test_engine_options_overrides() {
        let text = r##"{
            "row_limit": null,
            "palette": ["#111111", "#222222"],
            "default_color": "#abcdef"
        }"##;
        let opts: EngineOptions = serde_json::from_str(text).unwrap();
        assert_eq!(opts.row_limit, RowLimit::Unbounded);
        assert_eq!(opts.palette().color_at(3), "#222222");
        assert_eq!(opts.widget_color(), "#abcdef");
    }
}
