//! Series building: turns a chart configuration and its dataset into
//! render-ready series.
//!
//! Category charts (bar, line, area, pie) aggregate every Y field by the first
//! X field. The category axis is taken from the first Y field's pass only;
//! later series keep their own aggregated values and are matched to the axis
//! by position. When Y fields have different empty-cell patterns the later
//! series can therefore drift from the labels.
//!
//! Scatter charts skip aggregation and plot each X × Y pair row by row.
//! Rows whose Y cell is not numeric are dropped there, unlike the
//! aggregation path which counts them as zero.

use crate::aggregate::{aggregate, try_aggregate};
use crate::coerce::{coerce, is_mostly_numeric};
use crate::config::{CategoryView, ChartConfig, Encoding, ScatterEncoding, WidgetKind};
use crate::data::Dataset;
use crate::error::FallbackReason;
use crate::ir::{Axis, Series, SeriesData, SeriesPayload};
use crate::palette::ColorPalette;
use crate::EngineOptions;
use indexmap::IndexSet;

pub const PLACEHOLDER_CATEGORIES: [&str; 5] = ["A", "B", "C", "D", "E"];
pub const PLACEHOLDER_VALUES: [f64; 5] = [120.0, 200.0, 150.0, 80.0, 70.0];
pub const PLACEHOLDER_SERIES_NAME: &str = "Sample";

/// Build series for a chart with the default palette
pub fn build_series(config: &ChartConfig) -> SeriesData {
    SeriesBuilder::default().build(config)
}

#[derive(Debug, Clone)]
pub struct SeriesBuilder {
    palette: ColorPalette,
    scatter_sample_size: usize,
}

impl Default for SeriesBuilder {
    fn default() -> Self {
        Self::from_options(&EngineOptions::default())
    }
}

impl SeriesBuilder {
    pub fn new(palette: ColorPalette, scatter_sample_size: usize) -> Self {
        Self {
            palette,
            scatter_sample_size,
        }
    }

    pub fn from_options(options: &EngineOptions) -> Self {
        Self::new(options.palette(), options.scatter_sample_size)
    }

    /// Always returns something renderable; see [`SeriesBuilder::try_build`] for the reason
    /// behind a placeholder.
    pub fn build(&self, config: &ChartConfig) -> SeriesData {
        match self.try_build(config) {
            Ok(data) => data,
            Err(reason) => {
                log::warn!("{}: {}; showing placeholder", config.id, reason);
                self.placeholder(config)
            }
        }
    }

    pub fn try_build(&self, config: &ChartConfig) -> Result<SeriesData, FallbackReason> {
        let dataset = config
            .dataset
            .as_deref()
            .ok_or_else(|| FallbackReason::EmptyInput("no dataset bound".to_string()))?;

        if dataset.is_empty() {
            return Err(FallbackReason::EmptyInput("dataset has no rows".to_string()));
        }

        match config.kind.encoding() {
            Encoding::Category(view) => self.build_category(config, dataset, view),
            Encoding::Scatter(enc) => self.build_scatter(config, dataset, enc),
        }
    }

    fn build_category(
        &self,
        config: &ChartConfig,
        dataset: &Dataset,
        view: CategoryView<'_>,
    ) -> Result<SeriesData, FallbackReason> {
        let x_field = view
            .x_field
            .filter(|x| !x.is_empty())
            .ok_or_else(|| FallbackReason::EmptyInput("no x field selected".to_string()))?;
        let first_y = view
            .y_fields
            .first()
            .ok_or_else(|| FallbackReason::EmptyInput("no y field selected".to_string()))?;

        // Stale column references show "no data" instead of one "(empty)" bar
        require_column(dataset, x_field)?;
        require_column(dataset, first_y)?;

        // The first Y field defines the category axis
        let first = try_aggregate(
            &dataset.rows,
            x_field,
            first_y,
            view.aggregation,
            view.row_limit,
        )?;
        if first.series.is_empty() {
            return Err(FallbackReason::EmptyInput("no categories".to_string()));
        }
        if first.unparseable == dataset.len() {
            log::debug!("{}: every `{}` cell counted as zero", config.id, first_y);
        }

        let categories = first.series.categories;
        let mut series = Vec::with_capacity(view.y_fields.len());
        series.push(Series {
            name: first_y.clone(),
            color: self.palette.series_color(0, &config.color),
            axis: axis_for(0, view.dual_axis),
            data: SeriesPayload::Values(first.series.values),
        });

        for (index, y_field) in view.y_fields.iter().enumerate().skip(1) {
            // Aligned by position with the first field's categories
            let aggregated = aggregate(
                &dataset.rows,
                x_field,
                y_field,
                view.aggregation,
                view.row_limit,
            );
            series.push(Series {
                name: y_field.clone(),
                color: self.palette.series_color(index, &config.color),
                axis: axis_for(index, view.dual_axis),
                data: SeriesPayload::Values(aggregated.values),
            });
        }

        Ok(SeriesData {
            categories,
            series,
            is_placeholder: false,
        })
    }

    fn build_scatter(
        &self,
        config: &ChartConfig,
        dataset: &Dataset,
        enc: &ScatterEncoding,
    ) -> Result<SeriesData, FallbackReason> {
        if enc.x_fields.is_empty() || enc.y_fields.is_empty() {
            return Err(FallbackReason::EmptyInput("no scatter fields selected".to_string()));
        }

        let mut categories = Vec::new();
        let mut series = Vec::with_capacity(enc.x_fields.len() * enc.y_fields.len());

        for x_field in &enc.x_fields {
            let numeric = is_mostly_numeric(dataset.column(x_field), self.scatter_sample_size);

            // First-seen order over every row, including those dropped below
            let x_categories: Option<IndexSet<String>> = if numeric {
                None
            } else {
                Some(dataset.column(x_field).map(|cell| cell.category_label()).collect())
            };

            for y_field in &enc.y_fields {
                let points: Vec<(f64, f64)> = match &x_categories {
                    None => dataset
                        .rows
                        .iter()
                        .filter_map(|row| {
                            Some((coerce(row.get(x_field))?, coerce(row.get(y_field))?))
                        })
                        .collect(),
                    Some(cats) => dataset
                        .rows
                        .iter()
                        .filter_map(|row| {
                            let y = coerce(row.get(y_field))?;
                            let x = cats.get_index_of(&row.get(x_field).category_label())?;
                            Some((x as f64, y))
                        })
                        .collect(),
                };

                let labels: Option<Vec<String>> =
                    x_categories.as_ref().map(|cats| cats.iter().cloned().collect());
                if categories.is_empty() {
                    if let Some(labels) = &labels {
                        categories = labels.clone();
                    }
                }

                let index = series.len();
                series.push(Series {
                    name: format!("{} vs {}", y_field, x_field),
                    color: self.palette.series_color(index, &config.color),
                    axis: Axis::Primary,
                    data: SeriesPayload::Points {
                        points,
                        x_categories: labels,
                    },
                });
            }
        }

        if series.iter().all(|s| s.data.is_empty()) {
            return Err(FallbackReason::UnparseableValue {
                column: enc.y_fields.join(", "),
            });
        }

        Ok(SeriesData {
            categories,
            series,
            is_placeholder: false,
        })
    }

    /// The fixed demo chart shown when nothing real can be drawn
    pub fn placeholder(&self, config: &ChartConfig) -> SeriesData {
        let categories: Vec<String> = PLACEHOLDER_CATEGORIES
            .iter()
            .map(|s| s.to_string())
            .collect();

        let data = match config.widget_kind() {
            WidgetKind::Scatter => SeriesPayload::Points {
                points: PLACEHOLDER_VALUES
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i as f64, *v))
                    .collect(),
                x_categories: Some(categories.clone()),
            },
            _ => SeriesPayload::Values(PLACEHOLDER_VALUES.to_vec()),
        };

        SeriesData {
            categories,
            series: vec![Series {
                name: PLACEHOLDER_SERIES_NAME.to_string(),
                color: self.palette.series_color(0, &config.color),
                axis: Axis::Primary,
                data,
            }],
            is_placeholder: true,
        }
    }
}

/// Series 0 is always primary; with a dual axis series 1 moves to the secondary axis
fn axis_for(index: usize, dual_axis: bool) -> Axis {
    if dual_axis && index == 1 {
        Axis::Secondary
    } else {
        Axis::Primary
    }
}

fn require_column(dataset: &Dataset, column: &str) -> Result<(), FallbackReason> {
    if dataset.columns.is_empty() || dataset.columns.iter().any(|c| c == column) {
        Ok(())
    } else {
        Err(FallbackReason::EmptyInput(format!("column `{}` not in dataset", column)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{AggregationKind, RowLimit};
    use crate::config::{CategoryEncoding, ChartKind, PieEncoding, WidgetId};
    use crate::data::{CellValue, Row};
    use std::sync::Arc;

    fn sales_data() -> Arc<Dataset> {
        let records = [
            ("Paris", "10", "4"),
            ("Lyon", "30", "1"),
            ("Paris", "20", "2"),
            ("Nice", "5", "9"),
        ];
        let rows = records
            .iter()
            .map(|(city, sales, cost)| {
                [("city", *city), ("sales", *sales), ("cost", *cost)]
                    .into_iter()
                    .collect::<Row>()
            })
            .collect();
        Arc::new(Dataset::new(
            vec!["city".to_string(), "sales".to_string(), "cost".to_string()],
            rows,
        ))
    }

    fn bar(y_fields: &[&str], dual_axis: bool) -> ChartConfig {
        ChartConfig {
            id: WidgetId::new(1),
            title: "Sales".to_string(),
            color: "#000000".to_string(),
            dataset: Some(sales_data()),
            kind: ChartKind::Bar(CategoryEncoding {
                x_field: Some("city".to_string()),
                y_fields: y_fields.iter().map(|s| s.to_string()).collect(),
                aggregation: AggregationKind::Sum,
                row_limit: RowLimit::Top(20),
                dual_axis,
            }),
        }
    }

    fn scatter(dataset: Dataset, x_fields: &[&str], y_fields: &[&str]) -> ChartConfig {
        ChartConfig {
            id: WidgetId::new(2),
            title: "Scatter".to_string(),
            color: "#000000".to_string(),
            dataset: Some(Arc::new(dataset)),
            kind: ChartKind::Scatter(ScatterEncoding {
                x_fields: x_fields.iter().map(|s| s.to_string()).collect(),
                y_fields: y_fields.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }

    #[test]
    fn test_single_series() {
        let data = build_series(&bar(&["sales"], false));
        assert!(!data.is_placeholder);
        // Paris and Lyon tie at 30; Paris was seen first
        assert_eq!(data.categories, vec!["Paris", "Lyon", "Nice"]);
        assert_eq!(data.series.len(), 1);
        assert_eq!(data.series[0].data.values(), Some(&[30.0, 30.0, 5.0][..]));
    }

    #[test]
    fn test_multi_y_aggregates_each_field() {
        let data = build_series(&bar(&["sales", "cost"], false));
        assert_eq!(data.series.len(), 2);
        assert_eq!(data.series[0].name, "sales");
        assert_eq!(data.series[1].name, "cost");
        // Axis comes from the sales pass
        assert_eq!(data.categories, vec!["Paris", "Lyon", "Nice"]);
        // cost keeps its own descending order: Nice 9, Paris 6, Lyon 1
        assert_eq!(data.series[1].data.values(), Some(&[9.0, 6.0, 1.0][..]));
    }

    #[test]
    fn test_later_series_align_by_position_only() {
        // Known limitation: "cost" is not re-matched to the "sales" categories.
        // Its first value (Nice = 9) sits under the "Paris" label.
        let data = build_series(&bar(&["sales", "cost"], false));
        let paris = data.categories.iter().position(|c| c == "Paris").unwrap();
        assert_eq!(data.series[1].data.values().unwrap()[paris], 9.0);
    }

    #[test]
    fn test_dual_axis_assignment() {
        let data = build_series(&bar(&["sales", "cost", "sales"], true));
        let axes: Vec<Axis> = data.series.iter().map(|s| s.axis).collect();
        assert_eq!(axes, vec![Axis::Primary, Axis::Secondary, Axis::Primary]);
        assert!(data.uses_secondary_axis());

        let data = build_series(&bar(&["sales", "cost"], false));
        assert!(data.series.iter().all(|s| s.axis == Axis::Primary));
    }

    #[test]
    fn test_colors() {
        let data = build_series(&bar(&["sales", "cost", "sales"], false));
        assert_eq!(data.series[0].color, "#000000");
        assert_eq!(data.series[1].color, "#ff7f0e");
        assert_eq!(data.series[2].color, "#2ca02c");
    }

    #[test]
    fn test_custom_palette_cycles() {
        let palette = ColorPalette::new(vec!["red".to_string(), "blue".to_string()]);
        let builder = SeriesBuilder::new(palette, 100);
        let data = builder.build(&bar(&["sales", "cost", "sales"], false));
        assert_eq!(data.series[1].color, "blue");
        assert_eq!(data.series[2].color, "red");
    }

    #[test]
    fn test_pie_multi_series_single_axis() {
        let mut config = bar(&["sales", "cost"], true);
        config.kind = ChartKind::Pie(PieEncoding {
            x_field: Some("city".to_string()),
            y_fields: vec!["sales".to_string(), "cost".to_string()],
            aggregation: AggregationKind::Count,
            row_limit: RowLimit::Top(2),
        });
        let data = build_series(&config);
        assert_eq!(data.categories, vec!["Paris", "Lyon"]);
        assert_eq!(data.series.len(), 2);
        assert!(!data.uses_secondary_axis());
    }

    #[test]
    fn test_fallback_without_dataset() {
        let mut config = bar(&["sales"], false);
        config.dataset = None;
        assert!(matches!(
            SeriesBuilder::default().try_build(&config),
            Err(FallbackReason::EmptyInput(_))
        ));

        let data = build_series(&config);
        assert!(data.is_placeholder);
        assert_eq!(data.categories, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(data.series[0].name, "Sample");
        assert_eq!(data.series[0].data.values(), Some(&PLACEHOLDER_VALUES[..]));
    }

    #[test]
    fn test_fallback_on_empty_fields_and_rows() {
        let data = build_series(&bar(&[], false));
        assert!(data.is_placeholder);

        let mut config = bar(&["sales"], false);
        config.dataset = Some(Arc::new(Dataset::new(vec!["city".to_string()], Vec::new())));
        assert!(build_series(&config).is_placeholder);

        let mut config = bar(&["sales"], false);
        if let ChartKind::Bar(enc) = &mut config.kind {
            enc.x_field = None;
        }
        assert!(build_series(&config).is_placeholder);
    }

    #[test]
    fn test_stale_column_falls_back() {
        let data = build_series(&bar(&["revenue"], false));
        assert!(data.is_placeholder);
    }

    #[test]
    fn test_scatter_numeric_x() {
        let rows = vec![
            [("h", "170"), ("w", "70")].into_iter().collect::<Row>(),
            [("h", "180"), ("w", "bad")].into_iter().collect::<Row>(),
            [("h", "165"), ("w", "60")].into_iter().collect::<Row>(),
        ];
        let data = build_series(&scatter(Dataset::new(vec![], rows), &["h"], &["w"]));
        assert!(!data.is_placeholder);
        assert!(data.categories.is_empty());
        assert_eq!(data.series[0].name, "w vs h");
        // Unparseable y is dropped, not zero-filled
        assert_eq!(data.series[0].data.points(), Some(&[(170.0, 70.0), (165.0, 60.0)][..]));
    }

    #[test]
    fn test_scatter_categorical_x() {
        let rows = vec![
            [("team", "red"), ("score", "3")].into_iter().collect::<Row>(),
            [("team", "blue"), ("score", "?")].into_iter().collect::<Row>(),
            [("team", "red"), ("score", "5")].into_iter().collect::<Row>(),
            [("team", "green"), ("score", "1")].into_iter().collect::<Row>(),
        ];
        let data = build_series(&scatter(Dataset::new(vec![], rows), &["team"], &["score"]));
        assert_eq!(data.categories, vec!["red", "blue", "green"]);
        match &data.series[0].data {
            SeriesPayload::Points { points, x_categories } => {
                assert_eq!(points, &vec![(0.0, 3.0), (0.0, 5.0), (2.0, 1.0)]);
                assert_eq!(x_categories.as_ref().unwrap().len(), 3);
            }
            other => panic!("expected points, got {:?}", other),
        }
    }

    #[test]
    fn test_scatter_cross_product() {
        let rows = vec![[
            ("a", CellValue::Number(1.0)),
            ("b", CellValue::Number(2.0)),
            ("c", CellValue::Number(3.0)),
            ("d", CellValue::Number(4.0)),
        ]
        .into_iter()
        .collect::<Row>()];
        let data = build_series(&scatter(Dataset::new(vec![], rows), &["a", "b"], &["c", "d"]));
        let names: Vec<&str> = data.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["c vs a", "d vs a", "c vs b", "d vs b"]);
        assert!(data.series.iter().all(|s| s.axis == Axis::Primary));
        assert_eq!(data.series[3].data.points(), Some(&[(2.0, 4.0)][..]));
    }

    #[test]
    fn test_scatter_without_numeric_y_falls_back() {
        let rows = vec![[("x", "1"), ("y", "n/a")].into_iter().collect::<Row>()];
        let config = scatter(Dataset::new(vec![], rows), &["x"], &["y"]);
        assert_eq!(
            SeriesBuilder::default().try_build(&config),
            Err(FallbackReason::UnparseableValue {
                column: "y".to_string()
            })
        );

        let data = build_series(&config);
        assert!(data.is_placeholder);
        assert_eq!(data.series[0].data.points().map(|p| p.len()), Some(5));
    }
}
