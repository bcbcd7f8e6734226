// Chart configuration model: one ChartConfig per dashboard widget

use crate::aggregate::{AggregationKind, RowLimit};
use crate::data::Dataset;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Stable widget identifier, never reused within a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WidgetId(u64);

impl WidgetId {
    pub fn new(n: u64) -> Self {
        WidgetId(n)
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chart-{}", self.0)
    }
}

impl FromStr for WidgetId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.trim().strip_prefix("chart-").unwrap_or(s.trim());
        digits
            .parse::<u64>()
            .map(WidgetId)
            .map_err(|_| anyhow!("Invalid widget id '{}'", s))
    }
}

/// The chart kinds a widget can be created as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Bar,
    Line,
    Area,
    Pie,
    Scatter,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 5] = [
        WidgetKind::Bar,
        WidgetKind::Line,
        WidgetKind::Area,
        WidgetKind::Pie,
        WidgetKind::Scatter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WidgetKind::Bar => "bar",
            WidgetKind::Line => "line",
            WidgetKind::Area => "area",
            WidgetKind::Pie => "pie",
            WidgetKind::Scatter => "scatter",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            WidgetKind::Bar => "Bar",
            WidgetKind::Line => "Line",
            WidgetKind::Area => "Area",
            WidgetKind::Pie => "Pie",
            WidgetKind::Scatter => "Scatter",
        }
    }

    pub fn default_title(&self) -> String {
        format!("{} chart", self.label())
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WidgetKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        WidgetKind::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| anyhow!("Unknown chart kind '{}'", s))
    }
}

/// Bar, line and area charts: one category axis, one or more value series
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryEncoding {
    pub x_field: Option<String>,
    pub y_fields: Vec<String>,
    pub aggregation: AggregationKind,
    pub row_limit: RowLimit,
    /// Second value series goes on a secondary axis
    pub dual_axis: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PieEncoding {
    pub x_field: Option<String>,
    pub y_fields: Vec<String>,
    pub aggregation: AggregationKind,
    pub row_limit: RowLimit,
}

/// Scatter charts plot every X field against every Y field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScatterEncoding {
    pub x_fields: Vec<String>,
    pub y_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    Bar(CategoryEncoding),
    Line(CategoryEncoding),
    Area(CategoryEncoding),
    Pie(PieEncoding),
    Scatter(ScatterEncoding),
}

/// Borrowed view over the kinds that aggregate by category
#[derive(Debug, Clone, Copy)]
pub struct CategoryView<'a> {
    pub x_field: Option<&'a str>,
    pub y_fields: &'a [String],
    pub aggregation: AggregationKind,
    pub row_limit: RowLimit,
    pub dual_axis: bool,
}

/// How the series builder reads a chart kind
#[derive(Debug, Clone, Copy)]
pub enum Encoding<'a> {
    Category(CategoryView<'a>),
    Scatter(&'a ScatterEncoding),
}

impl ChartKind {
    /// New encoding with fields seeded from the first one or two columns
    pub fn seeded(kind: WidgetKind, columns: &[String], row_limit: RowLimit) -> Self {
        let x = columns.first().cloned();
        let y = columns.get(1).or_else(|| columns.first()).cloned();

        let category = || CategoryEncoding {
            x_field: x.clone(),
            y_fields: y.iter().cloned().collect(),
            aggregation: AggregationKind::default(),
            row_limit,
            dual_axis: false,
        };

        match kind {
            WidgetKind::Bar => ChartKind::Bar(category()),
            WidgetKind::Line => ChartKind::Line(category()),
            WidgetKind::Area => ChartKind::Area(category()),
            WidgetKind::Pie => ChartKind::Pie(PieEncoding {
                x_field: x.clone(),
                y_fields: y.iter().cloned().collect(),
                aggregation: AggregationKind::default(),
                row_limit,
            }),
            WidgetKind::Scatter => ChartKind::Scatter(ScatterEncoding {
                x_fields: x.iter().cloned().collect(),
                y_fields: y.iter().cloned().collect(),
            }),
        }
    }

    /// Fill X and Y from `columns` where nothing is selected yet
    pub fn seed_missing_fields(&mut self, columns: &[String]) {
        let x = columns.first();
        let y: Vec<String> = columns
            .get(1)
            .or_else(|| columns.first())
            .cloned()
            .into_iter()
            .collect();

        match self {
            ChartKind::Bar(c) | ChartKind::Line(c) | ChartKind::Area(c) => {
                c.x_field = c.x_field.take().or_else(|| x.cloned());
                if c.y_fields.is_empty() {
                    c.y_fields = y;
                }
            }
            ChartKind::Pie(p) => {
                p.x_field = p.x_field.take().or_else(|| x.cloned());
                if p.y_fields.is_empty() {
                    p.y_fields = y;
                }
            }
            ChartKind::Scatter(s) => {
                if s.x_fields.is_empty() {
                    s.x_fields = x.cloned().into_iter().collect();
                }
                if s.y_fields.is_empty() {
                    s.y_fields = y;
                }
            }
        }
    }

    pub fn widget_kind(&self) -> WidgetKind {
        match self {
            ChartKind::Bar(_) => WidgetKind::Bar,
            ChartKind::Line(_) => WidgetKind::Line,
            ChartKind::Area(_) => WidgetKind::Area,
            ChartKind::Pie(_) => WidgetKind::Pie,
            ChartKind::Scatter(_) => WidgetKind::Scatter,
        }
    }

    pub fn encoding(&self) -> Encoding<'_> {
        match self {
            ChartKind::Bar(c) | ChartKind::Line(c) | ChartKind::Area(c) => {
                Encoding::Category(CategoryView {
                    x_field: c.x_field.as_deref(),
                    y_fields: &c.y_fields,
                    aggregation: c.aggregation,
                    row_limit: c.row_limit,
                    dual_axis: c.dual_axis,
                })
            }
            ChartKind::Pie(p) => Encoding::Category(CategoryView {
                x_field: p.x_field.as_deref(),
                y_fields: &p.y_fields,
                aggregation: p.aggregation,
                row_limit: p.row_limit,
                dual_axis: false,
            }),
            ChartKind::Scatter(s) => Encoding::Scatter(s),
        }
    }

    pub fn category_view(&self) -> Option<CategoryView<'_>> {
        match self.encoding() {
            Encoding::Category(view) => Some(view),
            Encoding::Scatter(_) => None,
        }
    }

    /// Apply edited settings. Fields the kind does not carry are ignored.
    pub fn apply(&mut self, patch: &SettingsPatch) {
        match self {
            ChartKind::Bar(c) | ChartKind::Line(c) | ChartKind::Area(c) => {
                if let Some(xs) = &patch.x_fields {
                    c.x_field = xs.first().cloned();
                }
                if let Some(ys) = &patch.y_fields {
                    c.y_fields = ys.clone();
                }
                if let Some(agg) = patch.aggregation {
                    c.aggregation = agg;
                }
                if let Some(limit) = patch.row_limit {
                    c.row_limit = limit;
                }
                if let Some(dual) = patch.dual_axis {
                    c.dual_axis = dual;
                }
            }
            ChartKind::Pie(p) => {
                if let Some(xs) = &patch.x_fields {
                    p.x_field = xs.first().cloned();
                }
                if let Some(ys) = &patch.y_fields {
                    p.y_fields = ys.clone();
                }
                if let Some(agg) = patch.aggregation {
                    p.aggregation = agg;
                }
                if let Some(limit) = patch.row_limit {
                    p.row_limit = limit;
                }
            }
            ChartKind::Scatter(s) => {
                if let Some(xs) = &patch.x_fields {
                    s.x_fields = xs.clone();
                }
                if let Some(ys) = &patch.y_fields {
                    s.y_fields = ys.clone();
                }
            }
        }
    }
}

/// Everything a widget needs to produce its chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub id: WidgetId,
    pub title: String,
    pub color: String,
    pub dataset: Option<Arc<Dataset>>,
    pub kind: ChartKind,
}

impl ChartConfig {
    pub fn widget_kind(&self) -> WidgetKind {
        self.kind.widget_kind()
    }

    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        self.kind.apply(patch);
    }
}

/// A partial update from the settings form; `None` leaves a field untouched
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingsPatch {
    pub title: Option<String>,
    pub color: Option<String>,
    pub x_fields: Option<Vec<String>>,
    pub y_fields: Option<Vec<String>>,
    pub aggregation: Option<AggregationKind>,
    pub row_limit: Option<RowLimit>,
    pub dual_axis: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == SettingsPatch::default()
    }
}
