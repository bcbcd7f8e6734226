// Option assembly: the declarative object handed to the external charting library

use crate::config::{ChartConfig, ChartKind, WidgetKind};
use crate::ir::{Axis, SeriesData, SeriesPayload};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub id: String,
    pub chart_type: WidgetKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<XAxisOptions>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub y_axes: Vec<YAxisOptions>,
    pub series: Vec<SeriesOptions>,
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum XAxisOptions {
    Category { data: Vec<String> },
    Value { name: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YAxisOptions {
    pub name: Option<String>,
    pub position: AxisPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesOptions {
    pub name: String,
    #[serde(rename = "type")]
    pub series_type: WidgetKind,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_index: Option<usize>,
    /// Labels a categorical scatter series indexes into
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_categories: Option<Vec<String>>,
    pub data: OptionData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionData {
    Values(Vec<f64>),
    Named(Vec<NamedValue>),
    Points(Vec<[f64; 2]>),
}

impl ChartOptions {
    /// Assemble the renderer payload for `config` from already-built series
    pub fn assemble(config: &ChartConfig, data: &SeriesData) -> Self {
        let kind = config.widget_kind();

        let (x_axis, y_axes) = match kind {
            WidgetKind::Pie => (None, Vec::new()),
            WidgetKind::Scatter => (
                Some(scatter_x_axis(config, data)),
                vec![left_axis(None)],
            ),
            WidgetKind::Bar | WidgetKind::Line | WidgetKind::Area => (
                Some(XAxisOptions::Category {
                    data: data.categories.clone(),
                }),
                value_axes(data),
            ),
        };

        let series = data
            .series
            .iter()
            .map(|s| SeriesOptions {
                name: s.name.clone(),
                series_type: kind,
                color: s.color.clone(),
                y_axis_index: (kind != WidgetKind::Pie).then(|| s.axis.index()),
                x_categories: match &s.data {
                    SeriesPayload::Points { x_categories, .. } => x_categories.clone(),
                    SeriesPayload::Values(_) => None,
                },
                data: option_data(kind, &data.categories, &s.data),
            })
            .collect();

        ChartOptions {
            id: config.id.to_string(),
            chart_type: kind,
            title: config.title.clone(),
            x_axis,
            y_axes,
            series,
            placeholder: data.is_placeholder,
        }
    }
}

fn left_axis(name: Option<String>) -> YAxisOptions {
    YAxisOptions {
        name,
        position: AxisPosition::Left,
    }
}

fn value_axes(data: &SeriesData) -> Vec<YAxisOptions> {
    let primary = data
        .series
        .iter()
        .find(|s| s.axis == Axis::Primary)
        .map(|s| s.name.clone());
    let mut axes = vec![left_axis(primary)];

    if let Some(secondary) = data.series.iter().find(|s| s.axis == Axis::Secondary) {
        axes.push(YAxisOptions {
            name: Some(secondary.name.clone()),
            position: AxisPosition::Right,
        });
    }
    axes
}

/// Category axis only when every series indexes into the same label list;
/// otherwise raw x values and indices share a value axis
fn scatter_x_axis(config: &ChartConfig, data: &SeriesData) -> XAxisOptions {
    let mut labels = data.series.iter().map(|s| match &s.data {
        SeriesPayload::Points { x_categories, .. } => x_categories.as_ref(),
        SeriesPayload::Values(_) => None,
    });
    if let Some(Some(first)) = labels.next() {
        if labels.all(|other| other == Some(first)) {
            return XAxisOptions::Category {
                data: first.clone(),
            };
        }
    }
    let name = match &config.kind {
        ChartKind::Scatter(enc) if !enc.x_fields.is_empty() => Some(enc.x_fields.join(", ")),
        _ => None,
    };
    XAxisOptions::Value { name }
}

fn option_data(kind: WidgetKind, categories: &[String], payload: &SeriesPayload) -> OptionData {
    match payload {
        SeriesPayload::Values(values) if kind == WidgetKind::Pie => OptionData::Named(
            categories
                .iter()
                .zip(values)
                .map(|(name, value)| NamedValue {
                    name: name.clone(),
                    value: *value,
                })
                .collect(),
        ),
        SeriesPayload::Values(values) => OptionData::Values(values.clone()),
        SeriesPayload::Points { points, .. } => {
            OptionData::Points(points.iter().map(|&(x, y)| [x, y]).collect())
        }
    }
}
