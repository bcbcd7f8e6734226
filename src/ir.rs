use serde::Serialize;

// =============================================================================
// Series data: output of the series builder, input to option assembly
// =============================================================================

/// Vertical axis a series is drawn against. Only two axes are modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    Primary,
    Secondary,
}

impl Axis {
    pub fn index(&self) -> usize {
        match self {
            Axis::Primary => 0,
            Axis::Secondary => 1,
        }
    }
}

/// Values of one series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesPayload {
    /// One value per category, aligned by position with `SeriesData::categories`
    Values(Vec<f64>),
    /// Raw (x, y) pairs. When x is categorical, x holds the index into `x_categories`.
    Points {
        points: Vec<(f64, f64)>,
        x_categories: Option<Vec<String>>,
    },
}

impl SeriesPayload {
    pub fn len(&self) -> usize {
        match self {
            SeriesPayload::Values(v) => v.len(),
            SeriesPayload::Points { points, .. } => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> Option<&[f64]> {
        match self {
            SeriesPayload::Values(v) => Some(v),
            SeriesPayload::Points { .. } => None,
        }
    }

    pub fn points(&self) -> Option<&[(f64, f64)]> {
        match self {
            SeriesPayload::Points { points, .. } => Some(points),
            SeriesPayload::Values(_) => None,
        }
    }
}

/// One named, colored series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub color: String,
    pub axis: Axis,
    pub data: SeriesPayload,
}

/// Everything the renderer needs to draw one chart
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SeriesData {
    /// Shared category axis (empty for numeric scatter)
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    /// Demo data substituted because nothing real could be shown
    pub is_placeholder: bool,
}

impl SeriesData {
    pub fn uses_secondary_axis(&self) -> bool {
        self.series.iter().any(|s| s.axis == Axis::Secondary)
    }
}
