use crate::coerce::coerce;
use crate::data::Row;
use crate::error::FallbackReason;
use anyhow::anyhow;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Categories kept per chart unless configured otherwise
pub const DEFAULT_ROW_LIMIT: usize = 20;

/// Reduction applied to the values of one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationKind {
    #[default]
    Sum,
    #[serde(alias = "average", alias = "mean")]
    Avg,
    Count,
    Min,
    Max,
}

impl AggregationKind {
    pub fn name(&self) -> &'static str {
        match self {
            AggregationKind::Sum => "sum",
            AggregationKind::Avg => "avg",
            AggregationKind::Count => "count",
            AggregationKind::Min => "min",
            AggregationKind::Max => "max",
        }
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregationKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(AggregationKind::Sum),
            "avg" | "average" | "mean" => Ok(AggregationKind::Avg),
            "count" => Ok(AggregationKind::Count),
            "min" => Ok(AggregationKind::Min),
            "max" => Ok(AggregationKind::Max),
            other => Err(anyhow!("Unknown aggregation '{}'", other)),
        }
    }
}

/// Cap on the number of categories kept after sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<usize>", into = "Option<usize>")]
pub enum RowLimit {
    Top(usize),
    Unbounded,
}

impl RowLimit {
    pub fn apply<T>(self, items: &mut Vec<T>) {
        if let RowLimit::Top(n) = self {
            items.truncate(n);
        }
    }
}

impl Default for RowLimit {
    fn default() -> Self {
        RowLimit::Top(DEFAULT_ROW_LIMIT)
    }
}

impl From<usize> for RowLimit {
    fn from(n: usize) -> Self {
        if n == 0 {
            RowLimit::Unbounded
        } else {
            RowLimit::Top(n)
        }
    }
}

impl From<Option<usize>> for RowLimit {
    fn from(n: Option<usize>) -> Self {
        n.map(RowLimit::from).unwrap_or(RowLimit::Unbounded)
    }
}

impl From<RowLimit> for Option<usize> {
    fn from(limit: RowLimit) -> Self {
        match limit {
            RowLimit::Top(n) => Some(n),
            RowLimit::Unbounded => None,
        }
    }
}

/// Ordered (category, value) pairs for one value column
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AggregatedSeries {
    pub categories: Vec<String>,
    pub values: Vec<f64>,
}

impl AggregatedSeries {
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Aggregation result plus what was absorbed along the way
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregateReport {
    pub series: AggregatedSeries,
    /// Cells that failed coercion and were counted as zero
    pub unparseable: usize,
}

#[derive(Debug, Default)]
struct GroupAccumulator {
    sum: f64,
    count: usize,
    values: Vec<f64>,
}

impl GroupAccumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.values.push(value);
    }

    fn reduce(&self, kind: AggregationKind) -> f64 {
        match kind {
            AggregationKind::Sum => self.sum,
            AggregationKind::Avg => {
                if self.count == 0 {
                    0.0
                } else {
                    self.sum / self.count as f64
                }
            }
            AggregationKind::Count => self.count as f64,
            AggregationKind::Min => self.values.iter().copied().fold(f64::INFINITY, f64::min),
            AggregationKind::Max => self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Round half-up to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Group `rows` by `x_field` and reduce `y_field` per group.
///
/// Degenerate input yields an empty series rather than an error.
pub fn aggregate(
    rows: &[Row],
    x_field: &str,
    y_field: &str,
    kind: AggregationKind,
    row_limit: RowLimit,
) -> AggregatedSeries {
    try_aggregate(rows, x_field, y_field, kind, row_limit)
        .map(|report| report.series)
        .unwrap_or_default()
}

/// Same as [`aggregate`], but reports why the result is empty
pub fn try_aggregate(
    rows: &[Row],
    x_field: &str,
    y_field: &str,
    kind: AggregationKind,
    row_limit: RowLimit,
) -> Result<AggregateReport, FallbackReason> {
    if rows.is_empty() {
        return Err(FallbackReason::EmptyInput("dataset has no rows".to_string()));
    }
    if x_field.is_empty() || y_field.is_empty() {
        return Err(FallbackReason::EmptyInput("no field selected".to_string()));
    }

    // 1. Group (first-seen order)
    let mut groups: IndexMap<String, GroupAccumulator> = IndexMap::new();
    let mut unparseable = 0usize;

    for row in rows {
        let key = row.get(x_field).category_label();
        let value = match coerce(row.get(y_field)) {
            Some(v) => v,
            None => {
                // Counted as zero; the row still contributes to count and avg
                unparseable += 1;
                0.0
            }
        };
        groups.entry(key).or_default().push(value);
    }

    if unparseable > 0 {
        log::debug!(
            "aggregate {}({}) by {}: {} of {} cells not numeric",
            kind,
            y_field,
            x_field,
            unparseable,
            rows.len()
        );
    }

    // 2. Reduce
    let mut reduced: Vec<(String, f64)> = groups
        .into_iter()
        .map(|(key, acc)| {
            let value = round2(acc.reduce(kind));
            (key, value)
        })
        .collect();

    // 3. Largest first; sort_by is stable so ties keep first-seen order
    reduced.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    // 4. Limit
    row_limit.apply(&mut reduced);

    let (categories, values) = reduced.into_iter().unzip();

    Ok(AggregateReport {
        series: AggregatedSeries { categories, values },
        unparseable,
    })
}
