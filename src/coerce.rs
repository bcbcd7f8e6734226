//! Numeric coercion of raw cells.
//!
//! Text is read with a decimal-comma convention: every `.` is a thousands
//! separator and the first `,` is the decimal point. Plain `"10.5"` therefore
//! reads as `105`; datasets written with a decimal point should be delivered
//! as numbers, not text.

use crate::data::CellValue;

/// Parse a cell into a number. `None` means "not a number".
pub fn coerce(raw: &CellValue) -> Option<f64> {
    match raw {
        CellValue::Number(n) if n.is_nan() => None,
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => parse_localized(s),
        CellValue::Null => None,
    }
}

/// Aggregation policy: unparseable cells contribute zero
pub fn coerce_or_zero(raw: &CellValue) -> f64 {
    coerce(raw).unwrap_or(0.0)
}

fn parse_localized(text: &str) -> Option<f64> {
    let normalized = text.replace('.', "").replacen(',', ".", 1);
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Rust accepts "inf" and "NaN" literals; a spreadsheet cell saying so is not a number
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// True when strictly more than half of the first `sample` cells coerce
pub fn is_mostly_numeric<'a, I>(cells: I, sample: usize) -> bool
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let mut seen = 0usize;
    let mut numeric = 0usize;
    for cell in cells.into_iter().take(sample) {
        seen += 1;
        if coerce(cell).is_some() {
            numeric += 1;
        }
    }
    seen > 0 && numeric * 2 > seen
}
