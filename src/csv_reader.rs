// CSV loading for the command-line harness

use crate::data::Dataset;
use anyhow::{Context, Result};
use std::io::{self, Read};

/// Read CSV with a header row from any reader
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read CSV record {}", line + 1))?;
        records.push(record.iter().map(|s| s.to_string()).collect());
    }

    log::debug!("loaded {} rows x {} columns", records.len(), headers.len());

    Ok(Dataset::from_records(headers, records))
}

/// Read CSV data from stdin
pub fn read_csv_from_stdin() -> Result<Dataset> {
    read_csv(io::stdin().lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CellValue;

    #[test]
    fn test_read_csv() {
        let input = "city , sales\nA,10\nB,\"1.234,5\"\n";
        let data = read_csv(input.as_bytes()).unwrap();
        assert_eq!(data.columns, vec!["city", "sales"]);
        assert_eq!(data.len(), 2);
        assert_eq!(data.rows[1].get("sales"), &CellValue::Text("1.234,5".to_string()));
    }

    #[test]
    fn test_read_csv_header_only() {
        let data = read_csv("x,y\n".as_bytes()).unwrap();
        assert!(data.is_empty());
        assert_eq!(data.columns.len(), 2);
    }

    #[test]
    fn test_read_csv_ragged_rows_fail() {
        assert!(read_csv("x,y\n1,2,3\n".as_bytes()).is_err());
    }
}
