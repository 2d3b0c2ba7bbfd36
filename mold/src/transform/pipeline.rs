//! High-level pipeline: read CSV, mold every record.
//!
//! # Example
//!
//! ```rust,ignore
//! use mold::{mold_csv_file, RowConfig, RowTransform};
//! use std::path::Path;
//!
//! let row = RowTransform::new(RowConfig::from_file("fields.json")?);
//! let output = mold_csv_file(Path::new("people.csv"), &row, None)?;
//!
//! println!("Molded {} records", output.records.len());
//! ```

use log::{debug, trace};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

use super::record::Record;
use super::row::RowTransform;
use crate::error::{PipelineError, PipelineResult};
use crate::parser::{parse_bytes_auto, parse_csv_file, ParseResult};

/// CSV file information.
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Output of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct MoldOutput {
    /// Molded records, in input order
    pub records: Vec<Map<String, Value>>,
    /// CSV parsing metadata
    pub csv_info: CsvInfo,
}

/// Mold a batch of records.
///
/// Stops at the first failing record and reports its index; no partial batch
/// is returned.
pub fn mold_records<R: Record>(
    records: &[R],
    row: &RowTransform,
) -> PipelineResult<Vec<Map<String, Value>>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            trace!("Molding record {}", index);
            row.apply(record)
                .map_err(|source| PipelineError::Record { index, source })
        })
        .collect()
}

/// Mold a CSV file.
pub fn mold_csv_file(
    path: &Path,
    row: &RowTransform,
    delimiter: Option<char>,
) -> PipelineResult<MoldOutput> {
    debug!("Reading CSV file {}", path.display());
    let parsed = parse_csv_file(path, delimiter)?;
    mold_parsed(parsed, row)
}

/// Mold CSV bytes.
pub fn mold_csv_bytes(
    bytes: &[u8],
    row: &RowTransform,
    delimiter: Option<char>,
) -> PipelineResult<MoldOutput> {
    let parsed = parse_bytes_auto(bytes, delimiter)?;
    mold_parsed(parsed, row)
}

/// Mold already-parsed CSV data.
pub fn mold_parsed(parsed: ParseResult, row: &RowTransform) -> PipelineResult<MoldOutput> {
    let csv_info = CsvInfo {
        encoding: parsed.encoding,
        delimiter: parsed.delimiter,
        headers: parsed.headers,
        row_count: parsed.records.len(),
    };

    let records = mold_records(&parsed.records, row)?;
    debug!("Molded {} records", records.len());

    Ok(MoldOutput { records, csv_info })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use crate::transform::RowConfig;
    use serde_json::json;

    fn people_row() -> RowTransform {
        RowTransform::new(
            RowConfig::from_value(&json!([
                {"source": "First"},
                {"source": "Age", "type": "int", "none": "?"},
                {"source": "Amt", "target": "amount", "type": "float", "lstrip": "$"}
            ]))
            .unwrap(),
        )
    }

    #[test]
    fn test_mold_csv_bytes() {
        let csv = "First;Age;Amt\nAda;36;$1.5\nBob;?;$2\n";
        let output = mold_csv_bytes(csv.as_bytes(), &people_row(), None).unwrap();

        assert_eq!(output.csv_info.delimiter, ';');
        assert_eq!(output.csv_info.row_count, 2);
        assert_eq!(
            Value::Object(output.records[0].clone()),
            json!({"first": "Ada", "age": 36, "amount": 1.5})
        );
        assert_eq!(output.records[1]["age"], Value::Null);
        assert_eq!(output.records[1]["amount"], json!(2.0));
    }

    #[test]
    fn test_sentinels_become_null() {
        let output = mold_csv_bytes(b"First,Age,Amt\n,?,\n", &people_row(), None).unwrap();
        assert_eq!(
            Value::Object(output.records[0].clone()),
            json!({"first": null, "age": null, "amount": null})
        );

        // Age overrides its sentinel, so an empty Age cell goes through int.
        let err = mold_csv_bytes(b"First,Age,Amt\nAda,,1\n", &people_row(), None);
        assert!(matches!(err, Err(PipelineError::Record { index: 0, .. })));
    }

    #[test]
    fn test_failing_record_reports_index() {
        let csv = "First,Age,Amt\nAda,36,1\nBob,old,2\n";
        let err = mold_csv_bytes(csv.as_bytes(), &people_row(), None).unwrap_err();
        match err {
            PipelineError::Record { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(source, FieldError::TypeConversion { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_mold_records_from_json() {
        let records = vec![json!({"First": "Ada"}), json!({"First": "Bob", "Age": "7"})];
        let output = mold_records(&records, &people_row()).unwrap();
        assert_eq!(output[0]["age"], Value::Null);
        assert_eq!(output[1]["age"], json!(7));
        assert_eq!(output[1]["amount"], Value::Null);
    }

    #[test]
    fn test_mold_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.csv");
        std::fs::write(&path, "First,Age,Amt\nAda,36,$3\n").unwrap();

        let output = mold_csv_file(&path, &people_row(), Some(',')).unwrap();
        assert_eq!(output.csv_info.headers, vec!["First", "Age", "Amt"]);
        assert_eq!(output.records[0]["amount"], json!(3.0));
    }
}
