//! CSV reader with encoding and delimiter auto-detection.
//!
//! Produces records as ordered JSON objects keyed by header. Every cell is a
//! `Value::String`; no trimming or typing happens here, that is the field
//! transforms' job.

use log::debug;
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// A parsed CSV record.
pub type CsvRecord = Map<String, Value>;

/// Result of parsing with metadata.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed records, one per data row
    pub records: Vec<CsvRecord>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers, in file order
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes using an encoding label. Unknown labels fall back to UTF-8.
/// Malformed sequences are replaced and a leading BOM is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let encoding = encoding_rs::Encoding::for_label(encoding.as_bytes()).unwrap_or_else(|| {
        debug!("Unknown encoding label '{}', decoding as UTF-8", encoding);
        encoding_rs::UTF_8
    });
    encoding.decode(bytes).0.into_owned()
}

/// Detect the delimiter by counting occurrences in the first line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use mold::parser::parse_str;
///
/// let (headers, rows) = parse_str("name;age\nAlice;30\nBob;25", ';').unwrap();
///
/// assert_eq!(headers, vec!["name", "age"]);
/// assert_eq!(rows[0]["age"], "30");
/// ```
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<(Vec<String>, Vec<CsvRecord>)> {
    if !delimiter.is_ascii() {
        return Err(CsvError::InvalidDelimiter(delimiter));
    }
    if content.trim().is_empty() {
        return Err(CsvError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(CsvError::NoHeaders);
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(parse_error)?;

        // A whitespace-only line reads as a single field.
        if row.len() == 1 && row[0].trim().is_empty() {
            continue;
        }

        let mut record = Map::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            let cell = row.get(i).unwrap_or("");
            record.insert(header.clone(), Value::String(cell.to_string()));
        }
        records.push(record);
    }

    Ok((headers, records))
}

fn parse_error(err: csv::Error) -> CsvError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    CsvError::Parse {
        line,
        message: err.to_string(),
    }
}

/// Parse CSV bytes, detecting the encoding and, unless given, the delimiter.
pub fn parse_bytes_auto(bytes: &[u8], delimiter: Option<char>) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::Empty);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    debug!("CSV encoding '{}', delimiter {:?}", encoding, delimiter);

    let (headers, records) = parse_str(&content, delimiter)?;
    debug!("Read {} records with {} columns", records.len(), headers.len());

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

/// Parse a CSV file, detecting the encoding and, unless given, the delimiter.
///
/// # Example
/// ```ignore
/// let result = parse_csv_file("/path/to/file.csv", None)?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// ```
pub fn parse_csv_file<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes, delimiter)
}
