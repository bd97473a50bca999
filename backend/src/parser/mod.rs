//! CSV reading with encoding and delimiter auto-detection.
//!
//! Produces a [`RawTable`] of string cells addressed by header name.
//! No restaurant-specific logic here.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;

use crate::error::{LoadError, LoadResult};

/// A decoded CSV source: header plus untyped records.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Name used in error messages ("restaurants", "countries", a file path).
    pub source_name: String,
    /// Detected encoding
    pub encoding: String,
    /// Detected delimiter
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
    /// Data rows, in file order
    pub records: Vec<StringRecord>,
}

impl RawTable {
    /// Index of a contract column.
    pub fn column(&self, name: &str) -> LoadResult<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn {
                source_name: self.source_name.clone(),
                column: name.to_string(),
            })
    }

    /// Index of a column the dataset may or may not carry.
    pub fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Check every name is present before any row is read.
    pub fn require(&self, names: &[&str]) -> LoadResult<()> {
        for name in names {
            self.column(name)?;
        }
        Ok(())
    }
}

/// Cell spellings read as missing, matching the usual dataframe defaults.
pub const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// True for an empty cell or one of [`NA_TOKENS`].
pub fn is_missing(raw: &str) -> bool {
    raw.is_empty() || NA_TOKENS.contains(&raw)
}

/// Cell text, or `None` for an absent or missing cell.
pub fn cell(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| record.get(i)).filter(|s| !is_missing(s))
}

/// Cell text as an owned string.
pub fn cell_string(record: &StringRecord, idx: Option<usize>) -> Option<String> {
    cell(record, idx).map(String::from)
}

/// Cell parsed as a finite `f64`. Missing cells are `None`; anything else must parse.
pub fn cell_f64(table: &RawTable, record: &StringRecord, idx: usize) -> LoadResult<Option<f64>> {
    match cell(record, Some(idx)) {
        None => Ok(None),
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            _ => Err(invalid_value(table, record, idx, raw)),
        },
    }
}

/// Cell parsed as a required `i64` key.
pub fn cell_i64(table: &RawTable, record: &StringRecord, idx: usize) -> LoadResult<i64> {
    let raw = cell(record, Some(idx)).unwrap_or("");
    raw.parse::<i64>()
        .map_err(|_| invalid_value(table, record, idx, raw))
}

fn invalid_value(table: &RawTable, record: &StringRecord, idx: usize, raw: &str) -> LoadError {
    LoadError::InvalidValue {
        source_name: table.source_name.clone(),
        line: record.position().map(|p| p.line()).unwrap_or(0),
        column: table.headers.get(idx).cloned().unwrap_or_default(),
        value: raw.to_string(),
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // Unknown charset: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
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

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8], source_name: &str) -> LoadResult<RawTable> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    parse_str(&content, delimiter, encoding, source_name)
}

/// Parse CSV file with auto-detection of encoding and delimiter.
pub fn parse_file_auto<P: AsRef<Path>>(path: P) -> LoadResult<RawTable> {
    let path = path.as_ref();
    let source_name = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|error| LoadError::Io {
        source_name: source_name.clone(),
        error,
    })?;
    parse_bytes_auto(&bytes, &source_name)
}

/// Parse decoded CSV text with an explicit delimiter.
pub fn parse_str(
    content: &str,
    delimiter: char,
    encoding: String,
    source_name: &str,
) -> LoadResult<RawTable> {
    if content.trim().is_empty() {
        return Err(LoadError::EmptySource(source_name.to_string()));
    }

    let delimiter_byte = u8::try_from(delimiter).map_err(|_| LoadError::Encoding {
        source_name: source_name.to_string(),
        message: format!("delimiter '{}' is not a single byte", delimiter),
    })?;

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let csv_error = |error: csv::Error| LoadError::Csv {
        source_name: source_name.to_string(),
        error,
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        records.push(record);
    }

    Ok(RawTable {
        source_name: source_name.to_string(),
        encoding,
        delimiter,
        headers,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(csv: &str) -> RawTable {
        parse_str(csv, detect_delimiter(csv), "utf-8".into(), "test").unwrap()
    }

    #[test]
    fn test_quoted_cells_keep_commas() {
        let table = parse("City,Cuisines\nDelhi,\"North Indian, Chinese\"\n");
        assert_eq!(table.headers, vec!["City", "Cuisines"]);
        assert_eq!(table.records.len(), 1);
        assert_eq!(&table.records[0][1], "North Indian, Chinese");
    }

    #[test]
    fn test_empty_cells_are_missing() {
        let table = parse("a,b,c\n1,,3");
        let record = &table.records[0];
        assert_eq!(cell(record, Some(0)), Some("1"));
        assert_eq!(cell(record, Some(1)), None);
        assert_eq!(cell(record, Some(9)), None);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let table = parse("a,b\n1,2\n\n3,4\n");
        assert_eq!(table.records.len(), 2);
    }

    #[test]
    fn test_missing_column_error() {
        let table = parse("City,Cuisines\nDelhi,Cafe");
        let err = table.require(&["City", "Country Code"]).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { ref column, .. } if column == "Country Code"));
    }

    #[test]
    fn test_invalid_number_reports_position() {
        let table = parse("Latitude\n28.6\nnorth\n");
        assert_eq!(cell_f64(&table, &table.records[0], 0).unwrap(), Some(28.6));
        let err = cell_f64(&table, &table.records[1], 0).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("'north'"));
    }

    #[test]
    fn test_na_tokens_are_missing() {
        let table = parse("Average Cost for two,City\nNaN,Agra\nNA,NULL\nn/a,Pune\n500,\n");
        let costs: Vec<Option<f64>> = table
            .records
            .iter()
            .map(|r| cell_f64(&table, r, 0).unwrap())
            .collect();
        assert_eq!(costs, vec![None, None, None, Some(500.0)]);
        assert_eq!(cell(&table.records[1], Some(1)), None);
        assert_eq!(cell(&table.records[0], Some(1)), Some("Agra"));
    }

    #[test]
    fn test_non_finite_number_rejected() {
        let table = parse("Average Cost for two\ninf\n-infinity\n");
        for record in &table.records {
            let err = cell_f64(&table, record, 0).unwrap_err();
            assert!(matches!(err, LoadError::InvalidValue { .. }));
        }
    }

    #[test]
    fn test_empty_source_error() {
        let err = parse_bytes_auto(b"", "restaurants").unwrap_err();
        assert!(matches!(err, LoadError::EmptySource(_)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_latin1_decoding() {
        // "São Paulo" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0xE3, 0x6F, 0x20, 0x50, 0x61, 0x75, 0x6C, 0x6F];
        assert_eq!(decode_content(bytes, "iso-8859-1"), "São Paulo");
    }
}
