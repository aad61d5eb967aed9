use super::types::{CellValue, Table};
use crate::error::EngineError;
use bytes::Bytes;
use encoding_rs::Encoding;
use std::collections::HashSet;
use std::path::Path;

pub struct TableLoader;

impl TableLoader {
    /// Read a delimited text file into a [`Table`]. The header row defines
    /// column names verbatim; every value is kept as a raw string, deferring
    /// type decisions to downstream components.
    pub fn load_path(path: &Path, encoding_label: &str, delimiter: &str) -> Result<Table, EngineError> {
        let start = std::time::Instant::now();
        tracing::info!("Loading table from {}", path.display());

        let data = Bytes::from(std::fs::read(path)?);
        let table = Self::load_bytes(&data, encoding_label, delimiter)?;

        tracing::info!(
            "Loaded {} rows x {} columns in {:?}",
            table.num_rows(),
            table.columns.len(),
            start.elapsed()
        );
        Ok(table)
    }

    pub fn load_bytes(data: &Bytes, encoding_label: &str, delimiter: &str) -> Result<Table, EngineError> {
        let encoding = Encoding::for_label(encoding_label.as_bytes()).ok_or_else(|| {
            EngineError::Decode(format!("unknown encoding label '{}'", encoding_label))
        })?;

        let (text, _, had_errors) = encoding.decode(data);
        if had_errors {
            return Err(EngineError::Decode(format!(
                "input is not valid {}",
                encoding.name()
            )));
        }

        let delim = Self::delimiter_byte(delimiter)?;

        if text.trim().is_empty() {
            return Err(EngineError::EmptyFile("file holds no data".to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delim)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| EngineError::Format(format!("failed to read header row: {}", e)))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut seen = HashSet::new();
        for name in &headers {
            if !seen.insert(name.as_str()) {
                return Err(EngineError::Format(format!(
                    "duplicate column name '{}' in header",
                    name
                )));
            }
        }

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record =
                record.map_err(|e| EngineError::Format(format!("malformed record: {}", e)))?;
            if record.len() != headers.len() {
                return Err(EngineError::Format(format!(
                    "row {} has {} fields, header has {}",
                    line + 1,
                    record.len(),
                    headers.len()
                )));
            }
            rows.push(
                record
                    .iter()
                    .map(|field| CellValue::Str(field.to_string()))
                    .collect(),
            );
        }

        if rows.is_empty() {
            return Err(EngineError::EmptyFile("file holds no data rows".to_string()));
        }

        Ok(Table {
            columns: headers,
            rows,
        })
    }

    pub(crate) fn delimiter_byte(delimiter: &str) -> Result<u8, EngineError> {
        let bytes = delimiter.as_bytes();
        if bytes.len() != 1 {
            return Err(EngineError::Format(format!(
                "delimiter must be a single byte, got '{}'",
                delimiter
            )));
        }
        Ok(bytes[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(text: &str) -> Result<Table, EngineError> {
        TableLoader::load_bytes(&Bytes::from(text.to_string()), "utf-8", ",")
    }

    #[test]
    fn loads_headers_and_raw_rows() {
        let table = load("id,name\n1,ana\n2,bo\n").unwrap();
        assert_eq!(table.columns, vec!["id", "name"]);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.rows[0][0], CellValue::Str("1".into()));
        assert_eq!(table.rows[1][1], CellValue::Str("bo".into()));
    }

    #[test]
    fn semicolon_delimiter() {
        let table =
            TableLoader::load_bytes(&Bytes::from("a;b\n1;2\n".to_string()), "utf-8", ";").unwrap();
        assert_eq!(table.columns, vec!["a", "b"]);
        assert_eq!(table.rows[0][1], CellValue::Str("2".into()));
    }

    #[test]
    fn ragged_row_is_format_error() {
        let err = load("a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, EngineError::Format(_)), "{err}");
    }

    #[test]
    fn duplicate_header_is_format_error() {
        let err = load("a,a\n1,2\n").unwrap_err();
        assert!(matches!(err, EngineError::Format(_)), "{err}");
    }

    #[test]
    fn empty_input_and_header_only_are_empty_file_errors() {
        assert!(matches!(load(""), Err(EngineError::EmptyFile(_))));
        assert!(matches!(load("a,b\n"), Err(EngineError::EmptyFile(_))));
    }

    #[test]
    fn unknown_encoding_label_is_decode_error() {
        let err =
            TableLoader::load_bytes(&Bytes::from("a\n1\n".to_string()), "no-such-enc", ",")
                .unwrap_err();
        assert!(matches!(err, EngineError::Decode(_)));
    }

    #[test]
    fn invalid_utf8_is_decode_error() {
        let err = TableLoader::load_bytes(&Bytes::from(vec![0x61, 0xff, 0xfe]), "utf-8", ",")
            .unwrap_err();
        assert!(matches!(err, EngineError::Decode(_)));
    }

    #[test]
    fn multi_byte_delimiter_is_format_error() {
        let err = TableLoader::load_bytes(&Bytes::from("a\n1\n".to_string()), "utf-8", "||")
            .unwrap_err();
        assert!(matches!(err, EngineError::Format(_)));
    }
}
