use serde_json::{json, Value};
use thiserror::Error;

/// Failure kinds reported by the engine. Display strings carry the kind name
/// so the boundary envelope stays self-describing.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("DecodeError: {0}")]
    Decode(String),
    #[error("FormatError: {0}")]
    Format(String),
    #[error("EmptyFileError: {0}")]
    EmptyFile(String),
    #[error("UnknownColumnError: {0}")]
    UnknownColumn(String),
    #[error("ColumnTypeError: {0}")]
    ColumnType(String),
    #[error("InsufficientDataError: {0}")]
    InsufficientData(String),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Format(err.to_string())
    }
}

impl EngineError {
    /// JSON body the external layer receives when an operation fails.
    pub fn failure_body(&self) -> Value {
        json!({
            "success": false,
            "error": self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_kind_name() {
        let err = EngineError::UnknownColumn("no column 'age'".to_string());
        assert_eq!(err.to_string(), "UnknownColumnError: no column 'age'");
    }

    #[test]
    fn failure_body_shape() {
        let err = EngineError::EmptyFile("no data rows".to_string());
        let body = err.failure_body();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "EmptyFileError: no data rows");
    }
}
