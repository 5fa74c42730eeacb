use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed row {row}: field '{field}' {reason}")]
    MalformedRow {
        /// 1-based data row number (the header is not counted).
        row: usize,
        field: &'static str,
        reason: String,
    },

    #[error("failed to access {path}: {source}", path = path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("FHIR error: {0}")]
    Fhir(#[from] fhir::FhirError),
}

impl BridgeError {
    pub(crate) fn malformed_row(row: usize, field: &'static str, reason: impl Into<String>) -> Self {
        BridgeError::MalformedRow {
            row,
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BridgeError::FileAccess {
            path: path.into(),
            source,
        }
    }
}

pub type BridgeResult<T> = std::result::Result<T, BridgeError>;
