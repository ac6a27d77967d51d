use thiserror::Error;

pub type PivotResult<T> = Result<T, PivotError>;

#[derive(Error, Debug)]
pub enum PivotError {
    #[error("No file or date selected: {0}")]
    MissingInput(String),

    #[error("Invalid reference date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Unsupported file '{0}' (expected .xlsx or .xls)")]
    UnsupportedFile(String),

    #[error("Error reading the file: {0}")]
    Read(String),

    #[error("File too large: {0}")]
    TooLarge(String),

    #[error("No valid data found in the file: {0}")]
    NoValidData(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("A report is already being generated")]
    Busy,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Coarse failure classes used for notifications and HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed user input; nothing was computed.
    Input,
    /// The file could not be read as a workbook.
    Unreadable,
    /// The upload exceeded the server's body limit.
    TooLarge,
    /// The workbook had no usable booking rows.
    NoData,
    /// Another report is still running.
    Busy,
    /// Anything else during transform or export.
    Internal,
}

impl PivotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PivotError::MissingInput(_)
            | PivotError::InvalidDate(_)
            | PivotError::UnsupportedFile(_) => ErrorKind::Input,
            PivotError::Read(_) => ErrorKind::Unreadable,
            PivotError::TooLarge(_) => ErrorKind::TooLarge,
            PivotError::NoValidData(_) => ErrorKind::NoData,
            PivotError::Busy => ErrorKind::Busy,
            PivotError::Export(_) | PivotError::Io(_) | PivotError::Unexpected(_) => {
                ErrorKind::Internal
            }
        }
    }
}
