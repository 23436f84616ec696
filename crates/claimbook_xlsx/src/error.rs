//! Ledger generation error types.

use thiserror::Error;

/// Result type for ledger generation.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Errors raised while planning, assembling or persisting a ledger workbook.
///
/// Every variant is terminal for the run; nothing is retried.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Geometry constants, column spec or document names are inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A creditor record (or its source) is missing required fields.
    #[error("Input validation error: {0}")]
    InputValidation(String),

    /// The xlsx serializer rejected the document.
    #[error("Serialization error: {0}")]
    Serialization(#[from] rust_xlsxwriter::XlsxError),

    /// Writing the serialized workbook to disk failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn input_validation(msg: impl Into<String>) -> Self {
        Self::InputValidation(msg.into())
    }
}
