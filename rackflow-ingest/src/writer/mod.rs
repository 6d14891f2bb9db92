//! Record writer boundary
//!
//! The downstream tracker is reached only through [`RecordWriter`]. The
//! writer is borrowed mutably for a whole run, so records are always
//! written one at a time.

pub mod json_lines;
pub mod layout;

pub use json_lines::JsonLinesWriter;
pub use layout::{write_field_map, RecordWarning, OPTION_NOT_FOUND};

use async_trait::async_trait;
use thiserror::Error;

/// A single record could not be written
#[derive(Debug, Error)]
pub enum WriteError {
    /// Target record has no field with this name
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// Value rejected by the field
    #[error("Invalid value for \"{field}\": {value}")]
    InvalidValue { field: String, value: String },

    /// Field operation issued before `create_record`
    #[error("No record is open")]
    NoOpenRecord,

    /// A step did not finish in time
    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Outcome of choosing an option on a single-choice field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumSelection {
    /// Option chosen
    Selected,
    /// Field does not offer the option; left unset
    NotOffered { available: Vec<String> },
    /// Nothing requested (empty option label); field untouched
    Skipped,
}

/// Destination tracker operations
///
/// Every method may fail; a failure aborts only the current record.
#[async_trait]
pub trait RecordWriter: Send {
    /// Return to a neutral state (close any record left open)
    async fn prepare(&mut self) -> Result<(), WriteError> {
        Ok(())
    }

    /// Start a new record with the given display name
    async fn create_record(&mut self, name: &str) -> Result<(), WriteError>;

    /// Resolve once the new record accepts field edits. Callers bound this
    /// with a timeout.
    async fn wait_until_ready(&mut self) -> Result<(), WriteError> {
        Ok(())
    }

    async fn set_text_field(&mut self, field: &str, value: &str) -> Result<(), WriteError>;

    /// Choose `option` on a single-choice field. An option the field does
    /// not offer must yield [`EnumSelection::NotOffered`], not an error.
    async fn set_enum_field(&mut self, field: &str, option: &str) -> Result<EnumSelection, WriteError>;

    /// Set a date-only field from `MM/DD/YYYY`
    async fn set_date_field(&mut self, field: &str, month_day_year: &str) -> Result<(), WriteError>;

    /// Commit the open record
    async fn finish_record(&mut self) -> Result<(), WriteError> {
        Ok(())
    }
}
