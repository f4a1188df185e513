use thiserror::Error;

/// Errors surfaced when requesting a new puzzle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// No pyramid with a small enough apex was found within the attempt budget
    #[error(
        "no valid pyramid found: a {rows}-row pyramid stayed above {top_max} for {attempts} attempts, \
         raise the top limit or use fewer rows"
    )]
    GenerationExhausted {
        rows: usize,
        top_max: u32,
        attempts: usize,
    },
    /// The requested settings were rejected before generation
    #[error(transparent)]
    InvalidSettings(#[from] SettingsError),
}

/// A rejected puzzle setting, carrying the offending value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("rows must be between 3 and 20 (got {0})")]
    Rows(f64),
    #[error("difficulty must be between 1 and 5 (got {0})")]
    Difficulty(f64),
    #[error("the top limit must be a positive whole number (got {0})")]
    TopMax(f64),
}

/// Failure inside a storage backend
///
/// These never reach gameplay: [`crate::storage::save_record`] and
/// [`crate::storage::load_record`] log and drop them.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("record could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage backend unavailable: {0}")]
    Backend(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
