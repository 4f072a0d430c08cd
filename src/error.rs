use thiserror::Error;

/// Errors raised by a record store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown column '{column}' for collection '{collection}'")]
    UnknownColumn { collection: String, column: String },

    #[error("Record already exists: {0}")]
    Conflict(String),

    #[error("Could not decode record: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by tracker operations. None of them is fatal.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Area not found: {0}")]
    AreaNotFound(String),

    #[error("Halqa not found: {0}")]
    HalqaNotFound(String),

    #[error("Meeting not found: {0}")]
    MeetingNotFound(String),

    #[error("No halqa or meeting matches '{0}'")]
    TargetNotFound(String),

    #[error("Admin session required")]
    Unauthorized,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl TrackerError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TrackerError::AreaNotFound(_)
                | TrackerError::HalqaNotFound(_)
                | TrackerError::MeetingNotFound(_)
                | TrackerError::TargetNotFound(_)
        )
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
