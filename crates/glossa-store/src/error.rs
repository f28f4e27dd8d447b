use rusqlite::ErrorCode;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique or primary-key constraint rejected a write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A foreign-key constraint rejected a write (dangling reference).
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// A stored row could not be decoded.
    #[error("corrupt row in {table}: {reason}")]
    CorruptRow { table: &'static str, reason: String },

    /// The connection mutex was poisoned by a panicking holder.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// I/O error while preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other SQLite failure.
    #[error("sqlite: {0}")]
    Sql(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, message) = &err {
            if code.code == ErrorCode::ConstraintViolation {
                let detail = message.clone().unwrap_or_else(|| err.to_string());
                if detail.contains("FOREIGN KEY") {
                    return Self::ForeignKeyViolation(detail);
                }
                if detail.contains("UNIQUE") || detail.contains("PRIMARY KEY") {
                    return Self::UniqueViolation(detail);
                }
            }
        }
        Self::Sql(err)
    }
}

impl StoreError {
    /// Returns `true` if this error came from a unique constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
