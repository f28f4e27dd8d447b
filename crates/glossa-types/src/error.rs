use thiserror::Error;

/// Errors produced by type construction and parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid slug {slug:?}: {reason}")]
    InvalidSlug { slug: String, reason: String },

    #[error("invalid key name {name:?}: {reason}")]
    InvalidKeyName { name: String, reason: String },

    #[error("invalid namespace {0:?}: must not contain ':'")]
    InvalidNamespace(String),

    #[error("invalid language code {0:?}")]
    InvalidLanguage(String),
}
