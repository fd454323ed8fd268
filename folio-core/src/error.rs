use thiserror::Error;

use crate::domain::{ChapterNumber, TitleId};

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("no session token")]
    NoToken,

    // Malformed, forged and expired tokens all collapse into this variant.
    #[error("invalid session token")]
    InvalidToken,

    #[error("title {0} not found")]
    TitleNotFound(TitleId),

    #[error("chapter {chapter} of title {title_id} not found")]
    ChapterNotFound {
        title_id: TitleId,
        chapter: ChapterNumber,
    },

    #[error("chapter {name:?} of title {title_id} not found")]
    NonCanonicalChapter { title_id: TitleId, name: String },

    #[error("persistence error: {0}")]
    Persistence(#[from] libsql::Error),

    #[error("stored data rejected: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email already registered")]
    EmailTaken,

    #[error("credential error: {0}")]
    Credential(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    Invalid(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, FolioError>;
