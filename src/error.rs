use thiserror::Error;

/// Application-level errors.
///
/// Store and filesystem failures are converted to a user-facing status line
/// at the boundary of the action that triggered them; nothing propagates past
/// the `update` loop.
#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The entity vanished between render and mutation (e.g. a second window
    /// deleted it). The caller reports it and reloads from the store.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("file type not allowed: {0}")]
    DisallowedFile(String),

    #[error("folder name cannot be empty")]
    EmptyName,

    /// A directory import found nothing on the allow-list; the store was not
    /// touched.
    #[error("no importable files found")]
    NoImportableFiles,
}

pub type Result<T> = std::result::Result<T, Error>;
