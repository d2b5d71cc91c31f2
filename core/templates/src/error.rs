use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Not a directory: {0:?}")]
    NotADirectory(PathBuf),
    #[error(transparent)]
    Ini(#[from] gameini::Error),
    #[error("Invalid loader options: {0}")]
    Options(#[from] serde_json::Error),
    #[error("Unknown record kind `{0}` (expected object, weapon or armor)")]
    UnknownRecordKind(String),
}

pub type Result<T> = std::result::Result<T, Error>;
