use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeCmpError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file type: {}", path.display())]
    UnsupportedFileType { path: PathBuf },

    #[error("Invalid relative path: {0}")]
    InvalidPath(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TreeCmpError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The filesystem path the error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. } | Self::UnsupportedFileType { path } => Some(path),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TreeCmpError>;
