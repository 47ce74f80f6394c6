use std::path::PathBuf;

use crate::inventory::InventoryError;

/// Everything that can end a query
///
/// Configuration problems surface before the first row. File errors carry the path of the file
/// that failed; the underlying cause is available through [std::error::Error::source].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Configuration(String),
    #[error("invalid connection config")]
    ConnectionConfig(#[from] hcl::Error),
    #[error("invalid glob pattern {pattern:?}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse inventory {}", path.display())]
    Inventory {
        path: PathBuf,
        #[source]
        source: InventoryError,
    },
    #[error("failed to unmarshal file content {}", path.display())]
    Playbook {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl Error {
    /// Missing or unusable configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_) | Error::ConnectionConfig(_) | Error::Pattern { .. }
        )
    }

    /// Malformed file content
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Inventory { .. } | Error::Playbook { .. })
    }

    /// The file this error is about, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Error::Io { path, .. } | Error::Inventory { path, .. } | Error::Playbook { path, .. } => {
                Some(path)
            }
            Error::Configuration(_) | Error::ConnectionConfig(_) | Error::Pattern { .. } => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
