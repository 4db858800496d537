use std::io;
use std::path::{Path, PathBuf};

/// Failure classes a run can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Nothing was touched yet: unsafe directory or incompatible releases.
    Precondition,
    /// A feed or download could not be reached or answered with an error status.
    Network,
    /// A response was reachable but did not contain what we expected.
    Parse,
    /// Extraction, move or delete failed during installation.
    Filesystem,
}

/// Errors that can abort a setup run.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(
        "{provider} is detected in {}. Please move the setup file to a different location before running it.",
        path.display()
    )]
    UnsafeLocation { provider: String, path: PathBuf },

    #[error(
        "plugin release {plugin} does not match base release {base}: the plugins for the latest stable build have not been released yet"
    )]
    VersionMismatch { plugin: String, base: String },

    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("unexpected response from {url}: {message}")]
    Parse { url: String, message: String },

    #[error("no download link found on {page}")]
    NoDownloadLink { page: String },

    #[error("failed to {action} {}: {source}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to extract {}: {message}", archive.display())]
    Extraction { archive: PathBuf, message: String },

    #[error("failed to terminate running {name} processes: {message}")]
    Process { name: String, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to expand '{template}': {message}")]
    Template { template: String, message: String },
}

impl SetupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SetupError::UnsafeLocation { .. }
            | SetupError::VersionMismatch { .. }
            | SetupError::Process { .. }
            | SetupError::Config(_)
            | SetupError::Template { .. } => ErrorKind::Precondition,
            SetupError::Network { .. } => ErrorKind::Network,
            SetupError::Parse { .. } | SetupError::NoDownloadLink { .. } => ErrorKind::Parse,
            SetupError::Filesystem { .. } | SetupError::Extraction { .. } => {
                ErrorKind::Filesystem
            }
        }
    }

    pub(crate) fn fs(action: &'static str, path: &Path, source: io::Error) -> Self {
        SetupError::Filesystem {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(url: &str, message: impl Into<String>) -> Self {
        SetupError::Parse {
            url: url.to_string(),
            message: message.into(),
        }
    }
}

pub type SetupResult<T> = Result<T, SetupError>;
