//! Error types for relay-release.

use thiserror::Error;

/// Main error type for release operations.
#[derive(Error, Debug)]
pub enum ReleaseError {
    // Cli args errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Unknown action: '{0}' (expected 'prerelease' or 'postrelease')")]
    UnknownAction(String),

    // Repository identity errors
    #[error("Unable to resolve origin remote: {0}")]
    RemoteResolution(String),

    #[error("Git URL parse error: {0}")]
    GitUrlError(#[from] git_url_parse::GitUrlParseError),

    // Version errors
    #[error("No published release found")]
    NoPriorRelease,

    #[error("Invalid version format: {0}")]
    InvalidVersionFormat(String),

    #[error("Semver error: {0}")]
    SemverError(#[from] semver::Error),

    // Forge/Git errors
    #[error("Failed to delete tag {tag}: {reason}")]
    TagDeletion { tag: String, reason: String },

    #[error("Failed to publish release {tag}: {reason}")]
    Publish { tag: String, reason: String },

    #[error("Forge operation failed: {0}")]
    ForgeError(String),

    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    #[error("Git operation failed: {0}")]
    GitError(#[from] git2::Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using ReleaseError
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a forge error with context
    pub fn forge(msg: impl Into<String>) -> Self {
        Self::ForgeError(msg.into())
    }

    /// Create an invalid args error
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }

    /// Create a remote resolution error
    pub fn remote_resolution(msg: impl Into<String>) -> Self {
        Self::RemoteResolution(msg.into())
    }

    /// Create a tag deletion error
    pub fn tag_deletion(tag: impl Into<String>, reason: impl ToString) -> Self {
        Self::TagDeletion {
            tag: tag.into(),
            reason: reason.to_string(),
        }
    }

    /// Wrap any failure that happens while publishing a release
    pub fn publish(tag: impl Into<String>, reason: impl ToString) -> Self {
        Self::Publish {
            tag: tag.into(),
            reason: reason.to_string(),
        }
    }
}

// Implement From for std::io::Error - wraps in Other variant for generic I/O errors
impl From<std::io::Error> for ReleaseError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

// Implement From for octocrab errors (GitHub API)
impl From<octocrab::Error> for ReleaseError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("rate limit") =>
            {
                Self::RateLimitExceeded
            }
            _ => Self::ForgeError(format!("GitHub API error: {}", err)),
        }
    }
}
