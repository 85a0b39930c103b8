//! Domain-specific error types for the setup engine.
//!
//! Internal modules return typed errors (e.g., [`ReconcileError`],
//! [`ConfigError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! SetupError
//! ├── Reconcile(ReconcileError): reading, writing and gating settings
//! ├── Config(ConfigError): TOML parsing, root resolution
//! └── Platform(PlatformError): OS-specific operation failures
//! ```

use thiserror::Error;

/// Top-level error type for the setup engine.
#[derive(Error, Debug)]
pub enum SetupError {
    /// A setting could not be reconciled.
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Configuration-related error (parsing, I/O, invalid values).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Platform-specific operation error.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Failure kinds produced while reconciling a single setting.
///
/// `NotFound` is not a failure from the reconciler's point of view: it means
/// the setting is absent and will be written.  Every other kind ends up in
/// [`ReconcileResult::error`](crate::reconcile::ReconcileResult::error).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// The setting does not currently exist.
    #[error("{setting} not found")]
    NotFound {
        /// Description of the absent setting.
        setting: String,
    },

    /// The current value could not be determined.
    #[error("failed to read {setting}: {reason}")]
    ReadFailed {
        /// Description of the setting.
        setting: String,
        /// Underlying failure.
        reason: String,
    },

    /// Applying the target value failed.
    #[error("failed to write {setting}: {reason}")]
    WriteFailed {
        /// Description of the setting.
        setting: String,
        /// Underlying failure.
        reason: String,
    },

    /// A tool the setting depends on is not available.
    #[error("required program '{program}' not found on PATH")]
    PreconditionMissing {
        /// Program that must be on `PATH`.
        program: String,
    },

    /// An interactive prompt was declined or input ended.
    #[error("user aborted: {question}")]
    UserAborted {
        /// The question that went unanswered.
        question: String,
    },
}

impl ReconcileError {
    /// Build a [`ReconcileError::NotFound`] for `setting`.
    #[must_use]
    pub fn not_found(setting: impl Into<String>) -> Self {
        Self::NotFound {
            setting: setting.into(),
        }
    }

    /// Build a [`ReconcileError::ReadFailed`] from any displayable failure.
    #[must_use]
    pub fn read_failed(setting: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::ReadFailed {
            setting: setting.into(),
            reason: reason.to_string(),
        }
    }

    /// Return `true` if this error means "absent" rather than a failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors that arise from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A version string could not be parsed.
    #[error("invalid version '{0}': expected dotted numeric components")]
    InvalidVersion(String),

    /// The configuration root could not be located.
    #[error("cannot determine configuration root: {0}")]
    RootNotFound(String),

    /// A config file could not be parsed.
    #[error("invalid TOML in {file}: {message}")]
    InvalidSyntax {
        /// File that failed to parse.
        file: String,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from platform-specific operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The requested operation is not supported on the current platform.
    #[error("{operation} is not supported on {platform}")]
    Unsupported {
        /// Operation that was attempted (e.g., `"registry access"`).
        operation: String,
        /// Name of the platform (e.g., `"linux"`).
        platform: String,
    },

    /// Platform detection failed.
    #[error("platform detection failed: {0}")]
    DetectionFailed(String),
}
