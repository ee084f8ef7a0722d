//! Spawner error taxonomy

use crate::foundation::collections::ObjectId;
use crate::host::HostError;

/// Errors that can occur while spawning or managing objects
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    /// The path's extension does not map to any object kind
    #[error("unsupported resource format: {path}")]
    UnsupportedFormat {
        /// Offending path
        path: String,
    },

    /// The caller passed something the registry refuses to track
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required native function is missing; the host binary changed
    #[error("native entry point `{0}` could not be resolved")]
    NativeEntryPointMissing(&'static str),

    /// Native creation failed; the handle was left empty
    #[error("failed to create native object for {path}: {source}")]
    NativeCreationFailed {
        /// Resource path
        path: String,
        /// Host failure
        source: HostError,
    },

    /// Native teardown failed; teardown continued anyway
    #[error("failed to dispose native object for {path}: {source}")]
    DisposalFault {
        /// Resource path
        path: String,
        /// Host failure
        source: HostError,
    },

    /// No object is registered under the key
    #[error("no object registered under {0:?}")]
    UnknownObject(ObjectId),
}

impl SpawnError {
    /// Classify a failed native creation call
    ///
    /// A missing entry point stays fatal; every other failure is logged here
    /// and reported as `Ok(None)` so the caller keeps an inert handle.
    pub(crate) fn from_creation<T>(path: &str, result: Result<T, HostError>) -> Result<Option<T>, Self> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(HostError::EntryPointMissing(name)) => Err(Self::NativeEntryPointMissing(name)),
            Err(source) => {
                let error = Self::NativeCreationFailed {
                    path: path.to_string(),
                    source,
                };
                log::error!("{error}");
                Ok(None)
            }
        }
    }

    /// Log a failed native teardown step and carry on
    pub(crate) fn log_disposal(path: &str, result: Result<(), HostError>) {
        if let Err(source) = result {
            let error = Self::DisposalFault {
                path: path.to_string(),
                source,
            };
            log::error!("{error}");
        }
    }
}
