//! Driver errors

use comfyq_doc::DocumentError;
use comfyq_edit::EditError;
use std::path::PathBuf;

/// Anything that stops a run before (or while) writing output
///
/// None of these leave a partial output file behind.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Invalid options
    #[error("configuration error: {0}")]
    Config(#[from] EditError),

    /// Input file could not be read
    #[error("cannot read {}", path.display())]
    Read {
        /// Input path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Input is not a usable document, or output could not be serialized
    #[error("cannot process {}", path.display())]
    Document {
        /// Document path
        path: PathBuf,
        /// Underlying document error
        #[source]
        source: DocumentError,
    },

    /// Output file could not be written
    #[error("cannot write {}", path.display())]
    Write {
        /// Output path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Argument value clap could not reject on its own
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl DriverError {
    /// Process exit code for this error
    #[inline]
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        1
    }
}
