//! Error types for comfyq transforms
//!
//! Every variant here is a configuration error: it is detected before (or
//! instead of) producing an output document, and the caller must not write
//! anything. Per-node problems are not errors; see [`crate::FieldWarning`].

use comfyq_doc::UnknownSection;

/// Transform configuration error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// Frame count is zero or negative
    #[error("frame count must be a positive integer, got {0}")]
    InvalidFrameCount(i64),

    /// Increment step of zero would never advance
    #[error("increment step must not be zero")]
    ZeroStep,

    /// Mode name not recognized
    #[error("unknown reseed mode: {0} (expected random or increment)")]
    UnknownMode(String),

    /// Scope name not recognized
    #[error("unknown reseed scope: {0} (expected global or job)")]
    UnknownScope(String),

    /// Section name not recognized
    #[error(transparent)]
    UnknownSection(#[from] UnknownSection),

    /// Option given for a mode it does not apply to
    #[error("{option} only applies to {applies_to} mode")]
    IncompatibleOption {
        /// Offending option
        option: &'static str,
        /// Mode the option belongs to
        applies_to: &'static str,
    },

    /// Increment counter ran past `u64::MAX`
    #[error("seed counter overflowed after {assigned} assignment(s) (start {start}, step {step})")]
    SeedOverflow {
        /// Counter start
        start: u64,
        /// Counter step
        step: u64,
        /// Seeds handed out before the overflow
        assigned: u64,
    },
}
