//! comfyq transforms
//!
//! Batch edits over a [`comfyq_doc::QueueDocument`]. Each transform mutates the
//! document in place and returns a [`ChangeSet`] describing every write and
//! every skipped field.
//!
//! # Core Concepts
//!
//! - [`reframe`]: set the video length and rename output prefixes to match
//! - [`reseed`]: assign sampler seeds from a [`SeedSource`]
//! - [`SeedPolicy`]: validated mode and parameters, turned into a source per run
//! - [`ChangeSet`]: field-level changes and warnings, identical for dry runs
//!
//! # Example
//!
//! ```rust,ignore
//! use comfyq_doc::{QueueDocument, SectionFilter};
//! use comfyq_edit::{reseed, ModeParams, SeedMode, SeedPolicy};
//!
//! let mut doc = QueueDocument::parse(&text)?;
//! let policy = SeedPolicy::from_parts(SeedMode::Increment, ModeParams::default())?;
//! let mut seeds = policy.into_source()?;
//! let changes = reseed(&mut doc, &mut seeds, &SectionFilter::All)?;
//! for change in changes.effective() {
//!     println!("{change}");
//! }
//! ```

#![warn(unreachable_pub)]

mod change;
mod error;
mod prefix;
mod reframe;
mod reseed;
mod seed;

pub use change::{ChangeSet, FieldChange, FieldIssue, FieldWarning, NodeRef};
pub use error::EditError;
pub use prefix::rewrite_prefix;
pub use reframe::{
    reframe, FrameCount, LENGTH_INPUT, LENGTH_WIDGET_SLOT, PREFIX_INPUT, PREFIX_WIDGET_SLOT,
};
pub use reseed::{reseed, SEED_INPUT};
pub use seed::{
    CounterSeeds, ModeParams, PolicySource, RandomSeeds, SeedMode, SeedPolicy, SeedScope,
    SeedSource, MAX_RANDOM_SEED,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
