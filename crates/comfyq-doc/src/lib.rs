//! comfyq document model
//!
//! Tolerant, schema-free access to saved workflow queues.
//!
//! # Core Concepts
//!
//! - [`QueueDocument`]: the parsed document; unknown fields are never touched
//! - [`FieldPath`]: address of a single value, rendered as a JSON pointer
//! - [`Section`] / [`SectionFilter`]: `queue_running`, `queue_pending`, `queue_failed`
//! - [`JobEnvelope`]: one queued job, its graph and optional UI mirror
//! - [`find_nodes`]: locate nodes by declared type, paired with their UI twins
//!
//! # Example
//!
//! ```rust,ignore
//! use comfyq_doc::{find_nodes, QueueDocument, SectionFilter};
//!
//! let doc = QueueDocument::parse(&text)?;
//! for m in find_nodes(&doc, "KSampler", &SectionFilter::All).matches {
//!     println!("{} node {} at {}", m.scope, m.graph.id, m.graph.path);
//! }
//! ```

#![warn(unreachable_pub)]

// Core modules
mod document;
mod job;
mod locator;
mod node_kind;
mod path;
mod section;

// Re-exports
pub use document::{DocumentError, Layout, QueueDocument};
pub use job::{is_link, GraphNodeRef, JobEnvelope, JobScope, UiNodeRef};
pub use locator::{
    find_nodes, find_nodes_of, jobs, pair_by_ordinal, LocatedNodes, NodeMatch, OrphanUiNode,
    Pairing,
};
pub use node_kind::{NodeRole, LENGTH_SOURCE_TYPE, SAMPLER_TYPES, SAVE_OUTPUT_TYPES};
pub use path::{FieldPath, PathError};
pub use section::{Section, SectionFilter, UnknownSection};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
