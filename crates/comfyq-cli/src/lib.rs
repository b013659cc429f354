//! comfyq command-line driver
//!
//! Parses arguments into validated options, runs one transform over a queue
//! document, prints a report and writes the result atomically.
//!
//! # Example
//!
//! ```rust,ignore
//! use comfyq_cli::{run_reframe, ReframeOptions};
//!
//! let report = run_reframe(&ReframeOptions::new("queue.json", 145).with_dry_run(true))?;
//! print!("{}", report.render_text());
//! ```

#![warn(unreachable_pub)]

mod cli;
mod driver;
mod error;
mod logging;
mod options;

pub use cli::{command, invocation, verbosity, Invocation, Verbosity};
pub use driver::{load, run, run_reframe, run_reseed, write_document, RunReport};
pub use error::DriverError;
pub use logging::{init_tracing, level_for};
pub use options::{default_output_path, ReframeOptions, ReseedOptions};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
