//! Load, transform, report, write
//!
//! Every run follows the same steps:
//! 1. Validate options into engine types (nothing is read before this succeeds)
//! 2. Read and parse the input document
//! 3. Apply the transform in memory
//! 4. Write the result atomically, unless this is a dry run
//!
//! The change set is computed the same way either way; a dry run only skips
//! step 4.

use comfyq_doc::{DocumentError, QueueDocument};
use comfyq_edit::{reframe, reseed, ChangeSet};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::Builder;

use crate::cli::Invocation;
use crate::error::DriverError;
use crate::options::{ReframeOptions, ReseedOptions};

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Subcommand name
    pub command: &'static str,
    /// Input document
    pub input: PathBuf,
    /// Output document (not written on a dry run)
    pub output: PathBuf,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Generator seed used in random mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
    /// Distinct nodes that received a write
    pub nodes_touched: usize,
    /// Writes that changed a value
    pub fields_changed: usize,
    /// Full change set
    pub changes: ChangeSet,
}

impl RunReport {
    fn new(
        command: &'static str,
        input: &Path,
        output: PathBuf,
        dry_run: bool,
        rng_seed: Option<u64>,
        changes: ChangeSet,
    ) -> Self {
        Self {
            command,
            input: input.to_path_buf(),
            output,
            dry_run,
            rng_seed,
            nodes_touched: changes.nodes_touched(),
            fields_changed: changes.effective_count(),
            changes,
        }
    }

    /// Human-readable report
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if self.dry_run {
            for change in self.changes.effective() {
                let _ = writeln!(out, "{change}");
            }
        }
        if let Some(seed) = self.rng_seed {
            let _ = writeln!(out, "Random seed: {seed} (replay with --rng-seed {seed})");
        }
        let _ = writeln!(
            out,
            "Summary: {} nodes touched, {} fields changed, {} warnings",
            self.nodes_touched,
            self.fields_changed,
            self.changes.warnings().len()
        );
        if self.dry_run {
            out.push_str("Dry run; no file written.\n");
        } else {
            let _ = writeln!(out, "Wrote: {}", self.output.display());
        }
        out
    }

    /// JSON report
    ///
    /// # Errors
    /// Returns error if the report cannot be serialized
    pub fn render_json(&self) -> Result<String, DriverError> {
        serde_json::to_string_pretty(self).map_err(|e| DriverError::Document {
            path: self.output.clone(),
            source: DocumentError::Serialize(e),
        })
    }
}

/// Run a parsed invocation
///
/// # Errors
/// Returns error on invalid options, unreadable input or failed write
pub fn run(invocation: &Invocation) -> Result<RunReport, DriverError> {
    match invocation {
        Invocation::Reframe(options) => run_reframe(options),
        Invocation::Reseed(options) => run_reseed(options),
    }
}

/// `comfyq reframe`
///
/// # Errors
/// Returns error on invalid options, unreadable input or failed write
pub fn run_reframe(options: &ReframeOptions) -> Result<RunReport, DriverError> {
    let frames = options.frame_count()?;
    let output = options.output_path(frames);

    let mut document = load(&options.input)?;
    let changes = reframe(&mut document, frames);

    finish(
        RunReport::new("reframe", &options.input, output, options.dry_run, None, changes),
        &document,
    )
}

/// `comfyq reseed`
///
/// # Errors
/// Returns error on invalid options, unreadable input, counter overflow or
/// failed write
pub fn run_reseed(options: &ReseedOptions) -> Result<RunReport, DriverError> {
    let policy = options.policy()?;
    let filter = options.section_filter()?;

    let mut document = load(&options.input)?;
    let mut seeds = policy.into_source()?;
    let changes = reseed(&mut document, &mut seeds, &filter)?;

    finish(
        RunReport::new(
            "reseed",
            &options.input,
            options.output.clone(),
            options.dry_run,
            seeds.rng_seed(),
            changes,
        ),
        &document,
    )
}

fn finish(report: RunReport, document: &QueueDocument) -> Result<RunReport, DriverError> {
    if report.changes.is_empty_run() {
        tracing::warn!("no field changed; output is identical to the input");
    }
    if report.dry_run {
        tracing::info!("dry run; {} not written", report.output.display());
    } else {
        write_document(&report.output, document)?;
        tracing::info!("wrote {}", report.output.display());
    }
    Ok(report)
}

/// Read and parse a queue document
///
/// # Errors
/// Returns [`DriverError::Read`] or [`DriverError::Document`]
pub fn load(path: &Path) -> Result<QueueDocument, DriverError> {
    let text = fs::read_to_string(path).map_err(|source| DriverError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("read {} bytes from {}", text.len(), path.display());
    QueueDocument::parse(&text).map_err(|source| DriverError::Document {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize `document` and replace `path` in one step
///
/// The text goes to a temporary file in the destination directory which is
/// then renamed over `path`; on failure nothing is left behind. An existing
/// `path` keeps its permissions; a new one gets the mode a plain create would
/// give it under the current umask.
///
/// # Errors
/// Returns [`DriverError::Write`] if the directory is missing or not writable
pub fn write_document(path: &Path, document: &QueueDocument) -> Result<(), DriverError> {
    let text = document.to_pretty_json().map_err(|source| DriverError::Document {
        path: path.to_path_buf(),
        source,
    })?;

    let write_err = |source: std::io::Error| DriverError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = Builder::new();
    builder.prefix(".comfyq");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut file = builder.tempfile_in(dir).map_err(write_err)?;
    if let Ok(existing) = fs::metadata(path) {
        file.as_file()
            .set_permissions(existing.permissions())
            .map_err(write_err)?;
    }
    file.write_all(text.as_bytes()).map_err(write_err)?;
    file.flush().map_err(write_err)?;
    file.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
