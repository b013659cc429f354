//! Run options
//!
//! Plain option structs filled from the command line (or built directly in
//! tests), validated into engine types before any file is touched.

use comfyq_doc::SectionFilter;
use comfyq_edit::{EditError, FrameCount, ModeParams, SeedMode, SeedPolicy, SeedScope};
use std::path::{Path, PathBuf};

/// Options for `comfyq reframe`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReframeOptions {
    /// Input document
    pub input: PathBuf,
    /// Requested frame count, unvalidated
    pub frames: i64,
    /// Output path; derived from the input when unset
    pub output: Option<PathBuf>,
    /// Report only
    pub dry_run: bool,
    /// Print the report as JSON
    pub json: bool,
}

impl ReframeOptions {
    /// Options for `input` and `frames`
    #[must_use]
    pub fn new(input: impl Into<PathBuf>, frames: i64) -> Self {
        Self {
            input: input.into(),
            frames,
            ..Self::default()
        }
    }

    /// Set output path
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Enable dry run
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable JSON report
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Validated frame count
    ///
    /// # Errors
    /// Returns [`EditError::InvalidFrameCount`] for zero or negative counts
    pub fn frame_count(&self) -> Result<FrameCount, EditError> {
        FrameCount::try_from(self.frames)
    }

    /// Where the result goes
    #[must_use]
    pub fn output_path(&self, frames: FrameCount) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input, frames))
    }
}

/// `<stem>.frames<N><ext>` beside `input`, with `.json` when it has no extension
#[must_use]
pub fn default_output_path(input: &Path, frames: FrameCount) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "queue".into(), |s| s.to_string_lossy());
    let ext = input
        .extension()
        .map_or_else(|| "json".into(), |e| e.to_string_lossy());
    input.with_file_name(format!("{stem}.frames{frames}.{ext}"))
}

/// Options for `comfyq reseed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReseedOptions {
    /// Input document
    pub input: PathBuf,
    /// Output document
    pub output: PathBuf,
    /// Seed mode
    pub mode: SeedMode,
    /// Mode-specific parameters
    pub params: ModeParams,
    /// Section names to restrict to; empty means running and pending
    pub sections: Vec<String>,
    /// Report only
    pub dry_run: bool,
    /// Print the report as JSON
    pub json: bool,
}

impl Default for ReseedOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::new(),
            mode: SeedMode::Random,
            params: ModeParams::default(),
            sections: Vec::new(),
            dry_run: false,
            json: false,
        }
    }
}

impl ReseedOptions {
    /// Options for a `mode` run from `input` to `output`
    #[must_use]
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, mode: SeedMode) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            mode,
            ..Self::default()
        }
    }

    /// Set generator seed (random mode)
    #[must_use]
    pub fn with_rng_seed(mut self, rng_seed: u64) -> Self {
        self.params.rng_seed = Some(rng_seed);
        self
    }

    /// Set counter start (increment mode)
    #[must_use]
    pub fn with_start(mut self, start: u64) -> Self {
        self.params.start = Some(start);
        self
    }

    /// Set counter step (increment mode)
    #[must_use]
    pub fn with_step(mut self, step: u64) -> Self {
        self.params.step = Some(step);
        self
    }

    /// Set counter scope (increment mode)
    #[must_use]
    pub fn with_scope(mut self, scope: SeedScope) -> Self {
        self.params.scope = Some(scope);
        self
    }

    /// Restrict to the named sections
    #[must_use]
    pub fn with_sections<I, S>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections = sections.into_iter().map(Into::into).collect();
        self
    }

    /// Enable dry run
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable JSON report
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Validated seed policy
    ///
    /// # Errors
    /// Returns error for cross-mode options or a zero step
    pub fn policy(&self) -> Result<SeedPolicy, EditError> {
        SeedPolicy::from_parts(self.mode, self.params)
    }

    /// Validated section filter; failed jobs are left alone unless named
    ///
    /// # Errors
    /// Returns [`EditError::UnknownSection`] for an unrecognized name
    pub fn section_filter(&self) -> Result<SectionFilter, EditError> {
        if self.sections.is_empty() {
            return Ok(SectionFilter::Active);
        }
        Ok(SectionFilter::from_names(&self.sections)?)
    }
}
