//! Seed sources for the reseed transform
//!
//! A [`SeedSource`] is created for exactly one reseed run and handed to it by
//! value or `&mut`; it is never shared or stored globally, so replaying a run
//! with the same policy yields the same seeds.

use comfyq_doc::JobScope;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::EditError;

/// Largest seed drawn in random mode
pub const MAX_RANDOM_SEED: u64 = 2_147_483_647;

/// Supplies one seed per sampler node, in traversal order
pub trait SeedSource {
    /// Called before the first node of each job
    fn begin_job(&mut self, _scope: &JobScope) {}

    /// Next seed value
    ///
    /// # Errors
    /// Returns error if the source is exhausted
    fn next_seed(&mut self) -> Result<u64, EditError>;
}

/// Pseudo-random seeds from a generator seeded once per run
#[derive(Debug, Clone)]
pub struct RandomSeeds {
    rng: StdRng,
    rng_seed: u64,
}

impl RandomSeeds {
    /// Reproducible generator
    #[must_use]
    pub fn from_seed(rng_seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(rng_seed),
            rng_seed,
        }
    }

    /// Generator seeded from OS entropy
    ///
    /// The drawn seed is kept so the run can be replayed with `--rng-seed`.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }

    /// Seed the generator was created with
    #[inline]
    #[must_use]
    pub fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

impl SeedSource for RandomSeeds {
    fn next_seed(&mut self) -> Result<u64, EditError> {
        Ok(self.rng.gen_range(0..=MAX_RANDOM_SEED))
    }
}

/// Counter scope for increment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedScope {
    /// One counter across the whole document
    #[default]
    Global,
    /// Counter restarts at every job
    Job,
}

impl FromStr for SeedScope {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(Self::Global),
            "job" => Ok(Self::Job),
            other => Err(EditError::UnknownScope(other.to_string())),
        }
    }
}

impl Display for SeedScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Global => "global",
            Self::Job => "job",
        })
    }
}

/// Monotonic counter `start, start + step, ...`
#[derive(Debug, Clone)]
pub struct CounterSeeds {
    start: u64,
    step: u64,
    scope: SeedScope,
    next: Option<u64>,
    assigned: u64,
}

impl CounterSeeds {
    /// Create a counter
    ///
    /// # Errors
    /// Returns [`EditError::ZeroStep`] if `step` is zero
    pub fn new(start: u64, step: u64, scope: SeedScope) -> Result<Self, EditError> {
        if step == 0 {
            return Err(EditError::ZeroStep);
        }
        Ok(Self {
            start,
            step,
            scope,
            next: Some(start),
            assigned: 0,
        })
    }
}

impl SeedSource for CounterSeeds {
    fn begin_job(&mut self, scope: &JobScope) {
        if self.scope == SeedScope::Job {
            tracing::debug!("{}: counter reset to {}", scope, self.start);
            self.next = Some(self.start);
        }
    }

    fn next_seed(&mut self) -> Result<u64, EditError> {
        let seed = self.next.ok_or(EditError::SeedOverflow {
            start: self.start,
            step: self.step,
            assigned: self.assigned,
        })?;
        self.next = seed.checked_add(self.step);
        self.assigned += 1;
        Ok(seed)
    }
}

/// Reseed mode name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedMode {
    /// Draw from a pseudo-random generator
    Random,
    /// Count up from a start value
    Increment,
}

impl FromStr for SeedMode {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(Self::Random),
            "increment" => Ok(Self::Increment),
            other => Err(EditError::UnknownMode(other.to_string())),
        }
    }
}

impl Display for SeedMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Random => "random",
            Self::Increment => "increment",
        })
    }
}

/// Mode-specific parameters as supplied by a caller
///
/// Unset fields take the increment defaults (start 0, step 1, global scope).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeParams {
    /// `--rng-seed` (random only)
    pub rng_seed: Option<u64>,
    /// `--start` (increment only)
    pub start: Option<u64>,
    /// `--step` (increment only)
    pub step: Option<u64>,
    /// `--scope` (increment only)
    pub scope: Option<SeedScope>,
}

/// Fully validated reseed policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Random draws, optionally reproducible
    Random {
        /// Generator seed; `None` draws one from entropy
        rng_seed: Option<u64>,
    },
    /// Counter
    Increment {
        /// First value
        start: u64,
        /// Non-zero increment
        step: u64,
        /// Counter scope
        scope: SeedScope,
    },
}

impl SeedPolicy {
    /// Validate a mode together with its parameters
    ///
    /// # Errors
    /// Returns [`EditError::IncompatibleOption`] when a parameter belongs to the
    /// other mode, or [`EditError::ZeroStep`] for a zero increment
    pub fn from_parts(mode: SeedMode, params: ModeParams) -> Result<Self, EditError> {
        match mode {
            SeedMode::Random => {
                for (option, given) in [
                    ("--start", params.start.is_some()),
                    ("--step", params.step.is_some()),
                    ("--scope", params.scope.is_some()),
                ] {
                    if given {
                        return Err(EditError::IncompatibleOption {
                            option,
                            applies_to: "increment",
                        });
                    }
                }
                Ok(Self::Random {
                    rng_seed: params.rng_seed,
                })
            }
            SeedMode::Increment => {
                if params.rng_seed.is_some() {
                    return Err(EditError::IncompatibleOption {
                        option: "--rng-seed",
                        applies_to: "random",
                    });
                }
                let step = params.step.unwrap_or(1);
                if step == 0 {
                    return Err(EditError::ZeroStep);
                }
                Ok(Self::Increment {
                    start: params.start.unwrap_or(0),
                    step,
                    scope: params.scope.unwrap_or_default(),
                })
            }
        }
    }

    /// Create the single-use seed source for one run
    ///
    /// # Errors
    /// Returns [`EditError::ZeroStep`] for a hand-built zero-step policy
    pub fn into_source(self) -> Result<PolicySource, EditError> {
        match self {
            Self::Random { rng_seed: Some(seed) } => Ok(PolicySource::Random(RandomSeeds::from_seed(seed))),
            Self::Random { rng_seed: None } => {
                let source = RandomSeeds::from_entropy();
                tracing::info!("no --rng-seed given; using {}", source.rng_seed());
                Ok(PolicySource::Random(source))
            }
            Self::Increment { start, step, scope } => {
                CounterSeeds::new(start, step, scope).map(PolicySource::Counter)
            }
        }
    }
}

/// Seed source built from a [`SeedPolicy`]
#[derive(Debug, Clone)]
pub enum PolicySource {
    /// Random mode
    Random(RandomSeeds),
    /// Increment mode
    Counter(CounterSeeds),
}

impl PolicySource {
    /// Generator seed, for random mode
    #[must_use]
    pub fn rng_seed(&self) -> Option<u64> {
        match self {
            Self::Random(r) => Some(r.rng_seed()),
            Self::Counter(_) => None,
        }
    }
}

impl SeedSource for PolicySource {
    fn begin_job(&mut self, scope: &JobScope) {
        match self {
            Self::Random(r) => r.begin_job(scope),
            Self::Counter(c) => c.begin_job(scope),
        }
    }

    fn next_seed(&mut self) -> Result<u64, EditError> {
        match self {
            Self::Random(r) => r.next_seed(),
            Self::Counter(c) => c.next_seed(),
        }
    }
}
