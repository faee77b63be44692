//! Per-test trial lifecycle.
//!
//! A trial is one execution of a test body against one freshly seeded
//! [`Source`]. The runner derives each trial's seed from the configured base
//! seed and the trial index, stops at the first failure, and reports the
//! failing trial's seed so the run can be reproduced by configuring that
//! seed directly.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::entropy::{BitSource, GOLDEN_GAMMA};
use crate::error::SourceError;
use crate::registry::GeneratorRegistry;
use crate::source::Source;
use crate::structural::StructuralRegistry;

/// Configuration for a trial run.
///
/// Defaults: a random base seed and a single trial.
#[derive(Debug, Clone, Default)]
pub struct TrialConfig {
    seed: Option<u64>,
    trials: Option<u64>,
}

impl TrialConfig {
    pub fn new() -> Self {
        TrialConfig::default()
    }

    /// Pin the base seed, making the whole run reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of trials to run.
    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = Some(trials);
        self
    }
}

/// Why a trial failed: the test body's own assertion, or an engine error
/// (invalid range, interval imbalance, construction failure). The two are
/// kept distinct because an engine error means a broken generator, not a
/// falsified property.
#[derive(Debug, Error)]
pub enum TrialError {
    #[error("assertion failed: {0}")]
    Assertion(String),
    #[error(transparent)]
    Engine(#[from] SourceError),
}

impl TrialError {
    /// Convenience for test bodies bailing out with a message.
    pub fn assertion(message: impl Into<String>) -> Self {
        TrialError::Assertion(message.into())
    }
}

/// Outcome of a trial run.
#[derive(Debug)]
pub enum TrialResult {
    Pass {
        trials_run: u64,
    },
    /// First failing trial; `seed` is the trial's own derived seed, so
    /// `TrialConfig::with_seed(seed).with_trials(1)` replays exactly it.
    Fail {
        seed: u64,
        trial: u64,
        error: TrialError,
    },
}

impl TrialResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, TrialResult::Pass { .. })
    }
}

impl fmt::Display for TrialResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrialResult::Pass { trials_run } => {
                write!(f, "✓ passed {trials_run} trial(s).")
            }
            TrialResult::Fail { seed, trial, error } => {
                write!(f, "✗ trial {trial} failed (seed {seed}): {error}")
            }
        }
    }
}

/// Seed for trial `trial` of a run based on `base`. Trial 0 uses the base
/// seed verbatim.
pub fn trial_seed(base: u64, trial: u64) -> u64 {
    base.wrapping_add(trial.wrapping_mul(GOLDEN_GAMMA))
}

/// Runs a test body for a configured number of trials, each against a fresh
/// engine instance. The registries are built once, before any trial, and
/// shared read-only across all of them.
pub struct TrialRunner {
    config: TrialConfig,
    generators: Arc<GeneratorRegistry>,
    structurals: Arc<StructuralRegistry>,
}

impl TrialRunner {
    pub fn new(config: TrialConfig) -> Self {
        TrialRunner::with_registries(
            config,
            Arc::new(GeneratorRegistry::empty()),
            Arc::new(StructuralRegistry::empty()),
        )
    }

    pub fn with_registries(
        config: TrialConfig,
        generators: Arc<GeneratorRegistry>,
        structurals: Arc<StructuralRegistry>,
    ) -> Self {
        TrialRunner {
            config,
            generators,
            structurals,
        }
    }

    /// Run the test body once per trial, stopping at the first failure.
    /// After a passing body the interval stack is checked; an unbalanced
    /// stack fails the trial as an engine error.
    pub fn run<F>(&self, test: F) -> TrialResult
    where
        F: Fn(&mut Source) -> std::result::Result<(), TrialError>,
    {
        let base = self.config.seed.unwrap_or_else(BitSource::random_seed);
        let trials = self.config.trials.unwrap_or(1);

        for trial in 0..trials {
            let seed = trial_seed(base, trial);
            let mut source = Source::with_registries(
                seed,
                Arc::clone(&self.generators),
                Arc::clone(&self.structurals),
            );
            if let Err(error) = test(&mut source) {
                return TrialResult::Fail { seed, trial, error };
            }
            if let Err(error) = source.finish() {
                return TrialResult::Fail {
                    seed,
                    trial,
                    error: TrialError::Engine(error),
                };
            }
        }
        TrialResult::Pass {
            trials_run: trials,
        }
    }
}
