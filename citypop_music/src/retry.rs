// Bounded retry and the top-level entry point.
//
// `retry` runs a fallible closure up to a fixed number of times, strictly
// one after another, and reports either the first success or the last
// error. `generate_midi` wraps one orchestrator attempt in it: every attempt
// builds a fresh `ProgressionOrchestrator`, and only an exhausted budget is
// surfaced to the caller.

use citypop_prng::UniformSource;
use std::fmt::Display;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::options::GenerationOptions;
use crate::orchestrator::ProgressionOrchestrator;

/// Result of a bounded retry.
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    Success { value: T, attempts: usize },
    Exhausted { attempts: usize, last: E },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn attempts(&self) -> usize {
        match self {
            RetryOutcome::Success { attempts, .. } | RetryOutcome::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            RetryOutcome::Success { value, .. } => Ok(value),
            RetryOutcome::Exhausted { last, .. } => Err(last),
        }
    }
}

/// Call `attempt` (with the 1-based attempt number) until it succeeds or
/// `max_attempts` calls have failed. A budget of 0 still makes one attempt.
pub fn retry<T, E: Display>(
    max_attempts: usize,
    mut attempt: impl FnMut(usize) -> Result<T, E>,
) -> RetryOutcome<T, E> {
    let budget = max_attempts.max(1);
    let mut n = 0;
    loop {
        n += 1;
        match attempt(n) {
            Ok(value) => return RetryOutcome::Success { value, attempts: n },
            Err(error) => {
                warn!(attempt = n, budget, %error, "generation attempt failed");
                if n >= budget {
                    return RetryOutcome::Exhausted {
                        attempts: n,
                        last: error,
                    };
                }
            }
        }
    }
}

/// A finished file plus the name a caller should save it under.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub bytes: Vec<u8>,
    pub tempo: f64,
    pub name: String,
    /// `<name>-<bpm>bpm.mid`.
    pub filename: String,
}

/// Generate a progression, retrying up to `config.max_attempts` times.
pub fn generate_midi(
    options: &GenerationOptions,
    config: &GeneratorConfig,
    catalog: &Catalog,
    rng: &mut impl UniformSource,
) -> Result<GeneratedFile, GenerationError> {
    let outcome = retry(config.max_attempts, |_| {
        ProgressionOrchestrator::new(options.clone(), config.clone(), catalog).generate(rng)
    });
    match outcome {
        RetryOutcome::Success { value, attempts } => {
            let filename = format!("{}-{}bpm.mid", value.name, value.tempo.round() as i64);
            info!(%filename, attempts, fallback = value.fallback, "generated progression");
            Ok(GeneratedFile {
                bytes: value.bytes,
                tempo: value.tempo,
                name: value.name,
                filename,
            })
        }
        RetryOutcome::Exhausted { attempts, last } => Err(GenerationError::RetriesExhausted {
            attempts,
            last: Box::new(last),
        }),
    }
}
