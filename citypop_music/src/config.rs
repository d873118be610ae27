// Generator tuning parameters.
//
// Everything here has a default matching the stock behavior, so the binary
// runs without a config file. A JSON file may override any subset of fields
// (`#[serde(default)]`); `load` validates the result before use.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::scale::TensionMatching;

/// Slowest tempo whose quarter note fits the 24-bit MIDI tempo field.
pub const MIN_ENCODABLE_TEMPO: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of chords in a progression.
    pub progression_length: usize,
    /// Time-cursor advance per step, in seconds. Not scaled by tempo.
    pub step_duration: f64,
    /// MIDI pitch the progression roots are offset from.
    pub tonic: i32,
    /// Global tempo clamp, BPM.
    pub min_tempo: f64,
    pub max_tempo: f64,
    /// Attempts `generate_midi` makes before giving up.
    pub max_attempts: usize,
    /// How the scale analyzer recognizes tensions.
    pub tension_matching: TensionMatching,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            progression_length: 8,
            step_duration: 2.0,
            tonic: 60,
            min_tempo: 60.0,
            max_tempo: 180.0,
            max_attempts: 3,
            tension_matching: TensionMatching::Compatible,
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GeneratorConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.progression_length == 0 {
            return Err(ConfigError::Invalid("progression_length must be at least 1".into()));
        }
        if !(self.step_duration.is_finite() && self.step_duration > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "step_duration must be positive, got {}",
                self.step_duration
            )));
        }
        if !(0..=127).contains(&self.tonic) {
            return Err(ConfigError::Invalid(format!(
                "tonic must be a MIDI pitch, got {}",
                self.tonic
            )));
        }
        if !(self.min_tempo >= MIN_ENCODABLE_TEMPO && self.min_tempo <= self.max_tempo) {
            return Err(ConfigError::Invalid(format!(
                "tempo bounds {}..{} must start at {MIN_ENCODABLE_TEMPO} BPM or more",
                self.min_tempo, self.max_tempo
            )));
        }
        if !self.max_tempo.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "max_tempo must be finite, got {}",
                self.max_tempo
            )));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}
