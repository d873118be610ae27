// Progression orchestration: from options to a finished MIDI file.
//
// One `generate` call is one attempt:
//   1. pick a tempo from the style profile (clamped to the config bounds)
//   2. pick a progression template for the style (or a standard one)
//   3. draw a tension arc over the progression length
//   4. per step: pick a voicing, build and spread the chord, drop pitches
//      outside 0..=127 (and the whole step if none are left), lead it from
//      the previous kept chord, then time, size and shape each note
//   5. hand the notes to the MIDI writer
//
// The time cursor advances by `step_duration` after every kept step,
// independent of tempo; a skipped step leaves no gap. Notes the writer
// refuses are skipped; if the file itself cannot be serialized the one-note
// fallback is returned under a distinct name.

use citypop_prng::UniformSource;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::catalog::{Catalog, ProgressionTemplate, Voicing};
use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::midi::{DEFAULT_TEMPO, MidiFile, NoteEvent, fallback_file};
use crate::options::GenerationOptions;
use crate::scale::ScaleAnalyzer;
use crate::tension_arc;
use crate::velocity::VelocityShaper;
use crate::voice_leading::reconcile;
use crate::voicing::ChordVoicingBuilder;

/// Nominal note length in seconds, before jitter.
const NOTE_LENGTH: f64 = 1.95;

/// A chord that made it into the output.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordStep {
    pub step: usize,
    pub root: i32,
    pub voicing: String,
    pub complexity: f64,
    /// Chord onset in seconds, before per-note jitter.
    pub start: f64,
    /// Pitches after filtering and voice leading.
    pub pitches: Vec<i32>,
}

/// Everything decided for one progression, before MIDI encoding.
#[derive(Debug, Clone)]
pub struct Composition {
    pub tempo: f64,
    pub template: ProgressionTemplate,
    pub tension_arc: Vec<f64>,
    pub chords: Vec<ChordStep>,
    pub notes: Vec<NoteEvent>,
}

/// Output of one successful attempt.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub bytes: Vec<u8>,
    pub tempo: f64,
    pub name: String,
    /// True when the bytes are the one-note fallback file.
    pub fallback: bool,
}

pub struct ProgressionOrchestrator<'a> {
    options: GenerationOptions,
    config: GeneratorConfig,
    catalog: &'a Catalog,
}

impl<'a> ProgressionOrchestrator<'a> {
    pub fn new(options: GenerationOptions, config: GeneratorConfig, catalog: &'a Catalog) -> Self {
        ProgressionOrchestrator {
            options,
            config,
            catalog,
        }
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Run one attempt and encode the result.
    pub fn generate(&self, rng: &mut impl UniformSource) -> Result<GenerationResult, GenerationError> {
        let composition = self.compose(rng)?;
        let timestamp = unix_millis();

        let mut midi = MidiFile::new();
        midi.set_tempo(composition.tempo);
        let track = midi.add_track();
        for note in &composition.notes {
            if let Err(reason) = track.add_note(*note) {
                warn!(?note, %reason, "skipped invalid note");
            }
        }

        match midi.to_bytes() {
            Ok(bytes) => Ok(GenerationResult {
                bytes,
                tempo: composition.tempo,
                name: self.result_name(timestamp),
                fallback: false,
            }),
            Err(error) => {
                warn!(%error, "MIDI serialization failed, using fallback file");
                let bytes = fallback_file().map_err(GenerationError::Fallback)?;
                Ok(GenerationResult {
                    bytes,
                    tempo: DEFAULT_TEMPO,
                    name: format!("citypop-fallback-{timestamp}"),
                    fallback: true,
                })
            }
        }
    }

    /// Choose tempo, template and chords, and lay out the notes.
    pub fn compose(&self, rng: &mut impl UniformSource) -> Result<Composition, GenerationError> {
        let style = self.options.effective_style();
        let profile = self.catalog.style_profile(style);

        let (tempo_lo, tempo_hi) = profile.tempo_range;
        let tempo = (tempo_lo + rng.next_f64() * (tempo_hi - tempo_lo))
            .clamp(self.config.min_tempo, self.config.max_tempo);

        let templates = self.catalog.progressions_for(style);
        if templates.is_empty() {
            return Err(GenerationError::NoProgression(style.to_string()));
        }
        let template = templates[rng.pick_index(templates.len())].clone();

        let length = self.config.progression_length;
        let arc = tension_arc::generate(length, rng);
        debug!(%style, tempo, template = ?template.roots, "composing progression");

        let builder = ChordVoicingBuilder::new(&self.options, length);
        let shaper = VelocityShaper::new(
            &self.options,
            ScaleAnalyzer::new(self.config.tension_matching),
        );

        let swing = self.options.swing.then_some(profile.swing_factor);
        let mut time = 0.0;
        let mut previous: Vec<i32> = Vec::new();
        let mut chords = Vec::with_capacity(length);
        let mut notes = Vec::new();

        for (step, &tension) in arc.iter().enumerate() {
            let root = self.config.tonic + template.root_at(step);
            let voicing = self.pick_voicing(rng);
            let complexity = (tension * template.complexity).clamp(0.0, 1.0);

            let mut pitches = builder.build(root, voicing, complexity, step, rng);
            pitches.retain(|p| (0..=127).contains(p));
            if pitches.is_empty() {
                debug!(step, root, "chord left the MIDI range, skipping step");
                continue;
            }
            let pitches = reconcile(&pitches, &previous);

            let onset = chord_start(time, swing, rng);
            for &pitch in &pitches {
                let (vel_lo, vel_hi) = profile.velocity_range;
                let base_velocity = vel_lo + rng.next_f64() * (vel_hi - vel_lo);
                let velocity = shaper.compute_velocity(
                    pitch,
                    root,
                    base_velocity,
                    step,
                    voicing.is_chord_tone(pitch, root),
                    rng,
                );
                let start = (onset + rng.centered(0.01).clamp(-0.005, 0.005)).max(0.0);
                let duration = (NOTE_LENGTH + rng.centered(0.1)).clamp(0.1, 4.0);
                notes.push(NoteEvent {
                    pitch,
                    start,
                    duration,
                    velocity: (velocity as f64 / 127.0).clamp(0.0, 1.0),
                });
            }

            debug!(step, root, voicing = %voicing.name, ?pitches, "chord");
            chords.push(ChordStep {
                step,
                root,
                voicing: voicing.name.clone(),
                complexity,
                start: onset,
                pitches: pitches.clone(),
            });
            previous = pitches;
            time += self.config.step_duration;
        }

        Ok(Composition {
            tempo,
            template,
            tension_arc: arc,
            chords,
            notes,
        })
    }

    /// Uniform pick among voicings matching the era and artist filters, or
    /// the catalog default when none match.
    fn pick_voicing(&self, rng: &mut impl UniformSource) -> &'a Voicing {
        let candidates = self
            .catalog
            .voicings_for(self.options.era, self.options.artist());
        if candidates.is_empty() {
            debug!(era = ?self.options.era, artist = ?self.options.artist(), "no matching voicing, using default");
            return &self.catalog.default_voicing;
        }
        candidates[rng.pick_index(candidates.len())]
    }

    fn result_name(&self, timestamp: u128) -> String {
        let era = self.options.era.map_or("standard", |e| e.as_str());
        let style = self.options.style.map_or("uptempo", |s| s.as_str());
        format!("citypop-{era}-{style}-{timestamp}")
    }
}

/// Chord onset: the cursor plus up to 10ms of jitter, plus the swing offset
/// when enabled. Never negative.
fn chord_start(time: f64, swing: Option<f64>, rng: &mut impl UniformSource) -> f64 {
    let mut start = (time + rng.centered(0.02).clamp(-0.01, 0.01)).max(0.0);
    if let Some(swing) = swing {
        start = (start + rng.centered(swing)).max(0.0);
    }
    start
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
