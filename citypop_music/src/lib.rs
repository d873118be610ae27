// City Pop Chord Progression Generator
//
// Produces short Japanese City Pop style chord progressions (extended
// jazz-derived voicings, wide piano spreads, era and artist flavor) and
// writes them as a single-track Standard MIDI File. Generation is a linear
// pipeline run once per progression step, with a bounded retry around the
// whole run and a minimal fallback file when serialization fails.
//
// Architecture:
// - options.rs: Era/style enums and the per-run GenerationOptions
// - catalog.rs: Voicing, progression and style tables (built-in or JSON)
// - config.rs: GeneratorConfig tuning knobs, JSON-loadable
// - error.rs: Typed errors for options, notes, serialization, generation
// - scale.rs: Scale offsets and note classification (in key, tension,
//   alteration)
// - tension_arc.rs: Golden-ratio peaked tension curve over the progression
// - voicing.rs: Chord voicing builder (era shifts, tensions, artist rules,
//   bass note)
// - spread.rs: Register spreading and spacing constraints
// - voice_leading.rs: Greedy octave correction against the previous chord
// - velocity.rs: Per-note velocity shaping
// - midi.rs: Note events, tracks and SMF encoding via midly
// - orchestrator.rs: Runs the pipeline for one progression
// - retry.rs: Bounded retry and the `generate_midi` entry point
//
// All randomness flows through an injected `UniformSource`, so a seeded
// `ChordRng` reproduces the same file.

pub mod catalog;
pub mod config;
pub mod error;
pub mod midi;
pub mod options;
pub mod orchestrator;
pub mod retry;
pub mod scale;
pub mod spread;
pub mod tension_arc;
pub mod velocity;
pub mod voice_leading;
pub mod voicing;

pub use catalog::Catalog;
pub use config::GeneratorConfig;
pub use error::GenerationError;
pub use options::{Era, GenerationOptions, Style};
pub use orchestrator::ProgressionOrchestrator;
pub use retry::{GeneratedFile, generate_midi};
