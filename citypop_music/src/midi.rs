// MIDI output: a small track/file API over `midly`.
//
// Notes are collected in seconds on a `MidiTrack` and converted to ticks
// only when the file is serialized. `add_note` refuses malformed notes
// (pitch outside 0..=127, negative start, non-positive duration, velocity
// outside 0..=1) so callers can skip them and carry on; `to_bytes` reports
// whole-file failures so callers can substitute the one-note fallback.
//
// Encoding: SMF format 0 for a single track (format 1 otherwise), 480 ticks
// per quarter note. The first track opens with one tempo meta event holding
// the tempo rounded to a whole BPM, and note times are converted at that
// same rounded tempo. Note-offs sort ahead of note-ons on the same tick.

use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};

use crate::error::{NoteRejection, SerializationError};

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// General MIDI program 4, Electric Piano 1.
const ELECTRIC_PIANO: u8 = 4;

const MAX_DELTA: u64 = 0x0FFF_FFFF;
const MAX_TEMPO_MICROS: f64 = 0x00FF_FFFF as f64;

/// Tempo used by a fresh file and by the fallback file.
pub const DEFAULT_TEMPO: f64 = 120.0;

/// One timed note. Times are seconds; velocity is 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub pitch: i32,
    pub start: f64,
    pub duration: f64,
    pub velocity: f64,
}

impl NoteEvent {
    fn validate(&self) -> Result<(), NoteRejection> {
        if !(0..=127).contains(&self.pitch) {
            return Err(NoteRejection::PitchOutOfRange(self.pitch));
        }
        if !(self.start.is_finite() && self.start >= 0.0) {
            return Err(NoteRejection::InvalidStart(self.start));
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(NoteRejection::InvalidDuration(self.duration));
        }
        if !(0.0..=1.0).contains(&self.velocity) {
            return Err(NoteRejection::InvalidVelocity(self.velocity));
        }
        Ok(())
    }
}

/// A named list of accepted notes.
#[derive(Debug, Clone, Default)]
pub struct MidiTrack {
    pub name: Option<String>,
    notes: Vec<NoteEvent>,
}

impl MidiTrack {
    /// Accept `note`, or say why it was refused. A refused note leaves the
    /// track unchanged.
    pub fn add_note(&mut self, note: NoteEvent) -> Result<(), NoteRejection> {
        note.validate()?;
        self.notes.push(note);
        Ok(())
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }
}

/// An in-progress MIDI file.
#[derive(Debug, Clone)]
pub struct MidiFile {
    tempo_bpm: f64,
    tracks: Vec<MidiTrack>,
}

impl Default for MidiFile {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiFile {
    pub fn new() -> Self {
        MidiFile {
            tempo_bpm: DEFAULT_TEMPO,
            tracks: Vec::new(),
        }
    }

    pub fn set_tempo(&mut self, bpm: f64) {
        self.tempo_bpm = bpm;
    }

    pub fn tempo(&self) -> f64 {
        self.tempo_bpm
    }

    /// Append an empty track and return it.
    pub fn add_track(&mut self) -> &mut MidiTrack {
        self.tracks.push(MidiTrack::default());
        let last = self.tracks.len() - 1;
        &mut self.tracks[last]
    }

    pub fn tracks(&self) -> &[MidiTrack] {
        &self.tracks
    }

    /// Serialize to Standard MIDI File bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        let smf = self.to_smf()?;
        let mut buf = Vec::new();
        smf.write_std(&mut buf)
            .map_err(|e| SerializationError::Write(e.to_string()))?;
        Ok(buf)
    }

    fn to_smf(&self) -> Result<Smf<'_>, SerializationError> {
        if self.tracks.is_empty() {
            return Err(SerializationError::NoTracks);
        }
        let bpm = self.tempo_bpm.round();
        let micros = 60_000_000.0 / bpm;
        if !(bpm.is_finite() && bpm > 0.0 && micros <= MAX_TEMPO_MICROS) {
            return Err(SerializationError::InvalidTempo(self.tempo_bpm));
        }

        let format = if self.tracks.len() == 1 {
            Format::SingleTrack
        } else {
            Format::Parallel
        };
        let mut smf = Smf::new(Header::new(
            format,
            Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
        ));

        let ticks_per_second = bpm / 60.0 * TICKS_PER_QUARTER as f64;
        for (ti, track) in self.tracks.iter().enumerate() {
            let mut events: Track<'_> = Vec::new();
            if let Some(name) = &track.name {
                events.push(TrackEvent {
                    delta: u28::new(0),
                    kind: TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
                });
            }
            if ti == 0 {
                events.push(TrackEvent {
                    delta: u28::new(0),
                    kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(micros.round() as u32))),
                });
            }

            let channel = u4::new((ti % 16) as u8);
            events.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::ProgramChange {
                        program: u7::new(ELECTRIC_PIANO),
                    },
                },
            });

            let mut timed = note_messages(track.notes(), ticks_per_second);
            // Stable sort: same-tick offs (order 0) before ons (order 1).
            timed.sort_by_key(|&(tick, order, _)| (tick, order));

            let mut last_tick = 0u64;
            for (tick, _, message) in timed {
                let delta = tick - last_tick;
                if delta > MAX_DELTA {
                    return Err(SerializationError::DeltaOverflow(delta));
                }
                events.push(TrackEvent {
                    delta: u28::new(delta as u32),
                    kind: TrackEventKind::Midi { channel, message },
                });
                last_tick = tick;
            }

            events.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            });
            smf.tracks.push(events);
        }

        Ok(smf)
    }
}

/// Note-on/off messages with absolute ticks. Every note lasts at least one
/// tick so its off never lands before its on.
fn note_messages(notes: &[NoteEvent], ticks_per_second: f64) -> Vec<(u64, u8, MidiMessage)> {
    let mut timed = Vec::with_capacity(notes.len() * 2);
    for note in notes {
        let key = u7::new(note.pitch as u8);
        let start = (note.start * ticks_per_second).round() as u64;
        let length = ((note.duration * ticks_per_second).round() as u64).max(1);
        let vel = (note.velocity * 127.0).round().clamp(1.0, 127.0) as u8;
        timed.push((start, 1, MidiMessage::NoteOn { key, vel: u7::new(vel) }));
        timed.push((start + length, 0, MidiMessage::NoteOff { key, vel: u7::new(0) }));
    }
    timed
}

/// A minimal valid file: one middle C at 120 BPM.
pub fn fallback_file() -> Result<Vec<u8>, SerializationError> {
    let mut midi = MidiFile::new();
    midi.set_tempo(DEFAULT_TEMPO);
    midi.add_track()
        .add_note(NoteEvent {
            pitch: 60,
            start: 0.0,
            duration: 1.0,
            velocity: 0.8,
        })
        .map_err(|e| SerializationError::Write(e.to_string()))?;
    midi.to_bytes()
}
