// Scale membership and note-role classification.
//
// Classifies a pitch relative to a chord root: is it in the scale, is it a
// tension, is it a chromatic alteration. The velocity shaper uses these
// flags to soften color tones.
//
// Tension matching has two modes. `Compatible` compares the reduced offset
// against the extension numbers 9, 11 and 13; since the offset is always in
// 0..12 the 13 never matches, so tensions fire only on offsets 9 and 11.
// `Corrected` reduces the extensions first (9th = 2, 11th = 5, 13th = 9).

use serde::{Deserialize, Serialize};

/// Scales the analyzer knows, each as offsets from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    #[default]
    Major,
    Minor,
    Dorian,
    Mixolydian,
}

impl ScaleType {
    pub fn offsets(self) -> [i32; 7] {
        match self {
            ScaleType::Major => [0, 2, 4, 5, 7, 9, 11],
            ScaleType::Minor => [0, 2, 3, 5, 7, 8, 10],
            ScaleType::Dorian => [0, 2, 3, 5, 7, 9, 10],
            ScaleType::Mixolydian => [0, 2, 4, 5, 7, 9, 10],
        }
    }

    pub fn contains(self, offset: i32) -> bool {
        self.offsets().contains(&offset)
    }
}

/// How tensions are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensionMatching {
    /// Offsets 9 and 11 (the literal 13 is unreachable).
    #[default]
    Compatible,
    /// Reduced 9th, 11th and 13th: offsets 2, 5 and 9.
    Corrected,
}

impl TensionMatching {
    fn offsets(self) -> &'static [i32] {
        match self {
            TensionMatching::Compatible => &[9, 11, 13],
            TensionMatching::Corrected => &[2, 5, 9],
        }
    }
}

const ALTERATION_OFFSETS: [i32; 5] = [1, 3, 6, 8, 10];

/// Role flags for one note against a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoteRole {
    pub in_key: bool,
    pub is_tension: bool,
    pub is_alteration: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleAnalyzer {
    pub matching: TensionMatching,
}

impl ScaleAnalyzer {
    pub fn new(matching: TensionMatching) -> Self {
        ScaleAnalyzer { matching }
    }

    /// Classify `note` against `root` in the major scale.
    pub fn classify(&self, note: i32, root: i32) -> NoteRole {
        self.classify_in(note, root, ScaleType::Major)
    }

    pub fn classify_in(&self, note: i32, root: i32, scale: ScaleType) -> NoteRole {
        let offset = normalized_offset(note, root);
        NoteRole {
            in_key: scale.contains(offset),
            is_tension: self.matching.offsets().contains(&offset),
            is_alteration: ALTERATION_OFFSETS.contains(&offset),
        }
    }
}

/// Offset of `note` above `root`, reduced to 0..12 (also for notes below).
pub fn normalized_offset(note: i32, root: i32) -> i32 {
    (note - root).rem_euclid(12)
}
