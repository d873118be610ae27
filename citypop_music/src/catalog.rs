// Curated reference data: voicings, progression templates, style profiles.
//
// The built-in catalog is assembled once on first use and shared read-only
// for the life of the process (`Catalog::builtin()`). A replacement catalog
// can be loaded from JSON with the same shape (`Catalog::load`); loaded
// catalogs are validated so that generation never has to handle an empty
// voicing or a style with no candidate progression.
//
// Selection is uniform everywhere. The `weight` fields on voicings and
// progression templates are carried as data but not used for sampling.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

use crate::error::CatalogError;
use crate::options::{Era, MARIYA_TAKEUCHI, Style, TATSURO_YAMASHITA, TOSHIKI_KADOMATSU};

/// Template style that is eligible regardless of the requested style.
pub const STANDARD_STYLE: &str = "standard";

/// Largest semitone offset, either direction, a loaded catalog may use.
pub const MAX_OFFSET: i32 = 128;

/// Coarse family a voicing belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoicingCategory {
    Citypop,
    Fusion,
    Jazz,
    Ballad,
}

/// A named chord color: semitone offsets above the root plus candidate
/// extensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voicing {
    pub name: String,
    /// Base chord tones; may reach past the octave (14 = 9th, 21 = 13th).
    pub intervals: Vec<i32>,
    /// Extensions layered on by complexity.
    pub tensions: Vec<i32>,
    /// Informational only.
    #[serde(default)]
    pub alterations: Vec<i32>,
    pub category: VoicingCategory,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub era: Option<Era>,
    #[serde(default)]
    pub artist_style: Option<String>,
}

fn default_weight() -> f64 {
    1.0
}

impl Voicing {
    /// True when `pitch` shares a pitch class with one of the base intervals
    /// built on `root`.
    pub fn is_chord_tone(&self, pitch: i32, root: i32) -> bool {
        let pc = (pitch - root).rem_euclid(12);
        self.intervals.iter().any(|&iv| iv.rem_euclid(12) == pc)
    }
}

/// An ordered list of root offsets from the tonic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionTemplate {
    pub roots: Vec<i32>,
    /// Parallel to `roots`; informational.
    #[serde(default)]
    pub weights: Vec<f64>,
    pub style: String,
    pub complexity: f64,
}

impl ProgressionTemplate {
    /// Root offset for step `i`, cycling through the template.
    pub fn root_at(&self, i: usize) -> i32 {
        self.roots[i % self.roots.len()]
    }
}

/// Tempo, dynamics and feel for one playing style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProfile {
    /// BPM, `[lo, hi]`.
    pub tempo_range: (f64, f64),
    /// MIDI velocity units, `[lo, hi]`.
    pub velocity_range: (f64, f64),
    /// Maximum onset offset in seconds when swing is enabled.
    pub swing_factor: f64,
}

/// One profile per `Style`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleProfiles {
    pub ballad: StyleProfile,
    pub uptempo: StyleProfile,
    pub fusion: StyleProfile,
}

impl StyleProfiles {
    pub fn get(&self, style: Style) -> &StyleProfile {
        match style {
            Style::Ballad => &self.ballad,
            Style::Uptempo => &self.uptempo,
            Style::Fusion => &self.fusion,
        }
    }
}

/// The full reference data set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub voicings: Vec<Voicing>,
    /// Used when no voicing matches the requested era/artist.
    pub default_voicing: Voicing,
    pub progressions: Vec<ProgressionTemplate>,
    pub styles: StyleProfiles,
}

static BUILTIN: LazyLock<Catalog> = LazyLock::new(Catalog::builtin_tables);

impl Catalog {
    /// The process-wide built-in catalog.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Load a catalog from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let data = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }

    /// Parse a catalog from JSON text and validate it.
    pub fn from_json(data: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(data)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check the invariants generation relies on.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for voicing in self.voicings.iter().chain(std::iter::once(&self.default_voicing)) {
            if voicing.intervals.is_empty() {
                return Err(CatalogError::EmptyVoicing(voicing.name.clone()));
            }
            check_offsets(&format!("voicing '{}'", voicing.name), &voicing.intervals)?;
            check_offsets(&format!("voicing '{}' tension", voicing.name), &voicing.tensions)?;
            check_offsets(
                &format!("voicing '{}' alteration", voicing.name),
                &voicing.alterations,
            )?;
        }
        for (idx, template) in self.progressions.iter().enumerate() {
            if template.roots.is_empty() {
                return Err(CatalogError::EmptyProgression(idx));
            }
            check_offsets(&format!("progression {idx} root"), &template.roots)?;
        }
        if !self.progressions.iter().any(|p| p.style == STANDARD_STYLE) {
            return Err(CatalogError::NoStandardProgression);
        }
        for style in Style::ALL {
            let profile = self.styles.get(style);
            if profile.tempo_range.0 > profile.tempo_range.1 {
                return Err(CatalogError::InvertedRange {
                    style: style.to_string(),
                    field: "tempo",
                });
            }
            if profile.velocity_range.0 > profile.velocity_range.1 {
                return Err(CatalogError::InvertedRange {
                    style: style.to_string(),
                    field: "velocity",
                });
            }
        }
        Ok(())
    }

    /// Voicings whose era and artist tags match every filter that is set.
    /// May be empty; callers fall back to `default_voicing`.
    pub fn voicings_for(&self, era: Option<Era>, artist: Option<&str>) -> Vec<&Voicing> {
        self.voicings
            .iter()
            .filter(|v| era.is_none_or(|e| v.era == Some(e)))
            .filter(|v| artist.is_none_or(|a| v.artist_style.as_deref() == Some(a)))
            .collect()
    }

    /// Templates tagged with `style` or with the standard tag.
    pub fn progressions_for(&self, style: Style) -> Vec<&ProgressionTemplate> {
        self.progressions
            .iter()
            .filter(|p| p.style == style.as_str() || p.style == STANDARD_STYLE)
            .collect()
    }

    pub fn style_profile(&self, style: Style) -> &StyleProfile {
        self.styles.get(style)
    }

    fn builtin_tables() -> Catalog {
        let maj9 = Voicing {
            name: "maj9".into(),
            intervals: vec![0, 4, 7, 11, 14],
            tensions: vec![9, 13],
            alterations: vec![8, 15],
            category: VoicingCategory::Citypop,
            weight: 1.0,
            era: Some(Era::EarlyEighties),
            artist_style: None,
        };

        let voicings = vec![
            maj9.clone(),
            Voicing {
                name: "maj7_13".into(),
                intervals: vec![0, 4, 7, 11, 21],
                tensions: vec![9, 13],
                alterations: vec![8, 15],
                category: VoicingCategory::Citypop,
                weight: 0.8,
                era: Some(Era::MidEighties),
                artist_style: None,
            },
            Voicing {
                name: "min11".into(),
                intervals: vec![0, 3, 7, 10, 14, 17],
                tensions: vec![15, 22],
                alterations: vec![8],
                category: VoicingCategory::Citypop,
                weight: 0.7,
                era: Some(Era::EarlyEighties),
                artist_style: None,
            },
            Voicing {
                name: "maj9_13".into(),
                intervals: vec![0, 4, 7, 11, 14, 21],
                tensions: vec![13, 15],
                alterations: vec![8, 22],
                category: VoicingCategory::Jazz,
                weight: 0.9,
                era: None,
                artist_style: Some(TATSURO_YAMASHITA.into()),
            },
            Voicing {
                name: "maj7_9_13".into(),
                intervals: vec![0, 4, 7, 11, 14, 21],
                tensions: vec![13, 15, 22],
                alterations: vec![8, 15],
                category: VoicingCategory::Ballad,
                weight: 0.7,
                era: None,
                artist_style: Some(MARIYA_TAKEUCHI.into()),
            },
            Voicing {
                name: "kadomatsu_fusion".into(),
                intervals: vec![0, 4, 7, 10, 15, 21],
                tensions: vec![9, 13, 15],
                alterations: vec![8, 22],
                category: VoicingCategory::Fusion,
                weight: 0.8,
                era: None,
                artist_style: Some(TOSHIKI_KADOMATSU.into()),
            },
            Voicing {
                name: "anri_pop".into(),
                intervals: vec![0, 4, 7, 11, 14],
                tensions: vec![9, 13],
                alterations: vec![15],
                category: VoicingCategory::Citypop,
                weight: 0.85,
                era: None,
                artist_style: Some("Anri".into()),
            },
        ];

        let progressions = vec![
            ProgressionTemplate {
                roots: vec![0, 5, 3, 4],
                weights: vec![1.0, 0.8, 0.7, 0.9],
                style: STANDARD_STYLE.into(),
                complexity: 0.7,
            },
            ProgressionTemplate {
                roots: vec![0, 5, 1, 4],
                weights: vec![1.0, 0.7, 0.8, 0.9],
                style: "jazz".into(),
                complexity: 0.8,
            },
            ProgressionTemplate {
                roots: vec![3, 4, 0, 5, 1],
                weights: vec![0.8, 0.9, 1.0, 0.7, 0.8],
                style: "fusion".into(),
                complexity: 0.9,
            },
            ProgressionTemplate {
                roots: vec![0, 2, 5, 1],
                weights: vec![1.0, 0.6, 0.7, 0.8],
                style: "ballad".into(),
                complexity: 0.6,
            },
        ];

        let styles = StyleProfiles {
            ballad: StyleProfile {
                tempo_range: (65.0, 80.0),
                velocity_range: (60.0, 85.0),
                swing_factor: 0.2,
            },
            uptempo: StyleProfile {
                tempo_range: (120.0, 135.0),
                velocity_range: (75.0, 95.0),
                swing_factor: 0.4,
            },
            fusion: StyleProfile {
                tempo_range: (90.0, 110.0),
                velocity_range: (70.0, 90.0),
                swing_factor: 0.3,
            },
        };

        Catalog {
            voicings,
            default_voicing: maj9,
            progressions,
            styles,
        }
    }
}

fn check_offsets(what: &str, offsets: &[i32]) -> Result<(), CatalogError> {
    match offsets.iter().find(|o| !(-MAX_OFFSET..=MAX_OFFSET).contains(*o)) {
        Some(&value) => Err(CatalogError::OffsetOutOfRange {
            what: what.to_string(),
            value,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        Catalog::builtin().validate().unwrap();
    }

    #[test]
    fn no_voicing_is_tagged_seventies() {
        let catalog = Catalog::builtin();
        assert!(catalog.voicings_for(Some(Era::Seventies), None).is_empty());
        assert_eq!(catalog.default_voicing.name, "maj9");
    }

    #[test]
    fn era_and_artist_filters_combine() {
        let catalog = Catalog::builtin();
        let mid = catalog.voicings_for(Some(Era::MidEighties), None);
        assert_eq!(mid.len(), 1);
        assert_eq!(mid[0].name, "maj7_13");

        let yamashita = catalog.voicings_for(None, Some(TATSURO_YAMASHITA));
        assert_eq!(yamashita.len(), 1);
        assert_eq!(yamashita[0].name, "maj9_13");

        // Artist voicings carry no era, so combining filters empties the set.
        assert!(
            catalog
                .voicings_for(Some(Era::EarlyEighties), Some(TATSURO_YAMASHITA))
                .is_empty()
        );
        assert_eq!(catalog.voicings_for(None, None).len(), catalog.voicings.len());
    }

    #[test]
    fn progressions_include_standard() {
        let catalog = Catalog::builtin();
        for style in Style::ALL {
            let candidates = catalog.progressions_for(style);
            assert!(candidates.iter().any(|p| p.style == STANDARD_STYLE));
            assert!(
                candidates
                    .iter()
                    .all(|p| p.style == STANDARD_STYLE || p.style == style.as_str())
            );
        }
        // Uptempo has no dedicated template.
        assert_eq!(catalog.progressions_for(Style::Uptempo).len(), 1);
        assert_eq!(catalog.progressions_for(Style::Ballad).len(), 2);
    }

    #[test]
    fn chord_tone_uses_pitch_class() {
        let catalog = Catalog::builtin();
        let maj9 = &catalog.default_voicing;
        assert!(maj9.is_chord_tone(64, 60));
        assert!(maj9.is_chord_tone(74, 60)); // 9th, pc 2
        assert!(maj9.is_chord_tone(48, 60)); // bass root
        assert!(!maj9.is_chord_tone(65, 60));
    }

    #[test]
    fn json_round_trip_preserves_catalog() {
        let catalog = Catalog::builtin();
        let json = serde_json::to_string(catalog).unwrap();
        let parsed = Catalog::from_json(&json).unwrap();
        assert_eq!(&parsed, catalog);
    }

    #[test]
    fn validation_rejects_missing_standard() {
        let mut catalog = Catalog::builtin().clone();
        catalog.progressions.retain(|p| p.style != STANDARD_STYLE);
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::NoStandardProgression)
        ));
    }

    #[test]
    fn validation_rejects_empty_voicing() {
        let mut catalog = Catalog::builtin().clone();
        catalog.voicings[2].intervals.clear();
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::EmptyVoicing(name)) if name == "min11"
        ));
    }

    #[test]
    fn validation_bounds_offsets() {
        let mut catalog = Catalog::builtin().clone();
        catalog.voicings[0].intervals.push(i32::MAX);
        let json = serde_json::to_string(&catalog).unwrap();
        assert!(matches!(
            Catalog::from_json(&json),
            Err(CatalogError::OffsetOutOfRange { value: i32::MAX, .. })
        ));

        let mut catalog = Catalog::builtin().clone();
        catalog.default_voicing.tensions.push(-129);
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::OffsetOutOfRange { value: -129, .. })
        ));

        let mut catalog = Catalog::builtin().clone();
        catalog.progressions[0].roots = vec![0, 200];
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::OffsetOutOfRange { value: 200, .. })
        ));

        catalog.progressions[0].roots = vec![-MAX_OFFSET, MAX_OFFSET];
        catalog.validate().unwrap();
    }
}
