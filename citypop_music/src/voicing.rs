// Chord construction from a voicing template.
//
// Builds the raw pitch set for one chord:
//   - base intervals on the root, each with an era-dependent octave shift
//     (70s: 30% down, mid80s: 40% up)
//   - floor(complexity * n) tension rolls (n = 3 for mid80s, else 2), each
//     adding a random tension with the era's tension probability
//   - the artist rule, when the voicing is tagged with the requested artist
//   - one bass note an octave or two under the root
// and hands the set to the spread optimizer. The result may contain pitches
// outside 0..=127; the orchestrator filters.

use citypop_prng::UniformSource;
use std::collections::BTreeSet;

use crate::catalog::Voicing;
use crate::options::{Era, GenerationOptions, MARIYA_TAKEUCHI, TATSURO_YAMASHITA, TOSHIKI_KADOMATSU};
use crate::spread::SpreadOptimizer;

/// Probability that one tension roll adds a tension.
pub fn era_tension_probability(era: Option<Era>) -> f64 {
    match era {
        Some(Era::Seventies) => 0.5,
        Some(Era::EarlyEighties) => 0.7,
        Some(Era::MidEighties) => 0.9,
        Some(Era::LateEighties) => 0.6,
        None => 0.7,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChordVoicingBuilder<'a> {
    options: &'a GenerationOptions,
    spread: SpreadOptimizer<'a>,
}

impl<'a> ChordVoicingBuilder<'a> {
    pub fn new(options: &'a GenerationOptions, progression_length: usize) -> Self {
        ChordVoicingBuilder {
            options,
            spread: SpreadOptimizer::new(options, progression_length),
        }
    }

    /// Build and spread a chord; ascending pitches.
    pub fn build(
        &self,
        root: i32,
        voicing: &Voicing,
        complexity: f64,
        step: usize,
        rng: &mut impl UniformSource,
    ) -> Vec<i32> {
        let raw: Vec<i32> = self.build_raw(root, voicing, complexity, rng).into_iter().collect();
        self.spread.spread(&raw, step, rng)
    }

    /// The pitch set before spreading.
    pub fn build_raw(
        &self,
        root: i32,
        voicing: &Voicing,
        complexity: f64,
        rng: &mut impl UniformSource,
    ) -> BTreeSet<i32> {
        let era = self.options.era;
        let mut notes = BTreeSet::new();

        for &interval in &voicing.intervals {
            notes.insert(shift_for_era(root + interval, era, rng));
        }

        let per_unit = if era == Some(Era::MidEighties) { 3.0 } else { 2.0 };
        let tension_count = (complexity * per_unit).floor().max(0.0) as usize;
        let tension_probability = era_tension_probability(era);
        for _ in 0..tension_count {
            if rng.chance(tension_probability) && !voicing.tensions.is_empty() {
                let tension = voicing.tensions[rng.pick_index(voicing.tensions.len())];
                notes.insert(root + tension);
            }
        }

        if let Some(artist) = self
            .options
            .artist()
            .filter(|&a| voicing.artist_style.as_deref() == Some(a))
        {
            apply_artist_rule(artist, &mut notes, root);
        }

        notes.insert(root - bass_offset(era, rng));
        notes
    }
}

fn shift_for_era(note: i32, era: Option<Era>, rng: &mut impl UniformSource) -> i32 {
    match era {
        Some(Era::Seventies) if rng.chance(0.3) => note - 12,
        Some(Era::MidEighties) if rng.chance(0.4) => note + 12,
        _ => note,
    }
}

fn bass_offset(era: Option<Era>, rng: &mut impl UniformSource) -> i32 {
    match era {
        Some(Era::Seventies) => 12,
        Some(Era::MidEighties) => {
            if rng.chance(0.5) {
                24
            } else {
                12
            }
        }
        _ => {
            if rng.chance(0.3) {
                24
            } else {
                12
            }
        }
    }
}

fn apply_artist_rule(artist: &str, notes: &mut BTreeSet<i32>, root: i32) {
    match artist {
        // Raised 11th on top.
        TATSURO_YAMASHITA => {
            notes.insert(root + 22);
        }
        // Close up wide voicings: every note more than an octave above the
        // root also sounds an octave lower, repeatedly.
        MARIYA_TAKEUCHI => {
            let wide: Vec<i32> = notes.iter().copied().filter(|&n| n - root > 12).collect();
            for mut note in wide {
                while note - root > 12 {
                    note -= 12;
                    notes.insert(note);
                }
            }
        }
        // 13th and sharp 9th.
        TOSHIKI_KADOMATSU => {
            notes.insert(root + 21);
            notes.insert(root + 15);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use citypop_prng::ChordRng;

    struct Draws(Vec<f64>, usize);

    impl UniformSource for Draws {
        fn next_f64(&mut self) -> f64 {
            let v = self.0[self.1 % self.0.len()];
            self.1 += 1;
            v
        }
    }

    fn voicing(name: &str) -> Voicing {
        Catalog::builtin()
            .voicings
            .iter()
            .find(|v| v.name == name)
            .cloned()
            .unwrap()
    }

    #[test]
    fn zero_complexity_gives_base_plus_bass() {
        let options = GenerationOptions::default();
        let builder = ChordVoicingBuilder::new(&options, 8);
        // 0.99 fails the 30% deep-bass roll, so the bass is root - 12.
        let mut draws = Draws(vec![0.99], 0);
        let raw = builder.build_raw(60, &voicing("maj9"), 0.0, &mut draws);
        assert_eq!(raw.into_iter().collect::<Vec<_>>(), vec![48, 60, 64, 67, 71, 74]);
    }

    #[test]
    fn tension_rolls_add_listed_tensions() {
        let options = GenerationOptions::default();
        let builder = ChordVoicingBuilder::new(&options, 8);
        // complexity 1.0 -> two rolls. Roll 1: fires (0.1), picks index 0
        // (0.0 -> 9). Roll 2: fires (0.1), picks index 1 (0.9 -> 13).
        // Bass roll 0.99 -> 12.
        let mut draws = Draws(vec![0.1, 0.0, 0.1, 0.9, 0.99], 0);
        let raw = builder.build_raw(60, &voicing("maj9"), 1.0, &mut draws);
        assert!(raw.contains(&69));
        assert!(raw.contains(&73));
        assert!(raw.contains(&48));
    }

    #[test]
    fn tension_count_uses_floor() {
        let options = GenerationOptions::default();
        let builder = ChordVoicingBuilder::new(&options, 8);
        // complexity 0.49 * 2 = 0.98 -> no rolls at all. Only the bass draw
        // is consumed.
        let mut draws = Draws(vec![0.99, 0.0, 0.0], 0);
        builder.build_raw(60, &voicing("maj9"), 0.49, &mut draws);
        assert_eq!(draws.1, 1);
    }

    #[test]
    fn seventies_shifts_down_and_uses_shallow_bass() {
        let options = GenerationOptions::default().with_era(Era::Seventies);
        let builder = ChordVoicingBuilder::new(&options, 8);
        // Every interval rolls 0.0 < 0.3 and drops an octave.
        let mut draws = Draws(vec![0.0], 0);
        let raw = builder.build_raw(60, &voicing("maj9"), 0.0, &mut draws);
        assert_eq!(raw.into_iter().collect::<Vec<_>>(), vec![48, 52, 55, 59, 62]);
    }

    #[test]
    fn mid_eighties_can_reach_two_octaves_down() {
        let options = GenerationOptions::default().with_era(Era::MidEighties);
        let builder = ChordVoicingBuilder::new(&options, 8);
        let mut draws = Draws(vec![0.99, 0.99, 0.99, 0.99, 0.99, 0.1], 0);
        let raw = builder.build_raw(60, &voicing("maj7_13"), 0.0, &mut draws);
        assert!(raw.contains(&36));
        assert!(raw.contains(&81));
    }

    #[test]
    fn yamashita_adds_sharp_eleven() {
        let options = GenerationOptions::default().with_artist(TATSURO_YAMASHITA);
        let builder = ChordVoicingBuilder::new(&options, 8);
        let mut rng = ChordRng::new(3);
        for root in [60, 65, 63] {
            let raw = builder.build_raw(root, &voicing("maj9_13"), 0.7, &mut rng);
            assert!(raw.contains(&(root + 22)), "{raw:?}");
        }
    }

    #[test]
    fn artist_rule_requires_matching_voicing() {
        let options = GenerationOptions::default().with_artist(TATSURO_YAMASHITA);
        let builder = ChordVoicingBuilder::new(&options, 8);
        let mut draws = Draws(vec![0.99], 0);
        let raw = builder.build_raw(60, &voicing("maj9"), 0.0, &mut draws);
        assert!(!raw.contains(&82));
    }

    #[test]
    fn takeuchi_closes_wide_notes() {
        let options = GenerationOptions::default().with_artist(MARIYA_TAKEUCHI);
        let builder = ChordVoicingBuilder::new(&options, 8);
        let mut draws = Draws(vec![0.99], 0);
        let raw = builder.build_raw(60, &voicing("maj7_9_13"), 0.0, &mut draws);
        // 74 (9th) -> 62, 81 (13th) -> 69.
        assert!(raw.contains(&62));
        assert!(raw.contains(&69));
        assert!(raw.contains(&74));
    }

    #[test]
    fn takeuchi_cascades_through_octaves() {
        let mut notes: BTreeSet<i32> = [60, 86].into_iter().collect();
        apply_artist_rule(MARIYA_TAKEUCHI, &mut notes, 60);
        assert_eq!(notes.into_iter().collect::<Vec<_>>(), vec![60, 62, 74, 86]);
    }

    #[test]
    fn kadomatsu_adds_thirteenth_and_sharp_nine() {
        let mut notes = BTreeSet::new();
        apply_artist_rule(TOSHIKI_KADOMATSU, &mut notes, 60);
        assert_eq!(notes.into_iter().collect::<Vec<_>>(), vec![75, 81]);
    }

    #[test]
    fn build_returns_sorted_spread() {
        let options = GenerationOptions::default();
        let builder = ChordVoicingBuilder::new(&options, 8);
        let mut rng = ChordRng::new(11);
        for step in 0..8 {
            let chord = builder.build(65, &voicing("min11"), 0.8, step, &mut rng);
            assert!(!chord.is_empty());
            assert!(chord.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
