// Register placement and spacing for one chord.
//
// A fixed sequence of passes over the sorted pitches:
//   1. sort
//   2. minimum spacing (ballad 3, else 2): a note too close to its
//      predecessor goes up an octave; single pass, not re-checked
//   3. octave doubling of one random note (always for fusion, else 40%)
//   4. era folding: mid80s folds notes more than `max_spacing` above the
//      bottom note down an octave, 70s uses half that
//   5. artist adjustment (Yamashita adds a top octave, Takeuchi folds at
//      max_spacing / 1.5)
//   6. register clamp into roughly 36..=84, one octave move at most
//   7. widening: later steps are more likely to get an extra top note,
//      with probability step / progression_length
//   8. sort
//
// The folding passes measure from the bottom note as it stood when the pass
// began. Every pass is single-shot; a note may end up outside the clamp
// window or closer than the minimum spacing after later passes.

use citypop_prng::UniformSource;

use crate::options::{Era, GenerationOptions, MARIYA_TAKEUCHI, Style, TATSURO_YAMASHITA};

pub const REGISTER_LOW: i32 = 36;
pub const REGISTER_HIGH: i32 = 84;

const DOUBLING_CHANCE: f64 = 0.4;

#[derive(Debug, Clone, Copy)]
pub struct SpreadOptimizer<'a> {
    options: &'a GenerationOptions,
    progression_length: usize,
}

impl<'a> SpreadOptimizer<'a> {
    pub fn new(options: &'a GenerationOptions, progression_length: usize) -> Self {
        SpreadOptimizer {
            options,
            progression_length: progression_length.max(1),
        }
    }

    pub fn min_spacing(&self) -> i32 {
        match self.options.effective_style() {
            Style::Ballad => 3,
            _ => 2,
        }
    }

    pub fn max_spacing(&self) -> i32 {
        match self.options.effective_style() {
            Style::Fusion => 24,
            _ => 12,
        }
    }

    /// Run every pass and return the pitches ascending.
    pub fn spread(&self, notes: &[i32], step: usize, rng: &mut impl UniformSource) -> Vec<i32> {
        let mut spread = notes.to_vec();
        spread.sort_unstable();
        if spread.is_empty() {
            return spread;
        }

        enforce_min_spacing(&mut spread, self.min_spacing());

        if self.options.effective_style() == Style::Fusion || rng.chance(DOUBLING_CHANCE) {
            let doubled = spread[rng.pick_index(spread.len())];
            spread.push(doubled + 12);
        }

        let max_spacing = self.max_spacing() as f64;
        match self.options.era {
            Some(Era::MidEighties) => fold_above_bottom(&mut spread, max_spacing),
            Some(Era::Seventies) => fold_above_bottom(&mut spread, max_spacing / 2.0),
            _ => {}
        }

        match self.options.artist() {
            Some(TATSURO_YAMASHITA) => {
                if rng.chance(0.5) {
                    push_above_top(&mut spread, 12);
                }
            }
            Some(MARIYA_TAKEUCHI) => fold_above_bottom(&mut spread, max_spacing / 1.5),
            _ => {}
        }

        clamp_register(&mut spread);

        if step > 0 {
            let widen_chance = step as f64 / self.progression_length as f64;
            if rng.chance(widen_chance) {
                let interval = if rng.chance(0.5) { 12 } else { 7 };
                push_above_top(&mut spread, interval);
            }
        }

        spread.sort_unstable();
        spread
    }
}

/// Single left-to-right pass: any note closer than `min` to its predecessor
/// is raised an octave.
pub fn enforce_min_spacing(sorted: &mut [i32], min: i32) {
    for i in 1..sorted.len() {
        if sorted[i] - sorted[i - 1] < min {
            sorted[i] += 12;
        }
    }
}

fn fold_above_bottom(notes: &mut [i32], threshold: f64) {
    let Some(&bottom) = notes.first() else {
        return;
    };
    for note in notes.iter_mut() {
        if (*note - bottom) as f64 > threshold {
            *note -= 12;
        }
    }
}

fn push_above_top(notes: &mut Vec<i32>, interval: i32) {
    if let Some(&top) = notes.iter().max() {
        notes.push(top + interval);
    }
}

fn clamp_register(notes: &mut [i32]) {
    for note in notes.iter_mut() {
        if *note < REGISTER_LOW {
            *note += 12;
        } else if *note > REGISTER_HIGH {
            *note -= 12;
        }
    }
}
