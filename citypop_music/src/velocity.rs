// Per-note dynamics.
//
// Starts from a unit multiplier and applies, in order: out-of-key (x0.6),
// tension (x0.8), alteration (x0.7), chord tone (x1.2), a sine swell over
// the progression, a taper away from middle C, the style factor, a mid-80s
// boost and +/-5% jitter. Only the final velocity is rounded and clamped to
// 1..=127; the register taper can go negative for extreme pitches and is
// left to that final clamp.

use citypop_prng::UniformSource;
use std::f64::consts::PI;

use crate::options::{Era, GenerationOptions, Style};
use crate::scale::ScaleAnalyzer;

#[derive(Debug, Clone, Copy)]
pub struct VelocityShaper<'a> {
    options: &'a GenerationOptions,
    analyzer: ScaleAnalyzer,
}

impl<'a> VelocityShaper<'a> {
    pub fn new(options: &'a GenerationOptions, analyzer: ScaleAnalyzer) -> Self {
        VelocityShaper { options, analyzer }
    }

    /// MIDI velocity for `note` over `root`, from a base velocity in MIDI
    /// units.
    pub fn compute_velocity(
        &self,
        note: i32,
        root: i32,
        base_velocity: f64,
        step: usize,
        is_chord_tone: bool,
        rng: &mut impl UniformSource,
    ) -> u8 {
        let role = self.analyzer.classify(note, root);
        let mut multiplier = 1.0;

        if !role.in_key {
            multiplier *= 0.6;
        }
        if role.is_tension {
            multiplier *= 0.8;
        }
        if role.is_alteration {
            multiplier *= 0.7;
        }
        if is_chord_tone {
            multiplier *= 1.2;
        }

        multiplier *= 1.0 + (step as f64 * PI / 4.0).sin() * 0.1;
        multiplier *= 1.0 - ((note - 60) as f64 / 24.0).abs() * 0.1;

        multiplier *= match self.options.style {
            Some(Style::Ballad) => 0.9,
            Some(Style::Fusion) => 1.1,
            _ => 1.0,
        };
        if self.options.era == Some(Era::MidEighties) {
            multiplier *= 1.1;
        }

        multiplier *= 1.0 + rng.range_f64(-0.05, 0.05);

        clamp_velocity(base_velocity * multiplier)
    }
}

fn clamp_velocity(raw: f64) -> u8 {
    let rounded = raw.round();
    if rounded.is_nan() {
        return 1;
    }
    rounded.clamp(1.0, 127.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::TensionMatching;
    use citypop_prng::ChordRng;

    /// Always draws 0.5, which makes the jitter factor exactly 1.
    struct Midpoint;

    impl UniformSource for Midpoint {
        fn next_f64(&mut self) -> f64 {
            0.5
        }
    }

    fn shaper(options: &GenerationOptions) -> VelocityShaper<'_> {
        VelocityShaper::new(options, ScaleAnalyzer::new(TensionMatching::Compatible))
    }

    #[test]
    fn middle_c_root_chord_tone() {
        let options = GenerationOptions::default();
        // In key, not tension or alteration, chord tone, step 0, no taper:
        // 80 * 1.2 = 96.
        let v = shaper(&options).compute_velocity(60, 60, 80.0, 0, true, &mut Midpoint);
        assert_eq!(v, 96);
    }

    #[test]
    fn out_of_key_alteration_is_softened() {
        let options = GenerationOptions::default();
        // 63 over 60: out of key (0.6) and alteration (0.7) = 0.42.
        let v = shaper(&options).compute_velocity(63, 60, 100.0, 0, false, &mut Midpoint);
        let expected = (100.0_f64 * 0.6 * 0.7 * (1.0 - (3.0 / 24.0) * 0.1)).round() as u8;
        assert_eq!(v, expected);
    }

    #[test]
    fn style_and_era_factors() {
        let ballad = GenerationOptions::default().with_style(Style::Ballad);
        let fusion = GenerationOptions::default()
            .with_style(Style::Fusion)
            .with_era(Era::MidEighties);
        let soft = shaper(&ballad).compute_velocity(60, 60, 100.0, 0, false, &mut Midpoint);
        let loud = shaper(&fusion).compute_velocity(60, 60, 100.0, 0, false, &mut Midpoint);
        assert_eq!(soft, 90);
        assert_eq!(loud, 121);
    }

    #[test]
    fn step_swell_peaks_at_step_two() {
        let options = GenerationOptions::default();
        let s = shaper(&options);
        let at0 = s.compute_velocity(60, 60, 100.0, 0, false, &mut Midpoint);
        let at2 = s.compute_velocity(60, 60, 100.0, 2, false, &mut Midpoint);
        let at6 = s.compute_velocity(60, 60, 100.0, 6, false, &mut Midpoint);
        assert_eq!(at0, 100);
        assert_eq!(at2, 110);
        assert_eq!(at6, 90);
    }

    #[test]
    fn boundary_inputs_stay_in_midi_range() {
        let mut rng = ChordRng::new(2024);
        let mut all_options = vec![GenerationOptions::default()];
        for style in Style::ALL {
            for era in Era::ALL {
                all_options.push(GenerationOptions::default().with_style(style).with_era(era));
            }
        }
        for options in &all_options {
            let s = shaper(options);
            for note in [0, 127, -40, 300] {
                for base in [0.0, 127.0, 1000.0] {
                    for step in 0..8 {
                        for chord_tone in [false, true] {
                            let v = s.compute_velocity(note, 60, base, step, chord_tone, &mut rng);
                            assert!((1..=127).contains(&v), "{v} for note {note} base {base}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn non_finite_clamps_to_floor() {
        assert_eq!(clamp_velocity(f64::NAN), 1);
        assert_eq!(clamp_velocity(f64::INFINITY), 127);
        assert_eq!(clamp_velocity(-3.0), 1);
    }
}
