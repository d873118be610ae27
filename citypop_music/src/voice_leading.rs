// Greedy voice leading between consecutive chords.
//
// Each note of the new chord is compared, independently, with its nearest
// note in the previous chord. If that nearest note is more than a fifth
// away, the new note moves one octave toward it, provided the result stays
// a valid MIDI pitch. This keeps chords from leaping around without trying
// to minimize total movement.

/// Largest jump (semitones) left alone.
pub const MAX_LEAP: i32 = 7;

/// Adjust `current` toward `previous`. Order of `current` is preserved.
pub fn reconcile(current: &[i32], previous: &[i32]) -> Vec<i32> {
    if previous.is_empty() {
        return current.to_vec();
    }
    current.iter().map(|&note| lead_note(note, previous)).collect()
}

fn lead_note(note: i32, previous: &[i32]) -> i32 {
    let Some(nearest) = nearest(note, previous) else {
        return note;
    };
    if (nearest - note).abs() <= MAX_LEAP {
        return note;
    }
    let moved = if nearest > note { note + 12 } else { note - 12 };
    if (0..=127).contains(&moved) { moved } else { note }
}

/// Nearest pitch in `pool`; ties keep the earliest.
fn nearest(note: i32, pool: &[i32]) -> Option<i32> {
    pool.iter().copied().reduce(|best, candidate| {
        if (candidate - note).abs() < (best - note).abs() {
            candidate
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use citypop_prng::{ChordRng, UniformSource};

    fn random_chord(rng: &mut ChordRng, lo: i32, hi: i32) -> Vec<i32> {
        let size = 3 + rng.pick_index(4);
        (0..size)
            .map(|_| lo + rng.pick_index((hi - lo + 1) as usize) as i32)
            .collect()
    }

    #[test]
    fn empty_previous_is_noop() {
        assert_eq!(reconcile(&[40, 90], &[]), vec![40, 90]);
    }

    #[test]
    fn close_chords_are_unchanged() {
        assert_eq!(reconcile(&[60, 64, 67], &[60, 65, 69]), vec![60, 64, 67]);
    }

    #[test]
    fn distant_notes_move_an_octave_toward_previous() {
        // 84 is 12 above 72 -> down to 72. 40 is 8 below 48 -> up to 52.
        assert_eq!(reconcile(&[84, 40], &[48, 72]), vec![72, 52]);
    }

    #[test]
    fn exactly_a_fifth_stays() {
        assert_eq!(reconcile(&[67], &[60]), vec![67]);
        assert_eq!(reconcile(&[68], &[60]), vec![56]);
    }

    #[test]
    fn move_outside_midi_range_is_refused() {
        assert_eq!(reconcile(&[120], &[60]), vec![108]);
        assert_eq!(reconcile(&[5], &[30]), vec![17]);
        assert_eq!(reconcile(&[125], &[140]), vec![125]);
        assert_eq!(reconcile(&[3], &[-20]), vec![3]);
    }

    #[test]
    fn order_is_preserved_and_duplicates_allowed() {
        // Both notes land on 60; the engine does not dedupe.
        assert_eq!(reconcile(&[72, 48], &[60]), vec![60, 60]);
    }

    #[test]
    fn ties_keep_first_candidate() {
        assert_eq!(nearest(60, &[50, 70]), Some(50));
        assert_eq!(nearest(60, &[70, 50]), Some(70));
    }

    #[test]
    fn random_close_chords_are_unchanged() {
        let mut rng = ChordRng::new(808);
        for _ in 0..1000 {
            let previous = random_chord(&mut rng, 30, 100);
            // Every note within a fifth of some previous note.
            let current: Vec<i32> = (0..1 + rng.pick_index(6))
                .map(|_| {
                    let anchor = previous[rng.pick_index(previous.len())];
                    anchor + rng.pick_index(15) as i32 - MAX_LEAP
                })
                .collect();
            assert_eq!(reconcile(&current, &previous), current, "prev {previous:?}");
        }
    }

    #[test]
    fn random_chords_move_at_most_an_octave() {
        let mut rng = ChordRng::new(909);
        for _ in 0..1000 {
            let previous = random_chord(&mut rng, 0, 127);
            let current = random_chord(&mut rng, 0, 127);
            let led = reconcile(&current, &previous);
            assert_eq!(led.len(), current.len());
            for (&before, &after) in current.iter().zip(&led) {
                assert!((0..=127).contains(&after));
                assert!(after == before || (after - before).abs() == 12);
            }
        }
    }
}
