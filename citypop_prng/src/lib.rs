// Injectable randomness for the chord generator.
//
// Every probabilistic decision in `citypop_music` (era octave shifts, tension
// picks, doublings, jitter, velocity noise) draws from a `UniformSource`
// passed in by the caller. Nothing in the generator reaches for a global
// RNG, so tests can seed a `ChordRng` or script exact draws.
//
// `ChordRng` implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64
// seeding. It is hand-rolled with zero dependencies so that a given seed
// produces the same stream on every platform.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of uniform draws in `[0, 1)`.
///
/// Implementors only supply `next_f64`; the helpers are expressed in terms
/// of it so every component consumes randomness the same way.
pub trait UniformSource {
    /// Draw a uniform `f64` in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Return `true` with probability `p`. `p <= 0` never fires, `p >= 1`
    /// always does.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform index in `[0, len)`. Panics if `len == 0`.
    fn pick_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "pick_index: cannot pick from an empty collection");
        let idx = (self.next_f64() * len as f64) as usize;
        idx.min(len - 1)
    }

    /// Uniform value in `[low, high)`.
    fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_f64() * (high - low)
    }

    /// Uniform value in `[-width / 2, width / 2)`, i.e. `(u - 0.5) * width`.
    fn centered(&mut self, width: f64) -> f64 {
        (self.next_f64() - 0.5) * width
    }
}

impl<T: UniformSource + ?Sized> UniformSource for &mut T {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Xoshiro256++ PRNG.
#[derive(Clone, Debug)]
pub struct ChordRng {
    s: [u64; 4],
}

impl ChordRng {
    /// Create a generator from a `u64` seed. Equal seeds give equal streams.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Create a generator seeded from process entropy (std's randomly keyed
    /// hasher mixed with the wall clock).
    pub fn from_entropy() -> Self {
        let mut hasher = RandomState::new().build_hasher();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        hasher.write_u64(nanos);
        hasher.write_u32(std::process::id());
        Self::new(hasher.finish())
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }
}

impl UniformSource for ChordRng {
    /// Upper 53 bits of a `u64` fill the f64 mantissa.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// SplitMix64, used only to expand a `u64` seed into xoshiro state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
