// Deterministic, portable pseudo-random number generator for melody generation.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// Every sampling and generation entry point in `tunesmith_melody` takes a
// `&mut MelodyRng` instead of reaching for a global generator, so a fixed
// seed always reproduces the same melody. Tests rely on this heavily.
//
// Hosts that don't care about reproducibility can call `from_entropy()`,
// which draws the seed from the operating system via `getrandom`. That is the
// only non-deterministic path in this crate; everything after seeding is a
// pure function of the 256-bit state.
//
// **Critical constraint: determinism.** Given the same prior state, every
// method must produce identical output on every platform and optimization
// level. Floating-point values are derived from integer bits only.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG used as the injected random source for generation.
///
/// Each generation request owns (or borrows) its own `MelodyRng`. Nothing in
/// the engine shares one across requests.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MelodyRng {
    s: [u64; 4],
}

impl MelodyRng {
    /// Seed a generator for one melody. The same seed replays the same
    /// melody, which is what `--seed` on the CLI relies on.
    pub fn new(seed: u64) -> Self {
        // SplitMix64 spreads nearby seeds (0, 1, 2, ...) across the state.
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

    /// Create a PRNG seeded from operating-system entropy.
    ///
    /// Returns the seed alongside the generator so callers can log it and
    /// replay the run later with `MelodyRng::new(seed)`.
    pub fn from_entropy() -> Result<(Self, u64), getrandom::Error> {
        let mut buf = [0u8; 8];
        getrandom::getrandom(&mut buf)?;
        let seed = u64::from_le_bytes(buf);
        Ok((Self::new(seed), seed))
    }

    /// Raw 64-bit output. Every other draw is derived from this one.
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

    /// Unit draw for the weighted sampler: `[0, 1)`, upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Unbiased integer in `[low, high)`. Panics on an empty range.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "empty range {low}..{high}");
        let span = high - low;
        if span.is_power_of_two() {
            return low + (self.next_u64() & (span - 1));
        }
        // Outputs below `2^64 mod span` would favour the low buckets.
        let reject_below = span.wrapping_neg() % span;
        loop {
            let draw = self.next_u64();
            if draw >= reject_below {
                return low + draw % span;
            }
        }
    }

    /// Index-sized `range_u64`; used for uniform picks over notes and
    /// contexts.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// Pick one element of `items` uniformly at random.
    ///
    /// Returns `None` for an empty slice and consumes no randomness in that
    /// case, so an empty pick never perturbs the stream.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.range_usize(0, items.len());
        items.get(idx)
    }
}

/// SplitMix64 step.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
