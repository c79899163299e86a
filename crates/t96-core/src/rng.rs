//! Seeded deterministic random number generation.
//!
//! [`Mulberry32`] is a tiny 32-bit generator whose output stream depends
//! only on its seed, so the same seed replays the same run on every
//! platform. All helpers are expressed in terms of the float stream.

use rand::Rng;

/// Largest seed value handed out for new runs (exclusive upper bound).
pub const SEED_MODULUS: u32 = 2_147_483_647;

/// Mulberry32 generator producing floats in `[0, 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Create a generator from a seed.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6d2b_79f5);
        let s = self.state;
        let mut t = (s ^ (s >> 15)).wrapping_mul(1 | s);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t)) ^ t;
        f64::from(t ^ (t >> 14)) / 4_294_967_296.0
    }

    /// Integer in `[min, max)`. Returns `min` when the range is empty.
    pub fn int_range(&mut self, min: i64, max: i64) -> i64 {
        let r = self.next_f64();
        if max <= min {
            return min;
        }
        (r * (max - min) as f64).floor() as i64 + min
    }

    /// Float in `[min, max)`.
    pub fn float_range(&mut self, min: f64, max: f64) -> f64 {
        self.next_f64() * (max - min) + min
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick one element, or `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.int_range(0, items.len() as i64) as usize;
        items.get(idx)
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.int_range(0, i as i64 + 1) as usize;
            items.swap(i, j);
        }
    }

    /// Draw a successor state for threading through [`crate::GameState::rng_state`].
    pub fn next_state(&mut self) -> u32 {
        self.int_range(0, i64::from(SEED_MODULUS)) as u32
    }
}

/// A single float drawn from a fresh generator for `seed`.
pub fn roll(seed: u32) -> f64 {
    Mulberry32::new(seed).next_f64()
}

/// Fresh non-zero seed for a new run.
pub fn generate_seed() -> u32 {
    generate_seed_with(&mut rand::rng())
}

/// Fresh non-zero seed drawn from the given entropy source.
pub fn generate_seed_with<R: Rng>(rng: &mut R) -> u32 {
    match rng.random::<u32>() % SEED_MODULUS {
        0 => 1,
        seed => seed,
    }
}

/// Stable 32-bit FNV-1a hash used to key generators by text.
pub fn hash_str(text: &str) -> u32 {
    text.bytes().fold(0x811c_9dc5_u32, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn known_sequence() {
        let mut rng = Mulberry32::new(42);
        assert!((rng.next_f64() - 0.601_103_751_920_163_6).abs() < 1e-12);
        assert!((rng.next_f64() - 0.448_290_558_997_541_67).abs() < 1e-12);
        assert!((rng.next_f64() - 0.852_465_793_490_409_9).abs() < 1e-12);
    }

    #[test]
    fn empty_pick_and_range() {
        let mut rng = Mulberry32::new(7);
        let empty: [u8; 0] = [];
        assert!(rng.pick(&empty).is_none());
        assert_eq!(rng.int_range(5, 5), 5);
    }

    #[test]
    fn generated_seeds_are_nonzero() {
        let mut entropy = StdRng::seed_from_u64(99);
        for _ in 0..1000 {
            let seed = generate_seed_with(&mut entropy);
            assert!(seed > 0 && seed < SEED_MODULUS);
        }
        assert_ne!(generate_seed(), 0);
    }

    #[test]
    fn hash_is_stable() {
        assert_eq!(hash_str(""), 0x811c_9dc5);
        assert_eq!(hash_str("/tmp/a"), hash_str("/tmp/a"));
        assert_ne!(hash_str("/tmp/a"), hash_str("/tmp/b"));
    }

    proptest! {
        #[test]
        fn same_seed_same_stream(seed in any::<u32>()) {
            let mut a = Mulberry32::new(seed);
            let mut b = Mulberry32::new(seed);
            for _ in 0..32 {
                let x = a.next_f64();
                prop_assert!((0.0..1.0).contains(&x));
                prop_assert_eq!(x.to_bits(), b.next_f64().to_bits());
            }
        }

        #[test]
        fn int_range_in_bounds(seed in any::<u32>(), min in -50i64..50, span in 1i64..100) {
            let mut rng = Mulberry32::new(seed);
            let v = rng.int_range(min, min + span);
            prop_assert!(v >= min && v < min + span);
        }

        #[test]
        fn shuffle_is_permutation(seed in any::<u32>(), len in 0usize..20) {
            let mut rng = Mulberry32::new(seed);
            let mut items: Vec<usize> = (0..len).collect();
            rng.shuffle(&mut items);
            let mut sorted = items.clone();
            sorted.sort_unstable();
            prop_assert_eq!(sorted, (0..len).collect::<Vec<_>>());
        }
    }
}
