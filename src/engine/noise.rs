//! Noise Module
//!
//! Injectable noise sources for the synthetic generators. Trend computation
//! never reads from these, so disabling noise leaves every ordering property
//! of a series exact.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// == Noise Source ==
/// Produces zero-centred jitter.
pub trait NoiseSource: Send {
    /// Returns a sample in `[-amplitude / 2, amplitude / 2]`.
    fn jitter(&mut self, amplitude: f64) -> f64;
}

/// Noise source that always returns zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNoise;

impl NoiseSource for NoNoise {
    fn jitter(&mut self, _amplitude: f64) -> f64 {
        0.0
    }
}

/// Reproducible noise backed by ChaCha8.
#[derive(Debug, Clone)]
pub struct SeededNoise {
    rng: ChaCha8Rng,
}

impl SeededNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seeds from the thread-local generator.
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }
}

impl NoiseSource for SeededNoise {
    fn jitter(&mut self, amplitude: f64) -> f64 {
        (self.rng.random::<f64>() - 0.5) * amplitude
    }
}

// == Noise Policy ==
/// How a query obtains its noise source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoisePolicy {
    /// No noise; series are exactly the trend.
    Disabled,
    /// Per-key seed derived from a base seed; a key always yields the same series.
    Seeded(u64),
    /// Fresh randomness on every fetch.
    Entropy,
}

impl NoisePolicy {
    /// Builds the noise source for one fetch of `key`.
    pub fn source_for(&self, key: &str) -> Box<dyn NoiseSource> {
        match self {
            NoisePolicy::Disabled => Box::new(NoNoise),
            NoisePolicy::Seeded(seed) => Box::new(SeededNoise::new(key_seed(*seed, key))),
            NoisePolicy::Entropy => Box::new(SeededNoise::from_entropy()),
        }
    }
}

// == Key Seeds ==
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a step over `bytes`, continuing from `state`.
fn fnv1a(state: u64, bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(state, |hash, &b| (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME))
}

/// Seed for one key, stable across platforms and toolchains.
fn key_seed(seed: u64, key: &str) -> u64 {
    fnv1a(fnv1a(FNV_OFFSET, &seed.to_le_bytes()), key.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_noise_is_zero() {
        let mut noise = NoNoise;
        assert_eq!(noise.jitter(10.0), 0.0);
    }

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(fnv1a(FNV_OFFSET, b""), FNV_OFFSET);
        assert_eq!(fnv1a(FNV_OFFSET, b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv1a(FNV_OFFSET, b"foobar"), 0x8594_4171_f739_67e8);
        // chunked input hashes like the concatenation
        assert_eq!(fnv1a(fnv1a(FNV_OFFSET, b"foo"), b"bar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn test_key_seed_depends_on_seed_and_key() {
        assert_eq!(key_seed(7, "k"), key_seed(7, "k"));
        assert_ne!(key_seed(7, "k"), key_seed(8, "k"));
        assert_ne!(key_seed(7, "k"), key_seed(7, "j"));
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let mut a = SeededNoise::new(42);
        let mut b = SeededNoise::new(42);
        for _ in 0..32 {
            assert_eq!(a.jitter(1.0), b.jitter(1.0));
        }
    }

    #[test]
    fn test_jitter_stays_within_half_amplitude() {
        let mut noise = SeededNoise::new(7);
        for _ in 0..1000 {
            let sample = noise.jitter(0.2);
            assert!((-0.1..=0.1).contains(&sample));
        }
    }

    #[test]
    fn test_seeded_policy_is_keyed() {
        let policy = NoisePolicy::Seeded(1);
        let mut same_a = policy.source_for("a");
        let mut same_b = policy.source_for("a");
        let mut other = policy.source_for("b");

        let first = same_a.jitter(1.0);
        assert_eq!(first, same_b.jitter(1.0));
        assert_ne!(first, other.jitter(1.0));
    }
}
