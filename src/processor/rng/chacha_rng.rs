use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{Mode, ZRng};

/// Seedable, reproducible RNG.
///
/// Stories rely on seeded determinism for test transcripts, so the
/// generator is an explicitly-seeded ChaCha8 rather than a platform
/// default.
pub struct ChaChaRng {
    mode: Mode,
    predictable_range: u16,
    predictable_next: u16,
    rng: ChaCha8Rng,
}

impl ChaChaRng {
    pub fn new() -> ChaChaRng {
        ChaChaRng {
            mode: Mode::Random,
            predictable_range: 1,
            predictable_next: 1,
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl Default for ChaChaRng {
    fn default() -> Self {
        ChaChaRng::new()
    }
}

impl ZRng for ChaChaRng {
    fn type_name(&self) -> &str {
        "ChaChaRng"
    }

    fn seed(&mut self, seed: u16) {
        if seed == 0 {
            self.rng = ChaCha8Rng::from_entropy();
        } else {
            self.rng = ChaCha8Rng::seed_from_u64(seed as u64)
        }
        self.mode = Mode::Random;
    }

    fn predictable(&mut self, seed: u16) {
        self.predictable_range = seed;
        self.predictable_next = 1;
        self.mode = Mode::Predictable;
    }

    fn random(&mut self, range: u16) -> u16 {
        match self.mode {
            Mode::Predictable => {
                let v = ((self.predictable_next - 1) % range) + 1;
                if self.predictable_next >= self.predictable_range {
                    self.predictable_next = 1;
                } else {
                    self.predictable_next += 1;
                }
                v
            }
            Mode::Random => self.rng.gen_range(1..=range),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_determinism() {
        let mut a = ChaChaRng::new();
        let mut b = ChaChaRng::new();
        a.seed(12345);
        b.seed(12345);
        for _ in 0..100 {
            assert_eq!(a.random(100), b.random(100));
        }
    }

    #[test]
    fn test_random_range() {
        let mut rng = ChaChaRng::new();
        rng.seed(0x5EED);
        for _ in 0..1000 {
            let v = rng.random(6);
            assert!((1..=6).contains(&v));
        }
        for _ in 0..100 {
            assert_eq!(rng.random(1), 1);
        }
    }

    #[test]
    fn test_predictable_cycles() {
        let mut rng = ChaChaRng::new();
        rng.predictable(3);
        // Sequence 1, 2, 3, repeating
        assert_eq!(rng.random(100), 1);
        assert_eq!(rng.random(100), 2);
        assert_eq!(rng.random(100), 3);
        assert_eq!(rng.random(100), 1);
    }

    #[test]
    fn test_predictable_caps_at_range() {
        let mut rng = ChaChaRng::new();
        rng.predictable(5);
        // Values wrap within the requested range
        assert_eq!(rng.random(2), 1);
        assert_eq!(rng.random(2), 2);
        assert_eq!(rng.random(2), 1);
        assert_eq!(rng.random(2), 2);
        assert_eq!(rng.random(2), 1);
        // Sequence restarts after the predictable limit
        assert_eq!(rng.random(2), 1);
    }

    #[test]
    fn test_seed_leaves_predictable_mode() {
        let mut rng = ChaChaRng::new();
        rng.predictable(3);
        assert_eq!(rng.random(100), 1);
        rng.seed(999);
        let mut other = ChaChaRng::new();
        other.seed(999);
        assert_eq!(rng.random(100), other.random(100));
    }
}
