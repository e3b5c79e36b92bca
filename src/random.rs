//! Deterministic pseudo-random generator.
//!
//! A 64-bit linear congruential generator. Everything the fuzzer does is derived
//! from this stream, so the same seed always replays the same run.

use std::ops::AddAssign;

const MULTIPLIER: u64 = 6364136223846793005;
const INCREMENT: u64 = 1442695040888963407;

#[derive(Debug, Clone)]
pub struct Random {
    state: u64,
}

impl Random {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Current internal state. Seeding a fresh generator with it replays the
    /// stream from this point on.
    pub fn seed(&self) -> u64 {
        self.state
    }

    pub fn reseed(&mut self, seed: u64) {
        self.state = seed;
    }

    /// Perturb the state by `a`, then advance it.
    ///
    /// A sum that wraps to zero is replaced by 1.
    pub fn add(&mut self, a: u64) {
        self.state = self.state.wrapping_add(a);
        if self.state == 0 {
            self.state = 1;
        }
        self.next();
    }

    /// Advance the state by one LCG step.
    ///
    /// # Panics
    ///
    /// Panics if the state becomes zero.
    pub fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        assert_ne!(self.state, 0, "Generator state must never be zero");
        self.state
    }

    /// Generate a 32-bit value from the upper half of the state.
    pub fn generate(&mut self) -> u32 {
        (self.next() >> 32) as u32
    }

    pub fn generate_int(&mut self) -> i32 {
        self.generate() as i32
    }

    pub fn generate_bool(&mut self) -> bool {
        self.generate() < (1 << 31)
    }

    /// Generate an integer in the inclusive range `[l, r]`.
    ///
    /// # Panics
    ///
    /// Panics if `l > r`.
    pub fn pick_int(&mut self, l: i32, r: i32) -> i32 {
        assert!(l <= r, "Empty range [{}, {}]", l, r);
        let delta = (r as u32).wrapping_sub(l as u32).wrapping_add(1);
        let raw = self.generate();
        let scaled = if delta != 0 {
            let fraction = raw as f64 / 4294967296.0;
            (delta as f64 * fraction) as u32
        } else {
            raw
        };
        let res = (l as u32).wrapping_add(scaled) as i32;
        assert!(l <= res && res <= r);
        res
    }
}

impl AddAssign<u64> for Random {
    fn add_assign(&mut self, a: u64) {
        self.add(a);
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = Random::new(42);
        let mut b = Random::new(42);
        for i in 0..1000 {
            assert_eq!(a.pick_int(-i, i), b.pick_int(-i, i));
            assert_eq!(a.generate_bool(), b.generate_bool());
        }
        assert_eq!(a.seed(), b.seed());
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = Random::new(1);
        let mut b = Random::new(2);
        let xs: Vec<u32> = (0..16).map(|_| a.generate()).collect();
        let ys: Vec<u32> = (0..16).map(|_| b.generate()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_first_step_from_zero() {
        let mut rand = Random::new(0);
        assert_eq!(rand.next(), INCREMENT);
        assert_eq!(rand.seed(), INCREMENT);
    }

    #[test]
    fn test_generate_is_upper_half() {
        let mut rand = Random::new(7);
        let mut copy = rand.clone();
        let state = copy.next();
        assert_eq!(rand.generate(), (state >> 32) as u32);
    }

    #[test]
    fn test_reseed_replays() {
        let mut rand = Random::new(123);
        rand.generate();
        let checkpoint = rand.seed();
        let first: Vec<i32> = (0..10).map(|_| rand.pick_int(0, 100)).collect();
        rand.reseed(checkpoint);
        let second: Vec<i32> = (0..10).map(|_| rand.pick_int(0, 100)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pick_int_bounds() {
        let mut rand = Random::new(2024);
        for _ in 0..10_000 {
            let x = rand.pick_int(-3, 5);
            assert!((-3..=5).contains(&x));
        }
        assert_eq!(rand.pick_int(7, 7), 7);
    }

    #[test]
    fn test_pick_int_full_range() {
        let mut rand = Random::new(99);
        let mut copy = rand.clone();
        let raw = copy.generate();
        let x = rand.pick_int(i32::MIN, i32::MAX);
        assert_eq!(x, (i32::MIN as u32).wrapping_add(raw) as i32);
    }

    #[test]
    fn test_pick_int_covers_range() {
        let mut rand = Random::new(5);
        let mut seen = [false; 6];
        for _ in 0..1000 {
            seen[rand.pick_int(0, 5) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_generate_bool_both_values() {
        let mut rand = Random::new(11);
        let trues = (0..1000).filter(|_| rand.generate_bool()).count();
        assert!(trues > 300 && trues < 700);
    }

    #[test]
    fn test_add_perturbs_then_steps() {
        let mut rand = Random::new(10);
        rand.add(5);
        let mut expected = Random::new(15);
        expected.next();
        assert_eq!(rand.seed(), expected.seed());

        let mut other = Random::new(10);
        other += 5;
        assert_eq!(other.seed(), rand.seed());
    }

    #[test]
    fn test_add_wrapping_to_zero_uses_one() {
        let mut rand = Random::new(u64::MAX);
        rand.add(1);
        let mut expected = Random::new(1);
        expected.next();
        assert_eq!(rand.seed(), expected.seed());
    }

    #[test]
    #[should_panic(expected = "Empty range")]
    fn test_pick_int_empty_range_panics() {
        Random::new(1).pick_int(3, 2);
    }
}
