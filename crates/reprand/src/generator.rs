//! PCG32 core generator.
//!
//! 64 bits of LCG state, 32-bit XSH-RR output, period 2^64. Every other draw
//! in the crate is built on [`Random::next_u32`].

use std::ops::Range;
use std::time::{SystemTime, UNIX_EPOCH};

use shared::{AppError, AppResult};

pub(crate) const PCG_MULTIPLIER: u64 = 6364136223846793005;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Largest value [`Random::next_u32`] can return.
pub const MAX32: u32 = u32::MAX;

/// Deterministic pseudo-random number generator.
///
/// Cloning yields an independent generator with an identical future sequence.
/// Not cryptographically secure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Random {
    pub(crate) seed: u64,
    pub(crate) state: u64,
    pub(crate) inc: u64,
    pub(crate) steps: u64,
}

impl Random {
    pub const MAX32: u32 = MAX32;

    /// Seeds a generator. Identical seeds give identical sequences.
    ///
    /// The stream increment is derived from the seed with splitmix64 so that
    /// neighbouring seeds land on unrelated streams.
    pub fn new(seed: u64) -> Self {
        let inc = (splitmix64(seed) << 1) | 1;
        let mut rng = Self {
            seed,
            state: 0,
            inc,
            steps: 0,
        };
        rng.step();
        rng.state = rng.state.wrapping_add(seed);
        rng.step();
        tracing::trace!(seed, "seeded generator");
        rng
    }

    /// Seeds from the wall clock and process id. The chosen seed is available
    /// through [`Random::seed`] so the run can be reproduced.
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        let seed = splitmix64(nanos ^ (u64::from(std::process::id()) << 32));
        tracing::debug!(seed, "seeded generator from entropy");
        Self::new(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of raw 32-bit draws taken since seeding.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn min(&self) -> u32 {
        0
    }

    pub fn max(&self) -> u32 {
        MAX32
    }

    #[inline]
    fn step(&mut self) {
        self.state = self.state.wrapping_mul(PCG_MULTIPLIER).wrapping_add(self.inc);
    }

    /// Advances the state one step and returns a value uniform over `[0, MAX32]`.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.step();
        self.steps = self.steps.wrapping_add(1);
        let xorshifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Two raw draws, high word first.
    pub fn next_u64(&mut self) -> u64 {
        let high = u64::from(self.next_u32());
        let low = u64::from(self.next_u32());
        (high << 32) | low
    }

    /// Returns a value uniform over `[0, bound)`.
    ///
    /// Raw draws below `2^32 mod bound` are rejected, which removes modulo
    /// bias. Powers of two never reject. Pass [`MAX32`] for the widest range.
    pub fn get_u32(&mut self, bound: u32) -> AppResult<u32> {
        if bound == 0 {
            return Err(AppError::invalid_argument("bound must be greater than zero"));
        }
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let value = self.next_u32();
            if value >= threshold {
                return Ok(value % bound);
            }
        }
    }

    /// Returns a value uniform over `[range.start, range.end)`.
    pub fn get_range(&mut self, range: Range<u32>) -> AppResult<u32> {
        if range.start >= range.end {
            return Err(AppError::invalid_argument(format!(
                "range {}..{} is empty",
                range.start, range.end
            )));
        }
        let offset = self.get_u32(range.end - range.start)?;
        Ok(range.start + offset)
    }

    /// 64-bit counterpart of [`Random::get_u32`].
    pub fn get_u64(&mut self, bound: u64) -> AppResult<u64> {
        if bound == 0 {
            return Err(AppError::invalid_argument("bound must be greater than zero"));
        }
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let value = self.next_u64();
            if value >= threshold {
                return Ok(value % bound);
            }
        }
    }

    /// Returns a value uniform over `[0.0, 1.0)` with 53 bits of precision.
    pub fn get_real64(&mut self) -> f64 {
        let high = u64::from(self.next_u32() >> 5);
        let low = u64::from(self.next_u32() >> 6);
        ((high << 26) | low) as f64 / (1u64 << 53) as f64
    }

    /// Jumps ahead `delta` raw draws in O(log delta) steps.
    pub fn discard(&mut self, delta: u64) {
        let mut acc_mult: u64 = 1;
        let mut acc_plus: u64 = 0;
        let mut cur_mult = PCG_MULTIPLIER;
        let mut cur_plus = self.inc;
        let mut remaining = delta;
        while remaining > 0 {
            if remaining & 1 == 1 {
                acc_mult = acc_mult.wrapping_mul(cur_mult);
                acc_plus = acc_plus.wrapping_mul(cur_mult).wrapping_add(cur_plus);
            }
            cur_plus = cur_mult.wrapping_add(1).wrapping_mul(cur_plus);
            cur_mult = cur_mult.wrapping_mul(cur_mult);
            remaining >>= 1;
        }
        self.state = acc_mult.wrapping_mul(self.state).wrapping_add(acc_plus);
        self.steps = self.steps.wrapping_add(delta);
    }

    /// Fills `buffer` with `get_u32(MAX32) % max_value`.
    ///
    /// This is modulo-biased whenever `max_value` does not divide `MAX32`.
    /// Existing callers depend on that distribution; use [`Random::get_u32`]
    /// when an unbiased value is needed.
    pub fn fill_bounded_u32(&mut self, buffer: &mut [u32], max_value: u32) -> AppResult<()> {
        if max_value == 0 {
            return Err(AppError::invalid_argument("max_value must be greater than zero"));
        }
        for slot in buffer.iter_mut() {
            *slot = self.get_u32(MAX32)? % max_value;
        }
        Ok(())
    }

    /// See [`crate::sample::sample`].
    pub fn sample<T: Copy>(&mut self, population: &[T], choices: &mut [T]) -> AppResult<()> {
        crate::sample::sample(self, population, choices)
    }

    /// See [`crate::shuffle::shuffle`].
    pub fn shuffle<T>(&mut self, sequence: &mut [T]) -> AppResult<()> {
        crate::shuffle::shuffle(self, sequence)
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new(0)
    }
}

fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn golden_sequence_seed_42() {
        let mut rng = Random::new(42);
        assert_eq!(rng.next_u32(), 1302218142);
        assert_eq!(rng.next_u32(), 546223573);
        assert_eq!(rng.next_u32(), 1626099707);
        assert_eq!(rng.steps(), 3);
    }

    #[test]
    fn golden_sequence_default_seed() {
        let mut rng = Random::default();
        assert_eq!(rng.seed(), 0);
        assert_eq!(rng.next_u32(), 2489713799);
        assert_eq!(rng.next_u32(), 3909064955);
        assert_eq!(rng.next_u32(), 2768585077);
    }

    #[test]
    fn seeding_registers() {
        let rng = Random::new(42);
        assert_eq!(rng.state, 12510550038254055452);
        assert_eq!(rng.inc, 8912170991800999211);
        assert_eq!(rng.inc & 1, 1);
        assert_eq!(rng.steps, 0);
    }

    #[test]
    fn bounds_are_constant() {
        let rng = Random::new(5);
        assert_eq!(rng.min(), 0);
        assert_eq!(rng.max(), MAX32);
        assert_eq!(Random::MAX32, u32::MAX);
    }

    #[test]
    fn bounded_golden_values() {
        let mut rng = Random::new(42);
        let values: Vec<u32> = (0..5).map(|_| rng.get_u32(10).unwrap()).collect();
        assert_eq!(values, vec![2, 3, 7, 7, 4]);
    }

    #[test]
    fn zero_bound_is_rejected_without_drawing() {
        let mut rng = Random::new(1);
        let err = rng.get_u32(0).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert!(matches!(rng.get_u64(0), Err(AppError::InvalidArgument(_))));
        assert_eq!(rng.steps(), 0);
    }

    #[test]
    fn bound_of_one_always_returns_zero() {
        let mut rng = Random::new(9);
        for _ in 0..100 {
            assert_eq!(rng.get_u32(1).unwrap(), 0);
        }
    }

    #[test]
    fn range_draws_stay_inside() {
        let mut rng = Random::new(77);
        for _ in 0..1000 {
            let value = rng.get_range(10..20).unwrap();
            assert!((10..20).contains(&value));
        }
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut rng = Random::new(77);
        assert!(matches!(rng.get_range(5..5), Err(AppError::InvalidArgument(_))));
        #[allow(clippy::reversed_empty_ranges)]
        let inverted = rng.get_range(9..3);
        assert!(matches!(inverted, Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn real_golden_values() {
        let mut rng = Random::new(42);
        assert_eq!(rng.get_real64(), 0.3031962821422337);
        assert_eq!(rng.get_real64(), 0.3786058381731776);
        assert_eq!(rng.steps(), 4);
    }

    #[test]
    fn real_stays_below_one() {
        let mut rng = Random::new(3);
        for _ in 0..10_000 {
            let value = rng.get_real64();
            assert!((0.0..1.0).contains(&value), "value out of range: {value}");
        }
    }

    #[test]
    fn next_u64_combines_high_then_low() {
        let mut words = Random::new(11);
        let high = u64::from(words.next_u32());
        let low = u64::from(words.next_u32());

        let mut rng = Random::new(11);
        assert_eq!(rng.next_u64(), (high << 32) | low);
    }

    #[test]
    fn discard_matches_sequential_draws() {
        let mut stepped = Random::new(7);
        for _ in 0..1000 {
            stepped.next_u32();
        }
        let mut jumped = Random::new(7);
        jumped.discard(1000);
        assert_eq!(stepped, jumped);
        assert_eq!(stepped.next_u32(), jumped.next_u32());
    }

    #[test]
    fn discard_zero_is_identity() {
        let mut rng = Random::new(7);
        let before = rng.clone();
        rng.discard(0);
        assert_eq!(rng, before);
    }

    #[test]
    fn clone_continues_identically() {
        let mut rng = Random::new(123);
        rng.next_u32();
        let mut forked = rng.clone();
        for _ in 0..100 {
            assert_eq!(rng.next_u32(), forked.next_u32());
        }
    }

    #[test]
    fn fill_bounded_golden_values() {
        let mut rng = Random::new(42);
        let mut buffer = [0u32; 5];
        rng.fill_bounded_u32(&mut buffer, 6).unwrap();
        assert_eq!(buffer, [0, 1, 5, 1, 2]);
    }

    #[test]
    fn fill_bounded_rejects_zero_before_writing() {
        let mut rng = Random::new(42);
        let mut buffer = [7u32; 4];
        let err = rng.fill_bounded_u32(&mut buffer, 0).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert_eq!(buffer, [7; 4]);
        assert_eq!(rng.steps(), 0);
    }

    #[test]
    fn from_entropy_is_reproducible_from_its_seed() {
        let mut rng = Random::from_entropy();
        let mut replay = Random::new(rng.seed());
        for _ in 0..10 {
            assert_eq!(rng.next_u32(), replay.next_u32());
        }
    }
}
