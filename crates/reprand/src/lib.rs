//! Deterministic pseudo-random numbers for numerical code.
//!
//! [`Random`] is a seeded PCG32 generator with unbiased bounded draws,
//! sampling without replacement, Fisher–Yates shuffling and an exact text
//! encoding of its state for checkpoints.
//!
//! ```
//! use reprand::Random;
//!
//! let mut rng = Random::new(42);
//! let die = rng.get_u32(6).unwrap() + 1;
//! assert!((1..=6).contains(&die));
//!
//! let checkpoint = reprand::encode(&rng);
//! let mut restored = reprand::decode(&checkpoint).unwrap();
//! assert_eq!(restored.next_u32(), rng.next_u32());
//! ```
//!
//! A generator is a plain value. Use one per thread, or guard a shared one
//! with a lock.

pub mod generator;
pub mod sample;
pub mod shuffle;
pub mod state;

pub use generator::{Random, MAX32};
pub use sample::sample;
pub use shuffle::shuffle;
pub use state::{decode, encode};
