//! Text encoding of generator state.
//!
//! A generator is written as a single line:
//!
//! ```text
//! random-v1 <seed> <state> <inc> <steps> endrandom-v1
//! ```
//!
//! All numbers are unsigned decimal. Decoding checks that the registers are
//! the ones reached from `seed` after `steps` draws, so a hand-edited or
//! truncated line is reported instead of silently producing a different
//! stream.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use shared::{AppError, AppResult};

use crate::generator::Random;

const HEADER: &str = "random-v1";
const FOOTER: &str = "endrandom-v1";
const FIELD_COUNT: usize = 6;

pub fn encode(rng: &Random) -> String {
    format!(
        "{HEADER} {} {} {} {} {FOOTER}",
        rng.seed, rng.state, rng.inc, rng.steps
    )
}

pub fn decode(text: &str) -> AppResult<Random> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.is_empty() {
        return Err(reject("empty state"));
    }
    if fields.len() != FIELD_COUNT {
        return Err(reject(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        )));
    }
    if fields[0] != HEADER {
        return Err(reject(format!("unknown header '{}'", fields[0])));
    }
    if fields[5] != FOOTER {
        return Err(reject(format!("unknown footer '{}'", fields[5])));
    }

    let seed = parse_field("seed", fields[1])?;
    let state = parse_field("state", fields[2])?;
    let inc = parse_field("inc", fields[3])?;
    let steps = parse_field("steps", fields[4])?;

    if inc & 1 == 0 {
        return Err(reject("stream increment must be odd"));
    }

    let mut expected = Random::new(seed);
    expected.discard(steps);
    if expected.state != state || expected.inc != inc {
        return Err(reject(format!(
            "registers do not match seed {seed} after {steps} steps"
        )));
    }

    Ok(Random {
        seed,
        state,
        inc,
        steps,
    })
}

fn parse_field(name: &str, raw: &str) -> AppResult<u64> {
    raw.parse::<u64>()
        .map_err(|err| reject(format!("field {name} '{raw}' is not an unsigned integer: {err}")))
}

fn reject(reason: impl Into<String>) -> AppError {
    let reason = reason.into();
    tracing::debug!(%reason, "rejected serialized generator state");
    AppError::CorruptState(reason)
}

impl fmt::Display for Random {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

impl FromStr for Random {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

impl Serialize for Random {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(self))
    }
}

impl<'de> Deserialize<'de> for Random {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode(&text).map_err(de::Error::custom)
    }
}
