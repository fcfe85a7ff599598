//! In-place Fisher–Yates shuffle.

use shared::{AppError, AppResult};
use tracing::instrument;

use crate::generator::{Random, MAX32};

/// Permutes `sequence` uniformly at random.
///
/// Walks from the last index down to 1, swapping each slot with one drawn
/// uniformly from `[0, i]`. Sequences of length 0 or 1 are left alone and
/// consume no draws.
#[instrument(level = "debug", skip_all, fields(len = sequence.len()))]
pub fn shuffle<T>(rng: &mut Random, sequence: &mut [T]) -> AppResult<()> {
    let n = sequence.len();
    if n > MAX32 as usize {
        return Err(AppError::invalid_argument(format!(
            "sequence of {n} elements exceeds the generator range"
        )));
    }
    for i in (1..n).rev() {
        let j = rng.get_u32((i + 1) as u32)? as usize;
        sequence.swap(i, j);
    }
    Ok(())
}
