//! Sampling without replacement.

use shared::{AppError, AppResult};
use tracing::instrument;

use crate::generator::{Random, MAX32};

/// Fills `choices` with `choices.len()` distinct elements of `population`.
///
/// Runs a partial Fisher–Yates shuffle over a working copy of the population,
/// so every ordered selection of k out of n elements is equally likely.
/// Consumes exactly k bounded draws. Nothing is drawn or written when the
/// arguments are rejected.
#[instrument(level = "debug", skip_all, fields(population = population.len(), choices = choices.len()))]
pub fn sample<T: Copy>(rng: &mut Random, population: &[T], choices: &mut [T]) -> AppResult<()> {
    let n = population.len();
    let k = choices.len();
    if k > n {
        return Err(AppError::invalid_argument(format!(
            "cannot choose {k} elements from a population of {n}"
        )));
    }
    if n > MAX32 as usize {
        return Err(AppError::invalid_argument(format!(
            "population of {n} exceeds the generator range"
        )));
    }
    if k == 0 {
        return Ok(());
    }

    let mut working = population.to_vec();
    for (i, choice) in choices.iter_mut().enumerate() {
        let j = i + rng.get_u32((n - i) as u32)? as usize;
        working.swap(i, j);
        *choice = working[i];
    }
    Ok(())
}
