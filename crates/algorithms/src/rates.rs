//! Rate adjustment for heterogeneous populations at risk
//!
//! Raw rates E/P have sampling variance roughly proportional to 1/P, so a
//! small district with a handful of events can swing to an extreme rate by
//! chance and dominate the apparent spatial pattern. Before autocorrelation
//! testing, rates are standardized with the Assunção–Reis empirical Bayes
//! transform, which shrinks each region's deviation from the global rate in
//! proportion to its estimated sampling variance.

use arealis_core::{Error, Result};

/// Per-region variance estimates are floored here when the method-of-moments
/// step goes non-positive, keeping the transform defined.
const VARIANCE_FLOOR: f64 = 1e-12;

fn validate(events: &[f64], population: &[f64]) -> Result<()> {
    if events.len() != population.len() {
        return Err(Error::LengthMismatch {
            expected: events.len(),
            actual: population.len(),
        });
    }
    if events.is_empty() {
        return Err(Error::TooFewRegions {
            minimum: 1,
            actual: 0,
        });
    }
    for (index, &p) in population.iter().enumerate() {
        if !(p > 0.0) {
            return Err(Error::NonPositivePopulation { index, value: p });
        }
    }
    for (index, &e) in events.iter().enumerate() {
        if !(e >= 0.0) {
            return Err(Error::NegativeEventCount { index, value: e });
        }
    }
    Ok(())
}

/// Unsmoothed rates `E[i] / P[i]`.
pub fn raw_rates(events: &[f64], population: &[f64]) -> Result<Vec<f64>> {
    validate(events, population)?;
    Ok(events
        .iter()
        .zip(population.iter())
        .map(|(&e, &p)| e / p)
        .collect())
}

/// Assunção–Reis empirical Bayes standardized rates.
///
/// With raw rate `r[i] = E[i]/P[i]` and global rate `b = ΣE/ΣP`:
///
/// ```text
/// z[i] = (r[i] − b) / sqrt(a + b / P[i])
/// ```
///
/// where `s² = Σ P[i]·(r[i] − b)² / ΣP` is the population-weighted rate
/// variance and `a = s² − b·n/ΣP` its method-of-moments estimate of the
/// between-region component. Small-population regions get a large
/// denominator and shrink toward the global rate; the output is the
/// variance-stabilized vector that feeds the Moran engines in rate mode.
pub fn empirical_bayes_rates(events: &[f64], population: &[f64]) -> Result<Vec<f64>> {
    let rates = raw_rates(events, population)?;
    let n = rates.len() as f64;

    let e_sum: f64 = events.iter().sum();
    let p_sum: f64 = population.iter().sum();
    let b = e_sum / p_sum;

    let s2 = rates
        .iter()
        .zip(population.iter())
        .map(|(&r, &p)| p * (r - b) * (r - b))
        .sum::<f64>()
        / p_sum;
    let a = s2 - b * n / p_sum;

    Ok(rates
        .iter()
        .zip(population.iter())
        .map(|(&r, &p)| {
            let variance = (a + b / p).max(VARIANCE_FLOOR);
            (r - b) / variance.sqrt()
        })
        .collect())
}
