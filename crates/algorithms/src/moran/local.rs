//! Local Moran's I (LISA)
//!
//! Decomposes the global statistic into one value per region, so clusters
//! (high surrounded by high, low by low) and outliers (high among low,
//! low among high) can be located. Inference is by conditional
//! permutation, independently per region. This is the expensive step:
//! O(n·K) statistic evaluations.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::lag::spatial_lag;
use crate::maybe_rayon::*;
use crate::moran::{task_seed, validate_observations, MoranParams};
use crate::quadrant::Quadrant;
use arealis_core::{Result, SpatialWeights};

/// Seed salt for the local engine (see `global::SEED_SALT`).
const SEED_SALT: u64 = 0x4C_4F43_414C_4D49; // "LOCALMI"

/// Result of the local Moran's I permutation test.
///
/// All vectors have length n and align with the region table. Islands get
/// placeholder values: `local_i` 0.0, no simulated draws, `None` p-value
/// and quadrant; their indices are listed in `islands`.
#[derive(Debug, Clone)]
pub struct LocalMoranResult {
    /// Local statistic Ii per region
    pub local_i: Vec<f64>,
    /// Per-region simulated null distributions (empty for islands)
    pub sim: Vec<Vec<f64>>,
    /// Per-region pseudo p-values (+1/(K+1) convention; None for islands)
    pub p_sim: Vec<Option<f64>>,
    /// Moran scatterplot quadrant per region (None for islands)
    pub quadrants: Vec<Option<Quadrant>>,
    /// Indices of regions with no neighbors
    pub islands: Vec<usize>,
}

/// Compute local Moran's I per region with conditional permutation inference.
///
/// ```text
/// Ii = (z[i] / m2) · Σ_j w(i,j)·z[j]     m2 = Σ z² / n
/// ```
///
/// For region i the null distribution holds y[i] fixed and redraws the
/// neighbor values from the remaining n−1 observations, K times. Regions
/// are independent tasks and run in parallel, each batch on its own
/// seeded generator, so results do not depend on scheduling.
///
/// # Errors
///
/// Same preconditions as the global engine. Islands are not an error:
/// they are reported in the result and excluded from inference.
pub fn local_morans_i(
    y: &[f64],
    weights: &SpatialWeights,
    params: &MoranParams,
) -> Result<LocalMoranResult> {
    let (z, sum_sq) = validate_observations(y, weights)?;
    let n = weights.n();
    let m2 = sum_sq / n as f64;

    let lag_z = spatial_lag(weights, &z)?;
    let local_i: Vec<f64> = (0..n).map(|i| z[i] / m2 * lag_z[i]).collect();

    let quadrants: Vec<Option<Quadrant>> = (0..n)
        .map(|i| {
            if weights.is_island(i) {
                None
            } else {
                Some(Quadrant::from_signs(z[i], lag_z[i]))
            }
        })
        .collect();

    let k = params.permutations;
    let base = params.base_seed() ^ SEED_SALT;

    let draws: Vec<(Vec<f64>, Option<f64>)> = (0..n)
        .into_par_iter()
        .map(|i| {
            let degree = weights.cardinality(i);
            if degree == 0 {
                return (Vec::new(), None);
            }

            let mut rng = StdRng::seed_from_u64(task_seed(base, i as u64));
            let row = weights.neighbors(i);
            let zi_over_m2 = z[i] / m2;

            // Values available to permute into the neighborhood: everything
            // except region i's own (held fixed by the conditional null).
            let mut others: Vec<f64> = z
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &v)| v)
                .collect();

            let mut sims = Vec::with_capacity(k);
            for _ in 0..k {
                let (sample, _) = others.partial_shuffle(&mut rng, degree);
                let mut lag = 0.0;
                for (&v, &(_, w)) in sample.iter().zip(row.iter()) {
                    lag += w * v;
                }
                sims.push(zi_over_m2 * lag);
            }

            let p = folded_p(local_i[i], &sims);
            (sims, Some(p))
        })
        .collect();

    let mut sim = Vec::with_capacity(n);
    let mut p_sim = Vec::with_capacity(n);
    for (sims, p) in draws {
        sim.push(sims);
        p_sim.push(p);
    }

    Ok(LocalMoranResult {
        local_i,
        sim,
        p_sim,
        quadrants,
        islands: weights.islands(),
    })
}

/// Folded one-tail pseudo p-value: whichever tail the observed statistic
/// is nearer, with the observed draw itself counted via +1/(K+1).
fn folded_p(observed: f64, sim: &[f64]) -> f64 {
    let k = sim.len();
    let mut extreme = sim.iter().filter(|&&s| s >= observed).count();
    if k - extreme < extreme {
        extreme = k - extreme;
    }
    (extreme as f64 + 1.0) / (k as f64 + 1.0)
}
