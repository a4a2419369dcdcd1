//! Global and local Moran's I with permutation inference
//!
//! - **global**: one statistic for the whole map, null distribution from
//!   full random reassignment of the observed values
//! - **local**: one statistic per region (LISA), null distribution from
//!   conditional permutation (the region's own value held fixed)

pub mod global;
pub mod local;

pub use global::{global_morans_i, GlobalMoranResult};
pub use local::{local_morans_i, LocalMoranResult};

use arealis_core::{Error, Result, SpatialWeights};

/// Parameters shared by both permutation tests.
#[derive(Debug, Clone)]
pub struct MoranParams {
    /// Number of permutation draws (K)
    pub permutations: usize,
    /// Base RNG seed. Runs are reproducible only when this is set; `None`
    /// draws one seed from entropy per statistic.
    pub seed: Option<u64>,
}

impl Default for MoranParams {
    fn default() -> Self {
        Self {
            permutations: 9999,
            seed: None,
        }
    }
}

impl MoranParams {
    pub(crate) fn base_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

/// Derive an independent per-task seed from the run's base seed.
///
/// Each permutation draw (global) or region batch (local) owns its own
/// generator; a generator shared across parallel tasks would make results
/// depend on scheduling.
pub(crate) fn task_seed(base: u64, task: u64) -> u64 {
    base ^ task.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Shared precondition checks: alignment, minimum size, finiteness,
/// non-degenerate variance and usable weights.
///
/// Returns the mean deviations `z` and their sum of squares.
pub(crate) fn validate_observations(
    y: &[f64],
    weights: &SpatialWeights,
) -> Result<(Vec<f64>, f64)> {
    let n = weights.n();
    if y.len() != n {
        return Err(Error::LengthMismatch {
            expected: n,
            actual: y.len(),
        });
    }
    if n < 3 {
        return Err(Error::TooFewRegions {
            minimum: 3,
            actual: n,
        });
    }
    if let Some(index) = y.iter().position(|v| !v.is_finite()) {
        return Err(Error::NonFiniteObservation { index });
    }

    let mean = y.iter().sum::<f64>() / n as f64;
    let z: Vec<f64> = y.iter().map(|v| v - mean).collect();
    let sum_sq: f64 = z.iter().map(|d| d * d).sum();

    if sum_sq < f64::EPSILON {
        return Err(Error::ZeroVariance);
    }
    if weights.s0() == 0.0 {
        return Err(Error::EmptyWeights);
    }
    Ok((z, sum_sq))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_seeds_differ() {
        let a = task_seed(42, 0);
        let b = task_seed(42, 1);
        let c = task_seed(43, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_validate_rejects_degenerate_input() {
        let w = SpatialWeights::from_edges(3, &[(0, 1), (1, 2)]).unwrap();

        assert!(matches!(
            validate_observations(&[1.0, 2.0], &w),
            Err(Error::LengthMismatch { .. })
        ));
        assert!(matches!(
            validate_observations(&[5.0, 5.0, 5.0], &w),
            Err(Error::ZeroVariance)
        ));
        assert!(matches!(
            validate_observations(&[1.0, f64::NAN, 3.0], &w),
            Err(Error::NonFiniteObservation { index: 1 })
        ));

        let small = SpatialWeights::from_edges(2, &[(0, 1)]).unwrap();
        assert!(matches!(
            validate_observations(&[1.0, 2.0], &small),
            Err(Error::TooFewRegions { .. })
        ));

        let empty = SpatialWeights::from_edges(3, &[]).unwrap();
        assert!(matches!(
            validate_observations(&[1.0, 2.0, 3.0], &empty),
            Err(Error::EmptyWeights)
        ));
    }
}
