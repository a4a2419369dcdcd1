//! Spatial lag: neighborhood-weighted averages

use arealis_core::{Error, Result, SpatialWeights};

/// Compute the spatial lag of `y`: `lag[i] = Σ_j w(i,j) · y[j]`.
///
/// With row-standardized weights this is the mean of each region's
/// neighbor values. Islands have no neighbors and get `0.0`, a
/// placeholder rather than a meaningful value; consult
/// [`SpatialWeights::islands`] before interpreting their lag.
pub fn spatial_lag(weights: &SpatialWeights, y: &[f64]) -> Result<Vec<f64>> {
    if y.len() != weights.n() {
        return Err(Error::LengthMismatch {
            expected: weights.n(),
            actual: y.len(),
        });
    }

    Ok((0..weights.n())
        .map(|i| {
            weights
                .neighbors(i)
                .iter()
                .map(|&(j, w)| w * y[j])
                .sum::<f64>()
        })
        .collect())
}
