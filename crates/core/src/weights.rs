//! Row-standardized spatial weights
//!
//! Sparse representation of a contiguity weight matrix: for each region i a
//! list of `(neighbor_index, weight)` pairs. No self-loops are stored, and
//! every row with at least one neighbor sums to 1.0, so multiplying a value
//! vector by a row yields the neighborhood mean.

use crate::{Error, Result};

/// Row-standardized sparse spatial weight matrix.
///
/// Regions with no neighbors ("islands") keep an empty row rather than
/// being dropped; [`SpatialWeights::islands`] reports them so downstream
/// consumers can detect and optionally exclude them.
#[derive(Debug, Clone)]
pub struct SpatialWeights {
    n: usize,
    neighbors: Vec<Vec<(usize, f64)>>,
}

impl SpatialWeights {
    /// Build weights from undirected adjacency edges over `n` regions.
    ///
    /// Each `(i, j)` pair marks i and j as mutual neighbors; duplicates are
    /// collapsed. Raw binary weights are row-standardized to `1/deg(i)`.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
        for &(i, j) in edges {
            if i >= n || j >= n {
                return Err(Error::Other(format!(
                    "edge ({i}, {j}) out of bounds for {n} regions"
                )));
            }
            if i == j {
                return Err(Error::Other(format!("region {i} cannot neighbor itself")));
            }
            adjacency[i].push(j);
            adjacency[j].push(i);
        }
        for row in &mut adjacency {
            row.sort_unstable();
            row.dedup();
        }
        Ok(Self::standardize(adjacency))
    }

    /// Build weights from a full adjacency list (one neighbor list per region).
    ///
    /// The list is taken as given; callers are responsible for symmetry.
    pub fn from_adjacency(adjacency: Vec<Vec<usize>>) -> Result<Self> {
        let n = adjacency.len();
        let mut rows = adjacency;
        for (i, row) in rows.iter_mut().enumerate() {
            row.sort_unstable();
            row.dedup();
            for &j in row.iter() {
                if j >= n {
                    return Err(Error::Other(format!(
                        "neighbor index {j} out of bounds for {n} regions"
                    )));
                }
                if j == i {
                    return Err(Error::Other(format!("region {i} cannot neighbor itself")));
                }
            }
        }
        Ok(Self::standardize(rows))
    }

    fn standardize(adjacency: Vec<Vec<usize>>) -> Self {
        let n = adjacency.len();
        let neighbors = adjacency
            .into_iter()
            .map(|row| {
                let weight = if row.is_empty() {
                    0.0
                } else {
                    1.0 / row.len() as f64
                };
                row.into_iter().map(|j| (j, weight)).collect()
            })
            .collect();
        Self { n, neighbors }
    }

    /// Number of regions (matrix dimension)
    pub fn n(&self) -> usize {
        self.n
    }

    /// Weighted neighbor list of region `i`
    pub fn neighbors(&self, i: usize) -> &[(usize, f64)] {
        &self.neighbors[i]
    }

    /// Neighbor count of region `i`
    pub fn cardinality(&self, i: usize) -> usize {
        self.neighbors[i].len()
    }

    /// True if region `i` has no neighbors
    pub fn is_island(&self, i: usize) -> bool {
        self.neighbors[i].is_empty()
    }

    /// Indices of all regions without neighbors, in table order
    pub fn islands(&self) -> Vec<usize> {
        (0..self.n).filter(|&i| self.is_island(i)).collect()
    }

    pub fn has_islands(&self) -> bool {
        self.neighbors.iter().any(Vec::is_empty)
    }

    /// Sum of all weights (S0). Zero means the matrix carries no
    /// adjacency information at all.
    pub fn s0(&self) -> f64 {
        self.neighbors
            .iter()
            .map(|row| row.iter().map(|(_, w)| w).sum::<f64>())
            .sum()
    }
}
