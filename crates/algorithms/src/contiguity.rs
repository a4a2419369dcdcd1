//! Queen contiguity weights from region geometry
//!
//! Two areal units are Queen neighbors if their boundaries share at least
//! one point; a single common vertex is enough. (Rook contiguity, which
//! requires a shared edge, is the stricter rule; Queen is what rate maps
//! over administrative districts conventionally use.)

use geo::{BoundingRect, Intersects};
use geo_types::MultiPolygon;

use crate::maybe_rayon::*;
use arealis_core::{RegionTable, Result, SpatialWeights};

/// Axis-aligned bounding box used to prefilter candidate neighbor pairs
/// before the exact geometry test.
#[derive(Debug, Clone, Copy)]
struct BBox {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl BBox {
    fn of(geometry: &MultiPolygon<f64>) -> Option<Self> {
        geometry.bounding_rect().map(|rect| Self {
            min_x: rect.min().x,
            min_y: rect.min().y,
            max_x: rect.max().x,
            max_y: rect.max().y,
        })
    }

    fn touches(&self, other: &BBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}

/// Build Queen-contiguity spatial weights for a region table.
///
/// Pairwise boundary testing is pruned with a bounding-box overlap check
/// and parallelized across regions; surviving candidates get the exact
/// `geo` intersection test. Raw binary weights are row-standardized to
/// `1/deg(i)`.
///
/// Regions with no neighbors stay in the matrix with an empty row and are
/// reported by [`SpatialWeights::islands`]; they are never silently
/// folded into the lag as zero-weight rows.
pub fn queen_weights(table: &RegionTable) -> Result<SpatialWeights> {
    let n = table.len();
    let geometries: Vec<&MultiPolygon<f64>> = table.iter().map(|r| &r.geometry).collect();
    let boxes: Vec<Option<BBox>> = geometries.iter().map(|g| BBox::of(g)).collect();

    let edges: Vec<(usize, usize)> = (0..n)
        .into_par_iter()
        .flat_map(|i| {
            let mut found = Vec::new();
            for j in (i + 1)..n {
                let candidate = match (&boxes[i], &boxes[j]) {
                    (Some(a), Some(b)) => a.touches(b),
                    _ => false,
                };
                if candidate && geometries[i].intersects(geometries[j]) {
                    found.push((i, j));
                }
            }
            found
        })
        .collect();

    SpatialWeights::from_edges(n, &edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arealis_core::Region;
    use geo_types::{LineString, Polygon};

    /// Unit square with lower-left corner at (x, y).
    fn square(x: f64, y: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (x, y),
                (x + 1.0, y),
                (x + 1.0, y + 1.0),
                (x, y + 1.0),
                (x, y),
            ]),
            vec![],
        )
    }

    /// rows × cols lattice of unit squares, row-major ids.
    fn lattice(rows: usize, cols: usize) -> RegionTable {
        let mut regions = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                regions.push(Region::from_polygon(
                    format!("r{r}c{c}"),
                    square(c as f64, r as f64),
                ));
            }
        }
        RegionTable::from_regions(regions).unwrap()
    }

    #[test]
    fn test_queen_lattice_cardinalities() {
        // 3x3 lattice: Queen gives corners 3 neighbors, edges 5, center 8.
        let table = lattice(3, 3);
        let w = queen_weights(&table).unwrap();

        assert_eq!(w.cardinality(0), 3, "corner");
        assert_eq!(w.cardinality(1), 5, "edge");
        assert_eq!(w.cardinality(4), 8, "center");
        assert!(!w.has_islands());
    }

    #[test]
    fn test_vertex_touch_counts() {
        // Two squares meeting only at a single corner vertex.
        let table = RegionTable::from_regions(vec![
            Region::from_polygon("a", square(0.0, 0.0)),
            Region::from_polygon("b", square(1.0, 1.0)),
        ])
        .unwrap();

        let w = queen_weights(&table).unwrap();
        assert_eq!(w.cardinality(0), 1);
        assert_eq!(w.cardinality(1), 1);
    }

    #[test]
    fn test_disjoint_region_is_island() {
        let table = RegionTable::from_regions(vec![
            Region::from_polygon("a", square(0.0, 0.0)),
            Region::from_polygon("b", square(1.0, 0.0)),
            Region::from_polygon("far", square(100.0, 100.0)),
        ])
        .unwrap();

        let w = queen_weights(&table).unwrap();
        assert_eq!(w.islands(), vec![2]);
        assert_eq!(w.cardinality(0), 1);
    }

    #[test]
    fn test_rows_standardized() {
        let table = lattice(3, 3);
        let w = queen_weights(&table).unwrap();
        for i in 0..table.len() {
            let sum: f64 = w.neighbors(i).iter().map(|(_, v)| v).sum();
            assert!(
                (sum - 1.0).abs() < 1e-12,
                "row {i} sums to {sum}, expected 1.0"
            );
        }
    }

    #[test]
    fn test_empty_table() {
        let table = RegionTable::new();
        let w = queen_weights(&table).unwrap();
        assert_eq!(w.n(), 0);
    }
}
