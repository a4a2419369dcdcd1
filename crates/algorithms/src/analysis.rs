//! End-to-end Moran analysis over a region table
//!
//! Chains the full pipeline for one attribute: Queen weights → spatial lag
//! → (optional rate adjustment) → global + local Moran with permutation
//! inference → significance-filtered cluster labels, assembled into one
//! index-aligned output record for downstream consumers.

use serde::Serialize;

use crate::contiguity::queen_weights;
use crate::lag::spatial_lag;
use crate::moran::{global_morans_i, local_morans_i, MoranParams};
use crate::quadrant::classify_clusters;
use crate::rates::empirical_bayes_rates;
use arealis_core::{Algorithm, Error, RegionTable, Result};

/// Observation source for one analysis run.
#[derive(Debug, Clone)]
pub enum Observations {
    /// A plain numeric attribute column.
    Column { field: String },
    /// Event counts over a population at risk. Both field names are
    /// supplied explicitly by the caller; the adjusted (empirical Bayes
    /// standardized) rate is what gets tested.
    Rate { events: String, population: String },
}

/// Parameters for a full analysis run.
#[derive(Debug, Clone)]
pub struct MoranAnalysisParams {
    pub observations: Observations,
    /// Permutation count K
    pub permutations: usize,
    /// Significance threshold for cluster labels
    pub alpha: f64,
    /// Base RNG seed; set it for reproducible runs
    pub seed: Option<u64>,
}

impl Default for MoranAnalysisParams {
    fn default() -> Self {
        Self {
            observations: Observations::Column {
                field: "value".to_string(),
            },
            permutations: 9999,
            alpha: 0.05,
            seed: None,
        }
    }
}

/// Output of one analysis run. Every per-region vector has length n and
/// aligns with the input table's order.
#[derive(Debug, Clone, Serialize)]
pub struct MoranAnalysis {
    /// Region ids in table order
    pub ids: Vec<String>,
    /// The observation vector the engines actually tested (the adjusted
    /// rate in rate mode)
    pub observed: Vec<f64>,
    /// Spatial lag of `observed` (islands hold the 0.0 placeholder)
    pub lag: Vec<f64>,
    /// Local Moran's I per region
    pub local_i: Vec<f64>,
    /// Per-region pseudo p-values (None for islands)
    pub p_local: Vec<Option<f64>>,
    /// Quadrant codes 1–4 (None for islands)
    pub quadrant_codes: Vec<Option<i8>>,
    /// Significance-filtered labels ("No Significance", "Q1: (+, +)", ...)
    pub labels: Vec<String>,
    /// Numeric codes for `labels`: 0 none, 1–4 quadrants, −1 undefined
    pub label_codes: Vec<i8>,
    /// Indices of island regions
    pub islands: Vec<usize>,
    /// Global Moran's I
    pub global_i: f64,
    /// Expected I under spatial randomness
    pub expected_i: f64,
    /// Global pseudo p-value
    pub p_global: f64,
    /// Region count
    pub n: usize,
    /// Permutation count used for every statistic in this run
    pub permutations: usize,
    /// Significance threshold used for the labels
    pub alpha: f64,
}

/// Run the full pipeline for one attribute of a region table.
///
/// Fatal validation (bad parameters, missing attributes, degenerate
/// observations) surfaces before any permutation work is dispatched;
/// islands are carried through as explicit markers, never dropped.
pub fn moran_analysis(table: &RegionTable, params: &MoranAnalysisParams) -> Result<MoranAnalysis> {
    if params.permutations == 0 {
        return Err(Error::InvalidParameter {
            name: "permutations",
            value: "0".to_string(),
            reason: "permutation inference needs at least one draw".to_string(),
        });
    }

    let observed = match &params.observations {
        Observations::Column { field } => table.column(field)?,
        Observations::Rate { events, population } => {
            let events = table.column(events)?;
            let population = table.column(population)?;
            empirical_bayes_rates(&events, &population)?
        }
    };

    let weights = queen_weights(table)?;
    let lag = spatial_lag(&weights, &observed)?;

    let moran_params = MoranParams {
        permutations: params.permutations,
        seed: params.seed,
    };
    let global = global_morans_i(&observed, &weights, &moran_params)?;
    let local = local_morans_i(&observed, &weights, &moran_params)?;
    let labels = classify_clusters(&local, params.alpha)?;

    Ok(MoranAnalysis {
        ids: table.ids(),
        observed,
        lag,
        quadrant_codes: local
            .quadrants
            .iter()
            .map(|q| q.map(|q| q.code()))
            .collect(),
        label_codes: labels.iter().map(|l| l.code()).collect(),
        labels: labels.iter().map(|l| l.as_str().to_string()).collect(),
        local_i: local.local_i,
        p_local: local.p_sim,
        islands: local.islands,
        global_i: global.i,
        expected_i: global.expected_i,
        p_global: global.p_sim,
        n: table.len(),
        permutations: params.permutations,
        alpha: params.alpha,
    })
}

/// Pipeline wrapper implementing the core [`Algorithm`] trait.
#[derive(Debug, Clone, Default)]
pub struct MoranPipeline;

impl Algorithm for MoranPipeline {
    type Input = RegionTable;
    type Output = MoranAnalysis;
    type Params = MoranAnalysisParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "MoranAnalysis"
    }

    fn description(&self) -> &'static str {
        "Global and local Moran's I with permutation inference and cluster labels"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        moran_analysis(&input, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arealis_core::{AttributeValue, Region};
    use geo_types::{LineString, Polygon};

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

    /// 3x3 lattice with a `cases`/`population` pair and a plain `value`.
    fn sample_table() -> RegionTable {
        let values = [9.0, 8.0, 7.5, 6.0, 5.0, 4.0, 2.0, 1.5, 1.0];
        let mut regions = Vec::new();
        for r in 0..3 {
            for c in 0..3 {
                let i = r * 3 + c;
                let mut region =
                    Region::from_polygon(format!("r{r}c{c}"), square(c as f64, r as f64));
                region.set_attribute("value", AttributeValue::Float(values[i]));
                region.set_attribute("cases", AttributeValue::Float(values[i]));
                region.set_attribute("population", AttributeValue::Int(100 + 10 * i as i64));
                regions.push(region);
            }
        }
        RegionTable::from_regions(regions).unwrap()
    }

    fn params(observations: Observations) -> MoranAnalysisParams {
        MoranAnalysisParams {
            observations,
            permutations: 199,
            alpha: 0.05,
            seed: Some(11),
        }
    }

    #[test]
    fn test_column_mode_shapes() {
        let table = sample_table();
        let result = moran_analysis(
            &table,
            &params(Observations::Column {
                field: "value".to_string(),
            }),
        )
        .unwrap();

        assert_eq!(result.n, 9);
        assert_eq!(result.ids.len(), 9);
        assert_eq!(result.observed.len(), 9);
        assert_eq!(result.lag.len(), 9);
        assert_eq!(result.local_i.len(), 9);
        assert_eq!(result.p_local.len(), 9);
        assert_eq!(result.quadrant_codes.len(), 9);
        assert_eq!(result.labels.len(), 9);
        assert_eq!(result.label_codes.len(), 9);
        assert!(result.islands.is_empty());
        assert!(result.global_i > 0.0, "monotone surface clusters");
    }

    #[test]
    fn test_rate_mode_uses_adjusted_rates() {
        let table = sample_table();
        let result = moran_analysis(
            &table,
            &params(Observations::Rate {
                events: "cases".to_string(),
                population: "population".to_string(),
            }),
        )
        .unwrap();

        // The tested vector is the standardized rate, not cases/population.
        let cases = table.column("cases").unwrap();
        let population = table.column("population").unwrap();
        let raw: Vec<f64> = cases
            .iter()
            .zip(population.iter())
            .map(|(&e, &p)| e / p)
            .collect();
        assert_ne!(result.observed, raw);
        assert_ne!(result.observed, cases);
    }

    #[test]
    fn test_unknown_field_fails_fast() {
        let table = sample_table();
        let err = moran_analysis(
            &table,
            &params(Observations::Column {
                field: "nope".to_string(),
            }),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownField(_)));
    }

    #[test]
    fn test_zero_permutations_rejected() {
        let table = sample_table();
        let mut p = params(Observations::Column {
            field: "value".to_string(),
        });
        p.permutations = 0;
        assert!(matches!(
            moran_analysis(&table, &p),
            Err(Error::InvalidParameter { name: "permutations", .. })
        ));
    }

    #[test]
    fn test_labels_and_codes_agree() {
        let table = sample_table();
        let result = moran_analysis(
            &table,
            &params(Observations::Column {
                field: "value".to_string(),
            }),
        )
        .unwrap();

        use crate::quadrant::ClusterLabel;
        for (label, &code) in result.labels.iter().zip(result.label_codes.iter()) {
            let parsed = ClusterLabel::from_label(label).unwrap();
            assert_eq!(parsed.code(), code);
        }
    }

    #[test]
    fn test_pipeline_algorithm_wrapper() {
        let table = sample_table();
        let pipeline = MoranPipeline;
        assert_eq!(pipeline.name(), "MoranAnalysis");

        let result = pipeline
            .execute(
                table,
                params(Observations::Column {
                    field: "value".to_string(),
                }),
            )
            .unwrap();
        assert_eq!(result.n, 9);
    }
}
