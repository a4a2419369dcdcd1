//! # Arealis Algorithms
//!
//! Spatial autocorrelation statistics for areal (polygon) data.
//!
//! ## Available modules
//!
//! - **contiguity**: Queen-contiguity spatial weights from region geometry
//! - **lag**: spatial lag (neighborhood-weighted averages)
//! - **rates**: empirical Bayes rate standardization for heterogeneous
//!   populations at risk
//! - **moran**: global and local Moran's I with permutation inference
//! - **quadrant**: cluster quadrants and significance labels
//! - **analysis**: the end-to-end pipeline over a region table

pub mod analysis;
pub mod contiguity;
pub mod lag;
pub mod maybe_rayon;
pub mod moran;
pub mod quadrant;
pub mod rates;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analysis::{
        moran_analysis, MoranAnalysis, MoranAnalysisParams, MoranPipeline, Observations,
    };
    pub use crate::contiguity::queen_weights;
    pub use crate::lag::spatial_lag;
    pub use crate::moran::{
        global_morans_i, local_morans_i, GlobalMoranResult, LocalMoranResult, MoranParams,
    };
    pub use crate::quadrant::{classify_clusters, ClusterLabel, Quadrant};
    pub use crate::rates::{empirical_bayes_rates, raw_rates};
    pub use arealis_core::prelude::*;
}
