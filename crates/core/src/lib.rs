//! # Arealis Core
//!
//! Core types and I/O for the arealis spatial statistics library.
//!
//! This crate provides:
//! - `Region` / `RegionTable`: areal units with polygon boundaries and attributes
//! - `SpatialWeights`: row-standardized sparse contiguity weights
//! - The shared error taxonomy for the workspace
//! - GeoJSON ingestion for materialized region tables

pub mod error;
pub mod io;
pub mod region;
pub mod weights;

pub use error::{Error, Result};
pub use region::{AttributeValue, Region, RegionTable};
pub use weights::SpatialWeights;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::region::{AttributeValue, Region, RegionTable};
    pub use crate::weights::SpatialWeights;
    pub use crate::Algorithm;
}

/// Core trait for analyses in arealis.
///
/// Analyses are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the analysis
    type Input;
    /// Output type for the analysis
    type Output;
    /// Parameters controlling analysis behavior
    type Params: Default;
    /// Error type for analysis execution
    type Error: std::error::Error;

    /// Returns the analysis name
    fn name(&self) -> &'static str;

    /// Returns a description of what the analysis does
    fn description(&self) -> &'static str;

    /// Execute the analysis
    fn execute(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
