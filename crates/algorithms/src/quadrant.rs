//! Cluster quadrants and significance labels
//!
//! Maps each region's local statistic to a categorical cluster label:
//! the Moran scatterplot quadrant when the region is significant at α,
//! "No Significance" otherwise, and a distinct sentinel for islands whose
//! lag (and therefore quadrant) is undefined.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::moran::LocalMoranResult;
use arealis_core::{Error, Result};

/// Moran scatterplot quadrant: the sign pattern of
/// `(value − mean, lag − mean)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quadrant {
    /// (+, +): high value among high neighbors
    HighHigh,
    /// (−, +): low value among high neighbors
    LowHigh,
    /// (−, −): low value among low neighbors
    LowLow,
    /// (+, −): high value among low neighbors
    HighLow,
}

impl Quadrant {
    /// Quadrant from the signs of the mean deviation and its lag.
    /// Values exactly at the mean count as "low", matching the strict
    /// `> 0` convention of the scatterplot.
    pub(crate) fn from_signs(z: f64, lag_z: f64) -> Self {
        match (z > 0.0, lag_z > 0.0) {
            (true, true) => Quadrant::HighHigh,
            (false, true) => Quadrant::LowHigh,
            (false, false) => Quadrant::LowLow,
            (true, false) => Quadrant::HighLow,
        }
    }

    /// Conventional quadrant code, 1–4
    pub fn code(self) -> i8 {
        match self {
            Quadrant::HighHigh => 1,
            Quadrant::LowHigh => 2,
            Quadrant::LowLow => 3,
            Quadrant::HighLow => 4,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            1 => Some(Quadrant::HighHigh),
            2 => Some(Quadrant::LowHigh),
            3 => Some(Quadrant::LowLow),
            4 => Some(Quadrant::HighLow),
            _ => None,
        }
    }

    /// The quadrant's sign pattern, e.g. `"(+, +)"`
    pub fn sign_pattern(self) -> &'static str {
        match self {
            Quadrant::HighHigh => "(+, +)",
            Quadrant::LowHigh => "(-, +)",
            Quadrant::LowLow => "(-, -)",
            Quadrant::HighLow => "(+, -)",
        }
    }
}

/// Final per-region label after significance filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterLabel {
    /// Local p-value at or above α
    NotSignificant,
    /// Significant region in the given quadrant
    Cluster(Quadrant),
    /// Island: no neighbors, no defined lag or quadrant
    Undefined,
}

impl ClusterLabel {
    /// Numeric code: 0 for no significance, 1–4 for quadrants, −1 for the
    /// island sentinel.
    pub fn code(self) -> i8 {
        match self {
            ClusterLabel::NotSignificant => 0,
            ClusterLabel::Cluster(q) => q.code(),
            ClusterLabel::Undefined => -1,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            0 => Some(ClusterLabel::NotSignificant),
            -1 => Some(ClusterLabel::Undefined),
            c => Quadrant::from_code(c).map(ClusterLabel::Cluster),
        }
    }

    /// Descriptive label used in output tables
    pub fn as_str(self) -> &'static str {
        match self {
            ClusterLabel::NotSignificant => "No Significance",
            ClusterLabel::Cluster(Quadrant::HighHigh) => "Q1: (+, +)",
            ClusterLabel::Cluster(Quadrant::LowHigh) => "Q2: (-, +)",
            ClusterLabel::Cluster(Quadrant::LowLow) => "Q3: (-, -)",
            ClusterLabel::Cluster(Quadrant::HighLow) => "Q4: (+, -)",
            ClusterLabel::Undefined => "Undefined",
        }
    }

    /// Inverse of [`ClusterLabel::as_str`]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "No Significance" => Some(ClusterLabel::NotSignificant),
            "Q1: (+, +)" => Some(ClusterLabel::Cluster(Quadrant::HighHigh)),
            "Q2: (-, +)" => Some(ClusterLabel::Cluster(Quadrant::LowHigh)),
            "Q3: (-, -)" => Some(ClusterLabel::Cluster(Quadrant::LowLow)),
            "Q4: (+, -)" => Some(ClusterLabel::Cluster(Quadrant::HighLow)),
            "Undefined" => Some(ClusterLabel::Undefined),
            _ => None,
        }
    }
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assign a final label to every region.
///
/// Total over the table: islands get [`ClusterLabel::Undefined`], regions
/// with p ≥ α get [`ClusterLabel::NotSignificant`], everything else its
/// quadrant. α must lie in (0, 1].
pub fn classify_clusters(local: &LocalMoranResult, alpha: f64) -> Result<Vec<ClusterLabel>> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        return Err(Error::InvalidParameter {
            name: "alpha",
            value: alpha.to_string(),
            reason: "significance threshold must be in (0, 1]".to_string(),
        });
    }

    Ok(local
        .quadrants
        .iter()
        .zip(local.p_sim.iter())
        .map(|(quadrant, p)| match (quadrant, p) {
            (Some(q), Some(p)) if *p < alpha => ClusterLabel::Cluster(*q),
            (Some(_), Some(_)) => ClusterLabel::NotSignificant,
            _ => ClusterLabel::Undefined,
        })
        .collect())
}
