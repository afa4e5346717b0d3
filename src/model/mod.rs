pub mod config;

use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};

/// Grid axis. `X` runs along columns, `Y` along rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortAxis {
    #[default]
    None,
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PointError {
    #[default]
    MedianIqr,
    MeanStderr,
}

impl PointError {
    pub fn label(self) -> &'static str {
        match self {
            PointError::MedianIqr => "median_iqr",
            PointError::MeanStderr => "mean_stderr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileMetadata {
    pub sort: SortAxis,
    pub radius: f64,
    pub y_axis_threshold: f64,
    pub interpolation_distance: f64,
    pub point_error: PointError,
}

impl ProfileMetadata {
    pub fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ProfileError::InvalidParameter(format!(
                "radius must be > 0 (got {})",
                self.radius
            )));
        }
        if !(self.interpolation_distance.is_finite() && self.interpolation_distance > 0.0) {
            return Err(ProfileError::InvalidParameter(format!(
                "interpolation distance must be > 0 (got {})",
                self.interpolation_distance
            )));
        }
        Ok(())
    }
}
