use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};
use crate::model::{PointError, ProfileMetadata, SortAxis};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub radius: f64,
    pub interpolation_distance: f64,
    pub y_axis_threshold: f64,
    pub sort: SortAxis,
    pub point_error: PointError,
    /// Search distance for picking an existing point. `0` derives it from the radius.
    pub snap_tolerance: f64,
    /// Decimal places used when formatting report values.
    pub precision: usize,
    pub file_extension: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self::default_v1()
    }
}

impl ProfileConfig {
    pub fn default_v1() -> Self {
        Self {
            radius: 5.0,
            interpolation_distance: 10.0,
            y_axis_threshold: 1e6,
            sort: SortAxis::None,
            point_error: PointError::MedianIqr,
            snap_tolerance: 0.0,
            precision: 4,
            file_extension: "json".to_string(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: ProfileConfig = serde_json::from_str(&text)?;
        config.metadata().validate()?;
        if config.file_extension.is_empty() || config.file_extension.contains(['/', '\\']) {
            return Err(ProfileError::InvalidParameter(format!(
                "invalid file extension '{}'",
                config.file_extension
            )));
        }
        crate::debug!("loaded profile config from {}", path.display());
        Ok(config)
    }

    pub fn metadata(&self) -> ProfileMetadata {
        ProfileMetadata {
            sort: self.sort,
            radius: self.radius,
            y_axis_threshold: self.y_axis_threshold,
            interpolation_distance: self.interpolation_distance,
            point_error: self.point_error,
        }
    }

    pub fn effective_snap_tolerance(&self, radius: f64) -> f64 {
        if self.snap_tolerance > 0.0 {
            self.snap_tolerance
        } else {
            2.0 * radius
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/config.rs"]
mod tests;
