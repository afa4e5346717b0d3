//! Conversions between physical distance and pixel units.
//!
//! The two directions use different scale sources: `distance_to_pixels` uses
//! the per-pixel spacing while `pixels_to_distance` uses the array extent over
//! the physical range. They only agree when `dx == x_range / cols`.

use crate::error::{ProfileError, Result};
use crate::model::Axis;

pub fn check_spacing(dx: f64, dy: f64) -> Result<()> {
    if dx > 0.0 && dy > 0.0 && dx.is_finite() && dy.is_finite() {
        Ok(())
    } else {
        Err(ProfileError::InvalidGridSpacing { dx, dy })
    }
}

/// `round(distance / spacing)` along `axis`, halves away from zero.
pub fn distance_to_pixels(distance: f64, axis: Axis, dx: f64, dy: f64) -> Result<i64> {
    check_spacing(dx, dy)?;
    let scale = match axis {
        Axis::X => 1.0 / dx,
        Axis::Y => 1.0 / dy,
    };
    Ok((distance * scale).round() as i64)
}

/// `pixels * array_size[axis] / physical_range[axis]`.
///
/// `array_size` is `(rows, cols)`; the x axis reads `cols`, the y axis `rows`.
pub fn pixels_to_distance(
    pixels: i64,
    axis: Axis,
    array_size: (usize, usize),
    physical_range: (f64, f64),
) -> Result<f64> {
    let (size, range) = match axis {
        Axis::X => (array_size.1, physical_range.0),
        Axis::Y => (array_size.0, physical_range.1),
    };
    if !(range.is_finite() && range > 0.0) {
        return Err(ProfileError::InvalidParameter(format!(
            "physical range must be > 0 (got {range})"
        )));
    }
    Ok(pixels as f64 * size as f64 / range)
}

#[cfg(test)]
#[path = "../../tests/src_inline/profile/coords.rs"]
mod tests;
