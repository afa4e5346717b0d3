use std::collections::BTreeMap;

use crate::error::{ProfileError, Result};
use crate::grid::{FieldGrid, FieldSource};
use crate::model::Axis;
use crate::profile::coords::distance_to_pixels;

/// Raw values per field, as collected inside one aggregation circle.
pub type FieldValues = BTreeMap<String, Vec<f64>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub values: FieldValues,
    pub pixel_count: usize,
}

impl Aggregation {
    fn empty(field_names: impl Iterator<Item = String>) -> Self {
        Self {
            values: field_names.map(|name| (name, Vec::new())).collect(),
            pixel_count: 0,
        }
    }

    /// Center fell outside the grid, every field list is empty.
    pub fn is_degraded(&self) -> bool {
        self.pixel_count == 0
    }
}

/// Pixel indices `(row, col)` whose physical distance from `center_index`
/// is within `radius`, in row-major order. Empty when the center is outside.
pub fn circle_indices(
    center_index: (i64, i64),
    radius: f64,
    dx: f64,
    dy: f64,
    grid_extent: (usize, usize),
) -> Result<Vec<(usize, usize)>> {
    let p_radius_y = distance_to_pixels(radius, Axis::Y, dx, dy)?;
    let p_radius_x = distance_to_pixels(radius, Axis::X, dx, dy)?;
    let (rows, cols) = (grid_extent.0 as i64, grid_extent.1 as i64);
    let (cy, cx) = center_index;
    if cy < 0 || cx < 0 || cy >= rows || cx >= cols {
        return Ok(Vec::new());
    }

    // Huge radii saturate in `distance_to_pixels`; the window still clips to the grid.
    let row_lo = cy.saturating_sub(p_radius_y).max(0);
    let row_hi = cy.saturating_add(p_radius_y).min(rows - 1);
    let col_lo = cx.saturating_sub(p_radius_x).max(0);
    let col_hi = cx.saturating_add(p_radius_x).min(cols - 1);
    let r2 = radius * radius;

    let mut out = Vec::new();
    for i in row_lo..=row_hi {
        let ddy = (i - cy) as f64 * dy;
        for j in col_lo..=col_hi {
            let ddx = (j - cx) as f64 * dx;
            if ddy * ddy + ddx * ddx <= r2 {
                out.push((i as usize, j as usize));
            }
        }
    }
    Ok(out)
}

/// Collects every field's values inside the circle of `radius` around `center_index`.
///
/// `center_xy` is the physical click position; only `center_index` drives the lookup.
pub fn aggregate(
    center_xy: (f64, f64),
    center_index: (i64, i64),
    radius: f64,
    dx: f64,
    dy: f64,
    grid_extent: (usize, usize),
    field_grids: &BTreeMap<String, &FieldGrid>,
) -> Result<Aggregation> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(ProfileError::InvalidParameter(format!(
            "radius must be > 0 (got {radius})"
        )));
    }
    let indices = circle_indices(center_index, radius, dx, dy, grid_extent)?;
    if indices.is_empty() {
        crate::warn!(
            "aggregation center ({:.3}, {:.3}) -> pixel ({}, {}) is outside the {}x{} grid; no values collected",
            center_xy.0,
            center_xy.1,
            center_index.0,
            center_index.1,
            grid_extent.0,
            grid_extent.1
        );
        return Ok(Aggregation::empty(field_grids.keys().cloned()));
    }

    let mut values = FieldValues::new();
    for (name, grid) in field_grids {
        let mut collected = Vec::with_capacity(indices.len());
        for &(i, j) in &indices {
            if let Some(v) = grid.get(i, j) {
                collected.push(v);
            }
        }
        values.insert(name.clone(), collected);
    }

    Ok(Aggregation {
        values,
        pixel_count: indices.len(),
    })
}

/// Aggregates at a physical position of `source`, restricted to `fields`.
pub fn aggregate_at(
    source: &dyn FieldSource,
    x: f64,
    y: f64,
    radius: f64,
    fields: &[String],
) -> Result<Aggregation> {
    let (dx, dy) = source.spacing();
    let mut grids = BTreeMap::new();
    for name in fields {
        let grid = source.field(name).ok_or_else(|| {
            ProfileError::InvalidParameter(format!(
                "field '{}' is not present in sample '{}'",
                name,
                source.sample_id()
            ))
        })?;
        grids.insert(name.clone(), grid);
    }
    let center_index = source.pixel_of(x, y);
    aggregate(
        (x, y),
        center_index,
        radius,
        dx,
        dy,
        source.array_size(),
        &grids,
    )
}

#[cfg(test)]
#[path = "../../tests/src_inline/profile/aggregate.rs"]
mod tests;
