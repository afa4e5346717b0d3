use std::collections::BTreeMap;

use thiserror::Error;

pub mod loader;

pub use loader::load_sample_dir;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// One measured field, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGrid {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f64>,
}

impl FieldGrid {
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, GridError> {
        if data.len() != rows * cols {
            return Err(GridError::InvalidInput(format!(
                "grid data has {} values, expected {}x{}",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, GridError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(GridError::InvalidInput(format!(
                    "row {} has {} columns, expected {}",
                    idx,
                    row.len(),
                    n_cols
                )));
            }
            data.extend(row);
        }
        Self::new(n_rows, n_cols, data)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }
}

/// Read-only view of the active sample consumed by the aggregation code.
pub trait FieldSource {
    fn sample_id(&self) -> &str;
    /// Physical spacing per pixel `(dx, dy)`.
    fn spacing(&self) -> (f64, f64);
    /// `(rows, cols)`.
    fn array_size(&self) -> (usize, usize);
    /// Physical extent `(x_range, y_range)`.
    fn physical_range(&self) -> (f64, f64);
    fn field_names(&self) -> Vec<String>;
    fn field(&self, name: &str) -> Option<&FieldGrid>;

    /// Nearest pixel `(row, col)` for a physical position. May lie outside the grid.
    fn pixel_of(&self, x: f64, y: f64) -> (i64, i64) {
        let (dx, dy) = self.spacing();
        ((y / dy).round() as i64, (x / dx).round() as i64)
    }
}

#[derive(Debug, Clone)]
pub struct SampleGrid {
    pub sample_id: String,
    pub dx: f64,
    pub dy: f64,
    pub array_size: (usize, usize),
    pub x_range: f64,
    pub y_range: f64,
    pub fields: BTreeMap<String, FieldGrid>,
}

impl SampleGrid {
    pub fn new(
        sample_id: impl Into<String>,
        dx: f64,
        dy: f64,
        fields: BTreeMap<String, FieldGrid>,
    ) -> Result<Self, GridError> {
        if !(dx > 0.0 && dy > 0.0) {
            return Err(GridError::InvalidInput(format!(
                "grid spacing must be > 0 (dx={dx}, dy={dy})"
            )));
        }
        let array_size = match fields.values().next() {
            Some(first) => (first.rows, first.cols),
            None => return Err(GridError::InvalidInput("sample has no fields".to_string())),
        };
        for (name, grid) in &fields {
            if (grid.rows, grid.cols) != array_size {
                return Err(GridError::InvalidInput(format!(
                    "field '{}' is {}x{}, expected {}x{}",
                    name, grid.rows, grid.cols, array_size.0, array_size.1
                )));
            }
        }
        Ok(Self {
            sample_id: sample_id.into(),
            dx,
            dy,
            array_size,
            x_range: array_size.1 as f64 * dx,
            y_range: array_size.0 as f64 * dy,
            fields,
        })
    }

    pub fn with_ranges(mut self, x_range: f64, y_range: f64) -> Self {
        self.x_range = x_range;
        self.y_range = y_range;
        self
    }
}

impl FieldSource for SampleGrid {
    fn sample_id(&self) -> &str {
        &self.sample_id
    }

    fn spacing(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    fn array_size(&self) -> (usize, usize) {
        self.array_size
    }

    fn physical_range(&self) -> (f64, f64) {
        (self.x_range, self.y_range)
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    fn field(&self, name: &str) -> Option<&FieldGrid> {
        self.fields.get(name)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/grid/tests.rs"]
mod tests;
