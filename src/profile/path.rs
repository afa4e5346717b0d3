use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};
use crate::model::ProfileMetadata;
use crate::profile::aggregate::FieldValues;

#[derive(Debug, Clone, PartialEq)]
pub struct ControlPoint {
    pub x: f64,
    pub y: f64,
    pub values: FieldValues,
}

/// Parallel coordinate and per-field value arrays. Every array has the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct PointSeries {
    x: Vec<f64>,
    y: Vec<f64>,
    #[serde(serialize_with = "nullable::serialize")]
    values: BTreeMap<String, Vec<Vec<f64>>>,
}

#[derive(Deserialize)]
struct RawSeries {
    x: Vec<f64>,
    y: Vec<f64>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    values: BTreeMap<String, Vec<Vec<f64>>>,
}

/// JSON has no NaN; missing pixels are written as `null`.
mod nullable {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    type Columns = BTreeMap<String, Vec<Vec<f64>>>;

    pub fn serialize<S: Serializer>(values: &Columns, serializer: S) -> Result<S::Ok, S::Error> {
        let mapped: BTreeMap<&str, Vec<Vec<Option<f64>>>> = values
            .iter()
            .map(|(name, column)| {
                let rows = column
                    .iter()
                    .map(|list| list.iter().map(|v| v.is_finite().then_some(*v)).collect())
                    .collect();
                (name.as_str(), rows)
            })
            .collect();
        serializer.collect_map(mapped)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Columns, D::Error> {
        let raw = BTreeMap::<String, Vec<Vec<Option<f64>>>>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(name, column)| {
                let rows = column
                    .into_iter()
                    .map(|list| list.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
                    .collect();
                (name, rows)
            })
            .collect())
    }
}

impl TryFrom<RawSeries> for PointSeries {
    type Error = String;

    fn try_from(raw: RawSeries) -> std::result::Result<Self, Self::Error> {
        let n = raw.x.len();
        if raw.y.len() != n {
            return Err(format!("x has {} entries but y has {}", n, raw.y.len()));
        }
        for (field, column) in &raw.values {
            if column.len() != n {
                return Err(format!(
                    "field '{}' has {} entries, expected {}",
                    field,
                    column.len(),
                    n
                ));
            }
        }
        Ok(Self {
            x: raw.x,
            y: raw.y,
            values: raw.values,
        })
    }
}

impl PointSeries {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn xs(&self) -> &[f64] {
        &self.x
    }

    pub fn ys(&self) -> &[f64] {
        &self.y
    }

    /// Per-point value lists for `field`.
    pub fn column(&self, field: &str) -> Option<&[Vec<f64>]> {
        self.values.get(field).map(|c| c.as_slice())
    }

    pub fn field_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    pub fn point(&self, index: usize) -> Option<ControlPoint> {
        if index >= self.len() {
            return None;
        }
        Some(ControlPoint {
            x: self.x[index],
            y: self.y[index],
            values: self
                .values
                .iter()
                .map(|(name, column)| (name.clone(), column[index].clone()))
                .collect(),
        })
    }

    pub fn push(&mut self, x: f64, y: f64, values: FieldValues) -> Result<()> {
        let at = self.len();
        self.insert(at, x, y, values)
    }

    pub fn insert(&mut self, index: usize, x: f64, y: f64, mut values: FieldValues) -> Result<()> {
        if index > self.len() {
            return Err(ProfileError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        self.check_fields(&values)?;
        if self.is_empty() && self.values.is_empty() {
            for name in values.keys() {
                self.values.insert(name.clone(), Vec::new());
            }
        }
        self.x.insert(index, x);
        self.y.insert(index, y);
        for (name, column) in self.values.iter_mut() {
            column.insert(index, values.remove(name).unwrap_or_default());
        }
        Ok(())
    }

    pub fn replace(&mut self, index: usize, x: f64, y: f64, mut values: FieldValues) -> Result<()> {
        if index >= self.len() {
            return Err(ProfileError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        self.check_fields(&values)?;
        self.x[index] = x;
        self.y[index] = y;
        for (name, column) in self.values.iter_mut() {
            column[index] = values.remove(name).unwrap_or_default();
        }
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<ControlPoint> {
        let Some(point) = self.point(index) else {
            return Err(ProfileError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        };
        self.x.remove(index);
        self.y.remove(index);
        for column in self.values.values_mut() {
            column.remove(index);
        }
        Ok(point)
    }

    /// Empties the coordinates and values. The field set survives as long as
    /// `keep_fields` is set.
    pub fn clear(&mut self, keep_fields: bool) {
        self.x.clear();
        self.y.clear();
        if keep_fields {
            for column in self.values.values_mut() {
                column.clear();
            }
        } else {
            self.values.clear();
        }
    }

    fn check_fields(&self, values: &FieldValues) -> Result<()> {
        if self.is_empty() && self.values.is_empty() {
            return Ok(());
        }
        let same = values.len() == self.values.len()
            && values.keys().all(|name| self.values.contains_key(name));
        if !same {
            return Err(ProfileError::InvalidParameter(format!(
                "point fields [{}] do not match profile fields [{}]",
                values.keys().cloned().collect::<Vec<_>>().join(", "),
                self.values.keys().cloned().collect::<Vec<_>>().join(", ")
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(flatten)]
    metadata: ProfileMetadata,
    points: PointSeries,
    #[serde(default)]
    interpolated_points: PointSeries,
}

impl Profile {
    pub fn new(name: impl Into<String>, metadata: ProfileMetadata) -> Result<Self> {
        metadata.validate()?;
        Ok(Self {
            name: name.into(),
            metadata,
            points: PointSeries::default(),
            interpolated_points: PointSeries::default(),
        })
    }

    pub fn metadata(&self) -> &ProfileMetadata {
        &self.metadata
    }

    /// Radius or spacing changes drop the interpolated points.
    pub fn set_metadata(&mut self, metadata: ProfileMetadata) -> Result<()> {
        metadata.validate()?;
        if metadata.radius != self.metadata.radius
            || metadata.interpolation_distance != self.metadata.interpolation_distance
        {
            self.interpolated_points.clear(false);
        }
        self.metadata = metadata;
        Ok(())
    }

    pub fn points(&self) -> &PointSeries {
        &self.points
    }

    pub fn interpolated_points(&self) -> &PointSeries {
        &self.interpolated_points
    }

    pub fn series(&self, use_interpolated: bool) -> &PointSeries {
        if use_interpolated {
            &self.interpolated_points
        } else {
            &self.points
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.points.field_names()
    }

    pub fn point(&self, index: usize) -> Option<ControlPoint> {
        self.points.point(index)
    }

    /// Appends when `at_index` is `None`, otherwise inserts. Returns the new point's index.
    ///
    /// Every successful point edit drops the interpolated points; call
    /// `interpolate` again to rebuild them.
    pub fn add_point(
        &mut self,
        x: f64,
        y: f64,
        aggregated: FieldValues,
        at_index: Option<usize>,
    ) -> Result<usize> {
        let index = at_index.unwrap_or(self.points.len());
        self.points.insert(index, x, y, aggregated)?;
        self.interpolated_points.clear(false);
        Ok(index)
    }

    pub fn move_point(
        &mut self,
        index: usize,
        x: f64,
        y: f64,
        aggregated: FieldValues,
    ) -> Result<()> {
        self.points.replace(index, x, y, aggregated)?;
        self.interpolated_points.clear(false);
        Ok(())
    }

    pub fn remove_point(&mut self, index: usize) -> Result<ControlPoint> {
        let point = self.points.remove(index)?;
        self.interpolated_points.clear(false);
        Ok(point)
    }

    pub fn clear(&mut self) {
        self.points.clear(false);
        self.interpolated_points.clear(false);
    }

    /// Index of the point closest to `(x, y)`, if within `tolerance`.
    pub fn nearest_point(&self, x: f64, y: f64, tolerance: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, (&px, &py)) in self.points.xs().iter().zip(self.points.ys()).enumerate() {
            let d2 = (px - x).powi(2) + (py - y).powi(2);
            if best.is_none_or(|(_, b)| d2 < b) {
                best = Some((i, d2));
            }
        }
        best.filter(|&(_, d2)| d2 <= tolerance * tolerance)
            .map(|(i, _)| i)
    }

    pub(crate) fn replace_interpolated(&mut self, series: PointSeries) {
        self.interpolated_points = series;
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/profile/path.rs"]
mod tests;
