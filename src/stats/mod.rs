use std::cmp::Ordering;

use serde::Serialize;

use crate::error::{ProfileError, Result};
use crate::model::{PointError, SortAxis};
use crate::profile::path::PointSeries;

/// Distance-ordered series ready for an error-bar plot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReducedSeries {
    pub field: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub distances: Vec<f64>,
    pub centers: Vec<f64>,
    pub lowers: Vec<f64>,
    pub uppers: Vec<f64>,
}

impl ReducedSeries {
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn path_length(&self) -> f64 {
        self.distances.last().copied().unwrap_or(0.0)
    }
}

fn finite_sorted(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
}

/// Linear interpolation between closest ranks, `p` in `[0, 1]`. Input must be sorted.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let h = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

pub fn quantile(values: &[f64], p: f64) -> f64 {
    quantile_sorted(&finite_sorted(values), p)
}

pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}

pub fn mean(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for &v in values.iter().filter(|v| v.is_finite()) {
        sum += v;
        n += 1;
    }
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Sample standard deviation (n - 1 denominator); NaN below two values.
pub fn std_dev(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = finite.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = finite.iter().sum::<f64>() / n as f64;
    let ss: f64 = finite.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Standard error of the mean. A single value has no spread and yields 0.
pub fn std_error(values: &[f64]) -> f64 {
    let n = values.iter().filter(|v| v.is_finite()).count();
    match n {
        0 => f64::NAN,
        1 => 0.0,
        _ => std_dev(values) / (n as f64).sqrt(),
    }
}

/// `(center, lower, upper)` for one point's raw values.
pub fn point_statistic(values: &[f64], statistic: PointError) -> (f64, f64, f64) {
    match statistic {
        PointError::MedianIqr => {
            let sorted = finite_sorted(values);
            (
                quantile_sorted(&sorted, 0.5),
                quantile_sorted(&sorted, 0.25),
                quantile_sorted(&sorted, 0.75),
            )
        }
        PointError::MeanStderr => {
            let m = mean(values);
            let se = std_error(values);
            (m, m - se, m + se)
        }
    }
}

/// Reduces every point of `points` for `field`, ordered by `sort_axis`.
///
/// Distances accumulate along the sorted order, not the click order.
pub fn reduce(
    points: &PointSeries,
    field: &str,
    sort_axis: SortAxis,
    statistic: PointError,
) -> Result<ReducedSeries> {
    let mut out = ReducedSeries {
        field: field.to_string(),
        ..ReducedSeries::default()
    };
    if points.is_empty() {
        return Ok(out);
    }
    let column = points.column(field).ok_or_else(|| {
        ProfileError::InvalidParameter(format!("field '{field}' is not part of the profile"))
    })?;
    let (xs, ys) = (points.xs(), points.ys());

    let mut order: Vec<usize> = (0..points.len()).collect();
    match sort_axis {
        SortAxis::None => {}
        SortAxis::X => order.sort_by(|&a, &b| xs[a].total_cmp(&xs[b])),
        SortAxis::Y => order.sort_by(|&a, &b| ys[a].total_cmp(&ys[b])),
    }

    let mut travelled = 0.0;
    for (k, &idx) in order.iter().enumerate() {
        if k > 0 {
            let prev = order[k - 1];
            travelled += ((xs[idx] - xs[prev]).powi(2) + (ys[idx] - ys[prev]).powi(2)).sqrt();
        }
        let (center, lower, upper) = point_statistic(&column[idx], statistic);
        out.x.push(xs[idx]);
        out.y.push(ys[idx]);
        out.distances.push(travelled);
        out.centers.push(center);
        out.lowers.push(lower);
        out.uppers.push(upper);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/tests.rs"]
mod tests;
