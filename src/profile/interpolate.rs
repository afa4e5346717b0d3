use crate::error::{ProfileError, Result};
use crate::grid::FieldSource;
use crate::profile::aggregate::aggregate_at;
use crate::profile::path::{PointSeries, Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterpolationSummary {
    pub segments: usize,
    pub degenerate_segments: usize,
    pub synthetic_points: usize,
    pub total_points: usize,
}

/// Number of intermediate samples strictly between the segment ends.
///
/// A sample that would land on the far control point is dropped, it is
/// appended verbatim as the next segment's start.
pub fn segment_steps(length: f64, spacing: f64) -> usize {
    if !(length > 0.0 && spacing > 0.0) {
        return 0;
    }
    let mut steps = (length / spacing).floor().max(0.0) as usize;
    if steps > 0 && length - steps as f64 * spacing <= length * 1e-12 {
        steps -= 1;
    }
    steps
}

/// Rebuilds the interpolated series of `profile` from its control points.
///
/// Control points keep their collected values; only synthetic points are
/// aggregated against `source`, using the profile radius.
pub fn interpolate(
    profile: &mut Profile,
    source: &dyn FieldSource,
) -> Result<InterpolationSummary> {
    let metadata = *profile.metadata();
    let spacing = metadata.interpolation_distance;
    let fields = profile.field_names();
    let points = profile.points();

    let mut out = PointSeries::default();
    let mut summary = InterpolationSummary::default();

    let n = points.len();
    if n == 0 {
        profile.replace_interpolated(out);
        return Ok(summary);
    }

    let (xs, ys) = (points.xs(), points.ys());
    for i in 0..n.saturating_sub(1) {
        let start = points.point(i).ok_or(ProfileError::IndexOutOfRange {
            index: i,
            len: n,
        })?;
        out.push(start.x, start.y, start.values)?;
        summary.segments += 1;

        let (vx, vy) = (xs[i + 1] - xs[i], ys[i + 1] - ys[i]);
        let d = (vx * vx + vy * vy).sqrt();
        if d == 0.0 {
            summary.degenerate_segments += 1;
            crate::debug!(
                "profile '{}': control points {} and {} coincide; segment skipped",
                profile.name,
                i,
                i + 1
            );
            continue;
        }
        let (ux, uy) = (vx / d, vy / d);
        for t in 1..=segment_steps(d, spacing) {
            let along = t as f64 * spacing;
            let x = xs[i] + along * ux;
            let y = ys[i] + along * uy;
            let aggregation = aggregate_at(source, x, y, metadata.radius, &fields)?;
            out.push(x, y, aggregation.values)?;
            summary.synthetic_points += 1;
        }
    }

    let last = points.point(n - 1).ok_or(ProfileError::IndexOutOfRange {
        index: n - 1,
        len: n,
    })?;
    out.push(last.x, last.y, last.values)?;

    summary.total_points = out.len();
    crate::debug!(
        "profile '{}': {} segments, {} synthetic points, {} total",
        profile.name,
        summary.segments,
        summary.synthetic_points,
        summary.total_points
    );
    profile.replace_interpolated(out);
    Ok(summary)
}

#[cfg(test)]
#[path = "../../tests/src_inline/profile/interpolate.rs"]
mod tests;
