use serde::Serialize;

use crate::error::Result;
use crate::model::{Axis, ProfileMetadata};
use crate::profile::coords::{distance_to_pixels, pixels_to_distance};
use crate::report::ReportInput;
use crate::stats::{ReducedSeries, quantile};

#[derive(Debug, Clone, Serialize)]
pub struct AggregationWindow {
    pub radius_px_x: i64,
    pub radius_px_y: i64,
    /// Pixel radius mapped back through the array-size/range scale.
    pub radius_back_x: f64,
    pub radius_back_y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSummary {
    pub field: String,
    pub center_median: Option<f64>,
    pub center_min: Option<f64>,
    pub center_max: Option<f64>,
    pub empty_points: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub tool: String,
    pub version: String,
    pub sample_id: String,
    pub profile: String,
    #[serde(flatten)]
    pub metadata: ProfileMetadata,
    pub series: &'static str,
    pub control_points: usize,
    pub n_points: usize,
    pub path_length: f64,
    pub window: Option<AggregationWindow>,
    pub fields: Vec<FieldSummary>,
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

pub fn summarize_field(series: &ReducedSeries) -> FieldSummary {
    let centers: Vec<f64> = series.centers.iter().copied().filter(|v| v.is_finite()).collect();
    let min = centers.iter().copied().fold(f64::INFINITY, f64::min);
    let max = centers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    FieldSummary {
        field: series.field.clone(),
        center_median: finite(quantile(&centers, 0.5)),
        center_min: finite(min),
        center_max: finite(max),
        empty_points: series.len() - centers.len(),
    }
}

pub fn build_summary(input: &ReportInput<'_>, reduced: &[ReducedSeries]) -> Result<ProfileSummary> {
    let metadata = *input.profile.metadata();
    let window = match input.geometry {
        Some(g) => {
            let radius_px_x = distance_to_pixels(metadata.radius, Axis::X, g.dx, g.dy)?;
            let radius_px_y = distance_to_pixels(metadata.radius, Axis::Y, g.dx, g.dy)?;
            let back = |px, axis| pixels_to_distance(px, axis, g.array_size, g.physical_range);
            Some(AggregationWindow {
                radius_px_x,
                radius_px_y,
                radius_back_x: back(radius_px_x, Axis::X)?,
                radius_back_y: back(radius_px_y, Axis::Y)?,
            })
        }
        None => None,
    };
    let series = input.profile.series(input.use_interpolated);

    Ok(ProfileSummary {
        tool: "lame-profile".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sample_id: input.sample_id.to_string(),
        profile: input.profile.name.clone(),
        metadata,
        series: if input.use_interpolated {
            "interpolated"
        } else {
            "control"
        },
        control_points: input.profile.len(),
        n_points: series.len(),
        path_length: reduced.first().map(|s| s.path_length()).unwrap_or(0.0),
        window,
        fields: reduced.iter().map(summarize_field).collect(),
    })
}

pub fn render_summary_json(summary: &ProfileSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}
