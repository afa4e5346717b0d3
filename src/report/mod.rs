pub mod json;
pub mod tsv;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::grid::FieldSource;
use crate::model::config::ProfileConfig;
use crate::profile::path::Profile;
use crate::stats::{ReducedSeries, reduce};

/// Grid metadata of the sample a profile was extracted from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub dx: f64,
    pub dy: f64,
    pub array_size: (usize, usize),
    pub physical_range: (f64, f64),
}

impl GridGeometry {
    pub fn of(source: &dyn FieldSource) -> Self {
        let (dx, dy) = source.spacing();
        Self {
            dx,
            dy,
            array_size: source.array_size(),
            physical_range: source.physical_range(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub sample_id: &'a str,
    pub profile: &'a Profile,
    /// Empty selects every field of the profile.
    pub fields: &'a [String],
    pub use_interpolated: bool,
    pub geometry: Option<GridGeometry>,
    pub config: &'a ProfileConfig,
}

/// `{:.precision$}`; non-finite values render as `NaN`.
pub fn format_value(v: f64, precision: usize) -> String {
    if v.is_finite() {
        format!("{:.*}", precision, v)
    } else {
        "NaN".to_string()
    }
}

pub fn reduce_fields(input: &ReportInput<'_>) -> Result<Vec<ReducedSeries>> {
    let series = input.profile.series(input.use_interpolated);
    let metadata = input.profile.metadata();
    let fields = if input.fields.is_empty() {
        input.profile.field_names()
    } else {
        input.fields.to_vec()
    };
    fields
        .iter()
        .map(|field| reduce(series, field, metadata.sort, metadata.point_error))
        .collect()
}

/// Writes `<name>.profile.tsv` and `<name>.summary.json` into `out_dir`.
pub fn write_profile_report(input: &ReportInput<'_>, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let reduced = reduce_fields(input)?;

    let tsv_path = out_dir.join(format!("{}.profile.tsv", input.profile.name));
    tsv::write_series_tsv(&tsv_path, &reduced, input.config.precision)?;

    let json_path = out_dir.join(format!("{}.summary.json", input.profile.name));
    let summary = json::build_summary(input, &reduced)?;
    write_text(&json_path, &json::render_summary_json(&summary)?)?;

    crate::info!(
        "wrote report for profile '{}' ({} fields) to {}",
        input.profile.name,
        reduced.len(),
        out_dir.display()
    );
    Ok(vec![tsv_path, json_path])
}

fn write_text(path: &Path, content: &str) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(content.as_bytes())?;
    w.write_all(b"\n")?;
    w.flush()
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
