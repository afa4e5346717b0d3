use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::report::format_value;
use crate::stats::ReducedSeries;

/// One row per point; every field contributes `center`, `lower`, `upper` columns.
///
/// Distance and coordinates come from the first series, which share the
/// same sort order.
pub fn write_series_tsv(
    path: &Path,
    series: &[ReducedSeries],
    precision: usize,
) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(render_series_tsv(series, precision).as_bytes())?;
    w.flush()
}

pub fn render_series_tsv(series: &[ReducedSeries], precision: usize) -> String {
    let mut out = String::new();
    let mut header = vec!["distance".to_string(), "x".to_string(), "y".to_string()];
    for s in series {
        header.push(format!("{}_center", s.field));
        header.push(format!("{}_lower", s.field));
        header.push(format!("{}_upper", s.field));
    }
    out.push_str(&header.join("\t"));
    out.push('\n');

    let Some(first) = series.first() else {
        return out;
    };
    for row in 0..first.len() {
        let mut cells = vec![
            format_value(first.distances[row], precision),
            format_value(first.x[row], precision),
            format_value(first.y[row], precision),
        ];
        for s in series {
            cells.push(format_value(s.centers[row], precision));
            cells.push(format_value(s.lowers[row], precision));
            cells.push(format_value(s.uppers[row], precision));
        }
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}
