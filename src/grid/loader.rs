use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::Deserialize;

use crate::grid::{FieldGrid, GridError, SampleGrid};

pub const SAMPLE_META_FILE: &str = "sample.json";

#[derive(Debug, Clone, Deserialize)]
struct SampleMeta {
    sample_id: String,
    dx: f64,
    dy: f64,
    #[serde(default)]
    x_range: Option<f64>,
    #[serde(default)]
    y_range: Option<f64>,
}

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, GridError> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Loads `sample.json` plus one `<field>.tsv[.gz]` matrix per field.
pub fn load_sample_dir(dir: &Path) -> Result<SampleGrid, GridError> {
    let meta_path = dir.join(SAMPLE_META_FILE);
    if !meta_path.exists() {
        return Err(GridError::InvalidInput(format!(
            "missing {} in {}",
            SAMPLE_META_FILE,
            dir.display()
        )));
    }
    let meta_text = std::fs::read_to_string(&meta_path)?;
    let meta: SampleMeta = serde_json::from_str(&meta_text)
        .map_err(|e| GridError::Parse(format!("{}: {e}", meta_path.display())))?;

    let mut entries = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect::<Vec<_>>();
    entries.sort();

    let mut fields = BTreeMap::new();
    for path in entries {
        let Some(name) = field_name_of(&path) else {
            continue;
        };
        if fields.contains_key(&name) {
            crate::warn!(
                "field '{}' defined more than once; keeping first ({})",
                name,
                path.display()
            );
            continue;
        }
        let grid = read_matrix(&path)?;
        crate::debug!(
            "read field '{}' ({}x{}) from {}",
            name,
            grid.rows,
            grid.cols,
            path.display()
        );
        fields.insert(name, grid);
    }

    crate::info!(
        "loaded sample '{}' with {} fields from {}",
        meta.sample_id,
        fields.len(),
        dir.display()
    );

    let sample = SampleGrid::new(meta.sample_id, meta.dx, meta.dy, fields)?;
    let x_range = meta.x_range.unwrap_or(sample.x_range);
    let y_range = meta.y_range.unwrap_or(sample.y_range);
    Ok(sample.with_ranges(x_range, y_range))
}

fn field_name_of(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let stem = file_name
        .strip_suffix(".tsv.gz")
        .or_else(|| file_name.strip_suffix(".tsv"))?;
    if stem.is_empty() {
        return None;
    }
    Some(stem.to_string())
}

pub fn read_matrix(path: &Path) -> Result<FieldGrid, GridError> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let separator_tab = line.contains('\t');
        let cells: Vec<&str> = if separator_tab {
            line.split('\t').collect()
        } else {
            line.split_whitespace().collect()
        };
        let mut row = Vec::with_capacity(cells.len());
        for cell in cells {
            row.push(parse_cell(cell).ok_or_else(|| {
                GridError::Parse(format!(
                    "{}: invalid value '{}' (line {})",
                    path.display(),
                    cell,
                    line_no
                ))
            })?);
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(GridError::Parse(format!("{} is empty", path.display())));
    }
    FieldGrid::from_rows(rows)
}

fn parse_cell(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    trimmed.parse::<f64>().ok()
}

#[cfg(test)]
#[path = "../../tests/src_inline/grid/loader.rs"]
mod tests;
