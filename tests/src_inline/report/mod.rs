use super::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::grid::{FieldGrid, SampleGrid};
use crate::profile::aggregate::FieldValues;
use crate::profile::interpolate::interpolate;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("lame_profile_report_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn sample() -> SampleGrid {
    let mut fields = BTreeMap::new();
    fields.insert(
        "Ca".to_string(),
        FieldGrid::new(8, 8, (0..64).map(|v| v as f64).collect()).unwrap(),
    );
    fields.insert("Sr".to_string(), FieldGrid::new(8, 8, vec![2.0; 64]).unwrap());
    SampleGrid::new("RM01", 1.0, 1.0, fields).unwrap()
}

fn profile() -> Profile {
    let mut config = ProfileConfig::default_v1();
    config.radius = 1.0;
    config.interpolation_distance = 2.0;
    let mut p = Profile::new("traverse", config.metadata()).unwrap();
    for (x, ca) in [(1.0, vec![1.0, 2.0, 3.0]), (5.0, vec![])] {
        let mut v = FieldValues::new();
        v.insert("Ca".to_string(), ca);
        v.insert("Sr".to_string(), vec![2.0]);
        p.add_point(x, 1.0, v, None).unwrap();
    }
    p
}

#[test]
fn test_format_value_precision() {
    assert_eq!(format_value(1.23456, 2), "1.23");
    assert_eq!(format_value(2.0, 0), "2");
    assert_eq!(format_value(f64::NAN, 3), "NaN");
}

#[test]
fn test_tsv_columns_and_nan_rows() {
    let config = ProfileConfig::default_v1();
    let p = profile();
    let input = ReportInput {
        sample_id: "RM01",
        profile: &p,
        fields: &[],
        use_interpolated: false,
        geometry: None,
        config: &config,
    };
    let reduced = reduce_fields(&input).unwrap();
    let text = tsv::render_series_tsv(&reduced, 1);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "distance\tx\ty\tCa_center\tCa_lower\tCa_upper\tSr_center\tSr_lower\tSr_upper"
    );
    assert_eq!(lines[1], "0.0\t1.0\t1.0\t2.0\t1.5\t2.5\t2.0\t2.0\t2.0");
    assert_eq!(lines[2], "4.0\t5.0\t1.0\tNaN\tNaN\tNaN\t2.0\t2.0\t2.0");
}

#[test]
fn test_write_profile_report_with_geometry() {
    let dir = make_temp_dir();
    let source = sample();
    let mut p = profile();
    interpolate(&mut p, &source).unwrap();
    let mut config = ProfileConfig::default_v1();
    config.precision = 2;
    let fields = vec!["Ca".to_string()];
    let input = ReportInput {
        sample_id: "RM01",
        profile: &p,
        fields: &fields,
        use_interpolated: true,
        geometry: Some(GridGeometry::of(&source)),
        config: &config,
    };
    let written = write_profile_report(&input, &dir).unwrap();
    assert_eq!(written.len(), 2);

    let tsv = fs::read_to_string(dir.join("traverse.profile.tsv")).unwrap();
    assert_eq!(tsv.lines().count(), 1 + 3);
    assert!(tsv.lines().nth(2).unwrap().starts_with("2.00\t3.00\t1.00\t"));

    let json = fs::read_to_string(dir.join("traverse.summary.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["profile"], "traverse");
    assert_eq!(value["series"], "interpolated");
    assert_eq!(value["control_points"], 2);
    assert_eq!(value["n_points"], 3);
    assert_eq!(value["path_length"], 4.0);
    assert_eq!(value["point_error"], "median_iqr");
    assert_eq!(value["window"]["radius_px_x"], 1);
    assert_eq!(value["window"]["radius_back_x"], 1.0);
    assert_eq!(value["fields"][0]["field"], "Ca");
    assert_eq!(value["fields"][0]["empty_points"], 1);
}

#[test]
fn test_unknown_field_fails_report() {
    let dir = make_temp_dir();
    let config = ProfileConfig::default_v1();
    let p = profile();
    let fields = vec!["Zr".to_string()];
    let input = ReportInput {
        sample_id: "RM01",
        profile: &p,
        fields: &fields,
        use_interpolated: false,
        geometry: None,
        config: &config,
    };
    assert!(write_profile_report(&input, &dir).is_err());
}
