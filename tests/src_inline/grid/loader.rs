use super::*;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::grid::FieldSource;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("lame_profile_loader_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_load_sample_dir_reads_plain_and_gz_fields() {
    let dir = make_temp_dir();
    fs::write(
        dir.join("sample.json"),
        r#"{"sample_id": "RM01", "dx": 1.5, "dy": 2.0}"#,
    )
    .unwrap();
    fs::write(dir.join("Fe.tsv"), "1\t2\t3\n4\tnan\t6\n").unwrap();

    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    gz.write_all(b"# Mg counts\n7 8 9\n10 11 12\n").unwrap();
    fs::write(dir.join("Mg.tsv.gz"), gz.finish().unwrap()).unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let sample = load_sample_dir(&dir).unwrap();
    assert_eq!(sample.sample_id(), "RM01");
    assert_eq!(sample.array_size(), (2, 3));
    assert_eq!(sample.field_names(), vec!["Fe".to_string(), "Mg".to_string()]);
    assert_eq!(sample.physical_range(), (4.5, 4.0));

    let fe = sample.field("Fe").unwrap();
    assert!(fe.get(1, 1).unwrap().is_nan());
    assert_eq!(fe.get(1, 2), Some(6.0));
    assert_eq!(sample.field("Mg").unwrap().get(1, 0), Some(10.0));
}

#[test]
fn test_load_sample_dir_explicit_ranges() {
    let dir = make_temp_dir();
    fs::write(
        dir.join("sample.json"),
        r#"{"sample_id": "RM02", "dx": 1.0, "dy": 1.0, "x_range": 30.0, "y_range": 20.0}"#,
    )
    .unwrap();
    fs::write(dir.join("Ca.tsv"), "1 2\n3 4\n").unwrap();
    let sample = load_sample_dir(&dir).unwrap();
    assert_eq!(sample.physical_range(), (30.0, 20.0));
}

#[test]
fn test_load_sample_dir_requires_metadata() {
    let dir = make_temp_dir();
    fs::write(dir.join("Ca.tsv"), "1 2\n3 4\n").unwrap();
    assert!(matches!(
        load_sample_dir(&dir),
        Err(GridError::InvalidInput(_))
    ));
}

#[test]
fn test_read_matrix_rejects_garbage() {
    let dir = make_temp_dir();
    let path = dir.join("Bad.tsv");
    fs::write(&path, "1\tabc\n").unwrap();
    assert!(matches!(read_matrix(&path), Err(GridError::Parse(_))));
}
