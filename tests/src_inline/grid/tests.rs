use super::*;

fn ramp(rows: usize, cols: usize) -> FieldGrid {
    let data = (0..rows * cols).map(|v| v as f64).collect();
    FieldGrid::new(rows, cols, data).unwrap()
}

#[test]
fn test_field_grid_from_rows_row_major() {
    let grid = FieldGrid::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    assert_eq!((grid.rows, grid.cols), (2, 3));
    assert_eq!(grid.get(1, 0), Some(4.0));
    assert_eq!(grid.get(0, 2), Some(3.0));
    assert_eq!(grid.get(2, 0), None);
    assert_eq!(grid.get(0, 3), None);
}

#[test]
fn test_field_grid_ragged_rows_rejected() {
    let err = FieldGrid::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
    assert!(matches!(err, GridError::InvalidInput(_)));
}

#[test]
fn test_sample_grid_defaults_ranges_from_spacing() {
    let mut fields = BTreeMap::new();
    fields.insert("Fe".to_string(), ramp(4, 5));
    let sample = SampleGrid::new("s1", 2.0, 0.5, fields).unwrap();
    assert_eq!(sample.array_size(), (4, 5));
    assert_eq!(sample.physical_range(), (10.0, 2.0));
    assert_eq!(sample.spacing(), (2.0, 0.5));
    assert_eq!(sample.field_names(), vec!["Fe".to_string()]);
}

#[test]
fn test_sample_grid_rejects_bad_spacing_and_shapes() {
    let mut fields = BTreeMap::new();
    fields.insert("Fe".to_string(), ramp(4, 5));
    assert!(SampleGrid::new("s1", 0.0, 1.0, fields.clone()).is_err());

    fields.insert("Mg".to_string(), ramp(5, 4));
    assert!(SampleGrid::new("s1", 1.0, 1.0, fields).is_err());

    assert!(SampleGrid::new("s1", 1.0, 1.0, BTreeMap::new()).is_err());
}

#[test]
fn test_pixel_of_rounds_to_nearest_pixel() {
    let mut fields = BTreeMap::new();
    fields.insert("Fe".to_string(), ramp(10, 10));
    let sample = SampleGrid::new("s1", 2.0, 4.0, fields).unwrap();
    assert_eq!(sample.pixel_of(5.2, 9.9), (2, 3));
    assert_eq!(sample.pixel_of(-3.0, 0.0), (0, -2));
}
