use super::*;

#[test]
fn test_distance_to_pixels_per_axis() {
    assert_eq!(distance_to_pixels(10.0, Axis::X, 2.0, 5.0).unwrap(), 5);
    assert_eq!(distance_to_pixels(10.0, Axis::Y, 2.0, 5.0).unwrap(), 2);
    assert_eq!(distance_to_pixels(2.5, Axis::X, 1.0, 1.0).unwrap(), 3);
    assert_eq!(distance_to_pixels(2.4, Axis::Y, 1.0, 1.0).unwrap(), 2);
}

#[test]
fn test_distance_to_pixels_invalid_spacing() {
    for (dx, dy) in [(0.0, 1.0), (1.0, -2.0), (f64::NAN, 1.0)] {
        let err = distance_to_pixels(1.0, Axis::X, dx, dy).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidGridSpacing { .. }));
    }
}

#[test]
fn test_pixels_to_distance_uses_extent_scale() {
    // 100 columns over 50 units, 20 rows over 40 units.
    let size = (20, 100);
    let range = (50.0, 40.0);
    assert!((pixels_to_distance(3, Axis::X, size, range).unwrap() - 6.0).abs() < 1e-12);
    assert!((pixels_to_distance(3, Axis::Y, size, range).unwrap() - 1.5).abs() < 1e-12);
    assert!(pixels_to_distance(3, Axis::Y, size, (50.0, 0.0)).is_err());
}

#[test]
fn test_conversions_are_not_inverse_in_general() {
    let px = distance_to_pixels(4.0, Axis::X, 2.0, 2.0).unwrap();
    assert_eq!(px, 2);
    // Spacing 2.0 with a 10-column, 20-unit extent maps back as 2 * 10 / 20.
    let back = pixels_to_distance(px, Axis::X, (10, 10), (20.0, 20.0)).unwrap();
    assert!((back - 1.0).abs() < 1e-12);
}
