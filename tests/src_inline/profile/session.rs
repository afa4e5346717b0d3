use super::*;
use std::collections::BTreeMap;

use crate::error::ProfileError;
use crate::grid::{FieldGrid, SampleGrid};
use crate::model::{PointError, ProfileMetadata, SortAxis};
use crate::profile::events::{EventLog, ProfileEvent};

fn sample() -> SampleGrid {
    let mut fields = BTreeMap::new();
    for name in ["Ca", "Sr"] {
        let data = (0..100).map(|v| v as f64).collect();
        fields.insert(name.to_string(), FieldGrid::new(10, 10, data).unwrap());
    }
    SampleGrid::new("s", 1.0, 1.0, fields).unwrap()
}

fn store_with_profile() -> ProfileStore {
    let mut store = ProfileStore::new();
    store
        .create(
            "s",
            "p",
            ProfileMetadata {
                sort: SortAxis::None,
                radius: 1.0,
                y_axis_threshold: 1e6,
                interpolation_distance: 1.0,
                point_error: PointError::MedianIqr,
            },
        )
        .unwrap();
    store
}

fn primary(x: f64, y: f64) -> Click {
    Click::Primary { x, y }
}

#[test]
fn test_idle_ignores_clicks() {
    let source = sample();
    let mut store = store_with_profile();
    let mut session = EditSession::new("s", "p", 2.0);
    assert_eq!(
        session.click(&mut store, &source, primary(1.0, 1.0)).unwrap(),
        EditOutcome::Ignored
    );
    assert_eq!(
        session.click(&mut store, &source, Click::Secondary).unwrap(),
        EditOutcome::Ignored
    );
    assert!(store.get("s", "p").unwrap().is_empty());
}

#[test]
fn test_placing_appends_with_all_sample_fields() {
    let source = sample();
    let mut store = store_with_profile();
    let mut session = EditSession::new("s", "p", 2.0);
    session.start_placing();
    assert_eq!(
        session.click(&mut store, &source, primary(2.0, 2.0)).unwrap(),
        EditOutcome::Added(0)
    );
    assert_eq!(
        session.click(&mut store, &source, primary(6.0, 2.0)).unwrap(),
        EditOutcome::Added(1)
    );
    assert_eq!(session.mode(), EditMode::Placing);

    let profile = store.get("s", "p").unwrap();
    assert_eq!(profile.field_names(), vec!["Ca".to_string(), "Sr".to_string()]);
    assert_eq!(profile.point(0).unwrap().values["Ca"].len(), 5);

    assert_eq!(
        session.click(&mut store, &source, Click::Secondary).unwrap(),
        EditOutcome::Cancelled
    );
    assert_eq!(session.mode(), EditMode::Idle);
}

#[test]
fn test_select_then_move() {
    let source = sample();
    let mut store = store_with_profile();
    let log = EventLog::new();
    store.set_observer(Box::new(log.clone()));
    let mut session = EditSession::new("s", "p", 2.0);
    session.start_placing();
    for x in [1.0, 4.0, 7.0] {
        session.click(&mut store, &source, primary(x, 5.0)).unwrap();
    }
    session.cancel();
    log.take();

    session.start_moving();
    assert_eq!(
        session.click(&mut store, &source, primary(9.0, 9.0)).unwrap(),
        EditOutcome::NoPointNearby
    );
    assert_eq!(session.mode(), EditMode::Moving);
    assert_eq!(
        session.click(&mut store, &source, primary(4.5, 5.5)).unwrap(),
        EditOutcome::Selected(1)
    );
    assert_eq!(session.mode(), EditMode::AwaitingTarget { index: 1 });
    assert_eq!(
        session.click(&mut store, &source, primary(4.0, 8.0)).unwrap(),
        EditOutcome::Moved(1)
    );
    assert_eq!(session.mode(), EditMode::Idle);

    let profile = store.get("s", "p").unwrap();
    assert_eq!(profile.points().xs(), &[1.0, 4.0, 7.0]);
    assert_eq!(profile.points().ys(), &[5.0, 8.0, 5.0]);
    let mut ca = profile.point(1).unwrap().values["Ca"].clone();
    ca.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(ca, vec![74.0, 83.0, 84.0, 85.0, 94.0]);
    assert_eq!(
        log.events(),
        vec![ProfileEvent::PointMoved {
            sample_id: "s".into(),
            profile: "p".into(),
            index: 1,
            x: 4.0,
            y: 8.0
        }]
    );
}

#[test]
fn test_cancel_while_awaiting_target_leaves_profile_untouched() {
    let source = sample();
    let mut store = store_with_profile();
    let mut session = EditSession::new("s", "p", 2.0);
    session.start_placing();
    session.click(&mut store, &source, primary(3.0, 3.0)).unwrap();
    session.start_moving();
    session.click(&mut store, &source, primary(3.0, 3.0)).unwrap();
    let before = store.get("s", "p").unwrap().clone();
    assert_eq!(
        session.click(&mut store, &source, Click::Secondary).unwrap(),
        EditOutcome::Cancelled
    );
    assert_eq!(
        session.click(&mut store, &source, primary(8.0, 8.0)).unwrap(),
        EditOutcome::Ignored
    );
    assert_eq!(&before, store.get("s", "p").unwrap());
}

#[test]
fn test_missing_profile_is_error() {
    let source = sample();
    let mut store = ProfileStore::new();
    let mut session = EditSession::new("s", "ghost", 2.0);
    session.start_placing();
    assert!(session.click(&mut store, &source, primary(1.0, 1.0)).is_err());
}

#[test]
fn test_failed_move_returns_to_idle() {
    let source = sample();
    let mut store = store_with_profile();
    let mut session = EditSession::new("s", "p", 2.0);
    session.start_placing();
    session.click(&mut store, &source, primary(3.0, 3.0)).unwrap();
    session.click(&mut store, &source, primary(6.0, 6.0)).unwrap();
    session.start_moving();
    assert_eq!(
        session.click(&mut store, &source, primary(6.0, 6.0)).unwrap(),
        EditOutcome::Selected(1)
    );

    store.remove_point("s", "p", 1).unwrap();
    assert!(matches!(
        session.click(&mut store, &source, primary(8.0, 8.0)),
        Err(ProfileError::IndexOutOfRange { index: 1, len: 1 })
    ));
    assert_eq!(session.mode(), EditMode::Idle);
    assert_eq!(
        session.click(&mut store, &source, primary(8.0, 8.0)).unwrap(),
        EditOutcome::Ignored
    );
    assert_eq!(store.get("s", "p").unwrap().points().xs(), &[3.0]);
}
