//! Tests for satellite geometry tracking and persistence.

mod common;

use common::{Harness, bounds, doc};
use par_source_windows::geometry::{FileGeometryStore, Point};
use par_source_windows::traits::GeometryPersistence;
use par_source_windows::{SourceWindowError, SourceWindowManager, WindowId};
use par_source_windows::config::Config;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_refresh_saves_only_on_change() {
    let h = Harness::new();
    let mut main = h.main(Vec::new()).await;
    main.open_window(WindowId::from("wsat0000000a"), Some(Point::new(0, 0)), None, None)
        .unwrap();

    assert!(main.refresh_geometry().await.unwrap());
    assert_eq!(h.geometry.saves(), 1);
    assert!(!main.refresh_geometry().await.unwrap());
    assert_eq!(h.geometry.saves(), 1);

    h.windows
        .set_bounds("wsat0000000a", bounds(60, 70, 800, 800));
    assert!(main.refresh_geometry().await.unwrap());
    assert_eq!(h.geometry.saves(), 2);

    let stored = h.geometry.stored.lock().clone();
    let saved = stored[&WindowId::from("wsat0000000a")];
    assert_eq!((saved.x, saved.y), (60, 70));
    assert_eq!(saved.ordinal, 1);
}

#[tokio::test]
async fn test_refresh_failure_is_reported() {
    let h = Harness::new();
    h.geometry.set_failing(true);
    let mut main = h.main(Vec::new()).await;
    main.open_window(WindowId::from("wsat0000000a"), None, None, None)
        .unwrap();

    let err = main.refresh_geometry().await.unwrap_err();

    assert!(matches!(err, SourceWindowError::GeometryPersistence(_)));
    let errors = h.display.errors.lock().clone();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "Can't Save Window Layout");
    assert!(errors[0].1.contains("quota exceeded"));
}

#[tokio::test]
async fn test_refresh_drops_closed_windows() {
    let h = Harness::new();
    let mut main = h
        .main(vec![
            doc("D1", Some("/1.R"), "wsat0000000a"),
            doc("D2", Some("/2.R"), "wsat0000000b"),
        ])
        .await;
    h.windows.close("wsat0000000b");

    main.refresh_geometry().await.unwrap();

    assert_eq!(main.open_window_ids(), vec![WindowId::from("wsat0000000a")]);
    assert!(main.geometry().contains_key(&WindowId::from("wsat0000000a")));
}

#[tokio::test]
async fn test_geometry_survives_restart_through_file_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("source_window_geometry.yaml");
    let docs = vec![doc("D1", Some("/1.R"), "wsat0000000a")];

    let first = Harness::new();
    let mut collab = first.collaborators();
    collab.geometry = Arc::new(FileGeometryStore::new(&path));
    let mut main = SourceWindowManager::new_main(Config::default(), collab, docs.clone()).await;
    first
        .windows
        .set_bounds("wsat0000000a", bounds(300, 200, 700, 500));
    assert!(main.refresh_geometry().await.unwrap());
    drop(main);

    let on_disk = FileGeometryStore::new(&path).load().await.unwrap();
    assert_eq!(on_disk.len(), 1);

    let second = Harness::new();
    let mut collab = second.collaborators();
    collab.geometry = Arc::new(FileGeometryStore::new(&path));
    let _main = SourceWindowManager::new_main(Config::default(), collab, docs).await;

    let reopened = second.windows.last_opened().unwrap();
    assert_eq!(reopened.position, Some(Point::new(300, 200)));
    assert_eq!(reopened.size.width, 700);
    assert_eq!(reopened.params.ordinal, 1);
}
