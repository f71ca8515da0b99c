//! Tests for requests the main window makes of every satellite in turn.

mod common;

use common::{Harness, PREFIX, doc};
use parking_lot::Mutex;
use par_source_windows::satellite::UnsavedChangesItem;
use par_source_windows::{DocId, SourceWindowManager, WindowId};
use std::sync::Arc;

const IDS: [&str; 3] = ["wsat0000000a", "wsat0000000b", "wsat0000000c"];

async fn main_with_three(h: &Harness) -> SourceWindowManager {
    let mut main = h.main(vec![doc("D1", Some("/1.R"), "wsat0000000a")]).await;
    for id in &IDS[1..] {
        main.open_window(WindowId::from(*id), None, None, None).unwrap();
    }
    main
}

fn item(id: &str) -> UnsavedChangesItem {
    UnsavedChangesItem {
        id: DocId::from(id),
        path: Some(format!("/{id}.R")),
        title: format!("{id}.R"),
    }
}

#[tokio::test]
async fn test_save_all_runs_in_open_order_and_skips_failures() {
    let h = Harness::new();
    let journal = Arc::new(Mutex::new(Vec::new()));
    for id in IDS {
        h.script_satellite(id, &journal, |s| s.fail = id == "wsat0000000b");
    }
    let main = main_with_three(&h).await;

    let report = main.save_all_unsaved().await;

    assert_eq!(
        *journal.lock(),
        vec![
            "wsat0000000a:save_all",
            "wsat0000000b:save_all",
            "wsat0000000c:save_all",
        ]
    );
    assert_eq!(report.outputs.len(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].0, "wsat0000000b");
    assert!(report.skipped[0].1.contains("not responding"));
    assert!(!report.all_succeeded());
}

#[tokio::test]
async fn test_closed_satellites_are_not_asked() {
    let h = Harness::new();
    let journal = Arc::new(Mutex::new(Vec::new()));
    for id in IDS {
        h.script_satellite(id, &journal, |_| {});
    }
    let main = main_with_three(&h).await;
    h.windows.close("wsat0000000b");

    let report = main.save_all_unsaved().await;

    assert!(report.all_succeeded());
    assert_eq!(
        *journal.lock(),
        vec!["wsat0000000a:save_all", "wsat0000000c:save_all"]
    );
}

#[tokio::test]
async fn test_close_all_docs_raises_each_then_focuses_main() {
    let h = Harness::new();
    let journal = Arc::new(Mutex::new(Vec::new()));
    for id in IDS {
        h.script_satellite(id, &journal, |_| {});
    }
    let main = main_with_three(&h).await;

    let report = main.close_all_satellite_docs("Quit R Session").await;

    assert!(report.finalized);
    assert_eq!(
        h.windows.activated(),
        IDS.iter().map(|id| format!("{PREFIX}{id}")).collect::<Vec<_>>()
    );
    assert_eq!(h.windows.main_focus_count(), 1);
    assert_eq!(journal.lock()[0], "wsat0000000a:close_all(Quit R Session)");
}

#[tokio::test]
async fn test_close_all_docs_finalizes_after_failure() {
    let h = Harness::new();
    let journal = Arc::new(Mutex::new(Vec::new()));
    for id in IDS {
        h.script_satellite(id, &journal, |s| s.fail = true);
    }
    let main = main_with_three(&h).await;

    let report = main.close_all_satellite_docs("Close All").await;

    assert_eq!(report.skipped.len(), 3);
    assert!(report.finalized);
    assert_eq!(h.windows.main_focus_count(), 1);
}

#[tokio::test]
async fn test_unsaved_changes_are_collected_from_all_satellites() {
    let h = Harness::new();
    let journal = Arc::new(Mutex::new(Vec::new()));
    h.script_satellite("wsat0000000a", &journal, |s| s.unsaved = vec![item("D1")]);
    h.script_satellite("wsat0000000b", &journal, |s| s.fail = true);
    h.script_satellite("wsat0000000c", &journal, |s| {
        s.unsaved = vec![item("D5"), item("D6")]
    });
    let main = main_with_three(&h).await;

    let items = main.get_all_satellite_unsaved_changes().await;

    let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["D1", "D5", "D6"]);
}

#[tokio::test]
async fn test_before_exit_items_reach_every_satellite() {
    let h = Harness::new();
    let journal = Arc::new(Mutex::new(Vec::new()));
    for id in IDS {
        h.script_satellite(id, &journal, |_| {});
    }
    let main = main_with_three(&h).await;

    let report = main
        .handle_unsaved_changes_before_exit(vec![item("D1"), item("D2")])
        .await;

    assert!(report.all_succeeded());
    assert_eq!(journal.lock().len(), 3);
    assert!(journal.lock().iter().all(|e| e.ends_with("before_exit(2)")));
}

#[tokio::test]
async fn test_save_with_prompt_targets_owner() {
    let h = Harness::new();
    let journal = Arc::new(Mutex::new(Vec::new()));
    h.script_satellite("wsat0000000a", &journal, |_| {});
    let main = h
        .main(vec![
            doc("D1", Some("/1.R"), "wsat0000000a"),
            doc("D2", Some("/2.R"), ""),
        ])
        .await;

    main.save_with_prompt(item("D1")).await.unwrap();
    assert_eq!(*journal.lock(), vec!["wsat0000000a:save_with_prompt(D1)"]);
    assert_eq!(h.windows.activated(), vec![format!("{PREFIX}wsat0000000a")]);

    // owned by main: nothing to ask
    main.save_with_prompt(item("D2")).await.unwrap();
    assert_eq!(journal.lock().len(), 1);
}

#[tokio::test]
async fn test_current_doc_path_prefers_last_focused_satellite() {
    let h = Harness::new();
    *h.editor.path.lock() = Some("/main.R".to_string());
    let journal = Arc::new(Mutex::new(Vec::new()));
    h.script_satellite("wsat0000000a", &journal, |s| {
        s.current_path = Some("/sat.R".to_string())
    });

    let mut main = h.main(Vec::new()).await;
    assert_eq!(main.current_doc_path().await.unwrap().as_deref(), Some("/main.R"));

    main.open_window(WindowId::from("wsat0000000a"), None, None, None)
        .unwrap();
    assert_eq!(main.current_doc_path().await.unwrap().as_deref(), Some("/sat.R"));

    h.windows.close("wsat0000000a");
    assert_eq!(main.current_doc_path().await.unwrap().as_deref(), Some("/main.R"));
}
