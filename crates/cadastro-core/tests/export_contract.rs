//! Contract: export artifact production
//!
//! Verifies that export reuses the query's visibility rules, names the
//! artifact after the filter, and treats an empty selection as an
//! informational outcome rather than producing an empty file.

mod common;

use common::*;
use cadastro_core::export::ExportOutcome;
use cadastro_core::service::RecordService;
use cadastro_core::traits::StatusFilter;
use tempfile::tempdir;

async fn seed(service: &RecordService) -> (i64, i64) {
    let a = service
        .create("Ana Silva", "cliente", "01001000")
        .await
        .unwrap();
    let b = service
        .create("Bruno Lima", "fornecedor", "01310100")
        .await
        .unwrap();
    service.set_active(b.id, false).await.unwrap();
    (a.id, b.id)
}

#[tokio::test]
async fn export_writes_an_artifact_named_for_the_filter() {
    let dir = tempdir().unwrap();
    let store = CountingStore::new();
    let resolver = StubResolver::returning(StubOutcome::Address("Praça da Sé".to_string()));
    let service = default_service(&store, &resolver);
    let (a, _b) = seed(&service).await;

    let outcome = service
        .export(StatusFilter::ActiveOnly, dir.path())
        .await
        .unwrap();

    let ExportOutcome::Written { path, count } = outcome else {
        panic!("expected a written artifact");
    };
    assert_eq!(count, 1);
    assert!(path.ends_with("export_active.json"));

    let content = std::fs::read_to_string(&path).unwrap();
    let rows: serde_json::Value = serde_json::from_str(&content).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], a);
    // The filter already implies the status, so the rows don't carry it
    assert!(rows[0].get("active").is_none());
}

#[tokio::test]
async fn full_export_keeps_the_status_flag() {
    let dir = tempdir().unwrap();
    let store = CountingStore::new();
    let resolver = StubResolver::returning(StubOutcome::Address("Praça da Sé".to_string()));
    let service = default_service(&store, &resolver);
    let (a, b) = seed(&service).await;

    let outcome = service.export(StatusFilter::All, dir.path()).await.unwrap();

    let ExportOutcome::Written { path, count } = outcome else {
        panic!("expected a written artifact");
    };
    assert_eq!(count, 2);
    assert!(path.ends_with("export_all.json"));

    let content = std::fs::read_to_string(&path).unwrap();
    let rows: serde_json::Value = serde_json::from_str(&content).unwrap();
    let rows = rows.as_array().unwrap();
    // Most recently created first
    assert_eq!(rows[0]["id"], b);
    assert_eq!(rows[0]["active"], false);
    assert_eq!(rows[1]["id"], a);
    assert_eq!(rows[1]["active"], true);
}

#[tokio::test]
async fn empty_selection_writes_nothing() {
    let dir = tempdir().unwrap();
    let store = CountingStore::new();
    let resolver = StubResolver::returning(StubOutcome::Address("Praça da Sé".to_string()));
    let service = default_service(&store, &resolver);
    // No records at all

    let outcome = service
        .export(StatusFilter::InactiveOnly, dir.path())
        .await
        .unwrap();

    assert_eq!(outcome, ExportOutcome::NothingToExport);
    assert!(!dir.path().join("export_inactive.json").exists());
}

#[tokio::test]
async fn inactive_export_selects_only_inactive_records() {
    let dir = tempdir().unwrap();
    let store = CountingStore::new();
    let resolver = StubResolver::returning(StubOutcome::Address("Praça da Sé".to_string()));
    let service = default_service(&store, &resolver);
    let (_a, b) = seed(&service).await;

    let outcome = service
        .export(StatusFilter::InactiveOnly, dir.path())
        .await
        .unwrap();

    let ExportOutcome::Written { path, count } = outcome else {
        panic!("expected a written artifact");
    };
    assert_eq!(count, 1);

    let content = std::fs::read_to_string(&path).unwrap();
    let rows: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(rows[0]["id"], b);
}
