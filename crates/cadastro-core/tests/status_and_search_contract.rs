//! Contract: status visibility, idempotent toggles, search reach
//!
//! Verifies that the active flag drives listing visibility without ever
//! hiding a record from direct lookup or search, that status toggles are
//! idempotent, and that delete is a true removal.

mod common;

use common::*;
use cadastro_core::error::Error;
use cadastro_core::service::RecordService;
use cadastro_core::traits::{RecordQuery, StatusFilter};

async fn seed_three(service: &RecordService) -> (i64, i64, i64) {
    let a = service
        .create("Ana Silva", "cliente", "01001000")
        .await
        .unwrap();
    let b = service
        .create("Bruno Lima", "fornecedor", "01310100")
        .await
        .unwrap();
    let c = service
        .create("Carla Dias", "parceira", "20040002")
        .await
        .unwrap();
    (a.id, b.id, c.id)
}

#[tokio::test]
async fn set_active_is_idempotent() {
    let store = CountingStore::new();
    let resolver = StubResolver::returning(StubOutcome::Address("Praça da Sé".to_string()));
    let service = default_service(&store, &resolver);
    let record = service
        .create("Ana Silva", "cliente", "01001000")
        .await
        .unwrap();

    let first = service.set_active(record.id, false).await.unwrap();
    assert!(!first.active);

    let second = service.set_active(record.id, false).await.unwrap();
    assert!(!second.active);
    // Still a successful write: the timestamp moves even without a
    // state transition.
    assert!(second.updated_at >= first.updated_at);
}

#[tokio::test]
async fn set_active_unknown_id_is_not_found() {
    let store = CountingStore::new();
    let resolver = StubResolver::returning(StubOutcome::Address("Praça da Sé".to_string()));
    let service = default_service(&store, &resolver);

    let err = service.set_active(123, true).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(123)));
}

#[tokio::test]
async fn active_filter_never_yields_inactive_records() {
    let store = CountingStore::new();
    let resolver = StubResolver::returning(StubOutcome::Address("Praça da Sé".to_string()));
    let service = default_service(&store, &resolver);
    let (_a, b, _c) = seed_three(&service).await;

    service.set_active(b, false).await.unwrap();

    let active = service
        .query(RecordQuery::status(StatusFilter::ActiveOnly))
        .await
        .unwrap();
    assert!(active.iter().all(|record| record.active));
    assert!(!active.iter().any(|record| record.id == b));

    let inactive = service
        .query(RecordQuery::status(StatusFilter::InactiveOnly))
        .await
        .unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].id, b);

    let all = service
        .query(RecordQuery::status(StatusFilter::All))
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn query_orders_most_recently_created_first() {
    let store = CountingStore::new();
    let resolver = StubResolver::returning(StubOutcome::Address("Praça da Sé".to_string()));
    let service = default_service(&store, &resolver);
    let (a, b, c) = seed_three(&service).await;

    let all = service
        .query(RecordQuery::status(StatusFilter::All))
        .await
        .unwrap();
    let ids: Vec<i64> = all.iter().map(|record| record.id).collect();
    assert_eq!(ids, vec![c, b, a]);
}

#[tokio::test]
async fn delete_removes_the_record_for_good() {
    let store = CountingStore::new();
    let resolver = StubResolver::returning(StubOutcome::Address("Praça da Sé".to_string()));
    let service = default_service(&store, &resolver);
    let (a, _b, _c) = seed_three(&service).await;

    service.delete(a).await.unwrap();

    assert!(matches!(service.get(a).await, Err(Error::NotFound(_))));
    assert_eq!(service.counts().await.unwrap().total, 2);
}

#[tokio::test]
async fn delete_unknown_id_leaves_the_store_untouched() {
    let store = CountingStore::new();
    let resolver = StubResolver::returning(StubOutcome::Address("Praça da Sé".to_string()));
    let service = default_service(&store, &resolver);
    seed_three(&service).await;

    let err = service.delete(9999).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(9999)));
    assert_eq!(service.counts().await.unwrap().total, 3);
}

#[tokio::test]
async fn search_matches_identifier_without_textual_match() {
    let store = CountingStore::new();
    let resolver = StubResolver::returning(StubOutcome::Address("Praça da Sé".to_string()));
    let service = default_service(&store, &resolver);

    // No text field of any record contains the digits "42"
    for _ in 0..42 {
        service
            .create("Registro Comum", "registro de teste", "01001000")
            .await
            .unwrap();
    }

    let found = service.search("42").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 42);
}

#[tokio::test]
async fn search_is_case_insensitive_over_text_fields() {
    let store = CountingStore::new();
    let resolver = StubResolver::returning(StubOutcome::Address("Praça da Sé".to_string()));
    let service = default_service(&store, &resolver);
    seed_three(&service).await;

    let by_name = service.search("bruno").await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Bruno Lima");

    let by_address = service.search("PRAÇA").await.unwrap();
    assert_eq!(by_address.len(), 3);

    let by_description = service.search("Parceira").await.unwrap();
    assert_eq!(by_description.len(), 1);
}

#[tokio::test]
async fn search_reaches_inactive_records() {
    let store = CountingStore::new();
    let resolver = StubResolver::returning(StubOutcome::Address("Praça da Sé".to_string()));
    let service = default_service(&store, &resolver);
    let (_a, b, _c) = seed_three(&service).await;

    service.set_active(b, false).await.unwrap();

    let found = service.search("Bruno").await.unwrap();
    assert_eq!(found.len(), 1);
    assert!(!found[0].active);
}

#[tokio::test]
async fn search_without_match_is_empty_not_an_error() {
    let store = CountingStore::new();
    let resolver = StubResolver::returning(StubOutcome::Address("Praça da Sé".to_string()));
    let service = default_service(&store, &resolver);
    seed_three(&service).await;

    let found = service.search("inexistente").await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn search_results_keep_query_ordering() {
    let store = CountingStore::new();
    let resolver = StubResolver::returning(StubOutcome::Address("Praça da Sé".to_string()));
    let service = default_service(&store, &resolver);
    let (a, b, c) = seed_three(&service).await;

    let found = service.search("praça").await.unwrap();
    let ids: Vec<i64> = found.iter().map(|record| record.id).collect();
    assert_eq!(ids, vec![c, b, a]);
}
