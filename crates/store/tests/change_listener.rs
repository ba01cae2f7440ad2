//! Integration tests for `ChangeListener`: folding foreign-session
//! writes into a store, and teardown discipline.
//!
//! A second store over the same gateway plays the part of another
//! session; its writes surface on the change feed exactly like the
//! hosted backend's realtime events.

mod common;

use std::time::Duration;

use impact_core::models::{Project, UpdateProject};
use impact_core::types::RowId;
use impact_gateway::{ChangeEvent, ChangeKind};
use impact_store::{ChangeListener, EntityStore};

async fn row_count(store: &EntityStore<Project>) -> usize {
    store.rows().await.len()
}

#[tokio::test]
async fn insert_events_append_new_rows() {
    let fx = common::logged_in();
    let _listener = ChangeListener::spawn(fx.projects.clone()).await.unwrap();

    // Foreign session writes through its own store.
    let foreign: EntityStore<Project> = EntityStore::new(fx.gateway.clone(), fx.auth.clone());
    let created = foreign
        .create(common::create_project("From elsewhere"))
        .await
        .unwrap();

    for _ in 0..100 {
        if row_count(&fx.projects).await == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let rows = fx.projects.rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, created.id);
}

#[tokio::test]
async fn duplicate_insert_event_is_not_appended_twice() {
    let fx = common::logged_in();

    // The local create already put the row in the list; the listener
    // then sees the insert event for the same id.
    let _listener = ChangeListener::spawn(fx.projects.clone()).await.unwrap();
    let created = fx
        .projects
        .create(common::create_project("Mine"))
        .await
        .unwrap();

    // Give the fold a chance to run, then confirm no duplicate.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let rows = fx.projects.rows().await;
    assert_eq!(rows.iter().filter(|p| p.id == created.id).count(), 1);
}

#[tokio::test]
async fn update_events_replace_matching_rows() {
    let fx = common::logged_in();
    let created = fx
        .projects
        .create(common::create_project("Original"))
        .await
        .unwrap();
    let _listener = ChangeListener::spawn(fx.projects.clone()).await.unwrap();

    let foreign: EntityStore<Project> = EntityStore::new(fx.gateway.clone(), fx.auth.clone());
    let patch = UpdateProject {
        name: Some("Renamed elsewhere".into()),
        ..UpdateProject::default()
    };
    foreign.update(created.id, patch).await.unwrap();

    for _ in 0..100 {
        if fx
            .projects
            .get_by_id(created.id)
            .await
            .is_some_and(|p| p.name == "Renamed elsewhere")
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("update event was not folded within 1s");
}

#[tokio::test]
async fn delete_events_remove_matching_rows() {
    let fx = common::logged_in();
    let created = fx
        .projects
        .create(common::create_project("Short-lived"))
        .await
        .unwrap();
    let _listener = ChangeListener::spawn(fx.projects.clone()).await.unwrap();

    fx.gateway.emit(ChangeEvent {
        table: "projects".into(),
        kind: ChangeKind::Delete,
        row: serde_json::Value::Null,
        old_id: Some(created.id),
    });

    for _ in 0..100 {
        if row_count(&fx.projects).await == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("delete event was not folded within 1s");
}

#[tokio::test]
async fn delete_event_for_unknown_id_is_a_noop() {
    let fx = common::logged_in();
    let created = fx
        .projects
        .create(common::create_project("Bystander"))
        .await
        .unwrap();
    let _listener = ChangeListener::spawn(fx.projects.clone()).await.unwrap();

    fx.gateway.emit(ChangeEvent {
        table: "projects".into(),
        kind: ChangeKind::Delete,
        row: serde_json::Value::Null,
        old_id: Some(RowId::new_v4()),
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let rows = fx.projects.rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, created.id);
    assert!(fx.projects.last_error().await.is_none());
}

#[tokio::test]
async fn events_for_other_tables_are_ignored() {
    let fx = common::logged_in();
    let _listener = ChangeListener::spawn(fx.projects.clone()).await.unwrap();

    fx.indicators
        .create(common::create_indicator("other table", 0.0, 0.0, 1.0))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(fx.projects.rows().await.is_empty());
}

#[tokio::test]
async fn stopped_listener_no_longer_folds() {
    let fx = common::logged_in();
    let listener = ChangeListener::spawn(fx.projects.clone()).await.unwrap();
    listener.shutdown().await;

    let foreign: EntityStore<Project> = EntityStore::new(fx.gateway.clone(), fx.auth.clone());
    foreign
        .create(common::create_project("Unseen"))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(fx.projects.rows().await.is_empty());
}
