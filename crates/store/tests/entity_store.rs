//! Integration tests for `EntityStore` CRUD, state flags, and local
//! lookups, driven entirely by the in-memory gateway.

mod common;

use assert_matches::assert_matches;
use impact_core::models::UpdateProject;
use impact_core::types::RowId;
use impact_gateway::AuthProvider;
use impact_gateway::GatewayError;
use impact_store::StoreError;

// ---------------------------------------------------------------------------
// create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_returns_row_and_prepends_it_once() {
    let fx = common::logged_in();

    let before = fx.projects.rows().await;
    let created = fx
        .projects
        .create(common::create_project("Solar kiosks"))
        .await
        .unwrap();

    assert!(!before.iter().any(|p| p.id == created.id));
    let after = fx.projects.rows().await;
    assert_eq!(after.iter().filter(|p| p.id == created.id).count(), 1);
    assert_eq!(after[0].id, created.id, "new row is prepended");
}

#[tokio::test]
async fn create_stamps_created_by_from_session() {
    let fx = common::logged_in();
    let session = fx.auth.current_session().await.unwrap();

    let created = fx
        .projects
        .create(common::create_project("Attribution"))
        .await
        .unwrap();
    assert_eq!(created.created_by, session.user_id);
}

#[tokio::test]
async fn create_without_session_is_auth_required() {
    let fx = common::anonymous();

    let result = fx.projects.create(common::create_project("No session")).await;
    assert_matches!(result, Err(StoreError::AuthRequired));
    assert!(fx.projects.rows().await.is_empty());
    assert_eq!(fx.gateway.calls(), 0, "gateway must not be touched");
}

#[tokio::test]
async fn create_after_logout_is_auth_required() {
    let fx = common::logged_in();
    fx.auth.logout().await.unwrap();

    let result = fx.projects.create(common::create_project("Stale")).await;
    assert_matches!(result, Err(StoreError::AuthRequired));
}

#[tokio::test]
async fn invalid_input_is_rejected_before_any_gateway_call() {
    let fx = common::logged_in();

    let mut input = common::create_project("Out of range");
    input.sdg_goals = vec![18];

    let result = fx.projects.create(input).await;
    assert_matches!(result, Err(StoreError::Validation(_)));
    assert_eq!(fx.gateway.calls(), 0);

    let mut input = common::create_project("Negative budget");
    input.budget = -5.0;
    assert_matches!(
        fx.projects.create(input).await,
        Err(StoreError::Validation(_))
    );
    assert_eq!(fx.gateway.calls(), 0);
}

#[tokio::test]
async fn failed_create_leaves_list_untouched_and_records_error() {
    let fx = common::logged_in();
    fx.projects
        .create(common::create_project("Existing"))
        .await
        .unwrap();

    fx.gateway.fail_next("permission denied for table projects");
    let result = fx.projects.create(common::create_project("Doomed")).await;

    assert_matches!(result, Err(StoreError::Remote(GatewayError::Api { status: 500, .. })));
    assert_eq!(fx.projects.rows().await.len(), 1);
    let message = fx.projects.last_error().await.unwrap();
    assert!(message.contains("permission denied"), "{message}");
}

// ---------------------------------------------------------------------------
// fetch_all
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_all_replaces_list_and_clears_loading() {
    let fx = common::logged_in();
    fx.projects.create(common::create_project("One")).await.unwrap();
    fx.projects.create(common::create_project("Two")).await.unwrap();

    let fetched = fx.projects.fetch_all().await.unwrap();
    assert_eq!(fetched.len(), 2);
    assert!(!fx.projects.is_loading());
    assert!(fx.projects.last_error().await.is_none());
}

#[tokio::test]
async fn failed_fetch_keeps_prior_list_and_clears_loading() {
    let fx = common::logged_in();
    let created = fx
        .projects
        .create(common::create_project("Kept"))
        .await
        .unwrap();

    fx.gateway.fail_next("backend unavailable");
    let result = fx.projects.fetch_all().await;

    assert_matches!(result, Err(StoreError::Remote(_)));
    assert!(!fx.projects.is_loading(), "loading cleared on failure too");
    let rows = fx.projects.rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, created.id);
    assert!(fx.projects.last_error().await.is_some());
}

#[tokio::test]
async fn successful_fetch_clears_previous_error() {
    let fx = common::logged_in();

    fx.gateway.fail_next("transient");
    let _ = fx.projects.fetch_all().await;
    assert!(fx.projects.last_error().await.is_some());

    fx.projects.fetch_all().await.unwrap();
    assert!(fx.projects.last_error().await.is_none());
}

// ---------------------------------------------------------------------------
// update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_patches_named_fields_only() {
    let fx = common::logged_in();
    let created = fx
        .projects
        .create(common::create_project("Before"))
        .await
        .unwrap();

    let patch = UpdateProject {
        name: Some("After".into()),
        ..UpdateProject::default()
    };
    let updated = fx.projects.update(created.id, patch).await.unwrap();

    assert_eq!(updated.name, "After");
    // Fields absent from the patch are unchanged.
    assert_eq!(updated.budget, created.budget);
    assert_eq!(updated.category, created.category);
    assert_eq!(updated.sdg_goals, created.sdg_goals);

    let local = fx.projects.get_by_id(created.id).await.unwrap();
    assert_eq!(local.name, "After");
}

#[tokio::test]
async fn update_of_id_absent_locally_is_a_silent_local_noop() {
    let fx = common::logged_in();
    let created = fx
        .projects
        .create(common::create_project("Server side"))
        .await
        .unwrap();

    // A second store over the same gateway that never fetched.
    let other = common_store_over(&fx);
    let patch = UpdateProject {
        name: Some("Renamed".into()),
        ..UpdateProject::default()
    };
    let updated = other.update(created.id, patch).await.unwrap();

    assert_eq!(updated.name, "Renamed", "server row was updated");
    assert!(other.rows().await.is_empty(), "local list untouched");
}

/// A project store sharing `fx`'s gateway and auth but with its own list.
fn common_store_over(
    fx: &common::Fixture,
) -> impact_store::EntityStore<impact_core::models::Project> {
    impact_store::EntityStore::new(fx.gateway.clone(), fx.auth.clone())
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_row_after_server_confirms() {
    let fx = common::logged_in();
    let created = fx
        .projects
        .create(common::create_project("Doomed"))
        .await
        .unwrap();

    fx.projects.delete(created.id).await.unwrap();
    assert!(fx.projects.get_by_id(created.id).await.is_none());
}

#[tokio::test]
async fn failed_delete_keeps_row() {
    let fx = common::logged_in();
    let created = fx
        .projects
        .create(common::create_project("Survivor"))
        .await
        .unwrap();

    fx.gateway.fail_next("permission denied");
    assert_matches!(
        fx.projects.delete(created.id).await,
        Err(StoreError::Remote(_))
    );
    assert!(fx.projects.get_by_id(created.id).await.is_some());
}

// ---------------------------------------------------------------------------
// local lookups
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lookups_on_empty_store_return_empty() {
    let fx = common::logged_in();

    assert!(fx.projects.get_by_id(RowId::new_v4()).await.is_none());
    assert!(fx.indicators.get_by_parent(RowId::new_v4()).await.is_empty());
    assert_eq!(fx.gateway.calls(), 0, "lookups never touch the network");
}

#[tokio::test]
async fn get_by_parent_filters_by_parent_id() {
    let fx = common::logged_in();
    let project = fx
        .projects
        .create(common::create_project("Parent"))
        .await
        .unwrap();

    let mut attached = common::create_indicator("attached", 0.0, 0.0, 10.0);
    attached.project_id = Some(project.id);
    fx.indicators.create(attached).await.unwrap();
    fx.indicators
        .create(common::create_indicator("loose", 0.0, 0.0, 10.0))
        .await
        .unwrap();

    let children = fx.indicators.get_by_parent(project.id).await;
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "attached");
}

// ---------------------------------------------------------------------------
// fetch_by_parent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_by_parent_scopes_to_the_parent_column() {
    let fx = common::logged_in();
    let project = fx
        .projects
        .create(common::create_project("Scoped"))
        .await
        .unwrap();

    let mut attached = common::create_indicator("attached", 0.0, 0.0, 10.0);
    attached.project_id = Some(project.id);
    fx.indicators.create(attached).await.unwrap();
    fx.indicators
        .create(common::create_indicator("loose", 0.0, 0.0, 10.0))
        .await
        .unwrap();

    let fetched = fx.indicators.fetch_by_parent(project.id).await.unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].name, "attached");
}

#[tokio::test]
async fn fetch_by_parent_on_root_entity_fails_without_gateway_call() {
    let fx = common::logged_in();

    let result = fx.projects.fetch_by_parent(RowId::new_v4()).await;
    assert_matches!(result, Err(StoreError::Internal(_)));
    assert_eq!(fx.gateway.calls(), 0);
}

#[tokio::test]
async fn require_reports_not_found() {
    let fx = common::logged_in();
    let missing = RowId::new_v4();
    assert_matches!(
        fx.projects.require(missing).await,
        Err(StoreError::NotFound { entity: "Project", .. })
    );
}
