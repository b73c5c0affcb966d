//! Back-office role management: guards, the modal and list invalidation.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use app_shop_core::notification::messages;
use app_shop_integration_tests::{FakeBackend, PASSWORD, STAFF, TestClient, VIEWER, admin};
use axum::http::StatusCode;

async fn signed_in(backend: &FakeBackend, email: &str) -> TestClient {
    let mut client = TestClient::new(admin(backend));
    let response = client.login(email, PASSWORD).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/dashboard"));
    client
}

#[tokio::test]
async fn test_role_list_requires_sign_in() {
    let backend = FakeBackend::start().await;
    let mut client = TestClient::new(admin(&backend));

    let response = client.get("/system/role?page=2").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(
        response.location(),
        Some("/login?returnUrl=%2Fsystem%2Frole%3Fpage%3D2")
    );
}

#[tokio::test]
async fn test_htmx_guard_uses_hx_redirect() {
    let backend = FakeBackend::start().await;
    let mut client = TestClient::new(admin(&backend));

    let response = client.htmx_get("/system/role/new").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header("hx-redirect"),
        Some("/login?returnUrl=%2Fsystem%2Frole%2Fnew")
    );
}

#[tokio::test]
async fn test_viewer_is_forbidden_from_roles() {
    let backend = FakeBackend::start().await;
    let mut client = signed_in(&backend, VIEWER).await;

    let dashboard = client.get("/dashboard").await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert!(!dashboard.body.contains("href=\"/system/role\""));

    let response = client.get("/system/role").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(backend.recorded().role_list_calls, 0);
}

#[tokio::test]
async fn test_signed_in_staff_skip_login_page() {
    let backend = FakeBackend::start().await;
    let mut client = signed_in(&backend, STAFF).await;

    let response = client.get("/login").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/dashboard"));
}

#[tokio::test]
async fn test_role_list_is_served_from_cache() {
    let backend = FakeBackend::start().await;
    let mut client = signed_in(&backend, STAFF).await;

    let first = client.get("/system/role").await;
    let second = client.get("/system/role").await;

    assert_eq!(first.status, StatusCode::OK);
    assert!(first.body.contains("ADMIN.GRANTED"));
    assert!(second.body.contains("ADMIN.GRANTED"));
    assert_eq!(backend.recorded().role_list_calls, 1);
}

#[tokio::test]
async fn test_create_role_invalidates_list() {
    let backend = FakeBackend::start().await;
    let mut client = signed_in(&backend, STAFF).await;

    client.get("/system/role").await;
    assert_eq!(backend.recorded().role_list_calls, 1);

    let response = client
        .htmx_post_form("/system/role", &[("name", "Support")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("hx-redirect"), Some("/system/role"));

    let created = backend.recorded().roles.last().cloned().unwrap();
    assert_eq!(created["name"], "Support");
    assert_eq!(created["permissions"], serde_json::json!(["DASHBOARD"]));

    let list = client.get("/system/role").await;
    assert_eq!(backend.recorded().role_list_calls, 2);
    assert!(list.body.contains("Support"));
    assert!(list.body.contains(messages::CREATE_ROLE_SUCCESS));
}

#[tokio::test]
async fn test_plain_form_create_redirects() {
    let backend = FakeBackend::start().await;
    let mut client = signed_in(&backend, STAFF).await;

    let response = client
        .post_form("/system/role", &[("name", "Support")])
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/system/role"));
}

#[tokio::test]
async fn test_blank_name_never_reaches_backend() {
    let backend = FakeBackend::start().await;
    let mut client = signed_in(&backend, STAFF).await;

    let response = client
        .htmx_post_form("/system/role", &[("name", "   ")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<form"));
    assert!(response.body.contains("field-error"));
    assert!(response.header("hx-redirect").is_none());
    assert_eq!(backend.recorded().roles.len(), 1);
}

#[tokio::test]
async fn test_backend_rejection_keeps_entered_name() {
    let backend = FakeBackend::start().await;
    let mut client = signed_in(&backend, STAFF).await;

    let response = client
        .htmx_post_form("/system/role", &[("name", "admin")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<form"));
    assert!(response.body.contains("value=\"admin\""));
    assert!(response.body.contains("Role name already exists"));
    assert_eq!(backend.recorded().roles.len(), 1);
}

#[tokio::test]
async fn test_edit_prefills_and_renames() {
    let backend = FakeBackend::start().await;
    let mut client = signed_in(&backend, STAFF).await;

    let modal = client.htmx_get("/system/role/r1/edit").await;
    assert_eq!(modal.status, StatusCode::OK);
    assert!(modal.body.contains("value=\"Admin\""));
    assert!(modal.body.contains("hx-post=\"/system/role/r1\""));

    let response = client
        .htmx_post_form("/system/role/r1", &[("name", "Owner")])
        .await;
    assert_eq!(response.header("hx-redirect"), Some("/system/role"));
    assert_eq!(backend.recorded().roles[0]["name"], "Owner");

    let reopened = client.htmx_get("/system/role/r1/edit").await;
    assert!(reopened.body.contains("value=\"Owner\""));
}

#[tokio::test]
async fn test_close_renders_empty_modal() {
    let backend = FakeBackend::start().await;
    let mut client = signed_in(&backend, STAFF).await;

    let response = client.htmx_get("/system/role/close").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("id=\"role-modal\""));
    assert!(!response.body.contains("<form"));
}

#[tokio::test]
async fn test_name_validation_fragment() {
    let backend = FakeBackend::start().await;
    let mut client = signed_in(&backend, STAFF).await;

    let blank = client
        .htmx_post_form("/system/role/validate", &[("name", "")])
        .await;
    let filled = client
        .htmx_post_form("/system/role/validate", &[("name", "Support")])
        .await;

    assert!(blank.body.contains("field-error"));
    assert!(!filled.body.contains("field-error"));
}

#[tokio::test]
async fn test_rejected_rename_keeps_modal_open_with_error() {
    let backend = FakeBackend::start().await;
    let mut client = signed_in(&backend, STAFF).await;
    client
        .htmx_post_form("/system/role", &[("name", "Support")])
        .await;

    let response = client
        .htmx_post_form("/system/role/r1", &[("name", "support")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header("hx-redirect").is_none());
    assert!(response.body.contains("hx-post=\"/system/role/r1\""));
    assert!(response.body.contains("value=\"support\""));
    assert!(response.body.contains("Role name already exists"));
    assert!(!response.body.contains(messages::UPDATE_ROLE_SUCCESS));
    assert_eq!(backend.recorded().roles[0]["name"], "Admin");
}

#[tokio::test]
async fn test_failed_update_falls_back_to_generic_error() {
    let backend = FakeBackend::start().await;
    backend.recorded().fail_role_updates = true;
    let mut client = signed_in(&backend, STAFF).await;

    let response = client
        .htmx_post_form("/system/role/r1", &[("name", "Owner")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header("hx-redirect").is_none());
    assert!(response.body.contains("<form"));
    assert!(response.body.contains(messages::UPDATE_ROLE_ERROR));

    let list = client.get("/system/role").await;
    assert!(!list.body.contains(messages::UPDATE_ROLE_SUCCESS));
    assert_eq!(backend.recorded().roles[0]["name"], "Admin");
}
