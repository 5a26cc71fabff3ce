//! JSON REST API for the Parish site backend.
//!
//! Exposes an axum [`Router`] backed by any [`parish_core::store::SiteStore`].
//! TLS and transport concerns are the caller's responsibility. No endpoint
//! enforces authentication; the `/admin/login` credential check is a demo
//! stand-in, not a security boundary.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", parish_api::router(state))
//! ```

pub mod admin;
pub mod data;
pub mod error;
pub mod forms;
pub mod registrations;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use parish_core::store::SiteStore;

pub use admin::{AdminAccount, AdminDirectory};
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
#[derive(Clone)]
pub struct AppState<S: SiteStore> {
  pub store: Arc<S>,
  pub admin: Arc<AdminDirectory>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SiteStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Form submissions
    .route("/forms", get(forms::list::<S>).post(forms::submit::<S>))
    .route(
      "/forms/{id}",
      get(forms::get_one::<S>)
        .patch(forms::set_status::<S>)
        .delete(forms::delete_one::<S>),
    )
    // Registrations
    .route(
      "/registrations",
      get(registrations::list::<S>).post(registrations::register::<S>),
    )
    .route(
      "/registrations/{id}",
      get(registrations::get_one::<S>)
        .patch(registrations::update_one::<S>)
        .delete(registrations::delete_one::<S>),
    )
    // Named records — static segments win over the {key} capture.
    .route("/data/clear", post(data::clear::<S>))
    .route("/data/export", get(data::export::<S>))
    .route("/data/import", post(data::import::<S>))
    .route(
      "/data/{key}",
      get(data::load::<S>).post(data::save::<S>).delete(data::delete::<S>),
    )
    // Admin demo login
    .route("/admin/login", post(admin::login::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use parish_store_sqlite::SqliteStore;
  use rand_core::OsRng;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(b"demo-password", &salt)
      .unwrap()
      .to_string();

    AppState {
      store: Arc::new(store),
      admin: Arc::new(AdminDirectory::new(vec![AdminAccount {
        email:         "admin@parish.example".to_string(),
        name:          "Admin".to_string(),
        password_hash: hash,
      }])),
    }
  }

  async fn request(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let req = builder.body(body).unwrap();
    let resp = router(state).oneshot(req).await.unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  fn contact_body() -> Value {
    json!({
      "formName": "contact",
      "formType": "inquiry",
      "email": "visitor@example.com",
      "name": "A Visitor",
      "data": { "message": "hello", "attending": true },
    })
  }

  fn register_body(email: &str) -> Value {
    json!({
      "name": "Alice Liddell",
      "email": email,
      "password": "wonderland1865",
      "confirmPassword": "wonderland1865",
    })
  }

  // ── Forms ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn submit_returns_201_and_is_listable() {
    let state = make_state().await;

    let (status, body) =
      request(state.clone(), "POST", "/forms", Some(contact_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    let id = body["submissionId"].as_str().unwrap().to_string();

    let (status, body) = request(state, "GET", "/forms", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["limit"], json!(50));
    assert_eq!(body["offset"], json!(0));
    assert_eq!(body["submissions"][0]["id"], json!(id));
    assert_eq!(body["submissions"][0]["status"], json!("new"));
  }

  #[tokio::test]
  async fn submit_missing_form_name_is_rejected_before_any_write() {
    let state = make_state().await;

    let (status, body) = request(
      state.clone(),
      "POST",
      "/forms",
      Some(json!({ "formType": "x", "data": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("formName"));

    let (_, body) = request(state, "GET", "/forms", None).await;
    assert_eq!(body["count"], json!(0));
  }

  #[tokio::test]
  async fn submit_accepts_json_encoded_data_string() {
    let state = make_state().await;

    let (status, body) = request(
      state.clone(),
      "POST",
      "/forms",
      Some(json!({
        "formName": "volunteer",
        "formType": "signup",
        "data": "{\"role\":\"usher\",\"hours\":3}",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["submissionId"].as_str().unwrap().to_string();

    let (status, body) =
      request(state, "GET", &format!("/forms/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["submission"]["data"]["role"], json!("usher"));
    let responses = body["fieldResponses"].as_array().unwrap();
    assert_eq!(responses.len(), 2);

    let (status, _) = request(
      make_state().await,
      "POST",
      "/forms",
      Some(json!({ "formName": "x", "formType": "y", "data": "not json" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn list_filters_by_form_name() {
    let state = make_state().await;
    request(state.clone(), "POST", "/forms", Some(contact_body())).await;

    let mut volunteer = contact_body();
    volunteer["formName"] = json!("volunteer");
    request(state.clone(), "POST", "/forms", Some(volunteer)).await;

    let (_, body) =
      request(state.clone(), "GET", "/forms?formName=contact", None).await;
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["submissions"][0]["form_name"], json!("contact"));

    let (_, body) =
      request(state, "GET", "/forms?formName=contact&status=archived", None)
        .await;
    assert_eq!(body["count"], json!(0));
  }

  #[tokio::test]
  async fn patch_status_then_delete() {
    let state = make_state().await;
    let (_, body) =
      request(state.clone(), "POST", "/forms", Some(contact_body())).await;
    let id = body["submissionId"].as_str().unwrap().to_string();

    let (status, body) = request(
      state.clone(),
      "PATCH",
      &format!("/forms/{id}"),
      Some(json!({ "status": "reviewed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["submission"]["status"], json!("reviewed"));

    let (status, _) = request(
      state.clone(),
      "PATCH",
      &format!("/forms/{id}"),
      Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
      request(state.clone(), "DELETE", &format!("/forms/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
      request(state, "GET", &format!("/forms/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Registrations ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_creates_account_without_leaking_hash() {
    let state = make_state().await;

    let (status, body) = request(
      state.clone(),
      "POST",
      "/registrations",
      Some(register_body("Alice@Example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], json!("alice@example.com"));
    assert_eq!(body["user"]["status"], json!("active"));
    assert!(body["userId"].is_string());

    // No password material anywhere in the response.
    let raw = body.to_string();
    assert!(!raw.contains("password"), "response leaks: {raw}");

    // Nor in the admin list or single-record views.
    let (_, list) = request(state.clone(), "GET", "/registrations", None).await;
    assert_eq!(list["count"], json!(1));
    assert!(!list.to_string().contains("password"));

    let id = body["userId"].as_str().unwrap().to_string();
    let (_, one) =
      request(state, "GET", &format!("/registrations/{id}"), None).await;
    assert!(!one.to_string().contains("password"));
  }

  #[tokio::test]
  async fn register_validates_input() {
    let state = make_state().await;

    let cases = vec![
      json!({ "email": "a@b.com", "password": "longenough1" }),
      json!({ "name": "A", "email": "not-an-email", "password": "longenough1", "confirmPassword": "longenough1" }),
      json!({ "name": "A", "email": "a@b.com", "password": "short", "confirmPassword": "short" }),
      json!({ "name": "A", "email": "a@b.com", "password": "longenough1", "confirmPassword": "different11" }),
    ];

    for case in cases {
      let (status, _) =
        request(state.clone(), "POST", "/registrations", Some(case.clone()))
          .await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "case: {case}");
    }

    let (_, list) = request(state, "GET", "/registrations", None).await;
    assert_eq!(list["count"], json!(0));
  }

  #[tokio::test]
  async fn register_duplicate_email_conflicts() {
    let state = make_state().await;

    let (status, _) = request(
      state.clone(),
      "POST",
      "/registrations",
      Some(register_body("alice@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Same address, different case — still a conflict.
    let (status, body) = request(
      state.clone(),
      "POST",
      "/registrations",
      Some(register_body("ALICE@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("Email already registered"));

    let (_, list) = request(state, "GET", "/registrations", None).await;
    assert_eq!(list["count"], json!(1));
  }

  #[tokio::test]
  async fn update_registration_via_patch() {
    let state = make_state().await;
    let (_, body) = request(
      state.clone(),
      "POST",
      "/registrations",
      Some(register_body("bob@example.com")),
    )
    .await;
    let id = body["userId"].as_str().unwrap().to_string();

    let (status, body) = request(
      state,
      "PATCH",
      &format!("/registrations/{id}"),
      Some(json!({ "city": "Lagos", "email_verified": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["registration"]["city"], json!("Lagos"));
    assert_eq!(body["registration"]["email_verified"], json!(true));
    assert!(body["registration"]["email_verified_at"].is_string());
  }

  // ── Named records ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn data_save_load_delete_roundtrip() {
    let state = make_state().await;
    let value = json!({ "hero": { "title": "Welcome" }, "order": [1, 2, 3] });

    let (status, _) = request(
      state.clone(),
      "POST",
      "/data/homepage-content",
      Some(value.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
      request(state.clone(), "GET", "/data/homepage-content", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, value);

    let (status, _) =
      request(state.clone(), "DELETE", "/data/homepage-content", None).await;
    assert_eq!(status, StatusCode::OK);
    // Idempotent: deleting again still succeeds.
    let (status, _) =
      request(state.clone(), "DELETE", "/data/homepage-content", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
      request(state, "GET", "/data/homepage-content", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn data_export_import_and_clear() {
    let state = make_state().await;
    request(state.clone(), "POST", "/data/a", Some(json!({ "n": 1 }))).await;
    request(state.clone(), "POST", "/data/b", Some(json!([true, false]))).await;

    let (status, exported) =
      request(state.clone(), "GET", "/data/export", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exported["a"], json!({ "n": 1 }));
    assert_eq!(exported["b"], json!([true, false]));

    let (status, _) =
      request(state.clone(), "POST", "/data/clear", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, empty) = request(state.clone(), "GET", "/data/export", None).await;
    assert_eq!(empty, json!({}));

    let (status, _) =
      request(state.clone(), "POST", "/data/import", Some(exported.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, restored) = request(state, "GET", "/data/export", None).await;
    assert_eq!(restored, exported);
  }

  // ── Admin login ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_login_accepts_configured_credentials() {
    let state = make_state().await;

    let (status, body) = request(
      state.clone(),
      "POST",
      "/admin/login",
      Some(json!({ "email": "admin@parish.example", "password": "demo-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["admin"]["role"], json!("admin"));

    let (status, _) = request(
      state.clone(),
      "POST",
      "/admin/login",
      Some(json!({ "email": "admin@parish.example", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(
      state,
      "POST",
      "/admin/login",
      Some(json!({ "email": "admin@parish.example" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }
}
