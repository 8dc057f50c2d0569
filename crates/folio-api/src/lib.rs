//! JSON REST API for Folio's scoped resumes.
//!
//! Exposes an axum [`Router`] backed by any
//! [`folio_core::store::ScopedResumeStore`]. Base-record management, auth and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", folio_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod extract;
pub mod scoped;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use folio_core::store::ScopedResumeStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ScopedResumeStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/scoped-resumes", get(scoped::list::<S>).post(scoped::create::<S>))
    .route(
      "/scoped-resumes/{id}",
      get(scoped::resolve::<S>)
        .put(scoped::rename::<S>)
        .delete(scoped::delete::<S>),
    )
    .route("/scoped-resumes/{id}/duplicate", post(scoped::duplicate::<S>))
    .route(
      "/scoped-resumes/{id}/summary",
      put(scoped::set_summary::<S>).delete(scoped::clear_summary::<S>),
    )
    .route(
      "/scoped-resumes/{id}/skills/{skill_id}",
      post(scoped::include_skill::<S>).delete(scoped::exclude_skill::<S>),
    )
    .route(
      "/scoped-resumes/{id}/work-experiences/{we_id}",
      post(scoped::include_work_experience::<S>).delete(scoped::exclude_work_experience::<S>),
    )
    .route(
      "/scoped-resumes/{id}/lines/{line_id}",
      put(scoped::set_line::<S>).delete(scoped::clear_line::<S>),
    )
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::NaiveDate;
  use folio_core::{
    base::{NewSkill, NewWorkExperience},
    store::ResumeStore,
  };
  use folio_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  async fn make_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().await.unwrap())
  }

  async fn send(
    store:  &Arc<SqliteStore>,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(body) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    let resp = api_router(store.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  async fn seed_skill(store: &SqliteStore, name: &str) -> Uuid {
    let category = store.add_category(format!("{name} category")).await.unwrap();
    let subcategory = store.add_subcategory(format!("{name} subcategory")).await.unwrap();
    store
      .add_skill(NewSkill {
        name:           name.into(),
        category_id:    category.category_id,
        subcategory_id: subcategory.subcategory_id,
      })
      .await
      .unwrap()
      .skill_id
  }

  async fn seed_job(store: &SqliteStore, lines: &[&str]) -> (Uuid, Vec<Uuid>) {
    let we = store
      .add_work_experience(NewWorkExperience {
        company_name: "Acme".into(),
        job_title:    "Engineer".into(),
        city:         "Portland".into(),
        state:        "OR".into(),
        date_started: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
        date_ended:   None,
      })
      .await
      .unwrap();
    let mut line_ids = Vec::new();
    for text in lines {
      let line = store.add_line(we.work_experience_id, (*text).into()).await.unwrap();
      line_ids.push(line.line_id);
    }
    (we.work_experience_id, line_ids)
  }

  async fn create(store: &Arc<SqliteStore>, name: &str) -> String {
    let (status, body) =
      send(store, "POST", "/scoped-resumes", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["scoped_resume_id"].as_str().unwrap().to_owned()
  }

  // ── Lifecycle ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_list_and_resolve() {
    let store = make_store().await;
    store.set_summary("Base summary".into()).await.unwrap();
    let id = create(&store, "Frontend Role").await;

    let (status, body) = send(&store, "GET", "/scoped-resumes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Frontend Role");

    let (status, body) = send(&store, "GET", &format!("/scoped-resumes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["text"], "Base summary");
    assert_eq!(body["summary"]["is_customized"], false);
    assert_eq!(body["skills"], json!([]));
    assert_eq!(body["warnings"], json!([]));
  }

  #[tokio::test]
  async fn create_with_setup_body() {
    let store = make_store().await;
    let react = seed_skill(&store, "React").await;
    let (we, _) = seed_job(&store, &["Led the team"]).await;

    let (status, body) = send(
      &store,
      "POST",
      "/scoped-resumes",
      Some(json!({
        "name": "FE",
        "summary": "Frontend focus",
        "skill_ids": [react],
        "work_experience_ids": [we],
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["scoped_resume_id"].as_str().unwrap().to_owned();

    let (_, view) = send(&store, "GET", &format!("/scoped-resumes/{id}"), None).await;
    assert_eq!(view["summary"]["text"], "Frontend focus");
    assert_eq!(view["summary"]["is_customized"], true);
    assert_eq!(view["skills"][0]["status"], "included");
    assert_eq!(view["skills"][0]["name"], "React");
    assert_eq!(view["work_experiences"][0]["company_name"], "Acme");
    assert_eq!(view["work_experiences"][0]["lines"][0]["text"], "Led the team");
  }

  #[tokio::test]
  async fn create_with_unknown_skill_is_404_and_writes_nothing() {
    let store = make_store().await;
    let (status, body) = send(
      &store,
      "POST",
      "/scoped-resumes",
      Some(json!({ "name": "FE", "skill_ids": [Uuid::new_v4()] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("skill not found"));

    let (_, list) = send(&store, "GET", "/scoped-resumes", None).await;
    assert_eq!(list, json!([]));
  }

  #[tokio::test]
  async fn duplicate_name_is_409() {
    let store = make_store().await;
    create(&store, "Frontend Role").await;
    let other = create(&store, "Backend Role").await;

    let (status, _) =
      send(&store, "POST", "/scoped-resumes", Some(json!({ "name": "Frontend Role" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
      &store,
      "PUT",
      &format!("/scoped-resumes/{other}"),
      Some(json!({ "name": "Frontend Role" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn blank_name_is_400() {
    let store = make_store().await;
    let (status, _) =
      send(&store, "POST", "/scoped-resumes", Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn malformed_id_is_400_with_json_body() {
    let store = make_store().await;
    let (status, body) = send(&store, "GET", "/scoped-resumes/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(
      &store,
      "DELETE",
      &format!("/scoped-resumes/{}/skills/nope", Uuid::new_v4()),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn malformed_body_has_json_error() {
    let store = make_store().await;
    let req = Request::builder()
      .method("POST")
      .uri("/scoped-resumes")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from("{\"name\":"))
      .unwrap();
    let resp = api_router(store.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());

    // Well-formed JSON missing a required field.
    let (status, body) =
      send(&store, "POST", "/scoped-resumes", Some(json!({ "title": "FE" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn unknown_id_is_404() {
    let store = make_store().await;
    let ghost = Uuid::new_v4();
    let (status, body) = send(&store, "GET", &format!("/scoped-resumes/{ghost}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&ghost.to_string()));

    let (status, _) = send(&store, "DELETE", &format!("/scoped-resumes/{ghost}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn rename_duplicate_and_delete() {
    let store = make_store().await;
    let id = create(&store, "FE").await;

    let (status, body) = send(
      &store,
      "PUT",
      &format!("/scoped-resumes/{id}"),
      Some(json!({ "name": "Frontend" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Frontend");

    let (status, copy) = send(
      &store,
      "POST",
      &format!("/scoped-resumes/{id}/duplicate"),
      Some(json!({ "name": "Frontend (copy)" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(copy["scoped_resume_id"].as_str().unwrap(), id);

    let (status, body) = send(&store, "DELETE", &format!("/scoped-resumes/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (_, list) = send(&store, "GET", "/scoped-resumes", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Frontend (copy)");
  }

  // ── Overlay rows ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn summary_override_round_trip() {
    let store = make_store().await;
    store.set_summary("Base summary".into()).await.unwrap();
    let id = create(&store, "FE").await;
    let uri = format!("/scoped-resumes/{id}/summary");

    let (status, row) = send(&store, "PUT", &uri, Some(json!({ "text": "Custom" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row["text"], "Custom");

    let (status, _) = send(&store, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    // Clearing again is still a success.
    let (status, _) = send(&store, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, view) = send(&store, "GET", &format!("/scoped-resumes/{id}"), None).await;
    assert_eq!(view["summary"]["text"], "Base summary");
    assert_eq!(view["summary"]["is_customized"], false);
  }

  #[tokio::test]
  async fn skill_inclusion_and_guard() {
    let store = make_store().await;
    let react = seed_skill(&store, "React").await;
    let id = create(&store, "FE").await;
    let uri = format!("/scoped-resumes/{id}/skills/{react}");

    let (status, inclusion) = send(&store, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(inclusion["skill_id"], react.to_string());

    let (status, _) = send(&store, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The base skill is pinned by the inclusion.
    assert!(store.delete_skill(react).await.is_err());

    let (status, _) = send(&store, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&store, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    store.delete_skill(react).await.unwrap();
  }

  #[tokio::test]
  async fn work_experience_and_line_overrides() {
    let store = make_store().await;
    let (we, lines) = seed_job(&store, &["Led the team", "Cut costs"]).await;
    let id = create(&store, "FE").await;

    let (status, _) =
      send(&store, "POST", &format!("/scoped-resumes/{id}/work-experiences/{we}"), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let line_uri = format!("/scoped-resumes/{id}/lines/{}", lines[1]);
    let (status, row) =
      send(&store, "PUT", &line_uri, Some(json!({ "text": "Cut costs by 30%" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row["line_id"], lines[1].to_string());

    let (_, view) = send(&store, "GET", &format!("/scoped-resumes/{id}"), None).await;
    let view_lines = &view["work_experiences"][0]["lines"];
    assert_eq!(view_lines[0]["is_customized"], false);
    assert_eq!(view_lines[1]["text"], "Cut costs by 30%");
    assert_eq!(view_lines[1]["is_customized"], true);

    let (status, _) =
      send(&store, "DELETE", &format!("/scoped-resumes/{id}/work-experiences/{we}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The override went with the inclusion, so the line is deletable again.
    store.delete_line(lines[1]).await.unwrap();
  }

  #[tokio::test]
  async fn line_override_on_unknown_line_is_404() {
    let store = make_store().await;
    let id = create(&store, "FE").await;
    let (status, _) = send(
      &store,
      "PUT",
      &format!("/scoped-resumes/{id}/lines/{}", Uuid::new_v4()),
      Some(json!({ "text": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
