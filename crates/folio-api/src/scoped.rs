//! Handlers for `/scoped-resumes` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/scoped-resumes` | Ordered by name |
//! | `POST`   | `/scoped-resumes` | Body: `{"name":..,"summary"?:..,"skill_ids"?:[..],"work_experience_ids"?:[..]}` |
//! | `GET`    | `/scoped-resumes/:id` | The effective (resolved) resume |
//! | `PUT`    | `/scoped-resumes/:id` | Rename; body: `{"name":..}` |
//! | `DELETE` | `/scoped-resumes/:id` | Deletes the whole overlay |
//! | `POST`   | `/scoped-resumes/:id/duplicate` | Body: `{"name":..}` |
//! | `PUT`    | `/scoped-resumes/:id/summary` | Body: `{"text":..}` |
//! | `DELETE` | `/scoped-resumes/:id/summary` | |
//! | `POST`   | `/scoped-resumes/:id/skills/:skill_id` | |
//! | `DELETE` | `/scoped-resumes/:id/skills/:skill_id` | |
//! | `POST`   | `/scoped-resumes/:id/work-experiences/:we_id` | |
//! | `DELETE` | `/scoped-resumes/:id/work-experiences/:we_id` | Also drops that work experience's line overrides |
//! | `PUT`    | `/scoped-resumes/:id/lines/:line_id` | Body: `{"text":..}` |
//! | `DELETE` | `/scoped-resumes/:id/lines/:line_id` | |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use folio_core::{
  effective::EffectiveResume,
  scoped::{LineOverride, ScopedResume, ScopedResumeSetup, SummaryOverride},
  store::ScopedResumeStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Json, Path},
};

#[derive(Debug, Deserialize)]
pub struct NameBody {
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
  pub text: String,
}

// ─── Scoped resumes ──────────────────────────────────────────────────────────

/// `GET /scoped-resumes`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<ScopedResume>>, ApiError>
where
  S: ScopedResumeStore,
{
  let resumes = store.list_scoped_resumes().await.map_err(ApiError::from_store)?;
  Ok(Json(resumes))
}

/// `POST /scoped-resumes`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(setup): Json<ScopedResumeSetup>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScopedResumeStore,
{
  let resume = if setup.is_bare() {
    store.create_scoped_resume(setup.name).await
  } else {
    store.create_scoped_resume_with_setup(setup).await
  }
  .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(resume)))
}

/// `GET /scoped-resumes/:id`
pub async fn resolve<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<EffectiveResume>, ApiError>
where
  S: ScopedResumeStore,
{
  let resume = store
    .resolve(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("scoped resume {id} not found")))?;
  Ok(Json(resume))
}

/// `PUT /scoped-resumes/:id`
pub async fn rename<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NameBody>,
) -> Result<Json<ScopedResume>, ApiError>
where
  S: ScopedResumeStore,
{
  let resume = store
    .rename_scoped_resume(id, body.name)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(resume))
}

/// `DELETE /scoped-resumes/:id`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ScopedResumeStore,
{
  store.delete_scoped_resume(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /scoped-resumes/:id/duplicate`
pub async fn duplicate<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NameBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScopedResumeStore,
{
  let copy = store
    .duplicate_scoped_resume(id, body.name)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(copy)))
}

// ─── Summary override ────────────────────────────────────────────────────────

/// `PUT /scoped-resumes/:id/summary`
pub async fn set_summary<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<TextBody>,
) -> Result<Json<SummaryOverride>, ApiError>
where
  S: ScopedResumeStore,
{
  let row = store
    .set_summary_override(id, body.text)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(row))
}

/// `DELETE /scoped-resumes/:id/summary`
pub async fn clear_summary<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ScopedResumeStore,
{
  store.clear_summary_override(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Inclusions ──────────────────────────────────────────────────────────────

/// `POST /scoped-resumes/:id/skills/:skill_id`
pub async fn include_skill<S>(
  State(store): State<Arc<S>>,
  Path((id, skill_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScopedResumeStore,
{
  let inclusion = store
    .add_skill_inclusion(id, skill_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(inclusion)))
}

/// `DELETE /scoped-resumes/:id/skills/:skill_id`
pub async fn exclude_skill<S>(
  State(store): State<Arc<S>>,
  Path((id, skill_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: ScopedResumeStore,
{
  store
    .remove_skill_inclusion(id, skill_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /scoped-resumes/:id/work-experiences/:we_id`
pub async fn include_work_experience<S>(
  State(store): State<Arc<S>>,
  Path((id, we_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScopedResumeStore,
{
  let inclusion = store
    .add_work_experience_inclusion(id, we_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(inclusion)))
}

/// `DELETE /scoped-resumes/:id/work-experiences/:we_id`
pub async fn exclude_work_experience<S>(
  State(store): State<Arc<S>>,
  Path((id, we_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: ScopedResumeStore,
{
  store
    .remove_work_experience_inclusion(id, we_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Line overrides ──────────────────────────────────────────────────────────

/// `PUT /scoped-resumes/:id/lines/:line_id`
pub async fn set_line<S>(
  State(store): State<Arc<S>>,
  Path((id, line_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<TextBody>,
) -> Result<Json<LineOverride>, ApiError>
where
  S: ScopedResumeStore,
{
  let row = store
    .set_line_override(id, line_id, body.text)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(row))
}

/// `DELETE /scoped-resumes/:id/lines/:line_id`
pub async fn clear_line<S>(
  State(store): State<Arc<S>>,
  Path((id, line_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: ScopedResumeStore,
{
  store
    .clear_line_override(id, line_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
