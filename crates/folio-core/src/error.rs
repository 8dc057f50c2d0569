//! Error types for `folio-core`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The kind of record an error or warning refers to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
  #[strum(serialize = "scoped resume")]
  ScopedResume,
  #[strum(serialize = "skill")]
  Skill,
  #[strum(serialize = "skill category")]
  SkillCategory,
  #[strum(serialize = "skill subcategory")]
  SkillSubcategory,
  #[strum(serialize = "work experience")]
  WorkExperience,
  #[strum(serialize = "work experience line")]
  WorkExperienceLine,
  #[strum(serialize = "skill inclusion")]
  SkillInclusion,
  #[strum(serialize = "work experience inclusion")]
  WorkExperienceInclusion,
  #[strum(serialize = "line override")]
  LineOverride,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{entity} not found: {id}")]
  NotFound { entity: EntityKind, id: Uuid },

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("invalid input: {0}")]
  Validation(String),

  /// An overlay row references a base record that no longer exists.
  #[error("integrity violation: {0}")]
  IntegrityViolation(String),
}

impl Error {
  pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
    Self::NotFound { entity, id }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Implemented by storage backend errors so that upper layers (HTTP, CLI) can
/// recover the domain-level [`Error`] without knowing the backend.
///
/// Backend-specific failures (I/O, SQL, decoding) return `None`.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn core(&self) -> Option<&Error>;
}

impl StoreError for Error {
  fn core(&self) -> Option<&Error> { Some(self) }
}
