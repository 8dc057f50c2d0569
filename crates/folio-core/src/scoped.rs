//! Scoped resumes and their overlay rows.
//!
//! A scoped resume owns four kinds of overlay row. Inclusion rows opt a base
//! skill or work experience into the variant; override rows replace the text
//! of the base summary or of a single work-experience line. Presence of an
//! override row *is* the "customized" flag; there is no separate boolean.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Root ────────────────────────────────────────────────────────────────────

/// The root of an overlay. `name` is unique across all scoped resumes
/// (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedResume {
  pub scoped_resume_id: Uuid,
  pub name:             String,
  pub created_at:       DateTime<Utc>,
  /// Bumped by every successful mutation of the overlay.
  pub updated_at:       DateTime<Utc>,
}

// ─── Overlay rows ────────────────────────────────────────────────────────────

/// Replacement text for the base summary. At most one per scoped resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryOverride {
  pub override_id:      Uuid,
  pub scoped_resume_id: Uuid,
  pub text:             String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillInclusion {
  pub inclusion_id:     Uuid,
  pub scoped_resume_id: Uuid,
  pub skill_id:         Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkExperienceInclusion {
  pub inclusion_id:       Uuid,
  pub scoped_resume_id:   Uuid,
  pub work_experience_id: Uuid,
}

/// Replacement text for one work-experience line within one scoped resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineOverride {
  pub override_id:      Uuid,
  pub scoped_resume_id: Uuid,
  pub line_id:          Uuid,
  pub text:             String,
}

// ─── Bulk creation ───────────────────────────────────────────────────────────

/// Input to [`crate::store::ScopedResumeStore::create_scoped_resume_with_setup`].
///
/// Every id must exist in the base store or the whole creation is refused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopedResumeSetup {
  pub name:                String,
  /// Initial summary override; `None` inherits the base summary.
  pub summary:             Option<String>,
  #[serde(default)]
  pub skill_ids:           Vec<Uuid>,
  #[serde(default)]
  pub work_experience_ids: Vec<Uuid>,
}

impl ScopedResumeSetup {
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Default::default() }
  }

  /// `true` when the setup carries nothing beyond a name.
  pub fn is_bare(&self) -> bool {
    self.summary.is_none()
      && self.skill_ids.is_empty()
      && self.work_experience_ids.is_empty()
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Normalise a scoped-resume name: surrounding whitespace is dropped and the
/// result must be non-empty.
pub fn normalize_name(name: &str) -> Result<String> {
  let trimmed = name.trim();
  if trimmed.is_empty() {
    return Err(Error::Validation("scoped resume name must not be blank".into()));
  }
  Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_name_trims() {
    assert_eq!(normalize_name("  Frontend Role ").unwrap(), "Frontend Role");
  }

  #[test]
  fn normalize_name_rejects_blank() {
    assert!(matches!(normalize_name(""), Err(Error::Validation(_))));
    assert!(matches!(normalize_name(" \t\n"), Err(Error::Validation(_))));
  }

  #[test]
  fn normalize_name_keeps_case() {
    assert_eq!(normalize_name("frontend role").unwrap(), "frontend role");
  }

  #[test]
  fn setup_is_bare_only_with_name() {
    assert!(ScopedResumeSetup::named("FE").is_bare());

    let mut setup = ScopedResumeSetup::named("FE");
    setup.summary = Some("hi".into());
    assert!(!setup.is_bare());
  }

  #[test]
  fn setup_id_lists_default_when_absent() {
    let setup: ScopedResumeSetup =
      serde_json::from_str(r#"{"name":"FE","summary":null}"#).unwrap();
    assert!(setup.skill_ids.is_empty());
    assert!(setup.work_experience_ids.is_empty());
  }
}
