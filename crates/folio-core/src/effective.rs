//! The effective (resolved) view of a scoped resume.
//!
//! Computed on every read by merging the overlay with the current base
//! records. Never stored or cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EntityKind, base::WorkExperience};

// ─── Warnings ────────────────────────────────────────────────────────────────

/// An overlay row that points at a base record which no longer exists.
///
/// The integrity guard should make these unreachable; they surface when the
/// database has been edited out of band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityWarning {
  /// The kind of the *missing* base record.
  pub entity:  EntityKind,
  pub id:      Uuid,
  pub message: String,
}

impl IntegrityWarning {
  pub fn missing(entity: EntityKind, id: Uuid, referenced_by: &str) -> Self {
    Self {
      entity,
      id,
      message: format!("{referenced_by} references missing {entity} {id}"),
    }
  }
}

// ─── Summary ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveSummary {
  /// Override text if customized, else the base summary, else `None`.
  pub text:          Option<String>,
  pub is_customized: bool,
}

// ─── Skills ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSkill {
  pub skill_id:         Uuid,
  pub name:             String,
  pub category_id:      Uuid,
  pub category_name:    Option<String>,
  pub subcategory_id:   Uuid,
  pub subcategory_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EffectiveSkill {
  Included(ResolvedSkill),
  /// The inclusion row survives but the base skill is gone.
  Dangling {
    skill_id: Uuid,
    warning:  IntegrityWarning,
  },
}

impl EffectiveSkill {
  pub fn skill_id(&self) -> Uuid {
    match self {
      Self::Included(s) => s.skill_id,
      Self::Dangling { skill_id, .. } => *skill_id,
    }
  }

  pub fn resolved(&self) -> Option<&ResolvedSkill> {
    match self {
      Self::Included(s) => Some(s),
      Self::Dangling { .. } => None,
    }
  }
}

// ─── Work history ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveLine {
  pub line_id:       Uuid,
  pub sort_order:    i64,
  /// Override text if customized, else the base line text.
  pub text:          String,
  pub is_customized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedWorkExperience {
  #[serde(flatten)]
  pub work_experience: WorkExperience,
  /// Ordered by `sort_order`.
  pub lines:           Vec<EffectiveLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EffectiveWorkExperience {
  Included(ResolvedWorkExperience),
  Dangling {
    work_experience_id: Uuid,
    warning:            IntegrityWarning,
  },
}

impl EffectiveWorkExperience {
  pub fn work_experience_id(&self) -> Uuid {
    match self {
      Self::Included(we) => we.work_experience.work_experience_id,
      Self::Dangling { work_experience_id, .. } => *work_experience_id,
    }
  }

  pub fn resolved(&self) -> Option<&ResolvedWorkExperience> {
    match self {
      Self::Included(we) => Some(we),
      Self::Dangling { .. } => None,
    }
  }
}

// ─── Resume ──────────────────────────────────────────────────────────────────

/// The merged read model for one scoped resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveResume {
  pub scoped_resume_id: Uuid,
  pub name:             String,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
  pub summary:          EffectiveSummary,
  /// Ordered by skill name; dangling entries last.
  pub skills:           Vec<EffectiveSkill>,
  /// Most recent first; dangling entries last.
  pub work_experiences: Vec<EffectiveWorkExperience>,
  /// Every integrity problem found while resolving, including line overrides
  /// whose base line has disappeared.
  pub warnings:         Vec<IntegrityWarning>,
}

impl EffectiveResume {
  /// `true` when every content field equals `other`'s. Identity (id, name,
  /// timestamps) is ignored.
  pub fn same_content(&self, other: &Self) -> bool {
    self.summary == other.summary
      && self.skills == other.skills
      && self.work_experiences == other.work_experiences
      && self.warnings == other.warnings
  }
}
