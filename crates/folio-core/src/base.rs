//! Base resume records.
//!
//! These are owned by the base store. Scoped resumes reference them by id and
//! never copy their field values, so an edit here shows up live in every
//! scoped resume that has not overridden the field.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Summary ─────────────────────────────────────────────────────────────────

/// The professional summary. At most one exists system-wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalSummary {
  pub summary_id: Uuid,
  pub text:       String,
}

// ─── Skill taxonomy ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategory {
  pub category_id: Uuid,
  pub name:        String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSubcategory {
  pub subcategory_id: Uuid,
  pub name:           String,
}

// ─── Skills ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
  pub skill_id:       Uuid,
  pub name:           String,
  pub category_id:    Uuid,
  pub subcategory_id: Uuid,
}

/// Input to [`crate::store::ResumeStore::add_skill`] and
/// [`crate::store::ResumeStore::update_skill`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSkill {
  pub name:           String,
  pub category_id:    Uuid,
  pub subcategory_id: Uuid,
}

// ─── Work history ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkExperience {
  pub work_experience_id: Uuid,
  pub company_name:       String,
  pub job_title:          String,
  pub city:               String,
  pub state:              String,
  pub date_started:       NaiveDate,
  /// `None` for the current position.
  pub date_ended:         Option<NaiveDate>,
}

/// Input to [`crate::store::ResumeStore::add_work_experience`] and
/// [`crate::store::ResumeStore::update_work_experience`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkExperience {
  pub company_name: String,
  pub job_title:    String,
  pub city:         String,
  pub state:        String,
  pub date_started: NaiveDate,
  pub date_ended:   Option<NaiveDate>,
}

/// One bullet under a work experience. `sort_order` is unique within the
/// owning work experience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkExperienceLine {
  pub line_id:            Uuid,
  pub work_experience_id: Uuid,
  pub text:               String,
  pub sort_order:         i64,
}
