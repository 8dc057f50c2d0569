//! Base records whose deletion is subject to the integrity guard.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EntityKind;

/// A base record that overlay rows (or other base rows) may still reference.
///
/// Deleting any of these is refused while a reference exists:
///
/// | Entity | Refused while referenced by |
/// |--------|------------------------------|
/// | `Skill` | any skill inclusion |
/// | `WorkExperience` | any work-experience inclusion, or any line override on one of its lines |
/// | `WorkExperienceLine` | any line override |
/// | `SkillCategory` / `SkillSubcategory` | any skill |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum GuardedEntity {
  Skill(Uuid),
  WorkExperience(Uuid),
  WorkExperienceLine(Uuid),
  SkillCategory(Uuid),
  SkillSubcategory(Uuid),
}

impl GuardedEntity {
  pub fn kind(&self) -> EntityKind {
    match self {
      Self::Skill(_) => EntityKind::Skill,
      Self::WorkExperience(_) => EntityKind::WorkExperience,
      Self::WorkExperienceLine(_) => EntityKind::WorkExperienceLine,
      Self::SkillCategory(_) => EntityKind::SkillCategory,
      Self::SkillSubcategory(_) => EntityKind::SkillSubcategory,
    }
  }

  pub fn id(&self) -> Uuid {
    match *self {
      Self::Skill(id)
      | Self::WorkExperience(id)
      | Self::WorkExperienceLine(id)
      | Self::SkillCategory(id)
      | Self::SkillSubcategory(id) => id,
    }
  }
}
