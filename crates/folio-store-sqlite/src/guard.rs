//! The integrity guard: refuses destructive base operations while anything
//! still references the record.
//!
//! Each check is a single `EXISTS` query over the referencing table(s), backed
//! by an index on the referenced column. The guard does not care *which*
//! scoped resume holds the reference.

use folio_core::{Error as CoreError, guard::GuardedEntity};
use rusqlite::Connection;

use crate::{Result, encode::encode_uuid};

fn reference_query(entity: &GuardedEntity) -> &'static str {
  match entity {
    GuardedEntity::Skill(_) => {
      "SELECT EXISTS (SELECT 1 FROM scoped_skill_inclusions WHERE skill_id = ?1)"
    }
    // A work experience is also pinned by overrides on any of its lines, since
    // deleting it deletes those lines.
    GuardedEntity::WorkExperience(_) => {
      "SELECT EXISTS (
         SELECT 1 FROM scoped_work_experience_inclusions WHERE work_experience_id = ?1
       ) OR EXISTS (
         SELECT 1
         FROM scoped_line_overrides o
         JOIN work_experience_lines l ON l.line_id = o.line_id
         WHERE l.work_experience_id = ?1
       )"
    }
    GuardedEntity::WorkExperienceLine(_) => {
      "SELECT EXISTS (SELECT 1 FROM scoped_line_overrides WHERE line_id = ?1)"
    }
    GuardedEntity::SkillCategory(_) => {
      "SELECT EXISTS (SELECT 1 FROM skills WHERE category_id = ?1)"
    }
    GuardedEntity::SkillSubcategory(_) => {
      "SELECT EXISTS (SELECT 1 FROM skills WHERE subcategory_id = ?1)"
    }
  }
}

/// `true` if at least one row references `entity`.
pub fn is_referenced(conn: &Connection, entity: &GuardedEntity) -> Result<bool> {
  let id = encode_uuid(entity.id());
  let referenced =
    conn.query_row(reference_query(entity), rusqlite::params![id], |row| row.get(0))?;
  Ok(referenced)
}

/// Fail with `Conflict` if `entity` is still referenced.
pub fn ensure_deletable(conn: &Connection, entity: GuardedEntity) -> Result<()> {
  if is_referenced(conn, &entity)? {
    tracing::debug!(?entity, "delete refused by integrity guard");
    return Err(
      CoreError::Conflict(format!(
        "{} {} is still referenced and cannot be deleted",
        entity.kind(),
        entity.id()
      ))
      .into(),
    );
  }
  Ok(())
}
