//! The overlay resolver: computes the effective view of a scoped resume.
//!
//! Runs inside a read transaction so every part of the view is taken from the
//! same snapshot. Nothing is written.

use folio_core::{
  EntityKind,
  effective::{
    EffectiveLine, EffectiveResume, EffectiveSkill, EffectiveSummary,
    EffectiveWorkExperience, IntegrityWarning, ResolvedSkill, ResolvedWorkExperience,
  },
};
use rusqlite::{Connection, OptionalExtension as _};
use uuid::Uuid;

use crate::{
  Result,
  encode::{RawScopedResume, RawWorkExperience, decode_uuid, encode_uuid},
};

/// Resolve `id`, or `None` if no such scoped resume exists.
pub fn resolve_effective(conn: &Connection, id: Uuid) -> Result<Option<EffectiveResume>> {
  let id_str = encode_uuid(id);

  let sql = format!(
    "SELECT {} FROM scoped_resumes WHERE scoped_resume_id = ?1",
    RawScopedResume::COLUMNS
  );
  let Some(raw) = conn
    .query_row(&sql, rusqlite::params![id_str], RawScopedResume::from_row)
    .optional()?
  else {
    return Ok(None);
  };
  let resume = raw.into_scoped_resume()?;

  let mut warnings = Vec::new();
  let summary = effective_summary(conn, &id_str)?;
  let skills = effective_skills(conn, &id_str, &mut warnings)?;
  let work_experiences = effective_work_experiences(conn, &id_str, &mut warnings)?;
  orphaned_line_overrides(conn, &id_str, &mut warnings)?;

  for warning in &warnings {
    tracing::warn!(scoped_resume_id = %id, "{}", warning.message);
  }

  Ok(Some(EffectiveResume {
    scoped_resume_id: resume.scoped_resume_id,
    name: resume.name,
    created_at: resume.created_at,
    updated_at: resume.updated_at,
    summary,
    skills,
    work_experiences,
    warnings,
  }))
}

// ─── Summary ─────────────────────────────────────────────────────────────────

fn effective_summary(conn: &Connection, id_str: &str) -> Result<EffectiveSummary> {
  let customized: Option<String> = conn
    .query_row(
      "SELECT text FROM scoped_summary_overrides WHERE scoped_resume_id = ?1",
      rusqlite::params![id_str],
      |row| row.get(0),
    )
    .optional()?;

  if let Some(text) = customized {
    return Ok(EffectiveSummary { text: Some(text), is_customized: true });
  }

  let base: Option<String> = conn
    .query_row("SELECT text FROM professional_summary", [], |row| row.get(0))
    .optional()?;
  Ok(EffectiveSummary { text: base, is_customized: false })
}

// ─── Skills ──────────────────────────────────────────────────────────────────

/// One inclusion row left-joined to its base skill and taxonomy names.
struct RawIncludedSkill {
  skill_id:         String,
  name:             Option<String>,
  category_id:      Option<String>,
  category_name:    Option<String>,
  subcategory_id:   Option<String>,
  subcategory_name: Option<String>,
}

fn effective_skills(
  conn:     &Connection,
  id_str:   &str,
  warnings: &mut Vec<IntegrityWarning>,
) -> Result<Vec<EffectiveSkill>> {
  let mut stmt = conn.prepare(
    "SELECT i.skill_id, s.name, s.category_id, c.name, s.subcategory_id, sc.name
     FROM scoped_skill_inclusions i
     LEFT JOIN skills              s  ON s.skill_id        = i.skill_id
     LEFT JOIN skill_categories    c  ON c.category_id     = s.category_id
     LEFT JOIN skill_subcategories sc ON sc.subcategory_id = s.subcategory_id
     WHERE i.scoped_resume_id = ?1
     ORDER BY s.name IS NULL, s.name, i.skill_id",
  )?;
  let raws = stmt
    .query_map(rusqlite::params![id_str], |row| {
      Ok(RawIncludedSkill {
        skill_id:         row.get(0)?,
        name:             row.get(1)?,
        category_id:      row.get(2)?,
        category_name:    row.get(3)?,
        subcategory_id:   row.get(4)?,
        subcategory_name: row.get(5)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut skills = Vec::with_capacity(raws.len());
  for raw in raws {
    let skill_id = decode_uuid(&raw.skill_id)?;
    match (raw.name, raw.category_id, raw.subcategory_id) {
      (Some(name), Some(category_id), Some(subcategory_id)) => {
        skills.push(EffectiveSkill::Included(ResolvedSkill {
          skill_id,
          name,
          category_id: decode_uuid(&category_id)?,
          category_name: raw.category_name,
          subcategory_id: decode_uuid(&subcategory_id)?,
          subcategory_name: raw.subcategory_name,
        }));
      }
      _ => {
        let warning = IntegrityWarning::missing(EntityKind::Skill, skill_id, "skill inclusion");
        warnings.push(warning.clone());
        skills.push(EffectiveSkill::Dangling { skill_id, warning });
      }
    }
  }
  Ok(skills)
}

// ─── Work history ────────────────────────────────────────────────────────────

fn effective_work_experiences(
  conn:     &Connection,
  id_str:   &str,
  warnings: &mut Vec<IntegrityWarning>,
) -> Result<Vec<EffectiveWorkExperience>> {
  // Column 0 is the inclusion's id; columns 1..=7 the (possibly NULL) base row.
  let mut stmt = conn.prepare(
    "SELECT i.work_experience_id,
            w.work_experience_id, w.company_name, w.job_title, w.city, w.state,
            w.date_started, w.date_ended
     FROM scoped_work_experience_inclusions i
     LEFT JOIN work_experiences w ON w.work_experience_id = i.work_experience_id
     WHERE i.scoped_resume_id = ?1
     ORDER BY w.work_experience_id IS NULL, w.date_started DESC, i.work_experience_id",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![id_str], |row| {
      let included: String = row.get(0)?;
      let present: Option<String> = row.get(1)?;
      let base = match present {
        Some(_) => Some(RawWorkExperience::from_row_at(row, 1)?),
        None => None,
      };
      Ok((included, base))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut out = Vec::with_capacity(rows.len());
  for (included, base) in rows {
    let work_experience_id = decode_uuid(&included)?;
    match base {
      Some(raw) => {
        let work_experience = raw.into_work_experience()?;
        let lines = effective_lines(conn, id_str, &included)?;
        out.push(EffectiveWorkExperience::Included(ResolvedWorkExperience {
          work_experience,
          lines,
        }));
      }
      None => {
        let warning = IntegrityWarning::missing(
          EntityKind::WorkExperience,
          work_experience_id,
          "work experience inclusion",
        );
        warnings.push(warning.clone());
        out.push(EffectiveWorkExperience::Dangling { work_experience_id, warning });
      }
    }
  }
  Ok(out)
}

/// Base lines of one work experience, each paired with this scoped resume's
/// override (if any).
fn effective_lines(
  conn:      &Connection,
  id_str:    &str,
  we_id_str: &str,
) -> Result<Vec<EffectiveLine>> {
  let mut stmt = conn.prepare(
    "SELECT l.line_id, l.sort_order, l.text, o.text
     FROM work_experience_lines l
     LEFT JOIN scoped_line_overrides o
       ON o.line_id = l.line_id AND o.scoped_resume_id = ?2
     WHERE l.work_experience_id = ?1
     ORDER BY l.sort_order",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![we_id_str, id_str], |row| {
      Ok((
        row.get::<_, String>(0)?,
        row.get::<_, i64>(1)?,
        row.get::<_, String>(2)?,
        row.get::<_, Option<String>>(3)?,
      ))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  rows
    .into_iter()
    .map(|(line_id, sort_order, base_text, override_text)| {
      Ok(EffectiveLine {
        line_id: decode_uuid(&line_id)?,
        sort_order,
        is_customized: override_text.is_some(),
        text: override_text.unwrap_or(base_text),
      })
    })
    .collect()
}

/// Line overrides whose base line no longer exists. These can never be shown,
/// so they are only reported.
fn orphaned_line_overrides(
  conn:     &Connection,
  id_str:   &str,
  warnings: &mut Vec<IntegrityWarning>,
) -> Result<()> {
  let mut stmt = conn.prepare(
    "SELECT o.line_id
     FROM scoped_line_overrides o
     LEFT JOIN work_experience_lines l ON l.line_id = o.line_id
     WHERE o.scoped_resume_id = ?1 AND l.line_id IS NULL
     ORDER BY o.line_id",
  )?;
  let line_ids = stmt
    .query_map(rusqlite::params![id_str], |row| row.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  for line_id in line_ids {
    warnings.push(IntegrityWarning::missing(
      EntityKind::WorkExperienceLine,
      decode_uuid(&line_id)?,
      "line override",
    ));
  }
  Ok(())
}
