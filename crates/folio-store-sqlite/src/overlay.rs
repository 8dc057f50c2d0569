//! The overlay mutator: [`ScopedResumeStore`] for [`SqliteStore`].
//!
//! Every operation runs in one transaction via [`SqliteStore::transact`].
//! Existence and uniqueness are checked explicitly up front; the UNIQUE
//! constraints in the schema back those checks up when two writers race, and
//! surface as the same `Conflict`.

use chrono::Utc;
use folio_core::{
  EntityKind, Error as CoreError,
  effective::EffectiveResume,
  scoped::{
    LineOverride, ScopedResume, ScopedResumeSetup, SkillInclusion, SummaryOverride,
    WorkExperienceInclusion, normalize_name,
  },
  store::ScopedResumeStore,
};
use rusqlite::{Connection, OptionalExtension as _};
use uuid::Uuid;

use crate::{
  Result, SqliteStore,
  encode::{
    RawLineOverride, RawScopedResume, RawSummaryOverride, decode_uuid, encode_dt, encode_uuid,
  },
  resolve::resolve_effective,
  store::{Table, require, require_all},
};

// ─── Overlay snapshot ────────────────────────────────────────────────────────

/// The full content of one overlay: everything a scoped resume owns except
/// its root row. Used to seed a new scoped resume (setup, duplicate).
#[derive(Debug, Default)]
struct Overlay {
  summary:             Option<String>,
  skill_ids:           Vec<Uuid>,
  work_experience_ids: Vec<Uuid>,
  /// `(line_id, text)`
  line_overrides:      Vec<(Uuid, String)>,
}

fn load_overlay(conn: &Connection, id: Uuid) -> Result<Overlay> {
  let id_str = encode_uuid(id);

  let summary = conn
    .query_row(
      "SELECT text FROM scoped_summary_overrides WHERE scoped_resume_id = ?1",
      rusqlite::params![id_str],
      |row| row.get(0),
    )
    .optional()?;

  let skill_ids = select_ids(
    conn,
    "SELECT skill_id FROM scoped_skill_inclusions WHERE scoped_resume_id = ?1",
    &id_str,
  )?;
  let work_experience_ids = select_ids(
    conn,
    "SELECT work_experience_id FROM scoped_work_experience_inclusions
     WHERE scoped_resume_id = ?1",
    &id_str,
  )?;

  let mut stmt = conn
    .prepare("SELECT line_id, text FROM scoped_line_overrides WHERE scoped_resume_id = ?1")?;
  let raw_overrides = stmt
    .query_map(rusqlite::params![id_str], |row| {
      Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  let line_overrides = raw_overrides
    .into_iter()
    .map(|(line_id, text)| Ok((decode_uuid(&line_id)?, text)))
    .collect::<Result<Vec<_>>>()?;

  Ok(Overlay { summary, skill_ids, work_experience_ids, line_overrides })
}

fn select_ids(conn: &Connection, sql: &str, id_str: &str) -> Result<Vec<Uuid>> {
  let mut stmt = conn.prepare(sql)?;
  let raws = stmt
    .query_map(rusqlite::params![id_str], |row| row.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.iter().map(|s| decode_uuid(s)).collect()
}

/// Insert every row of `overlay` under `id`, each with a fresh row id.
fn insert_overlay(conn: &Connection, id: Uuid, overlay: &Overlay) -> Result<()> {
  let id_str = encode_uuid(id);

  if let Some(text) = &overlay.summary {
    conn.execute(
      "INSERT INTO scoped_summary_overrides (override_id, scoped_resume_id, text)
       VALUES (?1, ?2, ?3)",
      rusqlite::params![encode_uuid(Uuid::new_v4()), id_str, text],
    )?;
  }
  for skill_id in &overlay.skill_ids {
    conn.execute(
      "INSERT INTO scoped_skill_inclusions (inclusion_id, scoped_resume_id, skill_id)
       VALUES (?1, ?2, ?3)",
      rusqlite::params![encode_uuid(Uuid::new_v4()), id_str, encode_uuid(*skill_id)],
    )?;
  }
  for we_id in &overlay.work_experience_ids {
    conn.execute(
      "INSERT INTO scoped_work_experience_inclusions
         (inclusion_id, scoped_resume_id, work_experience_id)
       VALUES (?1, ?2, ?3)",
      rusqlite::params![encode_uuid(Uuid::new_v4()), id_str, encode_uuid(*we_id)],
    )?;
  }
  for (line_id, text) in &overlay.line_overrides {
    conn.execute(
      "INSERT INTO scoped_line_overrides (override_id, scoped_resume_id, line_id, text)
       VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![encode_uuid(Uuid::new_v4()), id_str, encode_uuid(*line_id), text],
    )?;
  }
  Ok(())
}

// ─── Root helpers ────────────────────────────────────────────────────────────

fn load_scoped_resume(conn: &Connection, id: Uuid) -> Result<Option<ScopedResume>> {
  let sql = format!(
    "SELECT {} FROM scoped_resumes WHERE scoped_resume_id = ?1",
    RawScopedResume::COLUMNS
  );
  conn
    .query_row(&sql, rusqlite::params![encode_uuid(id)], RawScopedResume::from_row)
    .optional()?
    .map(RawScopedResume::into_scoped_resume)
    .transpose()
}

/// Fail with `Conflict` if `name` belongs to a scoped resume other than
/// `except`. Comparison is exact (case-sensitive).
fn ensure_name_available(conn: &Connection, name: &str, except: Option<Uuid>) -> Result<()> {
  let holder: Option<String> = conn
    .query_row(
      "SELECT scoped_resume_id FROM scoped_resumes WHERE name = ?1",
      rusqlite::params![name],
      |row| row.get(0),
    )
    .optional()?;

  let Some(holder) = holder else { return Ok(()) };
  if Some(decode_uuid(&holder)?) == except {
    return Ok(());
  }
  Err(CoreError::Conflict(format!("a scoped resume named {name:?} already exists")).into())
}

fn insert_scoped_resume(conn: &Connection, name: String) -> Result<ScopedResume> {
  let now = Utc::now();
  let resume = ScopedResume {
    scoped_resume_id: Uuid::new_v4(),
    name,
    created_at: now,
    updated_at: now,
  };
  conn.execute(
    "INSERT INTO scoped_resumes (scoped_resume_id, name, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![
      encode_uuid(resume.scoped_resume_id),
      resume.name,
      encode_dt(resume.created_at),
      encode_dt(resume.updated_at),
    ],
  )?;
  Ok(resume)
}

/// Bump `updated_at`; called by every mutation that changed the overlay.
fn touch(conn: &Connection, id: Uuid) -> Result<()> {
  conn.execute(
    "UPDATE scoped_resumes SET updated_at = ?2 WHERE scoped_resume_id = ?1",
    rusqlite::params![encode_uuid(id), encode_dt(Utc::now())],
  )?;
  Ok(())
}

/// Create a scoped resume seeded from `setup`. The name and every referenced
/// id are validated before the first write.
fn create_with_setup(conn: &Connection, setup: ScopedResumeSetup) -> Result<ScopedResume> {
  let name = normalize_name(&setup.name)?;
  ensure_name_available(conn, &name, None)?;

  let overlay = Overlay {
    summary:             setup.summary,
    skill_ids:           dedup(setup.skill_ids),
    work_experience_ids: dedup(setup.work_experience_ids),
    line_overrides:      Vec::new(),
  };
  require_all(conn, Table::Skills, &overlay.skill_ids)?;
  require_all(conn, Table::WorkExperiences, &overlay.work_experience_ids)?;

  let resume = insert_scoped_resume(conn, name)?;
  insert_overlay(conn, resume.scoped_resume_id, &overlay)?;
  tracing::debug!(
    scoped_resume_id = %resume.scoped_resume_id,
    skills = overlay.skill_ids.len(),
    work_experiences = overlay.work_experience_ids.len(),
    customized_summary = overlay.summary.is_some(),
    "created scoped resume",
  );
  Ok(resume)
}

/// Drop repeated ids, keeping first occurrences in order.
fn dedup(ids: Vec<Uuid>) -> Vec<Uuid> {
  let mut seen = std::collections::HashSet::new();
  ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

// ─── ScopedResumeStore impl ──────────────────────────────────────────────────

impl ScopedResumeStore for SqliteStore {
  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_scoped_resumes(&self) -> Result<Vec<ScopedResume>> {
    self
      .transact(|tx| {
        let sql = format!(
          "SELECT {} FROM scoped_resumes ORDER BY name",
          RawScopedResume::COLUMNS
        );
        let mut stmt = tx.prepare(&sql)?;
        let raws = stmt
          .query_map([], RawScopedResume::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawScopedResume::into_scoped_resume).collect()
      })
      .await
  }

  async fn get_scoped_resume(&self, id: Uuid) -> Result<Option<ScopedResume>> {
    self.transact(move |tx| load_scoped_resume(tx, id)).await
  }

  async fn resolve(&self, id: Uuid) -> Result<Option<EffectiveResume>> {
    self.transact(move |tx| resolve_effective(tx, id)).await
  }

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  async fn create_scoped_resume(&self, name: String) -> Result<ScopedResume> {
    self
      .transact(move |tx| create_with_setup(tx, ScopedResumeSetup::named(name)))
      .await
  }

  async fn create_scoped_resume_with_setup(
    &self,
    setup: ScopedResumeSetup,
  ) -> Result<ScopedResume> {
    self.transact(move |tx| create_with_setup(tx, setup)).await
  }

  async fn rename_scoped_resume(&self, id: Uuid, name: String) -> Result<ScopedResume> {
    self
      .transact(move |tx| {
        require(tx, Table::ScopedResumes, id)?;
        let name = normalize_name(&name)?;
        ensure_name_available(tx, &name, Some(id))?;
        tx.execute(
          "UPDATE scoped_resumes SET name = ?2, updated_at = ?3 WHERE scoped_resume_id = ?1",
          rusqlite::params![encode_uuid(id), name, encode_dt(Utc::now())],
        )?;
        tracing::debug!(scoped_resume_id = %id, %name, "renamed scoped resume");
        load_scoped_resume(tx, id)?
          .ok_or_else(|| CoreError::not_found(EntityKind::ScopedResume, id).into())
      })
      .await
  }

  async fn duplicate_scoped_resume(&self, id: Uuid, name: String) -> Result<ScopedResume> {
    self
      .transact(move |tx| {
        require(tx, Table::ScopedResumes, id)?;
        let name = normalize_name(&name)?;
        ensure_name_available(tx, &name, None)?;

        let overlay = load_overlay(tx, id)?;
        let copy = insert_scoped_resume(tx, name)?;
        insert_overlay(tx, copy.scoped_resume_id, &overlay)?;
        tracing::debug!(
          source = %id,
          copy = %copy.scoped_resume_id,
          "duplicated scoped resume",
        );
        Ok(copy)
      })
      .await
  }

  async fn delete_scoped_resume(&self, id: Uuid) -> Result<()> {
    self
      .transact(move |tx| {
        require(tx, Table::ScopedResumes, id)?;
        let id_str = encode_uuid(id);
        // Children first: they hold foreign keys to the root row.
        for table in [
          "scoped_line_overrides",
          "scoped_work_experience_inclusions",
          "scoped_skill_inclusions",
          "scoped_summary_overrides",
          "scoped_resumes",
        ] {
          tx.execute(
            &format!("DELETE FROM {table} WHERE scoped_resume_id = ?1"),
            rusqlite::params![id_str],
          )?;
        }
        tracing::debug!(scoped_resume_id = %id, "deleted scoped resume");
        Ok(())
      })
      .await
  }

  // ── Summary override ──────────────────────────────────────────────────────

  async fn set_summary_override(&self, id: Uuid, text: String) -> Result<SummaryOverride> {
    self
      .transact(move |tx| {
        require(tx, Table::ScopedResumes, id)?;
        let id_str = encode_uuid(id);
        tx.execute(
          "INSERT INTO scoped_summary_overrides (override_id, scoped_resume_id, text)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (scoped_resume_id) DO UPDATE SET text = excluded.text",
          rusqlite::params![encode_uuid(Uuid::new_v4()), id_str, text],
        )?;
        touch(tx, id)?;
        let raw = tx.query_row(
          "SELECT override_id, scoped_resume_id, text
           FROM scoped_summary_overrides WHERE scoped_resume_id = ?1",
          rusqlite::params![id_str],
          |row| {
            Ok(RawSummaryOverride {
              override_id:      row.get(0)?,
              scoped_resume_id: row.get(1)?,
              text:             row.get(2)?,
            })
          },
        )?;
        raw.into_override()
      })
      .await
  }

  async fn clear_summary_override(&self, id: Uuid) -> Result<()> {
    self
      .transact(move |tx| {
        require(tx, Table::ScopedResumes, id)?;
        let removed = tx.execute(
          "DELETE FROM scoped_summary_overrides WHERE scoped_resume_id = ?1",
          rusqlite::params![encode_uuid(id)],
        )?;
        if removed > 0 {
          touch(tx, id)?;
        }
        Ok(())
      })
      .await
  }

  // ── Inclusions ────────────────────────────────────────────────────────────

  async fn add_skill_inclusion(&self, id: Uuid, skill_id: Uuid) -> Result<SkillInclusion> {
    self
      .transact(move |tx| {
        require(tx, Table::ScopedResumes, id)?;
        require(tx, Table::Skills, skill_id)?;
        let already = tx
          .query_row(
            "SELECT 1 FROM scoped_skill_inclusions
             WHERE scoped_resume_id = ?1 AND skill_id = ?2",
            rusqlite::params![encode_uuid(id), encode_uuid(skill_id)],
            |_| Ok(()),
          )
          .optional()?;
        if already.is_some() {
          return Err(
            CoreError::Conflict(format!("skill {skill_id} is already included")).into(),
          );
        }

        let inclusion = SkillInclusion {
          inclusion_id: Uuid::new_v4(),
          scoped_resume_id: id,
          skill_id,
        };
        tx.execute(
          "INSERT INTO scoped_skill_inclusions (inclusion_id, scoped_resume_id, skill_id)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![
            encode_uuid(inclusion.inclusion_id),
            encode_uuid(id),
            encode_uuid(skill_id),
          ],
        )?;
        touch(tx, id)?;
        Ok(inclusion)
      })
      .await
  }

  async fn remove_skill_inclusion(&self, id: Uuid, skill_id: Uuid) -> Result<()> {
    self
      .transact(move |tx| {
        require(tx, Table::ScopedResumes, id)?;
        let removed = tx.execute(
          "DELETE FROM scoped_skill_inclusions WHERE scoped_resume_id = ?1 AND skill_id = ?2",
          rusqlite::params![encode_uuid(id), encode_uuid(skill_id)],
        )?;
        if removed == 0 {
          return Err(CoreError::not_found(EntityKind::SkillInclusion, skill_id).into());
        }
        touch(tx, id)
      })
      .await
  }

  async fn add_work_experience_inclusion(
    &self,
    id:                 Uuid,
    work_experience_id: Uuid,
  ) -> Result<WorkExperienceInclusion> {
    self
      .transact(move |tx| {
        require(tx, Table::ScopedResumes, id)?;
        require(tx, Table::WorkExperiences, work_experience_id)?;
        let already = tx
          .query_row(
            "SELECT 1 FROM scoped_work_experience_inclusions
             WHERE scoped_resume_id = ?1 AND work_experience_id = ?2",
            rusqlite::params![encode_uuid(id), encode_uuid(work_experience_id)],
            |_| Ok(()),
          )
          .optional()?;
        if already.is_some() {
          return Err(
            CoreError::Conflict(format!(
              "work experience {work_experience_id} is already included"
            ))
            .into(),
          );
        }

        let inclusion = WorkExperienceInclusion {
          inclusion_id: Uuid::new_v4(),
          scoped_resume_id: id,
          work_experience_id,
        };
        tx.execute(
          "INSERT INTO scoped_work_experience_inclusions
             (inclusion_id, scoped_resume_id, work_experience_id)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![
            encode_uuid(inclusion.inclusion_id),
            encode_uuid(id),
            encode_uuid(work_experience_id),
          ],
        )?;
        touch(tx, id)?;
        Ok(inclusion)
      })
      .await
  }

  async fn remove_work_experience_inclusion(
    &self,
    id:                 Uuid,
    work_experience_id: Uuid,
  ) -> Result<()> {
    self
      .transact(move |tx| {
        require(tx, Table::ScopedResumes, id)?;
        let id_str = encode_uuid(id);
        let we_str = encode_uuid(work_experience_id);

        let removed = tx.execute(
          "DELETE FROM scoped_work_experience_inclusions
           WHERE scoped_resume_id = ?1 AND work_experience_id = ?2",
          rusqlite::params![id_str, we_str],
        )?;
        if removed == 0 {
          return Err(
            CoreError::not_found(EntityKind::WorkExperienceInclusion, work_experience_id).into(),
          );
        }

        // Overrides on the excluded work experience's lines can no longer be
        // shown; drop them with the inclusion. Other scoped resumes keep theirs.
        let cascaded = tx.execute(
          "DELETE FROM scoped_line_overrides
           WHERE scoped_resume_id = ?1
             AND line_id IN (
               SELECT line_id FROM work_experience_lines WHERE work_experience_id = ?2
             )",
          rusqlite::params![id_str, we_str],
        )?;
        tracing::debug!(
          scoped_resume_id = %id,
          %work_experience_id,
          line_overrides_removed = cascaded,
          "removed work experience inclusion",
        );
        touch(tx, id)
      })
      .await
  }

  // ── Line overrides ────────────────────────────────────────────────────────

  async fn set_line_override(&self, id: Uuid, line_id: Uuid, text: String) -> Result<LineOverride> {
    self
      .transact(move |tx| {
        require(tx, Table::ScopedResumes, id)?;
        require(tx, Table::WorkExperienceLines, line_id)?;
        let id_str = encode_uuid(id);
        let line_str = encode_uuid(line_id);
        tx.execute(
          "INSERT INTO scoped_line_overrides (override_id, scoped_resume_id, line_id, text)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (scoped_resume_id, line_id) DO UPDATE SET text = excluded.text",
          rusqlite::params![encode_uuid(Uuid::new_v4()), id_str, line_str, text],
        )?;
        touch(tx, id)?;
        let raw = tx.query_row(
          "SELECT override_id, scoped_resume_id, line_id, text
           FROM scoped_line_overrides WHERE scoped_resume_id = ?1 AND line_id = ?2",
          rusqlite::params![id_str, line_str],
          |row| {
            Ok(RawLineOverride {
              override_id:      row.get(0)?,
              scoped_resume_id: row.get(1)?,
              line_id:          row.get(2)?,
              text:             row.get(3)?,
            })
          },
        )?;
        raw.into_override()
      })
      .await
  }

  async fn clear_line_override(&self, id: Uuid, line_id: Uuid) -> Result<()> {
    self
      .transact(move |tx| {
        require(tx, Table::ScopedResumes, id)?;
        let removed = tx.execute(
          "DELETE FROM scoped_line_overrides WHERE scoped_resume_id = ?1 AND line_id = ?2",
          rusqlite::params![encode_uuid(id), encode_uuid(line_id)],
        )?;
        if removed > 0 {
          touch(tx, id)?;
        }
        Ok(())
      })
      .await
  }
}
