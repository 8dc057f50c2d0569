//! [`SqliteStore`] and its [`ResumeStore`] implementation.
//!
//! The overlay half ([`ScopedResumeStore`](folio_core::store::ScopedResumeStore))
//! lives in `overlay.rs`.

use std::{collections::HashSet, path::Path};

use folio_core::{
  EntityKind, Error as CoreError,
  base::{
    NewSkill, NewWorkExperience, ProfessionalSummary, Skill, SkillCategory,
    SkillSubcategory, WorkExperience, WorkExperienceLine,
  },
  guard::GuardedEntity,
  store::ResumeStore,
};
use rusqlite::{Connection, OptionalExtension as _, Transaction};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawLine, RawSkill, RawSummary, RawTaxon, RawWorkExperience, decode_uuid, encode_date,
    encode_uuid,
  },
  guard::{ensure_deletable, is_referenced},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Folio store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` inside one transaction on the connection thread.
  ///
  /// The transaction commits only if `f` returns `Ok`; on `Err` it is dropped
  /// and rolled back, so no partial write is ever observable.
  pub(crate) async fn transact<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let out = f(&tx);
        if out.is_ok() {
          tx.commit()?;
        }
        Ok(out)
      })
      .await?
  }

  /// Execute raw SQL outside of the store's invariants. Tests use this to
  /// simulate out-of-band edits.
  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: impl Into<String>) -> Result<()> {
    let sql = sql.into();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of rows in `table` owned by `scoped_resume_id`.
  #[cfg(test)]
  pub(crate) async fn count_overlay_rows(
    &self,
    table: &'static str,
    scoped_resume_id: Uuid,
  ) -> Result<i64> {
    let id_str = encode_uuid(scoped_resume_id);
    self
      .transact(move |tx| {
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE scoped_resume_id = ?1");
        Ok(tx.query_row(&sql, rusqlite::params![id_str], |row| row.get(0))?)
      })
      .await
  }
}

// ─── Table addressing ────────────────────────────────────────────────────────

/// Tables addressable by a single UUID primary key.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Table {
  ScopedResumes,
  Skills,
  SkillCategories,
  SkillSubcategories,
  WorkExperiences,
  WorkExperienceLines,
}

impl Table {
  fn name(self) -> &'static str {
    match self {
      Table::ScopedResumes => "scoped_resumes",
      Table::Skills => "skills",
      Table::SkillCategories => "skill_categories",
      Table::SkillSubcategories => "skill_subcategories",
      Table::WorkExperiences => "work_experiences",
      Table::WorkExperienceLines => "work_experience_lines",
    }
  }

  fn key(self) -> &'static str {
    match self {
      Table::ScopedResumes => "scoped_resume_id",
      Table::Skills => "skill_id",
      Table::SkillCategories => "category_id",
      Table::SkillSubcategories => "subcategory_id",
      Table::WorkExperiences => "work_experience_id",
      Table::WorkExperienceLines => "line_id",
    }
  }

  fn entity(self) -> EntityKind {
    match self {
      Table::ScopedResumes => EntityKind::ScopedResume,
      Table::Skills => EntityKind::Skill,
      Table::SkillCategories => EntityKind::SkillCategory,
      Table::SkillSubcategories => EntityKind::SkillSubcategory,
      Table::WorkExperiences => EntityKind::WorkExperience,
      Table::WorkExperienceLines => EntityKind::WorkExperienceLine,
    }
  }
}

pub(crate) fn exists(conn: &Connection, table: Table, id: Uuid) -> Result<bool> {
  let sql = format!("SELECT 1 FROM {} WHERE {} = ?1", table.name(), table.key());
  let found = conn
    .query_row(&sql, rusqlite::params![encode_uuid(id)], |_| Ok(()))
    .optional()?;
  Ok(found.is_some())
}

/// Fail with `NotFound` unless `id` exists in `table`.
pub(crate) fn require(conn: &Connection, table: Table, id: Uuid) -> Result<()> {
  if exists(conn, table, id)? {
    Ok(())
  } else {
    Err(CoreError::not_found(table.entity(), id).into())
  }
}

/// Bound parameters per `IN (…)` query, below SQLite's variable limit.
const ID_CHUNK: usize = 500;

/// Batch existence check: the subset of `ids` present in `table`, one query
/// per [`ID_CHUNK`] ids.
pub(crate) fn existing_ids(conn: &Connection, table: Table, ids: &[Uuid]) -> Result<HashSet<Uuid>> {
  let mut found = HashSet::new();
  for chunk in ids.chunks(ID_CHUNK) {
    let placeholders = (1..=chunk.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!(
      "SELECT {key} FROM {name} WHERE {key} IN ({placeholders})",
      key = table.key(),
      name = table.name(),
    );

    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt
      .query_map(
        rusqlite::params_from_iter(chunk.iter().map(|id| encode_uuid(*id))),
        |row| row.get::<_, String>(0),
      )?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    for row in rows {
      found.insert(decode_uuid(&row)?);
    }
  }
  Ok(found)
}

/// Fail with `NotFound` naming the first of `ids` (in input order) that is
/// missing from `table`.
pub(crate) fn require_all(conn: &Connection, table: Table, ids: &[Uuid]) -> Result<()> {
  let found = existing_ids(conn, table, ids)?;
  match ids.iter().find(|id| !found.contains(id)) {
    Some(missing) => Err(CoreError::not_found(table.entity(), *missing).into()),
    None => Ok(()),
  }
}

// ─── Row loaders ─────────────────────────────────────────────────────────────

fn load_skill(conn: &Connection, id: Uuid) -> Result<Option<Skill>> {
  let sql = format!("SELECT {} FROM skills WHERE skill_id = ?1", RawSkill::COLUMNS);
  conn
    .query_row(&sql, rusqlite::params![encode_uuid(id)], RawSkill::from_row)
    .optional()?
    .map(RawSkill::into_skill)
    .transpose()
}

fn load_work_experience(conn: &Connection, id: Uuid) -> Result<Option<WorkExperience>> {
  let sql = format!(
    "SELECT {} FROM work_experiences WHERE work_experience_id = ?1",
    RawWorkExperience::COLUMNS
  );
  conn
    .query_row(&sql, rusqlite::params![encode_uuid(id)], RawWorkExperience::from_row)
    .optional()?
    .map(RawWorkExperience::into_work_experience)
    .transpose()
}

pub(crate) fn load_line(conn: &Connection, id: Uuid) -> Result<Option<WorkExperienceLine>> {
  let sql = format!("SELECT {} FROM work_experience_lines WHERE line_id = ?1", RawLine::COLUMNS);
  conn
    .query_row(&sql, rusqlite::params![encode_uuid(id)], RawLine::from_row)
    .optional()?
    .map(RawLine::into_line)
    .transpose()
}

fn load_lines(conn: &Connection, work_experience_id: Uuid) -> Result<Vec<WorkExperienceLine>> {
  let sql = format!(
    "SELECT {} FROM work_experience_lines WHERE work_experience_id = ?1 ORDER BY sort_order",
    RawLine::COLUMNS
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(work_experience_id)], RawLine::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawLine::into_line).collect()
}

fn load_summary(conn: &Connection) -> Result<Option<ProfessionalSummary>> {
  conn
    .query_row("SELECT summary_id, text FROM professional_summary", [], |row| {
      Ok(RawSummary { summary_id: row.get(0)?, text: row.get(1)? })
    })
    .optional()?
    .map(RawSummary::into_summary)
    .transpose()
}

fn list_taxa(conn: &Connection, table: Table) -> Result<Vec<RawTaxon>> {
  let sql = format!("SELECT {}, name FROM {} ORDER BY name", table.key(), table.name());
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map([], RawTaxon::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(raws)
}

fn insert_taxon(conn: &Connection, table: Table, name: String) -> Result<RawTaxon> {
  let name = name.trim().to_owned();
  if name.is_empty() {
    return Err(CoreError::Validation(format!("{} name must not be blank", table.entity())).into());
  }
  let id = encode_uuid(Uuid::new_v4());
  let sql = format!("INSERT INTO {} ({}, name) VALUES (?1, ?2)", table.name(), table.key());
  conn.execute(&sql, rusqlite::params![id, name])?;
  Ok(RawTaxon { id, name })
}

fn delete_row(conn: &Connection, table: Table, id: Uuid) -> Result<()> {
  let sql = format!("DELETE FROM {} WHERE {} = ?1", table.name(), table.key());
  conn.execute(&sql, rusqlite::params![encode_uuid(id)])?;
  Ok(())
}

fn validate_skill(conn: &Connection, input: &NewSkill) -> Result<String> {
  let name = input.name.trim();
  if name.is_empty() {
    return Err(CoreError::Validation("skill name must not be blank".into()).into());
  }
  require(conn, Table::SkillCategories, input.category_id)?;
  require(conn, Table::SkillSubcategories, input.subcategory_id)?;
  Ok(name.to_owned())
}

fn validate_work_experience(input: &NewWorkExperience) -> Result<()> {
  if input.company_name.trim().is_empty() || input.job_title.trim().is_empty() {
    return Err(
      CoreError::Validation("company name and job title must not be blank".into()).into(),
    );
  }
  if let Some(ended) = input.date_ended
    && ended < input.date_started
  {
    return Err(
      CoreError::Validation(format!(
        "date_ended {ended} is before date_started {}",
        input.date_started
      ))
      .into(),
    );
  }
  Ok(())
}

// ─── ResumeStore impl ────────────────────────────────────────────────────────

impl ResumeStore for SqliteStore {
  type Error = Error;

  // ── Summary ───────────────────────────────────────────────────────────────

  async fn get_summary(&self) -> Result<Option<ProfessionalSummary>> {
    self.transact(|tx| load_summary(tx)).await
  }

  async fn set_summary(&self, text: String) -> Result<ProfessionalSummary> {
    self
      .transact(move |tx| {
        tx.execute(
          "INSERT INTO professional_summary (summary_id, singleton, text) VALUES (?1, 1, ?2)
           ON CONFLICT (singleton) DO UPDATE SET text = excluded.text",
          rusqlite::params![encode_uuid(Uuid::new_v4()), text],
        )?;
        load_summary(tx)?.ok_or_else(|| {
          Error::Core(CoreError::IntegrityViolation("summary vanished after upsert".into()))
        })
      })
      .await
  }

  async fn clear_summary(&self) -> Result<()> {
    self
      .transact(|tx| {
        tx.execute("DELETE FROM professional_summary", [])?;
        Ok(())
      })
      .await
  }

  // ── Taxonomy ──────────────────────────────────────────────────────────────

  async fn add_category(&self, name: String) -> Result<SkillCategory> {
    self
      .transact(move |tx| insert_taxon(tx, Table::SkillCategories, name)?.into_category())
      .await
  }

  async fn list_categories(&self) -> Result<Vec<SkillCategory>> {
    self
      .transact(|tx| {
        list_taxa(tx, Table::SkillCategories)?
          .into_iter()
          .map(RawTaxon::into_category)
          .collect()
      })
      .await
  }

  async fn delete_category(&self, id: Uuid) -> Result<()> {
    self
      .transact(move |tx| {
        require(tx, Table::SkillCategories, id)?;
        ensure_deletable(tx, GuardedEntity::SkillCategory(id))?;
        delete_row(tx, Table::SkillCategories, id)
      })
      .await
  }

  async fn add_subcategory(&self, name: String) -> Result<SkillSubcategory> {
    self
      .transact(move |tx| insert_taxon(tx, Table::SkillSubcategories, name)?.into_subcategory())
      .await
  }

  async fn list_subcategories(&self) -> Result<Vec<SkillSubcategory>> {
    self
      .transact(|tx| {
        list_taxa(tx, Table::SkillSubcategories)?
          .into_iter()
          .map(RawTaxon::into_subcategory)
          .collect()
      })
      .await
  }

  async fn delete_subcategory(&self, id: Uuid) -> Result<()> {
    self
      .transact(move |tx| {
        require(tx, Table::SkillSubcategories, id)?;
        ensure_deletable(tx, GuardedEntity::SkillSubcategory(id))?;
        delete_row(tx, Table::SkillSubcategories, id)
      })
      .await
  }

  // ── Skills ────────────────────────────────────────────────────────────────

  async fn add_skill(&self, input: NewSkill) -> Result<Skill> {
    self
      .transact(move |tx| {
        let name = validate_skill(tx, &input)?;
        let skill = Skill {
          skill_id: Uuid::new_v4(),
          name,
          category_id: input.category_id,
          subcategory_id: input.subcategory_id,
        };
        tx.execute(
          "INSERT INTO skills (skill_id, name, category_id, subcategory_id)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            encode_uuid(skill.skill_id),
            skill.name,
            encode_uuid(skill.category_id),
            encode_uuid(skill.subcategory_id),
          ],
        )?;
        tracing::debug!(skill_id = %skill.skill_id, "added skill");
        Ok(skill)
      })
      .await
  }

  async fn get_skill(&self, id: Uuid) -> Result<Option<Skill>> {
    self.transact(move |tx| load_skill(tx, id)).await
  }

  async fn list_skills(&self) -> Result<Vec<Skill>> {
    self
      .transact(|tx| {
        let sql = format!("SELECT {} FROM skills ORDER BY name, skill_id", RawSkill::COLUMNS);
        let mut stmt = tx.prepare(&sql)?;
        let raws = stmt
          .query_map([], RawSkill::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawSkill::into_skill).collect()
      })
      .await
  }

  async fn list_skills_by_ids(&self, ids: Vec<Uuid>) -> Result<Vec<Skill>> {
    self
      .transact(move |tx| {
        let found = existing_ids(tx, Table::Skills, &ids)?;
        let mut skills = found
          .into_iter()
          .map(|id| load_skill(tx, id))
          .collect::<Result<Vec<_>>>()?
          .into_iter()
          .flatten()
          .collect::<Vec<_>>();
        skills.sort_by(|a, b| a.name.cmp(&b.name).then(a.skill_id.cmp(&b.skill_id)));
        Ok(skills)
      })
      .await
  }

  async fn update_skill(&self, id: Uuid, input: NewSkill) -> Result<Skill> {
    self
      .transact(move |tx| {
        require(tx, Table::Skills, id)?;
        let name = validate_skill(tx, &input)?;
        tx.execute(
          "UPDATE skills SET name = ?2, category_id = ?3, subcategory_id = ?4
           WHERE skill_id = ?1",
          rusqlite::params![
            encode_uuid(id),
            name,
            encode_uuid(input.category_id),
            encode_uuid(input.subcategory_id),
          ],
        )?;
        Ok(Skill {
          skill_id: id,
          name,
          category_id: input.category_id,
          subcategory_id: input.subcategory_id,
        })
      })
      .await
  }

  async fn delete_skill(&self, id: Uuid) -> Result<()> {
    self
      .transact(move |tx| {
        require(tx, Table::Skills, id)?;
        ensure_deletable(tx, GuardedEntity::Skill(id))?;
        delete_row(tx, Table::Skills, id)?;
        tracing::debug!(skill_id = %id, "deleted skill");
        Ok(())
      })
      .await
  }

  // ── Work history ──────────────────────────────────────────────────────────

  async fn add_work_experience(&self, input: NewWorkExperience) -> Result<WorkExperience> {
    self
      .transact(move |tx| {
        validate_work_experience(&input)?;
        let we = WorkExperience {
          work_experience_id: Uuid::new_v4(),
          company_name:       input.company_name,
          job_title:          input.job_title,
          city:               input.city,
          state:              input.state,
          date_started:       input.date_started,
          date_ended:         input.date_ended,
        };
        tx.execute(
          "INSERT INTO work_experiences (
             work_experience_id, company_name, job_title, city, state,
             date_started, date_ended
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            encode_uuid(we.work_experience_id),
            we.company_name,
            we.job_title,
            we.city,
            we.state,
            encode_date(we.date_started),
            we.date_ended.map(encode_date),
          ],
        )?;
        tracing::debug!(work_experience_id = %we.work_experience_id, "added work experience");
        Ok(we)
      })
      .await
  }

  async fn get_work_experience(&self, id: Uuid) -> Result<Option<WorkExperience>> {
    self.transact(move |tx| load_work_experience(tx, id)).await
  }

  async fn list_work_experiences(&self) -> Result<Vec<WorkExperience>> {
    self
      .transact(|tx| {
        let sql = format!(
          "SELECT {} FROM work_experiences ORDER BY date_started DESC, work_experience_id",
          RawWorkExperience::COLUMNS
        );
        let mut stmt = tx.prepare(&sql)?;
        let raws = stmt
          .query_map([], RawWorkExperience::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawWorkExperience::into_work_experience).collect()
      })
      .await
  }

  async fn update_work_experience(
    &self,
    id:    Uuid,
    input: NewWorkExperience,
  ) -> Result<WorkExperience> {
    self
      .transact(move |tx| {
        require(tx, Table::WorkExperiences, id)?;
        validate_work_experience(&input)?;
        tx.execute(
          "UPDATE work_experiences
           SET company_name = ?2, job_title = ?3, city = ?4, state = ?5,
               date_started = ?6, date_ended = ?7
           WHERE work_experience_id = ?1",
          rusqlite::params![
            encode_uuid(id),
            input.company_name,
            input.job_title,
            input.city,
            input.state,
            encode_date(input.date_started),
            input.date_ended.map(encode_date),
          ],
        )?;
        Ok(WorkExperience {
          work_experience_id: id,
          company_name:       input.company_name,
          job_title:          input.job_title,
          city:               input.city,
          state:              input.state,
          date_started:       input.date_started,
          date_ended:         input.date_ended,
        })
      })
      .await
  }

  async fn delete_work_experience(&self, id: Uuid) -> Result<()> {
    self
      .transact(move |tx| {
        require(tx, Table::WorkExperiences, id)?;
        ensure_deletable(tx, GuardedEntity::WorkExperience(id))?;
        tx.execute(
          "DELETE FROM work_experience_lines WHERE work_experience_id = ?1",
          rusqlite::params![encode_uuid(id)],
        )?;
        delete_row(tx, Table::WorkExperiences, id)?;
        tracing::debug!(work_experience_id = %id, "deleted work experience");
        Ok(())
      })
      .await
  }

  async fn add_line(&self, work_experience_id: Uuid, text: String) -> Result<WorkExperienceLine> {
    self
      .transact(move |tx| {
        require(tx, Table::WorkExperiences, work_experience_id)?;
        let we_str = encode_uuid(work_experience_id);
        let sort_order: i64 = tx.query_row(
          "SELECT COALESCE(MAX(sort_order), -1) + 1
           FROM work_experience_lines WHERE work_experience_id = ?1",
          rusqlite::params![we_str],
          |row| row.get(0),
        )?;
        let line = WorkExperienceLine {
          line_id: Uuid::new_v4(),
          work_experience_id,
          text,
          sort_order,
        };
        tx.execute(
          "INSERT INTO work_experience_lines (line_id, work_experience_id, text, sort_order)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![encode_uuid(line.line_id), we_str, line.text, line.sort_order],
        )?;
        Ok(line)
      })
      .await
  }

  async fn get_line(&self, id: Uuid) -> Result<Option<WorkExperienceLine>> {
    self.transact(move |tx| load_line(tx, id)).await
  }

  async fn list_lines(&self, work_experience_id: Uuid) -> Result<Vec<WorkExperienceLine>> {
    self
      .transact(move |tx| {
        require(tx, Table::WorkExperiences, work_experience_id)?;
        load_lines(tx, work_experience_id)
      })
      .await
  }

  async fn update_line(&self, id: Uuid, text: String) -> Result<WorkExperienceLine> {
    self
      .transact(move |tx| {
        require(tx, Table::WorkExperienceLines, id)?;
        tx.execute(
          "UPDATE work_experience_lines SET text = ?2 WHERE line_id = ?1",
          rusqlite::params![encode_uuid(id), text],
        )?;
        load_line(tx, id)?
          .ok_or_else(|| Error::Core(CoreError::not_found(EntityKind::WorkExperienceLine, id)))
      })
      .await
  }

  async fn reorder_lines(
    &self,
    work_experience_id: Uuid,
    line_ids:           Vec<Uuid>,
  ) -> Result<Vec<WorkExperienceLine>> {
    self
      .transact(move |tx| {
        require(tx, Table::WorkExperiences, work_experience_id)?;
        let current: HashSet<Uuid> = load_lines(tx, work_experience_id)?
          .into_iter()
          .map(|l| l.line_id)
          .collect();
        let requested: HashSet<Uuid> = line_ids.iter().copied().collect();
        if requested.len() != line_ids.len() || requested != current {
          return Err(
            CoreError::Validation(
              "line order must list every line of the work experience exactly once".into(),
            )
            .into(),
          );
        }

        // Park every line on a distinct negative slot first so the
        // (work_experience_id, sort_order) uniqueness holds between updates.
        let we_str = encode_uuid(work_experience_id);
        tx.execute(
          "UPDATE work_experience_lines SET sort_order = -sort_order - 1
           WHERE work_experience_id = ?1",
          rusqlite::params![we_str],
        )?;
        for (position, line_id) in line_ids.iter().enumerate() {
          tx.execute(
            "UPDATE work_experience_lines SET sort_order = ?2 WHERE line_id = ?1",
            rusqlite::params![encode_uuid(*line_id), position as i64],
          )?;
        }
        load_lines(tx, work_experience_id)
      })
      .await
  }

  async fn delete_line(&self, id: Uuid) -> Result<()> {
    self
      .transact(move |tx| {
        require(tx, Table::WorkExperienceLines, id)?;
        ensure_deletable(tx, GuardedEntity::WorkExperienceLine(id))?;
        delete_row(tx, Table::WorkExperienceLines, id)
      })
      .await
  }

  // ── Guard ─────────────────────────────────────────────────────────────────

  async fn can_delete(&self, entity: GuardedEntity) -> Result<bool> {
    self.transact(move |tx| Ok(!is_referenced(tx, &entity)?)).await
  }
}
