//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as `YYYY-MM-DD`,
//! and UUIDs as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use folio_core::{
  base::{
    ProfessionalSummary, Skill, SkillCategory, SkillSubcategory, WorkExperience,
    WorkExperienceLine,
  },
  scoped::{LineOverride, ScopedResume, SummaryOverride},
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────
//
// Each `Raw*` struct holds the strings read directly from one row. Decoding is
// kept out of the rusqlite row closures so parse failures surface as our own
// error type rather than as `rusqlite::Error`.

pub struct RawScopedResume {
  pub scoped_resume_id: String,
  pub name:             String,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawScopedResume {
  pub const COLUMNS: &'static str = "scoped_resume_id, name, created_at, updated_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      scoped_resume_id: row.get(0)?,
      name:             row.get(1)?,
      created_at:       row.get(2)?,
      updated_at:       row.get(3)?,
    })
  }

  pub fn into_scoped_resume(self) -> Result<ScopedResume> {
    Ok(ScopedResume {
      scoped_resume_id: decode_uuid(&self.scoped_resume_id)?,
      name:             self.name,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawSummary {
  pub summary_id: String,
  pub text:       String,
}

impl RawSummary {
  pub fn into_summary(self) -> Result<ProfessionalSummary> {
    Ok(ProfessionalSummary {
      summary_id: decode_uuid(&self.summary_id)?,
      text:       self.text,
    })
  }
}

/// A `(id, name)` row from either taxonomy table.
pub struct RawTaxon {
  pub id:   String,
  pub name: String,
}

impl RawTaxon {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { id: row.get(0)?, name: row.get(1)? })
  }

  pub fn into_category(self) -> Result<SkillCategory> {
    Ok(SkillCategory { category_id: decode_uuid(&self.id)?, name: self.name })
  }

  pub fn into_subcategory(self) -> Result<SkillSubcategory> {
    Ok(SkillSubcategory { subcategory_id: decode_uuid(&self.id)?, name: self.name })
  }
}

pub struct RawSkill {
  pub skill_id:       String,
  pub name:           String,
  pub category_id:    String,
  pub subcategory_id: String,
}

impl RawSkill {
  pub const COLUMNS: &'static str = "skill_id, name, category_id, subcategory_id";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      skill_id:       row.get(0)?,
      name:           row.get(1)?,
      category_id:    row.get(2)?,
      subcategory_id: row.get(3)?,
    })
  }

  pub fn into_skill(self) -> Result<Skill> {
    Ok(Skill {
      skill_id:       decode_uuid(&self.skill_id)?,
      name:           self.name,
      category_id:    decode_uuid(&self.category_id)?,
      subcategory_id: decode_uuid(&self.subcategory_id)?,
    })
  }
}

pub struct RawWorkExperience {
  pub work_experience_id: String,
  pub company_name:       String,
  pub job_title:          String,
  pub city:               String,
  pub state:              String,
  pub date_started:       String,
  pub date_ended:         Option<String>,
}

impl RawWorkExperience {
  pub const COLUMNS: &'static str =
    "work_experience_id, company_name, job_title, city, state, date_started, date_ended";

  /// Reads the seven columns starting at `offset`.
  pub fn from_row_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      work_experience_id: row.get(offset)?,
      company_name:       row.get(offset + 1)?,
      job_title:          row.get(offset + 2)?,
      city:               row.get(offset + 3)?,
      state:              row.get(offset + 4)?,
      date_started:       row.get(offset + 5)?,
      date_ended:         row.get(offset + 6)?,
    })
  }

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> { Self::from_row_at(row, 0) }

  pub fn into_work_experience(self) -> Result<WorkExperience> {
    Ok(WorkExperience {
      work_experience_id: decode_uuid(&self.work_experience_id)?,
      company_name:       self.company_name,
      job_title:          self.job_title,
      city:               self.city,
      state:              self.state,
      date_started:       decode_date(&self.date_started)?,
      date_ended:         self.date_ended.as_deref().map(decode_date).transpose()?,
    })
  }
}

pub struct RawLine {
  pub line_id:            String,
  pub work_experience_id: String,
  pub text:               String,
  pub sort_order:         i64,
}

impl RawLine {
  pub const COLUMNS: &'static str = "line_id, work_experience_id, text, sort_order";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      line_id:            row.get(0)?,
      work_experience_id: row.get(1)?,
      text:               row.get(2)?,
      sort_order:         row.get(3)?,
    })
  }

  pub fn into_line(self) -> Result<WorkExperienceLine> {
    Ok(WorkExperienceLine {
      line_id:            decode_uuid(&self.line_id)?,
      work_experience_id: decode_uuid(&self.work_experience_id)?,
      text:               self.text,
      sort_order:         self.sort_order,
    })
  }
}

// ─── Overlay rows ────────────────────────────────────────────────────────────

pub struct RawSummaryOverride {
  pub override_id:      String,
  pub scoped_resume_id: String,
  pub text:             String,
}

impl RawSummaryOverride {
  pub fn into_override(self) -> Result<SummaryOverride> {
    Ok(SummaryOverride {
      override_id:      decode_uuid(&self.override_id)?,
      scoped_resume_id: decode_uuid(&self.scoped_resume_id)?,
      text:             self.text,
    })
  }
}

pub struct RawLineOverride {
  pub override_id:      String,
  pub scoped_resume_id: String,
  pub line_id:          String,
  pub text:             String,
}

impl RawLineOverride {
  pub fn into_override(self) -> Result<LineOverride> {
    Ok(LineOverride {
      override_id:      decode_uuid(&self.override_id)?,
      scoped_resume_id: decode_uuid(&self.scoped_resume_id)?,
      line_id:          decode_uuid(&self.line_id)?,
      text:             self.text,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn date_roundtrip_sorts_lexically() {
    let early = NaiveDate::from_ymd_opt(2019, 3, 1).unwrap();
    let late  = NaiveDate::from_ymd_opt(2021, 11, 15).unwrap();
    assert_eq!(decode_date(&encode_date(early)).unwrap(), early);
    assert!(encode_date(early) < encode_date(late));
  }

  #[test]
  fn decode_date_rejects_garbage() {
    assert!(matches!(decode_date("March 2020"), Err(Error::DateParse(_))));
  }
}
