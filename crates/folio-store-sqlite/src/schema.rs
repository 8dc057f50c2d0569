//! SQL schema for the Folio SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.
//!
//! Overlay tables reference `scoped_resumes` but carry no foreign
//! keys into the base tables: references into the base are policed by the
//! integrity guard, and child rows are removed explicitly by the store rather
//! than by `ON DELETE CASCADE`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ── Base records ────────────────────────────────────────────────────────────

-- At most one row, enforced by the UNIQUE singleton column.
CREATE TABLE IF NOT EXISTS professional_summary (
    summary_id  TEXT PRIMARY KEY,
    singleton   INTEGER NOT NULL DEFAULT 1 UNIQUE CHECK (singleton = 1),
    text        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS skill_categories (
    category_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS skill_subcategories (
    subcategory_id TEXT PRIMARY KEY,
    name           TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS skills (
    skill_id       TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    category_id    TEXT NOT NULL REFERENCES skill_categories(category_id),
    subcategory_id TEXT NOT NULL REFERENCES skill_subcategories(subcategory_id)
);

CREATE TABLE IF NOT EXISTS work_experiences (
    work_experience_id TEXT PRIMARY KEY,
    company_name       TEXT NOT NULL,
    job_title          TEXT NOT NULL,
    city               TEXT NOT NULL,
    state              TEXT NOT NULL,
    date_started       TEXT NOT NULL,   -- YYYY-MM-DD
    date_ended         TEXT             -- YYYY-MM-DD or NULL (current)
);

CREATE TABLE IF NOT EXISTS work_experience_lines (
    line_id            TEXT PRIMARY KEY,
    work_experience_id TEXT NOT NULL REFERENCES work_experiences(work_experience_id),
    text               TEXT NOT NULL,
    sort_order         INTEGER NOT NULL,
    UNIQUE (work_experience_id, sort_order)
);

-- ── Overlay ─────────────────────────────────────────────────────────────────

-- BINARY collation: name uniqueness is case-sensitive.
CREATE TABLE IF NOT EXISTS scoped_resumes (
    scoped_resume_id TEXT PRIMARY KEY,
    name             TEXT NOT NULL UNIQUE,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS scoped_summary_overrides (
    override_id      TEXT PRIMARY KEY,
    scoped_resume_id TEXT NOT NULL UNIQUE REFERENCES scoped_resumes(scoped_resume_id),
    text             TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS scoped_skill_inclusions (
    inclusion_id     TEXT PRIMARY KEY,
    scoped_resume_id TEXT NOT NULL REFERENCES scoped_resumes(scoped_resume_id),
    skill_id         TEXT NOT NULL,
    UNIQUE (scoped_resume_id, skill_id)
);

CREATE TABLE IF NOT EXISTS scoped_work_experience_inclusions (
    inclusion_id       TEXT PRIMARY KEY,
    scoped_resume_id   TEXT NOT NULL REFERENCES scoped_resumes(scoped_resume_id),
    work_experience_id TEXT NOT NULL,
    UNIQUE (scoped_resume_id, work_experience_id)
);

CREATE TABLE IF NOT EXISTS scoped_line_overrides (
    override_id      TEXT PRIMARY KEY,
    scoped_resume_id TEXT NOT NULL REFERENCES scoped_resumes(scoped_resume_id),
    line_id          TEXT NOT NULL,
    text             TEXT NOT NULL,
    UNIQUE (scoped_resume_id, line_id)
);

-- Guard lookups filter by the referenced base id alone.
CREATE INDEX IF NOT EXISTS skill_inclusions_skill_idx ON scoped_skill_inclusions(skill_id);
CREATE INDEX IF NOT EXISTS we_inclusions_we_idx       ON scoped_work_experience_inclusions(work_experience_id);
CREATE INDEX IF NOT EXISTS line_overrides_line_idx    ON scoped_line_overrides(line_id);
CREATE INDEX IF NOT EXISTS skills_category_idx        ON skills(category_id);
CREATE INDEX IF NOT EXISTS skills_subcategory_idx     ON skills(subcategory_id);

PRAGMA user_version = 1;
";
