//! The storage traits.
//!
//! [`ResumeStore`] is the base record store: plain CRUD over the summary,
//! skill taxonomy, skills and work history. [`ScopedResumeStore`] layers the
//! overlay on top of it. Both are implemented by storage backends (e.g.
//! `folio-store-sqlite`); higher layers (`folio-api`) depend only on these
//! abstractions.
//!
//! Every method runs as one atomic unit: a failure leaves no partial writes.

use std::future::Future;

use uuid::Uuid;

use crate::{
  StoreError,
  base::{
    NewSkill, NewWorkExperience, ProfessionalSummary, Skill, SkillCategory,
    SkillSubcategory, WorkExperience, WorkExperienceLine,
  },
  effective::EffectiveResume,
  guard::GuardedEntity,
  scoped::{
    LineOverride, ScopedResume, ScopedResumeSetup, SkillInclusion, SummaryOverride,
    WorkExperienceInclusion,
  },
};

// ─── Base store ──────────────────────────────────────────────────────────────

/// Abstraction over the base resume records.
///
/// Destructive operations consult the integrity guard and fail with
/// [`crate::Error::Conflict`] while any scoped resume still references the
/// record.
pub trait ResumeStore: Send + Sync {
  type Error: StoreError;

  // ── Summary ───────────────────────────────────────────────────────────

  /// The single professional summary, if one has been written.
  fn get_summary(
    &self,
  ) -> impl Future<Output = Result<Option<ProfessionalSummary>, Self::Error>> + Send + '_;

  /// Create or replace the professional summary text.
  fn set_summary(
    &self,
    text: String,
  ) -> impl Future<Output = Result<ProfessionalSummary, Self::Error>> + Send + '_;

  fn clear_summary(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Taxonomy ──────────────────────────────────────────────────────────

  fn add_category(
    &self,
    name: String,
  ) -> impl Future<Output = Result<SkillCategory, Self::Error>> + Send + '_;

  fn list_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<SkillCategory>, Self::Error>> + Send + '_;

  /// Refused while any skill uses the category.
  fn delete_category(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn add_subcategory(
    &self,
    name: String,
  ) -> impl Future<Output = Result<SkillSubcategory, Self::Error>> + Send + '_;

  fn list_subcategories(
    &self,
  ) -> impl Future<Output = Result<Vec<SkillSubcategory>, Self::Error>> + Send + '_;

  /// Refused while any skill uses the subcategory.
  fn delete_subcategory(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Skills ────────────────────────────────────────────────────────────

  /// Returns `NotFound` if the category or subcategory does not exist.
  fn add_skill(
    &self,
    input: NewSkill,
  ) -> impl Future<Output = Result<Skill, Self::Error>> + Send + '_;

  fn get_skill(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Skill>, Self::Error>> + Send + '_;

  /// All skills, ordered by name.
  fn list_skills(&self) -> impl Future<Output = Result<Vec<Skill>, Self::Error>> + Send + '_;

  /// The subset of `ids` that exist, ordered by name. Unknown ids are
  /// silently skipped.
  fn list_skills_by_ids(
    &self,
    ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<Vec<Skill>, Self::Error>> + Send + '_;

  fn update_skill(
    &self,
    id: Uuid,
    input: NewSkill,
  ) -> impl Future<Output = Result<Skill, Self::Error>> + Send + '_;

  fn delete_skill(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Work history ──────────────────────────────────────────────────────

  fn add_work_experience(
    &self,
    input: NewWorkExperience,
  ) -> impl Future<Output = Result<WorkExperience, Self::Error>> + Send + '_;

  fn get_work_experience(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<WorkExperience>, Self::Error>> + Send + '_;

  /// All work experiences, most recent first.
  fn list_work_experiences(
    &self,
  ) -> impl Future<Output = Result<Vec<WorkExperience>, Self::Error>> + Send + '_;

  fn update_work_experience(
    &self,
    id: Uuid,
    input: NewWorkExperience,
  ) -> impl Future<Output = Result<WorkExperience, Self::Error>> + Send + '_;

  /// Deletes the work experience together with its lines.
  fn delete_work_experience(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Append a line after the current last line of `work_experience_id`.
  fn add_line(
    &self,
    work_experience_id: Uuid,
    text: String,
  ) -> impl Future<Output = Result<WorkExperienceLine, Self::Error>> + Send + '_;

  fn get_line(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<WorkExperienceLine>, Self::Error>> + Send + '_;

  /// Lines of a work experience ordered by `sort_order`. `NotFound` if the
  /// work experience does not exist.
  fn list_lines(
    &self,
    work_experience_id: Uuid,
  ) -> impl Future<Output = Result<Vec<WorkExperienceLine>, Self::Error>> + Send + '_;

  fn update_line(
    &self,
    id: Uuid,
    text: String,
  ) -> impl Future<Output = Result<WorkExperienceLine, Self::Error>> + Send + '_;

  /// Rewrite `sort_order` so lines appear in the order given. `line_ids` must
  /// be a permutation of the work experience's current lines.
  fn reorder_lines(
    &self,
    work_experience_id: Uuid,
    line_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<Vec<WorkExperienceLine>, Self::Error>> + Send + '_;

  fn delete_line(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Guard ─────────────────────────────────────────────────────────────

  /// `false` while anything still references `entity`. Knows only *that* a
  /// reference exists, not which scoped resume holds it.
  fn can_delete(
    &self,
    entity: GuardedEntity,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Overlay store ───────────────────────────────────────────────────────────

/// Abstraction over scoped resumes and their overlays.
pub trait ScopedResumeStore: ResumeStore {
  // ── Reads ─────────────────────────────────────────────────────────────

  /// All scoped resumes, ordered by name.
  fn list_scoped_resumes(
    &self,
  ) -> impl Future<Output = Result<Vec<ScopedResume>, Self::Error>> + Send + '_;

  fn get_scoped_resume(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ScopedResume>, Self::Error>> + Send + '_;

  /// Compute the effective view of a scoped resume from the current overlay
  /// and base records. Returns `None` if the scoped resume does not exist.
  fn resolve(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<EffectiveResume>, Self::Error>> + Send + '_;

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// Create a scoped resume with an empty overlay.
  fn create_scoped_resume(
    &self,
    name: String,
  ) -> impl Future<Output = Result<ScopedResume, Self::Error>> + Send + '_;

  /// Create a scoped resume together with its summary override and
  /// inclusions. Any unknown skill or work-experience id aborts the whole
  /// creation with `NotFound`.
  fn create_scoped_resume_with_setup(
    &self,
    setup: ScopedResumeSetup,
  ) -> impl Future<Output = Result<ScopedResume, Self::Error>> + Send + '_;

  fn rename_scoped_resume(
    &self,
    id: Uuid,
    name: String,
  ) -> impl Future<Output = Result<ScopedResume, Self::Error>> + Send + '_;

  /// Deep-copy the overlay of `id` into a new scoped resume named `name`.
  /// The copy shares no rows with the source.
  fn duplicate_scoped_resume(
    &self,
    id: Uuid,
    name: String,
  ) -> impl Future<Output = Result<ScopedResume, Self::Error>> + Send + '_;

  /// Delete the scoped resume and every overlay row it owns.
  fn delete_scoped_resume(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Summary override ──────────────────────────────────────────────────

  fn set_summary_override(
    &self,
    id: Uuid,
    text: String,
  ) -> impl Future<Output = Result<SummaryOverride, Self::Error>> + Send + '_;

  /// Succeeds when no override exists; fails only if the scoped resume does.
  fn clear_summary_override(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Inclusions ────────────────────────────────────────────────────────

  fn add_skill_inclusion(
    &self,
    id: Uuid,
    skill_id: Uuid,
  ) -> impl Future<Output = Result<SkillInclusion, Self::Error>> + Send + '_;

  fn remove_skill_inclusion(
    &self,
    id: Uuid,
    skill_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn add_work_experience_inclusion(
    &self,
    id: Uuid,
    work_experience_id: Uuid,
  ) -> impl Future<Output = Result<WorkExperienceInclusion, Self::Error>> + Send + '_;

  /// Also deletes this scoped resume's line overrides for the work
  /// experience's lines.
  fn remove_work_experience_inclusion(
    &self,
    id: Uuid,
    work_experience_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Line overrides ────────────────────────────────────────────────────

  fn set_line_override(
    &self,
    id: Uuid,
    line_id: Uuid,
    text: String,
  ) -> impl Future<Output = Result<LineOverride, Self::Error>> + Send + '_;

  /// A no-op when no override exists for the line.
  fn clear_line_override(
    &self,
    id: Uuid,
    line_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
