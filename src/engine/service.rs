use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::db::{
    CourseEnrollment, CourseLevel, DatabaseError, EnrollmentProgressEntry, LevelProgress,
    ProgressUpdate,
};
use crate::engine::store::ProgressionStore;
use crate::engine::{evaluator, promotion};
use crate::error::{EngineError, EngineResult};

/// Result of a progress write: the re-read record and whether the write
/// triggered a promotion or course completion.
#[derive(Debug, Serialize)]
pub struct ProgressOutcome {
    pub progress: LevelProgress,
    pub promoted: bool,
}

/// The engine's request-layer surface. Stateless; every operation runs
/// against a caller-provided store scoped to one logical transaction.
pub struct ProgressionService;

impl ProgressionService {
    /// Enroll a learner in a course, or reactivate a withdrawn
    /// enrollment. Reactivation preserves the current level and all
    /// progress records. A true first enrollment starts at level 1 (or
    /// nowhere, for a course without levels) with a zeroed progress
    /// record. Never triggers a promotion check.
    pub async fn create_or_reactivate_enrollment<S: ProgressionStore>(
        store: &mut S,
        learner_id: Uuid,
        course_id: Uuid,
    ) -> EngineResult<CourseEnrollment> {
        if store.fetch_learner(learner_id).await?.is_none() {
            return Err(EngineError::not_found("learner", learner_id));
        }
        let course = store
            .fetch_course(course_id)
            .await?
            .ok_or_else(|| EngineError::not_found("course", course_id))?;

        if let Some(existing) = store.find_enrollment(learner_id, course_id).await? {
            return Self::reactivate(store, existing).await;
        }

        let first_level = store.first_level(course.id).await?;
        let enrollment =
            CourseEnrollment::new(learner_id, course.id, first_level.as_ref().map(|l| l.id));

        match store.insert_enrollment(&enrollment).await {
            Ok(()) => {}
            // Lost a race against a concurrent enrollment for the same
            // pair: fall back to reactivating the winner's row instead of
            // surfacing the constraint error.
            Err(DatabaseError::Duplicate) => {
                let existing = store
                    .find_enrollment(learner_id, course_id)
                    .await?
                    .ok_or(DatabaseError::NotFound)?;
                return Self::reactivate(store, existing).await;
            }
            Err(err) => return Err(err.into()),
        }

        if let Some(level) = first_level {
            store.get_or_create_progress(enrollment.id, level.id).await?;
        }

        info!(
            enrollment_id = %enrollment.id,
            learner_id = %learner_id,
            course_id = %course_id,
            "learner enrolled"
        );
        Ok(enrollment)
    }

    async fn reactivate<S: ProgressionStore>(
        store: &mut S,
        mut enrollment: CourseEnrollment,
    ) -> EngineResult<CourseEnrollment> {
        if !enrollment.is_active {
            enrollment.is_active = true;
            enrollment.updated_at = OffsetDateTime::now_utc();
            store.save_enrollment(&enrollment).await?;
            info!(enrollment_id = %enrollment.id, "enrollment reactivated");
        }
        Ok(enrollment)
    }

    /// Apply reported counters to a progress record and run the
    /// promotion check on the owning enrollment.
    ///
    /// Module and artifact counts replace the stored values as given;
    /// the assessment score only ever rises (best score seen wins).
    pub async fn update_progress<S: ProgressionStore>(
        store: &mut S,
        progress_id: Uuid,
        update: ProgressUpdate,
    ) -> EngineResult<ProgressOutcome> {
        let mut progress = store
            .fetch_progress(progress_id)
            .await?
            .ok_or_else(|| EngineError::not_found("progress record", progress_id))?;

        if let Some(modules) = update.modules_completed {
            progress.modules_completed = modules;
        }
        if let Some(artifacts) = update.artifacts_submitted {
            progress.artifacts_submitted = artifacts;
        }
        if let Some(score) = update.assessment_score {
            if score > progress.assessment_score {
                progress.assessment_score = score;
            }
        }
        if let Some(confirmed) = update.teacher_confirmed {
            progress.teacher_confirmed = confirmed;
        }
        progress.updated_at = OffsetDateTime::now_utc();
        store.save_progress(&progress).await?;

        let promoted = promotion::check_and_promote(store, progress.enrollment_id).await?;

        // Re-read: the promotion check may have marked the record
        // completed.
        let progress = store
            .fetch_progress(progress_id)
            .await?
            .ok_or_else(|| EngineError::not_found("progress record", progress_id))?;

        Ok(ProgressOutcome { progress, promoted })
    }

    /// Teacher confirms level completion, then the same promotion check.
    pub async fn confirm_completion<S: ProgressionStore>(
        store: &mut S,
        progress_id: Uuid,
    ) -> EngineResult<ProgressOutcome> {
        Self::update_progress(
            store,
            progress_id,
            ProgressUpdate {
                teacher_confirmed: Some(true),
                ..ProgressUpdate::default()
            },
        )
        .await
    }

    /// Every level of the enrollment's course in order, each with the
    /// learner's progress record (if the level has been reached) and its
    /// completion percentage.
    pub async fn get_enrollment_progress<S: ProgressionStore>(
        store: &mut S,
        enrollment_id: Uuid,
    ) -> EngineResult<Vec<EnrollmentProgressEntry>> {
        let enrollment = store
            .fetch_enrollment(enrollment_id)
            .await?
            .ok_or_else(|| EngineError::not_found("enrollment", enrollment_id))?;

        let levels = store.levels_for_course(enrollment.course_id).await?;
        let records = store.progress_for_enrollment(enrollment.id).await?;

        let entries = levels
            .into_iter()
            .map(|level| {
                let progress = records.iter().find(|r| r.level_id == level.id).cloned();
                let completion_percentage = progress
                    .as_ref()
                    .map(|p| evaluator::completion_percentage(&level, p))
                    .unwrap_or(0);
                EnrollmentProgressEntry {
                    level,
                    progress,
                    completion_percentage,
                }
            })
            .collect();

        Ok(entries)
    }

    /// The levels this enrollment has completed, in level order.
    pub async fn get_completed_levels<S: ProgressionStore>(
        store: &mut S,
        enrollment_id: Uuid,
    ) -> EngineResult<Vec<(CourseLevel, LevelProgress)>> {
        let entries = Self::get_enrollment_progress(store, enrollment_id).await?;
        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                let progress = entry.progress?;
                progress.completed.then_some((entry.level, progress))
            })
            .collect())
    }
}
