use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::evaluator;
use crate::engine::store::ProgressionStore;
use crate::error::{EngineError, EngineResult};

/// Check the current level's progress record and promote the enrollment
/// if every completion criterion is met.
///
/// Returns whether a promotion or course-completion event occurred. Safe
/// to call redundantly: once the learner has completed the course this is
/// a no-op returning `false`, and the completion timestamps never move.
pub async fn check_and_promote<S: ProgressionStore>(
    store: &mut S,
    enrollment_id: Uuid,
) -> EngineResult<bool> {
    let Some(mut enrollment) = store.fetch_enrollment(enrollment_id).await? else {
        return Err(EngineError::not_found("enrollment", enrollment_id));
    };

    // Courses without levels have nothing to promote through.
    let Some(current_level_id) = enrollment.current_level_id else {
        return Ok(false);
    };

    let level = store
        .fetch_level(current_level_id)
        .await?
        .ok_or_else(|| EngineError::not_found("course level", current_level_id))?;

    // A record should always exist once a level is current.
    let Some(mut progress) = store.progress_for_level(enrollment.id, level.id).await? else {
        debug!(
            enrollment_id = %enrollment.id,
            level_number = level.level_number,
            "no progress record for current level, skipping promotion check"
        );
        return Ok(false);
    };

    if !evaluator::is_complete(&level, &progress) {
        return Ok(false);
    }

    let now = OffsetDateTime::now_utc();

    // Mark the current level completed. Skipped when already set so a
    // redundant check never re-timestamps the record.
    if !progress.completed {
        progress.completed = true;
        progress.completed_at = Some(now);
        progress.updated_at = now;
        store.save_progress(&progress).await?;
    }

    match store
        .level_after(enrollment.course_id, level.level_number)
        .await?
    {
        Some(next) => {
            enrollment.current_level_id = Some(next.id);
            enrollment.updated_at = now;
            store.save_enrollment(&enrollment).await?;

            // Reuses an existing record, so prior partial progress on the
            // next level survives a demote/re-promote cycle.
            store.get_or_create_progress(enrollment.id, next.id).await?;

            info!(
                enrollment_id = %enrollment.id,
                from_level = level.level_number,
                to_level = next.level_number,
                "learner promoted to next level"
            );
            Ok(true)
        }
        None => {
            // Final level. Stamp course completion once; later re-checks
            // leave the timestamp alone and report no event.
            if enrollment.completed_at.is_some() {
                return Ok(false);
            }
            enrollment.completed_at = Some(now);
            enrollment.updated_at = now;
            store.save_enrollment(&enrollment).await?;

            info!(
                enrollment_id = %enrollment.id,
                final_level = level.level_number,
                "course completed"
            );
            Ok(true)
        }
    }
}
