use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::db::models::LevelProgress;
use crate::db::DatabaseError;

const PROGRESS_COLUMNS: &str = "id, enrollment_id, level_id, modules_completed, \
     artifacts_submitted, assessment_score, teacher_confirmed, completed, completed_at, \
     started_at, updated_at";

pub struct ProgressRepository;

impl ProgressRepository {
    pub async fn get_progress(
        tx: &mut Transaction<'_, Postgres>,
        progress_id: Uuid,
    ) -> Result<Option<LevelProgress>, DatabaseError> {
        sqlx::query_as::<_, LevelProgress>(&format!(
            "SELECT {} FROM level_progress WHERE id = $1",
            PROGRESS_COLUMNS
        ))
        .bind(progress_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn get_for_level(
        tx: &mut Transaction<'_, Postgres>,
        enrollment_id: Uuid,
        level_id: Uuid,
    ) -> Result<Option<LevelProgress>, DatabaseError> {
        sqlx::query_as::<_, LevelProgress>(&format!(
            "SELECT {} FROM level_progress WHERE enrollment_id = $1 AND level_id = $2",
            PROGRESS_COLUMNS
        ))
        .bind(enrollment_id)
        .bind(level_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    /// Idempotent create for one (enrollment, level) pair. The insert
    /// backs off on conflict so a concurrent promotion cannot produce a
    /// second record; either way the surviving row is returned.
    pub async fn get_or_create(
        tx: &mut Transaction<'_, Postgres>,
        enrollment_id: Uuid,
        level_id: Uuid,
    ) -> Result<LevelProgress, DatabaseError> {
        let fresh = LevelProgress::fresh(enrollment_id, level_id);
        sqlx::query(
            r#"
            INSERT INTO level_progress (
                id, enrollment_id, level_id, modules_completed, artifacts_submitted,
                assessment_score, teacher_confirmed, completed, completed_at,
                started_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (enrollment_id, level_id) DO NOTHING
            "#,
        )
        .bind(fresh.id)
        .bind(fresh.enrollment_id)
        .bind(fresh.level_id)
        .bind(fresh.modules_completed)
        .bind(fresh.artifacts_submitted)
        .bind(fresh.assessment_score)
        .bind(fresh.teacher_confirmed)
        .bind(fresh.completed)
        .bind(fresh.completed_at)
        .bind(fresh.started_at)
        .bind(fresh.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Self::get_for_level(tx, enrollment_id, level_id)
            .await?
            .ok_or(DatabaseError::NotFound)
    }

    pub async fn save_progress(
        tx: &mut Transaction<'_, Postgres>,
        progress: &LevelProgress,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            UPDATE level_progress
            SET modules_completed = $1, artifacts_submitted = $2, assessment_score = $3,
                teacher_confirmed = $4, completed = $5, completed_at = $6, updated_at = $7
            WHERE id = $8
            "#,
        )
        .bind(progress.modules_completed)
        .bind(progress.artifacts_submitted)
        .bind(progress.assessment_score)
        .bind(progress.teacher_confirmed)
        .bind(progress.completed)
        .bind(progress.completed_at)
        .bind(progress.updated_at)
        .bind(progress.id)
        .execute(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }

    pub async fn list_for_enrollment(
        tx: &mut Transaction<'_, Postgres>,
        enrollment_id: Uuid,
    ) -> Result<Vec<LevelProgress>, DatabaseError> {
        sqlx::query_as::<_, LevelProgress>(&format!(
            r#"
            SELECT {}
            FROM level_progress
            WHERE enrollment_id = $1
            ORDER BY started_at
            "#,
            PROGRESS_COLUMNS
        ))
        .bind(enrollment_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)
    }
}
