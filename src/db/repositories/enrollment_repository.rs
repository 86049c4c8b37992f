use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::db::models::CourseEnrollment;
use crate::db::DatabaseError;

const ENROLLMENT_COLUMNS: &str = "id, learner_id, course_id, current_level_id, enrolled_at, \
     completed_at, is_active, created_at, updated_at";

pub struct EnrollmentRepository;

impl EnrollmentRepository {
    /// Fails with `DatabaseError::Duplicate` when an enrollment for the
    /// same (learner, course) pair already exists.
    pub async fn insert_enrollment(
        tx: &mut Transaction<'_, Postgres>,
        enrollment: &CourseEnrollment,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO course_enrollments (
                id, learner_id, course_id, current_level_id, enrolled_at,
                completed_at, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(enrollment.id)
        .bind(enrollment.learner_id)
        .bind(enrollment.course_id)
        .bind(enrollment.current_level_id)
        .bind(enrollment.enrolled_at)
        .bind(enrollment.completed_at)
        .bind(enrollment.is_active)
        .bind(enrollment.created_at)
        .bind(enrollment.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }

    pub async fn save_enrollment(
        tx: &mut Transaction<'_, Postgres>,
        enrollment: &CourseEnrollment,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            UPDATE course_enrollments
            SET current_level_id = $1, completed_at = $2, is_active = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(enrollment.current_level_id)
        .bind(enrollment.completed_at)
        .bind(enrollment.is_active)
        .bind(enrollment.updated_at)
        .bind(enrollment.id)
        .execute(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }

    /// Row-locked read: serializes concurrent promotion checks on the
    /// same enrollment for the lifetime of the transaction.
    pub async fn get_enrollment_for_update(
        tx: &mut Transaction<'_, Postgres>,
        enrollment_id: Uuid,
    ) -> Result<Option<CourseEnrollment>, DatabaseError> {
        sqlx::query_as::<_, CourseEnrollment>(&format!(
            "SELECT {} FROM course_enrollments WHERE id = $1 FOR UPDATE",
            ENROLLMENT_COLUMNS
        ))
        .bind(enrollment_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn find_by_learner_and_course(
        tx: &mut Transaction<'_, Postgres>,
        learner_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<CourseEnrollment>, DatabaseError> {
        sqlx::query_as::<_, CourseEnrollment>(&format!(
            "SELECT {} FROM course_enrollments WHERE learner_id = $1 AND course_id = $2",
            ENROLLMENT_COLUMNS
        ))
        .bind(learner_id)
        .bind(course_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn exists_for_course(
        tx: &mut Transaction<'_, Postgres>,
        course_id: Uuid,
    ) -> Result<bool, DatabaseError> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM course_enrollments WHERE course_id = $1)",
        )
        .bind(course_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        Ok(row.0)
    }
}
