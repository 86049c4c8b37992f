use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::db::models::{Course, CourseLevel};
use crate::db::DatabaseError;

const COURSE_COLUMNS: &str =
    "id, tenant_id, name, description, is_active, created_at, updated_at";

const LEVEL_COLUMNS: &str = "id, course_id, level_number, name, description, learning_outcomes, \
     required_modules_count, required_artifacts_count, required_assessment_score, \
     requires_teacher_confirmation, created_at, updated_at";

pub struct CourseRepository;

impl CourseRepository {
    pub async fn insert_course(
        tx: &mut Transaction<'_, Postgres>,
        course: &Course,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO courses (id, tenant_id, name, description, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(course.id)
        .bind(course.tenant_id)
        .bind(&course.name)
        .bind(&course.description)
        .bind(course.is_active)
        .bind(course.created_at)
        .bind(course.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }

    pub async fn save_course(
        tx: &mut Transaction<'_, Postgres>,
        course: &Course,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            UPDATE courses
            SET name = $1, description = $2, is_active = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(&course.name)
        .bind(&course.description)
        .bind(course.is_active)
        .bind(course.updated_at)
        .bind(course.id)
        .execute(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }

    pub async fn get_course(
        tx: &mut Transaction<'_, Postgres>,
        course_id: Uuid,
    ) -> Result<Option<Course>, DatabaseError> {
        sqlx::query_as::<_, Course>(&format!(
            "SELECT {} FROM courses WHERE id = $1",
            COURSE_COLUMNS
        ))
        .bind(course_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    /// Active courses visible to a tenant: global ones plus the tenant's
    /// own.
    pub async fn list_courses(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<Course>, DatabaseError> {
        sqlx::query_as::<_, Course>(&format!(
            r#"
            SELECT {}
            FROM courses
            WHERE is_active = TRUE AND (tenant_id IS NULL OR tenant_id = $1)
            ORDER BY name
            "#,
            COURSE_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn insert_level(
        tx: &mut Transaction<'_, Postgres>,
        level: &CourseLevel,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO course_levels (
                id, course_id, level_number, name, description, learning_outcomes,
                required_modules_count, required_artifacts_count, required_assessment_score,
                requires_teacher_confirmation, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(level.id)
        .bind(level.course_id)
        .bind(level.level_number)
        .bind(&level.name)
        .bind(&level.description)
        .bind(&level.learning_outcomes)
        .bind(level.required_modules_count)
        .bind(level.required_artifacts_count)
        .bind(level.required_assessment_score)
        .bind(level.requires_teacher_confirmation)
        .bind(level.created_at)
        .bind(level.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }

    pub async fn delete_levels(
        tx: &mut Transaction<'_, Postgres>,
        course_id: Uuid,
    ) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM course_levels WHERE course_id = $1")
            .bind(course_id)
            .execute(&mut **tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }

    pub async fn get_level(
        tx: &mut Transaction<'_, Postgres>,
        level_id: Uuid,
    ) -> Result<Option<CourseLevel>, DatabaseError> {
        sqlx::query_as::<_, CourseLevel>(&format!(
            "SELECT {} FROM course_levels WHERE id = $1",
            LEVEL_COLUMNS
        ))
        .bind(level_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn first_level(
        tx: &mut Transaction<'_, Postgres>,
        course_id: Uuid,
    ) -> Result<Option<CourseLevel>, DatabaseError> {
        sqlx::query_as::<_, CourseLevel>(&format!(
            r#"
            SELECT {}
            FROM course_levels
            WHERE course_id = $1
            ORDER BY level_number
            LIMIT 1
            "#,
            LEVEL_COLUMNS
        ))
        .bind(course_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn level_with_number(
        tx: &mut Transaction<'_, Postgres>,
        course_id: Uuid,
        level_number: i32,
    ) -> Result<Option<CourseLevel>, DatabaseError> {
        sqlx::query_as::<_, CourseLevel>(&format!(
            "SELECT {} FROM course_levels WHERE course_id = $1 AND level_number = $2",
            LEVEL_COLUMNS
        ))
        .bind(course_id)
        .bind(level_number)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn levels_for_course(
        tx: &mut Transaction<'_, Postgres>,
        course_id: Uuid,
    ) -> Result<Vec<CourseLevel>, DatabaseError> {
        sqlx::query_as::<_, CourseLevel>(&format!(
            r#"
            SELECT {}
            FROM course_levels
            WHERE course_id = $1
            ORDER BY level_number
            "#,
            LEVEL_COLUMNS
        ))
        .bind(course_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)
    }
}
