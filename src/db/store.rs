use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::db::repositories::{
    CourseRepository, EnrollmentRepository, LearnerRepository, ProgressRepository,
};
use crate::db::{
    Course, CourseEnrollment, CourseLevel, DatabaseError, Learner, LevelProgress,
};
use crate::engine::ProgressionStore;

/// Postgres-backed `ProgressionStore` scoped to one transaction.
///
/// Enrollment reads take a row lock, so the read-evaluate-write sequence
/// of a promotion check is serialized per enrollment for as long as the
/// store lives. Call `commit` to publish, or drop to roll back.
pub struct PgStore {
    tx: Transaction<'static, Postgres>,
}

impl PgStore {
    pub async fn begin(pool: &PgPool) -> Result<Self, DatabaseError> {
        let tx = pool.begin().await.map_err(DatabaseError::from_sqlx)?;
        Ok(PgStore { tx })
    }

    pub async fn commit(self) -> Result<(), DatabaseError> {
        self.tx.commit().await.map_err(DatabaseError::from_sqlx)
    }

    pub async fn rollback(self) -> Result<(), DatabaseError> {
        self.tx.rollback().await.map_err(DatabaseError::from_sqlx)
    }
}

#[async_trait]
impl ProgressionStore for PgStore {
    async fn fetch_learner(&mut self, id: Uuid) -> Result<Option<Learner>, DatabaseError> {
        LearnerRepository::get_learner_by_id(&mut self.tx, id).await
    }

    async fn fetch_course(&mut self, id: Uuid) -> Result<Option<Course>, DatabaseError> {
        CourseRepository::get_course(&mut self.tx, id).await
    }

    async fn insert_course(&mut self, course: &Course) -> Result<(), DatabaseError> {
        CourseRepository::insert_course(&mut self.tx, course).await
    }

    async fn save_course(&mut self, course: &Course) -> Result<(), DatabaseError> {
        CourseRepository::save_course(&mut self.tx, course).await
    }

    async fn list_courses(
        &mut self,
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<Course>, DatabaseError> {
        CourseRepository::list_courses(&mut self.tx, tenant_id).await
    }

    async fn fetch_level(&mut self, id: Uuid) -> Result<Option<CourseLevel>, DatabaseError> {
        CourseRepository::get_level(&mut self.tx, id).await
    }

    async fn first_level(
        &mut self,
        course_id: Uuid,
    ) -> Result<Option<CourseLevel>, DatabaseError> {
        CourseRepository::first_level(&mut self.tx, course_id).await
    }

    async fn level_after(
        &mut self,
        course_id: Uuid,
        after: i32,
    ) -> Result<Option<CourseLevel>, DatabaseError> {
        CourseRepository::level_with_number(&mut self.tx, course_id, after + 1).await
    }

    async fn levels_for_course(
        &mut self,
        course_id: Uuid,
    ) -> Result<Vec<CourseLevel>, DatabaseError> {
        CourseRepository::levels_for_course(&mut self.tx, course_id).await
    }

    async fn insert_level(&mut self, level: &CourseLevel) -> Result<(), DatabaseError> {
        CourseRepository::insert_level(&mut self.tx, level).await
    }

    async fn delete_levels(&mut self, course_id: Uuid) -> Result<(), DatabaseError> {
        CourseRepository::delete_levels(&mut self.tx, course_id).await
    }

    async fn fetch_enrollment(
        &mut self,
        id: Uuid,
    ) -> Result<Option<CourseEnrollment>, DatabaseError> {
        EnrollmentRepository::get_enrollment_for_update(&mut self.tx, id).await
    }

    async fn find_enrollment(
        &mut self,
        learner_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<CourseEnrollment>, DatabaseError> {
        EnrollmentRepository::find_by_learner_and_course(&mut self.tx, learner_id, course_id)
            .await
    }

    async fn insert_enrollment(
        &mut self,
        enrollment: &CourseEnrollment,
    ) -> Result<(), DatabaseError> {
        EnrollmentRepository::insert_enrollment(&mut self.tx, enrollment).await
    }

    async fn save_enrollment(
        &mut self,
        enrollment: &CourseEnrollment,
    ) -> Result<(), DatabaseError> {
        EnrollmentRepository::save_enrollment(&mut self.tx, enrollment).await
    }

    async fn course_has_enrollments(
        &mut self,
        course_id: Uuid,
    ) -> Result<bool, DatabaseError> {
        EnrollmentRepository::exists_for_course(&mut self.tx, course_id).await
    }

    async fn fetch_progress(
        &mut self,
        id: Uuid,
    ) -> Result<Option<LevelProgress>, DatabaseError> {
        ProgressRepository::get_progress(&mut self.tx, id).await
    }

    async fn progress_for_level(
        &mut self,
        enrollment_id: Uuid,
        level_id: Uuid,
    ) -> Result<Option<LevelProgress>, DatabaseError> {
        ProgressRepository::get_for_level(&mut self.tx, enrollment_id, level_id).await
    }

    async fn get_or_create_progress(
        &mut self,
        enrollment_id: Uuid,
        level_id: Uuid,
    ) -> Result<LevelProgress, DatabaseError> {
        ProgressRepository::get_or_create(&mut self.tx, enrollment_id, level_id).await
    }

    async fn save_progress(&mut self, progress: &LevelProgress) -> Result<(), DatabaseError> {
        ProgressRepository::save_progress(&mut self.tx, progress).await
    }

    async fn progress_for_enrollment(
        &mut self,
        enrollment_id: Uuid,
    ) -> Result<Vec<LevelProgress>, DatabaseError> {
        ProgressRepository::list_for_enrollment(&mut self.tx, enrollment_id).await
    }
}
