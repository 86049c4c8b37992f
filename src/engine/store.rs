use async_trait::async_trait;
use uuid::Uuid;

use crate::db::{
    Course, CourseEnrollment, CourseLevel, DatabaseError, Learner, LevelProgress,
};

/// Abstract repository the progression engine runs against.
///
/// One store instance corresponds to one logical transaction scope: the
/// caller serializes writes per enrollment (the Postgres implementation
/// row-locks the enrollment, the in-memory one relies on `&mut`
/// exclusivity). The engine itself performs no locking.
#[async_trait]
pub trait ProgressionStore {
    async fn fetch_learner(&mut self, id: Uuid) -> Result<Option<Learner>, DatabaseError>;

    async fn fetch_course(&mut self, id: Uuid) -> Result<Option<Course>, DatabaseError>;
    async fn insert_course(&mut self, course: &Course) -> Result<(), DatabaseError>;
    async fn save_course(&mut self, course: &Course) -> Result<(), DatabaseError>;
    async fn list_courses(
        &mut self,
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<Course>, DatabaseError>;

    async fn fetch_level(&mut self, id: Uuid) -> Result<Option<CourseLevel>, DatabaseError>;
    async fn first_level(&mut self, course_id: Uuid)
        -> Result<Option<CourseLevel>, DatabaseError>;
    /// The level with `level_number = after + 1`, if the course has one.
    async fn level_after(
        &mut self,
        course_id: Uuid,
        after: i32,
    ) -> Result<Option<CourseLevel>, DatabaseError>;
    async fn levels_for_course(
        &mut self,
        course_id: Uuid,
    ) -> Result<Vec<CourseLevel>, DatabaseError>;
    async fn insert_level(&mut self, level: &CourseLevel) -> Result<(), DatabaseError>;
    async fn delete_levels(&mut self, course_id: Uuid) -> Result<(), DatabaseError>;

    async fn fetch_enrollment(
        &mut self,
        id: Uuid,
    ) -> Result<Option<CourseEnrollment>, DatabaseError>;
    async fn find_enrollment(
        &mut self,
        learner_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<CourseEnrollment>, DatabaseError>;
    /// Fails with `DatabaseError::Duplicate` when the (learner, course)
    /// uniqueness constraint is violated.
    async fn insert_enrollment(
        &mut self,
        enrollment: &CourseEnrollment,
    ) -> Result<(), DatabaseError>;
    async fn save_enrollment(
        &mut self,
        enrollment: &CourseEnrollment,
    ) -> Result<(), DatabaseError>;
    async fn course_has_enrollments(&mut self, course_id: Uuid) -> Result<bool, DatabaseError>;

    async fn fetch_progress(&mut self, id: Uuid)
        -> Result<Option<LevelProgress>, DatabaseError>;
    async fn progress_for_level(
        &mut self,
        enrollment_id: Uuid,
        level_id: Uuid,
    ) -> Result<Option<LevelProgress>, DatabaseError>;
    /// Idempotent create: reuses an existing (enrollment, level) record so
    /// a learner re-entering a level keeps prior partial progress.
    async fn get_or_create_progress(
        &mut self,
        enrollment_id: Uuid,
        level_id: Uuid,
    ) -> Result<LevelProgress, DatabaseError>;
    async fn save_progress(&mut self, progress: &LevelProgress) -> Result<(), DatabaseError>;
    async fn progress_for_enrollment(
        &mut self,
        enrollment_id: Uuid,
    ) -> Result<Vec<LevelProgress>, DatabaseError>;
}
