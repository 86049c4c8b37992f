use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::{
    Course, CourseEnrollment, CourseLevel, DatabaseError, Learner, LevelProgress,
};
use crate::engine::store::ProgressionStore;

/// In-memory `ProgressionStore` used by the test suite and by embedders
/// that do not need Postgres. Uniqueness constraints mirror the
/// relational layout.
#[derive(Debug, Default)]
pub struct MemoryStore {
    learners: HashMap<Uuid, Learner>,
    courses: HashMap<Uuid, Course>,
    levels: HashMap<Uuid, CourseLevel>,
    enrollments: HashMap<Uuid, CourseEnrollment>,
    progress: HashMap<Uuid, LevelProgress>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_learner(&mut self, learner: Learner) -> Uuid {
        let id = learner.id;
        self.learners.insert(id, learner);
        id
    }
}

#[async_trait]
impl ProgressionStore for MemoryStore {
    async fn fetch_learner(&mut self, id: Uuid) -> Result<Option<Learner>, DatabaseError> {
        Ok(self.learners.get(&id).cloned())
    }

    async fn fetch_course(&mut self, id: Uuid) -> Result<Option<Course>, DatabaseError> {
        Ok(self.courses.get(&id).cloned())
    }

    async fn insert_course(&mut self, course: &Course) -> Result<(), DatabaseError> {
        self.courses.insert(course.id, course.clone());
        Ok(())
    }

    async fn save_course(&mut self, course: &Course) -> Result<(), DatabaseError> {
        self.courses.insert(course.id, course.clone());
        Ok(())
    }

    async fn list_courses(
        &mut self,
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<Course>, DatabaseError> {
        let mut courses: Vec<Course> = self
            .courses
            .values()
            .filter(|c| c.is_active && (c.tenant_id.is_none() || c.tenant_id == tenant_id))
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(courses)
    }

    async fn fetch_level(&mut self, id: Uuid) -> Result<Option<CourseLevel>, DatabaseError> {
        Ok(self.levels.get(&id).cloned())
    }

    async fn first_level(
        &mut self,
        course_id: Uuid,
    ) -> Result<Option<CourseLevel>, DatabaseError> {
        Ok(self
            .levels
            .values()
            .filter(|l| l.course_id == course_id)
            .min_by_key(|l| l.level_number)
            .cloned())
    }

    async fn level_after(
        &mut self,
        course_id: Uuid,
        after: i32,
    ) -> Result<Option<CourseLevel>, DatabaseError> {
        Ok(self
            .levels
            .values()
            .find(|l| l.course_id == course_id && l.level_number == after + 1)
            .cloned())
    }

    async fn levels_for_course(
        &mut self,
        course_id: Uuid,
    ) -> Result<Vec<CourseLevel>, DatabaseError> {
        let mut levels: Vec<CourseLevel> = self
            .levels
            .values()
            .filter(|l| l.course_id == course_id)
            .cloned()
            .collect();
        levels.sort_by_key(|l| l.level_number);
        Ok(levels)
    }

    async fn insert_level(&mut self, level: &CourseLevel) -> Result<(), DatabaseError> {
        let clash = self
            .levels
            .values()
            .any(|l| l.course_id == level.course_id && l.level_number == level.level_number);
        if clash {
            return Err(DatabaseError::Duplicate);
        }
        self.levels.insert(level.id, level.clone());
        Ok(())
    }

    async fn delete_levels(&mut self, course_id: Uuid) -> Result<(), DatabaseError> {
        self.levels.retain(|_, l| l.course_id != course_id);
        Ok(())
    }

    async fn fetch_enrollment(
        &mut self,
        id: Uuid,
    ) -> Result<Option<CourseEnrollment>, DatabaseError> {
        Ok(self.enrollments.get(&id).cloned())
    }

    async fn find_enrollment(
        &mut self,
        learner_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<CourseEnrollment>, DatabaseError> {
        Ok(self
            .enrollments
            .values()
            .find(|e| e.learner_id == learner_id && e.course_id == course_id)
            .cloned())
    }

    async fn insert_enrollment(
        &mut self,
        enrollment: &CourseEnrollment,
    ) -> Result<(), DatabaseError> {
        let clash = self.enrollments.values().any(|e| {
            e.learner_id == enrollment.learner_id && e.course_id == enrollment.course_id
        });
        if clash {
            return Err(DatabaseError::Duplicate);
        }
        self.enrollments.insert(enrollment.id, enrollment.clone());
        Ok(())
    }

    async fn save_enrollment(
        &mut self,
        enrollment: &CourseEnrollment,
    ) -> Result<(), DatabaseError> {
        self.enrollments.insert(enrollment.id, enrollment.clone());
        Ok(())
    }

    async fn course_has_enrollments(
        &mut self,
        course_id: Uuid,
    ) -> Result<bool, DatabaseError> {
        Ok(self.enrollments.values().any(|e| e.course_id == course_id))
    }

    async fn fetch_progress(
        &mut self,
        id: Uuid,
    ) -> Result<Option<LevelProgress>, DatabaseError> {
        Ok(self.progress.get(&id).cloned())
    }

    async fn progress_for_level(
        &mut self,
        enrollment_id: Uuid,
        level_id: Uuid,
    ) -> Result<Option<LevelProgress>, DatabaseError> {
        Ok(self
            .progress
            .values()
            .find(|p| p.enrollment_id == enrollment_id && p.level_id == level_id)
            .cloned())
    }

    async fn get_or_create_progress(
        &mut self,
        enrollment_id: Uuid,
        level_id: Uuid,
    ) -> Result<LevelProgress, DatabaseError> {
        if let Some(existing) = self
            .progress
            .values()
            .find(|p| p.enrollment_id == enrollment_id && p.level_id == level_id)
        {
            return Ok(existing.clone());
        }
        let fresh = LevelProgress::fresh(enrollment_id, level_id);
        self.progress.insert(fresh.id, fresh.clone());
        Ok(fresh)
    }

    async fn save_progress(&mut self, progress: &LevelProgress) -> Result<(), DatabaseError> {
        self.progress.insert(progress.id, progress.clone());
        Ok(())
    }

    async fn progress_for_enrollment(
        &mut self,
        enrollment_id: Uuid,
    ) -> Result<Vec<LevelProgress>, DatabaseError> {
        let mut records: Vec<LevelProgress> = self
            .progress
            .values()
            .filter(|p| p.enrollment_id == enrollment_id)
            .cloned()
            .collect();
        records.sort_by_key(|p| p.started_at);
        Ok(records)
    }
}
