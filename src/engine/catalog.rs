use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::db::{Course, CourseLevel, NewCourseLevel, NewCourse, UpdateCourse};
use crate::engine::store::ProgressionStore;
use crate::error::{EngineError, EngineResult};

/// Administrative authoring of courses and their level sets.
///
/// Level numbers are never taken from the caller: the catalog numbers
/// levels 1..N in submission order, so the set has no gaps or duplicates.
pub struct LevelCatalog;

impl LevelCatalog {
    pub async fn create_course<S: ProgressionStore>(
        store: &mut S,
        new_course: NewCourse,
    ) -> EngineResult<(Course, Vec<CourseLevel>)> {
        let now = OffsetDateTime::now_utc();
        let course = Course {
            id: Uuid::new_v4(),
            tenant_id: new_course.tenant_id,
            name: new_course.name,
            description: new_course.description,
            is_active: new_course.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        store.insert_course(&course).await?;

        let levels = Self::insert_numbered(store, course.id, new_course.levels).await?;

        info!(course_id = %course.id, levels = levels.len(), "course created");
        Ok((course, levels))
    }

    /// Metadata-only edit; the level set is untouched.
    pub async fn update_course<S: ProgressionStore>(
        store: &mut S,
        course_id: Uuid,
        update: UpdateCourse,
    ) -> EngineResult<Course> {
        let mut course = store
            .fetch_course(course_id)
            .await?
            .ok_or_else(|| EngineError::not_found("course", course_id))?;

        if let Some(name) = update.name {
            course.name = name;
        }
        if let Some(description) = update.description {
            course.description = Some(description);
        }
        if let Some(is_active) = update.is_active {
            course.is_active = is_active;
        }
        course.updated_at = OffsetDateTime::now_utc();
        store.save_course(&course).await?;

        Ok(course)
    }

    /// Replace a course's level set, renumbering 1..N in submission
    /// order. Refused once the course has enrollments: levels in active
    /// use are load-bearing for current-level pointers and progress
    /// records.
    pub async fn replace_levels<S: ProgressionStore>(
        store: &mut S,
        course_id: Uuid,
        specs: Vec<NewCourseLevel>,
    ) -> EngineResult<Vec<CourseLevel>> {
        if store.fetch_course(course_id).await?.is_none() {
            return Err(EngineError::not_found("course", course_id));
        }
        if store.course_has_enrollments(course_id).await? {
            return Err(EngineError::IntegrityViolation(format!(
                "course {} has enrollments, levels cannot be replaced",
                course_id
            )));
        }

        store.delete_levels(course_id).await?;
        Self::insert_numbered(store, course_id, specs).await
    }

    pub async fn list_courses<S: ProgressionStore>(
        store: &mut S,
        tenant_id: Option<Uuid>,
    ) -> EngineResult<Vec<Course>> {
        Ok(store.list_courses(tenant_id).await?)
    }

    pub async fn levels_for_course<S: ProgressionStore>(
        store: &mut S,
        course_id: Uuid,
    ) -> EngineResult<Vec<CourseLevel>> {
        Ok(store.levels_for_course(course_id).await?)
    }

    async fn insert_numbered<S: ProgressionStore>(
        store: &mut S,
        course_id: Uuid,
        specs: Vec<NewCourseLevel>,
    ) -> EngineResult<Vec<CourseLevel>> {
        let mut levels = Vec::with_capacity(specs.len());
        for (i, spec) in specs.into_iter().enumerate() {
            let level = CourseLevel::from_new(course_id, (i + 1) as i32, spec);
            store.insert_level(&level).await?;
            levels.push(level);
        }
        Ok(levels)
    }
}
