use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

/// A progressive level within a course.
///
/// Level numbers are assigned sequentially (1..N) by the catalog whenever
/// a course's level set is authored; they are unique per course and define
/// the promotion order.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct CourseLevel {
    pub id: Uuid,
    pub course_id: Uuid,
    pub level_number: i32,
    pub name: String,
    pub description: Option<String>,
    pub learning_outcomes: serde_json::Value,
    pub required_modules_count: i32,
    pub required_artifacts_count: i32,
    pub required_assessment_score: i32,
    pub requires_teacher_confirmation: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Authoring input for one level. Callers do not choose level numbers:
/// the catalog numbers levels by their position in the submitted list.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCourseLevel {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub learning_outcomes: Option<serde_json::Value>,
    pub required_modules_count: i32,
    pub required_artifacts_count: i32,
    #[validate(range(min = 0, max = 100))]
    pub required_assessment_score: i32,
    pub requires_teacher_confirmation: bool,
}

impl CourseLevel {
    pub fn from_new(course_id: Uuid, level_number: i32, data: NewCourseLevel) -> Self {
        let now = OffsetDateTime::now_utc();
        CourseLevel {
            id: Uuid::new_v4(),
            course_id,
            level_number,
            name: data.name,
            description: data.description,
            learning_outcomes: data
                .learning_outcomes
                .unwrap_or_else(|| serde_json::Value::Array(Vec::new())),
            required_modules_count: data.required_modules_count,
            required_artifacts_count: data.required_artifacts_count,
            required_assessment_score: data.required_assessment_score,
            requires_teacher_confirmation: data.requires_teacher_confirmation,
            created_at: now,
            updated_at: now,
        }
    }
}
