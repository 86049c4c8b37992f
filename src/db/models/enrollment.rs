use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

/// Binds one learner to one course and tracks where the learner currently
/// is. At most one enrollment exists per (learner, course) pair;
/// re-enrollment reactivates the existing row instead of inserting.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct CourseEnrollment {
    pub id: Uuid,
    pub learner_id: Uuid,
    pub course_id: Uuid,
    pub current_level_id: Option<Uuid>,
    pub enrolled_at: OffsetDateTime,
    pub completed_at: Option<OffsetDateTime>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl CourseEnrollment {
    pub fn new(learner_id: Uuid, course_id: Uuid, current_level_id: Option<Uuid>) -> Self {
        let now = OffsetDateTime::now_utc();
        CourseEnrollment {
            id: Uuid::new_v4(),
            learner_id,
            course_id,
            current_level_id,
            enrolled_at: now,
            completed_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewCourseEnrollment {
    pub learner_id: Uuid,
    pub course_id: Uuid,
}
