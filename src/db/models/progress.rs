use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

/// Accumulated completion evidence for one learner on one level.
///
/// Counters are written by teachers as they mark modules, capture
/// artifacts and record assessments; the engine only ever sets the
/// `completed` flag and its timestamp.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct LevelProgress {
    pub id: Uuid,
    pub enrollment_id: Uuid,
    pub level_id: Uuid,
    pub modules_completed: i32,
    pub artifacts_submitted: i32,
    pub assessment_score: i32,
    pub teacher_confirmed: bool,
    pub completed: bool,
    pub completed_at: Option<OffsetDateTime>,
    pub started_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl LevelProgress {
    /// A zeroed record for a level the learner has just entered.
    pub fn fresh(enrollment_id: Uuid, level_id: Uuid) -> Self {
        let now = OffsetDateTime::now_utc();
        LevelProgress {
            id: Uuid::new_v4(),
            enrollment_id,
            level_id,
            modules_completed: 0,
            artifacts_submitted: 0,
            assessment_score: 0,
            teacher_confirmed: false,
            completed: false,
            completed_at: None,
            started_at: now,
            updated_at: now,
        }
    }
}

/// Teacher/system-reported progress values. Each field is independently
/// optional; omitted fields are left unchanged. Range attributes document
/// the boundary contract — the engine itself does not reject values.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProgressUpdate {
    pub modules_completed: Option<i32>,
    pub artifacts_submitted: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub assessment_score: Option<i32>,
    pub teacher_confirmed: Option<bool>,
}

/// One row of the per-enrollment progress projection: a level with the
/// learner's record for it, if any.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentProgressEntry {
    pub level: super::CourseLevel,
    pub progress: Option<LevelProgress>,
    pub completion_percentage: i32,
}
