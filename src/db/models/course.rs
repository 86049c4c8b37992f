use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

use super::NewCourseLevel;

/// A structured course with progressive levels.
///
/// Courses scoped to a tenant are visible to that tenant only; a null
/// tenant makes the course global.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewCourse {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub tenant_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub levels: Vec<NewCourseLevel>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCourse {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}
