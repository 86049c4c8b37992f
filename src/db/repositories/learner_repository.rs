use sqlx::{Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::models::{Learner, NewLearner, UpdateLearner};
use crate::db::DatabaseError;

pub struct LearnerRepository;

impl LearnerRepository {
    pub async fn create_learner(
        tx: &mut Transaction<'_, Postgres>,
        new_learner: &NewLearner,
    ) -> Result<Learner, DatabaseError> {
        sqlx::query_as::<_, Learner>(
            r#"
            INSERT INTO learners (id, tenant_id, first_name, last_name, date_of_birth, is_active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING id, tenant_id, first_name, last_name, date_of_birth, is_active, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_learner.tenant_id)
        .bind(&new_learner.first_name)
        .bind(&new_learner.last_name)
        .bind(new_learner.date_of_birth)
        .fetch_one(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn get_learner_by_id(
        tx: &mut Transaction<'_, Postgres>,
        learner_id: Uuid,
    ) -> Result<Option<Learner>, DatabaseError> {
        sqlx::query_as::<_, Learner>(
            r#"
            SELECT id, tenant_id, first_name, last_name, date_of_birth, is_active, created_at, updated_at
            FROM learners
            WHERE id = $1
            "#,
        )
        .bind(learner_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    #[allow(unused)]
    pub async fn update_learner(
        tx: &mut Transaction<'_, Postgres>,
        learner_id: Uuid,
        update_data: &UpdateLearner,
    ) -> Result<Learner, DatabaseError> {
        sqlx::query_as::<_, Learner>(
            r#"
            UPDATE learners
            SET
                first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                date_of_birth = COALESCE($3, date_of_birth),
                is_active = COALESCE($4, is_active),
                updated_at = $5
            WHERE id = $6
            RETURNING id, tenant_id, first_name, last_name, date_of_birth, is_active, created_at, updated_at
            "#,
        )
        .bind(&update_data.first_name)
        .bind(&update_data.last_name)
        .bind(update_data.date_of_birth)
        .bind(update_data.is_active)
        .bind(OffsetDateTime::now_utc())
        .bind(learner_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(DatabaseError::from_sqlx)
    }
}
