use uuid::Uuid;

use crate::{
    api::error,
    modules::profile::{repository::ProfileRepository, schema::QuestionProfileEntity},
};

#[derive(Clone)]
pub struct ProfileRepositoryPg {
    pool: sqlx::PgPool,
}

impl ProfileRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProfileRepository for ProfileRepositoryPg {
    async fn find_by_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Option<QuestionProfileEntity>, error::SystemError> {
        let profile = sqlx::query_as::<_, QuestionProfileEntity>(
            "SELECT * FROM question_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn upsert_questions(
        &self,
        user_id: &Uuid,
        questions: &[String],
    ) -> Result<QuestionProfileEntity, error::SystemError> {
        let profile = sqlx::query_as::<_, QuestionProfileEntity>(
            r#"
            INSERT INTO question_profiles (user_id, questions)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET questions = EXCLUDED.questions, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(questions)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }
}
