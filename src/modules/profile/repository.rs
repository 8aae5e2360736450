use uuid::Uuid;

use crate::{api::error, modules::profile::schema::QuestionProfileEntity};

#[async_trait::async_trait]
pub trait ProfileRepository {
    async fn find_by_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Option<QuestionProfileEntity>, error::SystemError>;

    /// Publishing replaces the whole question set.
    async fn upsert_questions(
        &self,
        user_id: &Uuid,
        questions: &[String],
    ) -> Result<QuestionProfileEntity, error::SystemError>;
}
