use uuid::Uuid;

use crate::modules::message::model::InsertMessage;
use crate::{api::error, modules::message::schema::MessageEntity};

#[async_trait::async_trait]
pub trait MessageRepository {
    async fn create(&self, message: &InsertMessage)
    -> Result<MessageEntity, error::SystemError>;

    async fn find_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
        before: Option<chrono::DateTime<chrono::Utc>>,
        limit: i64,
    ) -> Result<Vec<MessageEntity>, error::SystemError>;
}
