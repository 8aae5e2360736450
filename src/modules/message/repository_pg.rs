use uuid::Uuid;

use crate::{
    api::error,
    modules::message::{
        model::InsertMessage, repository::MessageRepository, schema::MessageEntity,
    },
};

#[derive(Clone)]
pub struct MessageRepositoryPg {
    pool: sqlx::PgPool,
}

impl MessageRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessageRepositoryPg {
    async fn create(
        &self,
        message: &InsertMessage,
    ) -> Result<MessageEntity, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        let message = sqlx::query_as::<_, MessageEntity>(
            "INSERT INTO messages (id, sender_id, recipient_id, content) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(id)
        .bind(message.sender_id)
        .bind(message.recipient_id)
        .bind(&message.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn find_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
        before: Option<chrono::DateTime<chrono::Utc>>,
        limit: i64,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        // covered by the (sender_id, recipient_id, created_at DESC) index
        let messages = if let Some(before) = before {
            sqlx::query_as::<_, MessageEntity>(
                r#"
                SELECT * FROM messages
                WHERE ((sender_id = $1 AND recipient_id = $2)
                    OR (sender_id = $2 AND recipient_id = $1))
                  AND created_at < $3
                ORDER BY created_at DESC
                LIMIT $4
                "#,
            )
            .bind(user_id_a)
            .bind(user_id_b)
            .bind(before)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, MessageEntity>(
                r#"
                SELECT * FROM messages
                WHERE (sender_id = $1 AND recipient_id = $2)
                   OR (sender_id = $2 AND recipient_id = $1)
                ORDER BY created_at DESC
                LIMIT $3
                "#,
            )
            .bind(user_id_a)
            .bind(user_id_b)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(messages)
    }
}
