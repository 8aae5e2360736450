use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::message::schema::MessageEntity;

#[derive(Debug, Clone)]
pub struct InsertMessage {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendDirectMessage {
    pub recipient_id: Uuid,
    #[validate(length(min = 1, max = 2000, message = "Messages are 1 to 2000 characters"))]
    pub content: String,
}

/// Pages newest-first; `before` is the created_at cursor from the
/// previous page.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MessageHistoryQuery {
    pub before: Option<chrono::DateTime<chrono::Utc>>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetMessagesResponse {
    pub messages: Vec<MessageEntity>,
    pub cursor: Option<String>,
}
