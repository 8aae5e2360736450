use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct QuestionProfileEntity {
    pub user_id: Uuid,
    pub questions: Vec<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
