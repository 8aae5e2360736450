use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Clone, Type, Serialize, Deserialize)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

/// The responder's public card as it looked at submission time, kept so
/// the inbox still renders after the responder edits their profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderSnapshot {
    pub uid: Uuid,
    pub handle: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub age: i32,
    pub captured_at: chrono::DateTime<chrono::Utc>,
}

/// One responder's answer set to one creator's questions. At most one
/// per (creator, responder) pair, enforced by the primary key.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationEntity {
    pub creator_id: Uuid,
    pub responder_id: Uuid,
    pub answers: Vec<String>,
    pub snapshot: Option<sqlx::types::Json<ResponderSnapshot>>,
    pub status: ApplicationStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Responder-owned duplicate guard: lets the responder see "already
/// applied" without read access to the creator's inbox.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SentMarkerEntity {
    pub responder_id: Uuid,
    pub creator_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
