use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::modules::application::schema::{ApplicationStatus, ResponderSnapshot};
use crate::modules::user::schema::UserEntity;

pub const MAX_ANSWER_LEN: usize = 2000;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswersModel {
    #[validate(
        length(min = 1, max = 7, message = "An application has 1 to 7 answers"),
        custom(function = validate_answers)
    )]
    pub answers: Vec<String>,
}

fn validate_answers(answers: &[String]) -> Result<(), ValidationError> {
    for answer in answers {
        if answer.chars().count() > MAX_ANSWER_LEN {
            let mut err = ValidationError::new("answer_too_long");
            err.message = Some("Answers are capped at 2000 characters".into());
            return Err(err);
        }
    }
    Ok(())
}

/// The responder as shown in the creator's inbox: from the stored
/// snapshot when present, otherwise from their live profile.
#[derive(Debug, Clone, Serialize)]
pub struct ResponderCard {
    pub uid: Uuid,
    pub handle: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub age: i32,
}

impl From<ResponderSnapshot> for ResponderCard {
    fn from(snapshot: ResponderSnapshot) -> Self {
        ResponderCard {
            uid: snapshot.uid,
            handle: snapshot.handle,
            display_name: snapshot.display_name,
            avatar_url: snapshot.avatar_url,
            province: snapshot.province,
            country: snapshot.country,
            age: snapshot.age,
        }
    }
}

impl ResponderCard {
    pub fn from_live(user: &UserEntity, age: i32) -> Self {
        ResponderCard {
            uid: user.id,
            handle: user.handle.clone(),
            display_name: user.display_name.clone(),
            avatar_url: user.avatar_url.clone(),
            province: user.province.clone(),
            country: user.country.clone(),
            age,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InboxEntryResponse {
    pub responder: ResponderCard,
    pub answers: Vec<String>,
    pub status: ApplicationStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(FromRow)]
pub struct SentMarkerRow {
    pub creator_id: Uuid,
    pub handle: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Who the responder has already applied to.
#[derive(Debug, Clone, Serialize)]
pub struct SentApplicationResponse {
    pub creator_id: Uuid,
    pub handle: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<SentMarkerRow> for SentApplicationResponse {
    fn from(row: SentMarkerRow) -> Self {
        SentApplicationResponse {
            creator_id: row.creator_id,
            handle: row.handle,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
        }
    }
}
