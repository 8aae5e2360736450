use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::modules::user::schema::UserEntity;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FriendResponse {
    pub id: Uuid,
    pub handle: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<UserEntity> for FriendResponse {
    fn from(user: UserEntity) -> Self {
        FriendResponse {
            id: user.id,
            handle: user.handle,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
        }
    }
}
