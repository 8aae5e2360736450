use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::modules::user::schema::UserEntity;
use crate::utils::double_option;

#[derive(Deserialize, Validate)]
pub struct SignUpModel {
    #[validate(length(min = 3, max = 30, message = "Handle must be 3 to 30 characters long"))]
    pub handle: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(length(min = 1, message = "Display name cannot be empty"))]
    pub display_name: String,
    pub birthdate: Option<chrono::NaiveDate>,
}

#[derive(Deserialize, Validate)]
pub struct SignInModel {
    #[validate(length(min = 3, message = "Handle must be at least 3 characters long"))]
    pub handle: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdateUserModel {
    #[validate(length(min = 1, message = "Display name cannot be empty"))]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub province: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub country: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub avatar_url: Option<Option<String>>,
    pub socials: Option<HashMap<String, String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub birthdate: Option<Option<chrono::NaiveDate>>,
}

pub struct InsertUser {
    pub handle: String,
    pub email: String,
    pub hash_password: String,
    pub display_name: String,
    pub birthdate: Option<chrono::NaiveDate>,
}

pub struct UpdateUser {
    pub display_name: Option<String>,
    pub bio: Option<Option<String>>,
    pub province: Option<Option<String>>,
    pub country: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
    pub socials: Option<HashMap<String, String>>,
    pub birthdate: Option<Option<chrono::NaiveDate>>,
}

#[derive(Serialize)]
pub struct SignUpResponse {
    pub id: uuid::Uuid,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub access_token: String,
}

/// The signed-in user's own view, email included.
#[derive(Deserialize, Serialize)]
pub struct UserResponse {
    pub id: uuid::Uuid,
    pub handle: String,
    pub email: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub avatar_url: Option<String>,
    pub socials: HashMap<String, String>,
    pub birthdate: Option<chrono::NaiveDate>,
}

impl From<UserEntity> for UserResponse {
    fn from(entity: UserEntity) -> Self {
        UserResponse {
            id: entity.id,
            handle: entity.handle,
            email: entity.email,
            display_name: entity.display_name,
            bio: entity.bio,
            province: entity.province,
            country: entity.country,
            avatar_url: entity.avatar_url,
            socials: entity.socials.0,
            birthdate: entity.birthdate,
        }
    }
}

/// What anyone may see of a user. No email, no birthdate.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublicUserResponse {
    pub id: uuid::Uuid,
    pub handle: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub avatar_url: Option<String>,
    pub socials: HashMap<String, String>,
}

impl From<UserEntity> for PublicUserResponse {
    fn from(entity: UserEntity) -> Self {
        PublicUserResponse {
            id: entity.id,
            handle: entity.handle,
            display_name: entity.display_name,
            bio: entity.bio,
            province: entity.province,
            country: entity.country,
            avatar_url: entity.avatar_url,
            socials: entity.socials.0,
        }
    }
}
