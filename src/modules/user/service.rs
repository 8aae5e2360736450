use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::configs::RedisCache;
use crate::ENV;

use crate::modules::user::model::{
    PublicUserResponse, SignInModel, SignUpModel, UpdateUser, UpdateUserModel, UserResponse,
};
use crate::modules::user::{model::InsertUser, repository::UserRepository};
use crate::utils::{hash_password, verify_password, Claims, TypeClaims};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    cache: Arc<RedisCache>,
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        cache: Arc<RedisCache>,
    ) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, cache }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        let key = format!("user:{}", id);
        if let Some(cached_user) = self.cache.get::<UserResponse>(&key).await? {
            return Ok(cached_user);
        }
        let user_entity = self.repo.find_by_id(&id).await?;
        if let Some(entity) = user_entity {
            self.cache.set(&key, &UserResponse::from(entity.clone()), 3600).await?;
            Ok(UserResponse::from(entity))
        } else {
            Err(error::SystemError::not_found("User not found"))
        }
    }

    pub async fn get_public_by_id(
        &self,
        id: Uuid,
    ) -> Result<PublicUserResponse, error::SystemError> {
        let entity = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;
        Ok(PublicUserResponse::from(entity))
    }

    pub async fn update_user(
        &self,
        id: Uuid,
        user: UpdateUserModel,
    ) -> Result<(), error::SystemError> {
        if user.display_name.is_none()
            && user.bio.is_none()
            && user.province.is_none()
            && user.country.is_none()
            && user.avatar_url.is_none()
            && user.socials.is_none()
            && user.birthdate.is_none()
        {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        let update_user = UpdateUser {
            display_name: user.display_name,
            bio: user.bio,
            province: user.province,
            country: user.country,
            avatar_url: user.avatar_url,
            socials: user.socials,
            birthdate: user.birthdate,
        };

        self.repo.update(&id, &update_user).await?;

        let key = format!("user:{}", id);
        self.cache.delete(&key).await?;
        Ok(())
    }

    pub async fn sign_up(&self, user: SignUpModel) -> Result<uuid::Uuid, error::SystemError> {
        let hash_password = hash_password(&user.password)?;

        let new_user = InsertUser {
            handle: user.handle,
            email: user.email,
            hash_password,
            display_name: user.display_name,
            birthdate: user.birthdate,
        };

        let user_id = self.repo.create(&new_user).await?;
        Ok(user_id)
    }

    pub async fn sign_in(&self, user: SignInModel) -> Result<(String, String), error::SystemError> {
        let user_entity = self
            .repo
            .find_by_handle(&user.handle)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid handle or password"))?;

        let valid = verify_password(&user_entity.hash_password, &user.password)?;
        if !valid {
            return Err(error::SystemError::unauthorized("Invalid handle or password"));
        }

        self.issue_tokens(&user_entity.id, &user_entity.role).await
    }

    pub async fn sign_out(&self, refresh_token: Option<String>) -> Result<(), error::SystemError> {
        let Some(token) = refresh_token else {
            return Ok(());
        };

        // an undecodable cookie has nothing left to revoke
        let Ok(claims) = Claims::decode(&token, ENV.jwt_secret.as_ref()) else {
            return Ok(());
        };

        if let Some(jti) = claims.jti {
            self.cache.delete(&format!("refresh_token:{jti}")).await?;
        }

        Ok(())
    }

    pub async fn refresh(
        &self,
        refresh_token: Option<String>,
    ) -> Result<(String, String), error::SystemError> {
        let token =
            refresh_token.ok_or_else(|| error::SystemError::unauthorized("Missing refresh token"))?;

        let claims = Claims::decode(&token, ENV.jwt_secret.as_ref())
            .map_err(|_| error::SystemError::unauthorized("Token Invalid or Expired"))?;

        if claims._type != Some(TypeClaims::RefreshToken) {
            return Err(error::SystemError::unauthorized("Token Invalid or Expired"));
        }

        let jti = claims
            .jti
            .ok_or_else(|| error::SystemError::unauthorized("Token Invalid or Expired"))?;

        let refresh_key = format!("refresh_token:{jti}");
        let known: Option<Uuid> = self.cache.get(&refresh_key).await?;
        if known != Some(claims.sub) {
            return Err(error::SystemError::unauthorized("Session expired"));
        }

        // rotate: the old refresh token is single-use
        self.cache.delete(&refresh_key).await?;

        self.issue_tokens(&claims.sub, &claims.role).await
    }

    async fn issue_tokens(
        &self,
        user_id: &Uuid,
        role: &crate::modules::user::schema::UserRole,
    ) -> Result<(String, String), error::SystemError> {
        let access_token = Claims::new(user_id, role, ENV.access_token_expiration)
            .with_type(TypeClaims::AccessToken)
            .encode(ENV.jwt_secret.as_ref())?;

        let jti = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));

        let refresh_token = Claims::new(user_id, role, ENV.refresh_token_expiration)
            .with_jti(jti)
            .with_type(TypeClaims::RefreshToken)
            .encode(ENV.jwt_secret.as_ref())?;

        let refresh_key = format!("refresh_token:{jti}");
        self.cache.set(&refresh_key, user_id, ENV.refresh_token_expiration as usize).await?;

        Ok((access_token, refresh_token))
    }
}
