use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        profile::{
            model::{ProfileResponse, PublicProfileView, PublishQuestionsModel},
            repository::ProfileRepository,
        },
        user::{model::PublicUserResponse, repository::UserRepository},
    },
};

#[derive(Clone)]
pub struct ProfileService<P, U>
where
    P: ProfileRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    profile_repo: Arc<P>,
    user_repo: Arc<U>,
}

impl<P, U> ProfileService<P, U>
where
    P: ProfileRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(profile_repo: Arc<P>, user_repo: Arc<U>) -> Self {
        ProfileService { profile_repo, user_repo }
    }

    pub async fn publish(
        &self,
        user_id: Uuid,
        model: PublishQuestionsModel,
    ) -> Result<ProfileResponse, error::SystemError> {
        let questions: Vec<String> =
            model.questions.iter().map(|q| q.trim().to_string()).collect();

        let profile = self.profile_repo.upsert_questions(&user_id, &questions).await?;

        Ok(ProfileResponse { questions: profile.questions, updated_at: Some(profile.updated_at) })
    }

    /// A user without a published profile gets an empty question set, not an error.
    pub async fn get_own(&self, user_id: Uuid) -> Result<ProfileResponse, error::SystemError> {
        let profile = self.profile_repo.find_by_user(&user_id).await?;

        Ok(match profile {
            Some(p) => ProfileResponse { questions: p.questions, updated_at: Some(p.updated_at) },
            None => ProfileResponse { questions: Vec::new(), updated_at: None },
        })
    }

    pub async fn public_view_by_id(
        &self,
        user_id: Uuid,
    ) -> Result<PublicProfileView, error::SystemError> {
        let user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        self.assemble_view(user).await
    }

    pub async fn public_view_by_handle(
        &self,
        handle: &str,
    ) -> Result<PublicProfileView, error::SystemError> {
        let user = self
            .user_repo
            .find_by_handle(handle)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        self.assemble_view(user).await
    }

    async fn assemble_view(
        &self,
        user: crate::modules::user::schema::UserEntity,
    ) -> Result<PublicProfileView, error::SystemError> {
        let questions = self
            .profile_repo
            .find_by_user(&user.id)
            .await?
            .map(|p| p.questions)
            .unwrap_or_default();

        Ok(PublicProfileView { user: PublicUserResponse::from(user), questions })
    }
}
