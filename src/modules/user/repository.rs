use uuid::Uuid;

use crate::{
    api::error,
    modules::user::model::{InsertUser, UpdateUser},
    modules::user::schema::UserEntity,
};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError>;

    /// Handle lookup is case-insensitive; handles back shared profile links.
    async fn find_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<UserEntity>, error::SystemError>;

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError>;

    async fn update(&self, id: &Uuid, user: &UpdateUser) -> Result<UserEntity, error::SystemError>;
}
