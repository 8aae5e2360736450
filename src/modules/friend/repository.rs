use uuid::Uuid;

use crate::api::error;
use crate::modules::friend::model::FriendResponse;
use crate::modules::friend::schema::FriendshipEntity;

#[async_trait::async_trait]
pub trait FriendRepository {
    async fn find_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendshipEntity>, error::SystemError>;

    async fn find_friends(&self, user_id: &Uuid)
    -> Result<Vec<FriendResponse>, error::SystemError>;

    async fn delete_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<(), error::SystemError>;
}
