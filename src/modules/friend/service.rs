use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::friend::{model::FriendResponse, repository::FriendRepository},
};

#[derive(Clone)]
pub struct FriendService<R>
where
    R: FriendRepository + Send + Sync,
{
    friend_repo: Arc<R>,
}

impl<R> FriendService<R>
where
    R: FriendRepository + Send + Sync,
{
    pub fn with_dependencies(friend_repo: Arc<R>) -> Self {
        FriendService { friend_repo }
    }

    pub async fn get_friends(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let friends = self.friend_repo.find_friends(&user_id).await?;
        Ok(friends)
    }

    pub async fn remove_friend(
        &self,
        user_id: Uuid,
        friend_id: Uuid,
    ) -> Result<(), error::SystemError> {
        self.friend_repo.delete_friendship(&user_id, &friend_id).await
    }
}
