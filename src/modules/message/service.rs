use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::constants::MESSAGE_PAGE_LIMIT;
use crate::modules::friend::repository::FriendRepository;
use crate::modules::message::model::{GetMessagesResponse, InsertMessage, SendDirectMessage};
use crate::modules::message::repository::MessageRepository;
use crate::modules::message::schema::MessageEntity;

#[derive(Clone)]
pub struct MessageService<M, F>
where
    M: MessageRepository + Send + Sync,
    F: FriendRepository + Send + Sync,
{
    message_repo: Arc<M>,
    friend_repo: Arc<F>,
}

impl<M, F> MessageService<M, F>
where
    M: MessageRepository + Send + Sync,
    F: FriendRepository + Send + Sync,
{
    pub fn with_dependencies(message_repo: Arc<M>, friend_repo: Arc<F>) -> Self {
        MessageService { message_repo, friend_repo }
    }

    /// Only members of a friendship with messaging enabled may talk.
    async fn ensure_can_message(
        &self,
        user_id: &Uuid,
        peer_id: &Uuid,
    ) -> Result<(), error::SystemError> {
        let friendship = self
            .friend_repo
            .find_friendship(user_id, peer_id)
            .await?
            .ok_or_else(|| error::SystemError::forbidden("You can only message your friends"))?;

        if !friendship.can_message {
            return Err(error::SystemError::forbidden(
                "Messaging is disabled for this friendship",
            ));
        }

        Ok(())
    }

    pub async fn send_direct_message(
        &self,
        sender_id: Uuid,
        model: SendDirectMessage,
    ) -> Result<MessageEntity, error::SystemError> {
        if model.recipient_id == sender_id {
            return Err(error::SystemError::bad_request("Cannot message yourself"));
        }

        self.ensure_can_message(&sender_id, &model.recipient_id).await?;

        let message = self
            .message_repo
            .create(&InsertMessage {
                sender_id,
                recipient_id: model.recipient_id,
                content: model.content,
            })
            .await?;

        Ok(message)
    }

    pub async fn get_history(
        &self,
        user_id: Uuid,
        peer_id: Uuid,
        before: Option<chrono::DateTime<chrono::Utc>>,
        limit: Option<i64>,
    ) -> Result<GetMessagesResponse, error::SystemError> {
        self.ensure_can_message(&user_id, &peer_id).await?;

        let limit = limit.unwrap_or(MESSAGE_PAGE_LIMIT).min(MESSAGE_PAGE_LIMIT);
        let messages = self.message_repo.find_between(&user_id, &peer_id, before, limit).await?;

        let cursor = if messages.len() as i64 == limit {
            messages.last().map(|m| m.created_at.to_rfc3339())
        } else {
            None
        };

        Ok(GetMessagesResponse { messages, cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::friend::model::FriendResponse;
    use crate::modules::friend::schema::{ordered_pair, FriendshipEntity};
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockMessageRepo {
        messages: Mutex<Vec<MessageEntity>>,
    }

    #[async_trait::async_trait]
    impl MessageRepository for MockMessageRepo {
        async fn create(
            &self,
            message: &InsertMessage,
        ) -> Result<MessageEntity, error::SystemError> {
            let entity = MessageEntity {
                id: Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext)),
                sender_id: message.sender_id,
                recipient_id: message.recipient_id,
                content: message.content.clone(),
                created_at: Utc::now(),
            };
            self.messages.lock().unwrap().push(entity.clone());
            Ok(entity)
        }

        async fn find_between(
            &self,
            user_id_a: &Uuid,
            user_id_b: &Uuid,
            _before: Option<chrono::DateTime<chrono::Utc>>,
            limit: i64,
        ) -> Result<Vec<MessageEntity>, error::SystemError> {
            let mut messages: Vec<MessageEntity> = self
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| {
                    (m.sender_id == *user_id_a && m.recipient_id == *user_id_b)
                        || (m.sender_id == *user_id_b && m.recipient_id == *user_id_a)
                })
                .cloned()
                .collect();
            messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            messages.truncate(limit as usize);
            Ok(messages)
        }
    }

    #[derive(Default)]
    struct MockFriendRepo {
        friendships: Mutex<HashMap<(Uuid, Uuid), FriendshipEntity>>,
    }

    impl MockFriendRepo {
        fn befriend(&self, a: Uuid, b: Uuid, can_message: bool) {
            let (user_a, user_b) = ordered_pair(a, b);
            self.friendships.lock().unwrap().insert(
                (user_a, user_b),
                FriendshipEntity { user_a, user_b, can_message, created_at: Utc::now() },
            );
        }
    }

    #[async_trait::async_trait]
    impl FriendRepository for MockFriendRepo {
        async fn find_friendship(
            &self,
            user_id_a: &Uuid,
            user_id_b: &Uuid,
        ) -> Result<Option<FriendshipEntity>, error::SystemError> {
            Ok(self
                .friendships
                .lock()
                .unwrap()
                .get(&ordered_pair(*user_id_a, *user_id_b))
                .cloned())
        }

        async fn find_friends(
            &self,
            _user_id: &Uuid,
        ) -> Result<Vec<FriendResponse>, error::SystemError> {
            Ok(Vec::new())
        }

        async fn delete_friendship(
            &self,
            user_id_a: &Uuid,
            user_id_b: &Uuid,
        ) -> Result<(), error::SystemError> {
            self.friendships.lock().unwrap().remove(&ordered_pair(*user_id_a, *user_id_b));
            Ok(())
        }
    }

    fn new_ids() -> (Uuid, Uuid) {
        (
            Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext)),
            Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext)),
        )
    }

    #[actix_web::test]
    async fn friends_can_exchange_messages() {
        let (alice, bob) = new_ids();
        let friends = MockFriendRepo::default();
        friends.befriend(alice, bob, true);
        let service =
            MessageService::with_dependencies(Arc::new(MockMessageRepo::default()), Arc::new(friends));

        let sent = service
            .send_direct_message(
                alice,
                SendDirectMessage { recipient_id: bob, content: "hey!".to_string() },
            )
            .await
            .unwrap();
        assert_eq!(sent.content, "hey!");

        let history = service.get_history(bob, alice, None, None).await.unwrap();
        assert_eq!(history.messages.len(), 1);
        assert_eq!(history.messages[0].sender_id, alice);
    }

    #[actix_web::test]
    async fn strangers_cannot_message() {
        let (alice, bob) = new_ids();
        let service = MessageService::with_dependencies(
            Arc::new(MockMessageRepo::default()),
            Arc::new(MockFriendRepo::default()),
        );

        let err = service
            .send_direct_message(
                alice,
                SendDirectMessage { recipient_id: bob, content: "hey!".to_string() },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, error::SystemError::Forbidden(_)));
    }

    #[actix_web::test]
    async fn disabled_friendship_blocks_messaging() {
        let (alice, bob) = new_ids();
        let friends = MockFriendRepo::default();
        friends.befriend(alice, bob, false);
        let service =
            MessageService::with_dependencies(Arc::new(MockMessageRepo::default()), Arc::new(friends));

        let err = service
            .send_direct_message(
                alice,
                SendDirectMessage { recipient_id: bob, content: "hey!".to_string() },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, error::SystemError::Forbidden(_)));
    }
}
