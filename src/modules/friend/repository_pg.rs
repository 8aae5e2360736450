use uuid::Uuid;

use crate::{
    api::error,
    modules::friend::{
        model::FriendResponse,
        repository::FriendRepository,
        schema::{ordered_pair, FriendshipEntity},
    },
};

#[derive(Clone)]
pub struct FriendRepositoryPg {
    pool: sqlx::PgPool,
}

impl FriendRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FriendRepository for FriendRepositoryPg {
    async fn find_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        let (user_a, user_b) = ordered_pair(*user_id_a, *user_id_b);

        let friendship = sqlx::query_as::<_, FriendshipEntity>(
            "SELECT * FROM friendships WHERE user_a = $1 AND user_b = $2",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(friendship)
    }

    async fn find_friends(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let friends = sqlx::query_as::<_, FriendResponse>(
            r#"
        SELECT
            u.id,
            u.handle,
            u.display_name,
            u.avatar_url
        FROM friendships f
        JOIN users u
            ON u.id = CASE
                WHEN f.user_a = $1 THEN f.user_b
                ELSE f.user_a
            END
        WHERE f.user_a = $1
           OR f.user_b = $1
        "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }

    async fn delete_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<(), error::SystemError> {
        let (user_a, user_b) = ordered_pair(*user_id_a, *user_id_b);

        sqlx::query("DELETE FROM friendships WHERE user_a = $1 AND user_b = $2")
            .bind(user_a)
            .bind(user_b)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
