use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UpdateUser},
        repository::UserRepository,
        schema::UserEntity,
    },
};

#[derive(Clone)]
pub struct UserRepositoryPg {
    pool: sqlx::PgPool,
}

impl UserRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            "SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            "SELECT * FROM users WHERE lower(handle) = lower($1) AND deleted_at IS NULL",
        )
        .bind(handle)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        sqlx::query(
            "INSERT INTO users (id, handle, email, hash_password, display_name, birthdate) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(&user.handle)
        .bind(&user.email)
        .bind(&user.hash_password)
        .bind(&user.display_name)
        .bind(user.birthdate)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update(&self, id: &Uuid, user: &UpdateUser) -> Result<UserEntity, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
        UPDATE users
        SET
            display_name = COALESCE($2, display_name),
            bio          = CASE WHEN $3::boolean THEN $4 ELSE bio END,
            province     = CASE WHEN $5::boolean THEN $6 ELSE province END,
            country      = CASE WHEN $7::boolean THEN $8 ELSE country END,
            avatar_url   = CASE WHEN $9::boolean THEN $10 ELSE avatar_url END,
            socials      = COALESCE($11, socials),
            birthdate    = CASE WHEN $12::boolean THEN $13 ELSE birthdate END,
            updated_at   = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING *
        "#,
        )
        .bind(id)
        .bind(&user.display_name)
        .bind(user.bio.is_some())
        .bind(user.bio.as_ref().and_then(|v| v.as_ref()))
        .bind(user.province.is_some())
        .bind(user.province.as_ref().and_then(|v| v.as_ref()))
        .bind(user.country.is_some())
        .bind(user.country.as_ref().and_then(|v| v.as_ref()))
        .bind(user.avatar_url.is_some())
        .bind(user.avatar_url.as_ref().and_then(|v| v.as_ref()))
        .bind(user.socials.as_ref().map(sqlx::types::Json))
        .bind(user.birthdate.is_some())
        .bind(user.birthdate.as_ref().and_then(|v| v.as_ref()))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(user)
    }
}
