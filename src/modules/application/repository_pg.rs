use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        application::{
            model::SentMarkerRow,
            repository::{ApplicationRepo, ApplicationRepository, SentMarkerRepository},
            schema::{ApplicationEntity, ApplicationStatus, ResponderSnapshot, SentMarkerEntity},
        },
        friend::schema::ordered_pair,
    },
};

#[derive(Clone)]
pub struct ApplicationRepositoryPg {
    pool: sqlx::PgPool,
}

impl ApplicationRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ApplicationRepository for ApplicationRepositoryPg {
    async fn find_application(
        &self,
        creator_id: &Uuid,
        responder_id: &Uuid,
    ) -> Result<Option<ApplicationEntity>, error::SystemError> {
        let application = sqlx::query_as::<_, ApplicationEntity>(
            "SELECT * FROM applications WHERE creator_id = $1 AND responder_id = $2",
        )
        .bind(creator_id)
        .bind(responder_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    async fn find_inbox(
        &self,
        creator_id: &Uuid,
        limit: i64,
    ) -> Result<Vec<ApplicationEntity>, error::SystemError> {
        let applications = sqlx::query_as::<_, ApplicationEntity>(
            "SELECT * FROM applications WHERE creator_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(creator_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }
}

#[async_trait::async_trait]
impl SentMarkerRepository for ApplicationRepositoryPg {
    async fn find_sent_marker(
        &self,
        responder_id: &Uuid,
        creator_id: &Uuid,
    ) -> Result<Option<SentMarkerEntity>, error::SystemError> {
        let marker = sqlx::query_as::<_, SentMarkerEntity>(
            "SELECT * FROM sent_markers WHERE responder_id = $1 AND creator_id = $2",
        )
        .bind(responder_id)
        .bind(creator_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(marker)
    }

    async fn find_sent_for_responder(
        &self,
        responder_id: &Uuid,
    ) -> Result<Vec<SentMarkerRow>, error::SystemError> {
        let rows = sqlx::query_as::<_, SentMarkerRow>(
            r#"
            SELECT
                sm.creator_id,
                u.handle,
                u.display_name,
                u.avatar_url,
                sm.created_at
            FROM sent_markers sm
            JOIN users u
                ON u.id = sm.creator_id
            WHERE sm.responder_id = $1
            ORDER BY sm.created_at DESC
            "#,
        )
        .bind(responder_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait::async_trait]
impl ApplicationRepo for ApplicationRepositoryPg {
    async fn create_application_atomic(
        &self,
        creator_id: &Uuid,
        responder_id: &Uuid,
        answers: &[String],
        snapshot: Option<&ResponderSnapshot>,
    ) -> Result<ApplicationEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let application = sqlx::query_as::<_, ApplicationEntity>(
            r#"
            INSERT INTO applications (creator_id, responder_id, answers, snapshot)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(creator_id)
        .bind(responder_id)
        .bind(answers)
        .bind(snapshot.map(sqlx::types::Json))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO sent_markers (responder_id, creator_id) VALUES ($1, $2)")
            .bind(responder_id)
            .bind(creator_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(application)
    }

    async fn accept_application_atomic(
        &self,
        creator_id: &Uuid,
        responder_id: &Uuid,
    ) -> Result<ApplicationEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let application = sqlx::query_as::<_, ApplicationEntity>(
            "SELECT * FROM applications WHERE creator_id = $1 AND responder_id = $2 FOR UPDATE",
        )
        .bind(creator_id)
        .bind(responder_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Application not found"))?;

        if application.status != ApplicationStatus::Pending {
            tx.rollback().await?;
            return Err(error::SystemError::bad_request("Application is not pending"));
        }

        let (user_a, user_b) = ordered_pair(*creator_id, *responder_id);

        sqlx::query(
            r#"
            INSERT INTO friendships (user_a, user_b, can_message)
            VALUES ($1, $2, TRUE)
            ON CONFLICT (user_a, user_b) DO UPDATE SET can_message = TRUE
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .execute(&mut *tx)
        .await?;

        let accepted = sqlx::query_as::<_, ApplicationEntity>(
            r#"
            UPDATE applications
            SET status = $3, updated_at = NOW()
            WHERE creator_id = $1 AND responder_id = $2
            RETURNING *
            "#,
        )
        .bind(creator_id)
        .bind(responder_id)
        .bind(ApplicationStatus::Accepted)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(accepted)
    }

    async fn reject_if_pending(
        &self,
        creator_id: &Uuid,
        responder_id: &Uuid,
    ) -> Result<Option<ApplicationEntity>, error::SystemError> {
        let rejected = sqlx::query_as::<_, ApplicationEntity>(
            r#"
            UPDATE applications
            SET status = $3, updated_at = NOW()
            WHERE creator_id = $1 AND responder_id = $2 AND status = $4
            RETURNING *
            "#,
        )
        .bind(creator_id)
        .bind(responder_id)
        .bind(ApplicationStatus::Rejected)
        .bind(ApplicationStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rejected)
    }
}
