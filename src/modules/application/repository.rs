use uuid::Uuid;

use crate::api::error;
use crate::modules::application::model::SentMarkerRow;
use crate::modules::application::schema::{
    ApplicationEntity, ResponderSnapshot, SentMarkerEntity,
};

#[async_trait::async_trait]
pub trait ApplicationRepository {
    async fn find_application(
        &self,
        creator_id: &Uuid,
        responder_id: &Uuid,
    ) -> Result<Option<ApplicationEntity>, error::SystemError>;

    async fn find_inbox(
        &self,
        creator_id: &Uuid,
        limit: i64,
    ) -> Result<Vec<ApplicationEntity>, error::SystemError>;
}

#[async_trait::async_trait]
pub trait SentMarkerRepository {
    async fn find_sent_marker(
        &self,
        responder_id: &Uuid,
        creator_id: &Uuid,
    ) -> Result<Option<SentMarkerEntity>, error::SystemError>;

    async fn find_sent_for_responder(
        &self,
        responder_id: &Uuid,
    ) -> Result<Vec<SentMarkerRow>, error::SystemError>;
}

/// The lifecycle writes are multi-row and must be all-or-nothing, so
/// they live on the repository where the transaction boundary is.
#[async_trait::async_trait]
pub trait ApplicationRepo: ApplicationRepository + SentMarkerRepository + Send + Sync {
    /// Inserts the application and the responder's sent marker in one
    /// transaction. The pair's primary keys are the hard duplicate guard.
    async fn create_application_atomic(
        &self,
        creator_id: &Uuid,
        responder_id: &Uuid,
        answers: &[String],
        snapshot: Option<&ResponderSnapshot>,
    ) -> Result<ApplicationEntity, error::SystemError>;

    /// Upserts the canonical friendship and flips the pending
    /// application to accepted in one transaction, so no reader ever
    /// sees `accepted` without the friendship.
    async fn accept_application_atomic(
        &self,
        creator_id: &Uuid,
        responder_id: &Uuid,
    ) -> Result<ApplicationEntity, error::SystemError>;

    /// Flips a pending application to rejected. Returns None when the
    /// application is absent or no longer pending.
    async fn reject_if_pending(
        &self,
        creator_id: &Uuid,
        responder_id: &Uuid,
    ) -> Result<Option<ApplicationEntity>, error::SystemError>;
}
