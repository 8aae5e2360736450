use actix_web::{get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        friend::repository_pg::FriendRepositoryPg,
        message::{
            model::{GetMessagesResponse, MessageHistoryQuery, SendDirectMessage},
            repository_pg::MessageRepositoryPg,
            schema::MessageEntity,
            service::MessageService,
        },
    },
    utils::{ValidatedJson, ValidatedQuery},
};

pub type MessageSvc = MessageService<MessageRepositoryPg, FriendRepositoryPg>;

#[post("")]
pub async fn send_direct_message(
    message_service: web::Data<MessageSvc>,
    body: ValidatedJson<SendDirectMessage>,
    req: HttpRequest,
) -> Result<success::Success<MessageEntity>, error::Error> {
    let sender_id = get_claims(&req)?.sub;
    let message = message_service.send_direct_message(sender_id, body.0).await?;

    Ok(success::Success::created(Some(message)).message("Message sent"))
}

#[get("/{peer_id:[0-9a-fA-F-]{36}}")]
pub async fn get_message_history(
    message_service: web::Data<MessageSvc>,
    peer_id: web::Path<Uuid>,
    query: ValidatedQuery<MessageHistoryQuery>,
    req: HttpRequest,
) -> Result<success::Success<GetMessagesResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let history = message_service
        .get_history(user_id, peer_id.into_inner(), query.0.before, query.0.limit)
        .await?;

    Ok(success::Success::ok(Some(history)).message("Messages retrieved successfully"))
}
