use actix_web::{get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        application::{
            model::{InboxEntryResponse, SentApplicationResponse, SubmitAnswersModel},
            repository_pg::ApplicationRepositoryPg,
            schema::ApplicationEntity,
            service::ApplicationService,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::ValidatedJson,
};

pub type ApplicationSvc = ApplicationService<ApplicationRepositoryPg, UserRepositoryPg>;

#[post("/{creator_id:[0-9a-fA-F-]{36}}")]
pub async fn submit_application(
    application_service: web::Data<ApplicationSvc>,
    creator_id: web::Path<Uuid>,
    body: ValidatedJson<SubmitAnswersModel>,
    req: HttpRequest,
) -> Result<success::Success<ApplicationEntity>, error::Error> {
    let responder_id = get_claims(&req)?.sub;
    let application =
        application_service.submit(responder_id, creator_id.into_inner(), body.0).await?;

    Ok(success::Success::created(Some(application)).message("Application submitted successfully"))
}

#[get("")]
pub async fn list_inbox(
    application_service: web::Data<ApplicationSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<InboxEntryResponse>>, error::Error> {
    let creator_id = get_claims(&req)?.sub;
    let inbox = application_service.get_inbox(creator_id).await?;

    Ok(success::Success::ok(Some(inbox)).message("Applications retrieved successfully"))
}

#[get("/sent")]
pub async fn list_sent(
    application_service: web::Data<ApplicationSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<SentApplicationResponse>>, error::Error> {
    let responder_id = get_claims(&req)?.sub;
    let sent = application_service.get_sent(responder_id).await?;

    Ok(success::Success::ok(Some(sent)).message("Sent applications retrieved successfully"))
}

#[post("/{responder_id:[0-9a-fA-F-]{36}}/accept")]
pub async fn accept_application(
    application_service: web::Data<ApplicationSvc>,
    responder_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<ApplicationEntity>, error::Error> {
    let creator_id = get_claims(&req)?.sub;
    let application =
        application_service.accept(creator_id, responder_id.into_inner()).await?;

    Ok(success::Success::ok(Some(application))
        .message("Connected. You can now message each other"))
}

#[post("/{responder_id:[0-9a-fA-F-]{36}}/reject")]
pub async fn reject_application(
    application_service: web::Data<ApplicationSvc>,
    responder_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<ApplicationEntity>, error::Error> {
    let creator_id = get_claims(&req)?.sub;
    let application =
        application_service.reject(creator_id, responder_id.into_inner()).await?;

    Ok(success::Success::ok(Some(application)).message("Application rejected"))
}
