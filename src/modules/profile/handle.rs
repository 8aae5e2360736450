use actix_web::{get, put, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        profile::{
            model::{ProfileResponse, PublicProfileView, PublishQuestionsModel},
            repository_pg::ProfileRepositoryPg,
            service::ProfileService,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::ValidatedJson,
};

pub type ProfileSvc = ProfileService<ProfileRepositoryPg, UserRepositoryPg>;

#[put("")]
pub async fn publish_questions(
    profile_service: web::Data<ProfileSvc>,
    body: ValidatedJson<PublishQuestionsModel>,
    req: HttpRequest,
) -> Result<success::Success<ProfileResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let profile = profile_service.publish(user_id, body.0).await?;
    Ok(success::Success::ok(Some(profile)).message("Questions published successfully"))
}

#[get("/me")]
pub async fn get_own_questions(
    profile_service: web::Data<ProfileSvc>,
    req: HttpRequest,
) -> Result<success::Success<ProfileResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let profile = profile_service.get_own(user_id).await?;
    Ok(success::Success::ok(Some(profile)).message("Questions retrieved successfully"))
}

// Public deep links, mirroring the shared /p/<id> and /@<handle> URLs.

#[get("/{id:[0-9a-fA-F-]{36}}")]
pub async fn view_profile_by_id(
    profile_service: web::Data<ProfileSvc>,
    user_id: web::Path<Uuid>,
) -> Result<success::Success<PublicProfileView>, error::Error> {
    let view = profile_service.public_view_by_id(user_id.into_inner()).await?;
    Ok(success::Success::ok(Some(view)).message("Profile retrieved successfully"))
}

#[get("/@{handle}")]
pub async fn view_profile_by_handle(
    profile_service: web::Data<ProfileSvc>,
    handle: web::Path<String>,
) -> Result<success::Success<PublicProfileView>, error::Error> {
    let view = profile_service.public_view_by_handle(&handle).await?;
    Ok(success::Success::ok(Some(view)).message("Profile retrieved successfully"))
}
