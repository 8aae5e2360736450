use crate::modules::profile::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/p").service(view_profile_by_id).service(view_profile_by_handle));
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/profiles").service(publish_questions).service(get_own_questions));
}
