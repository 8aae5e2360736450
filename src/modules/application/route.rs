use crate::modules::application::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/applications")
            .service(list_inbox)
            .service(list_sent)
            .service(accept_application)
            .service(reject_application)
            .service(submit_application),
    );
}
