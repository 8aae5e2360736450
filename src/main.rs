use actix_cors::Cors;
use actix_web::{
    self,
    middleware::{from_fn, Logger},
    web, App, HttpServer,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{connect_database, RedisCache},
    middlewares::{authentication, authorization},
    modules::{
        application::{repository_pg::ApplicationRepositoryPg, service::ApplicationService},
        friend::{repository_pg::FriendRepositoryPg, service::FriendService},
        message::{repository_pg::MessageRepositoryPg, service::MessageService},
        profile::{repository_pg::ProfileRepositoryPg, service::ProfileService},
        user::{repository_pg::UserRepositoryPg, schema::UserRole, service::UserService},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    let redis_pool =
        RedisCache::new().await.map_err(|_| std::io::Error::other("Redis connection error"))?;

    let user_repo = UserRepositoryPg::new(db_pool.clone());
    let profile_repo = ProfileRepositoryPg::new(db_pool.clone());
    let application_repo = ApplicationRepositoryPg::new(db_pool.clone());
    let friend_repo = FriendRepositoryPg::new(db_pool.clone());
    let message_repo = MessageRepositoryPg::new(db_pool.clone());

    let user_service =
        UserService::with_dependencies(Arc::new(user_repo.clone()), Arc::new(redis_pool));
    let profile_service = ProfileService::with_dependencies(
        Arc::new(profile_repo),
        Arc::new(user_repo.clone()),
    );
    let application_service = ApplicationService::with_dependencies(
        Arc::new(application_repo),
        Arc::new(user_repo.clone()),
    );
    let friend_service = FriendService::with_dependencies(Arc::new(friend_repo.clone()));
    let message_service =
        MessageService::with_dependencies(Arc::new(message_repo), Arc::new(friend_repo));

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(profile_service.clone()))
            .app_data(web::Data::new(application_service.clone()))
            .app_data(web::Data::new(friend_service.clone()))
            .app_data(web::Data::new(message_service.clone()))
            .service(health_check)
            .service(
                web::scope("/api")
                    .configure(modules::user::route::public_api_configure)
                    .configure(modules::profile::route::public_api_configure)
                    .service(
                        web::scope("")
                            .wrap(from_fn(authorization(vec![UserRole::User])))
                            .wrap(from_fn(authentication))
                            .configure(modules::user::route::configure)
                            .configure(modules::profile::route::configure)
                            .configure(modules::application::route::configure)
                            .configure(modules::friend::route::configure)
                            .configure(modules::message::route::configure),
                    ),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
