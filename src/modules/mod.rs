pub mod user {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod profile {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod application {
    pub mod policy;
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod friend {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod message {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod service;
    pub mod handle;
    pub mod route;
}
