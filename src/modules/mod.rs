pub mod folder {
    pub mod schema;
    pub mod model;
    pub mod tree;
    pub mod repository;
    pub mod repository_memory;
    pub mod repository_pg;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod taxonomy {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_memory;
    pub mod repository_pg;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod asset {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_memory;
    pub mod repository_pg;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod version {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_memory;
    pub mod repository_pg;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod search {
    pub mod model;
    pub mod predicate;
    pub mod history;
    pub mod state;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod upload {
    pub mod model;
    pub mod transport;
    pub mod multipart;
    pub mod service;
}

pub mod permission {
    pub mod schema;
    pub mod provider;
    pub mod service;
}
