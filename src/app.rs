pub mod model;
pub mod quiz_store;
pub mod routes;
pub mod service;
pub mod url_lock;
