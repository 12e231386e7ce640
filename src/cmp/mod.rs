pub mod channels;
pub mod clock;
pub mod errors;
pub mod routes;
pub mod service;
pub mod store;
