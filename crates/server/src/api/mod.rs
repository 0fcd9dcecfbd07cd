pub mod downloads;
pub mod favorites;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod routes;
pub mod sync;

pub use routes::create_router;
