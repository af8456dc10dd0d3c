//! Read-only JSON API over the snapshot cache, for a browser render layer

mod handlers;
pub mod models;
pub mod server;

pub use handlers::AppState;
pub use models::*;
