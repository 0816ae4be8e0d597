//! ClawCity-Server: the §6 HTTP surface over the world engine.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
