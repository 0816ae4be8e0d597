//! Application state shared across every route.

use std::sync::Arc;

use clawcity_dispatcher::context::DispatchContext;

/// Everything a handler needs to talk to the world. Cheap to clone — every
/// field is itself `Arc`-backed — but we still wrap it once so `axum`'s
/// `State` extractor hands out a single `Arc<AppState>` per request, per
/// `gate::bin::server::AppState`.
pub struct AppState {
    pub ctx: DispatchContext,
}

pub type SharedState = Arc<AppState>;
