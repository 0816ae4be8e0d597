//! ClawCity world engine server binary: boots the world store, starts the
//! tick scheduler as a background task, and serves the HTTP surface.

use std::sync::Arc;

use clawcity_clock::TickScheduler;
use clawcity_dispatcher::context::DispatchContext;
use clawcity_dispatcher::npc::NoopPolicy;
use clawcity_server::state::AppState;
use clawcity_server::build_router;
use clawcity_world::{WorldConfig, WorldStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorldConfig::from_env();
    let tick_ms = config.tick_ms;
    let seed = std::env::var("CLAWCITY_SEED").ok().and_then(|s| s.parse().ok()).unwrap_or(1);

    let store = WorldStore::seeded(config, seed);
    let ctx = DispatchContext::new(store);

    let scheduler = TickScheduler::new(ctx.clone(), Arc::new(NoopPolicy), tick_ms);
    tokio::spawn(scheduler.run());

    let state = Arc::new(AppState { ctx });
    let app = build_router(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{port}");
    tracing::info!(%addr, "clawcity-server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await.expect("bind HTTP listener");
    axum::serve(listener, app).await.expect("server error");
}
