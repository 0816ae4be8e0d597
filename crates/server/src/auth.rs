//! Bearer-auth middleware: resolves `Authorization: Bearer <key>` into an
//! `AgentId` extension for downstream handlers.
//!
//! Grounded on `gate::bin::server::auth_middleware`'s header parsing, with
//! the one deliberate difference spec §4.6 requires: the teacher accepts any
//! non-empty token, we hash the presented key and look up the real agent it
//! names, rejecting unknown or banned ones.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use clawcity_auth::{hash_bearer_key, parse_bearer_header};

use crate::state::AppState;

pub async fn require_agent(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let raw_key = match header.and_then(parse_bearer_header) {
        Some(key) => key,
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    let key_hash = hash_bearer_key(raw_key);
    let world = state.ctx.store.read().await;
    let agent = match world.agent_by_key_hash(&key_hash) {
        Some(agent) if !agent.is_banned() => agent.id,
        _ => return Err(StatusCode::UNAUTHORIZED),
    };
    drop(world);

    req.extensions_mut().insert(agent);
    Ok(next.run(req).await)
}
