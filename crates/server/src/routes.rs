//! Route handlers for the §6 HTTP surface.

use std::sync::Arc;

use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clawcity_auth::hash_bearer_key;
use clawcity_dispatcher::action::ActionKind;
use clawcity_dispatcher::dispatch::dispatch;
use clawcity_ledger::event::Event;
use clawcity_types::{AgentId, ErrorCode, Tick};
use clawcity_world::model::{Agent, Bounty, Business, CoopAction, Job};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::require_agent;
use crate::error::{status_for, ApiError};
use crate::state::{AppState, SharedState};

pub fn build_router(state: SharedState) -> Router {
    let authenticated = Router::new()
        .route("/agent/state", get(agent_state))
        .route("/agent/act", post(agent_act))
        .route("/agent/events", get(agent_events))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_agent));

    Router::new()
        .route("/health", get(health))
        .route("/agent/register", post(agent_register))
        .route("/agent/guide", get(agent_guide))
        .merge(authenticated)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

// ----- register ---------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    name: String,
    #[serde(rename = "llmInfo", default)]
    #[allow(dead_code)]
    llm_info: Option<Value>,
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    #[serde(rename = "agentId")]
    agent_id: AgentId,
    #[serde(rename = "apiKey")]
    api_key: String,
}

async fn agent_register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::BadArgs, "name is required"));
    }

    let api_key = Uuid::new_v4().to_string();
    let key_hash = hash_bearer_key(&api_key);

    let mut world = state.ctx.store.write().await;
    let agent_id = world.register_agent(body.name, key_hash, false);

    Ok(Json(RegisterResponse { agent_id, api_key }))
}

// ----- state --------------------------------------------------------------

#[derive(Debug, Serialize)]
struct AgentStateResponse {
    agent: Agent,
    tick: Tick,
    #[serde(rename = "nearbyJobs")]
    nearby_jobs: Vec<Job>,
    #[serde(rename = "nearbyBusinesses")]
    nearby_businesses: Vec<Business>,
    #[serde(rename = "nearbyOpportunities")]
    nearby_opportunities: NearbyOpportunities,
}

#[derive(Debug, Serialize)]
struct NearbyOpportunities {
    #[serde(rename = "coopActions")]
    coop_actions: Vec<CoopAction>,
    #[serde(rename = "bountiesOnYou")]
    bounties_on_you: Vec<Bounty>,
}

async fn agent_state(
    State(state): State<Arc<AppState>>,
    Extension(agent_id): Extension<AgentId>,
) -> Result<Json<AgentStateResponse>, ApiError> {
    let world = state.ctx.store.read().await;
    let agent = world.agents.get(&agent_id).ok_or_else(|| ApiError::new(ErrorCode::AgentNotFound, "agent not found"))?;

    let zone_id = agent.location_zone_id.clone();
    let nearby_jobs = world.jobs.values().filter(|j| j.zone_id == zone_id).cloned().collect();
    let nearby_businesses = world.businesses.values().filter(|b| b.zone_id == zone_id).cloned().collect();
    let coop_actions = world
        .coop_actions_by_zone
        .get(&zone_id)
        .into_iter()
        .flatten()
        .filter_map(|id| world.coop_actions.get(id))
        .cloned()
        .collect();
    let bounties_on_you = world
        .bounties_by_target
        .get(&agent_id)
        .into_iter()
        .flatten()
        .filter_map(|id| world.bounties.get(id))
        .cloned()
        .collect();

    Ok(Json(AgentStateResponse {
        agent: agent.clone(),
        tick: world.tick(),
        nearby_jobs,
        nearby_businesses,
        nearby_opportunities: NearbyOpportunities { coop_actions, bounties_on_you },
    }))
}

// ----- act ------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ActRequestId {
    #[serde(rename = "requestId")]
    request_id: Option<String>,
}

async fn agent_act(
    State(state): State<Arc<AppState>>,
    Extension(agent_id): Extension<AgentId>,
    Json(body): Json<Value>,
) -> Response {
    let request_id = match serde_json::from_value::<ActRequestId>(body.clone()).ok().and_then(|r| r.request_id) {
        Some(id) if !id.trim().is_empty() => id,
        _ => return ApiError::new(ErrorCode::MissingRequestId, "requestId is required").into_response(),
    };

    let action: ActionKind = match serde_json::from_value(body) {
        Ok(action) => action,
        Err(err) => {
            let code = if err.to_string().contains("unknown variant") { ErrorCode::UnknownAction } else { ErrorCode::BadArgs };
            return ApiError::new(code, err.to_string()).into_response();
        }
    };

    let result = dispatch(&state.ctx, agent_id, &request_id, action).await;
    let status = result.error.map(status_for).unwrap_or(StatusCode::OK);
    (status, Json(result)).into_response()
}

// ----- events ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct EventsQuery {
    #[serde(rename = "sinceTick", default)]
    since_tick: Option<Tick>,
    #[serde(default)]
    limit: Option<usize>,
}

async fn agent_events(
    State(state): State<Arc<AppState>>,
    Extension(agent_id): Extension<AgentId>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<Event>> {
    let world = state.ctx.store.read().await;
    let since_tick = query.since_tick.unwrap_or(0);
    let limit = query.limit.unwrap_or(100).min(1000);
    let events = world.events.for_agent_since(agent_id, since_tick, limit).into_iter().cloned().collect();
    Json(events)
}

// ----- guide ----------------------------------------------------------------

const GUIDE: &str = include_str!("guide.md");

async fn agent_guide() -> impl IntoResponse {
    ([(axum::http::header::CONTENT_TYPE, "text/markdown; charset=utf-8")], GUIDE)
}
