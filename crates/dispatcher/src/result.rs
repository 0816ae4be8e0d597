//! `ActionResult`: the wire response of `POST /agent/act` (spec §4.2, §6).

use clawcity_types::{ErrorCode, Tick};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub ok: bool,
    pub tick: Tick,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
}

impl ActionResult {
    pub fn ok(tick: Tick, data: Value) -> Self {
        Self { ok: true, tick, message: None, data: Some(data), error: None }
    }

    pub fn ok_with_message(tick: Tick, message: impl Into<String>, data: Value) -> Self {
        Self { ok: true, tick, message: Some(message.into()), data: Some(data), error: None }
    }

    pub fn err(tick: Tick, error: ErrorCode) -> Self {
        Self { ok: false, tick, message: Some(error.to_string()), data: None, error: Some(error) }
    }
}
