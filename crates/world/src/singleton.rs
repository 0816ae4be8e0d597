//! The single world clock's externally visible state (spec §3, §4.1).

use chrono::{DateTime, Utc};
use clawcity_types::Tick;
use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockStatus {
    Running,
    Paused,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSingleton {
    pub tick: Tick,
    pub tick_ms: u64,
    pub status: ClockStatus,
    pub seed: u64,
    pub last_tick_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub config: WorldConfig,
}

impl WorldSingleton {
    pub fn new(seed: u64, config: WorldConfig) -> Self {
        Self {
            tick: 0,
            tick_ms: config.tick_ms,
            status: ClockStatus::Running,
            seed,
            last_tick_at: None,
            config,
        }
    }

    pub fn advance(&mut self, now: DateTime<Utc>) -> Tick {
        self.tick += 1;
        self.last_tick_at = Some(now);
        self.tick
    }
}
