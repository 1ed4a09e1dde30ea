// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Per-Agent Circuit Breaker
//!
//! Process-local failure isolation consulted by the execution layer
//! before dispatching work to an agent. A circuit opens after repeated
//! failures and self-heals lazily: the reset happens on the first read
//! after the cool-down has elapsed since the last failure — no
//! background timer fires.
//!
//! State is in-memory only and rebuilt from empty on process restart
//! (cold start ⇒ all agents considered healthy). It is NOT shared across
//! process instances; see DESIGN.md for the horizontal-scaling note.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{info, warn};

use crate::domain::agent::AgentId;
use crate::domain::config::CircuitBreakerConfig;

/// Failures before the circuit opens.
pub const FAILURE_THRESHOLD: u32 = 3;

/// Cool-down after the last failure before a read closes the circuit.
pub const COOL_DOWN_SECONDS: i64 = 300;

#[derive(Debug, Clone)]
struct BreakerEntry {
    failure_count: u32,
    last_failure_at: DateTime<Utc>,
    is_open: bool,
}

pub struct CircuitBreaker {
    entries: DashMap<AgentId, BreakerEntry>,
    failure_threshold: u32,
    cool_down: Duration,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            failure_threshold: FAILURE_THRESHOLD,
            cool_down: Duration::seconds(COOL_DOWN_SECONDS),
        }
    }

    pub fn from_config(config: &CircuitBreakerConfig) -> Self {
        Self {
            entries: DashMap::new(),
            failure_threshold: config.failure_threshold,
            cool_down: Duration::seconds(config.cool_down_seconds),
        }
    }

    /// True when the agent is healthy (no entry, or circuit closed).
    ///
    /// Reading an open circuit whose cool-down has elapsed closes it and
    /// zeroes the failure count before answering.
    pub fn check(&self, agent_id: AgentId) -> bool {
        self.check_at(agent_id, Utc::now())
    }

    /// Record one failed call to the agent. The entry is created lazily
    /// on first failure; the circuit opens once the count reaches the
    /// threshold.
    pub fn record_failure(&self, agent_id: AgentId) {
        self.record_failure_at(agent_id, Utc::now());
    }

    fn check_at(&self, agent_id: AgentId, now: DateTime<Utc>) -> bool {
        let Some(mut entry) = self.entries.get_mut(&agent_id) else {
            return true;
        };

        if entry.is_open && now - entry.last_failure_at >= self.cool_down {
            entry.is_open = false;
            entry.failure_count = 0;
            info!(agent_id = %agent_id, "circuit closed after cool-down");
        }

        !entry.is_open
    }

    fn record_failure_at(&self, agent_id: AgentId, now: DateTime<Utc>) {
        let mut entry = self.entries.entry(agent_id).or_insert_with(|| BreakerEntry {
            failure_count: 0,
            last_failure_at: now,
            is_open: false,
        });

        entry.failure_count += 1;
        entry.last_failure_at = now;

        if !entry.is_open && entry.failure_count >= self.failure_threshold {
            entry.is_open = true;
            warn!(
                agent_id = %agent_id,
                failures = entry.failure_count,
                "circuit opened for agent"
            );
            metrics::counter!("concord_circuits_opened_total").increment(1);
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}
