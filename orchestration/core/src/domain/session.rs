// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Orchestration Session Aggregate
//!
//! `OrchestrationSession` is the coordination unit: one fixed topology,
//! an optional primary agent, and a monotonic status lifecycle
//! (`pending|active → completed|failed|cancelled`, terminal states have
//! no outgoing transitions). Sessions are created by the session service
//! and mutated only through explicit update calls; this core never
//! physically deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::agent::{AgentId, SelectedAgent};
use crate::domain::error::OrchestrationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrchestrationType {
    /// One agent working alone.
    Solo,
    /// Two agents, primary + secondary.
    Pair,
    /// One supervisor, N workers.
    Hierarchical,
    /// Up to ten parallel workers, no hierarchy.
    Swarm,
}

impl OrchestrationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrchestrationType::Solo => "solo",
            OrchestrationType::Pair => "pair",
            OrchestrationType::Hierarchical => "hierarchical",
            OrchestrationType::Swarm => "swarm",
        }
    }

    /// Duration multiplier applied to the base estimate: wider topologies
    /// are assumed to parallelize work more.
    pub fn parallelization_factor(&self) -> f64 {
        match self {
            OrchestrationType::Solo => 1.0,
            OrchestrationType::Pair => 0.7,
            OrchestrationType::Hierarchical => 0.5,
            OrchestrationType::Swarm => 0.3,
        }
    }
}

impl std::fmt::Display for OrchestrationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrchestrationType {
    type Err = OrchestrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solo" => Ok(OrchestrationType::Solo),
            "pair" => Ok(OrchestrationType::Pair),
            "hierarchical" => Ok(OrchestrationType::Hierarchical),
            "swarm" => Ok(OrchestrationType::Swarm),
            other => Err(OrchestrationError::InvalidOrchestrationType {
                value: other.to_string(),
            }),
        }
    }
}

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Active,
    Completed,
    Failed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal states have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Failed | SessionStatus::Cancelled
        )
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SessionStatus::Pending),
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            "failed" => Ok(SessionStatus::Failed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            other => Err(format!("unknown session status '{other}'")),
        }
    }
}

/// Structured performance record stamped onto a session by the caller,
/// usually at completion time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_messages: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<f64>,
}

/// A coordination unit: one fixed topology plus the agents selected into
/// it at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationSession {
    pub id: SessionId,
    pub orchestration_type: OrchestrationType,
    /// First selected agent at creation time; never reassigned.
    pub primary_agent_id: Option<AgentId>,
    pub session_metadata: HashMap<String, serde_json::Value>,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub performance_metrics: Option<PerformanceMetrics>,
    pub created_at: DateTime<Utc>,
}

impl OrchestrationSession {
    pub fn new(
        orchestration_type: OrchestrationType,
        primary_agent_id: Option<AgentId>,
        session_metadata: HashMap<String, serde_json::Value>,
        auto_start: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            orchestration_type,
            primary_agent_id,
            session_metadata,
            status: if auto_start {
                SessionStatus::Active
            } else {
                SessionStatus::Pending
            },
            started_at: now,
            ended_at: None,
            performance_metrics: None,
            created_at: now,
        }
    }
}

/// Partial update for `update_session`; only present fields are touched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_metrics: Option<PerformanceMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl SessionUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.performance_metrics.is_none() && self.ended_at.is_none()
    }
}

pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Filters and cursor for `list_sessions`. Results are ordered by
/// creation time descending; the cursor is the creation timestamp of the
/// last row of the previous page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orchestration_type: Option<OrchestrationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_agent_id: Option<AgentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_after: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_before: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl SessionQuery {
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT).max(1)
    }
}

/// One page of `list_sessions` results.
#[derive(Debug, Clone, Serialize)]
pub struct SessionPage {
    pub sessions: Vec<OrchestrationSession>,
    pub next_cursor: Option<DateTime<Utc>>,
}

/// Cost/duration estimate computed at session creation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OrchestrationEstimate {
    pub estimated_cost: f64,
    pub estimated_duration_ms: i64,
}

/// Input to `create_session`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    pub orchestration_type: OrchestrationType,
    #[serde(default)]
    pub selection_criteria: Option<crate::domain::agent::SelectionCriteria>,
    #[serde(default)]
    pub session_metadata: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub auto_start: bool,
}

/// Output of `create_session`: the persisted session, the agents selected
/// into it, and the estimate when selection ran.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedSession {
    pub session: OrchestrationSession,
    pub selected_agents: Vec<SelectedAgent>,
    pub estimate: Option<OrchestrationEstimate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_orchestration_type_round_trip() {
        for ty in [
            OrchestrationType::Solo,
            OrchestrationType::Pair,
            OrchestrationType::Hierarchical,
            OrchestrationType::Swarm,
        ] {
            assert_eq!(OrchestrationType::from_str(ty.as_str()).unwrap(), ty);
        }
    }

    #[test]
    fn test_unknown_orchestration_type_is_typed_error() {
        let err = OrchestrationType::from_str("mesh").unwrap_err();
        assert_eq!(err.code(), "INVALID_ORCHESTRATION_TYPE");
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SessionStatus::Pending.is_terminal());
        assert!(!SessionStatus::Active.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
        assert!(SessionStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_auto_start_controls_initial_status() {
        let started =
            OrchestrationSession::new(OrchestrationType::Solo, None, HashMap::new(), true);
        let parked =
            OrchestrationSession::new(OrchestrationType::Solo, None, HashMap::new(), false);
        assert_eq!(started.status, SessionStatus::Active);
        assert_eq!(parked.status, SessionStatus::Pending);
        assert!(started.ended_at.is_none());
    }

    #[test]
    fn test_parallelization_factors() {
        assert!((OrchestrationType::Solo.parallelization_factor() - 1.0).abs() < f64::EPSILON);
        assert!((OrchestrationType::Pair.parallelization_factor() - 0.7).abs() < f64::EPSILON);
        assert!(
            (OrchestrationType::Hierarchical.parallelization_factor() - 0.5).abs() < f64::EPSILON
        );
        assert!((OrchestrationType::Swarm.parallelization_factor() - 0.3).abs() < f64::EPSILON);
    }
}
