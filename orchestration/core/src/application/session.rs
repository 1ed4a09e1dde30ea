// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Session Service — Application Layer
//!
//! Owns the orchestration session lifecycle: creation (including agent
//! selection and the transactional session + relationship insert),
//! partial updates, listing with cursor pagination, and relationship
//! reads for hierarchical sessions.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Collaborators:**
//!   - Domain: `OrchestrationSession`, `AgentRelationship` aggregates
//!   - Application: `AgentSelector`
//!   - Infrastructure: `SessionRepository`, `RelationshipRepository`

use std::sync::Arc;
use tracing::info;

use crate::application::selector::AgentSelector;
use crate::domain::agent::{AgentRole, SelectedAgent};
use crate::domain::error::OrchestrationError;
use crate::domain::relationship::AgentRelationship;
use crate::domain::repository::{RelationshipRepository, SessionRepository};
use crate::domain::session::{
    CreateSessionRequest, CreatedSession, OrchestrationEstimate, OrchestrationSession,
    OrchestrationType, SessionId, SessionPage, SessionQuery, SessionUpdate,
};

/// Base duration estimate for one orchestration, before the per-pattern
/// parallelization factor is applied.
pub const BASE_DURATION_MS: i64 = 60_000;

pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
    relationships: Arc<dyn RelationshipRepository>,
    selector: AgentSelector,
}

impl SessionService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        relationships: Arc<dyn RelationshipRepository>,
        selector: AgentSelector,
    ) -> Self {
        Self {
            sessions,
            relationships,
            selector,
        }
    }

    /// Create an orchestration session.
    ///
    /// Runs the selector only when selection criteria were supplied (a
    /// request may create a session with zero pre-selected agents). The
    /// session row and, for hierarchical sessions with more than one
    /// agent, the supervision edges are persisted inside one transaction;
    /// failure of any step aborts the whole creation.
    pub async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CreatedSession, OrchestrationError> {
        let selected_agents = match &request.selection_criteria {
            Some(criteria) => {
                let agents = self
                    .selector
                    .select_agents(criteria, request.orchestration_type)
                    .await?;
                if agents.is_empty() {
                    return Err(OrchestrationError::AgentNotAvailable {
                        details: Some(format!(
                            "required capabilities: {}",
                            criteria.required_capabilities.join(", ")
                        )),
                    });
                }
                agents
            }
            None => Vec::new(),
        };

        let estimate = request
            .selection_criteria
            .is_some()
            .then(|| estimate_orchestration(request.orchestration_type, &selected_agents));

        let session = OrchestrationSession::new(
            request.orchestration_type,
            selected_agents.first().map(|agent| agent.agent_id),
            request.session_metadata,
            request.auto_start,
        );

        let relationships =
            if request.orchestration_type == OrchestrationType::Hierarchical
                && selected_agents.len() > 1
            {
                build_supervision_edges(session.id, &selected_agents)
            } else {
                Vec::new()
            };

        self.sessions.create(&session, &relationships).await?;

        info!(
            session_id = %session.id,
            orchestration_type = %session.orchestration_type,
            status = %session.status,
            agents = selected_agents.len(),
            relationships = relationships.len(),
            "orchestration session created"
        );
        metrics::counter!(
            "concord_sessions_created_total",
            "orchestration_type" => session.orchestration_type.as_str()
        )
        .increment(1);

        Ok(CreatedSession {
            session,
            selected_agents,
            estimate,
        })
    }

    /// Apply a partial update. Fails with `SESSION_NOT_FOUND` when no row
    /// matched — including a status change attempted against a session
    /// already in a terminal state (terminal states have no outgoing
    /// transitions, so such a row never matches).
    pub async fn update_session(
        &self,
        session_id: SessionId,
        update: SessionUpdate,
    ) -> Result<OrchestrationSession, OrchestrationError> {
        let updated = self
            .sessions
            .update(session_id, &update)
            .await?
            .ok_or(OrchestrationError::SessionNotFound { session_id })?;

        info!(session_id = %session_id, status = %updated.status, "orchestration session updated");
        Ok(updated)
    }

    /// List sessions ordered by creation time descending. Fetches one row
    /// past the limit to detect a further page; the next cursor is the
    /// creation timestamp of the last returned row.
    pub async fn list_sessions(
        &self,
        query: SessionQuery,
    ) -> Result<SessionPage, OrchestrationError> {
        let limit = query.effective_limit();
        let mut sessions = self.sessions.list(&query).await?;

        let next_cursor = if sessions.len() > limit {
            sessions.truncate(limit);
            sessions.last().map(|session| session.created_at)
        } else {
            None
        };

        Ok(SessionPage {
            sessions,
            next_cursor,
        })
    }

    /// Supervision edges of one session (empty for non-hierarchical
    /// topologies).
    pub async fn session_relationships(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<AgentRelationship>, OrchestrationError> {
        Ok(self.relationships.find_by_session(session_id).await?)
    }
}

/// Derive supervisor → worker edges from a selection result: one edge per
/// worker, all referencing the single supervisor. Does nothing when
/// either side is missing.
pub fn build_supervision_edges(
    session_id: SessionId,
    agents: &[SelectedAgent],
) -> Vec<AgentRelationship> {
    let Some(supervisor) = agents.iter().find(|a| a.role == AgentRole::Supervisor) else {
        return Vec::new();
    };
    agents
        .iter()
        .filter(|a| a.role == AgentRole::Worker)
        .map(|worker| {
            AgentRelationship::supervision(session_id, supervisor.agent_id, worker.agent_id)
        })
        .collect()
}

/// Cost = summed capability costs of every selected agent; duration =
/// base duration scaled by the pattern's parallelization factor.
pub fn estimate_orchestration(
    orchestration_type: OrchestrationType,
    agents: &[SelectedAgent],
) -> OrchestrationEstimate {
    let estimated_cost = agents
        .iter()
        .map(SelectedAgent::total_capability_cost)
        .sum();
    let estimated_duration_ms =
        (BASE_DURATION_MS as f64 * orchestration_type.parallelization_factor()).round() as i64;
    OrchestrationEstimate {
        estimated_cost,
        estimated_duration_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::{AgentCapability, AgentId};
    use chrono::Utc;
    use uuid::Uuid;

    fn selected(name: &str, role: AgentRole, cost: Option<f64>) -> SelectedAgent {
        let agent_id = AgentId::new();
        SelectedAgent {
            agent_id,
            agent_name: name.to_string(),
            role,
            capabilities: vec![AgentCapability {
                id: Uuid::new_v4(),
                agent_id,
                skill_id: "rust".to_string(),
                proficiency_level: 6,
                resource_requirements: serde_json::json!({}),
                success_rate: None,
                average_latency_ms: None,
                cost_per_operation: cost,
                updated_at: Utc::now(),
            }],
            assigned_tasks: None,
        }
    }

    #[test]
    fn test_supervision_edges_one_per_worker() {
        let session_id = SessionId::new();
        let agents = vec![
            selected("lead", AgentRole::Supervisor, None),
            selected("w1", AgentRole::Worker, None),
            selected("w2", AgentRole::Worker, None),
            selected("w3", AgentRole::Worker, None),
        ];

        let edges = build_supervision_edges(session_id, &agents);
        assert_eq!(edges.len(), agents.len() - 1);
        assert!(edges
            .iter()
            .all(|e| e.supervisor_agent_id == agents[0].agent_id));
        assert!(edges.iter().all(|e| e.session_id == session_id));
    }

    #[test]
    fn test_supervision_edges_require_both_sides() {
        let session_id = SessionId::new();
        let only_supervisor = vec![selected("lead", AgentRole::Supervisor, None)];
        assert!(build_supervision_edges(session_id, &only_supervisor).is_empty());

        let only_workers = vec![
            selected("w1", AgentRole::Worker, None),
            selected("w2", AgentRole::Worker, None),
        ];
        assert!(build_supervision_edges(session_id, &only_workers).is_empty());
    }

    #[test]
    fn test_estimate_sums_costs_and_scales_duration() {
        let agents = vec![
            selected("a", AgentRole::Worker, Some(1.5)),
            selected("b", AgentRole::Worker, Some(0.5)),
        ];

        let estimate = estimate_orchestration(OrchestrationType::Swarm, &agents);
        assert!((estimate.estimated_cost - 2.0).abs() < f64::EPSILON);
        assert_eq!(estimate.estimated_duration_ms, 18_000);

        let solo = estimate_orchestration(OrchestrationType::Solo, &agents[..1]);
        assert_eq!(solo.estimated_duration_ms, BASE_DURATION_MS);
    }
}
