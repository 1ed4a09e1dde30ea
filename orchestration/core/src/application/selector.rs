// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Selector — Application Service
//!
//! Picks the agents participating in a session: fetches candidates from
//! the capability store, filters them by resource/cost constraints, then
//! applies the orchestration-pattern role strategy.
//!
//! ## Role Strategy Table
//! | Pattern | Surviving candidates | Result |
//! |---------|---------------------|--------|
//! | `solo` | ≥1 | first candidate, role `primary` |
//! | `pair` | ≥2 | first two, roles `primary` + `secondary` |
//! | `pair` | exactly 1 | returned unmodified (role stays `worker`) |
//! | `hierarchical` | ≥1 | first is `supervisor`, rest `worker` |
//! | `swarm` | any | first 10 at most, all `worker` |
//!
//! Candidates are considered in store order; callers must not depend on
//! ranking beyond first-returned-first-considered.

use std::sync::Arc;
use tracing::debug;

use crate::domain::agent::{AgentRole, SelectedAgent, SelectionCriteria};
use crate::domain::error::OrchestrationError;
use crate::domain::repository::CapabilityStore;
use crate::domain::session::OrchestrationType;

/// Hard cap on swarm width.
pub const SWARM_MAX_AGENTS: usize = 10;

pub struct AgentSelector {
    capabilities: Arc<dyn CapabilityStore>,
}

impl AgentSelector {
    pub fn new(capabilities: Arc<dyn CapabilityStore>) -> Self {
        Self { capabilities }
    }

    /// Select and role-assign agents for one orchestration call.
    ///
    /// Returns an empty list when no candidate survives; raising
    /// `AGENT_NOT_AVAILABLE` on empty results is the session service's
    /// responsibility (a bare selection call is allowed to come back
    /// empty).
    pub async fn select_agents(
        &self,
        criteria: &SelectionCriteria,
        orchestration_type: OrchestrationType,
    ) -> Result<Vec<SelectedAgent>, OrchestrationError> {
        let candidates = self
            .capabilities
            .candidates_with_skills(&criteria.required_capabilities)
            .await?;
        debug!(
            candidates = candidates.len(),
            skills = ?criteria.required_capabilities,
            "capability lookup complete"
        );

        let mut survivors: Vec<SelectedAgent> = candidates
            .into_iter()
            .map(SelectedAgent::unassigned)
            .collect();

        if let Some(constraints) = &criteria.resource_constraints {
            survivors = filter_by_resources(survivors, constraints);
        }
        if let Some(budget) = criteria.cost_budget {
            survivors.retain(|agent| agent.total_capability_cost() <= budget);
        }

        Ok(assign_roles(orchestration_type, survivors))
    }
}

/// Resource-constraint policy hook. Current contract is pass-through:
/// every candidate survives. Kept as a seam so a real policy can land
/// without touching the selection flow.
fn filter_by_resources(
    agents: Vec<SelectedAgent>,
    _constraints: &crate::domain::agent::ResourceConstraints,
) -> Vec<SelectedAgent> {
    agents
}

fn assign_roles(
    orchestration_type: OrchestrationType,
    mut agents: Vec<SelectedAgent>,
) -> Vec<SelectedAgent> {
    match orchestration_type {
        OrchestrationType::Solo => {
            agents.truncate(1);
            if let Some(agent) = agents.first_mut() {
                agent.role = AgentRole::Primary;
            }
            agents
        }
        OrchestrationType::Pair => {
            if agents.len() >= 2 {
                agents.truncate(2);
                agents[0].role = AgentRole::Primary;
                agents[1].role = AgentRole::Secondary;
            }
            // A single survivor keeps its pre-selection role. Observed
            // behavior, preserved on purpose; see DESIGN.md.
            agents
        }
        OrchestrationType::Hierarchical => {
            for (index, agent) in agents.iter_mut().enumerate() {
                agent.role = if index == 0 {
                    AgentRole::Supervisor
                } else {
                    AgentRole::Worker
                };
            }
            agents
        }
        OrchestrationType::Swarm => {
            // Cap first, then mark: only the selected agents may be
            // mutated.
            agents.truncate(SWARM_MAX_AGENTS);
            for agent in &mut agents {
                agent.role = AgentRole::Worker;
            }
            agents
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::{AgentCapability, AgentId, CandidateAgent};
    use crate::domain::repository::RepositoryError;
    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    struct FixedStore {
        candidates: Vec<CandidateAgent>,
    }

    #[async_trait]
    impl CapabilityStore for FixedStore {
        async fn candidates_with_skills(
            &self,
            _required_skills: &[String],
        ) -> Result<Vec<CandidateAgent>, RepositoryError> {
            Ok(self.candidates.clone())
        }
    }

    fn candidate(name: &str, cost: Option<f64>) -> CandidateAgent {
        let agent_id = AgentId::new();
        CandidateAgent {
            agent_id,
            agent_name: name.to_string(),
            capabilities: vec![AgentCapability {
                id: Uuid::new_v4(),
                agent_id,
                skill_id: "typescript".to_string(),
                proficiency_level: 7,
                resource_requirements: serde_json::json!({}),
                success_rate: Some(0.9),
                average_latency_ms: Some(120),
                cost_per_operation: cost,
                updated_at: Utc::now(),
            }],
        }
    }

    fn selector_with(candidates: Vec<CandidateAgent>) -> AgentSelector {
        AgentSelector::new(Arc::new(FixedStore { candidates }))
    }

    #[tokio::test]
    async fn test_solo_takes_first_as_primary() {
        let selector = selector_with(vec![candidate("a", None), candidate("b", None)]);
        let criteria = SelectionCriteria::for_skills(["typescript"]);

        let selected = selector
            .select_agents(&criteria, OrchestrationType::Solo)
            .await
            .unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].agent_name, "a");
        assert_eq!(selected[0].role, AgentRole::Primary);
    }

    #[tokio::test]
    async fn test_solo_with_no_candidates_is_empty() {
        let selector = selector_with(vec![]);
        let criteria = SelectionCriteria::for_skills(["typescript"]);

        let selected = selector
            .select_agents(&criteria, OrchestrationType::Solo)
            .await
            .unwrap();
        assert!(selected.is_empty());
    }

    #[tokio::test]
    async fn test_pair_assigns_primary_and_secondary() {
        let selector = selector_with(vec![
            candidate("a", None),
            candidate("b", None),
            candidate("c", None),
        ]);
        let criteria = SelectionCriteria::for_skills(["typescript"]);

        let selected = selector
            .select_agents(&criteria, OrchestrationType::Pair)
            .await
            .unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].role, AgentRole::Primary);
        assert_eq!(selected[1].role, AgentRole::Secondary);
    }

    #[tokio::test]
    async fn test_pair_single_survivor_keeps_worker_role() {
        let selector = selector_with(vec![candidate("a", None)]);
        let criteria = SelectionCriteria::for_skills(["typescript"]);

        let selected = selector
            .select_agents(&criteria, OrchestrationType::Pair)
            .await
            .unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].role, AgentRole::Worker);
    }

    #[tokio::test]
    async fn test_hierarchical_marks_one_supervisor_rest_workers() {
        let selector = selector_with(vec![
            candidate("lead", None),
            candidate("w1", None),
            candidate("w2", None),
        ]);
        let criteria = SelectionCriteria::for_skills(["typescript"]);

        let selected = selector
            .select_agents(&criteria, OrchestrationType::Hierarchical)
            .await
            .unwrap();
        assert_eq!(selected[0].role, AgentRole::Supervisor);
        assert!(selected[1..].iter().all(|a| a.role == AgentRole::Worker));
    }

    #[tokio::test]
    async fn test_swarm_caps_at_ten_workers() {
        let candidates: Vec<CandidateAgent> = (0..14)
            .map(|i| candidate(&format!("agent-{i}"), None))
            .collect();
        let selector = selector_with(candidates);
        let criteria = SelectionCriteria::for_skills(["typescript"]);

        let selected = selector
            .select_agents(&criteria, OrchestrationType::Swarm)
            .await
            .unwrap();
        assert_eq!(selected.len(), SWARM_MAX_AGENTS);
        assert!(selected.iter().all(|a| a.role == AgentRole::Worker));
        // First-returned-first-considered: the cap keeps the head of the
        // candidate list.
        assert_eq!(selected[0].agent_name, "agent-0");
        assert_eq!(selected[9].agent_name, "agent-9");
    }

    #[test]
    fn test_swarm_marks_only_selected_agents() {
        // Regression for the mutate-then-slice bug class: agents beyond
        // the cap must retain their pre-selection role.
        let pool: Vec<SelectedAgent> = (0..12)
            .map(|i| SelectedAgent::unassigned(candidate(&format!("agent-{i}"), None)))
            .collect();

        let selected = assign_roles(OrchestrationType::Swarm, pool.clone());
        assert_eq!(selected.len(), SWARM_MAX_AGENTS);
        assert!(selected.iter().all(|a| a.role == AgentRole::Worker));
        assert!(pool[SWARM_MAX_AGENTS..]
            .iter()
            .all(|a| a.role == AgentRole::Worker && a.assigned_tasks.is_none()));
    }

    #[tokio::test]
    async fn test_cost_budget_filters_expensive_agents() {
        let selector = selector_with(vec![
            candidate("pricey", Some(5.0)),
            candidate("affordable", Some(0.5)),
        ]);
        let mut criteria = SelectionCriteria::for_skills(["typescript"]);
        criteria.cost_budget = Some(1.0);

        let selected = selector
            .select_agents(&criteria, OrchestrationType::Solo)
            .await
            .unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].agent_name, "affordable");
    }

    #[tokio::test]
    async fn test_resource_constraints_are_pass_through() {
        let selector = selector_with(vec![candidate("a", None), candidate("b", None)]);
        let mut criteria = SelectionCriteria::for_skills(["typescript"]);
        criteria.resource_constraints = Some(crate::domain::agent::ResourceConstraints {
            cpu: Some(500),
            memory: Some("256Mi".to_string()),
            disk: None,
        });

        let selected = selector
            .select_agents(&criteria, OrchestrationType::Pair)
            .await
            .unwrap();
        assert_eq!(selected.len(), 2);
    }
}
