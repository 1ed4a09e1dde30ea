// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Value Objects
//!
//! Identity, capability, and selection types shared by the capability
//! store adapter and the agent selector. `SelectedAgent` is ephemeral:
//! it exists only for the duration of one selection call and is never
//! persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Proficiency assigned to capabilities read from the legacy embedded
/// array, which carries no proficiency field.
pub const DEFAULT_PROFICIENCY: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role an agent plays inside one orchestration session.
///
/// Assigned exactly once per selection call by the pattern strategy in
/// `application::selector`; `Worker` is the pre-selection default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Primary,
    Secondary,
    Supervisor,
    Worker,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Primary => "primary",
            AgentRole::Secondary => "secondary",
            AgentRole::Supervisor => "supervisor",
            AgentRole::Worker => "worker",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(AgentRole::Primary),
            "secondary" => Ok(AgentRole::Secondary),
            "supervisor" => Ok(AgentRole::Supervisor),
            "worker" => Ok(AgentRole::Worker),
            other => Err(format!("unknown agent role '{other}'")),
        }
    }
}

/// A skill/proficiency fact about one agent.
///
/// Normalized shape produced by the capability store adapter regardless
/// of which physical representation the row came from. Rows read from
/// the legacy embedded array have `proficiency_level` defaulted to
/// [`DEFAULT_PROFICIENCY`] and no latency/cost figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCapability {
    pub id: Uuid,
    pub agent_id: AgentId,
    pub skill_id: String,
    /// 1–10 scale.
    pub proficiency_level: u8,
    pub resource_requirements: serde_json::Value,
    /// 0–1 when known.
    pub success_rate: Option<f64>,
    pub average_latency_ms: Option<i64>,
    pub cost_per_operation: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

impl AgentCapability {
    /// Build a capability from a legacy embedded-array entry, defaulting
    /// the numeric fields the embedded shape does not carry.
    pub fn from_embedded(agent_id: AgentId, entry: EmbeddedCapability) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent_id,
            skill_id: entry.id,
            proficiency_level: DEFAULT_PROFICIENCY,
            resource_requirements: entry.resource_requirements,
            success_rate: entry.success_rate,
            average_latency_ms: None,
            cost_per_operation: None,
            updated_at: Utc::now(),
        }
    }
}

/// One entry of the legacy capability array embedded on the agent record.
///
/// Identified by skill id only; proficiency, latency, and cost are absent
/// in this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedCapability {
    pub id: String,
    #[serde(default)]
    pub resource_requirements: serde_json::Value,
    #[serde(default)]
    pub success_rate: Option<f64>,
}

/// An agent returned by the capability store adapter with only the
/// capability subset matching the requested skills attached.
#[derive(Debug, Clone)]
pub struct CandidateAgent {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub capabilities: Vec<AgentCapability>,
}

impl CandidateAgent {
    /// Summed per-operation cost across the matched capability subset.
    pub fn total_capability_cost(&self) -> f64 {
        self.capabilities
            .iter()
            .filter_map(|c| c.cost_per_operation)
            .sum()
    }
}

/// Ephemeral selection result for a single selection call.
#[derive(Debug, Clone, Serialize)]
pub struct SelectedAgent {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub role: AgentRole,
    pub capabilities: Vec<AgentCapability>,
    pub assigned_tasks: Option<Vec<String>>,
}

impl SelectedAgent {
    /// Wrap a candidate with the pre-selection default role.
    pub fn unassigned(candidate: CandidateAgent) -> Self {
        Self {
            agent_id: candidate.agent_id,
            agent_name: candidate.agent_name,
            role: AgentRole::Worker,
            capabilities: candidate.capabilities,
            assigned_tasks: None,
        }
    }

    pub fn total_capability_cost(&self) -> f64 {
        self.capabilities
            .iter()
            .filter_map(|c| c.cost_per_operation)
            .sum()
    }
}

/// Resource/cost constraints a caller may attach to a selection call.
///
/// The resource fields are a policy hook: current behavior is
/// pass-through (every candidate survives). `cost_budget` is enforced
/// against the summed `cost_per_operation` of the matched capabilities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<String>,
}

/// Input to one agent selection call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionCriteria {
    pub required_capabilities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_constraints: Option<ResourceConstraints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub preferences: HashMap<String, serde_json::Value>,
}

impl SelectionCriteria {
    pub fn for_skills<S: Into<String>>(skills: impl IntoIterator<Item = S>) -> Self {
        Self {
            required_capabilities: skills.into_iter().map(Into::into).collect(),
            resource_constraints: None,
            cost_budget: None,
            preferences: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [
            AgentRole::Primary,
            AgentRole::Secondary,
            AgentRole::Supervisor,
            AgentRole::Worker,
        ] {
            assert_eq!(role.as_str().parse::<AgentRole>().unwrap(), role);
        }
        assert!("moderator".parse::<AgentRole>().is_err());
    }

    #[test]
    fn test_embedded_capability_defaults() {
        let agent_id = AgentId::new();
        let entry: EmbeddedCapability =
            serde_json::from_value(serde_json::json!({ "id": "typescript" })).unwrap();
        let capability = AgentCapability::from_embedded(agent_id, entry);

        assert_eq!(capability.skill_id, "typescript");
        assert_eq!(capability.proficiency_level, DEFAULT_PROFICIENCY);
        assert_eq!(capability.agent_id, agent_id);
        assert!(capability.cost_per_operation.is_none());
        assert!(capability.average_latency_ms.is_none());
    }

    #[test]
    fn test_candidate_cost_ignores_unpriced_capabilities() {
        let agent_id = AgentId::new();
        let mut cheap = AgentCapability::from_embedded(
            agent_id,
            EmbeddedCapability {
                id: "rust".to_string(),
                resource_requirements: serde_json::Value::Null,
                success_rate: None,
            },
        );
        cheap.cost_per_operation = Some(0.25);
        let unpriced = AgentCapability::from_embedded(
            agent_id,
            EmbeddedCapability {
                id: "sql".to_string(),
                resource_requirements: serde_json::Value::Null,
                success_rate: None,
            },
        );

        let candidate = CandidateAgent {
            agent_id,
            agent_name: "builder".to_string(),
            capabilities: vec![cheap, unpriced],
        };
        assert!((candidate.total_capability_cost() - 0.25).abs() < f64::EPSILON);
    }
}
