// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Relationship Value Object
//!
//! A directed supervisor → worker edge inside one hierarchical session.
//! Edges are created together with the session row, never mutated, and
//! their lifetime is bound to the owning session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::agent::AgentId;
use crate::domain::session::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipId(pub Uuid);

impl RelationshipId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RelationshipId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Currently always `supervisor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    Supervisor,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Supervisor => "supervisor",
        }
    }
}

impl std::str::FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "supervisor" => Ok(RelationshipType::Supervisor),
            other => Err(format!("unknown relationship type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRelationship {
    pub id: RelationshipId,
    pub session_id: SessionId,
    pub supervisor_agent_id: AgentId,
    pub worker_agent_id: AgentId,
    pub relationship_type: RelationshipType,
    pub created_at: DateTime<Utc>,
}

impl AgentRelationship {
    pub fn supervision(
        session_id: SessionId,
        supervisor_agent_id: AgentId,
        worker_agent_id: AgentId,
    ) -> Self {
        Self {
            id: RelationshipId::new(),
            session_id,
            supervisor_agent_id,
            worker_agent_id,
            relationship_type: RelationshipType::Supervisor,
            created_at: Utc::now(),
        }
    }
}
