// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # In-Memory Repository Backend
//!
//! Development/testing twin of the PostgreSQL backend. One shared
//! [`InMemoryStore`] backs all four repositories so reads observe writes
//! made through the other repositories, and the semantics mirror the
//! production backend: two-tier capability matching, all-or-nothing
//! session + relationship creation, and the non-terminal-status guard on
//! partial updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::agent::{AgentCapability, AgentId, CandidateAgent, EmbeddedCapability};
use crate::domain::communication::{AgentCommunication, MessageId};
use crate::domain::relationship::AgentRelationship;
use crate::domain::repository::{
    CapabilityStore, CommunicationRepository, RelationshipRepository, RepositoryError,
    SessionRepository,
};
use crate::domain::session::{OrchestrationSession, SessionId, SessionQuery, SessionUpdate};
use crate::infrastructure::repositories::postgres_capability::match_embedded;

#[derive(Debug, Clone)]
struct AgentRecord {
    id: AgentId,
    name: String,
}

#[derive(Debug, Clone)]
struct EmbeddedAgentRecord {
    id: AgentId,
    name: String,
    capabilities: Vec<EmbeddedCapability>,
}

/// Shared backing state for the in-memory repositories.
#[derive(Default)]
pub struct InMemoryStore {
    agents: Mutex<Vec<AgentRecord>>,
    structured_capabilities: Mutex<Vec<AgentCapability>>,
    embedded_agents: Mutex<Vec<EmbeddedAgentRecord>>,
    sessions: Mutex<HashMap<SessionId, OrchestrationSession>>,
    relationships: Mutex<Vec<AgentRelationship>>,
    messages: Mutex<Vec<AgentCommunication>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unknown("Mutex poisoned".to_string()))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent visible to the structured capability strategy.
    pub fn register_agent(&self, name: &str) -> AgentId {
        let id = AgentId::new();
        self.agents
            .lock()
            .expect("store mutex poisoned")
            .push(AgentRecord {
                id,
                name: name.to_string(),
            });
        id
    }

    /// Add a normalized capability row for a registered agent.
    pub fn add_capability(&self, capability: AgentCapability) {
        self.structured_capabilities
            .lock()
            .expect("store mutex poisoned")
            .push(capability);
    }

    /// Register an agent carrying only the legacy embedded capability
    /// array.
    pub fn register_embedded_agent(&self, name: &str, skill_ids: &[&str]) -> AgentId {
        let id = AgentId::new();
        let capabilities = skill_ids
            .iter()
            .map(|skill| EmbeddedCapability {
                id: (*skill).to_string(),
                resource_requirements: serde_json::Value::Null,
                success_rate: None,
            })
            .collect();
        self.embedded_agents
            .lock()
            .expect("store mutex poisoned")
            .push(EmbeddedAgentRecord {
                id,
                name: name.to_string(),
                capabilities,
            });
        id
    }

    /// Test inspection: number of messages recorded for a session.
    pub fn session_message_count(&self, session_id: SessionId) -> usize {
        self.messages
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .filter(|m| m.session_id == session_id)
            .count()
    }

    /// Test inspection: a recorded message by id.
    pub fn message(&self, id: MessageId) -> Option<AgentCommunication> {
        self.messages
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }
}

pub struct InMemoryCapabilityStore {
    store: Arc<InMemoryStore>,
}

impl InMemoryCapabilityStore {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CapabilityStore for InMemoryCapabilityStore {
    async fn candidates_with_skills(
        &self,
        required_skills: &[String],
    ) -> Result<Vec<CandidateAgent>, RepositoryError> {
        if required_skills.is_empty() {
            return Ok(Vec::new());
        }

        // Primary strategy: normalized rows, exact-or-superset on every
        // required skill.
        let agents = lock(&self.store.agents)?;
        let rows = lock(&self.store.structured_capabilities)?;
        let mut candidates = Vec::new();
        for agent in agents.iter() {
            let matched: Vec<AgentCapability> = rows
                .iter()
                .filter(|c| c.agent_id == agent.id && required_skills.contains(&c.skill_id))
                .cloned()
                .collect();
            let mut matched_skills: Vec<&str> =
                matched.iter().map(|c| c.skill_id.as_str()).collect();
            matched_skills.sort_unstable();
            matched_skills.dedup();
            if matched_skills.len() == required_skills.len() {
                candidates.push(CandidateAgent {
                    agent_id: agent.id,
                    agent_name: agent.name.clone(),
                    capabilities: matched,
                });
            }
        }
        if !candidates.is_empty() {
            return Ok(candidates);
        }

        // Fallback: scan the embedded arrays.
        let embedded = lock(&self.store.embedded_agents)?;
        Ok(embedded
            .iter()
            .filter_map(|agent| {
                match_embedded(agent.id, agent.capabilities.clone(), required_skills).map(
                    |capabilities| CandidateAgent {
                        agent_id: agent.id,
                        agent_name: agent.name.clone(),
                        capabilities,
                    },
                )
            })
            .collect())
    }
}

pub struct InMemorySessionRepository {
    store: Arc<InMemoryStore>,
}

impl InMemorySessionRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(
        &self,
        session: &OrchestrationSession,
        relationships: &[AgentRelationship],
    ) -> Result<(), RepositoryError> {
        // All-or-nothing: validate every edge before touching the store.
        if let Some(bad) = relationships
            .iter()
            .find(|r| r.session_id != session.id)
        {
            return Err(RepositoryError::Database(format!(
                "Relationship {} references session {} instead of {}",
                bad.id, bad.session_id, session.id
            )));
        }

        let mut sessions = lock(&self.store.sessions)?;
        let mut edges = lock(&self.store.relationships)?;
        sessions.insert(session.id, session.clone());
        edges.extend(relationships.iter().cloned());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: SessionId,
    ) -> Result<Option<OrchestrationSession>, RepositoryError> {
        Ok(lock(&self.store.sessions)?.get(&id).cloned())
    }

    async fn update(
        &self,
        id: SessionId,
        update: &SessionUpdate,
    ) -> Result<Option<OrchestrationSession>, RepositoryError> {
        let mut sessions = lock(&self.store.sessions)?;
        let Some(session) = sessions.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(status) = update.status {
            // Terminal states have no outgoing transitions; mirror the
            // SQL WHERE guard by reporting "no row matched".
            if session.status.is_terminal() {
                return Ok(None);
            }
            session.status = status;
        }
        if let Some(metrics) = &update.performance_metrics {
            session.performance_metrics = Some(metrics.clone());
        }
        if let Some(ended_at) = update.ended_at {
            session.ended_at = Some(ended_at);
        }
        Ok(Some(session.clone()))
    }

    async fn list(
        &self,
        query: &SessionQuery,
    ) -> Result<Vec<OrchestrationSession>, RepositoryError> {
        let sessions = lock(&self.store.sessions)?;
        let mut matched: Vec<OrchestrationSession> = sessions
            .values()
            .filter(|s| {
                query
                    .orchestration_type
                    .map_or(true, |ty| s.orchestration_type == ty)
                    && query.status.map_or(true, |status| s.status == status)
                    && query
                        .primary_agent_id
                        .map_or(true, |id| s.primary_agent_id == Some(id))
                    && query.started_after.map_or(true, |t| s.started_at >= t)
                    && query.started_before.map_or(true, |t| s.started_at <= t)
                    && query.cursor.map_or(true, |cursor| s.created_at < cursor)
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched.truncate(query.effective_limit() + 1);
        Ok(matched)
    }
}

pub struct InMemoryRelationshipRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryRelationshipRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RelationshipRepository for InMemoryRelationshipRepository {
    async fn find_by_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<AgentRelationship>, RepositoryError> {
        Ok(lock(&self.store.relationships)?
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect())
    }
}

pub struct InMemoryCommunicationRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryCommunicationRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommunicationRepository for InMemoryCommunicationRepository {
    async fn insert(&self, message: &AgentCommunication) -> Result<(), RepositoryError> {
        lock(&self.store.messages)?.push(message.clone());
        Ok(())
    }

    async fn mark_acknowledged(
        &self,
        id: MessageId,
        acknowledged_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut messages = lock(&self.store.messages)?;
        match messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.acknowledged_at = Some(acknowledged_at);
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("Message {id}"))),
        }
    }
}
