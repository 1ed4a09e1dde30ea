// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for the orchestration core, following the DDD
//! Repository pattern: interfaces defined in the domain layer,
//! implemented in `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `CapabilityStore` | `CandidateAgent` (read model) | `InMemoryCapabilityStore`, `PostgresCapabilityStore` |
//! | `SessionRepository` | `OrchestrationSession` | `InMemorySessionRepository`, `PostgresSessionRepository` |
//! | `RelationshipRepository` | `AgentRelationship` | `InMemoryRelationshipRepository`, `PostgresRelationshipRepository` |
//! | `CommunicationRepository` | `AgentCommunication` | `InMemoryCommunicationRepository`, `PostgresCommunicationRepository` |
//!
//! Concrete implementations are selected at startup from configuration;
//! in-memory implementations serve development and testing, PostgreSQL
//! serves production.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::agent::CandidateAgent;
use crate::domain::communication::{AgentCommunication, MessageId};
use crate::domain::relationship::AgentRelationship;
use crate::domain::session::{OrchestrationSession, SessionId, SessionQuery, SessionUpdate};

/// Storage backend enum for pluggable persistence
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL(PostgresConfig),
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub connection_string: String,
}

/// Read model over agent capability data.
///
/// Implementations must return every agent possessing **all** of the
/// required skills, each with only the matching capability subset
/// attached, regardless of which physical shape (normalized rows or the
/// legacy embedded array) the deployment uses.
#[async_trait]
pub trait CapabilityStore: Send + Sync {
    async fn candidates_with_skills(
        &self,
        required_skills: &[String],
    ) -> Result<Vec<CandidateAgent>, RepositoryError>;
}

/// Repository interface for `OrchestrationSession` aggregates.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session together with its supervision edges inside
    /// one transaction. All-or-nothing: a failing edge insert must leave
    /// no session row behind.
    async fn create(
        &self,
        session: &OrchestrationSession,
        relationships: &[AgentRelationship],
    ) -> Result<(), RepositoryError>;

    async fn find_by_id(
        &self,
        id: SessionId,
    ) -> Result<Option<OrchestrationSession>, RepositoryError>;

    /// Apply a partial update touching only the fields present in the
    /// patch. When the patch changes `status`, the current status must be
    /// non-terminal for the row to match. Returns the updated session, or
    /// `None` if no row matched.
    async fn update(
        &self,
        id: SessionId,
        update: &SessionUpdate,
    ) -> Result<Option<OrchestrationSession>, RepositoryError>;

    /// Fetch up to `effective_limit() + 1` rows matching the query,
    /// ordered by creation time descending. The extra row lets the caller
    /// detect a further page without a COUNT.
    async fn list(
        &self,
        query: &SessionQuery,
    ) -> Result<Vec<OrchestrationSession>, RepositoryError>;
}

/// Repository interface for supervision edges (read side; edges are
/// written through `SessionRepository::create`).
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    async fn find_by_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<AgentRelationship>, RepositoryError>;
}

/// Repository interface for `AgentCommunication` aggregates.
#[async_trait]
pub trait CommunicationRepository: Send + Sync {
    async fn insert(&self, message: &AgentCommunication) -> Result<(), RepositoryError>;

    async fn mark_acknowledged(
        &self,
        id: MessageId,
        acknowledged_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
