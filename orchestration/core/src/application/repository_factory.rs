// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory - Application Layer
//!
//! Creates concrete repository implementations based on storage backend
//! configuration, keeping the Domain Layer pure and free of
//! infrastructure dependencies:
//!
//! - Domain layer: defines repository traits (pure interfaces)
//! - Application layer: implements the factory that creates instances
//! - Infrastructure layer: provides concrete implementations
//!
//! The in-memory backend shares one [`InMemoryStore`] across all four
//! repositories so that session, relationship, and message reads observe
//! the writes made through the other repositories — the same visibility
//! the PostgreSQL backend gets from sharing one pool.

use anyhow::Result;
use std::sync::Arc;

use crate::domain::repository::{
    CapabilityStore, CommunicationRepository, RelationshipRepository, SessionRepository,
    StorageBackend,
};
use crate::infrastructure::db::Database;
use crate::infrastructure::repositories::memory::{
    InMemoryCapabilityStore, InMemoryCommunicationRepository, InMemoryRelationshipRepository,
    InMemorySessionRepository, InMemoryStore,
};
use crate::infrastructure::repositories::postgres_capability::PostgresCapabilityStore;
use crate::infrastructure::repositories::postgres_communication::PostgresCommunicationRepository;
use crate::infrastructure::repositories::postgres_relationship::PostgresRelationshipRepository;
use crate::infrastructure::repositories::postgres_session::PostgresSessionRepository;

/// The full repository set backing the orchestration services.
#[derive(Clone)]
pub struct RepositorySet {
    pub capabilities: Arc<dyn CapabilityStore>,
    pub sessions: Arc<dyn SessionRepository>,
    pub relationships: Arc<dyn RelationshipRepository>,
    pub communications: Arc<dyn CommunicationRepository>,
}

impl RepositorySet {
    /// Build the repository set for the configured backend. The Postgres
    /// pool is created lazily; no connection is attempted here.
    pub fn from_backend(backend: &StorageBackend) -> Result<Self> {
        match backend {
            StorageBackend::InMemory => Ok(Self::in_memory()),
            StorageBackend::PostgreSQL(config) => {
                let database = Database::connect_lazy(&config.connection_string)?;
                Ok(Self::postgres(&database))
            }
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            capabilities: Arc::new(InMemoryCapabilityStore::new(store.clone())),
            sessions: Arc::new(InMemorySessionRepository::new(store.clone())),
            relationships: Arc::new(InMemoryRelationshipRepository::new(store.clone())),
            communications: Arc::new(InMemoryCommunicationRepository::new(store)),
        }
    }

    pub fn postgres(database: &Database) -> Self {
        let pool = database.get_pool().clone();
        Self {
            capabilities: Arc::new(PostgresCapabilityStore::new(pool.clone())),
            sessions: Arc::new(PostgresSessionRepository::new(pool.clone())),
            relationships: Arc::new(PostgresRelationshipRepository::new(pool.clone())),
            communications: Arc::new(PostgresCommunicationRepository::new(pool)),
        }
    }
}
