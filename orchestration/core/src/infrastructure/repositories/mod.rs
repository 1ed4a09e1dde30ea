// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repository Implementations
//!
//! Two backends per domain contract: PostgreSQL for production, a shared
//! in-memory store for development and testing. Backend selection happens
//! in `application::repository_factory`.

pub mod memory;
pub mod postgres_capability;
pub mod postgres_communication;
pub mod postgres_relationship;
pub mod postgres_session;

pub use memory::{
    InMemoryCapabilityStore, InMemoryCommunicationRepository, InMemoryRelationshipRepository,
    InMemorySessionRepository, InMemoryStore,
};
pub use postgres_capability::PostgresCapabilityStore;
pub use postgres_communication::PostgresCommunicationRepository;
pub use postgres_relationship::PostgresRelationshipRepository;
pub use postgres_session::PostgresSessionRepository;
