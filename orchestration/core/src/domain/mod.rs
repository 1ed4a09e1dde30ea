// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain Layer
//!
//! Aggregates, value objects, and repository contracts for the
//! orchestration core. No infrastructure dependencies beyond the error
//! conversions in `repository`.

pub mod agent;
pub mod session;
pub mod relationship;
pub mod communication;
pub mod error;
pub mod repository;
pub mod config;

pub use agent::{AgentCapability, AgentId, AgentRole, CandidateAgent, SelectedAgent, SelectionCriteria};
pub use communication::{AgentCommunication, MessageId, MessageReceipt, MessageType, SendMessageRequest};
pub use error::OrchestrationError;
pub use relationship::{AgentRelationship, RelationshipId, RelationshipType};
pub use session::{
    CreateSessionRequest, CreatedSession, OrchestrationEstimate, OrchestrationSession,
    OrchestrationType, SessionId, SessionPage, SessionQuery, SessionStatus, SessionUpdate,
};
