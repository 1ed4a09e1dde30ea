// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Orchestration Error Taxonomy
//!
//! Every error surfaced by this core carries a stable machine-readable
//! code (for the API layer) plus a human message and the session/agent
//! context available at the failure site. Store-layer failures pass
//! through untouched as [`RepositoryError`]; the only place a store error
//! is deliberately absorbed is the primary capability lookup (it degrades
//! to the embedded-array fallback).

use crate::domain::agent::AgentId;
use crate::domain::repository::RepositoryError;
use crate::domain::session::SessionId;

#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    #[error("no agents available matching the selection criteria{}", details_suffix(.details))]
    AgentNotAvailable { details: Option<String> },

    #[error("capability '{skill_id}' is not known to any agent")]
    CapabilityNotFound { skill_id: String },

    #[error("orchestration session {session_id} not found")]
    SessionNotFound { session_id: SessionId },

    #[error("communication rejected for session {session_id}: {reason}")]
    CommunicationFailed { session_id: SessionId, reason: String },

    #[error("resource budget exceeded for agent {agent_id}: {details}")]
    ResourceExceeded { agent_id: AgentId, details: String },

    #[error("coordination timed out after {timeout_ms}ms")]
    CoordinationTimeout { timeout_ms: u64 },

    #[error("invalid orchestration type '{value}'")]
    InvalidOrchestrationType { value: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl OrchestrationError {
    /// Stable machine-readable code shared with the API layer.
    pub fn code(&self) -> &'static str {
        match self {
            OrchestrationError::AgentNotAvailable { .. } => "AGENT_NOT_AVAILABLE",
            OrchestrationError::CapabilityNotFound { .. } => "CAPABILITY_NOT_FOUND",
            OrchestrationError::SessionNotFound { .. } => "SESSION_NOT_FOUND",
            OrchestrationError::CommunicationFailed { .. } => "COMMUNICATION_FAILED",
            OrchestrationError::ResourceExceeded { .. } => "RESOURCE_EXCEEDED",
            OrchestrationError::CoordinationTimeout { .. } => "COORDINATION_TIMEOUT",
            OrchestrationError::InvalidOrchestrationType { .. } => "INVALID_ORCHESTRATION_TYPE",
            OrchestrationError::Repository(_) => "STORAGE_FAILURE",
        }
    }

    /// Session the error is scoped to, when one exists.
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            OrchestrationError::SessionNotFound { session_id }
            | OrchestrationError::CommunicationFailed { session_id, .. } => Some(*session_id),
            _ => None,
        }
    }
}

fn details_suffix(details: &Option<String>) -> String {
    details
        .as_ref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}
