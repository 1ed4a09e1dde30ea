// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Communication Aggregate
//!
//! One inter-agent message inside an active session. A message with no
//! recipient is a broadcast to all session participants. Acknowledgment,
//! when requested for a direct recipient, is stamped synchronously at
//! send time; broadcasts are never auto-acknowledged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::agent::AgentId;
use crate::domain::session::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The eight message kinds agents exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    TaskAssignment,
    StatusUpdate,
    ResultShare,
    ErrorReport,
    Coordination,
    ContextHandoff,
    CapabilityQuery,
    ResourceRequest,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::TaskAssignment => "task_assignment",
            MessageType::StatusUpdate => "status_update",
            MessageType::ResultShare => "result_share",
            MessageType::ErrorReport => "error_report",
            MessageType::Coordination => "coordination",
            MessageType::ContextHandoff => "context_handoff",
            MessageType::CapabilityQuery => "capability_query",
            MessageType::ResourceRequest => "resource_request",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task_assignment" => Ok(MessageType::TaskAssignment),
            "status_update" => Ok(MessageType::StatusUpdate),
            "result_share" => Ok(MessageType::ResultShare),
            "error_report" => Ok(MessageType::ErrorReport),
            "coordination" => Ok(MessageType::Coordination),
            "context_handoff" => Ok(MessageType::ContextHandoff),
            "capability_query" => Ok(MessageType::CapabilityQuery),
            "resource_request" => Ok(MessageType::ResourceRequest),
            other => Err(format!("unknown message type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCommunication {
    pub id: MessageId,
    pub session_id: SessionId,
    pub from_agent_id: AgentId,
    /// `None` = broadcast to all session participants.
    pub to_agent_id: Option<AgentId>,
    pub message_type: MessageType,
    pub payload: HashMap<String, serde_json::Value>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AgentCommunication {
    pub fn new(
        session_id: SessionId,
        from_agent_id: AgentId,
        to_agent_id: Option<AgentId>,
        message_type: MessageType,
        payload: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            session_id,
            from_agent_id,
            to_agent_id,
            message_type,
            payload,
            acknowledged_at: None,
            processed_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_broadcast(&self) -> bool {
        self.to_agent_id.is_none()
    }
}

/// Input to `send_message`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub session_id: SessionId,
    pub from_agent_id: AgentId,
    #[serde(default)]
    pub to_agent_id: Option<AgentId>,
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub require_acknowledgment: bool,
}

/// Outcome of `send_message`. `delivered` is true once the insert
/// succeeded; there is no asynchronous delivery confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct MessageReceipt {
    pub message_id: MessageId,
    pub delivered: bool,
    pub acknowledged_by: Vec<AgentId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_message_type_round_trip() {
        for ty in [
            MessageType::TaskAssignment,
            MessageType::StatusUpdate,
            MessageType::ResultShare,
            MessageType::ErrorReport,
            MessageType::Coordination,
            MessageType::ContextHandoff,
            MessageType::CapabilityQuery,
            MessageType::ResourceRequest,
        ] {
            assert_eq!(MessageType::from_str(ty.as_str()).unwrap(), ty);
        }
        assert!(MessageType::from_str("gossip").is_err());
    }

    #[test]
    fn test_broadcast_has_no_recipient() {
        let message = AgentCommunication::new(
            SessionId::new(),
            AgentId::new(),
            None,
            MessageType::Coordination,
            HashMap::new(),
        );
        assert!(message.is_broadcast());
        assert!(message.acknowledged_at.is_none());
    }
}
