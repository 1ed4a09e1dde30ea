// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Communication Router — Application Service
//!
//! Records inter-agent messages and enforces the one invariant of the
//! messaging path: a message may only be created while the owning
//! session is `active`. Independent of the agent selector.
//!
//! Acknowledgment is synchronous: when the caller requests it and a
//! direct recipient exists, the message is stamped as acknowledged at
//! send time and the recipient is reported back. Broadcasts are never
//! auto-acknowledged. Known simplification, preserved as-is (see
//! DESIGN.md).

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::communication::{AgentCommunication, MessageReceipt, SendMessageRequest};
use crate::domain::error::OrchestrationError;
use crate::domain::repository::{CommunicationRepository, SessionRepository};
use crate::domain::session::SessionStatus;

pub struct CommunicationRouter {
    sessions: Arc<dyn SessionRepository>,
    messages: Arc<dyn CommunicationRepository>,
}

impl CommunicationRouter {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        messages: Arc<dyn CommunicationRepository>,
    ) -> Self {
        Self { sessions, messages }
    }

    /// Record one message. `delivered` is true once the insert succeeded;
    /// there is no asynchronous delivery confirmation in this design.
    pub async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<MessageReceipt, OrchestrationError> {
        let session = self
            .sessions
            .find_by_id(request.session_id)
            .await?
            .ok_or(OrchestrationError::SessionNotFound {
                session_id: request.session_id,
            })?;

        if session.status != SessionStatus::Active {
            return Err(OrchestrationError::CommunicationFailed {
                session_id: request.session_id,
                reason: format!("session is {}", session.status),
            });
        }

        let message = AgentCommunication::new(
            request.session_id,
            request.from_agent_id,
            request.to_agent_id,
            request.message_type,
            request.payload,
        );
        self.messages.insert(&message).await?;

        let mut acknowledged_by = Vec::new();
        if request.require_acknowledgment {
            if let Some(recipient) = request.to_agent_id {
                self.messages
                    .mark_acknowledged(message.id, Utc::now())
                    .await?;
                acknowledged_by.push(recipient);
                debug!(message_id = %message.id, recipient = %recipient, "message auto-acknowledged");
            }
        }

        info!(
            message_id = %message.id,
            session_id = %request.session_id,
            message_type = %request.message_type,
            broadcast = message.is_broadcast(),
            "agent message routed"
        );
        metrics::counter!(
            "concord_messages_routed_total",
            "message_type" => request.message_type.as_str()
        )
        .increment(1);

        Ok(MessageReceipt {
            message_id: message.id,
            delivered: true,
            acknowledged_by,
        })
    }
}
