// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Communication Repository
//!
//! Inserts into the `agent_communications` table and stamps synchronous
//! acknowledgments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;

use crate::domain::communication::{AgentCommunication, MessageId};
use crate::domain::repository::{CommunicationRepository, RepositoryError};

pub struct PostgresCommunicationRepository {
    pool: PgPool,
}

impl PostgresCommunicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommunicationRepository for PostgresCommunicationRepository {
    async fn insert(&self, message: &AgentCommunication) -> Result<(), RepositoryError> {
        let payload_json = serde_json::to_value(&message.payload)?;

        sqlx::query(
            r#"
            INSERT INTO agent_communications (
                id, session_id, from_agent_id, to_agent_id, message_type,
                payload, acknowledged_at, processed_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(message.id.0)
        .bind(message.session_id.0)
        .bind(message.from_agent_id.0)
        .bind(message.to_agent_id.map(|id| id.0))
        .bind(message.message_type.as_str())
        .bind(payload_json)
        .bind(message.acknowledged_at)
        .bind(message.processed_at)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to insert message: {e}")))?;

        Ok(())
    }

    async fn mark_acknowledged(
        &self,
        id: MessageId,
        acknowledged_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE agent_communications SET acknowledged_at = $2 WHERE id = $1")
            .bind(id.0)
            .bind(acknowledged_at)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }
}
