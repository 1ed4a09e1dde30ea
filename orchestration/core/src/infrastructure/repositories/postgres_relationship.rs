// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Relationship Repository
//!
//! Read side of the `agent_relationships` table. Edges are written by
//! `PostgresSessionRepository::create` inside the session transaction.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;
use std::str::FromStr;

use crate::domain::agent::AgentId;
use crate::domain::relationship::{AgentRelationship, RelationshipId, RelationshipType};
use crate::domain::repository::{RelationshipRepository, RepositoryError};
use crate::domain::session::SessionId;

pub struct PostgresRelationshipRepository {
    pool: PgPool,
}

impl PostgresRelationshipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationshipRepository for PostgresRelationshipRepository {
    async fn find_by_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<AgentRelationship>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, supervisor_agent_id, worker_agent_id,
                   relationship_type, created_at
            FROM agent_relationships
            WHERE session_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(session_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let relationship_type =
                    RelationshipType::from_str(&row.get::<String, _>("relationship_type"))
                        .map_err(RepositoryError::Serialization)?;
                Ok(AgentRelationship {
                    id: RelationshipId(row.get("id")),
                    session_id: SessionId(row.get("session_id")),
                    supervisor_agent_id: AgentId(row.get("supervisor_agent_id")),
                    worker_agent_id: AgentId(row.get("worker_agent_id")),
                    relationship_type,
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }
}
