// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Session Repository
//!
//! Production `SessionRepository` backed by the `orchestration_sessions`
//! and `agent_relationships` tables. Session creation and relationship
//! inserts share one transaction: commit on success, rollback on any
//! inner failure, so partial sessions are never visible.
//!
//! The partial UPDATE is built column-by-column from the patch; a status
//! change additionally requires the current status to be non-terminal,
//! so an illegal transition matches no row and the caller reports
//! `SESSION_NOT_FOUND`.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::agent::AgentId;
use crate::domain::relationship::AgentRelationship;
use crate::domain::repository::{RepositoryError, SessionRepository};
use crate::domain::session::{
    OrchestrationSession, OrchestrationType, PerformanceMetrics, SessionId, SessionQuery,
    SessionStatus, SessionUpdate,
};

const SESSION_COLUMNS: &str = "id, orchestration_type, primary_agent_id, session_metadata, \
     status, started_at, ended_at, performance_metrics, created_at";

pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn create(
        &self,
        session: &OrchestrationSession,
        relationships: &[AgentRelationship],
    ) -> Result<(), RepositoryError> {
        let metadata_json = serde_json::to_value(&session.session_metadata)?;
        let metrics_json = session
            .performance_metrics
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to open transaction: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO orchestration_sessions (
                id, orchestration_type, primary_agent_id, session_metadata,
                status, started_at, ended_at, performance_metrics, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(session.id.0)
        .bind(session.orchestration_type.as_str())
        .bind(session.primary_agent_id.map(|id| id.0))
        .bind(metadata_json)
        .bind(session.status.as_str())
        .bind(session.started_at)
        .bind(session.ended_at)
        .bind(metrics_json)
        .bind(session.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to insert session: {e}")))?;

        for relationship in relationships {
            sqlx::query(
                r#"
                INSERT INTO agent_relationships (
                    id, session_id, supervisor_agent_id, worker_agent_id,
                    relationship_type, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(relationship.id.0)
            .bind(relationship.session_id.0)
            .bind(relationship.supervisor_agent_id.0)
            .bind(relationship.worker_agent_id.0)
            .bind(relationship.relationship_type.as_str())
            .bind(relationship.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                RepositoryError::Database(format!("Failed to insert relationship: {e}"))
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to commit session: {e}")))?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: SessionId,
    ) -> Result<Option<OrchestrationSession>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM orchestration_sessions WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row.map(|row| parse_session_row(&row)).transpose()
    }

    async fn update(
        &self,
        id: SessionId,
        update: &SessionUpdate,
    ) -> Result<Option<OrchestrationSession>, RepositoryError> {
        if update.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE orchestration_sessions SET ");
        let mut fields = builder.separated(", ");
        if let Some(status) = update.status {
            fields.push("status = ");
            fields.push_bind_unseparated(status.as_str());
        }
        if let Some(metrics) = &update.performance_metrics {
            let metrics_json = serde_json::to_value(metrics)?;
            fields.push("performance_metrics = ");
            fields.push_bind_unseparated(metrics_json);
        }
        if let Some(ended_at) = update.ended_at {
            fields.push("ended_at = ");
            fields.push_bind_unseparated(ended_at);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id.0);
        if update.status.is_some() {
            // Terminal states have no outgoing transitions.
            builder.push(" AND status IN ('pending', 'active')");
        }
        builder.push(format!(" RETURNING {SESSION_COLUMNS}"));

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to update session: {e}")))?;

        row.map(|row| parse_session_row(&row)).transpose()
    }

    async fn list(
        &self,
        query: &SessionQuery,
    ) -> Result<Vec<OrchestrationSession>, RepositoryError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {SESSION_COLUMNS} FROM orchestration_sessions WHERE 1=1"
        ));

        if let Some(orchestration_type) = query.orchestration_type {
            builder.push(" AND orchestration_type = ");
            builder.push_bind(orchestration_type.as_str());
        }
        if let Some(status) = query.status {
            builder.push(" AND status = ");
            builder.push_bind(status.as_str());
        }
        if let Some(primary_agent_id) = query.primary_agent_id {
            builder.push(" AND primary_agent_id = ");
            builder.push_bind(primary_agent_id.0);
        }
        if let Some(started_after) = query.started_after {
            builder.push(" AND started_at >= ");
            builder.push_bind(started_after);
        }
        if let Some(started_before) = query.started_before {
            builder.push(" AND started_at <= ");
            builder.push_bind(started_before);
        }
        if let Some(cursor) = query.cursor {
            builder.push(" AND created_at < ");
            builder.push_bind(cursor);
        }

        // One row past the limit so the caller can detect a further page.
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind((query.effective_limit() + 1) as i64);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to list sessions: {e}")))?;

        rows.iter().map(parse_session_row).collect()
    }
}

fn parse_session_row(row: &PgRow) -> Result<OrchestrationSession, RepositoryError> {
    let orchestration_type = OrchestrationType::from_str(&row.get::<String, _>("orchestration_type"))
        .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
    let status = SessionStatus::from_str(&row.get::<String, _>("status"))
        .map_err(RepositoryError::Serialization)?;

    let metadata: HashMap<String, serde_json::Value> =
        serde_json::from_value(row.get("session_metadata"))?;
    let performance_metrics: Option<PerformanceMetrics> = row
        .get::<Option<serde_json::Value>, _>("performance_metrics")
        .map(serde_json::from_value)
        .transpose()?;

    Ok(OrchestrationSession {
        id: SessionId(row.get("id")),
        orchestration_type,
        primary_agent_id: row.get::<Option<Uuid>, _>("primary_agent_id").map(AgentId),
        session_metadata: metadata,
        status,
        started_at: row.get("started_at"),
        ended_at: row.get("ended_at"),
        performance_metrics,
        created_at: row.get("created_at"),
    })
}
