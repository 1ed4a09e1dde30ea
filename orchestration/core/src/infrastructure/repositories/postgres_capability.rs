// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Capability Store
//!
//! Two-tier `CapabilityStore` implementation. The primary strategy reads
//! the normalized `agent_capabilities` table; an agent qualifies only if
//! its count of distinct matched skill ids equals the number of required
//! skills. When the primary strategy yields zero rows — including when
//! the table is missing or the query fails — the adapter falls back to
//! scanning the legacy capability array embedded on the `agents` record
//! and keeps agents whose capability id set is a superset of the
//! required skills. Missing numeric fields are defaulted, not treated as
//! a match failure.
//!
//! The swallowed primary-path error is the only deliberately absorbed
//! store failure in the core.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::domain::agent::{AgentCapability, AgentId, CandidateAgent, EmbeddedCapability};
use crate::domain::repository::{CapabilityStore, RepositoryError};

pub struct PostgresCapabilityStore {
    pool: PgPool,
}

impl PostgresCapabilityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn structured_candidates(
        &self,
        required_skills: &[String],
    ) -> Result<Vec<CandidateAgent>, sqlx::Error> {
        let skills: Vec<String> = required_skills.to_vec();
        let rows = sqlx::query(
            r#"
            SELECT
                c.id, c.agent_id, a.name AS agent_name, c.skill_id,
                c.proficiency_level, c.resource_requirements, c.success_rate,
                c.average_latency_ms, c.cost_per_operation, c.updated_at
            FROM agent_capabilities c
            JOIN agents a ON a.id = c.agent_id
            WHERE c.skill_id = ANY($1)
              AND c.agent_id IN (
                  SELECT agent_id
                  FROM agent_capabilities
                  WHERE skill_id = ANY($1)
                  GROUP BY agent_id
                  HAVING COUNT(DISTINCT skill_id) = $2
              )
            ORDER BY a.name ASC, c.skill_id ASC
            "#,
        )
        .bind(&skills)
        .bind(required_skills.len() as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut candidates: Vec<CandidateAgent> = Vec::new();
        let mut positions: HashMap<AgentId, usize> = HashMap::new();
        for row in rows {
            let agent_id = AgentId(row.get("agent_id"));
            let capability = AgentCapability {
                id: row.get("id"),
                agent_id,
                skill_id: row.get("skill_id"),
                proficiency_level: row.get::<i16, _>("proficiency_level") as u8,
                resource_requirements: row.get("resource_requirements"),
                success_rate: row.get("success_rate"),
                average_latency_ms: row.get("average_latency_ms"),
                cost_per_operation: row.get("cost_per_operation"),
                updated_at: row.get("updated_at"),
            };

            match positions.get(&agent_id) {
                Some(&index) => candidates[index].capabilities.push(capability),
                None => {
                    positions.insert(agent_id, candidates.len());
                    candidates.push(CandidateAgent {
                        agent_id,
                        agent_name: row.get("agent_name"),
                        capabilities: vec![capability],
                    });
                }
            }
        }
        Ok(candidates)
    }

    async fn embedded_candidates(
        &self,
        required_skills: &[String],
    ) -> Result<Vec<CandidateAgent>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, capabilities
            FROM agents
            WHERE capabilities IS NOT NULL
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let mut candidates = Vec::new();
        for row in rows {
            let agent_id = AgentId(row.get("id"));
            let raw: serde_json::Value = row.get("capabilities");
            let entries: Vec<EmbeddedCapability> = serde_json::from_value(raw)?;

            let matched = match_embedded(agent_id, entries, required_skills);
            if let Some(capabilities) = matched {
                candidates.push(CandidateAgent {
                    agent_id,
                    agent_name: row.get("name"),
                    capabilities,
                });
            }
        }
        Ok(candidates)
    }
}

/// Superset match over the embedded array: returns the matching subset
/// (normalized, with defaults) when the agent holds every required
/// skill, `None` otherwise.
pub(crate) fn match_embedded(
    agent_id: AgentId,
    entries: Vec<EmbeddedCapability>,
    required_skills: &[String],
) -> Option<Vec<AgentCapability>> {
    let holds_all = required_skills
        .iter()
        .all(|skill| entries.iter().any(|entry| &entry.id == skill));
    if !holds_all {
        return None;
    }

    Some(
        entries
            .into_iter()
            .filter(|entry| required_skills.contains(&entry.id))
            .map(|entry| AgentCapability::from_embedded(agent_id, entry))
            .collect(),
    )
}

#[async_trait]
impl CapabilityStore for PostgresCapabilityStore {
    async fn candidates_with_skills(
        &self,
        required_skills: &[String],
    ) -> Result<Vec<CandidateAgent>, RepositoryError> {
        if required_skills.is_empty() {
            return Ok(Vec::new());
        }

        match self.structured_candidates(required_skills).await {
            Ok(candidates) if !candidates.is_empty() => return Ok(candidates),
            Ok(_) => {
                debug!(skills = ?required_skills, "structured capability lookup empty, trying embedded array");
            }
            Err(e) => {
                // Deployments without the normalized table land here.
                warn!(error = %e, "structured capability lookup failed, falling back to embedded array");
            }
        }

        self.embedded_candidates(required_skills).await
    }
}
