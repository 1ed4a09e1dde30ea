// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! End-to-end flows over the in-memory backend: session creation with
//! selection and role assignment, relationship persistence, message
//! routing, and cursor pagination.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};

use concord_core::application::{AgentSelector, CommunicationRouter, SessionService};
use concord_core::domain::agent::{AgentCapability, AgentId, AgentRole, SelectionCriteria};
use concord_core::domain::communication::{MessageType, SendMessageRequest};
use concord_core::domain::error::OrchestrationError;
use concord_core::domain::repository::SessionRepository;
use concord_core::domain::session::{
    CreateSessionRequest, OrchestrationSession, OrchestrationType, SessionId, SessionQuery,
    SessionStatus, SessionUpdate,
};
use concord_core::infrastructure::repositories::{
    InMemoryCapabilityStore, InMemoryCommunicationRepository, InMemoryRelationshipRepository,
    InMemorySessionRepository, InMemoryStore,
};

struct Harness {
    store: Arc<InMemoryStore>,
    sessions: SessionService,
    router: CommunicationRouter,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let capabilities = Arc::new(InMemoryCapabilityStore::new(store.clone()));
    let session_repo = Arc::new(InMemorySessionRepository::new(store.clone()));
    let relationship_repo = Arc::new(InMemoryRelationshipRepository::new(store.clone()));
    let communication_repo = Arc::new(InMemoryCommunicationRepository::new(store.clone()));

    let selector = AgentSelector::new(capabilities);
    let sessions = SessionService::new(session_repo.clone(), relationship_repo, selector);
    let router = CommunicationRouter::new(session_repo, communication_repo);

    Harness {
        store,
        sessions,
        router,
    }
}

fn seed_agent(store: &InMemoryStore, name: &str, skills: &[&str], cost: Option<f64>) -> AgentId {
    let agent_id = store.register_agent(name);
    for skill in skills {
        store.add_capability(AgentCapability {
            id: uuid::Uuid::new_v4(),
            agent_id,
            skill_id: (*skill).to_string(),
            proficiency_level: 7,
            resource_requirements: serde_json::json!({}),
            success_rate: Some(0.9),
            average_latency_ms: Some(150),
            cost_per_operation: cost,
            updated_at: Utc::now(),
        });
    }
    agent_id
}

fn create_request(
    orchestration_type: OrchestrationType,
    skills: &[&str],
    auto_start: bool,
) -> CreateSessionRequest {
    CreateSessionRequest {
        orchestration_type,
        selection_criteria: Some(SelectionCriteria::for_skills(skills.iter().copied())),
        session_metadata: HashMap::new(),
        auto_start,
    }
}

#[tokio::test]
async fn test_pair_session_with_two_matching_agents() {
    let h = harness();
    let first = seed_agent(&h.store, "ada", &["typescript"], Some(0.4));
    let second = seed_agent(&h.store, "grace", &["typescript"], Some(0.6));

    let created = h
        .sessions
        .create_session(create_request(OrchestrationType::Pair, &["typescript"], true))
        .await
        .unwrap();

    assert_eq!(created.selected_agents.len(), 2);
    assert_eq!(created.selected_agents[0].role, AgentRole::Primary);
    assert_eq!(created.selected_agents[1].role, AgentRole::Secondary);
    assert_eq!(created.selected_agents[0].agent_id, first);
    assert_eq!(created.selected_agents[1].agent_id, second);

    assert_eq!(created.session.primary_agent_id, Some(first));
    assert_eq!(created.session.status, SessionStatus::Active);

    let estimate = created.estimate.expect("estimate when selection ran");
    assert!((estimate.estimated_cost - 1.0).abs() < f64::EPSILON);
    assert_eq!(estimate.estimated_duration_ms, 42_000);

    // The row is actually persisted.
    let page = h.sessions.list_sessions(SessionQuery::default()).await.unwrap();
    assert_eq!(page.sessions.len(), 1);
    assert_eq!(page.sessions[0].id, created.session.id);
}

#[tokio::test]
async fn test_auto_start_false_parks_session_pending() {
    let h = harness();
    seed_agent(&h.store, "ada", &["typescript"], None);

    let created = h
        .sessions
        .create_session(create_request(OrchestrationType::Solo, &["typescript"], false))
        .await
        .unwrap();
    assert_eq!(created.session.status, SessionStatus::Pending);
}

#[tokio::test]
async fn test_criteria_with_no_candidates_fails_typed() {
    let h = harness();

    let err = h
        .sessions
        .create_session(create_request(OrchestrationType::Solo, &["cobol"], true))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "AGENT_NOT_AVAILABLE");

    // Nothing was persisted.
    let page = h.sessions.list_sessions(SessionQuery::default()).await.unwrap();
    assert!(page.sessions.is_empty());
}

#[tokio::test]
async fn test_session_without_criteria_has_no_agents_or_estimate() {
    let h = harness();

    let created = h
        .sessions
        .create_session(CreateSessionRequest {
            orchestration_type: OrchestrationType::Swarm,
            selection_criteria: None,
            session_metadata: HashMap::new(),
            auto_start: true,
        })
        .await
        .unwrap();

    assert!(created.selected_agents.is_empty());
    assert!(created.estimate.is_none());
    assert!(created.session.primary_agent_id.is_none());
}

#[tokio::test]
async fn test_hierarchical_session_persists_supervision_edges() {
    let h = harness();
    let lead = seed_agent(&h.store, "lead", &["rust"], None);
    let workers = [
        seed_agent(&h.store, "w1", &["rust"], None),
        seed_agent(&h.store, "w2", &["rust"], None),
        seed_agent(&h.store, "w3", &["rust"], None),
    ];

    let created = h
        .sessions
        .create_session(create_request(OrchestrationType::Hierarchical, &["rust"], true))
        .await
        .unwrap();
    assert_eq!(created.selected_agents[0].role, AgentRole::Supervisor);

    let edges = h
        .sessions
        .session_relationships(created.session.id)
        .await
        .unwrap();
    assert_eq!(edges.len(), workers.len());
    assert!(edges.iter().all(|e| e.supervisor_agent_id == lead));
    let mut edge_workers: Vec<AgentId> = edges.iter().map(|e| e.worker_agent_id).collect();
    edge_workers.sort_by_key(|id| id.0);
    let mut expected: Vec<AgentId> = workers.to_vec();
    expected.sort_by_key(|id| id.0);
    assert_eq!(edge_workers, expected);
}

#[tokio::test]
async fn test_single_agent_hierarchy_creates_no_edges() {
    let h = harness();
    seed_agent(&h.store, "lonely", &["rust"], None);

    let created = h
        .sessions
        .create_session(create_request(OrchestrationType::Hierarchical, &["rust"], true))
        .await
        .unwrap();
    assert_eq!(created.selected_agents.len(), 1);

    let edges = h
        .sessions
        .session_relationships(created.session.id)
        .await
        .unwrap();
    assert!(edges.is_empty());
}

#[tokio::test]
async fn test_swarm_selection_through_embedded_fallback() {
    let h = harness();
    // Legacy deployment: capabilities live only on the agent records.
    for i in 0..12 {
        h.store
            .register_embedded_agent(&format!("swarm-{i}"), &["scraping"]);
    }

    let created = h
        .sessions
        .create_session(create_request(OrchestrationType::Swarm, &["scraping"], true))
        .await
        .unwrap();

    assert_eq!(created.selected_agents.len(), 10);
    assert!(created
        .selected_agents
        .iter()
        .all(|a| a.role == AgentRole::Worker));
}

#[tokio::test]
async fn test_send_message_requires_active_session() {
    let h = harness();
    seed_agent(&h.store, "ada", &["typescript"], None);

    let created = h
        .sessions
        .create_session(create_request(OrchestrationType::Solo, &["typescript"], false))
        .await
        .unwrap();
    let session_id = created.session.id;
    let sender = created.selected_agents[0].agent_id;

    let err = h
        .router
        .send_message(SendMessageRequest {
            session_id,
            from_agent_id: sender,
            to_agent_id: None,
            message_type: MessageType::StatusUpdate,
            payload: HashMap::new(),
            require_acknowledgment: false,
        })
        .await
        .unwrap_err();

    assert_eq!(err.code(), "COMMUNICATION_FAILED");
    assert!(matches!(err, OrchestrationError::CommunicationFailed { .. }));
    // No message row was created.
    assert_eq!(h.store.session_message_count(session_id), 0);
}

#[tokio::test]
async fn test_direct_message_auto_acknowledged_on_request() {
    let h = harness();
    seed_agent(&h.store, "ada", &["typescript"], None);
    seed_agent(&h.store, "grace", &["typescript"], None);

    let created = h
        .sessions
        .create_session(create_request(OrchestrationType::Pair, &["typescript"], true))
        .await
        .unwrap();
    let from = created.selected_agents[0].agent_id;
    let to = created.selected_agents[1].agent_id;

    let receipt = h
        .router
        .send_message(SendMessageRequest {
            session_id: created.session.id,
            from_agent_id: from,
            to_agent_id: Some(to),
            message_type: MessageType::TaskAssignment,
            payload: HashMap::from([(
                "task".to_string(),
                serde_json::json!("implement parser"),
            )]),
            require_acknowledgment: true,
        })
        .await
        .unwrap();

    assert!(receipt.delivered);
    assert_eq!(receipt.acknowledged_by, vec![to]);
    let stored = h.store.message(receipt.message_id).unwrap();
    assert!(stored.acknowledged_at.is_some());
}

#[tokio::test]
async fn test_broadcast_is_never_auto_acknowledged() {
    let h = harness();
    seed_agent(&h.store, "ada", &["typescript"], None);

    let created = h
        .sessions
        .create_session(create_request(OrchestrationType::Solo, &["typescript"], true))
        .await
        .unwrap();
    let sender = created.selected_agents[0].agent_id;

    let receipt = h
        .router
        .send_message(SendMessageRequest {
            session_id: created.session.id,
            from_agent_id: sender,
            to_agent_id: None,
            message_type: MessageType::Coordination,
            payload: HashMap::new(),
            require_acknowledgment: true,
        })
        .await
        .unwrap();

    assert!(receipt.delivered);
    assert!(receipt.acknowledged_by.is_empty());
    let stored = h.store.message(receipt.message_id).unwrap();
    assert!(stored.acknowledged_at.is_none());
    assert!(stored.is_broadcast());
}

#[tokio::test]
async fn test_update_session_not_found() {
    let h = harness();
    let err = h
        .sessions
        .update_session(SessionId::new(), SessionUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn test_terminal_session_rejects_status_change() {
    let h = harness();
    seed_agent(&h.store, "ada", &["typescript"], None);

    let created = h
        .sessions
        .create_session(create_request(OrchestrationType::Solo, &["typescript"], true))
        .await
        .unwrap();

    let completed = h
        .sessions
        .update_session(
            created.session.id,
            SessionUpdate {
                status: Some(SessionStatus::Completed),
                ended_at: Some(Utc::now()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(completed.status, SessionStatus::Completed);

    let err = h
        .sessions
        .update_session(
            created.session.id,
            SessionUpdate {
                status: Some(SessionStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "SESSION_NOT_FOUND");
}

async fn seed_sessions(h: &Harness, count: usize) -> Vec<OrchestrationSession> {
    let repo = InMemorySessionRepository::new(h.store.clone());
    let base = Utc::now();
    let mut created = Vec::new();
    for i in 0..count {
        let mut session =
            OrchestrationSession::new(OrchestrationType::Solo, None, HashMap::new(), true);
        session.created_at = base + Duration::seconds(i as i64);
        repo.create(&session, &[]).await.unwrap();
        created.push(session);
    }
    created
}

#[tokio::test]
async fn test_list_paginates_with_cursor() {
    let h = harness();
    let seeded = seed_sessions(&h, 21).await;

    let first_page = h
        .sessions
        .list_sessions(SessionQuery {
            limit: Some(20),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(first_page.sessions.len(), 20);
    // Newest first; the cursor is the 20th returned row's creation time.
    assert_eq!(first_page.sessions[0].id, seeded[20].id);
    let cursor = first_page.next_cursor.expect("21 rows leave a next page");
    assert_eq!(cursor, first_page.sessions[19].created_at);

    let second_page = h
        .sessions
        .list_sessions(SessionQuery {
            limit: Some(20),
            cursor: Some(cursor),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(second_page.sessions.len(), 1);
    assert_eq!(second_page.sessions[0].id, seeded[0].id);
    assert!(second_page.next_cursor.is_none());
}

#[tokio::test]
async fn test_list_without_overflow_has_no_cursor() {
    let h = harness();
    seed_sessions(&h, 15).await;

    let page = h
        .sessions
        .list_sessions(SessionQuery {
            limit: Some(20),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.sessions.len(), 15);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn test_list_filters_by_status_and_type() {
    let h = harness();
    seed_agent(&h.store, "ada", &["typescript"], None);
    seed_agent(&h.store, "grace", &["typescript"], None);

    h.sessions
        .create_session(create_request(OrchestrationType::Pair, &["typescript"], true))
        .await
        .unwrap();
    h.sessions
        .create_session(create_request(OrchestrationType::Solo, &["typescript"], false))
        .await
        .unwrap();

    let active_pairs = h
        .sessions
        .list_sessions(SessionQuery {
            orchestration_type: Some(OrchestrationType::Pair),
            status: Some(SessionStatus::Active),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(active_pairs.sessions.len(), 1);
    assert_eq!(
        active_pairs.sessions[0].orchestration_type,
        OrchestrationType::Pair
    );
}
