// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # CONCORD Orchestration Core
//!
//! Library crate that forms coordinated sessions out of independent AI
//! agents: capability-based agent selection, topology-dependent role
//! assignment, transactional session setup, inter-agent message routing,
//! and per-agent failure isolation via a circuit breaker.
//!
//! This crate is invoked by the HTTP/API layer; it performs no tool
//! invocation or LLM calls itself.
//!
//! # Architecture
//!
//! - **Domain:** aggregates, value objects, repository contracts
//! - **Application:** selector, session service, communication router,
//!   circuit breaker, repository factory
//! - **Infrastructure:** PostgreSQL and in-memory repository backends

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
