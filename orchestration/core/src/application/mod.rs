// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application Layer
//!
//! Services orchestrating the domain: agent selection, session
//! lifecycle, message routing, failure isolation, and repository
//! construction.

pub mod selector;
pub mod session;
pub mod communication;
pub mod circuit_breaker;
pub mod repository_factory;

pub use circuit_breaker::CircuitBreaker;
pub use communication::CommunicationRouter;
pub use repository_factory::RepositorySet;
pub use selector::AgentSelector;
pub use session::SessionService;
