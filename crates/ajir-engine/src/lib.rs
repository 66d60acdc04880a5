//! # ajir-engine — Workflow Orchestration
//!
//! Ties the domain aggregates to their collaborators:
//!
//! - **Store seams** ([`store`]): load-by-id plus conditional save for
//!   contract and dispute aggregates — atomic single-aggregate
//!   read-modify-write via optimistic revisions.
//!
//! - **In-memory stores** ([`memory`]): `DashMap`-backed reference
//!   implementations; the revision check runs under a single entry lock.
//!
//! - **WorkflowService** ([`service`]): the operations the routing layer
//!   calls. Each invocation reloads state from the store, validates,
//!   applies a transition, persists, and notifies the counterparty
//!   through the notification sink. Notification delivery is
//!   fire-and-forget relative to the transition.

pub mod memory;
pub mod service;
pub mod store;

// Re-export primary types for ergonomic imports.
pub use memory::{InMemoryContractStore, InMemoryDisputeStore};
pub use service::{kinds, ContractTerms, DisputeResolution, WorkflowService};
pub use store::{ContractStore, DisputeStore};
