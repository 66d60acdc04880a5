//! # ajir-core — Foundational Types for the Ajir Marketplace
//!
//! This crate is the bedrock of the Ajir workspace. It defines the
//! domain-primitive types every other crate builds on; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `UserId`, `ContractId`,
//!    `MilestoneId`, `DisputeId` — all distinct types. No bare strings or
//!    raw UUIDs for identifiers.
//!
//! 2. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision; non-UTC inputs are rejected at
//!    construction.
//!
//! 3. **String-decimal money.** Monetary amounts are never floats.
//!
//! 4. **One workflow error enum.** Every contract, milestone, and dispute
//!    operation surfaces the same five recoverable error kinds.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ajir-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize` where they cross a persistence boundary.

pub mod actor;
pub mod error;
pub mod identity;
pub mod money;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use actor::{Actor, Role};
pub use error::{ValidationError, WorkflowError};
pub use identity::{
    ConnectionId, ContractId, DisputeId, MilestoneId, NotificationId, ProjectId, UserId,
};
pub use money::Money;
pub use temporal::Timestamp;
