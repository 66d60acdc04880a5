//! # ajir-contract — Contract & Milestone Lifecycle
//!
//! Encodes the two interlocking state machines at the heart of the Ajir
//! marketplace:
//!
//! - **Milestone** ([`milestone`]): the payment lifecycle of a single
//!   deliverable — PENDING → FUNDED → SUBMITTED → {APPROVED → PAID |
//!   REJECTED → PENDING}.
//!
//! - **Contract** ([`contract`]): the aggregate owning an ordered set of
//!   milestones, with overall status derived from milestone states and
//!   explicit party actions via the pure function
//!   [`contract::derive_status`].
//!
//! ## Design Choice: Validated Enum over Typestate
//!
//! Both machines use validated enums (runtime-checked) rather than
//! typestate types. Contracts and milestones are stored in and reloaded
//! from durable storage on every request, where the state is not known at
//! compile time; a validated enum serializes directly via serde and
//! rejects illegal transitions with structured errors.

pub mod contract;
pub mod milestone;

// Re-export primary types for ergonomic imports.
pub use contract::{
    derive_status, Contract, ContractParty, ContractStatus, TransitionRecord,
};
pub use milestone::{Milestone, MilestonePlan, MilestoneStatus};
