//! # Error Types — Structured Workflow Error Hierarchy
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - State machine errors carry the current state, the attempted target,
//!   and the identifiers involved.
//! - Every workflow error is a recoverable outcome surfaced to the
//!   caller; none is fatal to the process.
//! - Notification failures are deliberately NOT represented here — the
//!   notification sink swallows and logs its own failures so they can
//!   never abort a workflow transition.

use thiserror::Error;

/// The outcome kinds every contract, milestone, and dispute operation can
/// surface.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// A referenced contract, milestone, or dispute does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind name (e.g., "contract", "milestone").
        entity: &'static str,
        /// The identifier that failed to resolve.
        id: String,
    },

    /// The actor is not a party entitled to perform the action.
    #[error("actor {actor} may not {action}")]
    Forbidden {
        /// The acting account.
        actor: String,
        /// Short description of the refused action.
        action: String,
    },

    /// The requested transition is not legal from the current state.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state name.
        from: String,
        /// Attempted target state name.
        to: String,
    },

    /// A concurrent or duplicate condition, e.g. a dispute already open
    /// for the contract, or a stale aggregate revision.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Mutation attempted while the contract is disputed or terminal.
    #[error("contract {contract_id} is locked in status {status}")]
    ContractLocked {
        /// The locked contract.
        contract_id: String,
        /// The status that refuses mutation (DISPUTED, COMPLETED,
        /// CANCELLED).
        status: String,
    },

    /// A supplied value failed domain validation at aggregate creation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Error constructing a domain primitive.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Amount string is empty or not a plain decimal number.
    #[error("invalid monetary amount: {0:?}")]
    InvalidAmount(String),

    /// Timestamp string used a non-Z timezone offset.
    #[error("timestamp must use Z suffix (UTC only), got {0:?}")]
    NonUtcTimestamp(String),

    /// Timestamp string is not valid RFC 3339.
    #[error("invalid timestamp {value:?}: {message}")]
    MalformedTimestamp {
        /// The rejected input.
        value: String,
        /// Parser diagnostic.
        message: String,
    },

    /// A collection that must hold at least one element was empty.
    #[error("{0} must not be empty")]
    EmptyCollection(&'static str),
}
