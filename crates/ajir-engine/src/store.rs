//! # Aggregate Storage Seams
//!
//! Durable storage is an external collaborator; these traits are the
//! shape the workflow consumes it through: load-by-id and conditional
//! update-by-id, atomic per aggregate.
//!
//! ## Revision Protocol
//!
//! Every aggregate carries a `revision`. `save` succeeds only when the
//! stored revision still equals the revision the caller loaded, then
//! bumps it — a concurrent transition on the same aggregate surfaces as
//! [`WorkflowError::Conflict`] instead of silently clobbering state.
//! Transitions on different aggregates never contend.

use ajir_contract::Contract;
use ajir_core::{ContractId, DisputeId, WorkflowError};
use ajir_dispute::Dispute;

/// Contract persistence: load-by-id and conditional update-by-id.
pub trait ContractStore: Send + Sync {
    /// Store a newly created contract.
    ///
    /// # Errors
    ///
    /// `Conflict` if the id is already present.
    fn insert(&self, contract: Contract) -> Result<(), WorkflowError>;

    /// Load a contract by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such contract exists.
    fn load(&self, contract_id: ContractId) -> Result<Contract, WorkflowError>;

    /// Conditionally persist a mutated contract, returning it with its
    /// revision bumped.
    ///
    /// # Errors
    ///
    /// `Conflict` if the stored revision no longer matches the one the
    /// aggregate was loaded at; `NotFound` if the contract vanished.
    fn save(&self, contract: Contract) -> Result<Contract, WorkflowError>;
}

/// Dispute persistence: load-by-id, conditional update-by-id, and the
/// per-contract blocking-dispute lookup backing the one-open-dispute
/// invariant.
pub trait DisputeStore: Send + Sync {
    /// Store a newly filed dispute.
    ///
    /// # Errors
    ///
    /// `Conflict` if the id is already present.
    fn insert(&self, dispute: Dispute) -> Result<(), WorkflowError>;

    /// Load a dispute by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such dispute exists.
    fn load(&self, dispute_id: DisputeId) -> Result<Dispute, WorkflowError>;

    /// Conditionally persist a mutated dispute, returning it with its
    /// revision bumped.
    ///
    /// # Errors
    ///
    /// `Conflict` on a stale revision; `NotFound` if the dispute vanished.
    fn save(&self, dispute: Dispute) -> Result<Dispute, WorkflowError>;

    /// The contract's OPEN or UNDER_REVIEW dispute, if one exists.
    fn blocking_for_contract(&self, contract_id: ContractId) -> Option<Dispute>;
}
