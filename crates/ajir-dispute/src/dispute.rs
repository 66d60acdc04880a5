//! # Dispute Lifecycle
//!
//! ## Transition Graph
//!
//! ```text
//! OPEN ──claim (admin)──▶ UNDER_REVIEW ──resolve──▶ RESOLVED (terminal)
//!                               │
//!                               └───────resolve──▶ REJECTED (terminal)
//! ```
//!
//! A dispute belongs to exactly one contract. The one-open-dispute-per-
//! contract invariant is enforced by the workflow service at creation
//! time; this module enforces everything downstream: claims are owned by
//! the first administrator to take the case, re-claims by the same
//! administrator are idempotent, and only the claiming administrator may
//! resolve.

use serde::{Deserialize, Serialize};

use ajir_core::{ContractId, DisputeId, Timestamp, UserId, ValidationError, WorkflowError};

// ─── Dispute Status ──────────────────────────────────────────────────

/// The lifecycle state of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeStatus {
    /// Filed by a contract party, awaiting an administrator.
    Open,
    /// An administrator has claimed the case and is reviewing it.
    UnderReview,
    /// The administrator found for the initiator (terminal).
    Resolved,
    /// The administrator dismissed the dispute (terminal).
    Rejected,
}

impl DisputeStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::UnderReview => "UNDER_REVIEW",
            Self::Resolved => "RESOLVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Outcome ─────────────────────────────────────────────────────────

/// The administrator's ruling on an under-review dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeOutcome {
    /// The dispute is upheld.
    Resolved,
    /// The dispute is dismissed.
    Rejected,
}

impl DisputeOutcome {
    /// The terminal status this outcome maps to.
    pub fn status(&self) -> DisputeStatus {
        match self {
            Self::Resolved => DisputeStatus::Resolved,
            Self::Rejected => DisputeStatus::Rejected,
        }
    }
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a single dispute state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputeTransitionRecord {
    /// State before the transition.
    pub from_state: DisputeStatus,
    /// State after the transition.
    pub to_state: DisputeStatus,
    /// The administrator (or, at filing, the initiating party).
    pub actor: UserId,
    /// When the transition occurred (UTC).
    pub timestamp: Timestamp,
}

// ─── The Dispute ─────────────────────────────────────────────────────

/// A dispute over one contract, mediated by a platform administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    /// Unique dispute identifier.
    pub id: DisputeId,
    /// The contract under dispute.
    pub contract_id: ContractId,
    /// The party that raised the dispute.
    pub initiator_id: UserId,
    /// The contract's other party.
    pub defendant_id: UserId,
    /// Why the dispute was raised.
    pub reason: String,
    /// Current lifecycle state.
    pub status: DisputeStatus,
    /// The administrator who claimed the case, once claimed.
    pub claimed_by: Option<UserId>,
    /// The ruling, once resolved.
    pub outcome: Option<DisputeOutcome>,
    /// Optimistic-concurrency revision, bumped by the store on save.
    pub revision: u64,
    /// When the dispute was filed.
    pub opened_at: Timestamp,
    /// When the dispute was last mutated.
    pub updated_at: Timestamp,
    /// Append-only log of all state transitions.
    pub transition_log: Vec<DisputeTransitionRecord>,
}

impl Dispute {
    /// File a new dispute in the Open state.
    ///
    /// # Errors
    ///
    /// Rejects an empty reason — a dispute with no stated grievance is
    /// not reviewable.
    pub fn open(
        contract_id: ContractId,
        initiator_id: UserId,
        defendant_id: UserId,
        reason: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(ValidationError::EmptyCollection("dispute reason"));
        }
        let now = Timestamp::now();
        Ok(Self {
            id: DisputeId::new(),
            contract_id,
            initiator_id,
            defendant_id,
            reason,
            status: DisputeStatus::Open,
            claimed_by: None,
            outcome: None,
            revision: 0,
            opened_at: now,
            updated_at: now,
            transition_log: Vec::new(),
        })
    }

    /// Whether the dispute still blocks contract progression.
    pub fn is_blocking(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Claim the dispute for review: OPEN → UNDER_REVIEW.
    ///
    /// Returns `true` when the claim transitioned the dispute, `false`
    /// for the idempotent re-claim by the same administrator.
    ///
    /// # Errors
    ///
    /// - `Conflict` if a different administrator already claimed it.
    /// - `InvalidTransition` if the dispute is already terminal.
    pub fn claim(&mut self, admin_id: UserId) -> Result<bool, WorkflowError> {
        match self.status {
            DisputeStatus::Open => {
                self.claimed_by = Some(admin_id);
                self.record(DisputeStatus::UnderReview, admin_id);
                Ok(true)
            }
            DisputeStatus::UnderReview => {
                if self.claimed_by == Some(admin_id) {
                    Ok(false)
                } else {
                    Err(WorkflowError::Conflict(format!(
                        "dispute {} is already under review by another administrator",
                        self.id
                    )))
                }
            }
            status => Err(WorkflowError::InvalidTransition {
                from: status.as_str().to_string(),
                to: DisputeStatus::UnderReview.as_str().to_string(),
            }),
        }
    }

    /// Rule on the dispute: UNDER_REVIEW → RESOLVED | REJECTED.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the dispute is UNDER_REVIEW.
    /// - `Conflict` if the ruling administrator is not the claimant.
    pub fn resolve(
        &mut self,
        admin_id: UserId,
        outcome: DisputeOutcome,
    ) -> Result<(), WorkflowError> {
        if self.status != DisputeStatus::UnderReview {
            return Err(WorkflowError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: outcome.status().as_str().to_string(),
            });
        }
        if self.claimed_by != Some(admin_id) {
            return Err(WorkflowError::Conflict(format!(
                "dispute {} is under review by another administrator",
                self.id
            )));
        }
        self.outcome = Some(outcome);
        self.record(outcome.status(), admin_id);
        Ok(())
    }

    /// Record a state transition in the audit log.
    fn record(&mut self, to: DisputeStatus, actor: UserId) {
        let from = self.status;
        self.status = to;
        self.updated_at = Timestamp::now();
        self.transition_log.push(DisputeTransitionRecord {
            from_state: from,
            to_state: to,
            actor,
            timestamp: self.updated_at,
        });
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
