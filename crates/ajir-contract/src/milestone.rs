//! # Milestone Payment State Machine
//!
//! A milestone is a funded, independently approvable unit of deliverable
//! work within a contract. Its status is monotonic except for the
//! rejection rework cycle, and PAID is terminal.
//!
//! ## Transition Graph
//!
//! ```text
//! PENDING ──fund──▶ FUNDED ──submit──▶ SUBMITTED ──approve──▶ APPROVED ──▶ PAID
//!    ▲                                     │
//!    └───────────── rework ──── REJECTED ◀─┘ reject
//! ```
//!
//! Transitions are applied by the owning [`Contract`](crate::contract::Contract)
//! — a milestone never changes state on its own, and is never shared
//! between contracts.

use serde::{Deserialize, Serialize};

use ajir_core::{MilestoneId, Money, Timestamp};

/// The payment state of a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestoneStatus {
    /// Awaiting funding by the client (initial state, and the rework
    /// re-entry point after a rejection).
    Pending,
    /// Client has escrowed the milestone amount.
    Funded,
    /// Freelancer has submitted the deliverable for review.
    Submitted,
    /// Client has approved the deliverable.
    Approved,
    /// Payment has been released (terminal).
    Paid,
    /// Client rejected the submission; immediately reworked to Pending.
    Rejected,
}

impl MilestoneStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Funded => "FUNDED",
            Self::Submitted => "SUBMITTED",
            Self::Approved => "APPROVED",
            Self::Paid => "PAID",
            Self::Rejected => "REJECTED",
        }
    }

    /// Whether this status is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid)
    }

    /// Whether the milestone counts toward contract progress.
    pub fn counts_toward_progress(&self) -> bool {
        matches!(self, Self::Approved | Self::Paid)
    }

    /// Valid target states from this status.
    pub fn valid_transitions(&self) -> &'static [MilestoneStatus] {
        match self {
            Self::Pending => &[Self::Funded],
            Self::Funded => &[Self::Submitted],
            Self::Submitted => &[Self::Approved, Self::Rejected],
            Self::Approved => &[Self::Paid],
            Self::Rejected => &[Self::Pending],
            Self::Paid => &[],
        }
    }

    /// Whether `to` is a legal next status.
    pub fn can_transition_to(&self, to: MilestoneStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

impl std::fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The terms of a milestone supplied at contract creation, before an
/// identifier or status exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestonePlan {
    /// What the milestone delivers.
    pub description: String,
    /// Amount released on approval.
    pub amount: Money,
    /// Agreed delivery date, if any.
    pub due_date: Option<Timestamp>,
}

/// A payment milestone owned by exactly one contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    /// Unique milestone identifier.
    pub id: MilestoneId,
    /// What the milestone delivers.
    pub description: String,
    /// Amount released on approval.
    pub amount: Money,
    /// Agreed delivery date, if any.
    pub due_date: Option<Timestamp>,
    /// Current payment state.
    pub status: MilestoneStatus,
}

impl Milestone {
    /// Instantiate a milestone from its plan, in the Pending state.
    pub fn from_plan(plan: MilestonePlan) -> Self {
        Self {
            id: MilestoneId::new(),
            description: plan.description,
            amount: plan.amount,
            due_date: plan.due_date,
            status: MilestoneStatus::Pending,
        }
    }
}
