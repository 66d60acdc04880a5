//! # Contract Aggregate & State Machine
//!
//! A contract is the agreement created when a client accepts a
//! freelancer's proposal: two parties, a fixed total amount, and an
//! ordered set of payment milestones. The contract exclusively owns its
//! milestones; every milestone transition is applied through the
//! aggregate so the milestone set is always observed consistently.
//!
//! ## States
//!
//! ```text
//! ACTIVE ──full payout──▶ COMPLETED (terminal)
//!   │  ▲
//!   │  └──dispute resolved (not all paid)
//!   ├──dispute opened──▶ DISPUTED ──dispute resolved (all paid)──▶ COMPLETED
//!   └──cancel (no PAID milestone)──▶ CANCELLED (terminal)
//! ```
//!
//! Overall status is never decided inline: every mutation ends by
//! consulting the pure function [`derive_status`], keeping the state
//! machine auditable and testable in isolation. Cancellation is the one
//! explicit exception — a CANCELLED status records a party decision that
//! cannot be derived from milestone contents.
//!
//! ## Audit Trail
//!
//! Every transition — milestone or contract level — appends a
//! [`TransitionRecord`] with the acting party, timestamp, and optional
//! reason. Rejection reasons live here permanently, not only in the
//! notification that delivered them.

use serde::{Deserialize, Serialize};

use ajir_core::{
    ContractId, MilestoneId, Money, ProjectId, Timestamp, UserId, ValidationError, WorkflowError,
};

use crate::milestone::{Milestone, MilestonePlan, MilestoneStatus};

// ─── Contract Status ─────────────────────────────────────────────────

/// The overall status of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    /// Normal progression; milestone transitions are accepted.
    Active,
    /// Every milestone has been paid out (terminal).
    Completed,
    /// An open dispute suspends all milestone progression.
    Disputed,
    /// Explicitly cancelled before any payout (terminal).
    Cancelled,
}

impl ContractStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Disputed => "DISPUTED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Whether this status is terminal (no further mutation accepted).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Parties ─────────────────────────────────────────────────────────

/// Which side of the contract a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractParty {
    /// The hiring party: funds, approves, and rejects milestones.
    Client,
    /// The working party: submits milestone deliverables.
    Freelancer,
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a single state transition, at milestone or contract level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The milestone that moved, or `None` for contract-level transitions.
    pub milestone_id: Option<MilestoneId>,
    /// State before the transition.
    pub from_state: String,
    /// State after the transition.
    pub to_state: String,
    /// The party or administrator whose action caused the transition.
    pub actor: UserId,
    /// When the transition occurred (UTC).
    pub timestamp: Timestamp,
    /// Human-readable reason, where one was given (e.g. rejection reason).
    pub reason: Option<String>,
}

// ─── Pure Derivation ─────────────────────────────────────────────────

/// Derive the contract status from milestone contents and dispute state.
///
/// - an open (non-terminal) dispute always wins: DISPUTED;
/// - otherwise a fully paid-out milestone set means COMPLETED;
/// - otherwise ACTIVE.
///
/// CANCELLED is deliberately not derivable — it records an explicit party
/// decision and is applied only by [`Contract::cancel`].
pub fn derive_status(milestones: &[Milestone], dispute_open: bool) -> ContractStatus {
    if dispute_open {
        return ContractStatus::Disputed;
    }
    if !milestones.is_empty()
        && milestones
            .iter()
            .all(|m| m.status == MilestoneStatus::Paid)
    {
        ContractStatus::Completed
    } else {
        ContractStatus::Active
    }
}

/// Progress as a whole percentage: milestones in {APPROVED, PAID} over
/// the total, rounded down.
pub fn progress_percent(milestones: &[Milestone]) -> u8 {
    if milestones.is_empty() {
        return 0;
    }
    let done = milestones
        .iter()
        .filter(|m| m.status.counts_toward_progress())
        .count();
    ((done * 100) / milestones.len()) as u8
}

// ─── The Contract ────────────────────────────────────────────────────

/// A contract between a client and a freelancer, exclusively owning its
/// ordered milestones.
///
/// All milestone transitions go through the aggregate's methods, which
/// enforce the check order: existence, contract lock, party membership,
/// milestone state. The `progress` field is derived, recomputed after
/// every milestone mutation, and never authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    /// Unique contract identifier.
    pub id: ContractId,
    /// The hiring party.
    pub client_id: UserId,
    /// The working party.
    pub freelancer_id: UserId,
    /// The job posting this contract originated from.
    pub project_id: ProjectId,
    /// Contract title, shown to both parties.
    pub title: String,
    /// Agreed total amount.
    pub total_amount: Money,
    /// Ordered payment milestones.
    pub milestones: Vec<Milestone>,
    /// Overall status.
    pub status: ContractStatus,
    /// Derived progress percentage (0-100).
    pub progress: u8,
    /// Optimistic-concurrency revision, bumped by the store on save.
    pub revision: u64,
    /// When the contract was created.
    pub created_at: Timestamp,
    /// When the contract was last mutated.
    pub updated_at: Timestamp,
    /// Append-only log of all state transitions.
    pub transition_log: Vec<TransitionRecord>,
}

impl Contract {
    /// Create a contract in the Active state from accepted proposal terms.
    ///
    /// # Errors
    ///
    /// Rejects an empty milestone plan and negative amounts.
    pub fn new(
        client_id: UserId,
        freelancer_id: UserId,
        project_id: ProjectId,
        title: impl Into<String>,
        total_amount: Money,
        plans: Vec<MilestonePlan>,
    ) -> Result<Self, ValidationError> {
        if plans.is_empty() {
            return Err(ValidationError::EmptyCollection("contract milestones"));
        }
        if total_amount.is_negative() {
            return Err(ValidationError::InvalidAmount(total_amount.amount));
        }
        if let Some(plan) = plans.iter().find(|p| p.amount.is_negative()) {
            return Err(ValidationError::InvalidAmount(plan.amount.amount.clone()));
        }

        let now = Timestamp::now();
        Ok(Self {
            id: ContractId::new(),
            client_id,
            freelancer_id,
            project_id,
            title: title.into(),
            total_amount,
            milestones: plans.into_iter().map(Milestone::from_plan).collect(),
            status: ContractStatus::Active,
            progress: 0,
            revision: 0,
            created_at: now,
            updated_at: now,
            transition_log: Vec::new(),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Which side of the contract the given user is on, if any.
    pub fn party_of(&self, user_id: UserId) -> Option<ContractParty> {
        if user_id == self.client_id {
            Some(ContractParty::Client)
        } else if user_id == self.freelancer_id {
            Some(ContractParty::Freelancer)
        } else {
            None
        }
    }

    /// The other party of the contract, if the given user is a party.
    pub fn counterparty_of(&self, user_id: UserId) -> Option<UserId> {
        match self.party_of(user_id)? {
            ContractParty::Client => Some(self.freelancer_id),
            ContractParty::Freelancer => Some(self.client_id),
        }
    }

    /// Look up a milestone by id.
    pub fn milestone(&self, milestone_id: MilestoneId) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id == milestone_id)
    }

    /// Number of milestones already paid out.
    pub fn paid_count(&self) -> usize {
        self.milestones
            .iter()
            .filter(|m| m.status == MilestoneStatus::Paid)
            .count()
    }

    // ── Milestone Operations ─────────────────────────────────────────

    /// Fund a pending milestone (client action): PENDING → FUNDED.
    pub fn fund_milestone(
        &mut self,
        milestone_id: MilestoneId,
        actor: UserId,
    ) -> Result<&Milestone, WorkflowError> {
        self.apply_milestone_transition(
            milestone_id,
            actor,
            ContractParty::Client,
            "fund this milestone",
            MilestoneStatus::Funded,
        )
    }

    /// Submit a funded milestone for review (freelancer action):
    /// FUNDED → SUBMITTED.
    pub fn submit_milestone(
        &mut self,
        milestone_id: MilestoneId,
        actor: UserId,
    ) -> Result<&Milestone, WorkflowError> {
        self.apply_milestone_transition(
            milestone_id,
            actor,
            ContractParty::Freelancer,
            "submit this milestone",
            MilestoneStatus::Submitted,
        )
    }

    /// Approve a submitted milestone and release payment (client action):
    /// SUBMITTED → APPROVED → PAID in one logical step.
    ///
    /// If this pays out the last milestone, the contract transitions to
    /// COMPLETED.
    pub fn approve_milestone(
        &mut self,
        milestone_id: MilestoneId,
        actor: UserId,
    ) -> Result<&Milestone, WorkflowError> {
        let idx = self.milestone_index(milestone_id)?;
        self.ensure_unlocked()?;
        self.require_party(actor, ContractParty::Client, "approve this milestone")?;
        self.require_milestone_status(idx, MilestoneStatus::Approved)?;

        // Payment release is a single logical step: both edges are
        // recorded, no partial-payment state is ever exposed.
        self.record_milestone(idx, MilestoneStatus::Approved, actor, None);
        self.record_milestone(idx, MilestoneStatus::Paid, actor, None);
        self.recompute_progress();

        if derive_status(&self.milestones, false) == ContractStatus::Completed {
            self.record_contract(ContractStatus::Completed, actor, None);
        }
        Ok(&self.milestones[idx])
    }

    /// Reject a submitted milestone for rework (client action):
    /// SUBMITTED → REJECTED → PENDING.
    ///
    /// The rejection reason is recorded in the transition log. There is
    /// no cap on rework cycles.
    pub fn reject_milestone(
        &mut self,
        milestone_id: MilestoneId,
        actor: UserId,
        reason: impl Into<String>,
    ) -> Result<&Milestone, WorkflowError> {
        let idx = self.milestone_index(milestone_id)?;
        self.ensure_unlocked()?;
        self.require_party(actor, ContractParty::Client, "reject this milestone")?;
        self.require_milestone_status(idx, MilestoneStatus::Rejected)?;

        self.record_milestone(idx, MilestoneStatus::Rejected, actor, Some(reason.into()));
        self.record_milestone(idx, MilestoneStatus::Pending, actor, None);
        self.recompute_progress();
        Ok(&self.milestones[idx])
    }

    // ── Contract Operations ──────────────────────────────────────────

    /// Cancel the contract (either party): allowed only from ACTIVE with
    /// zero paid milestones.
    pub fn cancel(&mut self, actor: UserId) -> Result<(), WorkflowError> {
        if self.party_of(actor).is_none() {
            return Err(WorkflowError::Forbidden {
                actor: actor.to_string(),
                action: "cancel this contract".to_string(),
            });
        }
        if self.status != ContractStatus::Active {
            return Err(self.locked_error());
        }
        if self.paid_count() > 0 {
            return Err(WorkflowError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: ContractStatus::Cancelled.as_str().to_string(),
            });
        }
        self.record_contract(ContractStatus::Cancelled, actor, None);
        Ok(())
    }

    /// Suspend the contract while a dispute is open: ACTIVE → DISPUTED.
    ///
    /// The caller (dispute workflow) is responsible for the one-open-
    /// dispute-per-contract invariant; this method only rejects
    /// double-suspension and terminal contracts.
    pub fn suspend_for_dispute(&mut self, actor: UserId) -> Result<(), WorkflowError> {
        if self.status == ContractStatus::Disputed {
            return Err(WorkflowError::Conflict(format!(
                "contract {} is already disputed",
                self.id
            )));
        }
        if self.status.is_terminal() {
            return Err(self.locked_error());
        }
        self.record_contract(ContractStatus::Disputed, actor, None);
        Ok(())
    }

    /// Lift the dispute suspension after a terminal dispute resolution:
    /// DISPUTED → ACTIVE, or COMPLETED when every milestone is already
    /// paid.
    pub fn resume_from_dispute(&mut self, actor: UserId) -> Result<ContractStatus, WorkflowError> {
        if self.status != ContractStatus::Disputed {
            return Err(WorkflowError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: ContractStatus::Active.as_str().to_string(),
            });
        }
        let next = derive_status(&self.milestones, false);
        self.record_contract(next, actor, None);
        Ok(next)
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Shared path for the single-edge milestone transitions (fund,
    /// submit). Approve and reject record their two edges explicitly.
    fn apply_milestone_transition(
        &mut self,
        milestone_id: MilestoneId,
        actor: UserId,
        required_party: ContractParty,
        action: &str,
        target: MilestoneStatus,
    ) -> Result<&Milestone, WorkflowError> {
        let idx = self.milestone_index(milestone_id)?;
        self.ensure_unlocked()?;
        self.require_party(actor, required_party, action)?;
        self.require_milestone_status(idx, target)?;

        self.record_milestone(idx, target, actor, None);
        self.recompute_progress();
        Ok(&self.milestones[idx])
    }

    fn milestone_index(&self, milestone_id: MilestoneId) -> Result<usize, WorkflowError> {
        self.milestones
            .iter()
            .position(|m| m.id == milestone_id)
            .ok_or_else(|| WorkflowError::NotFound {
                entity: "milestone",
                id: milestone_id.to_string(),
            })
    }

    /// Milestone mutations are accepted only while the contract is ACTIVE.
    fn ensure_unlocked(&self) -> Result<(), WorkflowError> {
        if self.status == ContractStatus::Active {
            Ok(())
        } else {
            Err(self.locked_error())
        }
    }

    fn locked_error(&self) -> WorkflowError {
        WorkflowError::ContractLocked {
            contract_id: self.id.to_string(),
            status: self.status.as_str().to_string(),
        }
    }

    fn require_party(
        &self,
        actor: UserId,
        required: ContractParty,
        action: &str,
    ) -> Result<(), WorkflowError> {
        if self.party_of(actor) == Some(required) {
            Ok(())
        } else {
            Err(WorkflowError::Forbidden {
                actor: actor.to_string(),
                action: action.to_string(),
            })
        }
    }

    fn require_milestone_status(
        &self,
        idx: usize,
        target: MilestoneStatus,
    ) -> Result<(), WorkflowError> {
        let current = self.milestones[idx].status;
        if current.can_transition_to(target) {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition {
                from: current.as_str().to_string(),
                to: target.as_str().to_string(),
            })
        }
    }

    /// Apply and log a milestone status change.
    fn record_milestone(
        &mut self,
        idx: usize,
        to: MilestoneStatus,
        actor: UserId,
        reason: Option<String>,
    ) {
        let from = self.milestones[idx].status;
        let milestone_id = self.milestones[idx].id;
        self.milestones[idx].status = to;
        self.push_record(Some(milestone_id), from.as_str(), to.as_str(), actor, reason);
    }

    /// Apply and log a contract status change.
    fn record_contract(&mut self, to: ContractStatus, actor: UserId, reason: Option<String>) {
        let from = self.status;
        self.status = to;
        self.push_record(None, from.as_str(), to.as_str(), actor, reason);
    }

    fn push_record(
        &mut self,
        milestone_id: Option<MilestoneId>,
        from: &str,
        to: &str,
        actor: UserId,
        reason: Option<String>,
    ) {
        self.updated_at = Timestamp::now();
        self.transition_log.push(TransitionRecord {
            milestone_id,
            from_state: from.to_string(),
            to_state: to.to_string(),
            actor,
            timestamp: self.updated_at,
            reason,
        });
    }

    fn recompute_progress(&mut self) {
        self.progress = progress_percent(&self.milestones);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
