//! # Workflow Service
//!
//! The operations the routing/controller layer calls. Every invocation
//! is request-scoped: load the aggregate, validate preconditions against
//! persisted state, apply the transition, conditionally save, then hand
//! the counterparty notification to the sink. The sink is fire-and-forget
//! — its failure never rolls back the transition.

use std::sync::Arc;

use ajir_contract::{Contract, Milestone, MilestonePlan};
use ajir_core::{Actor, ContractId, DisputeId, MilestoneId, Money, ProjectId, UserId, WorkflowError};
use ajir_dispute::{Dispute, DisputeOutcome};
use ajir_notify::{NotificationDraft, NotificationSink};

use crate::store::{ContractStore, DisputeStore};

/// Notification kind tags emitted by the workflow.
pub mod kinds {
    /// A milestone was funded by the client.
    pub const MILESTONE_FUNDED: &str = "contract.milestone.funded.v1";
    /// A milestone deliverable was submitted for review.
    pub const MILESTONE_SUBMITTED: &str = "contract.milestone.submitted.v1";
    /// A milestone was approved and its payment released.
    pub const MILESTONE_PAID: &str = "contract.milestone.paid.v1";
    /// A milestone was rejected for rework.
    pub const MILESTONE_REJECTED: &str = "contract.milestone.rejected.v1";
    /// The contract was cancelled.
    pub const CONTRACT_CANCELLED: &str = "contract.cancelled.v1";
    /// A dispute was opened against the recipient's contract.
    pub const DISPUTE_OPENED: &str = "dispute.opened.v1";
    /// A dispute on the recipient's contract reached a terminal status.
    pub const DISPUTE_RESOLVED: &str = "dispute.resolved.v1";
}

/// The agreed terms a contract is created from when a proposal is
/// accepted.
#[derive(Debug, Clone)]
pub struct ContractTerms {
    /// The hiring party.
    pub client_id: UserId,
    /// The working party.
    pub freelancer_id: UserId,
    /// The job posting the proposal answered.
    pub project_id: ProjectId,
    /// Contract title.
    pub title: String,
    /// Agreed total amount.
    pub total_amount: Money,
    /// Ordered milestone plans.
    pub milestones: Vec<MilestonePlan>,
}

/// The state pair a terminal dispute resolution leaves behind.
#[derive(Debug, Clone)]
pub struct DisputeResolution {
    /// The resolved dispute.
    pub dispute: Dispute,
    /// The contract with its status re-derived from milestone state.
    pub contract: Contract,
}

/// Request-scoped orchestrator for contract, milestone, and dispute
/// transitions.
pub struct WorkflowService {
    contracts: Arc<dyn ContractStore>,
    disputes: Arc<dyn DisputeStore>,
    sink: NotificationSink,
    /// Platform administrators notified when a dispute is opened.
    admins: Vec<UserId>,
}

impl WorkflowService {
    /// Build a service over its collaborators.
    pub fn new(
        contracts: Arc<dyn ContractStore>,
        disputes: Arc<dyn DisputeStore>,
        sink: NotificationSink,
        admins: Vec<UserId>,
    ) -> Self {
        Self {
            contracts,
            disputes,
            sink,
            admins,
        }
    }

    // ── Contract Creation ────────────────────────────────────────────

    /// Create a contract from accepted proposal terms.
    pub fn create_contract(&self, terms: ContractTerms) -> Result<Contract, WorkflowError> {
        let contract = Contract::new(
            terms.client_id,
            terms.freelancer_id,
            terms.project_id,
            terms.title,
            terms.total_amount,
            terms.milestones,
        )?;
        self.contracts.insert(contract.clone())?;
        tracing::debug!(contract = %contract.id, "contract created");
        Ok(contract)
    }

    /// Load a contract (feed/detail queries).
    pub fn contract(&self, contract_id: ContractId) -> Result<Contract, WorkflowError> {
        self.contracts.load(contract_id)
    }

    /// Load a dispute.
    pub fn dispute(&self, dispute_id: DisputeId) -> Result<Dispute, WorkflowError> {
        self.disputes.load(dispute_id)
    }

    // ── Milestone Ledger ─────────────────────────────────────────────

    /// Fund a pending milestone (client action) and notify the
    /// freelancer.
    pub fn fund_milestone(
        &self,
        contract_id: ContractId,
        milestone_id: MilestoneId,
        actor: &Actor,
    ) -> Result<Contract, WorkflowError> {
        let mut contract = self.contracts.load(contract_id)?;
        contract.fund_milestone(milestone_id, actor.user_id)?;
        let contract = self.contracts.save(contract)?;
        tracing::debug!(contract = %contract.id, milestone = %milestone_id, "milestone funded");

        let milestone = milestone_of(&contract, milestone_id)?;
        self.sink.notify(
            self.milestone_draft(
                &contract,
                milestone,
                contract.freelancer_id,
                kinds::MILESTONE_FUNDED,
                "Milestone funded",
                format!(
                    "\"{}\" has been funded ({}). You can start working.",
                    milestone.description, milestone.amount
                ),
            ),
        );
        Ok(contract)
    }

    /// Submit a funded milestone for review (freelancer action) and
    /// notify the client.
    pub fn submit_milestone(
        &self,
        contract_id: ContractId,
        milestone_id: MilestoneId,
        actor: &Actor,
    ) -> Result<Contract, WorkflowError> {
        let mut contract = self.contracts.load(contract_id)?;
        contract.submit_milestone(milestone_id, actor.user_id)?;
        let contract = self.contracts.save(contract)?;
        tracing::debug!(contract = %contract.id, milestone = %milestone_id, "milestone submitted");

        let milestone = milestone_of(&contract, milestone_id)?;
        self.sink.notify(
            self.milestone_draft(
                &contract,
                milestone,
                contract.client_id,
                kinds::MILESTONE_SUBMITTED,
                "Milestone submitted",
                format!(
                    "\"{}\" has been submitted and awaits your review.",
                    milestone.description
                ),
            ),
        );
        Ok(contract)
    }

    /// Approve a submitted milestone (client action), releasing payment
    /// in the same logical step, and notify the freelancer.
    pub fn approve_milestone(
        &self,
        contract_id: ContractId,
        milestone_id: MilestoneId,
        actor: &Actor,
    ) -> Result<Contract, WorkflowError> {
        let mut contract = self.contracts.load(contract_id)?;
        contract.approve_milestone(milestone_id, actor.user_id)?;
        let contract = self.contracts.save(contract)?;
        tracing::debug!(
            contract = %contract.id,
            milestone = %milestone_id,
            progress = contract.progress,
            status = %contract.status,
            "milestone approved and paid"
        );

        let milestone = milestone_of(&contract, milestone_id)?;
        self.sink.notify(
            self.milestone_draft(
                &contract,
                milestone,
                contract.freelancer_id,
                kinds::MILESTONE_PAID,
                "Milestone approved",
                format!(
                    "\"{}\" was approved and {} has been released.",
                    milestone.description, milestone.amount
                ),
            ),
        );
        Ok(contract)
    }

    /// Reject a submitted milestone for rework (client action) and
    /// notify the freelancer with the reason.
    pub fn reject_milestone(
        &self,
        contract_id: ContractId,
        milestone_id: MilestoneId,
        actor: &Actor,
        reason: impl Into<String>,
    ) -> Result<Contract, WorkflowError> {
        let reason = reason.into();
        let mut contract = self.contracts.load(contract_id)?;
        contract.reject_milestone(milestone_id, actor.user_id, reason.clone())?;
        let contract = self.contracts.save(contract)?;
        tracing::debug!(contract = %contract.id, milestone = %milestone_id, "milestone rejected");

        let milestone = milestone_of(&contract, milestone_id)?;
        let draft = self
            .milestone_draft(
                &contract,
                milestone,
                contract.freelancer_id,
                kinds::MILESTONE_REJECTED,
                "Milestone needs rework",
                format!("\"{}\" was returned for rework: {reason}", milestone.description),
            )
            .with_metadata(serde_json::json!({
                "contract_id": contract.id,
                "milestone_id": milestone.id,
                "reason": reason,
            }));
        self.sink.notify(draft);
        Ok(contract)
    }

    // ── Contract State Machine ───────────────────────────────────────

    /// Cancel an active contract with no paid milestones (either party)
    /// and notify the counterparty.
    pub fn cancel_contract(
        &self,
        contract_id: ContractId,
        actor: &Actor,
    ) -> Result<Contract, WorkflowError> {
        let mut contract = self.contracts.load(contract_id)?;
        contract.cancel(actor.user_id)?;
        let contract = self.contracts.save(contract)?;
        tracing::debug!(contract = %contract.id, "contract cancelled");

        // cancel() already verified the actor is a party.
        if let Some(counterparty) = contract.counterparty_of(actor.user_id) {
            self.sink.notify(
                NotificationDraft::new(
                    counterparty,
                    kinds::CONTRACT_CANCELLED,
                    "Contract cancelled",
                    format!("\"{}\" has been cancelled.", contract.title),
                )
                .with_link(contract_link(&contract)),
            );
        }
        Ok(contract)
    }

    // ── Dispute Workflow ─────────────────────────────────────────────

    /// Escalate a contract into dispute (either party), suspending
    /// milestone progression, and notify the defendant and the platform
    /// administrators.
    pub fn raise_dispute(
        &self,
        contract_id: ContractId,
        initiator: &Actor,
        reason: impl Into<String>,
    ) -> Result<Dispute, WorkflowError> {
        let mut contract = self.contracts.load(contract_id)?;
        let defendant =
            contract
                .counterparty_of(initiator.user_id)
                .ok_or(WorkflowError::Forbidden {
                    actor: initiator.user_id.to_string(),
                    action: "raise a dispute on this contract".to_string(),
                })?;

        if let Some(existing) = self.disputes.blocking_for_contract(contract_id) {
            return Err(WorkflowError::Conflict(format!(
                "contract {contract_id} already has dispute {} in status {}",
                existing.id, existing.status
            )));
        }

        contract.suspend_for_dispute(initiator.user_id)?;
        let dispute = Dispute::open(contract_id, initiator.user_id, defendant, reason)?;
        let contract = self.contracts.save(contract)?;
        self.disputes.insert(dispute.clone())?;
        tracing::debug!(contract = %contract.id, dispute = %dispute.id, "dispute opened");

        let body = format!(
            "A dispute was opened on \"{}\": {}",
            contract.title, dispute.reason
        );
        self.sink.notify(
            NotificationDraft::new(defendant, kinds::DISPUTE_OPENED, "Dispute opened", &body)
                .with_link(dispute_link(&dispute)),
        );
        for admin in &self.admins {
            self.sink.notify(
                NotificationDraft::new(
                    *admin,
                    kinds::DISPUTE_OPENED,
                    "Dispute awaiting review",
                    &body,
                )
                .with_link(dispute_link(&dispute)),
            );
        }
        Ok(dispute)
    }

    /// Claim an open dispute for review (administrator action).
    ///
    /// Idempotent for the administrator who already holds the case.
    pub fn claim_dispute(
        &self,
        dispute_id: DisputeId,
        admin: &Actor,
    ) -> Result<Dispute, WorkflowError> {
        require_admin(admin, "claim a dispute")?;
        let mut dispute = self.disputes.load(dispute_id)?;
        if dispute.claim(admin.user_id)? {
            dispute = self.disputes.save(dispute)?;
            tracing::debug!(dispute = %dispute.id, "dispute claimed");
        }
        Ok(dispute)
    }

    /// Rule on an under-review dispute (the claiming administrator),
    /// re-derive the contract status, and notify both parties.
    pub fn resolve_dispute(
        &self,
        dispute_id: DisputeId,
        admin: &Actor,
        outcome: DisputeOutcome,
    ) -> Result<DisputeResolution, WorkflowError> {
        require_admin(admin, "resolve a dispute")?;
        let mut dispute = self.disputes.load(dispute_id)?;
        dispute.resolve(admin.user_id, outcome)?;

        let mut contract = self.contracts.load(dispute.contract_id)?;
        let next = contract.resume_from_dispute(admin.user_id)?;

        let dispute = self.disputes.save(dispute)?;
        let contract = self.contracts.save(contract)?;
        tracing::debug!(
            dispute = %dispute.id,
            contract = %contract.id,
            status = %next,
            "dispute resolved"
        );

        let body = format!(
            "The dispute on \"{}\" was closed as {}.",
            contract.title,
            dispute.status
        );
        for party in [contract.client_id, contract.freelancer_id] {
            self.sink.notify(
                NotificationDraft::new(party, kinds::DISPUTE_RESOLVED, "Dispute closed", &body)
                    .with_link(dispute_link(&dispute))
                    .with_metadata(serde_json::json!({
                        "dispute_id": dispute.id,
                        "contract_id": contract.id,
                        "contract_status": contract.status,
                    })),
            );
        }
        Ok(DisputeResolution { dispute, contract })
    }

    // ── Internals ────────────────────────────────────────────────────

    fn milestone_draft(
        &self,
        contract: &Contract,
        milestone: &Milestone,
        recipient: UserId,
        kind: &str,
        title: &str,
        body: String,
    ) -> NotificationDraft {
        NotificationDraft::new(recipient, kind, title, body)
            .with_link(contract_link(contract))
            .with_metadata(serde_json::json!({
                "contract_id": contract.id,
                "milestone_id": milestone.id,
            }))
    }
}

impl std::fmt::Debug for WorkflowService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowService")
            .field("admin_count", &self.admins.len())
            .finish_non_exhaustive()
    }
}

fn require_admin(actor: &Actor, action: &str) -> Result<(), WorkflowError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(WorkflowError::Forbidden {
            actor: actor.user_id.to_string(),
            action: action.to_string(),
        })
    }
}

fn milestone_of(contract: &Contract, milestone_id: MilestoneId) -> Result<&Milestone, WorkflowError> {
    contract
        .milestone(milestone_id)
        .ok_or(WorkflowError::NotFound {
            entity: "milestone",
            id: milestone_id.to_string(),
        })
}

fn contract_link(contract: &Contract) -> String {
    format!("/contracts/{}", contract.id)
}

fn dispute_link(dispute: &Dispute) -> String {
    format!("/disputes/{}", dispute.id)
}

// ─── Tests ───────────────────────────────────────────────────────────
