//! # State Machine Properties
//!
//! Drives the contract aggregate with arbitrary action sequences —
//! including wrong actors and wrong orders — and asserts the invariants
//! that must hold no matter what:
//!
//! - milestone transitions only ever follow the legal edges;
//! - PAID is terminal and never reverts;
//! - progress always equals the recount over milestone states;
//! - milestone mutations on a DISPUTED contract always fail;
//! - a COMPLETED contract has every milestone PAID.

use proptest::prelude::*;

use ajir_contract::{progress_percent, Contract, ContractStatus, MilestonePlan, MilestoneStatus};
use ajir_core::{Money, ProjectId, UserId, WorkflowError};

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

const MILESTONE_COUNT: usize = 3;

fn build_contract(client: UserId, freelancer: UserId) -> Contract {
    let plans = (0..MILESTONE_COUNT)
        .map(|i| MilestonePlan {
            description: format!("Deliverable {i}"),
            amount: Money::new("100", "USD").unwrap(),
            due_date: None,
        })
        .collect();
    Contract::new(
        client,
        freelancer,
        ProjectId::new(),
        "Property contract",
        Money::new("300", "USD").unwrap(),
        plans,
    )
    .unwrap()
}

/// One randomized step: an operation code, a milestone index, and an
/// actor choice (client, freelancer, or an outsider).
type Step = (u8, usize, u8);

fn apply_step(
    contract: &mut Contract,
    (op, milestone_idx, actor_idx): Step,
    client: UserId,
    freelancer: UserId,
    outsider: UserId,
) -> Result<(), WorkflowError> {
    let actor = match actor_idx % 3 {
        0 => client,
        1 => freelancer,
        _ => outsider,
    };
    let milestone_id = contract.milestones[milestone_idx % MILESTONE_COUNT].id;
    match op % 7 {
        0 => contract.fund_milestone(milestone_id, actor).map(|_| ()),
        1 => contract.submit_milestone(milestone_id, actor).map(|_| ()),
        2 => contract.approve_milestone(milestone_id, actor).map(|_| ()),
        3 => contract
            .reject_milestone(milestone_id, actor, "rework")
            .map(|_| ()),
        4 => contract.cancel(actor),
        5 => contract.suspend_for_dispute(actor),
        _ => contract.resume_from_dispute(actor).map(|_| ()),
    }
}

fn legal_milestone_edge(from: &str, to: &str) -> bool {
    matches!(
        (from, to),
        ("PENDING", "FUNDED")
            | ("FUNDED", "SUBMITTED")
            | ("SUBMITTED", "APPROVED")
            | ("APPROVED", "PAID")
            | ("SUBMITTED", "REJECTED")
            | ("REJECTED", "PENDING")
    )
}

fn legal_contract_edge(from: &str, to: &str) -> bool {
    matches!(
        (from, to),
        ("ACTIVE", "COMPLETED")
            | ("ACTIVE", "DISPUTED")
            | ("ACTIVE", "CANCELLED")
            | ("DISPUTED", "ACTIVE")
            | ("DISPUTED", "COMPLETED")
    )
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn arbitrary_sequences_preserve_all_invariants(
        steps in prop::collection::vec(
            (0u8..7, 0usize..MILESTONE_COUNT, 0u8..3),
            0..60,
        )
    ) {
        let client = UserId::new();
        let freelancer = UserId::new();
        let outsider = UserId::new();
        let mut contract = build_contract(client, freelancer);

        for step in steps {
            let was_disputed = contract.status == ContractStatus::Disputed;
            let paid_before: Vec<_> = contract
                .milestones
                .iter()
                .filter(|m| m.status == MilestoneStatus::Paid)
                .map(|m| m.id)
                .collect();

            let result = apply_step(&mut contract, step, client, freelancer, outsider);

            // Milestone mutations on a disputed contract always fail.
            if was_disputed && step.0 % 7 <= 3 {
                prop_assert!(matches!(
                    result,
                    Err(WorkflowError::ContractLocked { .. })
                ));
            }

            // PAID is terminal.
            for id in &paid_before {
                let m = contract.milestone(*id).unwrap();
                prop_assert_eq!(m.status, MilestoneStatus::Paid);
            }

            // Progress is always the recount, never a stale cache.
            prop_assert_eq!(contract.progress, progress_percent(&contract.milestones));

            // A completed contract has paid everything.
            if contract.status == ContractStatus::Completed {
                prop_assert!(contract
                    .milestones
                    .iter()
                    .all(|m| m.status == MilestoneStatus::Paid));
            }
        }

        // Every logged edge is legal.
        for record in &contract.transition_log {
            if record.milestone_id.is_some() {
                prop_assert!(
                    legal_milestone_edge(&record.from_state, &record.to_state),
                    "illegal milestone edge {} -> {}",
                    record.from_state,
                    record.to_state,
                );
            } else {
                prop_assert!(
                    legal_contract_edge(&record.from_state, &record.to_state),
                    "illegal contract edge {} -> {}",
                    record.from_state,
                    record.to_state,
                );
            }
        }
    }

    #[test]
    fn progress_is_paid_ratio_after_happy_walks(paid in 0usize..=MILESTONE_COUNT) {
        let client = UserId::new();
        let freelancer = UserId::new();
        let mut contract = build_contract(client, freelancer);

        for idx in 0..paid {
            let id = contract.milestones[idx].id;
            contract.fund_milestone(id, client).unwrap();
            contract.submit_milestone(id, freelancer).unwrap();
            contract.approve_milestone(id, client).unwrap();
        }

        prop_assert_eq!(
            contract.progress as usize,
            (paid * 100) / MILESTONE_COUNT
        );
        if paid == MILESTONE_COUNT {
            prop_assert_eq!(contract.status, ContractStatus::Completed);
        } else {
            prop_assert_eq!(contract.status, ContractStatus::Active);
        }
    }
}
