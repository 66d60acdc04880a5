//! # Notification Delivery — Fan-Out and Read State
//!
//! Asserts which party hears about each workflow transition, that
//! real-time push only reaches connected recipients, and that read state
//! belongs to the recipient alone.

use std::sync::Arc;

use ajir_contract::MilestonePlan;
use ajir_core::{Actor, ConnectionId, Money, ProjectId, UserId};
use ajir_dispute::DisputeOutcome;
use ajir_engine::{
    kinds, ContractTerms, InMemoryContractStore, InMemoryDisputeStore, WorkflowService,
};
use ajir_notify::{
    ConnectionRegistry, InMemoryNotificationStore, NotificationSink, NotificationStore,
    RecordingPushChannel,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct World {
    service: WorkflowService,
    notifications: Arc<InMemoryNotificationStore>,
    registry: Arc<ConnectionRegistry>,
    push: Arc<RecordingPushChannel>,
    client: Actor,
    freelancer: Actor,
    admin: Actor,
}

fn world() -> World {
    let notifications = Arc::new(InMemoryNotificationStore::new());
    let registry = Arc::new(ConnectionRegistry::new());
    let push = Arc::new(RecordingPushChannel::new(registry.clone()));
    let sink = NotificationSink::new(notifications.clone(), push.clone());
    let admin = Actor::admin(UserId::new());
    World {
        service: WorkflowService::new(
            Arc::new(InMemoryContractStore::new()),
            Arc::new(InMemoryDisputeStore::new()),
            sink,
            vec![admin.user_id],
        ),
        notifications,
        registry,
        push,
        client: Actor::member(UserId::new()),
        freelancer: Actor::member(UserId::new()),
        admin,
    }
}

fn usd(amount: &str) -> Money {
    Money::new(amount, "USD").unwrap()
}

fn single_milestone_terms(w: &World) -> ContractTerms {
    ContractTerms {
        client_id: w.client.user_id,
        freelancer_id: w.freelancer.user_id,
        project_id: ProjectId::new(),
        title: "Profile photography".to_string(),
        total_amount: usd("250"),
        milestones: vec![MilestonePlan {
            description: "Studio session".to_string(),
            amount: usd("250"),
            due_date: None,
        }],
    }
}

// ---------------------------------------------------------------------------
// Fan-out per transition
// ---------------------------------------------------------------------------

#[test]
fn full_walk_produces_the_expected_feeds() {
    let w = world();
    let contract = w.service.create_contract(single_milestone_terms(&w)).unwrap();
    let m = contract.milestones[0].id;

    w.service.fund_milestone(contract.id, m, &w.client).unwrap();
    w.service.submit_milestone(contract.id, m, &w.freelancer).unwrap();
    w.service.approve_milestone(contract.id, m, &w.client).unwrap();

    let freelancer_kinds: Vec<_> = w
        .notifications
        .all_for(w.freelancer.user_id)
        .into_iter()
        .map(|n| n.kind)
        .collect();
    assert_eq!(
        freelancer_kinds,
        vec![kinds::MILESTONE_FUNDED, kinds::MILESTONE_PAID]
    );

    let client_kinds: Vec<_> = w
        .notifications
        .all_for(w.client.user_id)
        .into_iter()
        .map(|n| n.kind)
        .collect();
    assert_eq!(client_kinds, vec![kinds::MILESTONE_SUBMITTED]);
}

#[test]
fn dispute_lifecycle_notifies_defendant_admins_then_both_parties() {
    let w = world();
    let contract = w.service.create_contract(single_milestone_terms(&w)).unwrap();

    let dispute = w
        .service
        .raise_dispute(contract.id, &w.freelancer, "Unpaid session")
        .unwrap();

    // Defendant (the client) and the platform administrator hear about it.
    assert_eq!(
        w.notifications
            .all_for(w.client.user_id)
            .last()
            .unwrap()
            .kind,
        kinds::DISPUTE_OPENED
    );
    assert_eq!(
        w.notifications
            .all_for(w.admin.user_id)
            .last()
            .unwrap()
            .kind,
        kinds::DISPUTE_OPENED
    );
    // The initiator does not notify themselves.
    assert!(w
        .notifications
        .all_for(w.freelancer.user_id)
        .iter()
        .all(|n| n.kind != kinds::DISPUTE_OPENED));

    w.service.claim_dispute(dispute.id, &w.admin).unwrap();
    w.service
        .resolve_dispute(dispute.id, &w.admin, DisputeOutcome::Resolved)
        .unwrap();

    // Both parties hear the resolution.
    for party in [w.client.user_id, w.freelancer.user_id] {
        let feed = w.notifications.all_for(party);
        assert_eq!(feed.last().unwrap().kind, kinds::DISPUTE_RESOLVED);
    }
}

// ---------------------------------------------------------------------------
// Push routing
// ---------------------------------------------------------------------------

#[test]
fn push_reaches_only_connected_recipients() {
    let w = world();
    let contract = w.service.create_contract(single_milestone_terms(&w)).unwrap();
    let m = contract.milestones[0].id;

    // Freelancer is online, client is not.
    let conn = ConnectionId::new();
    w.registry.connect(w.freelancer.user_id, conn);

    w.service.fund_milestone(contract.id, m, &w.client).unwrap();
    w.service.submit_milestone(contract.id, m, &w.freelancer).unwrap();

    let sent = w.push.sent();
    // Only the funded notification found a live connection.
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user_id, w.freelancer.user_id);
    assert_eq!(sent[0].connection_id, conn);

    // The client's notification is persisted for the next poll.
    assert_eq!(w.notifications.unread_for(w.client.user_id).len(), 1);
}

#[test]
fn disconnect_stops_push_but_not_persistence() {
    let w = world();
    let contract = w.service.create_contract(single_milestone_terms(&w)).unwrap();
    let m = contract.milestones[0].id;

    let conn = ConnectionId::new();
    w.registry.connect(w.freelancer.user_id, conn);
    w.registry.disconnect(w.freelancer.user_id, conn);

    w.service.fund_milestone(contract.id, m, &w.client).unwrap();

    assert!(w.push.sent().is_empty());
    assert_eq!(w.notifications.unread_for(w.freelancer.user_id).len(), 1);
}

// ---------------------------------------------------------------------------
// Read state belongs to the recipient
// ---------------------------------------------------------------------------

#[test]
fn only_the_recipient_can_mark_read() {
    let w = world();
    let contract = w.service.create_contract(single_milestone_terms(&w)).unwrap();
    let m = contract.milestones[0].id;
    w.service.fund_milestone(contract.id, m, &w.client).unwrap();

    let notification = &w.notifications.unread_for(w.freelancer.user_id)[0];

    // The client cannot flip the freelancer's read flag.
    assert!(!w
        .notifications
        .mark_read(notification.id, w.client.user_id)
        .unwrap());
    assert_eq!(w.notifications.unread_for(w.freelancer.user_id).len(), 1);

    // The recipient can.
    assert!(w
        .notifications
        .mark_read(notification.id, w.freelancer.user_id)
        .unwrap());
    assert!(w.notifications.unread_for(w.freelancer.user_id).is_empty());
}
