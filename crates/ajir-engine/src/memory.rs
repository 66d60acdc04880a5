//! # In-Memory Reference Stores
//!
//! `DashMap`-backed implementations of the storage seams. The revision
//! check and write run under a single entry lock, so a save observes a
//! consistent aggregate and cannot interleave with a concurrent save of
//! the same aggregate.

use dashmap::DashMap;

use ajir_contract::Contract;
use ajir_core::{ContractId, DisputeId, WorkflowError};
use ajir_dispute::Dispute;

use crate::store::{ContractStore, DisputeStore};

/// In-memory contract store.
#[derive(Default)]
pub struct InMemoryContractStore {
    contracts: DashMap<ContractId, Contract>,
}

impl InMemoryContractStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            contracts: DashMap::new(),
        }
    }

    /// Number of stored contracts.
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl ContractStore for InMemoryContractStore {
    fn insert(&self, contract: Contract) -> Result<(), WorkflowError> {
        if self.contracts.contains_key(&contract.id) {
            return Err(WorkflowError::Conflict(format!(
                "contract {} already exists",
                contract.id
            )));
        }
        self.contracts.insert(contract.id, contract);
        Ok(())
    }

    fn load(&self, contract_id: ContractId) -> Result<Contract, WorkflowError> {
        self.contracts
            .get(&contract_id)
            .map(|entry| entry.value().clone())
            .ok_or(WorkflowError::NotFound {
                entity: "contract",
                id: contract_id.to_string(),
            })
    }

    fn save(&self, mut contract: Contract) -> Result<Contract, WorkflowError> {
        let mut entry =
            self.contracts
                .get_mut(&contract.id)
                .ok_or(WorkflowError::NotFound {
                    entity: "contract",
                    id: contract.id.to_string(),
                })?;
        if entry.value().revision != contract.revision {
            return Err(WorkflowError::Conflict(format!(
                "contract {} was modified concurrently",
                contract.id
            )));
        }
        contract.revision += 1;
        *entry.value_mut() = contract.clone();
        Ok(contract)
    }
}

impl std::fmt::Debug for InMemoryContractStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContractStore")
            .field("contract_count", &self.contracts.len())
            .finish()
    }
}

/// In-memory dispute store.
#[derive(Default)]
pub struct InMemoryDisputeStore {
    disputes: DashMap<DisputeId, Dispute>,
}

impl InMemoryDisputeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            disputes: DashMap::new(),
        }
    }
}

impl DisputeStore for InMemoryDisputeStore {
    fn insert(&self, dispute: Dispute) -> Result<(), WorkflowError> {
        if self.disputes.contains_key(&dispute.id) {
            return Err(WorkflowError::Conflict(format!(
                "dispute {} already exists",
                dispute.id
            )));
        }
        self.disputes.insert(dispute.id, dispute);
        Ok(())
    }

    fn load(&self, dispute_id: DisputeId) -> Result<Dispute, WorkflowError> {
        self.disputes
            .get(&dispute_id)
            .map(|entry| entry.value().clone())
            .ok_or(WorkflowError::NotFound {
                entity: "dispute",
                id: dispute_id.to_string(),
            })
    }

    fn save(&self, mut dispute: Dispute) -> Result<Dispute, WorkflowError> {
        let mut entry = self
            .disputes
            .get_mut(&dispute.id)
            .ok_or(WorkflowError::NotFound {
                entity: "dispute",
                id: dispute.id.to_string(),
            })?;
        if entry.value().revision != dispute.revision {
            return Err(WorkflowError::Conflict(format!(
                "dispute {} was modified concurrently",
                dispute.id
            )));
        }
        dispute.revision += 1;
        *entry.value_mut() = dispute.clone();
        Ok(dispute)
    }

    fn blocking_for_contract(&self, contract_id: ContractId) -> Option<Dispute> {
        self.disputes
            .iter()
            .find(|entry| entry.value().contract_id == contract_id && entry.value().is_blocking())
            .map(|entry| entry.value().clone())
    }
}

impl std::fmt::Debug for InMemoryDisputeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDisputeStore")
            .field("dispute_count", &self.disputes.len())
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ajir_contract::MilestonePlan;
    use ajir_core::{Money, ProjectId, UserId};

    fn sample_contract() -> Contract {
        Contract::new(
            UserId::new(),
            UserId::new(),
            ProjectId::new(),
            "Logo design",
            Money::new("300", "USD").unwrap(),
            vec![MilestonePlan {
                description: "Concepts".to_string(),
                amount: Money::new("300", "USD").unwrap(),
                due_date: None,
            }],
        )
        .unwrap()
    }

    #[test]
    fn test_insert_and_load() {
        let store = InMemoryContractStore::new();
        let contract = sample_contract();
        let id = contract.id;
        store.insert(contract).unwrap();
        assert_eq!(store.load(id).unwrap().id, id);
    }

    #[test]
    fn test_double_insert_is_conflict() {
        let store = InMemoryContractStore::new();
        let contract = sample_contract();
        store.insert(contract.clone()).unwrap();
        assert!(matches!(
            store.insert(contract),
            Err(WorkflowError::Conflict(_))
        ));
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let store = InMemoryContractStore::new();
        assert!(matches!(
            store.load(ContractId::new()),
            Err(WorkflowError::NotFound { .. })
        ));
    }

    #[test]
    fn test_save_bumps_revision() {
        let store = InMemoryContractStore::new();
        let contract = sample_contract();
        let id = contract.id;
        store.insert(contract).unwrap();

        let loaded = store.load(id).unwrap();
        assert_eq!(loaded.revision, 0);
        let saved = store.save(loaded).unwrap();
        assert_eq!(saved.revision, 1);
        assert_eq!(store.load(id).unwrap().revision, 1);
    }

    #[test]
    fn test_stale_save_is_conflict() {
        let store = InMemoryContractStore::new();
        let contract = sample_contract();
        let id = contract.id;
        store.insert(contract).unwrap();

        // Two requests load the same revision; only the first save wins.
        let first = store.load(id).unwrap();
        let second = store.load(id).unwrap();
        store.save(first).unwrap();
        assert!(matches!(
            store.save(second),
            Err(WorkflowError::Conflict(_))
        ));
    }

    #[test]
    fn test_blocking_dispute_lookup() {
        let store = InMemoryDisputeStore::new();
        let contract_id = ContractId::new();
        let dispute = Dispute::open(
            contract_id,
            UserId::new(),
            UserId::new(),
            "Scope disagreement",
        )
        .unwrap();
        let dispute_id = dispute.id;
        store.insert(dispute).unwrap();

        assert_eq!(
            store.blocking_for_contract(contract_id).unwrap().id,
            dispute_id
        );
        assert!(store.blocking_for_contract(ContractId::new()).is_none());
    }

    #[test]
    fn test_resolved_dispute_no_longer_blocks() {
        let store = InMemoryDisputeStore::new();
        let contract_id = ContractId::new();
        let admin = UserId::new();
        let mut dispute = Dispute::open(
            contract_id,
            UserId::new(),
            UserId::new(),
            "Scope disagreement",
        )
        .unwrap();
        dispute.claim(admin).unwrap();
        dispute
            .resolve(admin, ajir_dispute::DisputeOutcome::Rejected)
            .unwrap();
        store.insert(dispute).unwrap();

        assert!(store.blocking_for_contract(contract_id).is_none());
    }
}
