//! Per-instance lifecycle: state machine, updater, allowed targets and registry binding.
//!
//! All metadata lives in the `Lifecycle` namespace of the instance, which
//! handlers cannot write.

use std::fmt;

use scriptexec_primitives::{Address, ExecutionId, H256};
use scriptexec_store::{FieldKey, Namespace, Store, WriteBatch};
use serde::Serialize;
use tracing::{debug, warn};

use crate::context::StorageView;
use crate::error::{EngineError, EngineResult};
use crate::registry::AppName;

/// Instance state. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[repr(u8)]
pub enum InstanceState {
    Uninitialized = 0,
    Initialized = 1,
    Finalized = 2,
}

impl InstanceState {
    pub fn from_word(word: &H256) -> EngineResult<Self> {
        match word.to_u64().map_err(EngineError::from_stored)? {
            0 => Ok(InstanceState::Uninitialized),
            1 => Ok(InstanceState::Initialized),
            2 => Ok(InstanceState::Finalized),
            other => Err(EngineError::corrupt(format!("unknown instance state {other}"))),
        }
    }

    pub fn to_word(self) -> H256 {
        H256::from_u64(self as u64)
    }

    /// The single state reachable from this one.
    pub fn next(self) -> Option<Self> {
        match self {
            InstanceState::Uninitialized => Some(InstanceState::Initialized),
            InstanceState::Initialized => Some(InstanceState::Finalized),
            InstanceState::Finalized => None,
        }
    }

    pub fn can_transition_to(self, to: Self) -> bool {
        self.next() == Some(to)
    }

    pub fn permits(self, operation: Operation) -> bool {
        match operation {
            Operation::Execute => self != InstanceState::Uninitialized,
            Operation::Configure => self == InstanceState::Initialized,
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceState::Uninitialized => f.write_str("Uninitialized"),
            InstanceState::Initialized => f.write_str("Initialized"),
            InstanceState::Finalized => f.write_str("Finalized"),
        }
    }
}

/// Operation classes gated by instance state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Dispatching calls to the instance's handlers.
    Execute,
    /// Changing the instance's configuration (allowed targets, finalization).
    Configure,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Execute => f.write_str("execute"),
            Operation::Configure => f.write_str("configure"),
        }
    }
}

/// Ties an instance to one version of a registered application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryBinding {
    pub registry: ExecutionId,
    pub app_name: AppName,
    pub version: u64,
    pub provider: Address,
}

/// Engine-owned metadata of one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceRecord {
    pub execution_id: ExecutionId,
    pub state: InstanceState,
    pub updater: Address,
    pub init_address: Address,
    pub allowed_targets: Vec<Address>,
    pub binding: Option<RegistryBinding>,
}

mod fields {
    use scriptexec_primitives::Address;
    use scriptexec_store::FieldKey;

    pub fn state() -> FieldKey {
        FieldKey::new("state")
    }

    pub fn updater() -> FieldKey {
        FieldKey::new("updater")
    }

    pub fn init_address() -> FieldKey {
        FieldKey::new("init_address")
    }

    pub fn target_count() -> FieldKey {
        FieldKey::new("targets").add_str("count")
    }

    pub fn target_at(index: u64) -> FieldKey {
        FieldKey::new("targets").add_u64(index)
    }

    pub fn allowed(target: &Address) -> FieldKey {
        FieldKey::new("allowed").add_address(target)
    }

    pub fn binding(part: &str) -> FieldKey {
        FieldKey::new("binding").add_str(part)
    }
}

/// Reads and stages lifecycle metadata.
pub struct LifecycleController<'a> {
    store: &'a dyn Store,
}

impl<'a> LifecycleController<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    fn view(&self, execution_id: &ExecutionId) -> StorageView<'a> {
        StorageView::new(self.store, Namespace::Lifecycle, *execution_id)
    }

    pub fn state(&self, execution_id: &ExecutionId) -> EngineResult<InstanceState> {
        InstanceState::from_word(&self.view(execution_id).read(&fields::state())?)
    }

    /// Loads the full record of an existing instance.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnknownInstance` if the instance was never initialized.
    pub fn record(&self, execution_id: &ExecutionId) -> EngineResult<InstanceRecord> {
        let state = self.state(execution_id)?;
        if state == InstanceState::Uninitialized {
            return Err(EngineError::unknown_instance(*execution_id));
        }
        let view = self.view(execution_id);
        let count = view.read_u64(&fields::target_count())?;
        let allowed_targets = (0..count)
            .map(|i| view.read_address(&fields::target_at(i)))
            .collect::<EngineResult<Vec<_>>>()?;

        let registry = view.read(&fields::binding("registry"))?;
        let binding = if registry.is_zero() {
            None
        } else {
            Some(RegistryBinding {
                registry: ExecutionId::new(registry),
                app_name: AppName::from_word(&view.read(&fields::binding("name"))?)?,
                version: view.read_u64(&fields::binding("version"))?,
                provider: view.read_address(&fields::binding("provider"))?,
            })
        };

        Ok(InstanceRecord {
            execution_id: *execution_id,
            state,
            updater: view.read_address(&fields::updater())?,
            init_address: view.read_address(&fields::init_address())?,
            allowed_targets,
            binding,
        })
    }

    /// Loads the record and checks that its state permits `operation`.
    pub fn require(
        &self,
        execution_id: &ExecutionId,
        operation: Operation,
    ) -> EngineResult<InstanceRecord> {
        let record = self.record(execution_id)?;
        if !record.state.permits(operation) {
            return Err(EngineError::OperationNotPermitted {
                execution_id: *execution_id,
                operation,
                state: record.state,
            });
        }
        Ok(record)
    }

    pub fn is_allowed_target(&self, execution_id: &ExecutionId, target: &Address) -> EngineResult<bool> {
        self.view(execution_id).read_bool(&fields::allowed(target))
    }

    /// Only the recorded updater may change an instance.
    pub fn authorize(record: &InstanceRecord, caller: &Address) -> EngineResult<()> {
        if record.updater != *caller {
            warn!(execution_id = %record.execution_id, %caller, "rejected update from non-updater");
            return Err(EngineError::unauthorized(*caller, record.execution_id));
        }
        Ok(())
    }

    /// Stages a single forward step of the state machine.
    pub fn stage_transition(
        batch: &mut WriteBatch,
        execution_id: &ExecutionId,
        from: InstanceState,
        to: InstanceState,
    ) -> EngineResult<()> {
        if !from.can_transition_to(to) {
            return Err(EngineError::InvalidTransition {
                execution_id: *execution_id,
                from,
                to,
            });
        }
        batch.put_field(Namespace::Lifecycle, execution_id, &fields::state(), to.to_word());
        debug!(%execution_id, %from, %to, "staged lifecycle transition");
        Ok(())
    }

    /// Stages the metadata of a new instance (everything except its state).
    pub fn stage_create(batch: &mut WriteBatch, record: &InstanceRecord) {
        let id = &record.execution_id;
        batch.put_field(Namespace::Lifecycle, id, &fields::updater(), H256::from_address(&record.updater));
        batch.put_field(
            Namespace::Lifecycle,
            id,
            &fields::init_address(),
            H256::from_address(&record.init_address),
        );
        Self::stage_targets(batch, id, &[], &record.allowed_targets);
        if let Some(binding) = &record.binding {
            batch.put_field(Namespace::Lifecycle, id, &fields::binding("registry"), *binding.registry.as_word());
            batch.put_field(Namespace::Lifecycle, id, &fields::binding("name"), binding.app_name.to_word());
            batch.put_field(Namespace::Lifecycle, id, &fields::binding("version"), H256::from_u64(binding.version));
            batch.put_field(
                Namespace::Lifecycle,
                id,
                &fields::binding("provider"),
                H256::from_address(&binding.provider),
            );
        }
    }

    /// Stages replacement of the allowed target list.
    pub fn stage_targets(batch: &mut WriteBatch, execution_id: &ExecutionId, old: &[Address], new: &[Address]) {
        for target in old {
            batch.put_field(Namespace::Lifecycle, execution_id, &fields::allowed(target), H256::ZERO);
        }
        for i in new.len()..old.len() {
            batch.put_field(Namespace::Lifecycle, execution_id, &fields::target_at(i as u64), H256::ZERO);
        }
        for (i, target) in new.iter().enumerate() {
            batch.put_field(
                Namespace::Lifecycle,
                execution_id,
                &fields::target_at(i as u64),
                H256::from_address(target),
            );
            batch.put_field(Namespace::Lifecycle, execution_id, &fields::allowed(target), H256::from_bool(true));
        }
        batch.put_field(
            Namespace::Lifecycle,
            execution_id,
            &fields::target_count(),
            H256::from_u64(new.len() as u64),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptexec_store::MemoryStore;

    fn id(n: u64) -> ExecutionId {
        ExecutionId::new(H256::from_u64(n))
    }

    fn record(n: u64, targets: Vec<Address>) -> InstanceRecord {
        InstanceRecord {
            execution_id: id(n),
            state: InstanceState::Initialized,
            updater: Address::derive(b"updater"),
            init_address: Address::derive(b"init"),
            allowed_targets: targets,
            binding: None,
        }
    }

    fn create(store: &MemoryStore, rec: &InstanceRecord) {
        let mut batch = WriteBatch::new();
        LifecycleController::stage_create(&mut batch, rec);
        LifecycleController::stage_transition(
            &mut batch,
            &rec.execution_id,
            InstanceState::Uninitialized,
            InstanceState::Initialized,
        )
        .unwrap();
        store.write_batch(batch).unwrap();
    }

    #[test]
    fn test_transitions_are_forward_only() {
        use InstanceState::*;
        assert!(Uninitialized.can_transition_to(Initialized));
        assert!(Initialized.can_transition_to(Finalized));
        assert!(!Finalized.can_transition_to(Initialized));
        assert!(!Initialized.can_transition_to(Initialized));
        assert!(!Uninitialized.can_transition_to(Finalized));
        assert_eq!(Finalized.next(), None);
    }

    #[test]
    fn test_operation_gating() {
        use InstanceState::*;
        assert!(!Uninitialized.permits(Operation::Execute));
        assert!(Initialized.permits(Operation::Execute));
        assert!(Finalized.permits(Operation::Execute));
        assert!(Initialized.permits(Operation::Configure));
        assert!(!Finalized.permits(Operation::Configure));
    }

    #[test]
    fn test_state_word_round_trip() {
        for state in [InstanceState::Uninitialized, InstanceState::Initialized, InstanceState::Finalized] {
            assert_eq!(InstanceState::from_word(&state.to_word()).unwrap(), state);
        }
        assert!(InstanceState::from_word(&H256::from_u64(3)).is_err());
    }

    #[test]
    fn test_unknown_instance() {
        let store = MemoryStore::new();
        let controller = LifecycleController::new(&store);
        assert_eq!(controller.state(&id(1)).unwrap(), InstanceState::Uninitialized);
        assert!(matches!(controller.record(&id(1)), Err(EngineError::UnknownInstance { .. })));
    }

    #[test]
    fn test_create_and_load_record() {
        let store = MemoryStore::new();
        let targets = vec![Address::derive(b"a"), Address::derive(b"b")];
        let rec = record(1, targets.clone());
        create(&store, &rec);

        let controller = LifecycleController::new(&store);
        assert_eq!(controller.record(&id(1)).unwrap(), rec);
        assert!(controller.is_allowed_target(&id(1), &targets[1]).unwrap());
        assert!(!controller.is_allowed_target(&id(1), &Address::derive(b"c")).unwrap());
        assert!(!controller.is_allowed_target(&id(2), &targets[0]).unwrap());
    }

    #[test]
    fn test_replace_targets_clears_old_entries() {
        let store = MemoryStore::new();
        let old = vec![Address::derive(b"a"), Address::derive(b"b")];
        create(&store, &record(1, old.clone()));

        let new = vec![Address::derive(b"c")];
        let mut batch = WriteBatch::new();
        LifecycleController::stage_targets(&mut batch, &id(1), &old, &new);
        store.write_batch(batch).unwrap();

        let controller = LifecycleController::new(&store);
        let loaded = controller.record(&id(1)).unwrap();
        assert_eq!(loaded.allowed_targets, new);
        assert!(!controller.is_allowed_target(&id(1), &old[0]).unwrap());
        assert!(controller.is_allowed_target(&id(1), &new[0]).unwrap());
    }

    #[test]
    fn test_authorize() {
        let rec = record(1, vec![]);
        assert!(LifecycleController::authorize(&rec, &Address::derive(b"updater")).is_ok());
        assert!(matches!(
            LifecycleController::authorize(&rec, &Address::derive(b"mallory")),
            Err(EngineError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_backwards_transition_rejected() {
        let mut batch = WriteBatch::new();
        let err = LifecycleController::stage_transition(
            &mut batch,
            &id(1),
            InstanceState::Finalized,
            InstanceState::Initialized,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
        assert!(batch.is_empty());
    }
}
