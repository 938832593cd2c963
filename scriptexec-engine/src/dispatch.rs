//! The dispatch engine: creates instances, routes calls to handlers and
//! commits their write sets.
//!
//! Every mutating entry point builds one [`WriteBatch`] in a scratch buffer and
//! hands it to the store with a single `write_batch` call. Any error before that
//! point leaves the store untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use scriptexec_config::ExecutionLimits;
use scriptexec_primitives::{keccak256_concat, Address, ExecutionId, Selector, H256};
use scriptexec_store::{FieldKey, MemoryStore, Namespace, Store, StoreExt, WriteBatch};
use tracing::{debug, info, warn};

use crate::abi::{CalldataBuilder, CalldataReader};
use crate::application::{Application, ImplementationTable};
use crate::context::{ExecutionContext, StorageView};
use crate::error::{EngineError, EngineResult};
use crate::event::{Event, Payment};
use crate::lifecycle::{
    InstanceRecord, InstanceState, LifecycleController, Operation, RegistryBinding,
};
use crate::receipt::{DispatchOutcome, ExecReceipt, InstanceReceipt};
use crate::registry::{AppName, ApplicationRegistry, RegistryIndex, RegistryProvider};
use crate::write_set::{AppOutcome, WriteSet};

const EXECUTION_ID_TAG: &[u8] = b"scriptexec.execution";

mod global_keys {
    use scriptexec_primitives::Address;
    use scriptexec_store::FieldKey;

    pub fn nonce() -> FieldKey {
        FieldKey::new("nonce")
    }

    pub fn balance(account: &Address) -> FieldKey {
        FieldKey::new("balances").add_address(account)
    }
}

/// A call submitted to [`DispatchEngine::exec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub sender: Address,
    pub execution_id: ExecutionId,
    pub calldata: Vec<u8>,
    pub value: u128,
    /// Implementation to call directly instead of resolving by selector.
    pub target: Option<Address>,
}

impl Invocation {
    pub fn new(sender: Address, execution_id: ExecutionId, calldata: impl Into<Vec<u8>>) -> Self {
        Self {
            sender,
            execution_id,
            calldata: calldata.into(),
            value: 0,
            target: None,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: u128) -> Self {
        self.value = value;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: Address) -> Self {
        self.target = Some(target);
        self
    }
}

/// Everything needed to create one instance.
struct InstancePlan<'c> {
    creator: Address,
    updater: Address,
    implementation: Address,
    provider: Address,
    init_calldata: &'c [u8],
    allowed_targets: Vec<Address>,
    binding: Option<RegistryBinding>,
    auto_finalize: bool,
    /// Writes outside the new instance committed in the same batch.
    extra: WriteBatch,
}

/// Single-writer router over one store.
pub struct DispatchEngine<S: Store = MemoryStore> {
    store: S,
    implementations: ImplementationTable,
    limits: ExecutionLimits,
    timestamp: u64,
}

impl DispatchEngine<MemoryStore> {
    /// Engine over a fresh `MemoryStore` with default limits.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new(), ExecutionLimits::default())
    }
}

impl Default for DispatchEngine<MemoryStore> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<S: Store> DispatchEngine<S> {
    pub fn new(store: S, limits: ExecutionLimits) -> Self {
        Self {
            store,
            implementations: ImplementationTable::new(),
            limits,
            timestamp: 0,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn limits(&self) -> &ExecutionLimits {
        &self.limits
    }

    pub fn implementations(&self) -> &ImplementationTable {
        &self.implementations
    }

    /// Registers a handler in the dispatch table and returns its address.
    pub fn deploy(&mut self, handler: Arc<dyn Application>) -> Address {
        self.implementations.deploy(handler)
    }

    /// Deploys the built-in registry handlers, returning `(index, provider)`.
    pub fn deploy_registry(&mut self) -> (Address, Address) {
        let index = self.deploy(Arc::new(RegistryIndex));
        let provider = self.deploy(Arc::new(RegistryProvider::new()));
        (index, provider)
    }

    /// Engine clock in seconds, as seen by handlers.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    pub fn advance_time(&mut self, seconds: u64) {
        self.timestamp = self.timestamp.saturating_add(seconds);
    }

    fn lifecycle(&self) -> LifecycleController<'_> {
        LifecycleController::new(&self.store)
    }

    /// Read-only view of an instance's application state.
    pub fn storage_view(&self, execution_id: &ExecutionId) -> StorageView<'_> {
        StorageView::new(&self.store, Namespace::Application, *execution_id)
    }

    pub fn instance(&self, execution_id: &ExecutionId) -> EngineResult<InstanceRecord> {
        self.lifecycle().record(execution_id)
    }

    pub fn instance_state(&self, execution_id: &ExecutionId) -> EngineResult<InstanceState> {
        self.lifecycle().state(execution_id)
    }

    /// Registry stored in an existing registry instance.
    pub fn registry(&self, execution_id: &ExecutionId) -> EngineResult<ApplicationRegistry<'_>> {
        self.instance(execution_id)?;
        let registry = ApplicationRegistry::new(self.storage_view(execution_id));
        if !registry.is_registry()? {
            return Err(EngineError::NotARegistry {
                execution_id: *execution_id,
            });
        }
        Ok(registry)
    }

    /// Total of all payments delivered to `account`.
    pub fn balance_of(&self, account: &Address) -> EngineResult<u128> {
        self.store
            .read_field(Namespace::Global, &ExecutionId::GLOBAL, &global_keys::balance(account))?
            .to_u128()
            .map_err(EngineError::from_stored)
    }

    /// Bootstraps a registry instance.
    ///
    /// The provider handler becomes both the updater and the only allowed
    /// target, so `registerApp` calls resolve to it.
    pub fn create_registry(
        &mut self,
        registry_impl: Address,
        provider_impl: Address,
    ) -> EngineResult<InstanceReceipt> {
        self.implementations.get(&provider_impl)?;
        let calldata = CalldataBuilder::signature("init()").to_bytes();
        self.instantiate(InstancePlan {
            creator: provider_impl,
            updater: provider_impl,
            implementation: registry_impl,
            provider: provider_impl,
            init_calldata: &calldata,
            allowed_targets: vec![provider_impl],
            binding: None,
            auto_finalize: false,
            extra: WriteBatch::new(),
        })
    }

    /// Creates an instance whose only allowed target is its own implementation.
    pub fn create_instance(
        &mut self,
        creator: Address,
        implementation: Address,
        init_calldata: &[u8],
    ) -> EngineResult<InstanceReceipt> {
        self.instantiate(InstancePlan {
            creator,
            updater: creator,
            implementation,
            provider: creator,
            init_calldata,
            allowed_targets: vec![implementation],
            binding: None,
            auto_finalize: false,
            extra: WriteBatch::new(),
        })
    }

    /// Creates an instance with an explicit allowed-target whitelist.
    pub fn init_and_finalize(
        &mut self,
        updater: Address,
        auto_finalize: bool,
        implementation: Address,
        init_calldata: &[u8],
        allowed_targets: &[Address],
    ) -> EngineResult<InstanceReceipt> {
        self.instantiate(InstancePlan {
            creator: updater,
            updater,
            implementation,
            provider: updater,
            init_calldata,
            allowed_targets: allowed_targets.to_vec(),
            binding: None,
            auto_finalize,
            extra: WriteBatch::new(),
        })
    }

    /// Creates an instance of the latest version of a registered application
    /// and locks that version.
    pub fn create_app_instance(
        &mut self,
        creator: Address,
        registry_id: ExecutionId,
        app_name: &str,
        init_calldata: &[u8],
    ) -> EngineResult<InstanceReceipt> {
        let name = AppName::new(app_name)?;
        let registry = self.registry(&registry_id)?;
        let record = registry
            .lookup(&name)?
            .ok_or_else(|| EngineError::UnknownApplication {
                name: name.to_string(),
            })?;
        let mut lock = WriteSet::new();
        registry.stage_lock(&mut lock, &name, record.version)?;
        let mut extra = WriteBatch::new();
        let (fields, _, _) = lock.into_parts();
        Self::stage_fields(&mut extra, &registry_id, fields);

        self.instantiate(InstancePlan {
            creator,
            updater: creator,
            implementation: record.index,
            provider: record.provider,
            init_calldata,
            allowed_targets: record.targets(),
            binding: Some(RegistryBinding {
                registry: registry_id,
                app_name: name,
                version: record.version,
                provider: record.provider,
            }),
            auto_finalize: false,
            extra,
        })
    }

    fn instantiate(&mut self, plan: InstancePlan<'_>) -> EngineResult<InstanceReceipt> {
        let handler = self.implementations.get(&plan.implementation)?;
        if let Some(missing) = plan
            .allowed_targets
            .iter()
            .find(|target| !self.implementations.contains(target))
        {
            return Err(EngineError::unknown_implementation(*missing));
        }

        let (execution_id, nonce) = self.mint_execution_id(&plan.creator)?;
        let calldata = CalldataReader::new(plan.init_calldata)?;
        let ctx = ExecutionContext::new(
            execution_id,
            plan.creator,
            plan.implementation,
            0,
            self.timestamp,
            calldata,
            self.storage_view(&execution_id),
            self.limits,
        );
        let writes = match handler.initialize(&ctx)? {
            AppOutcome::Commit(writes) => writes,
            AppOutcome::Reject(reason) => {
                warn!(
                    implementation = %plan.implementation,
                    %reason,
                    "init routine rejected its arguments"
                );
                return Err(EngineError::InvalidInitParams {
                    implementation: plan.implementation,
                    reason,
                });
            }
        };
        if !writes.payments().is_empty() {
            return Err(EngineError::PaymentExceedsValue {
                requested: writes.payment_total().unwrap_or(u128::MAX),
                available: 0,
            });
        }
        self.check_limits(&writes)?;
        let finalize = plan.auto_finalize || writes.finalize_requested();

        let record = InstanceRecord {
            execution_id,
            state: if finalize {
                InstanceState::Finalized
            } else {
                InstanceState::Initialized
            },
            updater: plan.updater,
            init_address: plan.implementation,
            allowed_targets: plan.allowed_targets,
            binding: plan.binding,
        };

        let mut batch = WriteBatch::new();
        batch.put_field(
            Namespace::Global,
            &ExecutionId::GLOBAL,
            &global_keys::nonce(),
            H256::from_u64(nonce),
        );
        LifecycleController::stage_create(&mut batch, &record);
        LifecycleController::stage_transition(
            &mut batch,
            &execution_id,
            InstanceState::Uninitialized,
            InstanceState::Initialized,
        )?;

        let (fields, records, _) = writes.into_parts();
        let storage_writes = fields.len();
        Self::stage_fields(&mut batch, &execution_id, fields);

        let mut events = Vec::with_capacity(records.len() + 2);
        events.push(Event::ApplicationInitialized {
            execution_id,
            init_address: plan.implementation,
            provider: plan.provider,
            implementation: plan.implementation,
        });
        events.extend(records.into_iter().map(|record| Event::Domain {
            emitter: plan.implementation,
            record,
        }));
        if finalize {
            LifecycleController::stage_transition(
                &mut batch,
                &execution_id,
                InstanceState::Initialized,
                InstanceState::Finalized,
            )?;
            events.push(Event::ApplicationFinalization {
                execution_id,
                init_address: plan.implementation,
            });
        }
        batch.extend(plan.extra);

        self.store.write_batch(batch)?;
        info!(
            %execution_id,
            implementation = %plan.implementation,
            state = %record.state,
            "created instance"
        );
        Ok(InstanceReceipt {
            execution_id,
            state: record.state,
            events,
            storage_writes,
        })
    }

    /// Next unused, non-zero execution ID and the nonce that produced it.
    fn mint_execution_id(&self, creator: &Address) -> EngineResult<(ExecutionId, u64)> {
        let mut nonce = self
            .store
            .read_field(Namespace::Global, &ExecutionId::GLOBAL, &global_keys::nonce())?
            .to_u64()
            .map_err(EngineError::from_stored)?;
        let lifecycle = self.lifecycle();
        loop {
            nonce = nonce
                .checked_add(1)
                .ok_or_else(|| EngineError::corrupt("execution nonce exhausted"))?;
            let nonce_bytes = nonce.to_be_bytes();
            let id = ExecutionId::new(keccak256_concat([
                EXECUTION_ID_TAG,
                nonce_bytes.as_slice(),
                creator.as_bytes().as_slice(),
            ]));
            if !id.is_zero() && lifecycle.state(&id)? == InstanceState::Uninitialized {
                return Ok((id, nonce));
            }
        }
    }

    /// Moves an instance from `Initialized` to `Finalized`. Updater only.
    pub fn finalize(
        &mut self,
        caller: Address,
        execution_id: ExecutionId,
    ) -> EngineResult<InstanceReceipt> {
        let record = self.lifecycle().record(&execution_id)?;
        LifecycleController::authorize(&record, &caller)?;
        let mut batch = WriteBatch::new();
        LifecycleController::stage_transition(
            &mut batch,
            &execution_id,
            record.state,
            InstanceState::Finalized,
        )?;
        self.store.write_batch(batch)?;
        info!(%execution_id, %caller, "finalized instance");
        Ok(InstanceReceipt {
            execution_id,
            state: InstanceState::Finalized,
            events: vec![Event::ApplicationFinalization {
                execution_id,
                init_address: record.init_address,
            }],
            storage_writes: 0,
        })
    }

    /// Replaces the allowed-target whitelist. Updater only, `Initialized` only.
    pub fn update_targets(
        &mut self,
        caller: Address,
        execution_id: ExecutionId,
        targets: &[Address],
    ) -> EngineResult<()> {
        let record = self.lifecycle().record(&execution_id)?;
        LifecycleController::authorize(&record, &caller)?;
        if !record.state.permits(Operation::Configure) {
            return Err(EngineError::OperationNotPermitted {
                execution_id,
                operation: Operation::Configure,
                state: record.state,
            });
        }
        if let Some(missing) = targets.iter().find(|t| !self.implementations.contains(t)) {
            return Err(EngineError::unknown_implementation(*missing));
        }
        let mut batch = WriteBatch::new();
        LifecycleController::stage_targets(&mut batch, &execution_id, &record.allowed_targets, targets);
        self.store.write_batch(batch)?;
        info!(%execution_id, targets = targets.len(), "updated allowed targets");
        Ok(())
    }

    /// Implementation that services `selector` for an instance.
    pub fn get_target(&self, execution_id: &ExecutionId, selector: &Selector) -> EngineResult<Address> {
        let record = self.lifecycle().record(execution_id)?;
        self.lookup_target(&record, selector)
    }

    fn lookup_target(&self, record: &InstanceRecord, selector: &Selector) -> EngineResult<Address> {
        let found = match &record.binding {
            Some(binding) => ApplicationRegistry::new(self.storage_view(&binding.registry)).resolve(
                &binding.app_name,
                binding.version,
                selector,
            )?,
            None => record.allowed_targets.iter().copied().find(|target| {
                self.implementations
                    .get(target)
                    .is_ok_and(|handler| handler.handles(selector))
            }),
        };
        found.ok_or_else(|| EngineError::unknown_selector(record.execution_id, *selector))
    }

    /// An explicit target runs directly only on unbound instances that allow
    /// it and only for a selector it services. A bound instance resolves every
    /// selector through its registry version, so the target must match.
    fn resolve_target(
        &self,
        record: &InstanceRecord,
        selector: &Selector,
        explicit: Option<Address>,
    ) -> EngineResult<Address> {
        let Some(target) = explicit else {
            return self.lookup_target(record, selector);
        };
        let direct = record.binding.is_none()
            && self
                .lifecycle()
                .is_allowed_target(&record.execution_id, &target)?;
        if direct {
            let services = self
                .implementations
                .get(&target)
                .is_ok_and(|handler| handler.handles(selector));
            if !services {
                return Err(EngineError::unknown_selector(record.execution_id, *selector));
            }
            return Ok(target);
        }
        if self.lookup_target(record, selector)? != target {
            return Err(EngineError::TargetNotAllowed {
                execution_id: record.execution_id,
                target,
            });
        }
        Ok(target)
    }

    /// Dispatches one call.
    ///
    /// Returns `Committed` when the handler's write set was applied,
    /// `DomainRejected` when the handler refused the call (one
    /// `ApplicationException` logged, nothing else), and `Err` for structural
    /// failures, in which case nothing at all happened.
    pub fn exec(&mut self, invocation: Invocation) -> EngineResult<DispatchOutcome> {
        let Invocation {
            sender,
            execution_id,
            calldata,
            value,
            target: explicit,
        } = invocation;
        let reader = CalldataReader::new(&calldata)?;
        let selector = reader.selector();
        let record = self
            .lifecycle()
            .require(&execution_id, Operation::Execute)?;
        let target = self.resolve_target(&record, &selector, explicit)?;
        let handler = self.implementations.get(&target)?;
        debug!(%execution_id, %selector, %target, %sender, value, "dispatching call");

        let ctx = ExecutionContext::new(
            execution_id,
            sender,
            target,
            value,
            self.timestamp,
            reader,
            self.storage_view(&execution_id),
            self.limits,
        );
        let writes = match handler.execute(&ctx)? {
            AppOutcome::Commit(writes) => writes,
            AppOutcome::Reject(reason) => {
                warn!(%execution_id, %target, %reason, "call rejected by application");
                let receipt = ExecReceipt {
                    execution_id,
                    target,
                    events: vec![Event::ApplicationException {
                        execution_id,
                        application_address: target,
                        message: reason.clone(),
                    }],
                    events_emitted: 0,
                    payments: 0,
                    storage_writes: 0,
                };
                return Ok(DispatchOutcome::DomainRejected { receipt, reason });
            }
        };

        self.check_limits(&writes)?;
        let total = writes
            .payment_total()
            .ok_or(EngineError::PaymentExceedsValue {
                requested: u128::MAX,
                available: value,
            })?;
        if total > value {
            return Err(EngineError::PaymentExceedsValue {
                requested: total,
                available: value,
            });
        }

        let (fields, records, payments) = writes.into_parts();
        let (events_emitted, payment_count, storage_writes) =
            (records.len(), payments.len(), fields.len());

        let mut batch = WriteBatch::new();
        Self::stage_fields(&mut batch, &execution_id, fields);
        self.stage_payments(&mut batch, &payments)?;

        let mut events: Vec<Event> = records
            .into_iter()
            .map(|record| Event::Domain {
                emitter: target,
                record,
            })
            .collect();
        events.extend(payments.iter().map(|payment| Event::DeliveredPayment {
            execution_id,
            destination: payment.recipient,
            amount: payment.amount,
        }));
        events.push(Event::ApplicationExecution {
            execution_id,
            target,
        });

        self.store.write_batch(batch)?;
        debug!(
            %execution_id,
            events = events_emitted,
            payments = payment_count,
            writes = storage_writes,
            "committed call"
        );
        Ok(DispatchOutcome::Committed(ExecReceipt {
            execution_id,
            target,
            events,
            events_emitted,
            payments: payment_count,
            storage_writes,
        }))
    }

    fn check_limits(&self, writes: &WriteSet) -> EngineResult<()> {
        let limits = &self.limits;
        let checks = [
            ("storage writes", limits.max_storage_writes_per_call, writes.writes().len()),
            ("events", limits.max_events_per_call, writes.events().len()),
            ("payments", limits.max_payments_per_call, writes.payments().len()),
        ];
        for (what, limit, actual) in checks {
            if actual > limit {
                return Err(EngineError::limit_exceeded(what, limit, actual));
            }
        }
        Ok(())
    }

    fn stage_fields(batch: &mut WriteBatch, execution_id: &ExecutionId, fields: Vec<(FieldKey, H256)>) {
        for (field, value) in fields {
            batch.put_field(Namespace::Application, execution_id, &field, value);
        }
    }

    /// Credits each recipient once with the sum of its payments.
    fn stage_payments(&self, batch: &mut WriteBatch, payments: &[Payment]) -> EngineResult<()> {
        let mut credits: BTreeMap<Address, u128> = BTreeMap::new();
        for payment in payments {
            let credit = credits.entry(payment.recipient).or_insert(0);
            *credit = credit
                .checked_add(payment.amount)
                .ok_or_else(|| EngineError::corrupt("payment total overflow"))?;
        }
        for (recipient, amount) in credits {
            let balance = self
                .balance_of(&recipient)?
                .checked_add(amount)
                .ok_or_else(|| EngineError::corrupt("payment ledger overflow"))?;
            batch.put_field(
                Namespace::Global,
                &ExecutionId::GLOBAL,
                &global_keys::balance(&recipient),
                H256::from_u128(balance),
            );
        }
        Ok(())
    }
}
