//! `ScriptExec`: a front end over the [`DispatchEngine`] that remembers the
//! deployment defaults (exec admin, application provider and default registry)
//! so applications can be instantiated by name alone.
//!
//! The defaults live in the `Global` namespace of the engine's store, next to
//! the nonce, and survive reopening a persistent store.

use scriptexec_primitives::{Address, ExecutionId, H256};
use scriptexec_store::{FieldKey, MemoryStore, Namespace, Store, WriteBatch};
use tracing::info;

use crate::context::StorageView;
use crate::dispatch::{DispatchEngine, Invocation};
use crate::error::{EngineError, EngineResult};
use crate::receipt::{DispatchOutcome, InstanceReceipt};
use crate::registry::AppName;

mod keys {
    use scriptexec_store::FieldKey;

    fn setting(name: &str) -> FieldKey {
        FieldKey::new("script_exec").add_str(name)
    }

    pub fn exec_admin() -> FieldKey {
        setting("exec_admin")
    }

    pub fn provider() -> FieldKey {
        setting("provider")
    }

    pub fn registry_exec_id() -> FieldKey {
        setting("registry_exec_id")
    }
}

pub struct ScriptExec<S: Store = MemoryStore> {
    engine: DispatchEngine<S>,
}

impl ScriptExec<MemoryStore> {
    pub fn in_memory() -> Self {
        Self::new(DispatchEngine::in_memory())
    }
}

impl<S: Store> ScriptExec<S> {
    pub fn new(engine: DispatchEngine<S>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &DispatchEngine<S> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut DispatchEngine<S> {
        &mut self.engine
    }

    pub fn into_engine(self) -> DispatchEngine<S> {
        self.engine
    }

    fn settings(&self) -> StorageView<'_> {
        StorageView::new(self.engine.store(), Namespace::Global, ExecutionId::GLOBAL)
    }

    fn read_address(&self, key: &FieldKey) -> EngineResult<Option<Address>> {
        let address = self.settings().read_address(key)?;
        Ok((!address.is_zero()).then_some(address))
    }

    pub fn exec_admin(&self) -> EngineResult<Option<Address>> {
        self.read_address(&keys::exec_admin())
    }

    /// Provider whose applications `create_app_instance` instantiates.
    pub fn provider(&self) -> EngineResult<Option<Address>> {
        self.read_address(&keys::provider())
    }

    pub fn registry_exec_id(&self) -> EngineResult<Option<ExecutionId>> {
        let word = self.settings().read(&keys::registry_exec_id())?;
        Ok((!word.is_zero()).then(|| ExecutionId::new(word)))
    }

    fn require_admin(&self, caller: &Address) -> EngineResult<()> {
        match self.exec_admin()? {
            Some(admin) if admin != *caller => Err(EngineError::NotExecAdmin {
                caller: *caller,
                admin,
            }),
            Some(_) => Ok(()),
            None => Err(EngineError::ExecNotConfigured {
                setting: "exec_admin",
            }),
        }
    }

    fn write(&self, key: &FieldKey, value: H256) -> EngineResult<()> {
        let mut batch = WriteBatch::new();
        batch.put_field(Namespace::Global, &ExecutionId::GLOBAL, key, value);
        self.engine.store().write_batch(batch)?;
        Ok(())
    }

    /// Sets the exec admin and the default provider.
    ///
    /// Anyone may configure a fresh front end; afterwards only the exec admin
    /// may. A zero `exec_admin` makes the caller the admin.
    pub fn configure(
        &mut self,
        caller: Address,
        exec_admin: Address,
        provider: Address,
    ) -> EngineResult<()> {
        if self.exec_admin()?.is_some() {
            self.require_admin(&caller)?;
        }
        let exec_admin = if exec_admin.is_zero() { caller } else { exec_admin };

        let mut batch = WriteBatch::new();
        batch.put_field(
            Namespace::Global,
            &ExecutionId::GLOBAL,
            &keys::exec_admin(),
            H256::from_address(&exec_admin),
        );
        batch.put_field(
            Namespace::Global,
            &ExecutionId::GLOBAL,
            &keys::provider(),
            H256::from_address(&provider),
        );
        self.engine.store().write_batch(batch)?;
        info!(%exec_admin, %provider, "configured script exec");
        Ok(())
    }

    /// Exec admin only. The ID must name a registry instance.
    pub fn set_registry_exec_id(&mut self, caller: Address, registry_id: ExecutionId) -> EngineResult<()> {
        self.require_admin(&caller)?;
        self.engine.registry(&registry_id)?;
        self.write(&keys::registry_exec_id(), *registry_id.as_word())?;
        info!(%registry_id, "set default registry");
        Ok(())
    }

    pub fn set_provider(&mut self, caller: Address, provider: Address) -> EngineResult<()> {
        self.require_admin(&caller)?;
        self.write(&keys::provider(), H256::from_address(&provider))?;
        info!(%provider, "set default provider");
        Ok(())
    }

    /// Instantiates `app_name` from the default registry. The application must
    /// have been registered by the default provider.
    pub fn create_app_instance(
        &mut self,
        creator: Address,
        app_name: &str,
        init_calldata: &[u8],
    ) -> EngineResult<InstanceReceipt> {
        let registry_id = self.registry_exec_id()?.ok_or(EngineError::ExecNotConfigured {
            setting: "registry_exec_id",
        })?;
        let provider = self
            .provider()?
            .ok_or(EngineError::ExecNotConfigured { setting: "provider" })?;

        let name = AppName::new(app_name)?;
        let registered_by_provider = self
            .engine
            .registry(&registry_id)?
            .lookup(&name)?
            .is_some_and(|record| record.provider == provider);
        if !registered_by_provider {
            return Err(EngineError::UnknownApplication {
                name: name.to_string(),
            });
        }
        self.engine
            .create_app_instance(creator, registry_id, app_name, init_calldata)
    }

    pub fn exec(&mut self, invocation: Invocation) -> EngineResult<DispatchOutcome> {
        self.engine.exec(invocation)
    }
}
