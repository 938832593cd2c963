//! Deploy command - boots an engine, publishes the crowdsale application and
//! writes an env manifest of everything it deployed

use std::path::Path;

use anyhow::{bail, Context};
use scriptexec_apps::{CrowdsaleSuite, APP_NAME};
use scriptexec_config::{EngineSettings, StorageBackend};
use scriptexec_engine::{AppName, DispatchEngine, EngineError, EngineResult, ScriptExec};
use scriptexec_primitives::{Address, ExecutionId};
use scriptexec_store::{MemoryStore, Store};
use tracing::info;

use super::CommandResult;

const ENV_PREFIX: &str = "SCRIPTEXEC_";

/// Everything `deploy` created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub exec_admin: Address,
    pub provider: Address,
    pub registry_index: Address,
    pub registry_provider: Address,
    pub registry_id: ExecutionId,
    pub suite: CrowdsaleSuite,
}

impl Deployment {
    /// Deploys the registry and the crowdsale handlers, creates a registry
    /// instance, registers the crowdsale in it and points the front end's
    /// defaults at the result.
    pub fn run<S: Store>(
        exec: &mut ScriptExec<S>,
        exec_admin: Address,
        provider: Address,
    ) -> EngineResult<Self> {
        let engine = exec.engine_mut();
        let (registry_index, registry_provider) = engine.deploy_registry();
        let registry_id = engine
            .create_registry(registry_index, registry_provider)?
            .execution_id;
        let suite = CrowdsaleSuite::deploy(engine);
        let outcome = suite.register(engine, provider, registry_id)?;
        if let Some(reason) = outcome.reason() {
            return Err(EngineError::reverted(registry_provider, reason.clone()));
        }

        exec.configure(exec_admin, exec_admin, provider)?;
        exec.set_registry_exec_id(exec_admin, registry_id)?;
        info!(%registry_id, %provider, %exec_admin, app = APP_NAME, "deployment complete");
        Ok(Self {
            exec_admin,
            provider,
            registry_index,
            registry_provider,
            registry_id,
            suite,
        })
    }

    /// `KEY=VALUE` lines, one per deployed artifact.
    pub fn to_env(&self) -> EngineResult<String> {
        let entries = [
            ("REGISTRY_IDX_ADDRESS", self.registry_index.to_string()),
            ("PROVIDER_ADDRESS", self.registry_provider.to_string()),
            ("REGISTRY_EXEC_ID", self.registry_id.to_string()),
            ("EXEC_ADMIN", self.exec_admin.to_string()),
            ("APP_PROVIDER", self.provider.to_string()),
            ("DUTCH_IDX_ADDRESS", self.suite.index.to_string()),
            ("DUTCH_ADMIN_ADDRESS", self.suite.admin.to_string()),
            ("DUTCH_CROWDSALE_ADDRESS", self.suite.sale.to_string()),
            ("DUTCH_TOKEN_ADDRESS", self.suite.token.to_string()),
            ("DUTCH_APP_NAME", format!("'{APP_NAME}'")),
            ("DUTCH_APP_NAME_HASH", AppName::new(APP_NAME)?.to_word().to_string()),
        ];
        Ok(entries
            .iter()
            .map(|(key, value)| format!("{ENV_PREFIX}{key}={value}\n"))
            .collect())
    }
}

pub fn execute(
    settings: &EngineSettings,
    exec_admin: Address,
    provider: Address,
    env_out: Option<&Path>,
) -> CommandResult {
    let deployment = match settings.storage.backend {
        StorageBackend::Memory => {
            let engine = DispatchEngine::new(MemoryStore::new(), settings.limits);
            Deployment::run(&mut ScriptExec::new(engine), exec_admin, provider)?
        }
        StorageBackend::Sled => deploy_persistent(settings, exec_admin, provider)?,
    };

    let manifest = deployment.to_env()?;
    if let Some(path) = env_out {
        std::fs::write(path, &manifest).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote env manifest");
    }
    Ok(manifest)
}

#[cfg(feature = "sled")]
fn deploy_persistent(
    settings: &EngineSettings,
    exec_admin: Address,
    provider: Address,
) -> anyhow::Result<Deployment> {
    use scriptexec_store::SledStore;

    let Some(path) = settings.storage.path.as_deref() else {
        bail!("storage.path is required for the sled backend");
    };
    let store = SledStore::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut exec = ScriptExec::new(DispatchEngine::new(store, settings.limits));
    Ok(Deployment::run(&mut exec, exec_admin, provider)?)
}

#[cfg(not(feature = "sled"))]
fn deploy_persistent(
    _settings: &EngineSettings,
    _exec_admin: Address,
    _provider: Address,
) -> anyhow::Result<Deployment> {
    bail!("this build has no sled support; rebuild with --features sled")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec_admin() -> Address {
        Address::derive(b"exec-admin")
    }

    fn provider() -> Address {
        Address::derive(b"provider")
    }

    #[test]
    fn test_deployment_registers_crowdsale() {
        let mut exec = ScriptExec::in_memory();
        let deployment = Deployment::run(&mut exec, exec_admin(), provider()).unwrap();

        assert!(!deployment.registry_id.is_zero());
        let record = exec
            .engine()
            .registry(&deployment.registry_id)
            .unwrap()
            .lookup(&AppName::new(APP_NAME).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(record.provider, provider());
        assert_eq!(record.index, deployment.suite.index);
        assert_eq!(record.entries.len(), 13);
    }

    #[test]
    fn test_deployment_configures_front_end() {
        let mut exec = ScriptExec::in_memory();
        let deployment = Deployment::run(&mut exec, exec_admin(), provider()).unwrap();

        assert_eq!(exec.exec_admin().unwrap(), Some(exec_admin()));
        assert_eq!(exec.provider().unwrap(), Some(provider()));
        assert_eq!(exec.registry_exec_id().unwrap(), Some(deployment.registry_id));
    }

    #[test]
    fn test_manifest_lists_every_artifact() {
        let mut exec = ScriptExec::in_memory();
        let deployment = Deployment::run(&mut exec, exec_admin(), provider()).unwrap();
        let manifest = deployment.to_env().unwrap();

        assert_eq!(manifest.lines().count(), 11);
        assert!(manifest.ends_with('\n'));
        assert!(manifest.lines().all(|line| line.starts_with(ENV_PREFIX)));
        assert!(manifest.contains(&format!(
            "SCRIPTEXEC_REGISTRY_EXEC_ID={}",
            deployment.registry_id
        )));
        assert!(manifest.contains(&format!("SCRIPTEXEC_EXEC_ADMIN={}", exec_admin())));
        assert!(manifest.contains(
            "SCRIPTEXEC_DUTCH_APP_NAME_HASH=0x447574636843726f776473616c65000000000000000000000000000000000000"
        ));
    }

    #[test]
    fn test_execute_writes_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let printed = execute(&EngineSettings::default(), exec_admin(), provider(), Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), printed);
    }
}
