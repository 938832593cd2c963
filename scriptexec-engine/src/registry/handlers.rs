//! Built-in handlers that make an instance behave as a registry.

use scriptexec_primitives::Selector;

use super::{ApplicationRegistry, Registration};
use crate::application::Application;
use crate::context::ExecutionContext;
use crate::error::{EngineError, EngineResult};
use crate::write_set::{AppOutcome, WriteSet};

/// Init routine of a registry instance. Marks the namespace as a registry.
#[derive(Debug, Default)]
pub struct RegistryIndex;

impl Application for RegistryIndex {
    fn name(&self) -> &'static str {
        "RegistryIndex"
    }

    fn selectors(&self) -> &[Selector] {
        &[]
    }

    fn initialize(&self, _ctx: &ExecutionContext<'_>) -> EngineResult<AppOutcome> {
        let mut writes = WriteSet::new();
        ApplicationRegistry::stage_marker(&mut writes);
        Ok(AppOutcome::Commit(writes))
    }

    fn execute(&self, ctx: &ExecutionContext<'_>) -> EngineResult<AppOutcome> {
        Err(ctx.unknown_selector())
    }
}

/// Services `registerApp`. The calling sender is the registering provider.
#[derive(Debug)]
pub struct RegistryProvider {
    selectors: [Selector; 1],
}

impl RegistryProvider {
    pub fn new() -> Self {
        Self {
            selectors: [Registration::selector()],
        }
    }
}

impl Default for RegistryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Application for RegistryProvider {
    fn name(&self) -> &'static str {
        "RegistryProvider"
    }

    fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    fn execute(&self, ctx: &ExecutionContext<'_>) -> EngineResult<AppOutcome> {
        if ctx.selector() != Registration::selector() {
            return Err(ctx.unknown_selector());
        }
        let registry = ApplicationRegistry::new(*ctx.storage());
        if !registry.is_registry()? {
            return Err(EngineError::NotARegistry {
                execution_id: *ctx.execution_id(),
            });
        }
        let registration = Registration::decode(&mut ctx.args())?;
        let mut writes = WriteSet::new();
        registry.register(
            &mut writes,
            ctx.sender(),
            &registration,
            ctx.limits().max_selectors_per_app,
        )?;
        Ok(AppOutcome::Commit(writes))
    }
}
