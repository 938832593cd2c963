//! Application handlers and the static dispatch table that holds them.

use std::collections::BTreeMap;
use std::sync::Arc;

use scriptexec_primitives::{Address, Selector};

use crate::context::ExecutionContext;
use crate::error::{EngineError, EngineResult};
use crate::reason::ReasonCode;
use crate::write_set::AppOutcome;

/// Trait implemented by each application handler so the engine can dispatch calls.
///
/// Handlers are stateless: everything they know comes from the context, and
/// everything they change goes back through the returned [`AppOutcome`].
pub trait Application: Send + Sync {
    fn name(&self) -> &'static str;

    /// Selectors this handler services through `execute`.
    fn selectors(&self) -> &[Selector];

    /// Init routine run once when an instance is created against this handler.
    ///
    /// A `Reject` here fails instance creation with `InvalidInitParams`.
    fn initialize(&self, _ctx: &ExecutionContext<'_>) -> EngineResult<AppOutcome> {
        Ok(AppOutcome::Reject(ReasonCode::NO_INIT_ROUTINE))
    }

    fn execute(&self, ctx: &ExecutionContext<'_>) -> EngineResult<AppOutcome>;

    fn handles(&self, selector: &Selector) -> bool {
        self.selectors().contains(selector)
    }
}

/// Deployed handlers keyed by implementation address.
#[derive(Default)]
pub struct ImplementationTable {
    handlers: BTreeMap<Address, Arc<dyn Application>>,
}

impl ImplementationTable {
    const ADDRESS_TAG: &'static [u8] = b"scriptexec.implementation";

    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Deploys a handler at a fresh deterministic address and returns it.
    ///
    /// The address depends only on the handler name and the deployment order.
    pub fn deploy(&mut self, handler: Arc<dyn Application>) -> Address {
        let ordinal = self.handlers.len() as u64;
        let mut seed = Vec::with_capacity(Self::ADDRESS_TAG.len() + 8 + handler.name().len());
        seed.extend_from_slice(Self::ADDRESS_TAG);
        seed.extend_from_slice(&ordinal.to_be_bytes());
        seed.extend_from_slice(handler.name().as_bytes());
        let address = Address::derive(&seed);
        tracing::debug!(name = handler.name(), %address, "deployed implementation");
        self.handlers.insert(address, handler);
        address
    }

    pub fn get(&self, address: &Address) -> EngineResult<Arc<dyn Application>> {
        self.handlers
            .get(address)
            .map(Arc::clone)
            .ok_or_else(|| EngineError::unknown_implementation(*address))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.handlers.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.handlers.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo {
        selectors: Vec<Selector>,
    }

    impl Application for Echo {
        fn name(&self) -> &'static str {
            "Echo"
        }

        fn selectors(&self) -> &[Selector] {
            &self.selectors
        }

        fn execute(&self, _ctx: &ExecutionContext<'_>) -> EngineResult<AppOutcome> {
            Ok(AppOutcome::Commit(Default::default()))
        }
    }

    fn echo() -> Arc<dyn Application> {
        Arc::new(Echo {
            selectors: vec![Selector::from_signature("echo()")],
        })
    }

    #[test]
    fn test_deploy_assigns_distinct_addresses() {
        let mut table = ImplementationTable::new();
        let first = table.deploy(echo());
        let second = table.deploy(echo());
        assert_ne!(first, second);
        assert_eq!(table.len(), 2);
        assert!(table.contains(&first));
    }

    #[test]
    fn test_deploy_is_deterministic() {
        let mut a = ImplementationTable::new();
        let mut b = ImplementationTable::new();
        assert_eq!(a.deploy(echo()), b.deploy(echo()));
    }

    #[test]
    fn test_get_unknown() {
        let table = ImplementationTable::new();
        assert!(matches!(
            table.get(&Address::derive(b"nobody")),
            Err(EngineError::UnknownImplementation { .. })
        ));
    }

    #[test]
    fn test_handles() {
        let handler = echo();
        assert!(handler.handles(&Selector::from_signature("echo()")));
        assert!(!handler.handles(&Selector::from_signature("other()")));
    }
}
