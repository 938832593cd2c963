//! Deploying and registering the crowdsale handlers as one application.

use std::sync::Arc;

use scriptexec_engine::{
    AppName, DispatchEngine, DispatchOutcome, EngineResult, Invocation, Registration,
};
use scriptexec_primitives::{Address, ExecutionId, Selector};
use scriptexec_store::Store;
use tracing::info;

use crate::calls::signatures;
use crate::{CrowdsaleAdmin, CrowdsaleIndex, CrowdsaleSale, CrowdsaleToken};

/// Name the suite is registered under.
pub const APP_NAME: &str = "DutchCrowdsale";

/// Addresses of the four deployed crowdsale handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrowdsaleSuite {
    pub index: Address,
    pub admin: Address,
    pub sale: Address,
    pub token: Address,
}

impl CrowdsaleSuite {
    pub fn deploy<S: Store>(engine: &mut DispatchEngine<S>) -> Self {
        let suite = Self {
            index: engine.deploy(Arc::new(CrowdsaleIndex)),
            admin: engine.deploy(Arc::new(CrowdsaleAdmin::new())),
            sale: engine.deploy(Arc::new(CrowdsaleSale::new())),
            token: engine.deploy(Arc::new(CrowdsaleToken::new())),
        };
        info!(
            index = %suite.index,
            admin = %suite.admin,
            sale = %suite.sale,
            token = %suite.token,
            "deployed crowdsale handlers"
        );
        suite
    }

    /// The 13 selectors of the application and the handler servicing each:
    /// admin entry points first, then the sale, then the token.
    pub fn selectors_and_targets(&self) -> (Vec<Selector>, Vec<Address>) {
        let groups: [(&[&str], Address); 3] = [
            (&signatures::ADMIN, self.admin),
            (&signatures::SALE, self.sale),
            (&signatures::TOKEN, self.token),
        ];
        groups
            .iter()
            .flat_map(|(group, target)| {
                group
                    .iter()
                    .map(move |signature| (Selector::from_signature(signature), *target))
            })
            .unzip()
    }

    pub fn registration(&self) -> EngineResult<Registration> {
        let (selectors, targets) = self.selectors_and_targets();
        Ok(Registration {
            name: AppName::new(APP_NAME)?,
            index: self.index,
            selectors,
            targets,
        })
    }

    /// Registers the suite in `registry` on behalf of `provider`.
    pub fn register<S: Store>(
        &self,
        engine: &mut DispatchEngine<S>,
        provider: Address,
        registry: ExecutionId,
    ) -> EngineResult<DispatchOutcome> {
        let calldata = self.registration()?.to_calldata();
        engine.exec(Invocation::new(provider, registry, calldata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thirteen_entries_grouped_by_handler() {
        let mut engine = DispatchEngine::in_memory();
        let suite = CrowdsaleSuite::deploy(&mut engine);
        let (selectors, targets) = suite.selectors_and_targets();

        assert_eq!(selectors.len(), 13);
        assert_eq!(targets.len(), 13);
        assert!(targets[..7].iter().all(|t| *t == suite.admin));
        assert_eq!(targets[7], suite.sale);
        assert!(targets[8..].iter().all(|t| *t == suite.token));
        assert_eq!(selectors[7], Selector::from_signature("buy()"));
    }
}
