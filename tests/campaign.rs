//! A full crowdsale campaign driven through the facade crate.

use proptest::prelude::*;
use scriptexec::apps::{calls, CrowdsaleView};
use scriptexec::prelude::*;

const START: u64 = 500;
const PRICE: u128 = 4;
const CAP: u128 = 400;

struct Campaign {
    engine: DispatchEngine,
    id: ExecutionId,
}

fn admin() -> Address {
    Address::derive(b"admin")
}

fn team() -> Address {
    Address::derive(b"team")
}

fn buyer(n: u8) -> Address {
    Address::derive(&[b'b', n])
}

impl Campaign {
    fn open() -> Self {
        let mut engine = DispatchEngine::in_memory();
        let (index, provider) = engine.deploy_registry();
        let registry = engine.create_registry(index, provider).unwrap().execution_id;
        let suite = CrowdsaleSuite::deploy(&mut engine);
        assert!(suite
            .register(&mut engine, Address::derive(b"provider"), registry)
            .unwrap()
            .is_committed());

        let params = InitParams {
            team_wallet: team(),
            start_time: START,
            price: PRICE,
            duration: 1_000,
            sell_cap: CAP,
            admin: admin(),
        };
        let id = engine
            .create_app_instance(admin(), registry, APP_NAME, &params.to_calldata())
            .unwrap()
            .execution_id;

        let mut campaign = Self { engine, id };
        campaign.admin(calls::init_crowdsale_token("Campaign", "CMP", 0).unwrap());
        campaign.admin(calls::initialize_crowdsale());
        campaign.engine.set_timestamp(START);
        campaign
    }

    fn admin(&mut self, calldata: Vec<u8>) {
        let outcome = self.engine.exec(Invocation::new(admin(), self.id, calldata)).unwrap();
        assert!(outcome.is_committed(), "{outcome:?}");
    }

    fn buy(&mut self, who: Address, wei: u128) -> DispatchOutcome {
        self.engine
            .exec(Invocation::new(who, self.id, calls::buy()).with_value(wei))
            .unwrap()
    }

    fn view(&self) -> CrowdsaleView<'_> {
        CrowdsaleView::new(self.engine.storage_view(&self.id))
    }
}

#[test]
fn test_campaign_from_launch_to_free_transfer() {
    let mut campaign = Campaign::open();

    assert!(campaign.buy(buyer(1), 100).is_committed());
    assert!(campaign.buy(buyer(2), 2_000).is_committed());
    let sold_out = campaign.buy(buyer(3), 40);
    assert_eq!(sold_out.reason().map(|r| r.as_str()), Some("SoldOut"));

    let view = campaign.view();
    assert_eq!(view.balance_of(&buyer(1)).unwrap(), 25);
    assert_eq!(view.balance_of(&buyer(2)).unwrap(), CAP - 25);
    assert!(view.is_sold_out().unwrap());
    assert_eq!(view.unique_buyers().unwrap(), 2);
    assert_eq!(campaign.engine.balance_of(&team()).unwrap(), CAP * PRICE);

    campaign.admin(calls::finalize_crowdsale());
    let outcome = campaign
        .engine
        .exec(Invocation::new(buyer(1), campaign.id, calls::transfer(&buyer(3), 5)))
        .unwrap();
    assert_eq!(
        outcome.receipt().event_names(),
        vec!["Transfer", "ApplicationExecution"]
    );
    assert_eq!(campaign.view().balance_of(&buyer(3)).unwrap(), 5);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_raised_wei_matches_tokens_sold(purchases in prop::collection::vec(1u128..=600, 1..8)) {
        let mut campaign = Campaign::open();
        let mut sold_to_buyers = 0u128;
        for (n, wei) in purchases.iter().enumerate() {
            let outcome = campaign.buy(buyer(n as u8), *wei);
            if let Some(reason) = outcome.reason() {
                prop_assert!(matches!(reason.as_str(), "SoldOut" | "InsufficientPayment"));
            }
            sold_to_buyers += campaign.view().balance_of(&buyer(n as u8)).unwrap();
        }

        let view = campaign.view();
        let sold = CAP - view.tokens_remaining().unwrap();
        prop_assert_eq!(sold, sold_to_buyers);
        prop_assert_eq!(view.crowdsale_info().unwrap().wei_raised, sold * PRICE);
        prop_assert_eq!(campaign.engine.balance_of(&team()).unwrap(), sold * PRICE);
    }
}
