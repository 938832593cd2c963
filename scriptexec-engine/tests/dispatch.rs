//! Dispatch outcomes, atomicity and lifecycle gating.

mod common;

use std::sync::Arc;

use common::*;
use proptest::prelude::*;
use scriptexec_config::ExecutionLimits;
use scriptexec_engine::{
    CalldataBuilder, DispatchEngine, DispatchOutcome, EngineError, Event, InstanceState,
    Invocation, Operation,
};
use scriptexec_primitives::{Address, ExecutionId, H256};
use scriptexec_store::MemoryStore;

#[test]
fn test_committed_call_counts_and_event_order() {
    let mut f = fixture();
    let outcome = f
        .engine
        .exec(Invocation::new(bob(), f.instance, increment(5)))
        .unwrap();

    assert!(outcome.is_committed());
    assert_eq!(outcome.counts(), (1, 0, 1));
    assert_eq!(
        outcome.receipt().event_names(),
        vec!["Incremented", "ApplicationExecution"]
    );
    assert_eq!(
        outcome.receipt().last_event(),
        Some(&Event::ApplicationExecution {
            execution_id: f.instance,
            target: f.counter,
        })
    );
    let record = outcome.receipt().domain_events().next().unwrap();
    assert_eq!(record.topics, vec![H256::from(bob())]);
    assert_eq!(
        f.engine.storage_view(&f.instance).read_u64(&count_key()).unwrap(),
        6
    );
}

#[test]
fn test_soft_reject_logs_one_exception_and_commits_nothing() {
    let mut f = fixture();
    let before = f.engine.store().snapshot();
    let outcome = f
        .engine
        .exec(Invocation::new(bob(), f.instance, call(FAIL)).with_value(10))
        .unwrap();

    let DispatchOutcome::DomainRejected { receipt, reason } = &outcome else {
        panic!("expected a domain rejection, got {outcome:?}");
    };
    assert_eq!(reason, "CounterFailed");
    assert_eq!(receipt.counts(), (0, 0, 0));
    assert_eq!(
        receipt.events,
        vec![Event::ApplicationException {
            execution_id: f.instance,
            application_address: f.counter,
            message: reason.clone(),
        }]
    );
    assert_eq!(f.engine.store().snapshot(), before);
    assert_eq!(f.engine.balance_of(&bob()).unwrap(), 0);
}

#[test]
fn test_hard_revert_leaves_store_untouched() {
    let mut f = fixture();
    let before = f.engine.store().snapshot();
    let err = f
        .engine
        .exec(Invocation::new(bob(), f.instance, call(BOOM)))
        .unwrap_err();

    assert!(matches!(err, EngineError::Reverted { target, .. } if target == f.counter));
    assert_eq!(f.engine.store().snapshot(), before);
}

#[test]
fn test_structural_failures() {
    let mut f = fixture();
    let before = f.engine.store().snapshot();

    let err = f
        .engine
        .exec(Invocation::new(bob(), f.instance, call("missing()")))
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownSelector { .. }));

    let err = f
        .engine
        .exec(Invocation::new(bob(), f.instance, vec![0xde, 0xad, 0xbe]))
        .unwrap_err();
    assert!(matches!(err, EngineError::MalformedCalldata { .. }));

    let mut truncated = increment(1);
    truncated.truncate(20);
    let err = f
        .engine
        .exec(Invocation::new(bob(), f.instance, truncated))
        .unwrap_err();
    assert!(matches!(err, EngineError::MalformedCalldata { .. }));

    let ghost = ExecutionId::new(H256::from_u64(404));
    let err = f
        .engine
        .exec(Invocation::new(bob(), ghost, increment(1)))
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownInstance { .. }));

    assert_eq!(f.engine.store().snapshot(), before);
}

#[test]
fn test_payments_are_bounded_by_value_and_credited() {
    let mut f = fixture();
    let pay = |amount: u128| {
        CalldataBuilder::signature(PAY)
            .address(&bob())
            .u128(amount)
            .to_bytes()
    };

    let outcome = f
        .engine
        .exec(Invocation::new(alice(), f.instance, pay(40)).with_value(100))
        .unwrap();
    assert_eq!(outcome.counts(), (0, 1, 1));
    assert_eq!(
        outcome.receipt().event_names(),
        vec!["DeliveredPayment", "ApplicationExecution"]
    );
    assert_eq!(f.engine.balance_of(&bob()).unwrap(), 40);

    let before = f.engine.store().snapshot();
    let err = f
        .engine
        .exec(Invocation::new(alice(), f.instance, pay(150)).with_value(100))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::PaymentExceedsValue {
            requested: 150,
            available: 100
        }
    ));
    assert_eq!(f.engine.store().snapshot(), before);
    assert_eq!(f.engine.balance_of(&bob()).unwrap(), 40);
}

#[test]
fn test_limits_reject_oversized_write_sets() {
    let limits = ExecutionLimits {
        max_storage_writes_per_call: 4,
        ..ExecutionLimits::default()
    };
    let mut engine = DispatchEngine::new(MemoryStore::new(), limits);
    let counter = engine.deploy(Arc::new(Counter::new()));
    let id = engine
        .create_instance(alice(), counter, &init_calldata(0))
        .unwrap()
        .execution_id;
    let spam = |n: u64| CalldataBuilder::signature(SPAM).u64(n).to_bytes();

    let outcome = engine.exec(Invocation::new(alice(), id, spam(4))).unwrap();
    assert_eq!(outcome.counts(), (0, 0, 4));

    let before = engine.store().snapshot();
    let err = engine.exec(Invocation::new(alice(), id, spam(5))).unwrap_err();
    assert!(matches!(
        err,
        EngineError::LimitExceeded {
            limit: 4,
            actual: 5,
            ..
        }
    ));
    assert_eq!(engine.store().snapshot(), before);
}

#[test]
fn test_creation_and_finalization_events_share_the_execution_id() {
    let mut f = fixture();
    let created = f
        .engine
        .create_instance(alice(), f.counter, &init_calldata(7))
        .unwrap();
    assert!(!created.execution_id.is_zero());
    assert_eq!(created.state, InstanceState::Initialized);
    assert_eq!(created.storage_writes, 1);
    assert_eq!(
        created.event_names(),
        vec!["ApplicationInitialized", "CounterCreated"]
    );

    let finalized = f.engine.finalize(alice(), created.execution_id).unwrap();
    assert_eq!(
        finalized.events,
        vec![Event::ApplicationFinalization {
            execution_id: created.execution_id,
            init_address: f.counter,
        }]
    );
    assert_eq!(
        created.events[0].execution_id(),
        finalized.events[0].execution_id()
    );
}

#[test]
fn test_init_routine_may_request_finalization() {
    let mut f = fixture();
    let receipt = f
        .engine
        .create_instance(alice(), f.counter, &init_calldata(FINALIZING_START))
        .unwrap();

    assert_eq!(receipt.state, InstanceState::Finalized);
    assert_eq!(
        receipt.event_names(),
        vec![
            "ApplicationInitialized",
            "CounterCreated",
            "ApplicationFinalization"
        ]
    );
    assert!(receipt
        .events
        .iter()
        .filter_map(Event::execution_id)
        .all(|id| *id == receipt.execution_id));
    assert_eq!(
        f.engine.instance_state(&receipt.execution_id).unwrap(),
        InstanceState::Finalized
    );
}

#[test]
fn test_rejected_init_creates_nothing() {
    let mut f = fixture();
    let before = f.engine.store().snapshot();
    let err = f
        .engine
        .create_instance(alice(), f.counter, &init_calldata(REJECTED_START))
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::InvalidInitParams { ref reason, .. } if reason == "BadStart"
    ));
    assert_eq!(f.engine.store().snapshot(), before);
}

#[test]
fn test_lifecycle_is_updater_only_and_forward_only() {
    let mut f = fixture();

    let err = f.engine.finalize(bob(), f.instance).unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized { caller, .. } if caller == bob()));
    assert_eq!(
        f.engine.instance_state(&f.instance).unwrap(),
        InstanceState::Initialized
    );

    f.engine.finalize(alice(), f.instance).unwrap();
    let err = f.engine.finalize(alice(), f.instance).unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidTransition {
            from: InstanceState::Finalized,
            to: InstanceState::Finalized,
            ..
        }
    ));

    let err = f
        .engine
        .update_targets(alice(), f.instance, &[f.counter])
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::OperationNotPermitted {
            operation: Operation::Configure,
            state: InstanceState::Finalized,
            ..
        }
    ));

    // Finalized instances keep serving calls.
    let outcome = f
        .engine
        .exec(Invocation::new(bob(), f.instance, increment(1)))
        .unwrap();
    assert!(outcome.is_committed());
}

#[test]
fn test_explicit_targets_must_be_allowed() {
    let mut f = fixture();
    let other = f.engine.deploy(Arc::new(Counter::new()));

    let err = f
        .engine
        .exec(Invocation::new(bob(), f.instance, increment(1)).with_target(other))
        .unwrap_err();
    assert!(matches!(err, EngineError::TargetNotAllowed { target, .. } if target == other));

    let err = f
        .engine
        .update_targets(bob(), f.instance, &[f.counter, other])
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized { .. }));

    let err = f
        .engine
        .update_targets(alice(), f.instance, &[Address::derive(b"ghost")])
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownImplementation { .. }));

    f.engine
        .update_targets(alice(), f.instance, &[f.counter, other])
        .unwrap();
    let outcome = f
        .engine
        .exec(Invocation::new(bob(), f.instance, increment(1)).with_target(other))
        .unwrap();
    assert_eq!(outcome.receipt().target, other);

    // An allowed target still has to service the selector.
    let err = f
        .engine
        .exec(Invocation::new(bob(), f.instance, call("reset()")).with_target(other))
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownSelector { .. }));

    f.engine.update_targets(alice(), f.instance, &[other]).unwrap();
    let record = f.engine.instance(&f.instance).unwrap();
    assert_eq!(record.allowed_targets, vec![other]);
    assert_eq!(
        f.engine.get_target(&f.instance, &sel(INCREMENT)).unwrap(),
        other
    );
}

#[test]
fn test_init_and_finalize_with_whitelist() {
    let mut engine = DispatchEngine::in_memory();
    let index = engine.deploy(Arc::new(Counter::new()));
    let worker = engine.deploy(Arc::new(Counter::new()));

    let receipt = engine
        .init_and_finalize(alice(), true, index, &init_calldata(3), &[worker])
        .unwrap();
    assert_eq!(receipt.state, InstanceState::Finalized);
    assert_eq!(
        engine.get_target(&receipt.execution_id, &sel(INCREMENT)).unwrap(),
        worker
    );

    let outcome = engine
        .exec(Invocation::new(bob(), receipt.execution_id, increment(2)))
        .unwrap();
    assert_eq!(outcome.receipt().target, worker);
    assert_eq!(
        engine
            .storage_view(&receipt.execution_id)
            .read_u64(&count_key())
            .unwrap(),
        5
    );
}

#[test]
fn test_instances_are_isolated() {
    let mut f = fixture();
    let second = f
        .engine
        .create_instance(bob(), f.counter, &init_calldata(100))
        .unwrap()
        .execution_id;
    f.engine
        .exec(Invocation::new(bob(), second, increment(1)))
        .unwrap();

    assert_eq!(
        f.engine.storage_view(&f.instance).read_u64(&count_key()).unwrap(),
        1
    );
    assert_eq!(
        f.engine.storage_view(&second).read_u64(&count_key()).unwrap(),
        101
    );
}

proptest! {
    #[test]
    fn prop_failed_calls_never_touch_the_store(
        increments in prop::collection::vec(0u64..1000, 0..6),
        garbage in prop::collection::vec(any::<u8>(), 0..80),
    ) {
        let mut f = fixture();
        for by in increments {
            f.engine.exec(Invocation::new(bob(), f.instance, increment(by))).unwrap();
        }
        let before = f.engine.store().snapshot();

        for calldata in [call(BOOM), call(FAIL), garbage] {
            match f.engine.exec(Invocation::new(bob(), f.instance, calldata)) {
                Ok(DispatchOutcome::Committed(_)) => {
                    // Only reachable if the random bytes hit a real selector.
                    return Ok(());
                }
                Ok(DispatchOutcome::DomainRejected { receipt, .. }) => {
                    prop_assert_eq!(receipt.events.len(), 1);
                }
                Err(_) => {}
            }
            prop_assert_eq!(&f.engine.store().snapshot(), &before);
        }
    }
}
