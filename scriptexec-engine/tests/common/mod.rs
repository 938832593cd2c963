//! Test handler shared by the engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use scriptexec_engine::{
    AppOutcome, Application, CalldataBuilder, DispatchEngine, EngineResult, ExecutionContext,
    LogRecord, ReasonCode, WriteSet,
};
use scriptexec_primitives::{Address, ExecutionId, Selector};
use scriptexec_store::FieldKey;

pub const INIT: &str = "init(uint64)";
pub const INCREMENT: &str = "increment(uint64)";
pub const FAIL: &str = "fail()";
pub const BOOM: &str = "boom()";
pub const PAY: &str = "pay(address,uint128)";
pub const SPAM: &str = "spam(uint64)";

/// Init argument the counter refuses.
pub const REJECTED_START: u64 = 13;
/// Init argument that makes the counter finalize itself.
pub const FINALIZING_START: u64 = 999;

pub fn sel(signature: &str) -> Selector {
    Selector::from_signature(signature)
}

pub fn count_key() -> FieldKey {
    FieldKey::new("count")
}

/// Stateless counter with one selector per engine outcome.
pub struct Counter {
    selectors: Vec<Selector>,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            selectors: [INCREMENT, FAIL, BOOM, PAY, SPAM].iter().map(|s| sel(s)).collect(),
        }
    }
}

impl Application for Counter {
    fn name(&self) -> &'static str {
        "Counter"
    }

    fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    fn initialize(&self, ctx: &ExecutionContext<'_>) -> EngineResult<AppOutcome> {
        let start = ctx.args().read_u64()?;
        if start == REJECTED_START {
            return Ok(AppOutcome::reject(ReasonCode::from_static("BadStart")));
        }
        let mut writes = WriteSet::new();
        writes
            .write(count_key(), start)
            .emit(LogRecord::new("CounterCreated").data(start));
        if start == FINALIZING_START {
            writes.request_finalize();
        }
        Ok(writes.into())
    }

    fn execute(&self, ctx: &ExecutionContext<'_>) -> EngineResult<AppOutcome> {
        let selector = ctx.selector();
        let mut args = ctx.args();
        let mut writes = WriteSet::new();
        if selector == sel(INCREMENT) {
            let by = args.read_u64()?;
            let current = ctx.storage().read_u64(&count_key())?;
            writes
                .write(count_key(), current.saturating_add(by))
                .emit(LogRecord::new("Incremented").topic(ctx.sender()).data(by));
        } else if selector == sel(FAIL) {
            return Ok(AppOutcome::reject(ReasonCode::from_static("CounterFailed")));
        } else if selector == sel(BOOM) {
            return Err(ctx.revert(ReasonCode::DEFAULT_EXCEPTION));
        } else if selector == sel(PAY) {
            let recipient = args.read_address()?;
            let amount = args.read_u128()?;
            writes.pay(recipient, amount).write(FieldKey::new("paid"), amount);
        } else if selector == sel(SPAM) {
            for i in 0..args.read_u64()? {
                writes.write(FieldKey::new("spam").add_u64(i), 1u64);
            }
        } else {
            return Err(ctx.unknown_selector());
        }
        Ok(writes.into())
    }
}

pub fn alice() -> Address {
    Address::derive(b"alice")
}

pub fn bob() -> Address {
    Address::derive(b"bob")
}

pub fn init_calldata(start: u64) -> Vec<u8> {
    CalldataBuilder::signature(INIT).u64(start).to_bytes()
}

pub fn increment(by: u64) -> Vec<u8> {
    CalldataBuilder::signature(INCREMENT).u64(by).to_bytes()
}

pub fn call(signature: &str) -> Vec<u8> {
    CalldataBuilder::signature(signature).to_bytes()
}

pub struct Fixture {
    pub engine: DispatchEngine,
    pub counter: Address,
    pub instance: ExecutionId,
}

/// Engine with one counter instance created by alice, starting at 1.
pub fn fixture() -> Fixture {
    let mut engine = DispatchEngine::in_memory();
    let counter = engine.deploy(Arc::new(Counter::new()));
    let instance = engine
        .create_instance(alice(), counter, &init_calldata(1))
        .unwrap()
        .execution_id;
    Fixture {
        engine,
        counter,
        instance,
    }
}
