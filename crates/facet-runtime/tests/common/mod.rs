//! Shared fixtures for integration tests.

#![allow(dead_code)]

use facet_runtime::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub const ADMIN: Address = Address([0xAA; 20]);
pub const OWNER: Address = Address([0x0E; 20]);
pub const ALICE: Address = Address([0x01; 20]);
pub const BOB: Address = Address([0x02; 20]);
pub const MALLORY: Address = Address([0x66; 20]);
pub const RELAY: Address = Address([0xF0; 20]);
pub const RUNTIME: Address = Address([0xD1; 20]);

/// Installs a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn minter() -> RoleId {
    RoleId::from_name("MINTER_ROLE")
}

pub fn op(signature: &str) -> OperationId {
    OperationId::from_signature(signature)
}

pub fn call<A: Serialize>(signature: &str, args: &A) -> Bytes {
    encode_signature_call(signature, args).unwrap()
}

// =============================================================================
// COUNTER FACET
// =============================================================================

/// Signatures served by [`CounterFacet`].
pub mod counter {
    pub const INIT: &str = "initCounter(uint64)";
    pub const INIT_REENTRANT: &str = "initCounterReentrant(uint64)";
    pub const COUNT: &str = "count()";
    pub const INCREMENT: &str = "increment()";
    pub const INCREMENT_THEN_FAIL: &str = "incrementThenFail()";
    pub const TRY_NESTED: &str = "tryNested()";
    pub const WHOAMI: &str = "whoami()";
    pub const RECURSE: &str = "recurse()";

    pub const ALL: [&str; 8] = [
        INIT,
        INIT_REENTRANT,
        COUNT,
        INCREMENT,
        INCREMENT_THEN_FAIL,
        TRY_NESTED,
        WHOAMI,
        RECURSE,
    ];

    pub const NAMESPACE_ID: &str = "tests.counter.storage";
}

#[derive(Default, Serialize, Deserialize)]
struct CounterSlot {
    value: u64,
}

/// Module with its own namespace, a one-time initializer and a role-gated
/// mutator. Exercises nested calls and caller identity.
pub struct CounterFacet;

impl CounterFacet {
    fn namespace() -> Namespace {
        Namespace::derive(counter::NAMESPACE_ID)
    }

    fn init(ctx: &mut CallContext<'_>, start: u64) -> Result<(), RuntimeError> {
        ctx.advance_phase(Self::namespace(), 0)?;
        ctx.store(Self::namespace(), &CounterSlot { value: start })
    }

    fn bump(ctx: &mut CallContext<'_>) -> Result<u64, RuntimeError> {
        let mut slot: CounterSlot = ctx.load(Self::namespace())?;
        slot.value += 1;
        ctx.store(Self::namespace(), &slot)?;
        ctx.emit_module_event("Incremented", Bytes::from(slot.value.to_be_bytes().to_vec()));
        Ok(slot.value)
    }
}

impl Facet for CounterFacet {
    fn name(&self) -> &str {
        "counter"
    }

    fn operations(&self) -> Vec<OperationId> {
        counter::ALL.iter().map(|sig| op(sig)).collect()
    }

    fn execute(
        &self,
        ctx: &mut CallContext<'_>,
        operation: OperationId,
        args: &[u8],
    ) -> Result<Bytes, RuntimeError> {
        if operation == op(counter::INIT) {
            let start: u64 = decode_args(args)?;
            Self::init(ctx, start)?;
            return encode_return(&());
        }
        if operation == op(counter::INIT_REENTRANT) {
            let start: u64 = decode_args(args)?;
            Self::init(ctx, start)?;
            ctx.call_self(call(counter::INIT, &start).as_slice())?;
            return encode_return(&());
        }
        if operation == op(counter::COUNT) {
            let slot: CounterSlot = ctx.load(Self::namespace())?;
            return encode_return(&slot.value);
        }
        if operation == op(counter::INCREMENT) {
            ctx.enforce_has_role(minter())?;
            return encode_return(&Self::bump(ctx)?);
        }
        if operation == op(counter::INCREMENT_THEN_FAIL) {
            Self::bump(ctx)?;
            return Err(RuntimeError::revert("boom"));
        }
        if operation == op(counter::TRY_NESTED) {
            if ctx.call_self(call(counter::INCREMENT_THEN_FAIL, &()).as_slice()).is_ok() {
                return Err(RuntimeError::revert("nested call did not fail"));
            }
            let slot: CounterSlot = ctx.load(Self::namespace())?;
            return encode_return(&slot.value);
        }
        if operation == op(counter::WHOAMI) {
            return encode_return(&(ctx.msg_sender(), ctx.forwarder(), ctx.this(), ctx.module()));
        }
        if operation == op(counter::RECURSE) {
            return ctx.call_self(call(counter::RECURSE, &()).as_slice());
        }
        Err(RuntimeError::UnknownOperation(operation))
    }
}

// =============================================================================
// FIXTURE
// =============================================================================

pub struct Fixture {
    pub host: Arc<InMemoryModuleHost>,
    pub diamond: Diamond,
    pub ownership: Address,
    pub access_control: Address,
    pub counter: Address,
}

impl Fixture {
    /// Runtime with the three modules deployed on the host but nothing composed.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        init_tracing();
        let host = Arc::new(InMemoryModuleHost::new());
        let ownership = host.deploy(ADMIN, Arc::new(OwnershipFacet::new()));
        let access_control = host.deploy(ADMIN, Arc::new(AccessControlFacet::new()));
        let counter = host.deploy(ADMIN, Arc::new(CounterFacet));

        let deployment = DeploymentConfig {
            address: RUNTIME,
            admin: ADMIN,
            owner: OWNER,
            trusted_forwarders: vec![RELAY],
        };
        let forwarders = Arc::new(InMemoryForwarderRegistry::with_forwarders([RELAY]));
        let diamond = Diamond::deploy(&deployment, config, host.clone(), forwarders).unwrap();

        Self {
            host,
            diamond,
            ownership,
            access_control,
            counter,
        }
    }

    /// Composes all three modules and seeds `ALICE` as minter.
    pub fn composed() -> Self {
        let mut fixture = Self::new();
        fixture.compose_all();
        fixture
    }

    pub fn compose_all(&mut self) {
        let records = vec![
            FacetCut::add(self.ownership, OwnershipFacet::new().operations()),
            FacetCut::add(self.access_control, AccessControlFacet::new().operations()),
            FacetCut::add(self.counter, CounterFacet.operations()),
        ];
        let init = InitCall {
            target: self.access_control,
            calldata: call(
                facet_runtime::facets::access_control::signatures::INIT_ACCESS_CONTROL,
                &vec![(minter(), ALICE)],
            ),
        };
        self.diamond.cut(ADMIN, records, Some(init)).unwrap();
        self.diamond
            .call(ADMIN, call(counter::INIT, &0u64).as_slice())
            .unwrap();
    }

    pub fn count(&self) -> u64 {
        let out = self
            .diamond
            .view(MALLORY, call(counter::COUNT, &()).as_slice())
            .unwrap();
        decode_return(out.as_slice()).unwrap()
    }
}
