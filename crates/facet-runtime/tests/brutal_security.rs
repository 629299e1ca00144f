//! # Brutal Security Tests for the Facet Runtime
//!
//! These tests attempt to break the runtime's security invariants.
//!
//! ## Test Categories
//!
//! 1. **Caller Spoofing** - Sender tags from untrusted relays, forwarded privilege
//! 2. **Initializer Replay** - Re-running, re-entering or front-running one-time initializers
//! 3. **Atomicity** - Partial cuts, failing init calls, caught nested failures
//! 4. **Resource Limits** - Unbounded re-entrancy, malformed calldata
//! 5. **Invariant Violations** - Routes left pointing at missing code

mod common;

use common::*;
use facet_runtime::domain::abi::signatures;
use facet_runtime::facets::{access_control, ownership};
use facet_runtime::prelude::*;
use std::sync::Arc;

// =============================================================================
// 1. CALLER SPOOFING
// =============================================================================

#[test]
fn test_untrusted_caller_cannot_spoof_admin_tag() {
    let mut fixture = Fixture::new();
    let args = DiamondCutArgs {
        records: vec![FacetCut::add(fixture.counter, vec![op(counter::COUNT)])],
        init: Address::ZERO,
        calldata: Bytes::new(),
    };
    let calldata = encode_call(NativeOperation::DiamondCut.id(), &args).unwrap();
    let spoofed = append_sender_tag(calldata.as_slice(), ADMIN);

    let err = fixture.diamond.call(MALLORY, spoofed.as_slice()).unwrap_err();
    assert_eq!(err, RuntimeError::NotAdmin { caller: MALLORY });
    assert!(fixture.diamond.routing_table().unwrap().is_empty());
}

#[test]
fn test_trusted_forwarder_relays_logical_caller() {
    let mut fixture = Fixture::composed();
    let tagged = append_sender_tag(call(counter::WHOAMI, &()).as_slice(), ALICE);

    let out = fixture.diamond.call(RELAY, tagged.as_slice()).unwrap();
    let (sender, forwarder, this, module): (Address, Option<Address>, Address, Address) =
        decode_return(out.as_slice()).unwrap();

    assert_eq!(sender, ALICE);
    assert_eq!(forwarder, Some(RELAY));
    assert_eq!(this, RUNTIME);
    assert_eq!(module, fixture.counter);
}

#[test]
fn test_forwarder_gains_no_privilege_of_its_own() {
    let mut fixture = Fixture::composed();

    // The relay is not a minter and its tag names MALLORY: the check runs
    // against MALLORY, not against the relay or anyone else.
    let tagged = append_sender_tag(call(counter::INCREMENT, &()).as_slice(), MALLORY);
    let err = fixture.diamond.call(RELAY, tagged.as_slice()).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::MissingRole {
            role: minter(),
            account: MALLORY
        }
    );

    // Forwarding for ALICE carries ALICE's role and nothing more.
    let tagged = append_sender_tag(call(counter::INCREMENT, &()).as_slice(), ALICE);
    fixture.diamond.call(RELAY, tagged.as_slice()).unwrap();
    assert_eq!(fixture.count(), 1);
}

#[test]
fn test_forwarded_nested_failure_drops_its_events() {
    let mut fixture = Fixture::composed();
    let tagged = append_sender_tag(call(counter::TRY_NESTED, &()).as_slice(), ALICE);
    fixture.diamond.call(RELAY, tagged.as_slice()).unwrap();

    let module_events = fixture
        .diamond
        .events()
        .filter(|event| matches!(event, RuntimeEvent::Module { .. }))
        .count();
    assert_eq!(module_events, 0);
}

#[test]
fn test_short_calldata_from_forwarder_is_not_tagged() {
    let fixture = Fixture::composed();
    let out = fixture
        .diamond
        .view(RELAY, call(counter::WHOAMI, &()).as_slice())
        .unwrap();
    let (sender, forwarder, _, _): (Address, Option<Address>, Address, Address) =
        decode_return(out.as_slice()).unwrap();
    assert_eq!(sender, RELAY);
    assert_eq!(forwarder, None);
}

#[test]
fn test_spoofed_owner_tag_rejected_for_grant() {
    let mut fixture = Fixture::composed();
    let grant = call(access_control::signatures::GRANT_ROLE, &(minter(), MALLORY));
    let spoofed = append_sender_tag(grant.as_slice(), OWNER);

    let err = fixture.diamond.call(MALLORY, spoofed.as_slice()).unwrap_err();
    assert_eq!(err, RuntimeError::NotOwner { caller: MALLORY });
}

#[test]
fn test_zero_admin_means_no_admin() {
    let host = Arc::new(InMemoryModuleHost::new());
    let module = host.deploy(ADMIN, Arc::new(OwnershipFacet::new()));
    let deployment = DeploymentConfig {
        address: RUNTIME,
        admin: Address::ZERO,
        owner: Address::ZERO,
        trusted_forwarders: vec![],
    };
    let mut diamond = Diamond::deploy(
        &deployment,
        RuntimeConfig::default(),
        host,
        Arc::new(InMemoryForwarderRegistry::new()),
    )
    .unwrap();

    let err = diamond
        .cut(Address::ZERO, vec![FacetCut::add(module, OwnershipFacet::new().operations())], None)
        .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::NotAdmin {
            caller: Address::ZERO
        }
    );
}

// =============================================================================
// 2. INITIALIZER REPLAY
// =============================================================================

#[test]
fn test_initializer_runs_once() {
    let mut fixture = Fixture::composed();
    let err = fixture
        .diamond
        .call(ADMIN, call(counter::INIT, &100u64).as_slice())
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::PhaseAlreadyReached {
            expected: 0,
            current: 1,
            ..
        }
    ));
    assert_eq!(fixture.count(), 0);
}

#[test]
fn test_access_control_init_cannot_be_replayed_to_self_grant() {
    let mut fixture = Fixture::composed();
    let replay = call(
        access_control::signatures::INIT_ACCESS_CONTROL,
        &vec![(minter(), MALLORY)],
    );

    let err = fixture.diamond.call(MALLORY, replay.as_slice()).unwrap_err();
    assert_eq!(err.reason_code(), "PhaseAlreadyReached");

    let out = fixture
        .diamond
        .view(MALLORY, call(access_control::signatures::HAS_ROLE, &(minter(), MALLORY)).as_slice())
        .unwrap();
    assert!(!decode_return::<bool>(out.as_slice()).unwrap());
}

#[test]
fn test_access_control_init_requires_admin() {
    let mut fixture = Fixture::new();
    fixture
        .diamond
        .cut(
            ADMIN,
            vec![FacetCut::add(fixture.access_control, AccessControlFacet::new().operations())],
            None,
        )
        .unwrap();

    let seed = call(
        access_control::signatures::INIT_ACCESS_CONTROL,
        &vec![(minter(), MALLORY)],
    );
    let err = fixture.diamond.call(MALLORY, seed.as_slice()).unwrap_err();
    assert_eq!(err, RuntimeError::NotAdmin { caller: MALLORY });

    let has_role = call(access_control::signatures::HAS_ROLE, &(minter(), MALLORY));
    let out = fixture.diamond.view(MALLORY, has_role.as_slice()).unwrap();
    assert!(!decode_return::<bool>(out.as_slice()).unwrap());

    // The rejected run left the phase at 0, so the admin can still seed.
    let seed = call(
        access_control::signatures::INIT_ACCESS_CONTROL,
        &vec![(minter(), ALICE)],
    );
    fixture.diamond.call(ADMIN, seed.as_slice()).unwrap();
    let has_role = call(access_control::signatures::HAS_ROLE, &(minter(), ALICE));
    let out = fixture.diamond.view(ALICE, has_role.as_slice()).unwrap();
    assert!(decode_return::<bool>(out.as_slice()).unwrap());
}

#[test]
fn test_reentrant_initializer_fails_whole_cut() {
    let mut fixture = Fixture::new();
    let logs_before = fixture.diamond.logs().len();
    let init = InitCall {
        target: fixture.counter,
        calldata: call(counter::INIT_REENTRANT, &5u64),
    };

    let err = fixture
        .diamond
        .cut(ADMIN, vec![FacetCut::add(fixture.counter, CounterFacet.operations())], Some(init))
        .unwrap_err();
    assert!(matches!(err, RuntimeError::PhaseAlreadyReached { .. }));

    assert!(fixture.diamond.routing_table().unwrap().is_empty());
    assert_eq!(fixture.diamond.logs().len(), logs_before);
    assert_eq!(
        fixture
            .diamond
            .storage()
            .phase(Namespace::derive(counter::NAMESPACE_ID)),
        0
    );
}

// =============================================================================
// 3. ATOMICITY
// =============================================================================

#[test]
fn test_cut_with_one_bad_record_applies_nothing() {
    let mut fixture = Fixture::new();
    let records = vec![
        FacetCut::add(fixture.ownership, OwnershipFacet::new().operations()),
        FacetCut::add(fixture.counter, vec![op(ownership::signatures::OWNER)]),
    ];

    let err = fixture.diamond.cut(ADMIN, records, None).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::OperationAlreadyMapped {
            operation: op(ownership::signatures::OWNER),
            module: fixture.ownership,
        }
    );
    assert!(fixture.diamond.routing_table().unwrap().is_empty());
    assert!(!fixture
        .diamond
        .events()
        .any(|event| matches!(event, RuntimeEvent::DiamondCut { .. })));
}

#[test]
fn test_failing_init_rolls_back_routing() {
    let mut fixture = Fixture::new();
    let init = InitCall {
        target: fixture.counter,
        calldata: call(counter::INCREMENT_THEN_FAIL, &()),
    };

    let err = fixture
        .diamond
        .cut(ADMIN, vec![FacetCut::add(fixture.counter, CounterFacet.operations())], Some(init))
        .unwrap_err();
    assert_eq!(err, RuntimeError::revert("boom"));
    assert!(fixture.diamond.routing_table().unwrap().is_empty());
}

#[test]
fn test_undeployed_init_target_rejected() {
    let mut fixture = Fixture::new();
    let ghost = Address([0x99; 20]);
    let init = InitCall {
        target: ghost,
        calldata: call(counter::INIT, &0u64),
    };
    let err = fixture
        .diamond
        .cut(ADMIN, vec![FacetCut::add(fixture.counter, vec![op(counter::COUNT)])], Some(init))
        .unwrap_err();
    assert_eq!(err, RuntimeError::ModuleNotDeployed(ghost));
    assert!(fixture.diamond.routing_table().unwrap().is_empty());
}

#[test]
fn test_failed_call_commits_nothing() {
    let mut fixture = Fixture::composed();
    let logs_before = fixture.diamond.logs().len();
    let storage_before = fixture.diamond.storage().clone();

    let err = fixture
        .diamond
        .call(ALICE, call(counter::INCREMENT_THEN_FAIL, &()).as_slice())
        .unwrap_err();
    assert_eq!(err, RuntimeError::Revert(Bytes::from_slice(b"boom")));

    assert_eq!(fixture.count(), 0);
    assert_eq!(fixture.diamond.logs().len(), logs_before);
    assert_eq!(fixture.diamond.storage(), &storage_before);
}

#[test]
fn test_caught_nested_failure_leaves_no_partial_state() {
    let mut fixture = Fixture::composed();
    let out = fixture
        .diamond
        .call(ALICE, call(counter::TRY_NESTED, &()).as_slice())
        .unwrap();
    assert_eq!(decode_return::<u64>(out.as_slice()).unwrap(), 0);
    assert_eq!(fixture.count(), 0);
}

#[test]
fn test_view_never_commits() {
    let fixture = Fixture::composed();
    let storage_before = fixture.diamond.storage().clone();

    fixture
        .diamond
        .view(ALICE, call(counter::INCREMENT, &()).as_slice())
        .unwrap();
    assert_eq!(fixture.diamond.storage(), &storage_before);
    assert_eq!(fixture.count(), 0);
}

// =============================================================================
// 4. RESOURCE LIMITS
// =============================================================================

#[test]
fn test_unbounded_reentrancy_hits_depth_limit() {
    let mut fixture = Fixture::with_config(RuntimeConfig { max_call_depth: 8 });
    fixture.compose_all();

    let err = fixture
        .diamond
        .call(ALICE, call(counter::RECURSE, &()).as_slice())
        .unwrap_err();
    assert_eq!(err, RuntimeError::CallDepthExceeded { depth: 9, max: 8 });
}

#[test]
fn test_default_depth_limit_fails_cleanly() {
    let mut fixture = Fixture::composed();
    let max = RuntimeConfig::default().max_call_depth;

    let err = fixture
        .diamond
        .call(ALICE, call(counter::RECURSE, &()).as_slice())
        .unwrap_err();
    assert_eq!(err, RuntimeError::CallDepthExceeded { depth: max + 1, max });
}

#[test]
fn test_raised_depth_limit_on_large_stack() {
    let handle = std::thread::Builder::new()
        .name("deep-calls".into())
        .stack_size(256 * 1024 * 1024)
        .spawn(|| {
            let mut fixture = Fixture::with_config(RuntimeConfig {
                max_call_depth: 1024,
            });
            fixture.compose_all();
            fixture
                .diamond
                .call(ALICE, call(counter::RECURSE, &()).as_slice())
                .unwrap_err()
        })
        .unwrap();

    let err = handle.join().unwrap();
    assert_eq!(
        err,
        RuntimeError::CallDepthExceeded {
            depth: 1025,
            max: 1024
        }
    );
}

#[test]
fn test_malformed_calldata() {
    let mut fixture = Fixture::composed();

    let err = fixture.diamond.call(ALICE, &[]).unwrap_err();
    assert_eq!(err, RuntimeError::MalformedCalldata { len: 0 });

    // valid operation id, truncated arguments
    let mut truncated = op(access_control::signatures::HAS_ROLE).as_bytes().to_vec();
    truncated.extend_from_slice(&[0u8; 5]);
    let err = fixture.diamond.call(ALICE, &truncated).unwrap_err();
    assert_eq!(err.reason_code(), "Decode");
}

#[test]
fn test_unknown_operation_is_distinguishable() {
    let mut fixture = Fixture::composed();
    let err = fixture
        .diamond
        .call(ADMIN, call("selfDestruct()", &()).as_slice())
        .unwrap_err();
    assert!(err.is_integrity_failure());
    assert!(!err.is_authorization_failure());
    assert_eq!(err.reason_code(), "UnknownOperation");
}

// =============================================================================
// 5. INVARIANT VIOLATIONS
// =============================================================================

#[test]
fn test_invariant_check_detects_vanished_code() {
    let fixture = Fixture::composed();
    assert!(fixture.diamond.check_invariants().unwrap().is_valid());

    assert!(fixture.host.destroy(fixture.counter));
    match fixture.diamond.check_invariants().unwrap() {
        InvariantCheckResult::Invalid(violations) => {
            assert_eq!(violations.len(), counter::ALL.len());
            assert!(violations.iter().all(|v| matches!(
                v,
                InvariantViolation::DanglingRoute { module, .. } if *module == fixture.counter
            )));
        }
        InvariantCheckResult::Valid => panic!("expected dangling routes"),
    }
}

#[test]
fn test_native_operations_cannot_be_hijacked() {
    let mut fixture = Fixture::new();
    for native in NativeOperation::ALL {
        let err = fixture
            .diamond
            .cut(ADMIN, vec![FacetCut::add(fixture.counter, vec![native.id()])], None)
            .unwrap_err();
        assert_eq!(
            err,
            RuntimeError::OperationAlreadyMapped {
                operation: native.id(),
                module: RUNTIME,
            }
        );
    }

    let out = fixture
        .diamond
        .view(MALLORY, call(signatures::IS_TRUSTED_FORWARDER, &RELAY).as_slice())
        .unwrap();
    assert!(decode_return::<bool>(out.as_slice()).unwrap());
}
