//! Configuration failures abort with zero routines invoked, and the
//! registry stays usable after a rejected registration.

use std::sync::atomic::{AtomicUsize, Ordering};

use callcheck_abi::{RoutineBinding, RoutineTable};
use callcheck_core::{ArgValue, Registry, RegistryError, RetType, TestCase, Value};
use callcheck_harness::{FixtureError, FixtureSet, HarnessError, Runner};
use callcheck_routines::{corpus_cases, routine_table};

#[test]
fn duplicate_registration_is_rejected_but_the_registry_survives() {
    let mut registry = Registry::new();
    registry.register_all(corpus_cases()).unwrap();

    let err = registry.register_all(corpus_cases()).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateName { .. }));
    assert_eq!(registry.len(), 6);

    let summary = Runner::new("dup-contract")
        .run(&registry, &routine_table())
        .unwrap();
    assert!(summary.all_passed());
}

#[test]
fn unknown_symbol_aborts_with_zero_invocations() {
    static SENTINEL_CALLS: AtomicUsize = AtomicUsize::new(0);
    extern "C-unwind" fn sentinel(a: i64) -> i64 {
        SENTINEL_CALLS.fetch_add(1, Ordering::SeqCst);
        a
    }

    let mut table = RoutineTable::new();
    table.bind("sentinel", RoutineBinding::Int1(sentinel));

    let mut registry = Registry::new();
    registry
        .register(
            TestCase::new("would_pass", "sentinel", vec![ArgValue::I64(7)], RetType::I64)
                .with_expected_ret(Value::I64(7)),
        )
        .unwrap();
    registry
        .register(TestCase::new(
            "never_bound",
            "symbol_from_the_future",
            vec![ArgValue::I64(1)],
            RetType::I64,
        ))
        .unwrap();

    let err = Runner::new("unknown-symbol").run(&registry, &table).unwrap_err();
    match err {
        HarnessError::Registry(RegistryError::UnknownSymbol { case, symbol }) => {
            assert_eq!(case, "never_bound");
            assert_eq!(symbol, "symbol_from_the_future");
        }
        other => panic!("wrong error: {other}"),
    }
    assert_eq!(SENTINEL_CALLS.load(Ordering::SeqCst), 0);
}

#[test]
fn signature_mismatch_aborts_before_any_call() {
    static SHAPE_CALLS: AtomicUsize = AtomicUsize::new(0);
    extern "C-unwind" fn shaped(a: i64) -> i64 {
        SHAPE_CALLS.fetch_add(1, Ordering::SeqCst);
        a
    }

    let mut table = RoutineTable::new();
    table.bind("shaped", RoutineBinding::Int1(shaped));

    let mut registry = Registry::new();
    registry
        .register(TestCase::new(
            "wrong_arity",
            "shaped",
            vec![ArgValue::I64(1), ArgValue::I64(2)],
            RetType::I64,
        ))
        .unwrap();
    registry
        .register(TestCase::new("right_arity", "shaped", vec![ArgValue::I64(1)], RetType::I64))
        .unwrap();

    let err = Runner::new("shape-contract").run(&registry, &table).unwrap_err();
    assert!(err.to_string().contains("bound as int1"));
    assert_eq!(SHAPE_CALLS.load(Ordering::SeqCst), 0);
}

#[test]
fn unsupported_fixture_type_never_reaches_the_runner() {
    let text = r#"{
        "version": 1,
        "suite": "from-the-future",
        "cases": [{
            "name": "vector_case",
            "symbol": "add_2_ints",
            "ret": "i64",
            "args": [{"type": "f32x4", "value": [1.0, 2.0, 3.0, 4.0]}]
        }]
    }"#;
    let err = FixtureSet::from_json(text).unwrap_err();
    match err {
        FixtureError::Registry(RegistryError::UnsupportedType { case, type_name }) => {
            assert_eq!(case, "vector_case");
            assert_eq!(type_name, "f32x4");
        }
        other => panic!("wrong error: {other}"),
    }
}

#[test]
fn fixture_cases_merge_with_the_builtin_corpus() {
    let text = r#"{
        "version": 1,
        "suite": "extras",
        "cases": [{
            "name": "inc_the_answer",
            "symbol": "simple_inc",
            "ret": "i64",
            "args": [{"type": "i64", "value": 41}],
            "expect": {"ret": 42}
        }]
    }"#;
    let extras = FixtureSet::from_json(text).unwrap();

    let mut registry = Registry::new();
    registry.register_all(corpus_cases()).unwrap();
    registry.register_all(extras.into_cases()).unwrap();
    assert_eq!(registry.len(), 7);

    let summary = Runner::new("merged")
        .run(&registry, &routine_table())
        .unwrap();
    assert_eq!(summary.total, 7);
    assert!(summary.all_passed());
}
