//! End-to-end runs of the stock corpus against the stock symbol table.

use callcheck_core::Registry;
use callcheck_harness::Runner;
use callcheck_routines::{corpus_cases, journal, routine_table};

fn corpus_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_all(corpus_cases()).unwrap();
    registry
}

#[test]
fn stock_corpus_passes_end_to_end() {
    let registry = corpus_registry();
    let summary = Runner::new("corpus-e2e")
        .run(&registry, &routine_table())
        .unwrap();
    assert_eq!(summary.total, 6);
    assert!(
        summary.all_passed(),
        "unexpected failures: {:?}",
        summary.failing().collect::<Vec<_>>()
    );
}

#[test]
fn verdicts_come_back_in_registration_order() {
    let registry = corpus_registry();
    let summary = Runner::new("corpus-order")
        .run(&registry, &routine_table())
        .unwrap();
    let expected: Vec<_> = corpus_cases().iter().map(|c| c.name.clone()).collect();
    let actual: Vec<_> = summary.verdicts.iter().map(|v| v.case_name.clone()).collect();
    assert_eq!(actual, expected);
}

#[test]
fn console_output_lists_every_case_then_the_tally() {
    let registry = corpus_registry();
    let summary = Runner::new("corpus-console")
        .run(&registry, &routine_table())
        .unwrap();
    let lines: Vec<_> = summary.render_console().lines().map(str::to_owned).collect();
    assert_eq!(
        lines,
        [
            "PASS add_2_ints_small",
            "PASS simple_inc_forwarded",
            "PASS sum_eight_args",
            "PASS swap_chars_pair",
            "PASS reverse_five_bytes",
            "PASS sum_internal_table",
            "6/6 passed",
        ]
    );
}

#[test]
fn corpus_symbols_show_up_in_the_call_journal() {
    let registry = corpus_registry();
    Runner::new("corpus-journal")
        .run(&registry, &routine_table())
        .unwrap();
    for symbol in [
        "add_2_ints",
        "simple_inc_test",
        "sum_lots_of_args",
        "swap_chars",
        "reverse_char_array",
        "sum_internal_ar",
    ] {
        assert!(
            journal().count_of(symbol) >= 1,
            "{symbol} never recorded a call"
        );
    }
    // The forwarder reaches simple_inc internally.
    assert!(journal().count_of("simple_inc") >= 1);
}

#[test]
fn repeated_runs_stay_green() {
    let registry = corpus_registry();
    let table = routine_table();
    let runner = Runner::new("corpus-repeat");
    let first = runner.run(&registry, &table).unwrap();
    let second = runner.run(&registry, &table).unwrap();
    assert!(first.all_passed());
    assert!(second.all_passed());
    assert_eq!(first.total, second.total);
}

#[test]
fn corpus_fingerprint_is_reproducible() {
    assert_eq!(corpus_registry().fingerprint(), corpus_registry().fingerprint());
}
