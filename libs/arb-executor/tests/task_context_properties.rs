//! Property-based tests for `TaskContext`'s fill-reconciliation bookkeeping.
//!
//! Generalizes the targeted unit tests in `task_executor::context` (chain
//! event dedup, REST monotonicity, at-most-once hedge deltas) to arbitrary
//! interleavings and sequences.

mod common;

use arb_executor::application::task_executor::TaskContext;
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

fn ctx() -> TaskContext {
    TaskContext::new(CancellationToken::new())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// `merged_filled_qty` never decreases across an arbitrary interleaving
    /// of chain-fill deltas and REST cumulative polls.
    #[test]
    fn merged_filled_qty_is_monotone(
        deltas in prop::collection::vec(0.0..50.0f64, 0..20),
        rest_polls in prop::collection::vec(0.0..1000.0f64, 0..10),
        picks in prop::collection::vec(any::<bool>(), 0..40),
    ) {
        let mut c = ctx();
        let mut last = 0.0f64;
        let mut log_index = 0u64;
        let mut di = 0usize;
        let mut ri = 0usize;

        for pick_chain in &picks {
            if di >= deltas.len() && ri >= rest_polls.len() {
                break;
            }
            let use_chain = (*pick_chain && di < deltas.len()) || ri >= rest_polls.len();
            if use_chain {
                c.record_chain_event(1, log_index, deltas[di]);
                log_index += 1;
                di += 1;
            } else {
                c.record_rest_poll(rest_polls[ri]);
                ri += 1;
            }
            let merged = c.merged_filled_qty(f64::MAX);
            prop_assert!(merged + 1e-9 >= last, "merged_filled_qty decreased: {} -> {}", last, merged);
            last = merged;
        }
    }

    /// Each `(txHash, logIndex)` pair contributes to the merged counter at
    /// most once, regardless of how many times it is replayed.
    #[test]
    fn chain_event_dedup_is_at_most_once(
        events in prop::collection::vec((0u64..5, 0u64..5, 1.0..10.0f64), 1..40),
    ) {
        let mut c = ctx();
        let mut seen = std::collections::HashSet::new();
        let mut expected_total = 0.0f64;
        for (tx, idx, delta) in &events {
            let applied = c.record_chain_event(*tx, *idx, *delta);
            let first_time = seen.insert((*tx, *idx));
            prop_assert_eq!(applied, first_time);
            if applied {
                expected_total += *delta;
            }
        }
        prop_assert!((c.merged_filled_qty(f64::MAX) - expected_total).abs() < 1e-6);
    }

    /// For a monotone non-decreasing sequence of reported cumulative fills
    /// (the realistic late-confirmation case), the sum of applied deltas
    /// equals the final confirmed value exactly once each.
    #[test]
    fn apply_poly_fill_delta_sums_to_final_confirmed_value(
        increments in prop::collection::vec(0.0..100.0f64, 1..20),
    ) {
        let mut c = ctx();
        let mut cumulative = 0.0f64;
        let mut total_applied = 0.0f64;
        for (now, inc) in increments.iter().enumerate() {
            cumulative += *inc;
            let delta = c.apply_poly_fill_delta("order-1", cumulative, 0.5, now as i64);
            prop_assert!(delta >= 0.0);
            total_applied += delta;
        }
        prop_assert!((total_applied - cumulative).abs() < 1e-6);
    }

    /// For an arbitrary (not necessarily monotone) sequence of reports —
    /// covering stale/out-of-order confirmations — every applied delta is
    /// still non-negative and the total never exceeds the highest value
    /// ever reported.
    #[test]
    fn apply_poly_fill_delta_never_applies_negative_deltas(
        reports in prop::collection::vec(0.0..500.0f64, 1..30),
    ) {
        let mut c = ctx();
        let mut total_applied = 0.0f64;
        let mut running_max = 0.0f64;
        for (now, filled) in reports.iter().enumerate() {
            let delta = c.apply_poly_fill_delta("order-1", *filled, 0.5, now as i64);
            prop_assert!(delta >= 0.0);
            total_applied += delta;
            running_max = running_max.max(*filled);
        }
        prop_assert!((total_applied - running_max).abs() < 1e-6);
    }
}
