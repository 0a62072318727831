//! Property-based delivery tests
//!
//! Random fault plans against complete transfers: whatever happens to
//! individual datagrams within the scripted bounds, every message must
//! come out exactly once and in order.
//!
//! Faults on the ack direction are confined to early indices. A receiver
//! only repairs a lost acknowledgment while it is still running, so a
//! fault landing on the very last ack of the run has no retransmission
//! left to repair it.

use arq_tests::{run_sliding_transfer, run_stop_wait_transfer, FaultPlan};
use proptest::prelude::*;
use std::collections::BTreeSet;

const COUNT: u64 = 8;
const TIMEOUT_US: u64 = 2_000;

fn plan_from(drop: &BTreeSet<u64>, duplicate: &BTreeSet<u64>, delay: &BTreeSet<u64>) -> FaultPlan {
    let mut plan = FaultPlan::clean();
    for &i in drop {
        plan = plan.drop_nth(i);
    }
    for &i in duplicate {
        plan = plan.duplicate_nth(i);
    }
    for &i in delay {
        plan = plan.delay_nth(i);
    }
    plan
}

fn indices(bound: u64) -> impl Strategy<Value = BTreeSet<u64>> {
    prop::collection::btree_set(0..bound, 0..4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sliding_delivers_in_order_under_faults(
        drop in indices(10),
        duplicate in indices(10),
        delay in indices(10),
        ack_drop in indices(5),
        ack_duplicate in indices(5),
        window_size in 1u32..5,
    ) {
        let forward = plan_from(&drop, &duplicate, &delay);
        let reverse = plan_from(&ack_drop, &ack_duplicate, &BTreeSet::new());

        let (_retrans, delivered) =
            run_sliding_transfer(window_size, COUNT, TIMEOUT_US, forward, reverse);
        prop_assert_eq!(delivered, (0..COUNT).collect::<Vec<_>>());
    }

    #[test]
    fn stop_wait_delivers_in_order_under_faults(
        drop in indices(10),
        duplicate in indices(10),
        delay in indices(10),
        ack_drop in indices(5),
        ack_duplicate in indices(5),
    ) {
        let forward = plan_from(&drop, &duplicate, &delay);
        let reverse = plan_from(&ack_drop, &ack_duplicate, &BTreeSet::new());

        let (_retrans, delivered) =
            run_stop_wait_transfer(COUNT, TIMEOUT_US, forward, reverse);
        prop_assert_eq!(delivered, (0..COUNT).collect::<Vec<_>>());
    }

    #[test]
    fn clean_channel_never_retransmits(
        window_size in 1u32..6,
        count in 1u64..20,
    ) {
        let (retrans, delivered) = run_sliding_transfer(
            window_size,
            count,
            1_000_000,
            FaultPlan::clean(),
            FaultPlan::clean(),
        );
        prop_assert_eq!(retrans, 0);
        prop_assert_eq!(delivered.len() as u64, count);
    }
}
