//! End-to-end transfer tests
//!
//! Runs complete sender/receiver pairs over the in-memory fault-injection
//! harness and checks delivery and retransmission behavior under loss,
//! duplication, and reordering.

use arq_tests::{run_sliding_transfer, run_stop_wait_transfer, FaultPlan};

/// Long enough that no timeout fires on an in-memory transfer.
const QUIET_TIMEOUT_US: u64 = 1_000_000;

/// Short enough that loss tests recover quickly.
const LOSSY_TIMEOUT_US: u64 = 2_000;

fn in_order(count: u64) -> Vec<u64> {
    (0..count).collect()
}

#[test]
fn sliding_clean_run_has_no_retransmissions() {
    let (retrans, delivered) =
        run_sliding_transfer(4, 10, QUIET_TIMEOUT_US, FaultPlan::clean(), FaultPlan::clean());
    assert_eq!(retrans, 0);
    assert_eq!(delivered, in_order(10));
}

#[test]
fn stop_wait_clean_run_has_no_retransmissions() {
    let (retrans, delivered) =
        run_stop_wait_transfer(8, QUIET_TIMEOUT_US, FaultPlan::clean(), FaultPlan::clean());
    assert_eq!(retrans, 0);
    assert_eq!(delivered, in_order(8));
}

#[test]
fn sliding_recovers_from_dropped_frame() {
    let (retrans, delivered) = run_sliding_transfer(
        3,
        6,
        LOSSY_TIMEOUT_US,
        FaultPlan::clean().drop_nth(2),
        FaultPlan::clean(),
    );
    assert!(retrans >= 1);
    assert_eq!(delivered, in_order(6));
}

#[test]
fn sliding_dropped_acks_trigger_whole_window_retransmit() {
    // The first two cumulative acks vanish, so the sender stalls on a
    // full window until the timeout fires and every outstanding frame
    // goes out again. The duplicates provoke fresh acks that get through.
    let (retrans, delivered) = run_sliding_transfer(
        2,
        3,
        LOSSY_TIMEOUT_US,
        FaultPlan::clean(),
        FaultPlan::clean().drop_nth(0).drop_nth(1),
    );
    assert!(retrans >= 2);
    assert_eq!(delivered, in_order(3));
}

#[test]
fn sliding_reordered_frames_deliver_in_order() {
    // Frame 1 arrives after frame 2; the receive window buffers frame 2
    // and releases both cumulatively when the gap fills.
    let (retrans, delivered) = run_sliding_transfer(
        3,
        4,
        QUIET_TIMEOUT_US,
        FaultPlan::clean().delay_nth(1),
        FaultPlan::clean(),
    );
    assert_eq!(retrans, 0);
    assert_eq!(delivered, in_order(4));
}

#[test]
fn sliding_sequence_numbers_wrap_across_long_run() {
    // Window 2 gives a sequence range of 5, so 12 messages wrap the ring
    // twice.
    let (retrans, delivered) =
        run_sliding_transfer(2, 12, QUIET_TIMEOUT_US, FaultPlan::clean(), FaultPlan::clean());
    assert_eq!(retrans, 0);
    assert_eq!(delivered, in_order(12));
}

#[test]
fn stop_wait_recovers_from_dropped_frame() {
    let (retrans, delivered) = run_stop_wait_transfer(
        3,
        LOSSY_TIMEOUT_US,
        FaultPlan::clean().drop_nth(0),
        FaultPlan::clean(),
    );
    assert!(retrans >= 1);
    assert_eq!(delivered, in_order(3));
}

#[test]
fn stop_wait_dropped_ack_causes_resend_not_redelivery() {
    let (retrans, delivered) = run_stop_wait_transfer(
        3,
        LOSSY_TIMEOUT_US,
        FaultPlan::clean(),
        FaultPlan::clean().drop_nth(0),
    );
    assert!(retrans >= 1);
    assert_eq!(delivered, in_order(3));
}

#[test]
fn stop_wait_duplicated_frame_counts_one_stale_ack() {
    // The duplicate of frame 0 produces a second ack with the old bit.
    // The sender sees it while waiting for message 1 and counts it.
    let (retrans, delivered) = run_stop_wait_transfer(
        3,
        QUIET_TIMEOUT_US,
        FaultPlan::clean().duplicate_nth(0),
        FaultPlan::clean(),
    );
    assert_eq!(retrans, 1);
    assert_eq!(delivered, in_order(3));
}
