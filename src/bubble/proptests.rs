//! Property-based tests for bubble timing and interruption

use super::testing::test_queue;
use super::timing::schedule;
use super::{BubbleQueue, BubbleRequest, BubbleRole};
use crate::config::BubbleOptions;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn arb_role() -> impl Strategy<Value = BubbleRole> {
    prop_oneof![
        Just(BubbleRole::Statement),
        Just(BubbleRole::Choices),
        Just(BubbleRole::Freeform),
        Just(BubbleRole::Pick),
    ]
}

/// Gaps between presents, avoiding a tie with the 800ms deadline
fn arb_gap() -> impl Strategy<Value = u64> {
    (0u64..1600).prop_filter("tie with deadline", |gap| *gap != 800)
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn prop_roles_never_extend(chars in 0usize..5000, role in arb_role()) {
        let options = BubbleOptions::default();
        let plan = schedule(chars, role, true, &options);
        if role.is_statement() {
            prop_assert!(plan.deadline >= options.animation_time * 4);
        } else {
            prop_assert!(!plan.is_typing_extended());
            prop_assert_eq!(plan.deadline, options.animation_time * 4);
        }
    }

    #[test]
    fn prop_extended_wait_is_floored(chars in 0usize..5000) {
        let options = BubbleOptions::default();
        let plan = schedule(chars, BubbleRole::Statement, true, &options);
        if plan.is_typing_extended() {
            prop_assert!(plan.deadline >= options.animation_time * 8);
            prop_assert!(plan.typing_on < plan.typing_off);
        }
    }

    #[test]
    fn prop_replay_never_waits(chars in 0usize..5000, role in arb_role()) {
        let plan = schedule(chars, role, false, &BubbleOptions::default());
        prop_assert_eq!(plan.deadline, Duration::ZERO);
        prop_assert_eq!(plan.typing_on, None);
        prop_assert_eq!(plan.typing_off, None);
    }

    /// Finalized bubbles = presented bubbles minus those superseded before
    /// their deadline; superseded ones never post or persist.
    #[test]
    fn prop_superseded_bubbles_never_post(gaps in proptest::collection::vec(arb_gap(), 1..12)) {
        let runtime = paused_runtime();
        runtime.block_on(async {
            let (queue, surface, history): (Arc<BubbleQueue>, _, _) = test_queue(100);
            let posted = Arc::new(AtomicUsize::new(0));
            // Every payload here has an 800ms deadline
            let deadline = 800;

            let mut expected = 0;
            for (i, gap) in gaps.iter().enumerate() {
                let counter = posted.clone();
                queue.present(
                    BubbleRequest::live(format!("msg {i}"), BubbleRole::Statement)
                        .on_posted(move || { counter.fetch_add(1, Ordering::SeqCst); }),
                );
                let is_last = i + 1 == gaps.len();
                if is_last || *gap > deadline {
                    expected += 1;
                }
                if !is_last {
                    tokio::time::sleep(Duration::from_millis(*gap)).await;
                }
            }
            tokio::time::sleep(Duration::from_millis(deadline + 1)).await;

            assert_eq!(surface.finalized().len(), expected);
            assert_eq!(posted.load(Ordering::SeqCst), expected);
            assert_eq!(history.snapshot().len(), expected);
        });
    }
}
