//! Property-based tests for the interaction log

use super::*;
use crate::bubble::{markup, BubbleRole};
use proptest::prelude::*;
use std::sync::Arc;

fn arb_role() -> impl Strategy<Value = BubbleRole> {
    prop_oneof![
        Just(BubbleRole::Statement),
        Just(BubbleRole::Choices),
        Just(BubbleRole::Freeform),
        Just(BubbleRole::Pick),
    ]
}

fn arb_say() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,30}",
        "[a-zA-Z ]{1,10}".prop_map(|q| format!("<span class=\"bubble-button\">{q}</span>")),
        "[a-zA-Z ]{1,10}".prop_map(|q| markup::echo_markup(&q)),
    ]
}

fn arb_records() -> impl Strategy<Value = Vec<(String, BubbleRole)>> {
    proptest::collection::vec((arb_say(), arb_role()), 0..60)
}

proptest! {
    #[test]
    fn prop_never_exceeds_capacity_plus_one(capacity in 1usize..10, records in arb_records()) {
        let history = HistoryStore::open(Arc::new(MemoryStorage::new()), capacity);
        for (say, role) in &records {
            history.record(say, *role);
            prop_assert!(history.snapshot().len() <= capacity + 1);
        }
    }

    #[test]
    fn prop_offered_menus_never_remembered(records in arb_records()) {
        let history = HistoryStore::open(Arc::new(MemoryStorage::new()), 100);
        for (say, role) in &records {
            history.record(say, *role);
        }
        for entry in history.snapshot() {
            if markup::contains_button(&entry.say) {
                prop_assert!(matches!(entry.reply, BubbleRole::Freeform | BubbleRole::Pick));
            }
        }
    }

    #[test]
    fn prop_commit_load_round_trip(records in arb_records()) {
        let storage = Arc::new(MemoryStorage::new());
        let history = HistoryStore::open(storage.clone(), 20);
        for (say, role) in &records {
            history.record(say, *role);
        }
        history.commit().unwrap();

        let reopened = HistoryStore::open(storage, 20);
        prop_assert_eq!(reopened.snapshot(), history.snapshot());
    }

    #[test]
    fn prop_keeps_most_recent_in_order(capacity in 1usize..8, count in 0usize..40) {
        let history = HistoryStore::open(Arc::new(MemoryStorage::new()), capacity);
        for i in 0..count {
            history.record(&format!("say {i}"), BubbleRole::Statement);
        }
        let kept = count.min(capacity + 1);
        let expected: Vec<String> = (count - kept..count).map(|i| format!("say {i}")).collect();
        let says: Vec<String> = history.snapshot().into_iter().map(|e| e.say).collect();
        prop_assert_eq!(says, expected);
    }
}
