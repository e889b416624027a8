//! Property-based tests for choice ordering

use super::*;
use crate::bubble::markup;
use proptest::prelude::*;
use std::time::Duration;

fn arb_choices() -> impl Strategy<Value = Vec<Choice>> {
    proptest::collection::vec(
        ("[A-Za-z]{1,8}", "[a-z]{1,8}").prop_map(|(q, a)| Choice::new(q, a)),
        0..10,
    )
}

proptest! {
    #[test]
    fn prop_display_order_is_reverse(choices in arb_choices()) {
        let turn = Turn::statement("pick").with_choices(choices.clone());
        let mut expected = choices;
        expected.reverse();
        prop_assert_eq!(turn.displayed_choices(), expected);
    }

    #[test]
    fn prop_buttons_follow_display_order(choices in arb_choices()) {
        let turn = Turn::statement("pick").with_choices(choices);
        let displayed = turn.displayed_choices();
        let html = markup::choice_buttons(&displayed, Duration::from_millis(200));

        let segments: Vec<&str> = html.split("</span>").filter(|s| !s.is_empty()).collect();
        prop_assert_eq!(segments.len(), displayed.len());
        for (segment, choice) in segments.iter().zip(&displayed) {
            let expected = format!(">{}", choice.question);
            prop_assert!(segment.ends_with(&expected));
        }
    }
}
