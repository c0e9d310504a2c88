// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use std::collections::BTreeSet;
use yare::parameterized;

#[parameterized(
    lower_seqnum_wins = { (1, 9), (2, 1), true },
    higher_seqnum_loses = { (3, 1), (2, 9), false },
    tie_broken_by_lower_node = { (1, 2), (1, 3), true },
    tie_lost_by_higher_node = { (1, 3), (1, 2), false },
    identical_does_not_precede = { (4, 4), (4, 4), false },
)]
fn precedes_follows_seqnum_then_node(a: (u64, u32), b: (u64, u32), expected: bool) {
    let a = Request::new(a.0, a.1);
    let b = Request::new(b.0, b.1);
    assert_eq!(a.precedes(&b), expected);
}

#[test]
fn equality_is_structural() {
    assert_eq!(Request::new(5, 2), Request::new(5, 2));
    assert_ne!(Request::new(5, 2), Request::new(5, 3));
    assert_ne!(Request::new(5, 2), Request::new(6, 2));
}

#[test]
fn ordered_set_yields_highest_priority_first() {
    let set: BTreeSet<Request> = [
        Request::new(2, 1),
        Request::new(1, 3),
        Request::new(1, 2),
        Request::new(7, 0),
    ]
    .into_iter()
    .collect();

    let order: Vec<_> = set.into_iter().collect();
    assert_eq!(
        order,
        vec![
            Request::new(1, 2),
            Request::new(1, 3),
            Request::new(2, 1),
            Request::new(7, 0),
        ]
    );
}

#[test]
fn serializes_with_wire_field_names() {
    let json = serde_json::to_value(Request::new(3, 4)).unwrap();
    assert_eq!(json, serde_json::json!({ "seqnum": 3, "nodeId": 4 }));
}

#[test]
fn display_names_both_fields() {
    assert_eq!(Request::new(5, 2).to_string(), "(seq: 5, node: 2)");
}

proptest! {
    #[test]
    fn order_matches_lexicographic_pair(
        a_seq in 0u64..50, a_node in 0u32..10,
        b_seq in 0u64..50, b_node in 0u32..10,
    ) {
        let a = Request::new(a_seq, a_node);
        let b = Request::new(b_seq, b_node);
        prop_assert_eq!(a < b, (a_seq, a_node) < (b_seq, b_node));
        prop_assert_eq!(a == b, (a_seq, a_node) == (b_seq, b_node));
    }

    #[test]
    fn exactly_one_of_two_distinct_requests_precedes(
        a_seq in 0u64..50, a_node in 0u32..10,
        b_seq in 0u64..50, b_node in 0u32..10,
    ) {
        let a = Request::new(a_seq, a_node);
        let b = Request::new(b_seq, b_node);
        prop_assume!(a != b);
        prop_assert!(a.precedes(&b) ^ b.precedes(&a));
    }
}
