// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::message::Message;
use proptest::prelude::*;
use yare::parameterized;

fn coordinator(id: u32) -> NodeState {
    NodeState::new(NodeId(id), [NodeId(id)])
}

fn sent(effects: &[Effect]) -> Vec<(MessageKind, u32)> {
    effects
        .iter()
        .filter_map(Effect::message)
        .map(|m| (m.kind, m.to.get()))
        .collect()
}

fn only_message(effects: &[Effect]) -> &Message {
    match effects {
        [Effect::Send(msg)] => msg,
        other => panic!("expected a single send, got {:?}", other),
    }
}

#[test]
fn unlocked_coordinator_grants_immediately() {
    let mut node = coordinator(1);
    let effects = node.on_request(Request::new(1, 2));

    let msg = only_message(&effects);
    assert_eq!(msg.kind, MessageKind::Locked);
    assert_eq!(msg.from, NodeId(1));
    assert_eq!(msg.to, NodeId(2));
    assert_eq!(msg.request, Some(Request::new(1, 2)));
    assert_eq!(node.coordinator().held_by(), Some(Request::new(1, 2)));
    assert_eq!(node.coordinator().queue_len(), 0);
}

#[test]
fn request_advances_clock_past_seqnum() {
    let mut node = coordinator(1);
    node.on_request(Request::new(7, 2));
    assert_eq!(node.clock(), 8);
}

#[test]
fn lower_priority_request_is_queued_and_failed() {
    let mut node = coordinator(1);
    node.on_request(Request::new(1, 2));

    let effects = node.on_request(Request::new(1, 3));

    assert_eq!(sent(&effects), vec![(MessageKind::Failed, 3)]);
    assert_eq!(node.coordinator().held_by(), Some(Request::new(1, 2)));
    assert_eq!(
        node.coordinator().waiting().copied().collect::<Vec<_>>(),
        vec![Request::new(1, 3)]
    );
}

#[test]
fn higher_priority_request_inquires_holder_once_and_fails_newcomer_once() {
    let mut node = coordinator(1);
    node.on_request(Request::new(5, 4));

    let effects = node.on_request(Request::new(2, 3));

    assert_eq!(
        sent(&effects),
        vec![(MessageKind::Inquire, 4), (MessageKind::Failed, 3)]
    );
    let inquire = effects[0].message().unwrap();
    assert_eq!(inquire.request, Some(Request::new(5, 4)));
    assert_eq!(node.coordinator().held_by(), Some(Request::new(5, 4)));
}

#[test]
fn higher_priority_request_behind_queue_head_does_not_inquire() {
    let mut node = coordinator(1);
    node.on_request(Request::new(5, 4));
    node.on_request(Request::new(2, 3));

    let effects = node.on_request(Request::new(3, 2));

    assert_eq!(sent(&effects), vec![(MessageKind::Failed, 2)]);
    assert_eq!(node.coordinator().queue_len(), 2);
}

#[test]
fn relinquish_requeues_holder_and_grants_minimum() {
    let mut node = coordinator(1);
    node.on_request(Request::new(5, 4));
    node.on_request(Request::new(2, 3));
    node.on_request(Request::new(3, 2));

    let effects = node.on_relinquish(NodeId(4), None);

    let msg = only_message(&effects);
    assert_eq!((msg.kind, msg.to), (MessageKind::Locked, NodeId(3)));
    assert_eq!(node.coordinator().held_by(), Some(Request::new(2, 3)));
    assert_eq!(
        node.coordinator().waiting().copied().collect::<Vec<_>>(),
        vec![Request::new(3, 2), Request::new(5, 4)]
    );
}

#[test]
fn relinquished_holder_is_regranted_when_it_is_still_the_minimum() {
    let mut node = coordinator(1);
    node.on_request(Request::new(1, 4));
    node.on_request(Request::new(3, 2));

    let effects = node.on_relinquish(NodeId(4), None);

    assert_eq!(sent(&effects), vec![(MessageKind::Locked, 4)]);
    assert_eq!(node.coordinator().held_by(), Some(Request::new(1, 4)));
}

#[parameterized(
    relinquish_from_non_holder = { MessageKind::Relinquish, 3 },
    release_from_non_holder = { MessageKind::Release, 3 },
)]
fn messages_from_non_holder_are_ignored(kind: MessageKind, from: u32) {
    let mut node = coordinator(1);
    node.on_request(Request::new(1, 2));
    node.on_request(Request::new(2, 3));
    let before = node.coordinator().clone();

    let effects = match kind {
        MessageKind::Relinquish => node.on_relinquish(NodeId(from), None),
        _ => node.on_release(NodeId(from), None),
    };

    assert!(effects.is_empty());
    assert_eq!(node.coordinator(), &before);
}

#[test]
fn release_grants_next_waiting_request() {
    let mut node = coordinator(1);
    node.on_request(Request::new(1, 2));
    node.on_request(Request::new(1, 3));

    let effects = node.on_release(NodeId(2), None);

    assert_eq!(sent(&effects), vec![(MessageKind::Locked, 3)]);
    assert_eq!(node.coordinator().held_by(), Some(Request::new(1, 3)));
    assert_eq!(node.coordinator().queue_len(), 0);
}

#[test]
fn release_with_empty_queue_unlocks() {
    let mut node = coordinator(1);
    node.on_request(Request::new(1, 2));

    assert!(node.on_release(NodeId(2), None).is_empty());
    assert!(!node.coordinator().is_locked());
}

#[test]
fn duplicate_release_is_a_no_op() {
    let mut node = coordinator(1);
    node.on_request(Request::new(1, 2));
    node.on_request(Request::new(1, 3));
    node.on_release(NodeId(2), None);
    let after_first = node.coordinator().clone();

    assert!(node.on_release(NodeId(2), None).is_empty());
    assert_eq!(node.coordinator(), &after_first);
}

#[test]
fn release_naming_an_older_attempt_keeps_renewed_grant() {
    let mut node = coordinator(1);
    node.on_request(Request::new(1, 2));
    node.on_request(Request::new(4, 3));
    node.on_request(Request::new(9, 2));

    assert!(node.on_release(NodeId(2), Some(Request::new(1, 2))).is_empty());
    assert_eq!(node.coordinator().held_by(), Some(Request::new(9, 2)));

    let effects = node.on_release(NodeId(2), Some(Request::new(9, 2)));
    assert_eq!(sent(&effects), vec![(MessageKind::Locked, 3)]);
}

#[test]
fn relinquish_naming_another_request_is_ignored() {
    let mut node = coordinator(1);
    node.on_request(Request::new(5, 4));
    node.on_request(Request::new(2, 3));

    assert!(node.on_relinquish(NodeId(4), Some(Request::new(3, 4))).is_empty());
    assert_eq!(node.coordinator().held_by(), Some(Request::new(5, 4)));
}

#[parameterized(
    duplicate_of_holder = { Request::new(1, 2) },
    stale_from_holder = { Request::new(0, 2) },
    duplicate_of_queued = { Request::new(2, 3) },
    stale_from_queued = { Request::new(1, 3) },
)]
fn duplicate_or_stale_request_is_ignored(request: Request) {
    let mut node = coordinator(1);
    node.on_request(Request::new(1, 2));
    node.on_request(Request::new(2, 3));
    let before = node.coordinator().clone();

    assert!(node.on_request(request).is_empty());
    assert_eq!(node.coordinator(), &before);
}

#[test]
fn newer_request_replaces_queued_entry() {
    let mut node = coordinator(1);
    node.on_request(Request::new(1, 2));
    node.on_request(Request::new(2, 3));

    let effects = node.on_request(Request::new(6, 3));

    assert_eq!(sent(&effects), vec![(MessageKind::Failed, 3)]);
    assert_eq!(
        node.coordinator().waiting().copied().collect::<Vec<_>>(),
        vec![Request::new(6, 3)]
    );
}

#[test]
fn newer_request_from_holder_repoints_grant() {
    let mut node = coordinator(1);
    node.on_request(Request::new(1, 2));
    node.on_request(Request::new(9, 3));

    let effects = node.on_request(Request::new(4, 2));

    let msg = only_message(&effects);
    assert_eq!((msg.kind, msg.to), (MessageKind::Locked, NodeId(2)));
    assert_eq!(msg.request, Some(Request::new(4, 2)));
    assert_eq!(node.coordinator().held_by(), Some(Request::new(4, 2)));
    assert_eq!(node.coordinator().queue_len(), 1);
}

#[test]
fn renewed_grant_outranked_by_waiter_is_inquired() {
    let mut node = coordinator(4);
    node.on_request(Request::new(1, 2));
    node.on_request(Request::new(1, 3));

    // Node 2 retries after giving up on (1, 2); (1, 3) now ranks first
    let effects = node.on_request(Request::new(5, 2));

    assert_eq!(
        sent(&effects),
        vec![(MessageKind::Locked, 2), (MessageKind::Inquire, 2)]
    );
    let inquire = effects[1].message().unwrap();
    assert_eq!(inquire.request, Some(Request::new(5, 2)));
    assert_eq!(node.coordinator().held_by(), Some(Request::new(5, 2)));
    assert_eq!(
        node.coordinator().waiting().copied().collect::<Vec<_>>(),
        vec![Request::new(1, 3)]
    );
}

#[test]
fn renewed_holder_yielding_hands_grant_to_waiter() {
    let mut node = coordinator(4);
    node.on_request(Request::new(1, 2));
    node.on_request(Request::new(1, 3));
    node.on_request(Request::new(5, 2));

    let effects = node.on_relinquish(NodeId(2), Some(Request::new(5, 2)));

    assert_eq!(sent(&effects), vec![(MessageKind::Locked, 3)]);
    assert_eq!(node.coordinator().held_by(), Some(Request::new(1, 3)));
    assert_eq!(
        node.coordinator().waiting().copied().collect::<Vec<_>>(),
        vec![Request::new(5, 2)]
    );
}

proptest! {
    #[test]
    fn grants_follow_priority_after_first(
        requests in prop::collection::btree_map(1u32..20, 1u64..50, 1..10)
    ) {
        let mut node = coordinator(0);
        for (&node_id, &seqnum) in &requests {
            node.on_request(Request::new(seqnum, node_id));
        }

        let mut grants = Vec::new();
        while let Some(held) = node.coordinator().held_by() {
            prop_assert!(node.coordinator().waiting().all(|r| *r != held));
            grants.push(held);
            node.on_release(held.node_id, Some(held));
        }

        prop_assert_eq!(grants.len(), requests.len());
        let rest = &grants[1..];
        prop_assert!(rest.windows(2).all(|w| w[0] < w[1]));
    }
}
