//! Property-based tests for thread store guarantees

use frameview::frame::Frame;
use frameview::store::ThreadStore;
use frameview::types::MESSAGE_TOPIC;
use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::HashSet;

/// Where a generated frame's `continues` pointer leads
#[derive(Debug, Clone)]
enum ParentPick {
    /// A frame that arrived earlier
    Earlier(Index),
    /// Any frame in the script, including ones that arrive later
    Anywhere(Index),
    /// An id that never arrives
    Unseen(u32),
}

/// Frames with unique ids, each optionally continuing another frame
fn build_frames(script: &[(u32, Option<ParentPick>)]) -> Vec<Frame> {
    let mut seen = HashSet::new();
    let ids: Vec<(String, Option<ParentPick>)> = script
        .iter()
        .map(|(seed, pick)| (format!("{:05}", seed), pick.clone()))
        .filter(|(id, _)| seen.insert(id.clone()))
        .collect();

    ids.iter()
        .enumerate()
        .map(|(position, (id, pick))| {
            let frame = Frame::new(id.clone(), MESSAGE_TOPIC, format!("hash-{}", id));
            let parent = match pick {
                Some(ParentPick::Earlier(index)) if position > 0 => {
                    Some(ids[index.index(position)].0.clone())
                }
                Some(ParentPick::Anywhere(index)) => Some(ids[index.index(ids.len())].0.clone()),
                Some(ParentPick::Unseen(seed)) => Some(format!("missing-{}", seed)),
                _ => None,
            };
            match parent {
                Some(parent) => frame.continuing(parent),
                None => frame,
            }
        })
        .collect()
}

fn parent_strategy() -> impl Strategy<Value = Option<ParentPick>> {
    prop::option::of(prop_oneof![
        any::<Index>().prop_map(ParentPick::Earlier),
        any::<Index>().prop_map(ParentPick::Anywhere),
        (0u32..1_000).prop_map(ParentPick::Unseen),
    ])
}

fn script_strategy() -> impl Strategy<Value = Vec<(u32, Option<ParentPick>)>> {
    prop::collection::vec((0u32..5_000, parent_strategy()), 0..64)
}

/// Every ingested frame stays retrievable
#[test]
fn test_ingested_frames_remain_retrievable() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&script_strategy(), |script| {
            let frames = build_frames(&script);
            let store = ThreadStore::new();
            for frame in &frames {
                store.ingest(frame.clone());
            }

            for frame in &frames {
                let stored = store.get_frame(&frame.id);
                prop_assert_eq!(stored.as_deref(), Some(frame));
            }
            prop_assert_eq!(store.len(), frames.len());
            Ok(())
        })
        .unwrap();
}

/// Heads are stored and never continued by a later frame
#[test]
fn test_head_invariant_holds() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&script_strategy(), |script| {
            let frames = build_frames(&script);
            let store = ThreadStore::new();
            for frame in &frames {
                store.ingest(frame.clone());
            }

            let heads = store.list_heads();
            for head in &heads {
                prop_assert!(store.get_frame(head).is_some());
                let position = frames.iter().position(|f| &f.id == head).unwrap();
                for later in &frames[position + 1..] {
                    prop_assert_ne!(later.continues(), Some(head.as_str()));
                }
            }

            // Each step of a walk follows a continues pointer
            for head in &heads {
                let thread = store.reconstruct_thread(head);
                prop_assert_eq!(&thread[0].id, head);
                for pair in thread.windows(2) {
                    prop_assert_eq!(pair[0].continues(), Some(pair[1].id.as_str()));
                }
            }
            Ok(())
        })
        .unwrap();
}

/// Head order depends only on identifiers, not on arrival order
#[test]
fn test_heads_sorted_descending_for_any_arrival_order() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let strategy = prop::collection::hash_set(0u32..100_000, 0..40)
        .prop_map(|ids| ids.into_iter().collect::<Vec<_>>())
        .prop_flat_map(|ids| (Just(ids.clone()), Just(ids).prop_shuffle()));

    runner
        .run(&strategy, |(ids, shuffled)| {
            let in_order = ThreadStore::new();
            let reordered = ThreadStore::new();
            for id in &ids {
                in_order.ingest(Frame::new(format!("{:06}", id), MESSAGE_TOPIC, ""));
            }
            for id in &shuffled {
                reordered.ingest(Frame::new(format!("{:06}", id), MESSAGE_TOPIC, ""));
            }

            let heads = in_order.list_heads();
            prop_assert_eq!(&heads, &reordered.list_heads());
            prop_assert_eq!(heads.len(), ids.len());
            for pair in heads.windows(2) {
                prop_assert!(pair[0] > pair[1]);
            }
            Ok(())
        })
        .unwrap();
}
