//! PriorityQueue ordering under randomized push/pop sequences

use keyward_collections::{PriorityQueue, QueueError};
use proptest::prelude::*;
use rand::Rng;

fn drain(queue: &mut PriorityQueue<usize>) -> Vec<(usize, f64)> {
    let mut popped = Vec::with_capacity(queue.len());
    while !queue.is_empty() {
        let (peeked, peeked_cost) = {
            let (item, cost) = queue.peek().unwrap();
            (*item, cost)
        };
        let (item, cost) = queue.pop().unwrap();
        assert_eq!(item, peeked, "Peek must return the item pop returns");
        assert_eq!(cost, peeked_cost);
        popped.push((item, cost));
    }
    popped
}

/// Popped costs equal the pushed costs sorted in queue order, and every
/// item comes back exactly once with the cost it was pushed with
fn assert_drained_in_order(pushed: &[f64], popped: &[(usize, f64)], max_first: bool) {
    let mut expected = pushed.to_vec();
    expected.sort_by(f64::total_cmp);
    if max_first {
        expected.reverse();
    }

    let costs: Vec<f64> = popped.iter().map(|(_, cost)| *cost).collect();
    assert_eq!(costs, expected);

    let mut items: Vec<usize> = popped.iter().map(|(item, _)| *item).collect();
    items.sort_unstable();
    assert_eq!(items, (0..pushed.len()).collect::<Vec<_>>());

    for (item, cost) in popped {
        assert_eq!(pushed[*item], *cost, "Item {} popped with a foreign cost", item);
    }
}

#[test]
fn test_random_min_queue_thousands() {
    let mut rng = rand::thread_rng();
    let mut queue = PriorityQueue::min();

    let pushed: Vec<f64> = (0..5_000).map(|_| rng.gen_range(-1_000.0..1_000.0)).collect();
    for (i, cost) in pushed.iter().enumerate() {
        queue.push(i, *cost);
    }

    let popped = drain(&mut queue);
    assert_drained_in_order(&pushed, &popped, false);
}

#[test]
fn test_random_max_queue_thousands() {
    let mut rng = rand::thread_rng();
    let mut queue = PriorityQueue::max();

    let pushed: Vec<f64> = (0..5_000).map(|_| rng.gen_range(0..100) as f64).collect();
    for (i, cost) in pushed.iter().enumerate() {
        queue.push(i, *cost);
    }

    let popped = drain(&mut queue);
    assert_drained_in_order(&pushed, &popped, true);
}

#[test]
fn test_interleaved_push_pop() {
    let mut queue = PriorityQueue::min();
    queue.push("b", 2.0);
    queue.push("c", 3.0);
    assert_eq!(queue.pop_item(), Some("b"));

    queue.push("a", 1.0);
    assert_eq!(queue.pop(), Some(("a", 1.0)));
    assert_eq!(queue.pop(), Some(("c", 3.0)));
    assert_eq!(queue.pop(), None);
}

#[test]
fn test_empty_queue_peek_fails() {
    let queue: PriorityQueue<String> = PriorityQueue::min();
    assert_eq!(queue.len(), 0);
    assert_eq!(queue.peek().unwrap_err(), QueueError::Empty);
}

#[test]
fn test_equal_costs_all_returned() {
    let mut queue = PriorityQueue::max();
    for i in 0..10 {
        queue.push(i, 1.0);
    }

    let mut items: Vec<i32> = queue.into_sorted_vec().into_iter().map(|(i, _)| i).collect();
    items.sort();
    assert_eq!(items, (0..10).collect::<Vec<_>>());
}

proptest! {
    #[test]
    fn prop_min_queue_drains_sorted(costs in prop::collection::vec(-1e6f64..1e6, 0..500)) {
        let mut queue = PriorityQueue::min();
        for (i, cost) in costs.iter().enumerate() {
            queue.push(i, *cost);
        }

        let popped = drain(&mut queue);
        assert_drained_in_order(&costs, &popped, false);
    }

    #[test]
    fn prop_max_queue_drains_sorted(costs in prop::collection::vec(-1e6f64..1e6, 0..500)) {
        let mut queue = PriorityQueue::max();
        for (i, cost) in costs.iter().enumerate() {
            queue.push(i, *cost);
        }

        let popped = drain(&mut queue);
        assert_drained_in_order(&costs, &popped, true);
    }
}
