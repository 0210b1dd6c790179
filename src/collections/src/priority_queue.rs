//! Cost-ordered priority queue backed by a binary heap

use crate::error::{QueueError, Result};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Which end of the cost range is popped first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Lowest cost first
    MinFirst,
    /// Highest cost first
    MaxFirst,
}

/// Heap slot. `Ord` is arranged so that `BinaryHeap` (a max-heap) always
/// surfaces the item that should be popped next for the slot's order.
struct Slot<T> {
    item: T,
    cost: f64,
    order: Order,
}

impl<T> PartialEq for Slot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Slot<T> {}

impl<T> PartialOrd for Slot<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Slot<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_cost = self.cost.total_cmp(&other.cost);
        match self.order {
            Order::MaxFirst => by_cost,
            Order::MinFirst => by_cost.reverse(),
        }
    }
}

/// Priority queue ordered by an `f64` cost
///
/// Items with equal cost come out in no particular relative order.
///
/// # Examples
///
/// ```
/// use keyward_collections::PriorityQueue;
///
/// let mut queue = PriorityQueue::min();
/// queue.push("slow", 30.0);
/// queue.push("fast", 1.5);
///
/// assert_eq!(queue.peek().unwrap(), (&"fast", 1.5));
/// assert_eq!(queue.pop(), Some(("fast", 1.5)));
/// assert_eq!(queue.pop_item(), Some("slow"));
/// assert!(queue.peek().is_err());
/// ```
pub struct PriorityQueue<T> {
    heap: BinaryHeap<Slot<T>>,
    order: Order,
}

impl<T> PriorityQueue<T> {
    /// Create an empty queue with the given order
    pub fn new(order: Order) -> Self {
        Self {
            heap: BinaryHeap::new(),
            order,
        }
    }

    /// Create an empty queue with preallocated room for `capacity` items
    pub fn with_capacity(order: Order, capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            order,
        }
    }

    /// Queue that pops the lowest cost first
    pub fn min() -> Self {
        Self::new(Order::MinFirst)
    }

    /// Queue that pops the highest cost first
    pub fn max() -> Self {
        Self::new(Order::MaxFirst)
    }

    pub fn order(&self) -> Order {
        self.order
    }

    /// Insert an item at its priority position
    pub fn push(&mut self, item: T, cost: f64) {
        self.heap.push(Slot {
            item,
            cost,
            order: self.order,
        });
    }

    /// Remove the extreme item together with its cost
    pub fn pop(&mut self) -> Option<(T, f64)> {
        self.heap.pop().map(|slot| (slot.item, slot.cost))
    }

    /// Remove the extreme item, discarding its cost
    pub fn pop_item(&mut self) -> Option<T> {
        self.pop().map(|(item, _)| item)
    }

    /// Like [`pop`](Self::pop) but reports an empty queue as an error
    pub fn try_pop(&mut self) -> Result<(T, f64)> {
        self.pop().ok_or(QueueError::Empty)
    }

    /// Borrow the item that the next pop would return
    pub fn peek(&self) -> Result<(&T, f64)> {
        self.heap
            .peek()
            .map(|slot| (&slot.item, slot.cost))
            .ok_or(QueueError::Empty)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Consume the queue, returning items in pop order
    pub fn into_sorted_vec(mut self) -> Vec<(T, f64)> {
        let mut out = Vec::with_capacity(self.heap.len());
        while let Some(entry) = self.pop() {
            out.push(entry);
        }
        out
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::min()
    }
}

impl<T> Extend<(T, f64)> for PriorityQueue<T> {
    fn extend<I: IntoIterator<Item = (T, f64)>>(&mut self, iter: I) {
        for (item, cost) in iter {
            self.push(item, cost);
        }
    }
}

impl<T> std::fmt::Debug for PriorityQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityQueue")
            .field("order", &self.order)
            .field("len", &self.heap.len())
            .finish()
    }
}
