//! Binary min-heap keyed by a floating-point priority
//!
//! There is no decrease-key. Callers that find a cheaper priority for a
//! value push it again and skip the stale copy when it surfaces, so the heap
//! can hold more entries than there are distinct values.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap entry; ordered so that `BinaryHeap` (a max-heap) pops the minimum
struct Entry<T> {
    priority: f64,
    seq: u64,
    value: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap; earlier pushes win ties
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue with lazy deletion semantics
pub struct PriorityQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
    peak: usize,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
            peak: 0,
        }
    }

    /// Insert a value, O(log n)
    pub fn push(&mut self, priority: f64, value: T) {
        self.heap.push(Entry {
            priority,
            seq: self.next_seq,
            value,
        });
        self.next_seq += 1;
        self.peak = self.peak.max(self.heap.len());
    }

    /// Remove and return the minimum-priority entry, O(log n)
    pub fn pop_min(&mut self) -> Option<(f64, T)> {
        self.heap.pop().map(|e| (e.priority, e.value))
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Largest size the heap reached, stale copies included
    pub fn peak_len(&self) -> usize {
        self.peak
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_priority_order() {
        let mut queue = PriorityQueue::new();
        for (p, v) in [(5.0, "e"), (1.0, "a"), (3.0, "c"), (2.0, "b"), (4.0, "d")] {
            queue.push(p, v);
        }

        let order: Vec<_> = std::iter::from_fn(|| queue.pop_min().map(|(_, v)| v)).collect();
        assert_eq!(order, vec!["a", "b", "c", "d", "e"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_pop_empty_is_none() {
        let mut queue: PriorityQueue<u32> = PriorityQueue::new();
        assert!(queue.pop_min().is_none());
    }

    #[test]
    fn test_equal_priorities_are_fifo() {
        let mut queue = PriorityQueue::new();
        queue.push(1.0, "first");
        queue.push(1.0, "second");
        queue.push(1.0, "third");

        assert_eq!(queue.pop_min(), Some((1.0, "first")));
        assert_eq!(queue.pop_min(), Some((1.0, "second")));
        assert_eq!(queue.pop_min(), Some((1.0, "third")));
    }

    #[test]
    fn test_stale_copies_remain_until_popped() {
        let mut queue = PriorityQueue::new();
        queue.push(10.0, 'x');
        queue.push(4.0, 'x'); // cheaper copy of the same value

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peak_len(), 2);
        assert_eq!(queue.pop_min(), Some((4.0, 'x')));
        assert_eq!(queue.pop_min(), Some((10.0, 'x')));
    }

    #[test]
    fn test_nan_sorts_last() {
        let mut queue = PriorityQueue::new();
        queue.push(f64::NAN, "nan");
        queue.push(1.0, "one");

        assert_eq!(queue.pop_min().map(|(_, v)| v), Some("one"));
        assert_eq!(queue.pop_min().map(|(_, v)| v), Some("nan"));
    }
}
