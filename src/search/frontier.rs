//! Frontier containers shared by every search strategy.
//!
//! Labels live in an arena; each label points at its parent, so a label is a
//! path-so-far without copying the prefix. The frontier only orders label
//! indices.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use super::algorithm::Discipline;

/// A partial path ending at `node`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Label {
    pub(crate) node: usize,
    pub(crate) parent: Option<usize>,
    pub(crate) g: f64,
}

/// Heap entry; ordered so that `BinaryHeap` pops the smallest key.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Keyed {
    key: f64,
    tiebreak: f64,
    seq: u64,
    label: usize,
}

impl PartialEq for Keyed {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Keyed {}

impl PartialOrd for Keyed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Keyed {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.tiebreak.total_cmp(&self.tiebreak))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub(crate) enum Frontier {
    Queue(VecDeque<usize>),
    Stack(Vec<usize>),
    Heap { heap: BinaryHeap<Keyed>, seq: u64 },
}

impl Frontier {
    pub(crate) fn new(discipline: Discipline) -> Self {
        match discipline {
            Discipline::Fifo => Frontier::Queue(VecDeque::new()),
            Discipline::Lifo => Frontier::Stack(Vec::new()),
            Discipline::Cost | Discipline::Heuristic | Discipline::CostPlusHeuristic => Frontier::Heap {
                heap: BinaryHeap::new(),
                seq: 0,
            },
        }
    }

    /// Queues `label`. Queue and stack frontiers ignore the priority.
    pub(crate) fn push(&mut self, label: usize, (key, tiebreak): (f64, f64)) {
        match self {
            Frontier::Queue(q) => q.push_back(label),
            Frontier::Stack(s) => s.push(label),
            Frontier::Heap { heap, seq } => {
                heap.push(Keyed {
                    key,
                    tiebreak,
                    seq: *seq,
                    label,
                });
                *seq += 1;
            }
        }
    }

    pub(crate) fn pop(&mut self) -> Option<usize> {
        match self {
            Frontier::Queue(q) => q.pop_front(),
            Frontier::Stack(s) => s.pop(),
            Frontier::Heap { heap, .. } => heap.pop().map(|k| k.label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(mut f: Frontier) -> Vec<usize> {
        std::iter::from_fn(|| f.pop()).collect()
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut f = Frontier::new(Discipline::Fifo);
        for i in 0..3 {
            f.push(i, (0.0, 0.0));
        }
        assert_eq!(drain(f), vec![0, 1, 2]);
    }

    #[test]
    fn test_stack_is_lifo() {
        let mut f = Frontier::new(Discipline::Lifo);
        for i in 0..3 {
            f.push(i, (0.0, 0.0));
        }
        assert_eq!(drain(f), vec![2, 1, 0]);
    }

    #[test]
    fn test_heap_orders_by_key_then_tiebreak_then_insertion() {
        let mut f = Frontier::new(Discipline::CostPlusHeuristic);
        f.push(0, (5.0, 4.0));
        f.push(1, (5.0, 2.0));
        f.push(2, (1.0, 9.0));
        f.push(3, (5.0, 2.0));
        assert_eq!(drain(f), vec![2, 1, 3, 0]);
    }
}
