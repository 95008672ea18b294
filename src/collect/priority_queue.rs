// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fixed-capacity binary heap with the least element at the root.
//!
//! Top-K collection keeps the K best items seen so far. The root is the
//! worst of them, so deciding whether a new item gets in is one comparison
//! against `top()`, and replacing the worst is one sift, `O(log K)`.
//!
//! Unlike `std::collections::BinaryHeap`, the ordering is a value
//! ([`HeapOrder`]) rather than an `Ord` impl, because the same `ScoreDoc`
//! sorts differently for score and field sorts, and a field sort's
//! comparator carries per-query state.

use crate::error::{Error, Result};

/// "Is `a` worse than `b`": `a` is evicted first.
pub trait HeapOrder<T> {
    fn less_than(&self, a: &T, b: &T) -> bool;
}

impl<T, F: Fn(&T, &T) -> bool> HeapOrder<T> for F {
    fn less_than(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

#[derive(Debug, Clone)]
pub struct PriorityQueue<T, O> {
    heap: Vec<T>,
    max_size: usize,
    order: O,
}

impl<T, O: HeapOrder<T>> PriorityQueue<T, O> {
    pub fn new(max_size: usize, order: O) -> Result<Self> {
        if max_size == 0 {
            return Err(Error::InvalidCapacity(max_size));
        }
        Ok(Self {
            heap: Vec::with_capacity(max_size),
            max_size,
            order,
        })
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() == self.max_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn order(&self) -> &O {
        &self.order
    }

    /// The least element.
    pub fn top(&self) -> Option<&T> {
        self.heap.first()
    }

    /// Add `element` if there is room, or if it beats the least element,
    /// which it then replaces. Returns whatever did not make it in.
    pub fn insert_with_overflow(&mut self, element: T) -> Option<T> {
        if self.heap.len() < self.max_size {
            self.heap.push(element);
            self.up_heap(self.heap.len() - 1);
            self.check();
            return None;
        }
        match self.heap.first() {
            Some(top) if self.order.less_than(top, &element) => {
                let evicted = std::mem::replace(&mut self.heap[0], element);
                self.down_heap(0);
                self.check();
                Some(evicted)
            }
            _ => Some(element),
        }
    }

    /// Remove and return the least element.
    pub fn pop(&mut self) -> Option<T> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let least = self.heap.pop();
        if !self.heap.is_empty() {
            self.down_heap(0);
        }
        self.check();
        least
    }

    /// Remove every element, best first.
    pub fn drain_sorted(&mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.heap.len());
        while let Some(element) = self.pop() {
            out.push(element);
        }
        out.reverse();
        out
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    fn up_heap(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.order.less_than(&self.heap[i], &self.heap[parent]) {
                break;
            }
            self.heap.swap(i, parent);
            i = parent;
        }
    }

    fn down_heap(&mut self, mut i: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * i + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.order.less_than(&self.heap[right], &self.heap[left]) {
                right
            } else {
                left
            };
            if !self.order.less_than(&self.heap[child], &self.heap[i]) {
                break;
            }
            self.heap.swap(i, child);
            i = child;
        }
    }

    fn check(&self) {
        crate::contracts::check_heap(&self.heap, self.heap.len(), |a, b| self.order.less_than(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(max_size: usize) -> PriorityQueue<i32, fn(&i32, &i32) -> bool> {
        PriorityQueue::new(max_size, (|a: &i32, b: &i32| a < b) as fn(&i32, &i32) -> bool).unwrap()
    }

    #[test]
    fn test_keeps_the_largest() {
        let mut pq = ints(3);
        for x in [5, 1, 9, 3, 7, 2] {
            pq.insert_with_overflow(x);
        }
        assert_eq!(pq.top(), Some(&5));
        assert_eq!(pq.drain_sorted(), vec![9, 7, 5]);
        assert!(pq.is_empty());
    }

    #[test]
    fn test_overflow_returns_loser() {
        let mut pq = ints(2);
        assert_eq!(pq.insert_with_overflow(4), None);
        assert_eq!(pq.insert_with_overflow(6), None);
        assert_eq!(pq.insert_with_overflow(1), Some(1));
        assert_eq!(pq.insert_with_overflow(8), Some(4));
        assert!(pq.is_full());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let less = (|a: &i32, b: &i32| a < b) as fn(&i32, &i32) -> bool;
        assert!(matches!(PriorityQueue::new(0, less), Err(Error::InvalidCapacity(0))));
    }
}
