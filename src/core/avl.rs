//! Height-balanced ordered multimap used as a candidate frontier
//!
//! Keys are path costs (`f64`, compared with IEEE total ordering). A key may
//! hold several values: inserting an existing key appends to that node's list
//! and `extract_min` pops the most recently inserted value for the smallest
//! key. The node disappears only when its list is empty. This LIFO policy
//! decides which of several equal-cost candidates is confirmed first.

use butterfly_common::{Error, Result};
use std::cmp::Ordering;

type Link<V> = Option<Box<AvlNode<V>>>;

struct AvlNode<V> {
    key: f64,
    values: Vec<V>,
    height: i32,
    left: Link<V>,
    right: Link<V>,
}

impl<V> AvlNode<V> {
    fn leaf(key: f64, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            values: vec![value],
            height: 1,
            left: None,
            right: None,
        })
    }
}

fn height<V>(node: &Link<V>) -> i32 {
    node.as_ref().map_or(0, |n| n.height)
}

fn balance<V>(node: &AvlNode<V>) -> i32 {
    height(&node.left) - height(&node.right)
}

fn update_height<V>(node: &mut AvlNode<V>) {
    node.height = 1 + height(&node.left).max(height(&node.right));
}

fn rotate_right<V>(mut y: Box<AvlNode<V>>) -> Box<AvlNode<V>> {
    let Some(mut x) = y.left.take() else {
        return y;
    };
    y.left = x.right.take();
    update_height(&mut y);
    x.right = Some(y);
    update_height(&mut x);
    x
}

fn rotate_left<V>(mut x: Box<AvlNode<V>>) -> Box<AvlNode<V>> {
    let Some(mut y) = x.right.take() else {
        return x;
    };
    x.right = y.left.take();
    update_height(&mut x);
    y.left = Some(x);
    update_height(&mut y);
    y
}

/// Restore the AVL invariant at `node` after one of its subtrees changed
/// height by at most one.
fn rebalance<V>(mut node: Box<AvlNode<V>>) -> Box<AvlNode<V>> {
    update_height(&mut node);
    let bal = balance(&node);

    if bal > 1 {
        // left-right case first becomes left-left
        if node.left.as_deref().is_some_and(|l| balance(l) < 0) {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }
    if bal < -1 {
        if node.right.as_deref().is_some_and(|r| balance(r) > 0) {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }
    node
}

fn insert_at<V>(node: Link<V>, key: f64, value: V) -> Box<AvlNode<V>> {
    let Some(mut node) = node else {
        return AvlNode::leaf(key, value);
    };

    match key.total_cmp(&node.key) {
        Ordering::Equal => {
            node.values.push(value);
            return node;
        }
        Ordering::Less => node.left = Some(insert_at(node.left.take(), key, value)),
        Ordering::Greater => node.right = Some(insert_at(node.right.take(), key, value)),
    }
    rebalance(node)
}

/// Remove one value of the minimum key from the subtree rooted at `node`.
/// Returns the key, the value and the new subtree root.
fn take_min<V>(mut node: Box<AvlNode<V>>) -> (f64, V, Link<V>) {
    match node.left.take() {
        None => {
            let key = node.key;
            // Nodes are never left with an empty value list.
            let value = node
                .values
                .pop()
                .unwrap_or_else(|| unreachable!("AVL node without values"));
            if node.values.is_empty() {
                (key, value, node.right.take())
            } else {
                (key, value, Some(node))
            }
        }
        Some(left) => {
            let (key, value, new_left) = take_min(left);
            node.left = new_left;
            (key, value, Some(rebalance(node)))
        }
    }
}

/// Ordered multimap from path cost to candidate
pub struct CandidateStore<V> {
    root: Link<V>,
    len: usize,
}

impl<V> Default for CandidateStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CandidateStore<V> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Number of stored values (not distinct keys)
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree, 0 when empty
    pub fn height(&self) -> i32 {
        height(&self.root)
    }

    pub fn insert(&mut self, key: f64, value: V) {
        self.root = Some(insert_at(self.root.take(), key, value));
        self.len += 1;
    }

    /// Remove and return the most recently inserted value of the smallest key
    pub fn extract_min(&mut self) -> Result<(f64, V)> {
        let root = self
            .root
            .take()
            .ok_or(Error::EmptyStructure("candidate store"))?;
        let (key, value, new_root) = take_min(root);
        self.root = new_root;
        self.len -= 1;
        Ok((key, value))
    }

    /// Smallest key currently stored
    pub fn peek_min_key(&self) -> Option<f64> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(node.key)
    }

    /// In-order traversal: keys ascending, values of one key in insertion order
    pub fn iter(&self) -> Iter<'_, V> {
        let mut iter = Iter {
            stack: Vec::new(),
            current: None,
        };
        iter.push_left(self.root.as_deref());
        iter
    }

    #[cfg(test)]
    fn assert_balanced(&self) {
        fn check<V>(node: &Link<V>) -> i32 {
            let Some(n) = node else { return 0 };
            assert!(!n.values.is_empty());
            let lh = check(&n.left);
            let rh = check(&n.right);
            assert!((lh - rh).abs() <= 1, "unbalanced at key {}", n.key);
            assert_eq!(n.height, 1 + lh.max(rh));
            if let Some(l) = &n.left {
                assert!(l.key < n.key);
            }
            if let Some(r) = &n.right {
                assert!(r.key > n.key);
            }
            n.height
        }
        check(&self.root);
    }
}

/// Borrowing in-order iterator over a [`CandidateStore`]
pub struct Iter<'a, V> {
    stack: Vec<&'a AvlNode<V>>,
    current: Option<(f64, std::slice::Iter<'a, V>)>,
}

impl<'a, V> Iter<'a, V> {
    fn push_left(&mut self, mut node: Option<&'a AvlNode<V>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (f64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, values)) = self.current.as_mut() {
                if let Some(v) = values.next() {
                    return Some((*key, v));
                }
                self.current = None;
            }
            let node = self.stack.pop()?;
            self.current = Some((node.key, node.values.iter()));
            self.push_left(node.right.as_deref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_extract_from_empty_fails() {
        let mut store: CandidateStore<u32> = CandidateStore::new();
        assert!(store.is_empty());
        assert!(matches!(store.extract_min(), Err(Error::EmptyStructure(_))));
        assert_eq!(store.peek_min_key(), None);
    }

    #[test]
    fn test_duplicate_keys_pop_most_recent_first() {
        let mut store = CandidateStore::new();
        store.insert(2.0, "a");
        store.insert(1.0, "first");
        store.insert(1.0, "second");
        store.insert(1.0, "third");

        assert_eq!(store.len(), 4);
        assert_eq!(store.extract_min().unwrap(), (1.0, "third"));
        assert_eq!(store.extract_min().unwrap(), (1.0, "second"));
        assert_eq!(store.extract_min().unwrap(), (1.0, "first"));
        assert_eq!(store.extract_min().unwrap(), (2.0, "a"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_sequential_inserts_stay_balanced() {
        let mut store = CandidateStore::new();
        for i in 0..1024 {
            store.insert(i as f64, i);
            store.assert_balanced();
        }
        // perfectly balanced AVL of 1024 nodes has height 11
        assert!(store.height() <= 11);
        for i in 0..1024 {
            assert_eq!(store.extract_min().unwrap(), (i as f64, i));
            store.assert_balanced();
        }
    }

    #[test]
    fn test_random_inserts_extract_in_order() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut store = CandidateStore::new();
        let n = 500;
        for i in 0..n {
            // few distinct keys so duplicate lists are exercised
            store.insert(rng.gen_range(0..40) as f64 * 0.5, i);
        }
        store.assert_balanced();

        let m = 320;
        let mut last = f64::NEG_INFINITY;
        for _ in 0..m {
            let (key, _) = store.extract_min().unwrap();
            assert!(key >= last);
            last = key;
            store.assert_balanced();
        }
        assert_eq!(store.len(), n - m);
    }

    #[test]
    fn test_interleaved_operations() {
        let mut store = CandidateStore::new();
        store.insert(5.0, 'e');
        store.insert(3.0, 'c');
        assert_eq!(store.extract_min().unwrap(), (3.0, 'c'));
        store.insert(1.0, 'a');
        store.insert(4.0, 'd');
        assert_eq!(store.peek_min_key(), Some(1.0));
        assert_eq!(store.extract_min().unwrap(), (1.0, 'a'));
        assert_eq!(store.extract_min().unwrap(), (4.0, 'd'));
        assert_eq!(store.extract_min().unwrap(), (5.0, 'e'));
        assert!(store.extract_min().is_err());
    }

    #[test]
    fn test_iter_in_key_order() {
        let mut store = CandidateStore::new();
        for (k, v) in [(3.0, 'x'), (1.0, 'y'), (2.0, 'z'), (1.0, 'w')] {
            store.insert(k, v);
        }
        let items: Vec<(f64, char)> = store.iter().map(|(k, v)| (k, *v)).collect();
        assert_eq!(items, vec![(1.0, 'y'), (1.0, 'w'), (2.0, 'z'), (3.0, 'x')]);
        // iteration does not consume
        assert_eq!(store.len(), 4);
    }
}
