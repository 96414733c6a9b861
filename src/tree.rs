use std::cmp::Ordering;

/// Failures of the ordered structures (index and booking queue).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    /// Ordering query on a structure holding no keys.
    EmptyIndex,
    /// Successor/predecessor asked for a key that is not present.
    KeyNotFound,
    /// Dequeue from an empty queue.
    EmptyQueue,
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexError::EmptyIndex => write!(f, "index is empty"),
            IndexError::KeyNotFound => write!(f, "key not found in index"),
            IndexError::EmptyQueue => write!(f, "queue is empty"),
        }
    }
}

impl std::error::Error for IndexError {}

type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    height: u32,
    left: Link<K, V>,
    right: Link<K, V>,
}

// ── AVL node plumbing ────────────────────────────────────────────

fn height<K, V>(link: &Link<K, V>) -> u32 {
    link.as_ref().map_or(0, |n| n.height)
}

impl<K, V> Node<K, V> {
    fn leaf(key: K, value: V) -> Box<Self> {
        Box::new(Node {
            key,
            value,
            height: 1,
            left: None,
            right: None,
        })
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance_factor(&self) -> i64 {
        i64::from(height(&self.left)) - i64::from(height(&self.right))
    }
}

fn rotate_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

/// Restore the AVL height bound at `node`, assuming both subtrees satisfy it.
fn rebalance<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    node.update_height();
    let bf = node.balance_factor();
    if bf > 1 {
        if node.left.as_ref().is_some_and(|l| l.balance_factor() < 0) {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }
    if bf < -1 {
        if node.right.as_ref().is_some_and(|r| r.balance_factor() > 0) {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }
    node
}

// Recursion depth is bounded by the tree height (~1.44 log2 n).
fn insert_at<K: Ord, V>(link: Link<K, V>, key: K, value: V, inserted: &mut bool) -> Box<Node<K, V>> {
    let Some(mut node) = link else {
        *inserted = true;
        return Node::leaf(key, value);
    };
    match key.cmp(&node.key) {
        Ordering::Less => node.left = Some(insert_at(node.left.take(), key, value, inserted)),
        Ordering::Greater => node.right = Some(insert_at(node.right.take(), key, value, inserted)),
        Ordering::Equal => return node,
    }
    rebalance(node)
}

/// Detach the minimum node of the subtree. Returns (remaining subtree, min node).
fn take_min<K, V>(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
    match node.left.take() {
        None => {
            let rest = node.right.take();
            (rest, node)
        }
        Some(left) => {
            let (rest, min) = take_min(left);
            node.left = rest;
            (Some(rebalance(node)), min)
        }
    }
}

fn remove_at<K: Ord, V>(link: Link<K, V>, key: &K, removed: &mut Option<V>) -> Link<K, V> {
    let mut node = link?;
    match key.cmp(&node.key) {
        Ordering::Less => node.left = remove_at(node.left.take(), key, removed),
        Ordering::Greater => node.right = remove_at(node.right.take(), key, removed),
        Ordering::Equal => {
            let Node { value, left, right, .. } = *node;
            *removed = Some(value);
            return match (left, right) {
                (left, None) => left,
                (None, right) => right,
                (Some(left), Some(right)) => {
                    // Both children: the in-order successor takes this node's place.
                    let (rest, mut successor) = take_min(right);
                    successor.left = Some(left);
                    successor.right = rest;
                    Some(rebalance(successor))
                }
            };
        }
    }
    Some(rebalance(node))
}

fn leftmost<K, V>(mut node: &Node<K, V>) -> &Node<K, V> {
    while let Some(left) = node.left.as_deref() {
        node = left;
    }
    node
}

fn rightmost<K, V>(mut node: &Node<K, V>) -> &Node<K, V> {
    while let Some(right) = node.right.as_deref() {
        node = right;
    }
    node
}

// ── OrderedIndex ────────────────────────────────────────────────

/// Key-ordered set with a satellite value per key, kept height-balanced (AVL)
/// so sorted bulk insertion (calendar days, slots) stays logarithmic.
///
/// Keys are unique: inserting a present key is a silent no-op.
#[derive(Debug, Clone)]
pub struct OrderedIndex<K, V = ()> {
    root: Link<K, V>,
    len: usize,
}

impl<K, V> Default for OrderedIndex<K, V> {
    fn default() -> Self {
        Self { root: None, len: 0 }
    }
}

impl<K: Ord + Copy, V> OrderedIndex<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `key` with its satellite. Returns false (and keeps the old
    /// satellite) if the key was already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let mut inserted = false;
        self.root = Some(insert_at(self.root.take(), key, value, &mut inserted));
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Remove `key`, returning its satellite.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let mut removed = None;
        self.root = remove_at(self.root.take(), key, &mut removed);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Remove `key`; false if it was not present (including on an empty index).
    pub fn delete(&mut self, key: &K) -> bool {
        self.remove(key).is_some()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|n| &n.value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let mut cur = self.root.as_deref_mut();
        while let Some(node) = cur {
            match key.cmp(&node.key) {
                Ordering::Less => cur = node.left.as_deref_mut(),
                Ordering::Greater => cur = node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.value),
            }
        }
        None
    }

    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    pub fn min(&self) -> Result<K, IndexError> {
        self.root
            .as_deref()
            .map(|n| leftmost(n).key)
            .ok_or(IndexError::EmptyIndex)
    }

    pub fn max(&self) -> Result<K, IndexError> {
        self.root
            .as_deref()
            .map(|n| rightmost(n).key)
            .ok_or(IndexError::EmptyIndex)
    }

    /// Smallest key strictly greater than `key`. `key` itself must be present;
    /// `Ok(None)` means it is the maximum.
    pub fn successor(&self, key: &K) -> Result<Option<K>, IndexError> {
        let mut cur = self.root.as_deref();
        // Nearest ancestor we descended left from.
        let mut candidate = None;
        while let Some(node) = cur {
            match key.cmp(&node.key) {
                Ordering::Less => {
                    candidate = Some(node.key);
                    cur = node.left.as_deref();
                }
                Ordering::Greater => cur = node.right.as_deref(),
                Ordering::Equal => {
                    return Ok(match node.right.as_deref() {
                        Some(right) => Some(leftmost(right).key),
                        None => candidate,
                    });
                }
            }
        }
        Err(IndexError::KeyNotFound)
    }

    /// Largest key strictly less than `key`. `key` itself must be present;
    /// `Ok(None)` means it is the minimum.
    pub fn predecessor(&self, key: &K) -> Result<Option<K>, IndexError> {
        let mut cur = self.root.as_deref();
        let mut candidate = None;
        while let Some(node) = cur {
            match key.cmp(&node.key) {
                Ordering::Less => cur = node.left.as_deref(),
                Ordering::Greater => {
                    candidate = Some(node.key);
                    cur = node.right.as_deref();
                }
                Ordering::Equal => {
                    return Ok(match node.left.as_deref() {
                        Some(left) => Some(rightmost(left).key),
                        None => candidate,
                    });
                }
            }
        }
        Err(IndexError::KeyNotFound)
    }

    /// In-order iteration over `(key, satellite)`.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_deref(), None, None)
    }

    /// In-order iteration over keys in `[lo, hi]`, skipping subtrees outside it.
    pub fn range(&self, lo: K, hi: K) -> Iter<'_, K, V> {
        Iter::new(self.root.as_deref(), Some(lo), Some(hi))
    }

    /// All keys in ascending order.
    pub fn flatten(&self) -> Vec<K> {
        self.iter().map(|(k, _)| k).collect()
    }

    fn find(&self, key: &K) -> Option<&Node<K, V>> {
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            match key.cmp(&node.key) {
                Ordering::Less => cur = node.left.as_deref(),
                Ordering::Greater => cur = node.right.as_deref(),
                Ordering::Equal => return Some(node),
            }
        }
        None
    }

    #[cfg(test)]
    fn height(&self) -> u32 {
        height(&self.root)
    }

    /// Panics if ordering, AVL balance, stored heights or `len` are off.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        fn check<K: Ord + Copy, V>(link: &Link<K, V>, lo: Option<K>, hi: Option<K>) -> (u32, usize) {
            let Some(node) = link else { return (0, 0) };
            assert!(lo.is_none_or(|lo| node.key > lo), "left ordering violated");
            assert!(hi.is_none_or(|hi| node.key < hi), "right ordering violated");
            let (lh, ln) = check(&node.left, lo, Some(node.key));
            let (rh, rn) = check(&node.right, Some(node.key), hi);
            assert!(lh.abs_diff(rh) <= 1, "unbalanced node");
            assert_eq!(node.height, 1 + lh.max(rh), "stale height");
            (node.height, ln + rn + 1)
        }
        let (_, count) = check(&self.root, None, None);
        assert_eq!(count, self.len);
    }
}

impl<K: Ord + Copy, V: Clone> OrderedIndex<K, V> {
    /// Satellites in key order, parallel to [`OrderedIndex::flatten`].
    pub fn flatten_with_satellites(&self) -> (Vec<K>, Vec<V>) {
        self.iter().map(|(k, v)| (k, v.clone())).unzip()
    }
}

/// Explicit-stack in-order traversal, optionally bounded to `[lo, hi]`.
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    lo: Option<K>,
    hi: Option<K>,
}

impl<'a, K: Ord + Copy, V> Iter<'a, K, V> {
    fn new(root: Option<&'a Node<K, V>>, lo: Option<K>, hi: Option<K>) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            lo,
            hi,
        };
        iter.push_left(root);
        iter
    }

    fn push_left(&mut self, mut link: Option<&'a Node<K, V>>) {
        let lo = self.lo;
        while let Some(node) = link {
            if lo.is_some_and(|lo| node.key < lo) {
                link = node.right.as_deref();
            } else {
                self.stack.push(node);
                link = node.left.as_deref();
            }
        }
    }
}

impl<'a, K: Ord + Copy, V> Iterator for Iter<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if self.hi.is_some_and(|hi| node.key > hi) {
            self.stack.clear();
            return None;
        }
        self.push_left(node.right.as_deref());
        Some((node.key, &node.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn index_of(keys: &[i64]) -> OrderedIndex<i64> {
        let mut idx = OrderedIndex::new();
        for &k in keys {
            idx.insert(k, ());
        }
        idx
    }

    #[test]
    fn successor_and_predecessor() {
        let idx = index_of(&[10, 5, 20, 15]);
        assert_eq!(idx.successor(&10), Ok(Some(15)));
        assert_eq!(idx.predecessor(&10), Ok(Some(5)));
        assert_eq!(idx.successor(&20), Ok(None));
        assert_eq!(idx.predecessor(&5), Ok(None));
        assert_eq!(idx.successor(&15), Ok(Some(20)));
        assert_eq!(idx.predecessor(&15), Ok(Some(10)));
    }

    #[test]
    fn successor_of_absent_key_is_error() {
        let idx = index_of(&[5, 10, 15, 20]);
        assert_eq!(idx.successor(&11), Err(IndexError::KeyNotFound));
        assert_eq!(idx.predecessor(&0), Err(IndexError::KeyNotFound));

        let empty: OrderedIndex<i64> = OrderedIndex::new();
        assert_eq!(empty.successor(&1), Err(IndexError::KeyNotFound));
    }

    #[test]
    fn min_max_on_empty() {
        let idx: OrderedIndex<u32> = OrderedIndex::new();
        assert_eq!(idx.min(), Err(IndexError::EmptyIndex));
        assert_eq!(idx.max(), Err(IndexError::EmptyIndex));

        let idx = index_of(&[3, -7, 12]);
        assert_eq!(idx.min(), Ok(-7));
        assert_eq!(idx.max(), Ok(12));
    }

    #[test]
    fn duplicate_insert_is_noop() {
        let mut idx = OrderedIndex::new();
        assert!(idx.insert(7u32, 1u64));
        assert!(!idx.insert(7, 2));
        assert_eq!(idx.len(), 1);
        // First satellite survives.
        assert_eq!(idx.get(&7), Some(&1));
    }

    #[test]
    fn delete_from_empty_is_not_found() {
        let mut idx: OrderedIndex<u32> = OrderedIndex::new();
        assert!(!idx.delete(&3));
        assert!(idx.is_empty());
    }

    #[test]
    fn delete_leaf_single_child_and_two_children() {
        let mut idx = index_of(&[2, 1, 3, 4]);
        assert!(idx.delete(&3)); // right child only
        idx.assert_invariants();
        assert!(idx.delete(&1)); // leaf
        idx.assert_invariants();
        assert_eq!(idx.flatten(), vec![2, 4]);

        let mut idx = index_of(&[20, 10, 30, 5, 40]);
        assert!(idx.delete(&20)); // successor splice
        idx.assert_invariants();
        assert_eq!(idx.flatten(), vec![5, 10, 30, 40]);
        assert!(!idx.delete(&20));
    }

    #[test]
    fn remove_returns_satellite() {
        let mut idx = OrderedIndex::new();
        idx.insert(2_401_011u32, 42u64);
        assert_eq!(idx.remove(&2_401_011), Some(42));
        assert_eq!(idx.remove(&2_401_011), None);
    }

    #[test]
    fn sorted_insertion_stays_balanced() {
        let mut idx = OrderedIndex::new();
        for k in 0..1024u32 {
            idx.insert(k, ());
        }
        idx.assert_invariants();
        // A degenerate BST would be 1024 deep.
        assert!(idx.height() <= 11);
    }

    #[test]
    fn range_is_inclusive() {
        let idx = index_of(&[1, 3, 5, 7, 9, 11]);
        let keys: Vec<i64> = idx.range(3, 9).map(|(k, _)| k).collect();
        assert_eq!(keys, vec![3, 5, 7, 9]);
        let keys: Vec<i64> = idx.range(4, 4).map(|(k, _)| k).collect();
        assert!(keys.is_empty());
        let keys: Vec<i64> = idx.range(-100, 2).map(|(k, _)| k).collect();
        assert_eq!(keys, vec![1]);
    }

    #[test]
    fn flatten_with_satellites_is_parallel() {
        let mut idx = OrderedIndex::new();
        idx.insert(30u32, 3u64);
        idx.insert(10, 1);
        idx.insert(20, 2);
        let (keys, sats) = idx.flatten_with_satellites();
        assert_eq!(keys, vec![10, 20, 30]);
        assert_eq!(sats, vec![1, 2, 3]);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut idx: OrderedIndex<u32, Vec<u32>> = OrderedIndex::new();
        idx.insert(100, vec![1]);
        idx.get_mut(&100).unwrap().push(2);
        assert_eq!(idx.get(&100), Some(&vec![1, 2]));
        assert!(idx.get_mut(&99).is_none());
    }

    proptest! {
        #[test]
        fn prop_flatten_strictly_increasing(keys in proptest::collection::vec(-500i64..500, 0..200)) {
            let idx = index_of(&keys);
            let flat = idx.flatten();
            prop_assert!(flat.windows(2).all(|w| w[0] < w[1]));
            let mut expected = keys.clone();
            expected.sort_unstable();
            expected.dedup();
            prop_assert_eq!(flat, expected);
            idx.assert_invariants();
        }

        #[test]
        fn prop_insert_delete_matches_btreeset(
            ops in proptest::collection::vec((any::<bool>(), 0u32..64), 0..300)
        ) {
            let mut idx = OrderedIndex::new();
            let mut model = std::collections::BTreeSet::new();
            for (insert, key) in ops {
                if insert {
                    prop_assert_eq!(idx.insert(key, ()), model.insert(key));
                } else {
                    prop_assert_eq!(idx.delete(&key), model.remove(&key));
                }
            }
            idx.assert_invariants();
            prop_assert_eq!(idx.flatten(), model.into_iter().collect::<Vec<_>>());
        }
    }
}
