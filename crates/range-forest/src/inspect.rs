//! Read-only structure access and invariant checking for tests and debugging.

use std::cmp::Ordering;
use std::fmt::Debug;

use crate::arena::NodeIndex;
use crate::error::{Error, Result};
use crate::offset::add;
use crate::tree::{Strategy, Tree};

fn invariant(msg: String) -> Error {
    Error::Invariant(msg)
}

impl<K, V, S: Strategy, const D: usize> Tree<K, V, S, D> {
    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    pub fn left(&self, n: NodeIndex) -> Option<NodeIndex> {
        self.arena.l(n)
    }

    pub fn right(&self, n: NodeIndex) -> Option<NodeIndex> {
        self.arena.r(n)
    }

    pub fn meta(&self, n: NodeIndex) -> S::Meta {
        *self.arena.meta(n)
    }

    /// Stored offset of `n` relative to its parent.
    pub fn offset(&self, n: NodeIndex) -> [i32; D] {
        self.arena.offset(n)
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut max = 0;
        let mut stack: Vec<(NodeIndex, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((n, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(self.arena.l(n).map(|l| (l, depth + 1)));
            stack.extend(self.arena.r(n).map(|r| (r, depth + 1)));
        }
        max
    }

    /// Check the structural, partition and balance invariants.
    pub fn validate(&self) -> Result<()> {
        self.validate_inner(None::<fn(&K, &K) -> Ordering>)
    }

    /// [`Tree::validate`] plus strictly increasing keys under `cmp`.
    pub fn validate_ordered<C>(&self, cmp: C) -> Result<()>
    where
        C: Fn(&K, &K) -> Ordering,
    {
        self.validate_inner(Some(cmp))
    }

    fn validate_inner<C>(&self, cmp: Option<C>) -> Result<()>
    where
        C: Fn(&K, &K) -> Ordering,
    {
        if self.root.is_none() != (self.count == 0) {
            return Err(invariant(format!(
                "root is {:?} but count is {}",
                self.root, self.count
            )));
        }

        let capacity = self.arena.capacity();
        let mut seen = vec![false; capacity as usize];
        let mut order: Vec<(NodeIndex, [i32; D])> = Vec::with_capacity(self.count as usize);
        let mut stack: Vec<(NodeIndex, [i32; D])> = Vec::new();
        let mut curr = self.root.map(|r| (r, self.arena.offset(r)));
        loop {
            while let Some((n, abs)) = curr {
                if n >= capacity || seen[n as usize] {
                    return Err(invariant(format!("node {n} is reachable twice or out of bounds")));
                }
                if !self.arena.is_live(n) {
                    return Err(invariant(format!("node {n} is linked but free")));
                }
                seen[n as usize] = true;
                stack.push((n, abs));
                curr = self.arena.l(n).map(|l| (l, add(abs, self.arena.offset(l))));
            }
            let Some((n, abs)) = stack.pop() else {
                break;
            };
            order.push((n, abs));
            curr = self.arena.r(n).map(|r| (r, add(abs, self.arena.offset(r))));
        }

        if order.len() != self.count as usize {
            return Err(invariant(format!(
                "count is {} but {} nodes are reachable",
                self.count,
                order.len()
            )));
        }
        match self.arena.free_list_len() {
            Some(free) if free + self.count == capacity => {}
            free => {
                return Err(invariant(format!(
                    "free list of {free:?} slots and {} live nodes do not fill {capacity} slots",
                    self.count
                )));
            }
        }

        if D > 0 {
            if let Some(&(n, first)) = order.first() {
                if first != [0; D] {
                    return Err(invariant(format!("first node {n} starts at {first:?}")));
                }
            } else if self.extent != [0; D] {
                return Err(invariant(format!("empty tree has extent {:?}", self.extent)));
            }
            let ends = order.iter().skip(1).map(|&(_, s)| s).chain(std::iter::once(self.extent));
            for (&(n, start), end) in order.iter().zip(ends) {
                if (0..D).any(|i| end[i] <= start[i]) {
                    return Err(invariant(format!(
                        "node {n} at {start:?} has no positive length before {end:?}"
                    )));
                }
            }
        }

        if let Some(cmp) = cmp {
            for pair in order.windows(2) {
                let (a, b) = (pair[0].0, pair[1].0);
                if cmp(self.arena.key(a), self.arena.key(b)) != Ordering::Less {
                    return Err(invariant(format!("nodes {a} and {b} are out of order")));
                }
            }
        }

        S::check(self).map_err(invariant)
    }
}

impl<K: Debug, V: Debug, S: Strategy, const D: usize> Tree<K, V, S, D> {
    /// Render the tree one node per line, children indented below their parent.
    pub fn print(&self) -> String {
        self.print_node(self.root, [0; D], "")
    }

    fn print_node(&self, node: Option<NodeIndex>, parent_abs: [i32; D], tab: &str) -> String {
        let Some(n) = node else {
            return "∅".to_string();
        };
        let abs = add(parent_abs, self.arena.offset(n));
        let child_tab = format!("{tab}  ");
        let left = self.print_node(self.arena.l(n), abs, &child_tab);
        let right = self.print_node(self.arena.r(n), abs, &child_tab);
        format!(
            "Node[{n}] {:?} @{abs:?} {{ {:?} = {:?} }}\n{tab}L={left}\n{tab}R={right}",
            self.arena.meta(n),
            self.arena.key(n),
            self.arena.value(n),
        )
    }
}
