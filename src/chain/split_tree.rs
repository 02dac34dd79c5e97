//! Explicit split tree
//!
//! The cost table encodes the optimal parenthesization implicitly. This
//! materialises it as nodes so the plan can be inspected, printed and
//! re-costed.

use std::fmt;

use super::table::CostTable;

pub type NodeId = usize;

/// A node of the split tree
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Node {
    /// A single input factor
    Leaf(usize),
    /// Subchain `[lo, hi]` computed as `[lo, split] · [split+1, hi]`
    Split {
        lo: usize,
        hi: usize,
        split: usize,
        left: NodeId,
        right: NodeId,
    },
}

impl Node {
    /// Inclusive factor range covered by this node
    pub fn range(&self) -> (usize, usize) {
        match *self {
            Node::Leaf(i) => (i, i),
            Node::Split { lo, hi, .. } => (lo, hi),
        }
    }
}

/// Optimal parenthesization of an n-factor chain
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SplitTree {
    /// Build the tree for `[0, n-1]` from a filled cost table
    ///
    /// Nodes are stored in postorder, so the root is always last.
    pub fn from_table(table: &CostTable, n: usize) -> Self {
        assert!(n > 0, "split tree needs at least one factor");

        enum Frame {
            Visit(usize, usize),
            Join(usize, usize, usize),
        }

        let mut nodes = Vec::with_capacity(2 * n - 1);
        let mut built: Vec<NodeId> = Vec::new();
        let mut work = vec![Frame::Visit(0, n - 1)];

        while let Some(frame) = work.pop() {
            match frame {
                Frame::Visit(i, j) if i == j => {
                    nodes.push(Node::Leaf(i));
                    built.push(nodes.len() - 1);
                }
                Frame::Visit(i, j) => {
                    let k = table.at(i, j).split;
                    work.push(Frame::Join(i, j, k));
                    work.push(Frame::Visit(k + 1, j));
                    work.push(Frame::Visit(i, k));
                }
                Frame::Join(lo, hi, split) => {
                    let right = built.pop().expect("right child built before join");
                    let left = built.pop().expect("left child built before join");
                    nodes.push(Node::Split {
                        lo,
                        hi,
                        split,
                        left,
                        right,
                    });
                    built.push(nodes.len() - 1);
                }
            }
        }

        let root = nodes.len() - 1;
        SplitTree { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids with both children before their parent
    pub fn postorder(&self) -> impl Iterator<Item = NodeId> + '_ {
        0..self.nodes.len()
    }

    /// Multiplications on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        let mut depth = vec![0usize; self.nodes.len()];
        for id in self.postorder() {
            if let Node::Split { left, right, .. } = self.nodes[id] {
                depth[id] = 1 + depth[left].max(depth[right]);
            }
        }
        depth[self.root]
    }

    /// Scalar multiplies this tree performs on the chain `dims`
    pub fn cost(&self, dims: &[usize]) -> usize {
        self.nodes
            .iter()
            .map(|node| match *node {
                Node::Leaf(_) => 0,
                Node::Split { lo, hi, split, .. } => dims[lo]
                    .saturating_mul(dims[split + 1])
                    .saturating_mul(dims[hi + 1]),
            })
            .fold(0usize, |acc, c| acc.saturating_add(c))
    }

    fn fmt_node(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.nodes[id] {
            Node::Leaf(i) => write!(f, "{}", i),
            Node::Split { left, right, .. } => {
                write!(f, "(")?;
                self.fmt_node(left, f)?;
                write!(f, " ")?;
                self.fmt_node(right, f)?;
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for SplitTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root, f)
    }
}
