use crate::functions::registry::Vocabulary;
use crate::types::{Fitness, Node, TransientKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Expression tree stored as a pre-order (prefix) node sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionTree {
    nodes: Vec<Node>,
}

impl ExpressionTree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// Number of nodes
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Maximum root-to-leaf depth; a lone terminal has height 0
    pub fn height(&self) -> usize {
        height_of(&self.nodes)
    }

    /// Index range of the subtree rooted at `begin`
    pub fn subtree_range(&self, begin: usize) -> Range<usize> {
        subtree_range(&self.nodes, begin)
    }

    pub fn subtree(&self, begin: usize) -> &[Node] {
        &self.nodes[self.subtree_range(begin)]
    }

    /// Replaces the nodes in `range` with `replacement`
    pub fn replace_subtree(&mut self, range: Range<usize>, replacement: &[Node]) {
        self.nodes.splice(range, replacement.iter().copied());
    }

    /// True when the node arities describe exactly one complete tree
    pub fn is_well_formed(&self) -> bool {
        is_well_formed(&self.nodes)
    }

    pub fn transient_keys(&self) -> impl Iterator<Item = TransientKey> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            Node::Transient(key) => Some(*key),
            _ => None,
        })
    }

    /// Formula using the vocabulary's feature names
    pub fn render(&self, vocabulary: &Vocabulary) -> String {
        render_nodes(&self.nodes, &|i| {
            vocabulary
                .feature_name(i)
                .map(str::to_string)
                .unwrap_or_else(|| format!("x{}", i))
        })
    }
}

impl fmt::Display for ExpressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_nodes(&self.nodes, &|i| format!("x{}", i)))
    }
}

pub(crate) fn height_of(nodes: &[Node]) -> usize {
    let mut stack = vec![0usize];
    let mut max_depth = 0;
    for node in nodes {
        let depth = stack.pop().unwrap_or(0);
        max_depth = max_depth.max(depth);
        stack.extend(std::iter::repeat(depth + 1).take(node.arity()));
    }
    max_depth
}

pub(crate) fn subtree_range(nodes: &[Node], begin: usize) -> Range<usize> {
    let mut end = begin + 1;
    let mut pending = nodes[begin].arity();
    while pending > 0 && end < nodes.len() {
        pending = pending + nodes[end].arity() - 1;
        end += 1;
    }
    begin..end
}

pub(crate) fn is_well_formed(nodes: &[Node]) -> bool {
    let mut open = 1usize;
    for node in nodes {
        if open == 0 {
            return false;
        }
        open = open - 1 + node.arity();
    }
    open == 0 && !nodes.is_empty()
}

fn render_nodes(nodes: &[Node], feature: &dyn Fn(usize) -> String) -> String {
    fn walk(nodes: &[Node], pos: &mut usize, feature: &dyn Fn(usize) -> String) -> String {
        let Some(node) = nodes.get(*pos) else {
            return "?".to_string();
        };
        *pos += 1;
        match node {
            Node::Unary(op) => format!("{}({})", op.alias(), walk(nodes, pos, feature)),
            Node::Binary(op) => {
                let lhs = walk(nodes, pos, feature);
                let rhs = walk(nodes, pos, feature);
                format!("{}({}, {})", op.alias(), lhs, rhs)
            }
            Node::Feature(i) => feature(*i),
            Node::Constant(c) => format!("{}", c),
            Node::Transient(key) => key.to_string(),
        }
    }

    let mut pos = 0;
    walk(nodes, &mut pos, feature)
}

/// Per-individual bookkeeping consumed by the transient terminal set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lineage {
    /// Generation at which the mark was last refreshed
    pub generation: usize,
    /// Fitness before this generation's operators ran
    pub fitness: Option<Fitness>,
    /// Subtree most recently spliced in by an operator
    pub introduced: Option<Vec<Node>>,
}

/// Candidate solution: a tree, its (possibly invalid) fitness and lineage
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub tree: ExpressionTree,
    pub fitness: Option<Fitness>,
    pub lineage: Lineage,
}

impl Individual {
    pub fn new(tree: ExpressionTree) -> Self {
        Self {
            tree,
            fitness: None,
            lineage: Lineage::default(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.fitness.is_some()
    }

    pub fn invalidate(&mut self) {
        self.fitness = None;
    }

    /// Records the current state as the "last known" one for this generation
    pub fn stamp_lineage(&mut self, generation: usize) {
        self.lineage = Lineage {
            generation,
            fitness: self.fitness,
            introduced: None,
        };
    }

    /// Same structure and same fitness
    pub fn is_twin(&self, other: &Individual) -> bool {
        self.fitness == other.fitness && self.tree == other.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::primitives::{BinaryOp, UnaryOp};

    // add(x0, mul(x1, 2))
    fn sample() -> ExpressionTree {
        ExpressionTree::new(vec![
            Node::Binary(BinaryOp::Add),
            Node::Feature(0),
            Node::Binary(BinaryOp::Mul),
            Node::Feature(1),
            Node::Constant(2.0),
        ])
    }

    #[test]
    fn test_height_and_size() {
        let tree = sample();
        assert_eq!(tree.size(), 5);
        assert_eq!(tree.height(), 2);
        assert_eq!(ExpressionTree::new(vec![Node::Feature(0)]).height(), 0);
    }

    #[test]
    fn test_subtree_range() {
        let tree = sample();
        assert_eq!(tree.subtree_range(0), 0..5);
        assert_eq!(tree.subtree_range(1), 1..2);
        assert_eq!(tree.subtree_range(2), 2..5);
    }

    #[test]
    fn test_replace_subtree() {
        let mut tree = sample();
        let range = tree.subtree_range(2);
        tree.replace_subtree(range, &[Node::Unary(UnaryOp::Neg), Node::Feature(0)]);
        assert_eq!(tree.to_string(), "add(x0, neg(x0))");
        assert!(tree.is_well_formed());
    }

    #[test]
    fn test_malformed_sequence() {
        let tree = ExpressionTree::new(vec![Node::Binary(BinaryOp::Add), Node::Feature(0)]);
        assert!(!tree.is_well_formed());
        let tree = ExpressionTree::new(vec![Node::Feature(0), Node::Feature(1)]);
        assert!(!tree.is_well_formed());
    }
}
