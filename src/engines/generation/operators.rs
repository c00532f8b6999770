use crate::engines::generation::init::{gen_full, gen_full_with};
use crate::engines::generation::transient::TransientSet;
use crate::engines::generation::tree::{height_of, ExpressionTree, Individual};
use crate::functions::registry::Vocabulary;
use crate::types::Node;
use rand::Rng;

/// Hard bound on tree height after any operator
pub const MAX_TREE_HEIGHT: usize = 90;

/// Depth range of subtrees grown by uniform mutation
pub const MUTATION_MIN_DEPTH: usize = 1;
pub const MUTATION_MAX_DEPTH: usize = 3;

/// Depth range of subtrees spliced in by transient mutation
pub const TRANSIENT_MUTATION_MIN_DEPTH: usize = 0;
pub const TRANSIENT_MUTATION_MAX_DEPTH: usize = 2;

/// Installs `nodes` as the individual's tree unless it breaks the height
/// limit, in which case the individual is left untouched. Returns whether the
/// tree changed.
fn accept_offspring(individual: &mut Individual, nodes: Vec<Node>, introduced: Vec<Node>) -> bool {
    if height_of(&nodes) > MAX_TREE_HEIGHT {
        return false;
    }
    individual.tree = ExpressionTree::new(nodes);
    individual.invalidate();
    individual.lineage.introduced = Some(introduced);
    true
}

/// One-point subtree crossover.
///
/// A non-root node is picked uniformly in each parent and the subtrees rooted
/// there are swapped. Each offspring is height-checked on its own; an
/// oversized offspring reverts to its parent.
pub fn crossover<R: Rng>(first: &mut Individual, second: &mut Individual, rng: &mut R) -> (bool, bool) {
    if first.tree.size() < 2 || second.tree.size() < 2 {
        return (false, false);
    }

    let point1 = rng.gen_range(1..first.tree.size());
    let point2 = rng.gen_range(1..second.tree.size());

    let range1 = first.tree.subtree_range(point1);
    let range2 = second.tree.subtree_range(point2);
    let sub1 = first.tree.nodes()[range1.clone()].to_vec();
    let sub2 = second.tree.nodes()[range2.clone()].to_vec();

    let mut child1 = first.tree.nodes().to_vec();
    child1.splice(range1, sub2.iter().copied());
    let mut child2 = second.tree.nodes().to_vec();
    child2.splice(range2, sub1.iter().copied());

    (
        accept_offspring(first, child1, sub2),
        accept_offspring(second, child2, sub1),
    )
}

/// Uniform mutation: a random subtree is replaced by a full tree of depth 1..=3
pub fn mutate<R: Rng>(individual: &mut Individual, vocabulary: &Vocabulary, rng: &mut R) -> bool {
    let point = rng.gen_range(0..individual.tree.size());
    let range = individual.tree.subtree_range(point);
    let replacement = gen_full(vocabulary, MUTATION_MIN_DEPTH, MUTATION_MAX_DEPTH, rng);

    let mut child = individual.tree.nodes().to_vec();
    child.splice(range, replacement.iter().copied());

    accept_offspring(individual, child, replacement)
}

/// Transient mutation: a random subtree is replaced by a full tree over the
/// vocabulary's primitives whose leaves are drawn from the transient entries
/// live at `generation`. Any other reference to an entry that is not live is
/// re-pointed at a live one in the same pass.
///
/// Does nothing when no entry is live.
pub fn transient_mutate<R: Rng>(
    individual: &mut Individual,
    vocabulary: &Vocabulary,
    transient: &TransientSet,
    generation: usize,
    rng: &mut R,
) -> bool {
    let live = transient.live_keys_at(generation);
    if live.is_empty() {
        return false;
    }
    let draw = |rng: &mut R| Node::Transient(live[rng.gen_range(0..live.len())]);

    let point = rng.gen_range(0..individual.tree.size());
    let range = individual.tree.subtree_range(point);
    let replacement = gen_full_with(
        vocabulary,
        TRANSIENT_MUTATION_MIN_DEPTH,
        TRANSIENT_MUTATION_MAX_DEPTH,
        rng,
        &draw,
    );

    let mut child = individual.tree.nodes().to_vec();
    child.splice(range, replacement.iter().copied());

    for node in child.iter_mut() {
        if let Node::Transient(existing) = node {
            if !transient.is_live_at(*existing, generation) {
                *node = draw(rng);
            }
        }
    }

    accept_offspring(individual, child, replacement)
}
