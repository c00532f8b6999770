use crate::engines::generation::tree::ExpressionTree;
use crate::functions::registry::Vocabulary;
use crate::types::Node;
use rand::Rng;

/// Builds a prefix sequence whose height is drawn from `min_depth..=max_depth`.
/// `stop(height, depth)` decides when a leaf is placed; `terminal` draws it.
fn generate<R, F, T>(
    vocabulary: &Vocabulary,
    min_depth: usize,
    max_depth: usize,
    rng: &mut R,
    mut stop: F,
    mut terminal: T,
) -> Vec<Node>
where
    R: Rng,
    F: FnMut(usize, usize, &mut R) -> bool,
    T: FnMut(&mut R) -> Node,
{
    let max_depth = max_depth.max(min_depth);
    let height = rng.gen_range(min_depth..=max_depth);
    let mut nodes = Vec::new();
    let mut stack = vec![0usize];

    while let Some(depth) = stack.pop() {
        if stop(height, depth, rng) {
            nodes.push(terminal(rng));
        } else {
            let primitive = vocabulary.random_primitive(rng);
            stack.extend(std::iter::repeat(depth + 1).take(primitive.arity()));
            nodes.push(primitive);
        }
    }

    nodes
}

/// Every branch reaches exactly the drawn height
pub fn gen_full<R: Rng>(vocabulary: &Vocabulary, min_depth: usize, max_depth: usize, rng: &mut R) -> Vec<Node> {
    gen_full_with(vocabulary, min_depth, max_depth, rng, |rng| vocabulary.random_terminal(rng))
}

/// Full tree over the vocabulary's primitives with leaves drawn by `terminal`
pub fn gen_full_with<R, T>(
    vocabulary: &Vocabulary,
    min_depth: usize,
    max_depth: usize,
    rng: &mut R,
    terminal: T,
) -> Vec<Node>
where
    R: Rng,
    T: FnMut(&mut R) -> Node,
{
    generate(vocabulary, min_depth, max_depth, rng, |height, depth, _| depth == height, terminal)
}

/// Branches may stop early once past `min_depth`
pub fn gen_grow<R: Rng>(vocabulary: &Vocabulary, min_depth: usize, max_depth: usize, rng: &mut R) -> Vec<Node> {
    let ratio = vocabulary.terminal_ratio();
    generate(
        vocabulary,
        min_depth,
        max_depth,
        rng,
        |height, depth, rng| depth == height || (depth >= min_depth && rng.gen::<f64>() < ratio),
        |rng| vocabulary.random_terminal(rng),
    )
}

/// Ramped half-and-half: each tree is grown or full with equal probability
pub fn gen_half_and_half<R: Rng>(
    vocabulary: &Vocabulary,
    min_depth: usize,
    max_depth: usize,
    rng: &mut R,
) -> ExpressionTree {
    let nodes = if rng.gen::<bool>() {
        gen_grow(vocabulary, min_depth, max_depth, rng)
    } else {
        gen_full(vocabulary, min_depth, max_depth, rng)
    };
    ExpressionTree::new(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn vocabulary() -> Vocabulary {
        Vocabulary::new(vec!["x".to_string(), "y".to_string()], 2).unwrap()
    }

    #[test]
    fn test_full_trees_reach_height() {
        let vocab = vocabulary();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let tree = ExpressionTree::new(gen_full(&vocab, 2, 2, &mut rng));
            assert!(tree.is_well_formed());
            assert_eq!(tree.height(), 2);
        }
    }

    #[test]
    fn test_custom_leaves() {
        let vocab = vocabulary();
        let mut rng = StdRng::seed_from_u64(3);
        let nodes = gen_full_with(&vocab, 1, 2, &mut rng, |_| Node::Constant(7.0));
        let tree = ExpressionTree::new(nodes);
        assert!(tree.is_well_formed());
        assert!(tree
            .nodes()
            .iter()
            .filter(|n| n.is_terminal())
            .all(|n| *n == Node::Constant(7.0)));
    }

    #[test]
    fn test_half_and_half_respects_bounds() {
        let vocab = vocabulary();
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            let tree = gen_half_and_half(&vocab, 1, 4, &mut rng);
            assert!(tree.is_well_formed());
            assert!(tree.height() <= 4);
        }
    }
}
