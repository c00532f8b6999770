//! Transient terminal set: a bounded pool of subexpressions mined from the
//! population, each usable as a terminal until its lifespan runs out.
//!
//! The set is owned by the evolution driver. Operators only read it; entries
//! are retired and inserted in `update`, once per generation.

use crate::config::transient::{ScoringMethod, TransientConfig};
use crate::engines::generation::tree::{height_of, ExpressionTree, Individual};
use crate::types::{Node, TransientKey};
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Aggregated evidence for one mined subexpression
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateStats {
    /// Individuals that improved after receiving this subexpression
    pub occurrences: usize,
    /// Sum of relative error improvements, each in (0, 1]
    pub total_improvement: f64,
    /// Lowest error among contributing individuals
    pub best_error: f64,
}

/// Ranks mined candidates; higher scores are inserted first
pub trait CandidateScorer: Send + Sync + fmt::Debug {
    fn score(&self, stats: &CandidateStats) -> f64;
}

/// Counts how many improved individuals share the candidate
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyScorer;

impl CandidateScorer for FrequencyScorer {
    fn score(&self, stats: &CandidateStats) -> f64 {
        stats.occurrences as f64
    }
}

/// Frequency weighted by how much each occurrence reduced error
#[derive(Debug, Clone, Copy, Default)]
pub struct ImprovementScorer;

impl CandidateScorer for ImprovementScorer {
    fn score(&self, stats: &CandidateStats) -> f64 {
        stats.total_improvement
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransientEntry {
    pub key: TransientKey,
    /// Subexpression over the fixed vocabulary only
    pub expression: Vec<Node>,
    pub birth: usize,
    signature: String,
}

impl TransientEntry {
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

/// What a single `update` changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransientUpdate {
    pub retired: Vec<TransientKey>,
    pub renewed: Vec<TransientKey>,
    pub inserted: Vec<TransientKey>,
}

#[derive(Debug)]
pub struct TransientSet {
    arity: usize,
    lifespan: usize,
    max_candidate_height: usize,
    entries: BTreeMap<TransientKey, TransientEntry>,
    next_key: u64,
    scorer: Box<dyn CandidateScorer>,
}

impl TransientSet {
    pub fn new(arity: usize, lifespan: usize, scorer: Box<dyn CandidateScorer>) -> Self {
        Self {
            arity,
            lifespan,
            max_candidate_height: 4,
            entries: BTreeMap::new(),
            next_key: 0,
            scorer,
        }
    }

    pub fn from_config(config: &TransientConfig) -> Self {
        let scorer: Box<dyn CandidateScorer> = match config.scoring {
            ScoringMethod::Frequency => Box::new(FrequencyScorer),
            ScoringMethod::ImprovementWeighted => Box::new(ImprovementScorer),
        };
        Self::new(config.arity, config.lifespan, scorer)
            .with_max_candidate_height(config.max_candidate_height)
    }

    pub fn with_max_candidate_height(mut self, height: usize) -> Self {
        self.max_candidate_height = height;
        self
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn lifespan(&self) -> usize {
        self.lifespan
    }

    pub fn live_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: TransientKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn get(&self, key: TransientKey) -> Option<&TransientEntry> {
        self.entries.get(&key)
    }

    pub fn entries(&self) -> impl Iterator<Item = &TransientEntry> {
        self.entries.values()
    }

    /// Whether `key` is present and still inside its lifespan at `generation`
    pub fn is_live_at(&self, key: TransientKey, generation: usize) -> bool {
        self.entries
            .get(&key)
            .map(|e| generation >= e.birth && generation - e.birth < self.lifespan)
            .unwrap_or(false)
    }

    /// Keys usable by operators during `generation`
    pub fn live_keys_at(&self, generation: usize) -> Vec<TransientKey> {
        self.entries
            .keys()
            .copied()
            .filter(|&key| self.is_live_at(key, generation))
            .collect()
    }

    pub fn live_count_at(&self, generation: usize) -> usize {
        self.live_keys_at(generation).len()
    }

    /// Uniformly chosen key among those live at `generation`
    pub fn random_key<R: Rng>(&self, generation: usize, rng: &mut R) -> Option<TransientKey> {
        let live = self.live_keys_at(generation);
        if live.is_empty() {
            return None;
        }
        Some(live[rng.gen_range(0..live.len())])
    }

    /// Replaces every transient reference with its expression.
    /// Returns `None` if any reference is dangling.
    pub fn expand(&self, nodes: &[Node]) -> Option<Vec<Node>> {
        let mut expanded = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::Transient(key) => expanded.extend_from_slice(&self.entries.get(key)?.expression),
                other => expanded.push(*other),
            }
        }
        Some(expanded)
    }

    /// Like `expand`, but a reference to a retired entry becomes the constant 0.0
    pub fn resolve(&self, nodes: &[Node]) -> Vec<Node> {
        let mut resolved = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::Transient(key) => match self.entries.get(key) {
                    Some(entry) => resolved.extend_from_slice(&entry.expression),
                    None => {
                        log::trace!("dangling transient reference {} resolved to 0", key);
                        resolved.push(Node::Constant(0.0));
                    }
                },
                other => resolved.push(*other),
            }
        }
        resolved
    }

    /// Adds `expression` stamped with `generation` if there is room.
    /// Transient references inside it are expanded first.
    pub fn insert(&mut self, expression: &[Node], generation: usize) -> Option<TransientKey> {
        if self.entries.len() >= self.arity {
            return None;
        }
        let expression = self.expand(expression)?;
        let signature = ExpressionTree::new(expression.clone()).to_string();

        let key = TransientKey(self.next_key);
        self.next_key += 1;
        self.entries.insert(
            key,
            TransientEntry {
                key,
                expression,
                birth: generation,
                signature,
            },
        );
        Some(key)
    }

    /// Drops every entry that is no longer live at `generation`
    pub fn retire(&mut self, generation: usize) -> Vec<TransientKey> {
        let lifespan = self.lifespan;
        let expired: Vec<TransientKey> = self
            .entries
            .values()
            .filter(|e| generation.saturating_sub(e.birth) >= lifespan)
            .map(|e| e.key)
            .collect();

        for key in &expired {
            self.entries.remove(key);
        }
        expired
    }

    /// End-of-generation refresh: retire the entries that cannot serve the next
    /// generation, then renew or insert the best-scoring subexpressions mined
    /// from `population`.
    ///
    /// Afterwards every entry is live at `generation + 1`.
    pub fn update(&mut self, population: &[Individual], generation: usize) -> TransientUpdate {
        let retired = self.retire(generation + 1);

        let mut candidates = self.mine(population, generation);
        candidates.sort_by(|a, b| {
            b.2.partial_cmp(&a.2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        let mut renewed = Vec::new();
        let mut inserted = Vec::new();

        for (signature, expression, _) in candidates {
            let existing = self
                .entries
                .values()
                .find(|e| e.signature == signature)
                .map(|e| e.key);

            match existing {
                Some(key) => {
                    if let Some(entry) = self.entries.get_mut(&key) {
                        entry.birth = generation;
                    }
                    renewed.push(key);
                }
                None => {
                    if let Some(key) = self.insert(&expression, generation) {
                        inserted.push(key);
                    }
                }
            }
        }

        let update = TransientUpdate {
            retired,
            renewed,
            inserted,
        };
        log::debug!(
            "Transient set at generation {}: {} live, {:?}",
            generation,
            self.live_count(),
            update
        );
        update
    }

    /// Groups the subtrees that improved their carriers, scored by the configured scorer
    fn mine(&self, population: &[Individual], generation: usize) -> Vec<(String, Vec<Node>, f64)> {
        let mut grouped: HashMap<String, (Vec<Node>, CandidateStats)> = HashMap::new();

        for individual in population {
            if individual.lineage.generation != generation {
                continue;
            }
            let (Some(before), Some(after), Some(introduced)) = (
                individual.lineage.fitness,
                individual.fitness,
                individual.lineage.introduced.as_ref(),
            ) else {
                continue;
            };
            if !(after.error < before.error) {
                continue;
            }

            let Some(expression) = self.expand(introduced) else {
                continue;
            };
            if expression.len() < 2 || height_of(&expression) > self.max_candidate_height {
                continue;
            }

            let improvement = if before.error.is_finite() && before.error > 0.0 {
                (before.error - after.error) / before.error
            } else {
                1.0
            };

            let signature = ExpressionTree::new(expression.clone()).to_string();
            let (_, stats) = grouped.entry(signature).or_insert_with(|| {
                (
                    expression,
                    CandidateStats {
                        occurrences: 0,
                        total_improvement: 0.0,
                        best_error: f64::INFINITY,
                    },
                )
            });
            stats.occurrences += 1;
            stats.total_improvement += improvement;
            stats.best_error = stats.best_error.min(after.error);
        }

        grouped
            .into_iter()
            .map(|(signature, (expression, stats))| {
                let score = self.scorer.score(&stats);
                (signature, expression, score)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::primitives::BinaryOp;
    use crate::types::Fitness;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn expr() -> Vec<Node> {
        vec![Node::Binary(BinaryOp::Mul), Node::Feature(0), Node::Feature(1)]
    }

    fn improved(introduced: Vec<Node>, generation: usize, before: f64, after: f64) -> Individual {
        let mut ind = Individual::new(ExpressionTree::new(vec![Node::Feature(0)]));
        ind.fitness = Some(Fitness::new(before, 1.0));
        ind.stamp_lineage(generation);
        ind.lineage.introduced = Some(introduced);
        ind.fitness = Some(Fitness::new(after, 3.0));
        ind
    }

    #[test]
    fn test_lifespan_window() {
        let mut set = TransientSet::new(2, 2, Box::new(FrequencyScorer));
        let key = set.insert(&expr(), 3).unwrap();

        assert!(set.is_live_at(key, 3));
        assert!(set.is_live_at(key, 4));
        assert!(!set.is_live_at(key, 5));

        assert!(set.retire(4).is_empty());
        assert_eq!(set.retire(5), vec![key]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_insert_respects_arity() {
        let mut set = TransientSet::new(1, 5, Box::new(FrequencyScorer));
        assert!(set.insert(&expr(), 0).is_some());
        assert!(set.insert(&expr(), 0).is_none());
        assert_eq!(set.live_count(), 1);
    }

    #[test]
    fn test_keys_are_never_reused() {
        let mut set = TransientSet::new(1, 1, Box::new(FrequencyScorer));
        let first = set.insert(&expr(), 0).unwrap();
        set.retire(1);
        let second = set.insert(&expr(), 1).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_update_mines_improving_subtrees() {
        let mut set = TransientSet::new(1, 5, Box::new(ImprovementScorer));
        let population = vec![improved(expr(), 2, 1.0, 0.5), improved(expr(), 2, 1.0, 0.9)];

        let update = set.update(&population, 2);
        assert_eq!(update.inserted.len(), 1);
        let entry = set.get(update.inserted[0]).unwrap();
        assert_eq!(entry.expression, expr());
        assert_eq!(entry.birth, 2);
    }

    #[test]
    fn test_update_ignores_regressions_and_bare_terminals() {
        let mut set = TransientSet::new(3, 5, Box::new(FrequencyScorer));
        let population = vec![
            improved(expr(), 1, 0.5, 0.7),
            improved(vec![Node::Feature(1)], 1, 1.0, 0.1),
        ];

        let update = set.update(&population, 1);
        assert!(update.inserted.is_empty());
        assert!(set.is_empty());
    }

    #[test]
    fn test_update_retires_entries_that_cannot_serve_next_generation() {
        let mut set = TransientSet::new(1, 2, Box::new(FrequencyScorer));
        let key = set.insert(&expr(), 3).unwrap();

        assert!(set.update(&[], 3).retired.is_empty());
        assert_eq!(set.live_keys_at(4), vec![key]);

        assert_eq!(set.update(&[], 4).retired, vec![key]);
        assert_eq!(set.live_count_at(5), 0);
    }

    #[test]
    fn test_random_key_skips_expired_entries() {
        let mut set = TransientSet::new(2, 2, Box::new(FrequencyScorer));
        let old = set.insert(&expr(), 0).unwrap();
        let young = set.insert(&expr(), 1).unwrap();
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..20 {
            assert_eq!(set.random_key(2, &mut rng), Some(young));
        }
        assert!(set.contains(old));
        assert_eq!(set.random_key(3, &mut rng), None);
    }

    #[test]
    fn test_resolve_zeroes_dangling() {
        let mut set = TransientSet::new(1, 3, Box::new(FrequencyScorer));
        let key = set.insert(&expr(), 0).unwrap();
        let nodes = [Node::Binary(BinaryOp::Add), Node::Transient(key), Node::Transient(TransientKey(9))];

        let mut expected = vec![Node::Binary(BinaryOp::Add)];
        expected.extend(expr());
        expected.push(Node::Constant(0.0));
        assert_eq!(set.resolve(&nodes), expected);
    }

    #[test]
    fn test_remined_entry_is_renewed() {
        let mut set = TransientSet::new(1, 3, Box::new(FrequencyScorer));
        let key = set.insert(&expr(), 0).unwrap();

        let population = vec![improved(vec![Node::Transient(key)], 1, 1.0, 0.2)];
        let update = set.update(&population, 1);

        assert_eq!(update.renewed, vec![key]);
        assert_eq!(set.get(key).unwrap().birth, 1);
        assert!(set.is_live_at(key, 2));
    }

    #[test]
    fn test_expand_rejects_dangling() {
        let set = TransientSet::new(1, 1, Box::new(FrequencyScorer));
        assert!(set.expand(&[Node::Transient(TransientKey(9))]).is_none());
    }
}
