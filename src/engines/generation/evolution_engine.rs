use crate::config::evolution::{Algorithm, EvolutionConfig};
use crate::config::traits::ConfigSection;
use crate::config::transient::TransientConfig;
use crate::engines::evaluation::FitnessEvaluator;
use crate::engines::generation::{
    archive::ParetoArchive,
    init::gen_half_and_half,
    logbook::{GenerationRecord, Logbook, PopulationStats},
    operators::{crossover, mutate, transient_mutate},
    selection::{select_nsga2, select_tournament},
    transient::TransientSet,
    tree::{ExpressionTree, Individual},
};
use crate::error::{Result, TtgpError};
use crate::functions::registry::Vocabulary;
use crate::types::Fitness;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::sync::Arc;

/// Where the driver currently is in its generation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Init,
    Evaluating(usize),
    Seeded,
    Evolving(usize),
    Archiving(usize),
    Aging(usize),
    Done,
}

pub trait ProgressCallback {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, record: &GenerationRecord);
}

/// How many operator applications changed a tree during one generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatorCounts {
    pub crossovers: usize,
    pub mutations: usize,
    pub transient_mutations: usize,
}

/// Next-generation population before evaluation
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Operated candidates followed by the untouched elites
    pub population: Vec<Individual>,
    /// The elites are the last `elite_count` members of `population`
    pub elite_count: usize,
    pub operators: OperatorCounts,
}

impl GenerationOutcome {
    pub fn elites(&self) -> &[Individual] {
        &self.population[self.population.len() - self.elite_count..]
    }
}

/// Final result of a run. Every tree is self-contained: transient references
/// are inlined, so the models stay usable after their entries retire.
/// Fitness complexity is the size recorded during evolution, where a transient
/// reference counted as one node.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Lowest-error archive member
    pub best: Individual,
    /// Balanced archive member (TTGP) or `best` (SGP)
    pub representative: Individual,
    pub archive: Vec<Individual>,
    /// Last generation with live references inlined and retired ones as 0.0
    pub population: Vec<Individual>,
    pub logbook: Logbook,
}

pub struct EvolutionEngine<E: FitnessEvaluator> {
    config: EvolutionConfig,
    vocabulary: Arc<Vocabulary>,
    evaluator: E,
    test_evaluator: Option<E>,
    archive: ParetoArchive,
    transient: TransientSet,
    state: EngineState,
    rng: StdRng,
}

impl<E: FitnessEvaluator> EvolutionEngine<E> {
    pub fn new(
        config: EvolutionConfig,
        transient_config: &TransientConfig,
        vocabulary: Arc<Vocabulary>,
        evaluator: E,
    ) -> Result<Self> {
        config.validate()?;
        transient_config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            vocabulary,
            evaluator,
            test_evaluator: None,
            archive: ParetoArchive::new(),
            transient: TransientSet::from_config(transient_config),
            state: EngineState::Init,
            rng,
        })
    }

    /// Evaluator used for the per-generation representative error
    pub fn with_test_evaluator(mut self, evaluator: E) -> Self {
        self.test_evaluator = Some(evaluator);
        self
    }

    /// Replaces the transient set, e.g. to start from pre-seeded entries
    pub fn with_transient_set(mut self, transient: TransientSet) -> Self {
        self.transient = transient;
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn archive(&self) -> &ParetoArchive {
        &self.archive
    }

    pub fn transient(&self) -> &TransientSet {
        &self.transient
    }

    fn enter(&mut self, state: EngineState) {
        log::debug!("{:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Run the evolution process
    pub fn run<C: ProgressCallback>(&mut self, mut callback: C) -> Result<RunOutcome> {
        let mut logbook = Logbook::new();

        self.enter(EngineState::Init);
        callback.on_generation_start(0);
        let mut population = self.initialize_population();

        self.enter(EngineState::Evaluating(0));
        let evaluations = self.evaluate_invalid(&mut population)?;

        self.enter(EngineState::Seeded);
        self.archive_population(&population);
        let mut resolved = self.resolve_population(&population);

        let record = self.record(0, evaluations, &population);
        callback.on_generation_complete(&record);
        logbook.record(record);

        for generation in 1..self.config.generations {
            callback.on_generation_start(generation);

            self.enter(EngineState::Evolving(generation));
            let mut next = self.evolve_generation(&population, generation).population;

            self.enter(EngineState::Evaluating(generation));
            let evaluations = self.evaluate_invalid(&mut next)?;

            self.enter(EngineState::Archiving(generation));
            population = next;
            self.archive_population(&population);
            resolved = self.resolve_population(&population);

            if self.config.algorithm == Algorithm::Ttgp {
                self.enter(EngineState::Aging(generation));
                self.transient.update(&population, generation);
            }

            let record = self.record(generation, evaluations, &population);
            callback.on_generation_complete(&record);
            logbook.record(record);
        }

        self.enter(EngineState::Done);

        let best = self
            .archive
            .best()
            .cloned()
            .ok_or_else(|| TtgpError::Evaluation("archive is empty after evolution".to_string()))?;
        let representative = self.representative(&population).unwrap_or(&best).clone();

        Ok(RunOutcome {
            best,
            representative,
            archive: self.archive.members().to_vec(),
            population: resolved,
            logbook,
        })
    }

    /// Ramped half-and-half population of `population_size` trees
    pub fn initialize_population(&mut self) -> Vec<Individual> {
        (0..self.config.population_size)
            .map(|_| {
                Individual::new(gen_half_and_half(
                    &self.vocabulary,
                    self.config.init_min_depth,
                    self.config.init_max_depth,
                    &mut self.rng,
                ))
            })
            .collect()
    }

    /// Evaluates every individual without a valid fitness, in population order.
    ///
    /// Individuals that fail with a recoverable error get the sentinel
    /// fitness; contract violations abort. Returns the number evaluated.
    pub fn evaluate_invalid(&self, population: &mut [Individual]) -> Result<usize> {
        let pending: Vec<usize> = population
            .iter()
            .enumerate()
            .filter(|(_, ind)| !ind.is_valid())
            .map(|(i, _)| i)
            .collect();

        let evaluator = &self.evaluator;
        let transient = &self.transient;
        let snapshot: &[Individual] = population;

        let results: Vec<Result<Fitness>> = if self.config.parallel_evaluation {
            pending
                .par_iter()
                .map(|&i| evaluator.evaluate(&snapshot[i].tree, transient))
                .collect()
        } else {
            pending
                .iter()
                .map(|&i| evaluator.evaluate(&snapshot[i].tree, transient))
                .collect()
        };

        for (&i, result) in pending.iter().zip(results) {
            let individual = &mut population[i];
            let fitness = match result {
                Ok(fitness) => fitness,
                Err(e) if e.is_recoverable() => {
                    log::warn!("Assigning worst fitness to {}: {}", individual.tree, e);
                    Fitness::sentinel(individual.tree.size() as f64)
                }
                Err(e) => return Err(e),
            };
            individual.fitness = Some(fitness);
        }

        Ok(pending.len())
    }

    /// Selection, lineage stamping, elitism and operator application for one
    /// generation. The transient set is only read here.
    pub fn evolve_generation(&mut self, population: &[Individual], generation: usize) -> GenerationOutcome {
        let size = population.len();
        let mut candidates = match self.config.algorithm {
            Algorithm::Ttgp => select_nsga2(population, size, &mut self.rng),
            Algorithm::Sgp => select_tournament(population, size, self.config.tournament_size, &mut self.rng),
        };

        for candidate in candidates.iter_mut() {
            candidate.stamp_lineage(generation);
        }

        let elite_count = self.config.elite_count().min(candidates.len());
        let elites: Vec<Individual> = candidates.drain(..elite_count).collect();

        let mut counts = OperatorCounts::default();

        for pair in candidates.chunks_mut(2) {
            if let [first, second] = pair {
                if self.rng.gen::<f64>() < self.config.crossover_rate {
                    let (a, b) = crossover(first, second, &mut self.rng);
                    counts.crossovers += usize::from(a) + usize::from(b);
                }
            }
        }

        // Frozen for the whole pass; the set only changes during aging
        let transient_enabled =
            self.config.algorithm == Algorithm::Ttgp && self.transient.live_count_at(generation) > 0;

        for candidate in candidates.iter_mut() {
            if self.rng.gen::<f64>() < self.config.mutation_rate
                && mutate(candidate, &self.vocabulary, &mut self.rng)
            {
                counts.mutations += 1;
            }
            if transient_enabled
                && self.rng.gen::<f64>() < self.config.transient_mutation_rate
                && transient_mutate(candidate, &self.vocabulary, &self.transient, generation, &mut self.rng)
            {
                counts.transient_mutations += 1;
            }
        }

        candidates.extend(elites);

        GenerationOutcome {
            population: candidates,
            elite_count,
            operators: counts,
        }
    }

    /// Offers the population to the archive with transient references inlined.
    /// An individual still holding a reference to a retired entry was scored
    /// against an expression that is gone, so it is left out.
    fn archive_population(&mut self, population: &[Individual]) {
        let expanded: Vec<Individual> = population
            .iter()
            .filter_map(|ind| {
                let nodes = self.transient.expand(ind.tree.nodes())?;
                Some(Individual {
                    tree: ExpressionTree::new(nodes),
                    ..ind.clone()
                })
            })
            .collect();

        let skipped = population.len() - expanded.len();
        if skipped > 0 {
            log::trace!("{} individuals with retired transient references kept out of the archive", skipped);
        }
        self.archive.update(&expanded);
    }

    fn resolve_population(&self, population: &[Individual]) -> Vec<Individual> {
        population
            .iter()
            .map(|ind| Individual {
                tree: ExpressionTree::new(self.transient.resolve(ind.tree.nodes())),
                ..ind.clone()
            })
            .collect()
    }

    fn representative<'a>(&'a self, population: &[Individual]) -> Option<&'a Individual> {
        match self.config.algorithm {
            Algorithm::Ttgp => self.archive.balanced_pick(population),
            Algorithm::Sgp => self.archive.best(),
        }
    }

    fn record(&self, generation: usize, evaluations: usize, population: &[Individual]) -> GenerationRecord {
        let stats = PopulationStats::compile(population);

        let (representative_error, representative_size) = match self.representative(population) {
            Some(rep) => {
                let evaluator = self.test_evaluator.as_ref().unwrap_or(&self.evaluator);
                let error = evaluator
                    .evaluate(&rep.tree, &self.transient)
                    .map(|f| f.error)
                    .unwrap_or(f64::INFINITY);
                (error, rep.tree.size())
            }
            None => (f64::INFINITY, 0),
        };

        GenerationRecord {
            generation,
            evaluations,
            representative_error,
            representative_size,
            min_error: stats.min_error,
            mean_error: stats.mean_error,
            max_error: stats.max_error,
            mean_size: stats.mean_size,
            archive_size: self.archive.len(),
            transient_live: self.transient.live_count(),
        }
    }
}
