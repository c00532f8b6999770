use crate::engines::generation::pareto::{self, MultiObjectiveIndividual};
use crate::engines::generation::tree::Individual;
use crate::types::Fitness;
use rand::Rng;
use std::cmp::Ordering;

fn fitness_of(individual: &Individual) -> Fitness {
    individual
        .fitness
        .unwrap_or_else(|| Fitness::sentinel(individual.tree.size() as f64))
}

/// NSGA-II selection: `n` binary tournaments on (rank, crowding distance).
///
/// Winners are returned as independent clones, stably ordered best-first, so
/// the head of the returned list is the best-ranked part of the selection.
pub fn select_nsga2<R: Rng>(population: &[Individual], n: usize, rng: &mut R) -> Vec<Individual> {
    if population.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<MultiObjectiveIndividual<usize>> = population
        .iter()
        .enumerate()
        .map(|(i, ind)| MultiObjectiveIndividual::new(i, fitness_of(ind).objectives().to_vec()))
        .collect();
    pareto::rank_and_crowd(&mut ranked);

    let mut winners: Vec<usize> = (0..n)
        .map(|_| {
            let a = rng.gen_range(0..ranked.len());
            let b = rng.gen_range(0..ranked.len());
            match pareto::crowded_ordering(&ranked[a], &ranked[b]) {
                Ordering::Less => a,
                Ordering::Greater => b,
                Ordering::Equal => a.min(b),
            }
        })
        .collect();

    winners.sort_by(|&a, &b| pareto::crowded_ordering(&ranked[a], &ranked[b]));

    winners.into_iter().map(|i| population[i].clone()).collect()
}

/// Tournament selection on error alone: pick best of K random candidates, `n` times
pub fn select_tournament<R: Rng>(
    population: &[Individual],
    n: usize,
    tournament_size: usize,
    rng: &mut R,
) -> Vec<Individual> {
    if population.is_empty() {
        return Vec::new();
    }

    (0..n)
        .map(|_| {
            let mut best_idx = rng.gen_range(0..population.len());
            let mut best_error = fitness_of(&population[best_idx]).error;

            for _ in 1..tournament_size.max(1) {
                let idx = rng.gen_range(0..population.len());
                let error = fitness_of(&population[idx]).error;
                if error < best_error {
                    best_idx = idx;
                    best_error = error;
                }
            }

            population[best_idx].clone()
        })
        .collect()
}
