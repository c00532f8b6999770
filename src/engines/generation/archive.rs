use crate::engines::generation::tree::Individual;
use crate::types::Fitness;
use std::cmp::Ordering;

/// Unbounded archive of every non-dominated individual seen so far.
///
/// Members are kept sorted by error, then complexity, so the first member is
/// always the lowest-error solution.
#[derive(Debug, Clone, Default)]
pub struct ParetoArchive {
    members: Vec<Individual>,
}

impl ParetoArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts every evaluated individual not dominated by the archive, then
    /// strips members dominated by the newcomers. Exact twins (same tree and
    /// fitness) are skipped. Returns how many individuals were inserted.
    pub fn update(&mut self, population: &[Individual]) -> usize {
        let mut inserted = 0;

        for candidate in population {
            let Some(fitness) = candidate.fitness else {
                continue;
            };

            let dominated = self
                .members
                .iter()
                .any(|m| member_fitness(m).dominates(&fitness));
            if dominated || self.members.iter().any(|m| m.is_twin(candidate)) {
                continue;
            }

            self.members
                .retain(|m| !fitness.dominates(&member_fitness(m)));
            self.members.push(candidate.clone());
            inserted += 1;
        }

        self.members.sort_by(|a, b| {
            let (fa, fb) = (member_fitness(a), member_fitness(b));
            fa.error
                .partial_cmp(&fb.error)
                .unwrap_or(Ordering::Equal)
                .then_with(|| fa.complexity.partial_cmp(&fb.complexity).unwrap_or(Ordering::Equal))
        });

        inserted
    }

    /// Lowest-error member
    pub fn best(&self) -> Option<&Individual> {
        self.members.first()
    }

    /// Member closest to the ideal (min error, min complexity) corner.
    ///
    /// Objectives are normalised to [0, 1] over the archive and `population`
    /// together; the member with the smallest largest normalised component
    /// wins, ties going to the earlier (lower-error) member.
    pub fn balanced_pick(&self, population: &[Individual]) -> Option<&Individual> {
        let fitnesses: Vec<Fitness> = self
            .members
            .iter()
            .chain(population)
            .filter_map(|ind| ind.fitness)
            .collect();

        let bounds = |select: fn(&Fitness) -> f64| {
            fitnesses
                .iter()
                .map(select)
                .filter(|v| v.is_finite())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
        };
        let error_bounds = bounds(|f| f.error);
        let size_bounds = bounds(|f| f.complexity);

        let normalise = |value: f64, (lo, hi): (f64, f64)| {
            if !value.is_finite() {
                f64::INFINITY
            } else if hi > lo {
                (value - lo) / (hi - lo)
            } else {
                0.0
            }
        };

        let mut best: Option<(&Individual, f64)> = None;
        for member in &self.members {
            let fitness = member_fitness(member);
            let distance = normalise(fitness.error, error_bounds).max(normalise(fitness.complexity, size_bounds));
            match best {
                Some((_, current)) if distance >= current => {}
                _ => best = Some((member, distance)),
            }
        }

        best.map(|(member, _)| member)
    }

    pub fn members(&self) -> &[Individual] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

fn member_fitness(member: &Individual) -> Fitness {
    member
        .fitness
        .unwrap_or_else(|| Fitness::sentinel(member.tree.size() as f64))
}
