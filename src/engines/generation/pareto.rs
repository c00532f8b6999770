/// Pareto optimization utilities for multi-objective evolution
/// Implements NSGA-II style fast non-dominated sorting and crowding distance.
/// Every objective is minimised.

use std::cmp::Ordering;

/// Individual with multiple objective values
#[derive(Debug, Clone)]
pub struct MultiObjectiveIndividual<T> {
    pub data: T,
    pub objectives: Vec<f64>,
    pub rank: usize,           // Pareto rank (0 = best frontier)
    pub crowding_distance: f64, // Diversity measure
}

impl<T> MultiObjectiveIndividual<T> {
    pub fn new(data: T, objectives: Vec<f64>) -> Self {
        Self {
            data,
            objectives,
            rank: 0,
            crowding_distance: 0.0,
        }
    }
}

/// Check if A dominates B
/// A dominates B if A is no worse than B in all objectives and strictly better in at least one
pub fn dominates(a_objectives: &[f64], b_objectives: &[f64]) -> bool {
    if a_objectives.len() != b_objectives.len() {
        return false;
    }

    let mut at_least_one_better = false;

    for (a_val, b_val) in a_objectives.iter().zip(b_objectives) {
        if b_val < a_val {
            return false;
        }
        if a_val < b_val {
            at_least_one_better = true;
        }
    }

    at_least_one_better
}

/// Fast non-dominated sorting (NSGA-II algorithm)
/// Returns individuals grouped by Pareto front (0 = best, 1 = second best, etc.)
pub fn fast_non_dominated_sort<T>(individuals: &mut [MultiObjectiveIndividual<T>]) -> Vec<Vec<usize>> {
    let n = individuals.len();

    // domination_count: how many individuals dominate it
    // dominated_solutions: indices of individuals it dominates
    let mut domination_count = vec![0usize; n];
    let mut dominated_solutions: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut fronts: Vec<Vec<usize>> = Vec::new();

    let mut first_front = Vec::new();

    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }

            if dominates(&individuals[i].objectives, &individuals[j].objectives) {
                dominated_solutions[i].push(j);
            } else if dominates(&individuals[j].objectives, &individuals[i].objectives) {
                domination_count[i] += 1;
            }
        }

        if domination_count[i] == 0 {
            individuals[i].rank = 0;
            first_front.push(i);
        }
    }

    fronts.push(first_front);

    let mut front_index = 0;
    while front_index < fronts.len() && !fronts[front_index].is_empty() {
        let mut next_front = Vec::new();

        for &i in &fronts[front_index] {
            for &j in &dominated_solutions[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    individuals[j].rank = front_index + 1;
                    next_front.push(j);
                }
            }
        }

        if !next_front.is_empty() {
            fronts.push(next_front);
        }
        front_index += 1;
    }

    fronts
}

/// Calculate crowding distance for individuals in a front
/// Higher values indicate more diversity (isolated individuals)
pub fn calculate_crowding_distance<T>(
    individuals: &mut [MultiObjectiveIndividual<T>],
    front_indices: &[usize],
) {
    let front_size = front_indices.len();

    if front_size <= 2 {
        // Boundary solutions have infinite crowding distance
        for &idx in front_indices {
            individuals[idx].crowding_distance = f64::INFINITY;
        }
        return;
    }

    let num_objectives = individuals[front_indices[0]].objectives.len();

    for &idx in front_indices {
        individuals[idx].crowding_distance = 0.0;
    }

    for obj in 0..num_objectives {
        let mut sorted_indices: Vec<usize> = front_indices.to_vec();
        sorted_indices.sort_by(|&a, &b| {
            individuals[a].objectives[obj]
                .partial_cmp(&individuals[b].objectives[obj])
                .unwrap_or(Ordering::Equal)
        });

        individuals[sorted_indices[0]].crowding_distance = f64::INFINITY;
        individuals[sorted_indices[front_size - 1]].crowding_distance = f64::INFINITY;

        let min_val = individuals[sorted_indices[0]].objectives[obj];
        let max_val = individuals[sorted_indices[front_size - 1]].objectives[obj];
        let range = max_val - min_val;

        // Constant objective, or sentinel values in play
        if !range.is_finite() || range.abs() < 1e-10 {
            continue;
        }

        for i in 1..(front_size - 1) {
            let idx = sorted_indices[i];
            let prev_val = individuals[sorted_indices[i - 1]].objectives[obj];
            let next_val = individuals[sorted_indices[i + 1]].objectives[obj];

            individuals[idx].crowding_distance += (next_val - prev_val) / range;
        }
    }
}

/// Ranks and crowding distances for a set of objective vectors
pub fn rank_and_crowd<T>(individuals: &mut [MultiObjectiveIndividual<T>]) {
    let fronts = fast_non_dominated_sort(individuals);
    for front in &fronts {
        calculate_crowding_distance(individuals, front);
    }
}

/// Crowded comparison operator: lower rank first, then larger crowding distance.
/// `Ordering::Less` means `a` is preferred.
pub fn crowded_ordering<T>(a: &MultiObjectiveIndividual<T>, b: &MultiObjectiveIndividual<T>) -> Ordering {
    a.rank.cmp(&b.rank).then_with(|| {
        b.crowding_distance
            .partial_cmp(&a.crowding_distance)
            .unwrap_or(Ordering::Equal)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominance_minimize() {
        // A is better in both objectives
        assert!(dominates(&[1.0, 2.0], &[5.0, 10.0]));

        // A is better in one, equal in other
        assert!(dominates(&[1.0, 10.0], &[5.0, 10.0]));

        // A is better in one, worse in other - no dominance
        assert!(!dominates(&[1.0, 15.0], &[5.0, 10.0]));

        // Equal in both - no dominance either way
        assert!(!dominates(&[0.5, 10.0], &[0.5, 10.0]));
    }

    #[test]
    fn test_sentinel_is_dominated() {
        assert!(dominates(&[0.3, 5.0], &[f64::INFINITY, 5.0]));
        assert!(!dominates(&[f64::INFINITY, 5.0], &[f64::INFINITY, 5.0]));
    }

    #[test]
    fn test_fast_non_dominated_sort() {
        let mut individuals = vec![
            MultiObjectiveIndividual::new(0, vec![1.0, 5.0]), // Front 0
            MultiObjectiveIndividual::new(1, vec![3.0, 3.0]), // Front 0
            MultiObjectiveIndividual::new(2, vec![5.0, 1.0]), // Front 0
            MultiObjectiveIndividual::new(3, vec![4.0, 4.0]), // Front 1
            MultiObjectiveIndividual::new(4, vec![5.0, 5.0]), // Front 2
        ];

        let fronts = fast_non_dominated_sort(&mut individuals);

        assert_eq!(fronts.len(), 3);
        assert_eq!(fronts[0].len(), 3);
        assert_eq!(individuals[0].rank, 0);
        assert_eq!(individuals[1].rank, 0);
        assert_eq!(individuals[2].rank, 0);
        assert_eq!(individuals[3].rank, 1);
        assert_eq!(individuals[4].rank, 2);
    }

    #[test]
    fn test_crowding_distance() {
        let mut individuals = vec![
            MultiObjectiveIndividual::new(0, vec![1.0, 5.0]),
            MultiObjectiveIndividual::new(1, vec![3.0, 3.0]),
            MultiObjectiveIndividual::new(2, vec![5.0, 1.0]),
        ];

        rank_and_crowd(&mut individuals);

        assert!(individuals[0].crowding_distance.is_infinite());
        assert!(individuals[2].crowding_distance.is_infinite());
        assert!((individuals[1].crowding_distance - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_crowded_ordering() {
        let mut a = MultiObjectiveIndividual::new((), vec![]);
        let mut b = MultiObjectiveIndividual::new((), vec![]);
        a.rank = 0;
        b.rank = 1;
        assert_eq!(crowded_ordering(&a, &b), Ordering::Less);

        b.rank = 0;
        a.crowding_distance = 0.5;
        b.crowding_distance = 1.5;
        assert_eq!(crowded_ordering(&a, &b), Ordering::Greater);
    }
}
