use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ttgp::engines::generation::selection::select_nsga2;
use ttgp::engines::generation::{ExpressionTree, Individual, ParetoArchive};
use ttgp::types::{Fitness, Node};

fn individual(id: usize, error: f64, complexity: f64) -> Individual {
    let mut ind = Individual::new(ExpressionTree::new(vec![Node::Constant(id as f64)]));
    ind.fitness = Some(Fitness::new(error, complexity));
    ind
}

fn random_population(rng: &mut StdRng, offset: usize, size: usize) -> Vec<Individual> {
    (0..size)
        .map(|i| {
            let error = (rng.gen_range(0..20) as f64) / 4.0;
            let complexity = rng.gen_range(1..30) as f64;
            individual(offset + i, error, complexity)
        })
        .collect()
}

#[test]
fn test_archive_stays_antichain_across_updates() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut archive = ParetoArchive::new();
    let mut seen: Vec<Individual> = Vec::new();

    for round in 0..10 {
        let population = random_population(&mut rng, round * 50, 50);
        archive.update(&population);
        seen.extend(population);

        let members = archive.members();
        for a in members {
            for b in members {
                assert!(!a.fitness.unwrap().dominates(&b.fitness.unwrap()));
            }
        }

        // Nothing seen so far dominates a member
        for member in members {
            assert!(seen
                .iter()
                .all(|s| !s.fitness.unwrap().dominates(&member.fitness.unwrap())));
        }

        let errors: Vec<f64> = members.iter().map(|m| m.fitness.unwrap().error).collect();
        assert!(errors.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn test_equal_objectives_kept_and_duplicates_skipped() {
    let mut archive = ParetoArchive::new();
    let first = individual(1, 0.5, 10.0);
    let second = individual(2, 0.5, 10.0);

    assert_eq!(archive.update(&[first.clone(), second]), 2);
    assert_eq!(archive.update(&[first]), 0);
    assert_eq!(archive.len(), 2);

    assert_eq!(archive.update(&[individual(3, 0.5, 9.0)]), 1);
    assert_eq!(archive.len(), 1);
}

#[test]
fn test_unevaluated_individuals_ignored() {
    let mut archive = ParetoArchive::new();
    let pending = Individual::new(ExpressionTree::new(vec![Node::Feature(0)]));
    assert_eq!(archive.update(&[pending]), 0);
    assert!(archive.is_empty());
}

#[test]
fn test_balanced_pick_normalises_over_population() {
    let mut archive = ParetoArchive::new();
    archive.update(&[individual(0, 0.0, 20.0), individual(1, 1.0, 2.0)]);

    // Archive only: both members sit at distance 1, the lower-error one wins
    assert_eq!(archive.balanced_pick(&[]).unwrap().fitness.unwrap().error, 0.0);

    // A very large individual stretches the complexity range
    let population = vec![individual(9, 10.0, 200.0)];
    let pick = archive.balanced_pick(&population).unwrap();
    assert_eq!(pick.fitness.unwrap().error, 0.0);

    // A very bad individual stretches the error range instead
    let population = vec![individual(9, 100.0, 2.0)];
    let pick = archive.balanced_pick(&population).unwrap();
    assert_eq!(pick.fitness.unwrap().error, 1.0);
}

#[test]
fn test_sentinel_members_never_picked_over_finite_ones() {
    let mut archive = ParetoArchive::new();
    archive.update(&[individual(0, 2.0, 9.0)]);
    let mut failed = individual(1, 0.0, 1.0);
    failed.fitness = Some(Fitness::sentinel(1.0));
    archive.update(&[failed]);

    assert_eq!(archive.len(), 2);
    assert_eq!(archive.balanced_pick(&[]).unwrap().fitness.unwrap().error, 2.0);
}

#[test]
fn test_nsga2_selection_keeps_population_size_and_members() {
    let mut rng = StdRng::seed_from_u64(17);
    let population = random_population(&mut rng, 0, 40);

    let selected = select_nsga2(&population, 40, &mut rng);
    assert_eq!(selected.len(), 40);
    assert!(selected.iter().all(|s| population.iter().any(|p| p == s)));

    // Winners come out best-first, so no later winner dominates the head
    let head = selected[0].fitness.unwrap();
    assert!(selected.iter().all(|s| !s.fitness.unwrap().dominates(&head)));
}
