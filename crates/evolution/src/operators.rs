//! Selection, crossover and mutation operators.
//!
//! Every operator takes the random source explicitly so a seeded run is
//! reproducible end to end.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use tuner_core::Individual;

/// Pick `count` parents by tournament.
///
/// Each tournament samples `tournament_size` individuals with replacement and
/// keeps the fittest; the first one wins ties. Winners are cloned, so the
/// same individual may be chosen several times.
pub fn tournament_select<R: Rng + ?Sized>(
    population: &[Individual],
    count: usize,
    tournament_size: usize,
    rng: &mut R,
) -> Vec<Individual> {
    if population.is_empty() {
        return Vec::new();
    }

    (0..count)
        .map(|_| {
            let mut winner = &population[rng.gen_range(0..population.len())];
            for _ in 1..tournament_size {
                let candidate = &population[rng.gen_range(0..population.len())];
                if candidate.fitness_or_worst() > winner.fitness_or_worst() {
                    winner = candidate;
                }
            }
            winner.clone()
        })
        .collect()
}

/// Blend crossover (BLX-α) applied gene by gene.
///
/// For each position a fresh `γ = (1 + 2α)·u − α` with `u ~ U[0, 1)` gives
/// `c1 = (1 − γ)·x1 + γ·x2` and `c2 = γ·x1 + (1 − γ)·x2`. With `α > 0` the
/// children may land outside the parents' segment. Both fitnesses are
/// invalidated.
pub fn blend_crossover<R: Rng + ?Sized>(
    first: &mut Individual,
    second: &mut Individual,
    alpha: f64,
    rng: &mut R,
) {
    for (x1, x2) in first.genes.iter_mut().zip(second.genes.iter_mut()) {
        let gamma = (1.0 + 2.0 * alpha) * rng.gen::<f64>() - alpha;
        let (a, b) = (*x1, *x2);
        *x1 = (1.0 - gamma) * a + gamma * b;
        *x2 = gamma * a + (1.0 - gamma) * b;
    }
    first.invalidate();
    second.invalidate();
}

/// Gaussian mutation: each gene independently receives `N(0, σ)` noise with
/// probability `gene_probability`. The fitness is invalidated.
pub fn gaussian_mutate<R: Rng + ?Sized>(
    individual: &mut Individual,
    noise: &Normal<f64>,
    gene_probability: f64,
    rng: &mut R,
) {
    for gene in individual.genes.iter_mut() {
        if rng.gen::<f64>() < gene_probability {
            *gene += noise.sample(rng);
        }
    }
    individual.invalidate();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scored(genes: Vec<f64>, fitness: f64) -> Individual {
        Individual { genes, fitness: Some(fitness) }
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let population = vec![
            scored(vec![0.0], -10.0),
            scored(vec![1.0], -1.0),
            scored(vec![2.0], -5.0),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let parents = tournament_select(&population, 300, 3, &mut rng);
        assert_eq!(parents.len(), 300);

        let best = parents.iter().filter(|p| p.genes == vec![1.0]).count();
        let worst = parents.iter().filter(|p| p.genes == vec![0.0]).count();
        assert!(best > worst);
        assert!(parents.iter().all(|p| p.is_evaluated()));
    }

    #[test]
    fn test_tournament_of_one_is_uniform_sampling() {
        let population = vec![scored(vec![0.0], 0.0), scored(vec![1.0], 100.0)];
        let mut rng = StdRng::seed_from_u64(2);
        let parents = tournament_select(&population, 200, 1, &mut rng);
        assert!(parents.iter().any(|p| p.genes == vec![0.0]));
    }

    #[test]
    fn test_blend_preserves_gene_sum_and_invalidates() {
        let mut a = scored(vec![0.0, 10.0, 4.0], 1.0);
        let mut b = scored(vec![1.0, -10.0, 4.0], 2.0);
        let mut rng = StdRng::seed_from_u64(3);
        blend_crossover(&mut a, &mut b, 0.5, &mut rng);

        assert!(!a.is_evaluated());
        assert!(!b.is_evaluated());
        // c1 + c2 == x1 + x2 for every gene
        assert!((a.genes[0] + b.genes[0] - 1.0).abs() < 1e-12);
        assert!((a.genes[1] + b.genes[1]).abs() < 1e-12);
        // identical parent genes stay put
        assert!((a.genes[2] - 4.0).abs() < 1e-12);
        assert!((b.genes[2] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_blend_can_extrapolate() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut outside = false;
        for _ in 0..200 {
            let mut a = scored(vec![0.0], 0.0);
            let mut b = scored(vec![1.0], 0.0);
            blend_crossover(&mut a, &mut b, 0.5, &mut rng);
            for g in a.genes.iter().chain(&b.genes) {
                assert!(*g >= -0.5 - 1e-12 && *g <= 1.5 + 1e-12);
                outside |= *g < 0.0 || *g > 1.0;
            }
        }
        assert!(outside);
    }

    #[test]
    fn test_mutation_probability_bounds() {
        let noise = Normal::new(0.0, 0.1).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        let mut untouched = scored(vec![1.0, 2.0], 3.0);
        gaussian_mutate(&mut untouched, &noise, 0.0, &mut rng);
        assert_eq!(untouched.genes, vec![1.0, 2.0]);
        assert!(!untouched.is_evaluated());

        let mut moved = scored(vec![1.0, 2.0], 3.0);
        gaussian_mutate(&mut moved, &noise, 1.0, &mut rng);
        assert_ne!(moved.genes[0], 1.0);
        assert_ne!(moved.genes[1], 2.0);
    }
}
