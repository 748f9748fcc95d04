use rand::rngs::ThreadRng;
use rand::Rng;

use crate::config::SelectionAlgorithm;

/// Picks one index out of `population_len` candidates, assumed sorted
/// descending by fitness already (index 0 = fittest).
///
/// `RouletteSelection` is modeled as a one-way tournament (spec.md 4.D.3),
/// so both strategies share the same sampling routine with `k` pinned to 1
/// for Roulette.
pub fn select(
    algorithm: SelectionAlgorithm,
    population_len: usize,
    k: usize,
    p: f64,
    rng: &mut ThreadRng,
) -> usize {
    let k = match algorithm {
        SelectionAlgorithm::Roulette => 1,
        SelectionAlgorithm::Tournament => k,
    };
    tournament_select(population_len, k, p, rng)
}

fn tournament_select(population_len: usize, k: usize, p: f64, rng: &mut ThreadRng) -> usize {
    let k = k.clamp(1, population_len.max(1));

    let mut sampled: Vec<usize> = if k >= population_len {
        (0..population_len).collect()
    } else {
        rand::seq::index::sample(rng, population_len, k).into_vec()
    };
    // Sampled indices into an already fitness-descending population are
    // themselves in fitness-descending order once re-sorted ascending.
    sampled.sort_unstable();

    let probs: Vec<f64> = (0..sampled.len())
        .map(|i| p * (1.0 - p).powi(i as i32))
        .collect();
    let total: f64 = probs.iter().sum();

    let chosen = if total <= 0.0 {
        0
    } else {
        let mut target = rng.gen::<f64>() * total;
        let mut chosen = probs.len() - 1;
        for (i, prob) in probs.iter().enumerate() {
            if target < *prob {
                chosen = i;
                break;
            }
            target -= prob;
        }
        chosen
    };

    sampled[chosen]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roulette_always_returns_a_valid_index() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let idx = select(SelectionAlgorithm::Roulette, 10, 3, 1.0, &mut rng);
            assert!(idx < 10);
        }
    }

    #[test]
    fn tournament_with_p_one_always_picks_the_fittest_sampled() {
        let mut rng = rand::thread_rng();
        // p = 1.0 collapses the weighted choice onto position 0 of the
        // sample, i.e. the fittest individual in the sampled pool.
        for _ in 0..50 {
            let idx = select(SelectionAlgorithm::Tournament, 20, 20, 1.0, &mut rng);
            assert_eq!(idx, 0);
        }
    }
}
