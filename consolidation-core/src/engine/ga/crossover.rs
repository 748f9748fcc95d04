use rand::rngs::ThreadRng;
use rand::Rng;

/// `child = father[0:cut] ++ mother[cut:N]` for a cut point sampled
/// uniformly in `[0, N]` (spec.md 4.D.3).
pub fn single_point(father: &[String], mother: &[String], rng: &mut ThreadRng) -> Vec<String> {
    debug_assert_eq!(father.len(), mother.len());
    let n = father.len();
    let cut = rng.gen_range(0..=n);
    let mut child = Vec::with_capacity(n);
    child.extend_from_slice(&father[..cut]);
    child.extend_from_slice(&mother[cut..]);
    child
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cut_at_zero_or_len_degenerates_to_one_parent() {
        let father: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        let mother: Vec<String> = vec!["x".into(), "y".into(), "z".into()];
        let mut rng = rand::thread_rng();
        let child = single_point(&father, &mother, &mut rng);
        assert_eq!(child.len(), 3);
        // every gene came from one parent or the other
        for (i, gene) in child.iter().enumerate() {
            assert!(gene == &father[i] || gene == &mother[i]);
        }
    }
}
