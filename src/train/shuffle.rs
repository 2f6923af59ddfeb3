use rand::Rng;

use crate::error::ConfigError;

/// Fisher–Yates shuffle applying the same permutation to both slices.
///
/// Element `i` of `a` and element `i` of `b` stay paired.
pub fn shuffle_pairs<A, B, R>(a: &mut [A], b: &mut [B], rng: &mut R) -> Result<(), ConfigError>
where
    R: Rng + ?Sized,
{
    if a.len() != b.len() {
        return Err(ConfigError::DatasetLength { inputs: a.len(), targets: b.len() });
    }
    for i in (1..a.len()).rev() {
        let j = rng.gen_range(0..=i);
        a.swap(i, j);
        b.swap(i, j);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn keeps_pairs_together() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut inputs: Vec<usize> = (0..100).collect();
        let mut targets: Vec<String> = inputs.iter().map(|i| format!("label-{i}")).collect();

        for _ in 0..5 {
            shuffle_pairs(&mut inputs, &mut targets, &mut rng).unwrap();
            for (i, t) in inputs.iter().zip(&targets) {
                assert_eq!(t, &format!("label-{i}"));
            }
        }

        let mut sorted = inputs.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..100).collect::<Vec<_>>());
        assert_ne!(inputs, sorted);
    }

    #[test]
    fn every_position_is_reachable() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut seen_first = [false; 4];
        for _ in 0..200 {
            let mut a = [0, 1, 2, 3];
            let mut b = [0, 1, 2, 3];
            shuffle_pairs(&mut a, &mut b, &mut rng).unwrap();
            seen_first[a[0]] = true;
        }
        assert!(seen_first.iter().all(|&s| s));
    }

    #[test]
    fn tiny_and_mismatched_inputs() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut empty: [u8; 0] = [];
        shuffle_pairs(&mut empty, &mut [0u8; 0], &mut rng).unwrap();
        let mut one = [5];
        shuffle_pairs(&mut one, &mut [6], &mut rng).unwrap();
        assert_eq!(one, [5]);
        assert!(shuffle_pairs(&mut [1, 2], &mut [1], &mut rng).is_err());
    }
}
