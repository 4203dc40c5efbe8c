use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    dataset::Dataset,
    error::{Result, TrainErr},
};

/// Shuffles the rows with a seeded generator and holds out a test partition.
///
/// The first `ceil(len * test_size)` shuffled rows form the test partition,
/// the rest the training one. The same dataset, size and seed always produce
/// the same partitions.
///
/// # Returns
/// `(train, test)`
///
/// # Errors
/// Returns `TrainErr::InvalidTestSize` if `test_size` is outside `(0, 1)`,
/// `TrainErr::TooFewSamples` if either partition would be empty.
pub fn train_test_split(dataset: &Dataset, test_size: f64, seed: u64) -> Result<(Dataset, Dataset)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TrainErr::InvalidTestSize(test_size));
    }

    let n = dataset.len();
    let n_test = (n as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(TrainErr::TooFewSamples {
            samples: n,
            test_size,
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let (test_idx, train_idx) = indices.split_at(n_test);
    Ok((dataset.select(train_idx), dataset.select(test_idx)))
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, Array2};

    use super::*;

    fn numbered(n: usize) -> Dataset {
        let x = Array2::from_shape_fn((n, 8), |(i, j)| (i * 8 + j) as f64);
        let y = Array1::from_shape_fn(n, |i| i as f64);
        Dataset::new(x, y)
    }

    #[test]
    fn split_sizes_round_test_partition_up() {
        let ds = numbered(11);
        let (train, test) = train_test_split(&ds, 0.2, 42).unwrap();

        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn partitions_are_disjoint_and_complete() {
        let ds = numbered(50);
        let (train, test) = train_test_split(&ds, 0.2, 42).unwrap();

        let mut ids: Vec<usize> = train
            .y()
            .iter()
            .chain(test.y().iter())
            .map(|v| *v as usize)
            .collect();
        ids.sort_unstable();

        assert_eq!(ids, (0..50).collect::<Vec<_>>());
        // Rows travel with their targets.
        for (row, y) in train.x().rows().into_iter().zip(train.y()) {
            assert_eq!(row[0], y * 8.0);
        }
    }

    #[test]
    fn same_seed_same_split() {
        let ds = numbered(100);
        let a = train_test_split(&ds, 0.2, 42).unwrap();
        let b = train_test_split(&ds, 0.2, 42).unwrap();
        let c = train_test_split(&ds, 0.2, 43).unwrap();

        assert_eq!(a, b);
        assert_ne!(a.1, c.1);
    }

    #[test]
    fn rejects_degenerate_sizes() {
        let ds = numbered(10);
        assert!(matches!(
            train_test_split(&ds, 0.0, 42),
            Err(TrainErr::InvalidTestSize(_))
        ));
        assert!(matches!(
            train_test_split(&ds, 1.0, 42),
            Err(TrainErr::InvalidTestSize(_))
        ));
        assert!(matches!(
            train_test_split(&numbered(1), 0.2, 42),
            Err(TrainErr::TooFewSamples { .. })
        ));
    }
}
