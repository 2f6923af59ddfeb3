pub mod idx;

pub use idx::{load_idx_pair, parse_idx_pair};

use crate::error::DatasetError;
use crate::math::matrix::Matrix;

/// Paired training examples: input column vectors, one-hot targets and the
/// class index each target encodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub inputs: Vec<Matrix>,
    pub targets: Vec<Matrix>,
    pub labels: Vec<usize>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Keeps at most the first `n` examples.
    pub fn truncate(&mut self, n: usize) {
        self.inputs.truncate(n);
        self.targets.truncate(n);
        self.labels.truncate(n);
    }
}

/// `(n_classes, 1)` column vector with a single 1.0 at `label`.
///
/// A label outside `0..n_classes` is `LabelOutOfRange` with `index` 0; callers
/// decoding a whole file substitute the example's position.
pub fn one_hot(label: usize, n_classes: usize) -> Result<Matrix, DatasetError> {
    if label >= n_classes {
        return Err(DatasetError::LabelOutOfRange { index: 0, label, classes: n_classes });
    }
    let mut values = vec![0.0; n_classes];
    values[label] = 1.0;
    Ok(Matrix::column(values))
}
