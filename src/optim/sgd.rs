use crate::error::MatrixError;
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;

/// Plain stochastic gradient descent.
///
/// The learning rate multiplies the *summed* batch gradient as-is; it is not
/// divided by the batch size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one update to `layer` from accumulated gradients.
    ///
    /// The accumulators are scaled in place, subtracted from the layer and
    /// then cleared, ready for the next batch.
    pub fn step(
        &self,
        layer: &mut Layer,
        weights_acc: &mut Matrix,
        biases_acc: &mut Matrix,
    ) -> Result<(), MatrixError> {
        weights_acc.scale_assign(self.learning_rate);
        biases_acc.scale_assign(self.learning_rate);
        layer.apply_gradients(weights_acc, biases_acc)?;
        weights_acc.clear();
        biases_acc.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::Activation;

    #[test]
    fn step_scales_applies_and_clears() {
        let mut layer = Layer::new(2, 1, Activation::Identity);
        let mut w = Matrix::from_rows(vec![vec![1.0, -2.0]]).unwrap();
        let mut b = Matrix::column(vec![4.0]);

        Sgd::new(0.5).step(&mut layer, &mut w, &mut b).unwrap();

        assert_eq!(layer.weights(), &Matrix::from_rows(vec![vec![-0.5, 1.0]]).unwrap());
        assert_eq!(layer.biases(), &Matrix::column(vec![-2.0]));
        assert_eq!(w, Matrix::zeros(1, 2));
        assert_eq!(b, Matrix::zeros(1, 1));
    }

    #[test]
    fn step_rejects_mismatched_accumulators() {
        let mut layer = Layer::new(2, 1, Activation::Identity);
        let mut w = Matrix::zeros(2, 2);
        let mut b = Matrix::zeros(1, 1);
        assert!(Sgd::new(0.1).step(&mut layer, &mut w, &mut b).is_err());
    }
}
