use rand::Rng;

use crate::activation::activation::Activation;
use crate::error::MatrixError;
use crate::math::matrix::Matrix;

/// One fully-connected layer: `a = activation(W·x + b)`.
///
/// `weights` is `(size, input_size)` and `biases` is a `(size, 1)` column
/// vector. Both start zeroed until `initialize` draws them.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    weights: Matrix,
    biases: Matrix,
    activation: Activation,
}

impl Layer {
    pub fn new(input_size: usize, size: usize, activation: Activation) -> Layer {
        Layer {
            weights: Matrix::zeros(size, input_size),
            biases: Matrix::zeros(size, 1),
            activation,
        }
    }

    /// Builds a layer around existing parameters.
    pub fn with_parameters(
        weights: Matrix,
        biases: Matrix,
        activation: Activation,
    ) -> Result<Layer, MatrixError> {
        if biases.shape() != (weights.rows(), 1) {
            return Err(MatrixError::Shape {
                op: "layer",
                left: (weights.rows(), 1),
                right: biases.shape(),
            });
        }
        Ok(Layer { weights, biases, activation })
    }

    /// Number of neurons in this layer.
    pub fn size(&self) -> usize {
        self.weights.rows()
    }

    /// Fan-in.
    pub fn input_size(&self) -> usize {
        self.weights.cols()
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn biases(&self) -> &Matrix {
        &self.biases
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub(crate) fn set_activation(&mut self, activation: Activation) {
        self.activation = activation;
    }

    /// Biases from N(0, 1), weights from N(0, 1) scaled by `1 / sqrt(fan_in)`.
    pub fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.biases = Matrix::random_normal(self.size(), 1, 1.0, rng);
        self.weights = Matrix::xavier(self.size(), self.input_size(), rng);
    }

    /// Weighted input `z = W·x + b`.
    pub fn weighted_input(&self, input: &Matrix) -> Result<Matrix, MatrixError> {
        let mut z = self.weights.dot(input)?;
        z.add_assign(&self.biases)?;
        Ok(z)
    }

    /// Returns `(z, activation(z))`.
    pub fn feed(&self, input: &Matrix) -> Result<(Matrix, Matrix), MatrixError> {
        let z = self.weighted_input(input)?;
        let a = z.activate(self.activation);
        Ok((z, a))
    }

    /// Subtracts already-scaled gradients from the parameters in place.
    pub fn apply_gradients(
        &mut self,
        weights_step: &Matrix,
        biases_step: &Matrix,
    ) -> Result<(), MatrixError> {
        self.weights.sub_assign(weights_step)?;
        self.biases.sub_assign(biases_step)
    }
}
