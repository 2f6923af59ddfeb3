use crate::activation::activation::Activation;
use crate::error::MatrixError;
use crate::math::matrix::Matrix;

/// Quadratic (mean-squared style) cost, `C = ½·Σ(a - y)²`.
pub struct QuadraticCost;

impl QuadraticCost {
    pub fn cost(output: &[f64], target: &[f64]) -> f64 {
        0.5 * output.iter().zip(target)
            .map(|(a, y)| (a - y).powi(2))
            .sum::<f64>()
    }

    /// Output-layer error `δ = (a - y) ⊙ σ'(z)`.
    pub fn delta(
        output: &Matrix,
        target: &Matrix,
        z: &Matrix,
        activation: Activation,
    ) -> Result<Matrix, MatrixError> {
        let mut delta = output.sub(target)?;
        delta.hadamard_assign(&z.derive(activation))?;
        Ok(delta)
    }
}
