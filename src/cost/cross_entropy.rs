use crate::error::MatrixError;
use crate::math::matrix::Matrix;

/// Per-output cross-entropy for sigmoid output units.
pub struct CrossEntropyCost;

/// Keeps `ln` away from zero.
const EPS: f64 = 1e-12;

impl CrossEntropyCost {
    /// `C = -Σ[y·ln(a) + (1 - y)·ln(1 - a)]`
    pub fn cost(output: &[f64], target: &[f64]) -> f64 {
        output.iter().zip(target)
            .map(|(a, y)| -(y * (a + EPS).ln() + (1.0 - y) * (1.0 - a + EPS).ln()))
            .sum()
    }

    /// Output-layer error `δ = a - y`.
    ///
    /// With a sigmoid output, `∂C/∂a = (a - y) / (a(1 - a))` and
    /// `σ'(z) = a(1 - a)`, so the activation derivative cancels and is never
    /// evaluated here.
    pub fn delta(output: &Matrix, target: &Matrix) -> Result<Matrix, MatrixError> {
        output.sub(target)
    }
}
