use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;
use crate::cost::cross_entropy::CrossEntropyCost;
use crate::cost::quadratic::QuadraticCost;
use crate::error::MatrixError;
use crate::math::matrix::Matrix;

/// Selects the cost the network is trained against.
///
/// - `Quadratic`    — `½·Σ(a - y)²`; works with any output activation.
/// - `CrossEntropy` — per-output cross-entropy; the output layer must be
///   `Sigmoid`, because its error signal `a - y` relies on the sigmoid
///   derivative cancelling out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostFunction {
    Quadratic,
    CrossEntropy,
}

impl CostFunction {
    /// Scalar cost of one example. `output` and `target` must share a shape.
    pub fn cost(&self, output: &Matrix, target: &Matrix) -> Result<f64, MatrixError> {
        if output.shape() != target.shape() {
            return Err(MatrixError::Shape {
                op: "cost",
                left: output.shape(),
                right: target.shape(),
            });
        }
        Ok(match self {
            CostFunction::Quadratic => QuadraticCost::cost(output.values(), target.values()),
            CostFunction::CrossEntropy => CrossEntropyCost::cost(output.values(), target.values()),
        })
    }

    /// Error signal `∂C/∂z` of the output layer.
    ///
    /// `z` holds the output layer's pre-activation sums and `activation` is
    /// the output layer's activation.
    pub fn delta(
        &self,
        output: &Matrix,
        target: &Matrix,
        z: &Matrix,
        activation: Activation,
    ) -> Result<Matrix, MatrixError> {
        match self {
            CostFunction::Quadratic => QuadraticCost::delta(output, target, z, activation),
            CostFunction::CrossEntropy => CrossEntropyCost::delta(output, target),
        }
    }

    /// Output activation this cost must be paired with, if any.
    pub fn required_output(&self) -> Option<Activation> {
        match self {
            CostFunction::Quadratic => None,
            CostFunction::CrossEntropy => Some(Activation::Sigmoid),
        }
    }
}
