use crate::error::MatrixError;
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;

/// Per-layer cost gradients, indexed like the network's layers.
///
/// `weights[i]` has the shape of layer i's weight matrix and `biases[i]`
/// the shape of its bias vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub weights: Vec<Matrix>,
    pub biases: Vec<Matrix>,
}

impl Gradients {
    /// Zeroed gradients shaped like `layers`; used as a batch accumulator.
    pub fn zeros_like(layers: &[Layer]) -> Gradients {
        Gradients {
            weights: layers.iter()
                .map(|layer| Matrix::zeros(layer.size(), layer.input_size()))
                .collect(),
            biases: layers.iter()
                .map(|layer| Matrix::zeros(layer.size(), 1))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Adds `other` into `self` in place.
    pub fn accumulate(&mut self, other: &Gradients) -> Result<(), MatrixError> {
        if self.len() != other.len() {
            return Err(MatrixError::Shape {
                op: "accumulate",
                left: (self.len(), 1),
                right: (other.len(), 1),
            });
        }
        for (acc, g) in self.weights.iter_mut().zip(&other.weights) {
            acc.add_assign(g)?;
        }
        for (acc, g) in self.biases.iter_mut().zip(&other.biases) {
            acc.add_assign(g)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.weights.iter_mut().chain(self.biases.iter_mut()).for_each(Matrix::clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::Activation;

    fn layers() -> Vec<Layer> {
        vec![
            Layer::new(4, 3, Activation::Sigmoid),
            Layer::new(3, 2, Activation::Sigmoid),
        ]
    }

    #[test]
    fn zeros_like_matches_layer_shapes() {
        let g = Gradients::zeros_like(&layers());
        assert_eq!(g.len(), 2);
        assert_eq!(g.weights[0].shape(), (3, 4));
        assert_eq!(g.weights[1].shape(), (2, 3));
        assert_eq!(g.biases[0].shape(), (3, 1));
        assert_eq!(g.biases[1].shape(), (2, 1));
    }

    #[test]
    fn accumulate_then_clear() {
        let mut acc = Gradients::zeros_like(&layers());
        let mut step = Gradients::zeros_like(&layers());
        step.weights[1].fill(0.5);
        step.biases[0].fill(-1.0);

        acc.accumulate(&step).unwrap();
        acc.accumulate(&step).unwrap();
        assert_eq!(acc.weights[1], Matrix::filled(2, 3, 1.0));
        assert_eq!(acc.biases[0], Matrix::filled(3, 1, -2.0));

        acc.clear();
        assert_eq!(acc, Gradients::zeros_like(&layers()));
    }

    #[test]
    fn accumulate_rejects_other_networks() {
        let mut acc = Gradients::zeros_like(&layers());
        let other = Gradients::zeros_like(&layers()[..1]);
        assert!(acc.accumulate(&other).is_err());
    }
}
