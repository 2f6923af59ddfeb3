use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::activation::activation::Activation;
use crate::cost::cost_function::CostFunction;
use crate::error::{ConfigError, MatrixError, Result};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::network::gradients::Gradients;
use crate::network::spec::NetworkSpec;
use crate::optim::sgd::Sgd;
use crate::train::loop_fn::train_loop;
use crate::train::train_config::{TrainConfig, TrainReport};

/// Lifecycle of a `Network`.
///
/// `Unconfigured` --activate--> `Uninitialized` --initialize--> `Ready`.
/// Only a `Ready` network can run forward, backpropagate or train.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkState {
    Unconfigured,
    Uninitialized,
    Ready,
}

impl NetworkState {
    fn describe(&self) -> &'static str {
        match self {
            NetworkState::Unconfigured => "unconfigured",
            NetworkState::Uninitialized => "uninitialized",
            NetworkState::Ready => "ready",
        }
    }
}

/// Fully-connected feedforward network trained by mini-batch SGD.
///
/// For layer sizes `[n0, ..., nL]` the network holds L layers; layer i maps
/// an `(n[i], 1)` column vector to an `(n[i+1], 1)` column vector.
#[derive(Debug, Clone)]
pub struct Network {
    sizes: Vec<usize>,
    layers: Vec<Layer>,
    cost: CostFunction,
    state: NetworkState,
    rng: StdRng,
}

impl Network {
    /// Allocates a zeroed network drawing randomness from OS entropy.
    pub fn new(sizes: &[usize], cost: CostFunction) -> std::result::Result<Network, ConfigError> {
        Network::with_rng(sizes, cost, StdRng::from_entropy())
    }

    /// Like `new`, but initialization and shuffling are reproducible.
    pub fn with_seed(
        sizes: &[usize],
        cost: CostFunction,
        seed: u64,
    ) -> std::result::Result<Network, ConfigError> {
        Network::with_rng(sizes, cost, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        sizes: &[usize],
        cost: CostFunction,
        rng: StdRng,
    ) -> std::result::Result<Network, ConfigError> {
        if sizes.len() < 2 {
            return Err(ConfigError::TooFewLayers(sizes.len()));
        }
        if let Some(i) = sizes.iter().position(|&n| n == 0) {
            return Err(ConfigError::EmptyLayer(i));
        }

        // Placeholder activation; the state guards against using it.
        let layers = sizes.windows(2)
            .map(|pair| Layer::new(pair[0], pair[1], Activation::Identity))
            .collect();

        Ok(Network {
            sizes: sizes.to_vec(),
            layers,
            cost,
            state: NetworkState::Unconfigured,
            rng,
        })
    }

    /// Builds and activates a network from a spec. The result still needs
    /// `initialize()`.
    pub fn from_spec(spec: &NetworkSpec) -> std::result::Result<Network, ConfigError> {
        let mut network = match spec.seed {
            Some(seed) => Network::with_seed(&spec.layers, spec.cost, seed)?,
            None => Network::new(&spec.layers, spec.cost)?,
        };
        network.activate(&spec.activations)?;
        Ok(network)
    }

    /// Assigns one activation (and its derivative) per weight layer.
    pub fn activate(&mut self, activations: &[Activation]) -> std::result::Result<(), ConfigError> {
        if activations.len() != self.layers.len() {
            return Err(ConfigError::ActivationCount {
                expected: self.layers.len(),
                found: activations.len(),
            });
        }
        if let (Some(required), Some(&found)) = (self.cost.required_output(), activations.last()) {
            if found != required {
                return Err(ConfigError::CostActivationMismatch {
                    cost: self.cost,
                    required,
                    found,
                });
            }
        }

        for (layer, &activation) in self.layers.iter_mut().zip(activations) {
            layer.set_activation(activation);
        }
        if self.state == NetworkState::Unconfigured {
            self.state = NetworkState::Uninitialized;
        }
        Ok(())
    }

    /// Draws fresh biases from N(0, 1) and weights from N(0, 1/fan_in).
    ///
    /// Calling it again on a `Ready` network re-draws every parameter.
    pub fn initialize(&mut self) -> std::result::Result<(), ConfigError> {
        if self.state == NetworkState::Unconfigured {
            return Err(ConfigError::NotReady { state: self.state.describe() });
        }
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.initialize(&mut self.rng);
            debug!(
                layer = i,
                rows = layer.size(),
                cols = layer.input_size(),
                activation = ?layer.activation(),
                "initialized layer"
            );
        }
        self.state = NetworkState::Ready;
        Ok(())
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn activations(&self) -> Vec<Activation> {
        self.layers.iter().map(Layer::activation).collect()
    }

    pub fn cost(&self) -> CostFunction {
        self.cost
    }

    pub fn state(&self) -> NetworkState {
        self.state
    }

    pub(crate) fn ensure_ready(&self) -> std::result::Result<(), ConfigError> {
        match self.state {
            NetworkState::Ready => Ok(()),
            state => Err(ConfigError::NotReady { state: state.describe() }),
        }
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Output of the network for one `(n0, 1)` input column vector.
    pub fn forward(&self, input: &Matrix) -> Result<Matrix> {
        self.ensure_ready()?;
        let mut a = input.clone();
        for layer in &self.layers {
            let mut z = layer.weighted_input(&a)?;
            let activation = layer.activation();
            z.map_in_place(|x| activation.function(x));
            a = z;
        }
        Ok(a)
    }

    /// Index of the most activated output neuron.
    pub fn predict(&self, input: &Matrix) -> Result<usize> {
        Ok(self.forward(input)?.argmax().0)
    }

    /// Gradients of the cost for a single `(input, target)` pair.
    pub fn backpropagate(&self, input: &Matrix, target: &Matrix) -> Result<Gradients> {
        self.ensure_ready()?;
        Ok(self.backprop_with_output(input, target)?.0)
    }

    /// Backpropagation that also hands back the network output so the
    /// training loop can track the cost without a second forward pass.
    ///
    /// Callers must have checked `ensure_ready`.
    pub(crate) fn backprop_with_output(
        &self,
        input: &Matrix,
        target: &Matrix,
    ) -> std::result::Result<(Gradients, Matrix), MatrixError> {
        let n = self.layers.len();
        let mut sums = Vec::with_capacity(n);
        let mut activations = Vec::with_capacity(n + 1);
        activations.push(input.clone());

        for (i, layer) in self.layers.iter().enumerate() {
            let (z, a) = layer.feed(&activations[i])?;
            sums.push(z);
            activations.push(a);
        }

        let output_layer = &self.layers[n - 1];
        let mut delta = self.cost.delta(
            &activations[n],
            target,
            &sums[n - 1],
            output_layer.activation(),
        )?;
        let output = activations.swap_remove(n);

        // Walk backwards, collecting gradients in reverse layer order.
        let mut weights = Vec::with_capacity(n);
        let mut biases = Vec::with_capacity(n);
        for i in (0..n).rev() {
            weights.push(delta.mul_transpose_b(&activations[i])?);

            let previous = if i > 0 {
                let mut d = self.layers[i].weights().mul_transpose_a(&delta)?;
                d.hadamard_assign(&sums[i - 1].derive(self.layers[i - 1].activation()))?;
                Some(d)
            } else {
                None
            };

            biases.push(delta);
            match previous {
                Some(d) => delta = d,
                None => break,
            }
        }
        weights.reverse();
        biases.reverse();

        Ok((Gradients { weights, biases }, output))
    }

    /// Subtracts the scaled accumulated gradients from every layer and
    /// clears the accumulator.
    pub(crate) fn apply_gradients(
        &mut self,
        acc: &mut Gradients,
        optimizer: &Sgd,
    ) -> std::result::Result<(), MatrixError> {
        let steps = acc.weights.iter_mut().zip(acc.biases.iter_mut());
        for (layer, (w, b)) in self.layers.iter_mut().zip(steps) {
            optimizer.step(layer, w, b)?;
        }
        Ok(())
    }

    /// Mini-batch SGD over `(inputs, targets)`.
    ///
    /// Both slices are shuffled in place (with the same permutation) at the
    /// start of every epoch. Returns the total wall-clock training time.
    pub fn train(
        &mut self,
        inputs: &mut [Matrix],
        targets: &mut [Matrix],
        epochs: usize,
        batch_size: usize,
        learning_rate: f64,
    ) -> Result<Duration> {
        let config = TrainConfig::new(epochs, batch_size, learning_rate);
        Ok(self.train_with(inputs, targets, &config)?.elapsed)
    }

    /// Full training entry point; see `train_loop`.
    pub fn train_with(
        &mut self,
        inputs: &mut [Matrix],
        targets: &mut [Matrix],
        config: &TrainConfig,
    ) -> Result<TrainReport> {
        train_loop(self, inputs, targets, config)
    }

    /// Fraction of `inputs` whose predicted class equals `labels[i]`.
    pub fn accuracy(&self, inputs: &[Matrix], labels: &[usize]) -> Result<f64> {
        if inputs.len() != labels.len() {
            return Err(ConfigError::DatasetLength {
                inputs: inputs.len(),
                targets: labels.len(),
            }
            .into());
        }
        if inputs.is_empty() {
            return Ok(0.0);
        }
        let mut correct = 0usize;
        for (input, &label) in inputs.iter().zip(labels) {
            if self.predict(input)? == label {
                correct += 1;
            }
        }
        Ok(correct as f64 / inputs.len() as f64)
    }

    /// Mean cost over a dataset.
    pub fn mean_cost(&self, inputs: &[Matrix], targets: &[Matrix]) -> Result<f64> {
        if inputs.len() != targets.len() {
            return Err(ConfigError::DatasetLength {
                inputs: inputs.len(),
                targets: targets.len(),
            }
            .into());
        }
        if inputs.is_empty() {
            return Ok(0.0);
        }
        let mut total = 0.0;
        for (input, target) in inputs.iter().zip(targets) {
            let output = self.forward(input)?;
            total += self.cost.cost(&output, target)?;
        }
        Ok(total / inputs.len() as f64)
    }
}
