use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;
use crate::cost::cost_function::CostFunction;

/// Serializable description of a network architecture.
///
/// Only the shape of the network is described here; trained parameters are
/// never stored.
///
/// ```json
/// {
///   "layers": [784, 16, 16, 10],
///   "activations": ["tanh", "leaky_relu", "sigmoid"],
///   "cost": "quadratic",
///   "seed": 42
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Neuron count per layer, input layer first.
    pub layers: Vec<usize>,
    /// One activation per weight layer (`layers.len() - 1` entries).
    pub activations: Vec<Activation>,
    pub cost: CostFunction,
    /// Seed for initialization and shuffling; fresh entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NetworkSpec {
    pub fn from_json_str(json: &str) -> serde_json::Result<NetworkSpec> {
        serde_json::from_str(json)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> std::io::Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

impl Default for NetworkSpec {
    /// 28×28 digit classifier: 784 → 16 (Tanh) → 16 (LeakyReLU) → 10 (Sigmoid).
    fn default() -> Self {
        NetworkSpec {
            layers: vec![784, 16, 16, 10],
            activations: vec![Activation::Tanh, Activation::LeakyReLU, Activation::Sigmoid],
            cost: CostFunction::Quadratic,
            seed: None,
        }
    }
}
