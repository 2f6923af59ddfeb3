pub mod math;
pub mod activation;
pub mod cost;
pub mod layers;
pub mod network;
pub mod optim;
pub mod train;
pub mod dataset;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::Activation;
pub use cost::cost_function::CostFunction;
pub use layers::dense::Layer;
pub use network::gradients::Gradients;
pub use network::network::{Network, NetworkState};
pub use network::spec::NetworkSpec;
pub use optim::sgd::Sgd;
pub use train::train_config::{TrainConfig, TrainReport};
pub use train::epoch_stats::EpochStats;
pub use dataset::{one_hot, Dataset};
pub use error::{ConfigError, DatasetError, MatrixError, NetworkError};
