use thiserror::Error;

use crate::activation::activation::Activation;
use crate::cost::cost_function::CostFunction;

/// Contract violations raised by `Matrix` operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// Operand (or destination) dimensions are incompatible for `op`.
    #[error("matrix size mismatch in `{op}`: {}x{} vs {}x{}", .left.0, .left.1, .right.0, .right.1)]
    Shape {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("index ({row}, {col}) is out of bounds for a {rows}x{cols} matrix")]
    Index {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

/// The network was built, configured or driven in a way that cannot work.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("a network needs at least an input and an output layer, got {0} layer size(s)")]
    TooFewLayers(usize),

    #[error("layer {0} has zero neurons")]
    EmptyLayer(usize),

    #[error("expected {expected} activation functions (one per weight layer), got {found}")]
    ActivationCount { expected: usize, found: usize },

    #[error("{cost:?} cost requires a {required:?} output layer, found {found:?}")]
    CostActivationMismatch {
        cost: CostFunction,
        required: Activation,
        found: Activation,
    },

    #[error("network is {state}; call activate() and initialize() first")]
    NotReady { state: &'static str },

    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    #[error("got {inputs} inputs but {targets} targets")]
    DatasetLength { inputs: usize, targets: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failures while decoding IDX image/label files.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} file: expected magic number {expected}, found {found}")]
    MagicNumber {
        kind: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("{kind} file too short: need {needed} bytes, found {found}")]
    Truncated {
        kind: &'static str,
        needed: usize,
        found: usize,
    },

    #[error("image file holds {images} items but label file holds {labels}")]
    CountMismatch { images: usize, labels: usize },

    #[error("label {label} at index {index} is out of range for {classes} classes")]
    LabelOutOfRange {
        index: usize,
        label: usize,
        classes: usize,
    },
}

pub type Result<T> = std::result::Result<T, NetworkError>;
