use serde::{Deserialize, Serialize};

/// Per-epoch training statistics emitted by `train_loop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Mean cost over the examples of this epoch, measured with the
    /// parameters in effect when each example was visited.
    pub mean_cost: f64,
    /// Number of parameter updates applied during the epoch.
    pub updates: usize,
    /// Wall-clock duration of this epoch in seconds.
    pub elapsed_secs: f64,
}
