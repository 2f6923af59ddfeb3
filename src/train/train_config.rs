use std::sync::mpsc;
use std::sync::{atomic::AtomicBool, Arc};
use std::time::Duration;

use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`        — total number of full passes over the training data
/// - `batch_size`    — examples per gradient update; use `1` for online SGD
/// - `learning_rate` — multiplier applied to the summed batch gradient
/// - `parallel`      — evaluate the examples of a batch on the rayon pool.
///                     Gradients are still summed in example order, so the
///                     result is bit-identical to a sequential run.
/// - `progress_tx`   — optional channel; one `EpochStats` is sent per
///                     completed epoch. If the receiver is dropped the loop
///                     stops early.
/// - `stop_flag`     — optional flag; when set from another thread the loop
///                     stops after the current epoch.
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub parallel: bool,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a sequential `TrainConfig` with no progress channel and no stop flag.
    pub fn new(epochs: usize, batch_size: usize, learning_rate: f64) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            learning_rate,
            parallel: false,
            progress_tx: None,
            stop_flag: None,
        }
    }
}

/// Outcome of a training run.
#[derive(Debug, Clone, Default)]
pub struct TrainReport {
    /// Statistics of every completed epoch, in order.
    pub epochs: Vec<EpochStats>,
    /// Summed wall-clock time of the completed epochs.
    pub elapsed: Duration,
}

impl TrainReport {
    /// Mean cost of the last completed epoch.
    pub fn final_cost(&self) -> Option<f64> {
        self.epochs.last().map(|stats| stats.mean_cost)
    }
}
