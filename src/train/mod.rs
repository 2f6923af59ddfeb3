pub mod epoch_stats;
pub mod loop_fn;
pub mod shuffle;
pub mod train_config;

pub use epoch_stats::EpochStats;
pub use loop_fn::train_loop;
pub use shuffle::shuffle_pairs;
pub use train_config::{TrainConfig, TrainReport};
