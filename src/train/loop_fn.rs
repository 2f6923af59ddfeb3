use std::ops::Range;
use std::sync::atomic::Ordering;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, MatrixError, Result};
use crate::math::matrix::Matrix;
use crate::network::gradients::Gradients;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;
use crate::train::shuffle::shuffle_pairs;
use crate::train::train_config::{TrainConfig, TrainReport};

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` with mini-batch SGD for `config.epochs` epochs.
///
/// Every epoch starts by shuffling `inputs` and `targets` in place with one
/// shared permutation, so callers lose the original ordering. Gradients are
/// summed over each batch and the sum, scaled by the learning rate, is
/// subtracted from the parameters at the batch boundary.
///
/// # Early termination
/// The loop stops before the next epoch if `config.stop_flag` is set or the
/// `progress_tx` receiver has been dropped.
///
/// # Errors
/// `ConfigError` if the network is not ready, `batch_size == 0`, or the two
/// slices differ in length; `MatrixError` if an example does not fit the
/// network's layer sizes.
pub fn train_loop(
    network: &mut Network,
    inputs: &mut [Matrix],
    targets: &mut [Matrix],
    config: &TrainConfig,
) -> Result<TrainReport> {
    network.ensure_ready()?;
    if config.batch_size == 0 {
        return Err(ConfigError::ZeroBatchSize.into());
    }
    if inputs.len() != targets.len() {
        return Err(ConfigError::DatasetLength {
            inputs: inputs.len(),
            targets: targets.len(),
        }
        .into());
    }

    let optimizer = Sgd::new(config.learning_rate);
    let mut acc = Gradients::zeros_like(network.layers());
    let mut report = TrainReport::default();

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            warn!(epoch, "stop flag set, ending training early");
            break;
        }

        let t_start = Instant::now();

        shuffle_pairs(inputs, targets, network.rng_mut())?;
        let (total_cost, updates) = run_one_epoch(
            network,
            inputs,
            targets,
            &mut acc,
            &optimizer,
            config,
        )?;

        let elapsed = t_start.elapsed();
        report.elapsed += elapsed;

        let mean_cost = if inputs.is_empty() {
            0.0
        } else {
            total_cost / inputs.len() as f64
        };
        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            mean_cost,
            updates,
            elapsed_secs: elapsed.as_secs_f64(),
        };
        info!(
            epoch,
            total = config.epochs,
            secs = stats.elapsed_secs,
            cost = mean_cost,
            "epoch complete"
        );
        report.epochs.push(stats.clone());

        if let Some(ref tx) = config.progress_tx {
            if tx.send(stats).is_err() {
                warn!(epoch, "progress receiver dropped, ending training early");
                break;
            }
        }
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config.stop_flag
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::Relaxed))
}

/// Splits `0..n` into update batches.
///
/// A batch closes after example `i` when `i > 0 && i % batch_size == 0`,
/// and always after the last example. The first batch of an epoch therefore
/// holds `batch_size + 1` examples.
pub(crate) fn batch_ranges(n: usize, batch_size: usize) -> Vec<Range<usize>> {
    let mut ranges = Vec::with_capacity(n / batch_size.max(1) + 1);
    let mut start = 0;
    for i in 0..n {
        if (i > 0 && i % batch_size == 0) || i == n - 1 {
            ranges.push(start..i + 1);
            start = i + 1;
        }
    }
    ranges
}

/// One pass over the (already shuffled) data.
/// Returns the summed cost and the number of updates applied.
fn run_one_epoch(
    network: &mut Network,
    inputs: &[Matrix],
    targets: &[Matrix],
    acc: &mut Gradients,
    optimizer: &Sgd,
    config: &TrainConfig,
) -> Result<(f64, usize)> {
    let mut total_cost = 0.0;
    let batches = batch_ranges(inputs.len(), config.batch_size);
    let updates = batches.len();

    for batch in batches {
        let batch_inputs = &inputs[batch.clone()];
        let batch_targets = &targets[batch];

        if config.parallel {
            let net: &Network = network;
            let results = batch_inputs
                .par_iter()
                .zip(batch_targets.par_iter())
                .map(|(input, target)| {
                    let (grads, output) = net.backprop_with_output(input, target)?;
                    let cost = net.cost().cost(&output, target)?;
                    Ok::<_, MatrixError>((grads, cost))
                })
                .collect::<std::result::Result<Vec<_>, MatrixError>>()?;

            // Summed in example order, same as the sequential path.
            for (grads, cost) in &results {
                acc.accumulate(grads)?;
                total_cost += cost;
            }
        } else {
            for (input, target) in batch_inputs.iter().zip(batch_targets) {
                let (grads, output) = network.backprop_with_output(input, target)?;
                acc.accumulate(&grads)?;
                total_cost += network.cost().cost(&output, target)?;
            }
        }

        network.apply_gradients(acc, optimizer)?;
    }

    debug!(updates, "applied batch updates");
    Ok((total_cost, updates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::Activation;
    use crate::cost::cost_function::CostFunction;
    use std::sync::atomic::AtomicBool;
    use std::sync::{mpsc, Arc};

    fn ready(seed: u64) -> Network {
        let mut net = Network::with_seed(&[2, 3, 1], CostFunction::Quadratic, seed).unwrap();
        net.activate(&[Activation::Sigmoid, Activation::Sigmoid]).unwrap();
        net.initialize().unwrap();
        net
    }

    fn xor() -> (Vec<Matrix>, Vec<Matrix>) {
        let inputs = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]
            .iter()
            .map(|x| Matrix::column(x.to_vec()))
            .collect();
        let targets = [0.0, 1.0, 1.0, 0.0]
            .iter()
            .map(|&y| Matrix::column(vec![y]))
            .collect();
        (inputs, targets)
    }

    #[test]
    fn batch_boundaries() {
        assert_eq!(batch_ranges(0, 3), Vec::<Range<usize>>::new());
        assert_eq!(batch_ranges(1, 3), vec![0..1]);
        assert_eq!(batch_ranges(10, 3), vec![0..4, 4..7, 7..10]);
        assert_eq!(batch_ranges(8, 3), vec![0..4, 4..7, 7..8]);
        assert_eq!(batch_ranges(4, 1), vec![0..2, 2..3, 3..4]);
        assert_eq!(batch_ranges(5, 10), vec![0..5]);
    }

    #[test]
    fn rejects_bad_configuration() {
        let mut net = ready(1);
        let (mut x, mut y) = xor();
        let err = train_loop(&mut net, &mut x, &mut y, &TrainConfig::new(1, 0, 0.1)).unwrap_err();
        assert!(matches!(err, crate::error::NetworkError::Config(ConfigError::ZeroBatchSize)));

        let err = train_loop(&mut net, &mut x, &mut y[..3], &TrainConfig::new(1, 1, 0.1)).unwrap_err();
        assert!(matches!(
            err,
            crate::error::NetworkError::Config(ConfigError::DatasetLength { inputs: 4, targets: 3 })
        ));
    }

    #[test]
    fn reports_one_entry_per_epoch() {
        let mut net = ready(2);
        let (mut x, mut y) = xor();
        let report = train_loop(&mut net, &mut x, &mut y, &TrainConfig::new(3, 2, 0.5)).unwrap();
        assert_eq!(report.epochs.len(), 3);
        assert_eq!(report.epochs[2].epoch, 3);
        assert_eq!(report.epochs[0].updates, 2);
        let summed: f64 = report.epochs.iter().map(|e| e.elapsed_secs).sum();
        assert!((report.elapsed.as_secs_f64() - summed).abs() < 1e-6);
    }

    #[test]
    fn shuffling_keeps_pairs() {
        let mut net = ready(3);
        let (mut x, mut y) = xor();
        train_loop(&mut net, &mut x, &mut y, &TrainConfig::new(4, 1, 0.1)).unwrap();
        for (input, target) in x.iter().zip(&y) {
            let v = input.values();
            let expected = if v[0] != v[1] { 1.0 } else { 0.0 };
            assert_eq!(target.values(), &[expected]);
        }
    }

    #[test]
    fn parallel_matches_sequential_bit_for_bit() {
        let (x0, y0) = xor();

        let mut seq = ready(4);
        let (mut x, mut y) = (x0.clone(), y0.clone());
        train_loop(&mut seq, &mut x, &mut y, &TrainConfig::new(20, 2, 0.3)).unwrap();

        let mut par = ready(4);
        let (mut x, mut y) = (x0, y0);
        let mut config = TrainConfig::new(20, 2, 0.3);
        config.parallel = true;
        train_loop(&mut par, &mut x, &mut y, &config).unwrap();

        assert_eq!(seq.layers(), par.layers());
    }

    #[test]
    fn learning_rate_is_not_divided_by_batch_size() {
        // One batch holding two copies of the same example must move the
        // parameters exactly twice as far as the single example's gradient.
        let mut net = ready(5);
        let x = Matrix::column(vec![0.5, -0.5]);
        let y = Matrix::column(vec![1.0]);
        let grads = net.backpropagate(&x, &y).unwrap();
        let before = net.layers()[1].weights().clone();

        let mut xs = vec![x.clone(), x];
        let mut ys = vec![y.clone(), y];
        train_loop(&mut net, &mut xs, &mut ys, &TrainConfig::new(1, 5, 0.1)).unwrap();

        let expected = before.sub(&grads.weights[1].scale(0.2)).unwrap();
        for (a, b) in net.layers()[1].weights().values().iter().zip(expected.values()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn stop_flag_halts_before_first_epoch() {
        let mut net = ready(6);
        let before = net.layers().to_vec();
        let (mut x, mut y) = xor();
        let mut config = TrainConfig::new(10, 1, 0.1);
        config.stop_flag = Some(Arc::new(AtomicBool::new(true)));
        let report = train_loop(&mut net, &mut x, &mut y, &config).unwrap();
        assert!(report.epochs.is_empty());
        assert_eq!(net.layers(), &before[..]);
    }

    #[test]
    fn progress_channel_receives_stats() {
        let mut net = ready(7);
        let (mut x, mut y) = xor();
        let (tx, rx) = mpsc::channel();
        let mut config = TrainConfig::new(3, 4, 0.1);
        config.progress_tx = Some(tx);
        train_loop(&mut net, &mut x, &mut y, &config).unwrap();
        drop(config);

        let received: Vec<EpochStats> = rx.iter().collect();
        assert_eq!(received.iter().map(|s| s.epoch).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(received.iter().all(|s| s.total_epochs == 3 && s.updates == 1));
    }

    #[test]
    fn dropped_receiver_stops_training() {
        let mut net = ready(8);
        let (mut x, mut y) = xor();
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut config = TrainConfig::new(5, 4, 0.1);
        config.progress_tx = Some(tx);
        let report = train_loop(&mut net, &mut x, &mut y, &config).unwrap();
        assert_eq!(report.epochs.len(), 1);
    }

    #[test]
    fn empty_dataset_is_a_no_op() {
        let mut net = ready(9);
        let before = net.layers().to_vec();
        let report = train_loop(&mut net, &mut [], &mut [], &TrainConfig::new(2, 3, 0.1)).unwrap();
        assert_eq!(report.epochs.len(), 2);
        assert_eq!(report.final_cost(), Some(0.0));
        assert_eq!(net.layers(), &before[..]);
    }
}
