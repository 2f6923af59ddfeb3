use digitnet::{Activation, CostFunction, Matrix, Network, TrainConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut network = Network::with_seed(&[2, 3, 1], CostFunction::CrossEntropy, 42)?;
    network.activate(&[Activation::Tanh, Activation::Sigmoid])?;
    network.initialize()?;

    let mut inputs: Vec<Matrix> = [[1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]
        .iter()
        .map(|x| Matrix::column(x.to_vec()))
        .collect();
    let mut targets: Vec<Matrix> = [1.0, 0.0, 1.0, 0.0]
        .iter()
        .map(|&y| Matrix::column(vec![y]))
        .collect();

    let report = network.train_with(&mut inputs, &mut targets, &TrainConfig::new(5000, 1, 0.1))?;
    for stats in report.epochs.iter().step_by(1000) {
        println!("Epoch {}: cost = {:.6}", stats.epoch, stats.mean_cost);
    }

    for input in &inputs {
        println!("Input: {:?} -> Output: {:.4}", input.values(), network.forward(input)?.values()[0]);
    }
    Ok(())
}
