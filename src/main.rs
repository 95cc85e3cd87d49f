use std::path::PathBuf;

use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use feedforward::prelude::*;

const XOR_SAMPLE: [[f64; 3]; 4] = [
    [0.0, 0.0, 0.0], // 0 ^ 0 = 0
    [1.0, 0.0, 1.0], // 1 ^ 0 = 1
    [0.0, 1.0, 1.0], // 0 ^ 1 = 1
    [1.0, 1.0, 0.0], // 1 ^ 1 = 0
];

// every pattern rotated one position to the right, except the held out one
const SHIFT_SAMPLE: [([f64; 3], [f64; 3]); 7] = [
    ([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
    ([1.0, 1.0, 1.0], [1.0, 1.0, 1.0]),
    ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
    ([1.0, 0.0, 1.0], [1.0, 1.0, 0.0]),
    ([0.0, 1.0, 1.0], [1.0, 0.0, 1.0]),
    ([1.0, 1.0, 0.0], [0.0, 1.0, 1.0]),
];

const SHIFT_HELD_OUT: [f64; 3] = [0.0, 1.0, 0.0];

#[derive(Parser)]
#[command(version, about = "Feed-forward neural network demos")]
pub enum Cli {
    /// Learn the XOR truth table with a [2, hidden, 1] network.
    Xor {
        #[arg(long, default_value_t = 4)]
        /// Number of hidden neurons.
        hidden: usize,

        #[arg(long, default_value_t = Activation::Sigmoid)]
        /// Activation function of every non-input layer.
        activation: Activation,

        #[arg(long, default_value_t = 0.5)]
        learning_rate: f64,

        #[arg(long, default_value_t = 20_000)]
        /// Number of randomly drawn training examples.
        iterations: usize,

        #[arg(long)]
        /// Seed for weight initialization and example sampling.
        seed: Option<u64>,

        #[arg(long)]
        /// Save the trained network to this JSON file.
        save: Option<PathBuf>,
    },

    /// Learn to rotate a 3-bit pattern one position to the right.
    ///
    /// The pattern [0, 1, 0] is never shown during training.
    Shift {
        #[arg(long, default_value_t = 0.5)]
        learning_rate: f64,

        #[arg(long, default_value_t = 5000)]
        iterations: usize,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Feed comma separated input values to a saved network.
    Predict {
        #[arg(long, short)]
        /// Path to the network JSON file.
        path: PathBuf,

        #[arg(value_delimiter = ',', allow_hyphen_values = true, required = true)]
        input: Vec<f64>,
    },
}

impl Cli {
    pub fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::Xor { hidden, activation, learning_rate, iterations, seed, save } => {
                let mut rng = seeded_rng(seed);
                let mut network = Network::<f64>::with_activation(&[2, hidden, 1], activation)?;

                network.randomize(-1.0, 1.0, &mut rng)?;

                let data = TrainingData::from_sets(
                    XOR_SAMPLE.iter().map(|row| TrainingSet::new(&row[..2], &row[2..])),
                )?;

                println!("Error before training: {:.5}", network.calculate_error(&data)?);

                network.train_stochastic(&data, learning_rate, iterations, &mut rng)?;

                println!("Error after training:  {:.5}", network.calculate_error(&data)?);

                for row in XOR_SAMPLE {
                    let output = network.predict(&row[..2])?[0];

                    println!("{} ^ {} = {output:.5} (expected {})", row[0], row[1], row[2]);
                }

                finish(&network, save)
            }

            Self::Shift { learning_rate, iterations, seed, save } => {
                let mut rng = seeded_rng(seed);
                let mut network = Network::<f64>::with_activation(&[3, 3], Activation::Sigmoid)?;

                network.randomize(0.0, 1.0, &mut rng)?;

                let data = TrainingData::from_sets(
                    SHIFT_SAMPLE.iter().map(|(input, output)| TrainingSet::new(*input, *output)),
                )?;

                let predicted = rounded(&network, &SHIFT_HELD_OUT)?;

                println!("Prediction for {SHIFT_HELD_OUT:?} before training: {predicted:?}");
                println!("Error before training: {:.5}", network.calculate_error(&data)?);

                network.train_stochastic(&data, learning_rate, iterations, &mut rng)?;

                let predicted = rounded(&network, &SHIFT_HELD_OUT)?;

                println!("Prediction for {SHIFT_HELD_OUT:?} after training:  {predicted:?}");
                println!("Error after training:  {:.5}", network.calculate_error(&data)?);

                finish(&network, save)
            }

            Self::Predict { path, input } => {
                let network = Network::<f64>::load(&path)?;

                info!("Loaded {:?} network from {path:?}", network.layers());

                let output = network.predict(&input)?;

                println!("{output:?}");

                Ok(())
            }
        }
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn rounded(network: &Network<f64>, input: &[f64]) -> feedforward::Result<Vec<f64>> {
    Ok(network.predict(input)?.into_iter().map(f64::round).collect())
}

fn finish(network: &Network<f64>, save: Option<PathBuf>) -> anyhow::Result<()> {
    if let Some(path) = save {
        network.save(&path)?;

        info!("Saved network to {path:?}");
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    Cli::parse().execute()
}
