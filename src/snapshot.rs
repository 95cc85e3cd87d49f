use std::fs;
use std::path::Path;

use anyhow::Context;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

use crate::activation::Activation;
use crate::error::Error;
use crate::matrix::Matrix;
use crate::network::Network;
use crate::network::NetworkItem;
use crate::training::TrainingData;

/// Serializable state of a [`Network`].
///
/// Weights are stored as grids of rows, biases as flat columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot<T = f64> {
    pub layers: Vec<usize>,
    pub activation: Activation,
    pub weights: Vec<Vec<Vec<T>>>,
    pub biases: Vec<Vec<T>>,
}

impl<T> From<&Network<T>> for NetworkSnapshot<T>
where
    T: NetworkItem,
{
    fn from(network: &Network<T>) -> Self {
        Self {
            layers: network.layers().to_vec(),
            activation: network.activation(),
            weights: network.weights().iter().map(Matrix::to_rows).collect(),
            biases: network.biases().iter().map(Matrix::to_vec).collect(),
        }
    }
}

impl<T> TryFrom<NetworkSnapshot<T>> for Network<T>
where
    T: NetworkItem,
{
    type Error = Error;

    fn try_from(snapshot: NetworkSnapshot<T>) -> Result<Self, Self::Error> {
        let mut network = Network::with_activation(&snapshot.layers, snapshot.activation)?;
        let transitions = network.weights().len();

        if snapshot.weights.len() != transitions || snapshot.biases.len() != transitions {
            return Err(Error::invalid_argument(format!(
                "snapshot has {} weight and {} bias matrices, expected {transitions} of each",
                snapshot.weights.len(),
                snapshot.biases.len()
            )));
        }

        for (index, grid) in snapshot.weights.into_iter().enumerate() {
            network.set_weights(index, Matrix::from_rows(grid)?)?;
        }

        for (index, column) in snapshot.biases.iter().enumerate() {
            network.set_biases(index, Matrix::from_vec(column))?;
        }

        Ok(network)
    }
}

fn write_json<V: Serialize>(value: &V, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {parent:?}"))?;
        }
    }

    let json = serde_json::to_string_pretty(value)?;

    fs::write(path, json).with_context(|| format!("Failed to write {path:?}"))
}

fn read_json<V: DeserializeOwned>(path: &Path) -> anyhow::Result<V> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read {path:?}"))?;

    serde_json::from_str(&json).with_context(|| format!("Failed to parse {path:?}"))
}

impl<T> Network<T>
where
    T: NetworkItem + Serialize + DeserializeOwned,
{
    /// Write the network to `path` as JSON, creating missing parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();

        write_json(&NetworkSnapshot::from(self), path)?;

        debug!("Saved network {:?} to {path:?}", self.layers());

        Ok(())
    }

    /// Restore a network written by [`Network::save`].
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let snapshot: NetworkSnapshot<T> = read_json(path)?;

        let network = Network::try_from(snapshot)
            .with_context(|| format!("Invalid network snapshot in {path:?}"))?;

        debug!("Loaded network {:?} from {path:?}", network.layers());

        Ok(network)
    }
}

impl<T> TrainingData<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        write_json(self, path.as_ref())
    }

    /// Restore training data written by [`TrainingData::save`].
    ///
    /// The examples are pushed one by one, so inconsistent dimensions are rejected.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data: TrainingData<T> = read_json(path)?;

        let data = TrainingData::from_sets(data.sets().to_vec())
            .with_context(|| format!("Invalid training data in {path:?}"))?;

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::training::TrainingSet;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("feedforward-snapshot-{}", std::process::id()))
            .join(name)
    }

    fn random_network() -> Network<f64> {
        let mut rng = StdRng::seed_from_u64(13);
        let mut network = Network::with_activation(&[3, 4, 2], Activation::Tanh).unwrap();
        network.randomize(-1.0, 1.0, &mut rng).unwrap();

        network
    }

    #[test]
    fn snapshot_round_trip() {
        let network = random_network();
        let snapshot = NetworkSnapshot::from(&network);

        assert_eq!(snapshot.layers, vec![3, 4, 2]);
        assert_eq!(snapshot.weights[0].len(), 4);
        assert_eq!(snapshot.weights[0][0].len(), 3);
        assert_eq!(snapshot.biases[1].len(), 2);

        assert_eq!(Network::try_from(snapshot).unwrap(), network);
    }

    #[test]
    fn snapshot_rejects_wrong_shapes() {
        let mut snapshot = NetworkSnapshot::from(&random_network());
        snapshot.weights[1].pop();

        assert!(matches!(
            Network::try_from(snapshot.clone()),
            Err(Error::DimensionMismatch { .. })
        ));

        snapshot.weights.pop();

        assert!(matches!(Network::try_from(snapshot), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn save_and_load_network() {
        let path = temp_path("nested/network.json");
        let network = random_network();

        network.save(&path).unwrap();
        let restored = Network::<f64>::load(&path).unwrap();

        assert_eq!(restored, network);
        assert_eq!(
            restored.predict(&[0.1, 0.2, 0.3]).unwrap(),
            network.predict(&[0.1, 0.2, 0.3]).unwrap()
        );

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn load_missing_file_fails() {
        assert!(Network::<f64>::load(temp_path("missing.json")).is_err());
    }

    #[test]
    fn save_and_load_training_data() {
        let path = temp_path("data.json");
        let data: TrainingData<f64> = TrainingData::from_sets([
            TrainingSet::new([0.0, 1.0], [1.0]),
            TrainingSet::new([1.0, 1.0], [0.0]),
        ])
        .unwrap();

        data.save(&path).unwrap();

        assert_eq!(TrainingData::<f64>::load(&path).unwrap(), data);

        fs::write(
            &path,
            r#"{"sets":[{"inputs":[0.0],"outputs":[1.0]},{"inputs":[0.0,1.0],"outputs":[1.0]}]}"#,
        )
        .unwrap();

        assert!(TrainingData::<f64>::load(&path).is_err());

        fs::remove_file(&path).unwrap();
    }
}
