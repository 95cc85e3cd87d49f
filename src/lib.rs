//! Feed-forward neural networks trained with stochastic backpropagation.

pub mod activation;
pub mod error;
pub mod matrix;
pub mod network;
pub mod snapshot;
pub mod training;

pub use error::Error;
pub use error::Result;

pub mod prelude {
    pub use super::activation::Activation;
    pub use super::error::Error;
    pub use super::matrix::Matrix;
    pub use super::matrix::MatrixItem;
    pub use super::network::Network;
    pub use super::network::NetworkItem;
    pub use super::snapshot::NetworkSnapshot;
    pub use super::training::TrainingData;
    pub use super::training::TrainingSet;
    pub use super::training::TrainingSource;
}
