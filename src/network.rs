use log::debug;
use log::trace;
use num::Float;
use rand::distributions::uniform::SampleUniform;
use rand::Rng;

use crate::activation::Activation;
use crate::error::Error;
use crate::error::Result;
use crate::matrix::Matrix;
use crate::matrix::MatrixItem;
use crate::training::TrainingSet;
use crate::training::TrainingSource;

/// Fully connected feed-forward neural network.
///
/// Transition `i` maps layer `i` to layer `i + 1` with a
/// `layers[i + 1] x layers[i]` weight matrix and a `layers[i + 1] x 1`
/// bias column. Every layer but the input one is activated.
#[derive(Debug, Clone, PartialEq)]
pub struct Network<T = f64>
where
    T: NetworkItem,
{
    layers: Box<[usize]>,
    weights: Vec<Matrix<T>>,
    biases: Vec<Matrix<T>>,
    activation: Activation,
}

/// Values retained by a forward pass. Index 0 holds the input for both.
struct ForwardPass<T: NetworkItem> {
    pre_activations: Vec<Matrix<T>>,
    activations: Vec<Matrix<T>>,
}

/// Update for one transition, computed before anything is applied.
struct TransitionDelta<T: NetworkItem> {
    index: usize,
    weights: Matrix<T>,
    biases: Matrix<T>,
}

impl<T> Network<T>
where
    T: NetworkItem,
{
    /// Create a new neural network with the sigmoid activation function.
    ///
    /// Weights and biases start at zero.
    pub fn new(layers: &[usize]) -> Result<Self> {
        Self::with_activation(layers, Activation::default())
    }

    /// Create a new neural network with the activation function.
    pub fn with_activation(layers: &[usize], activation: Activation) -> Result<Self> {
        if layers.len() < 2 {
            return Err(Error::invalid_argument(format!(
                "a neural network needs at least 2 layers, got {}",
                layers.len()
            )));
        }

        if let Some(index) = layers.iter().position(|&size| size == 0) {
            return Err(Error::invalid_argument(format!("layer {index} has no neurons")));
        }

        let weights = layers
            .windows(2)
            .map(|pair| Matrix::new(pair[1], pair[0]))
            .collect();

        let biases = layers[1..].iter().map(|&size| Matrix::new(size, 1)).collect();

        debug!("Created network {layers:?} with {activation} activation");

        Ok(Self {
            layers: layers.into(),
            weights,
            biases,
            activation,
        })
    }

    #[inline]
    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.layers[0]
    }

    #[inline]
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1]
    }

    /// Weight matrices, one per layer transition.
    #[inline]
    pub fn weights(&self) -> &[Matrix<T>] {
        &self.weights
    }

    /// Bias columns, one per layer transition.
    #[inline]
    pub fn biases(&self) -> &[Matrix<T>] {
        &self.biases
    }

    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Affects every following `predict` and `train` call.
    pub fn set_activation(&mut self, activation: Activation) {
        self.activation = activation;
    }

    /// Replace the weights of transition `index`, keeping its shape.
    pub fn set_weights(&mut self, index: usize, weights: Matrix<T>) -> Result<()> {
        let current = self.transition(index, &self.weights)?;
        Self::ensure_shape(current, &weights)?;

        self.weights[index] = weights;

        Ok(())
    }

    /// Replace the biases of transition `index`, keeping its shape.
    pub fn set_biases(&mut self, index: usize, biases: Matrix<T>) -> Result<()> {
        let current = self.transition(index, &self.biases)?;
        Self::ensure_shape(current, &biases)?;

        self.biases[index] = biases;

        Ok(())
    }

    fn transition<'a>(&self, index: usize, matrices: &'a [Matrix<T>]) -> Result<&'a Matrix<T>> {
        matrices.get(index).ok_or_else(|| {
            Error::invalid_argument(format!(
                "transition {index} out of range, network has {}",
                matrices.len()
            ))
        })
    }

    fn ensure_shape(current: &Matrix<T>, replacement: &Matrix<T>) -> Result<()> {
        if current.shape() != replacement.shape() {
            return Err(Error::DimensionMismatch {
                expected: current.shape(),
                found: replacement.shape(),
            });
        }

        Ok(())
    }

    fn ensure_input(&self, input: &[T]) -> Result<()> {
        if input.len() != self.input_size() {
            return Err(Error::DimensionMismatch {
                expected: (self.input_size(), 1),
                found: (input.len(), 1),
            });
        }

        Ok(())
    }

    fn ensure_target(&self, target: &[T]) -> Result<()> {
        if target.len() != self.output_size() {
            return Err(Error::DimensionMismatch {
                expected: (self.output_size(), 1),
                found: (target.len(), 1),
            });
        }

        Ok(())
    }

    fn ensure_learning_rate(learning_rate: T) -> Result<()> {
        if !(learning_rate > T::zero() && learning_rate.is_finite()) {
            return Err(Error::invalid_argument(format!(
                "learning rate must be a finite value > 0, got {learning_rate:?}"
            )));
        }

        Ok(())
    }

    /// Forwards the input, keeping every layer's values before and after activation.
    fn forward(&self, input: &[T]) -> Result<ForwardPass<T>> {
        self.ensure_input(input)?;

        let activation = self.activation;
        let input = Matrix::from_vec(input);

        let mut pass = ForwardPass {
            pre_activations: Vec::with_capacity(self.layers.len()),
            activations: Vec::with_capacity(self.layers.len()),
        };

        pass.pre_activations.push(input.clone());
        pass.activations.push(input);

        for (weights, biases) in self.weights.iter().zip(self.biases.iter()) {
            let previous = &pass.activations[pass.activations.len() - 1];

            let mut pre_activation = Matrix::multiply(weights, previous)?;
            pre_activation.add(biases)?;

            let activated = pre_activation.mapped(|x| activation.activate(x));

            pass.pre_activations.push(pre_activation);
            pass.activations.push(activated);
        }

        Ok(pass)
    }

    /// Feed the input through the network and return the output layer.
    pub fn predict(&self, input: &[T]) -> Result<Vec<T>> {
        let mut pass = self.forward(input)?;

        Ok(pass.activations.pop().map(|output| output.to_vec()).unwrap_or_default())
    }

    /// Compute the updates of one backpropagation step without applying them.
    fn backpropagate(
        &self,
        set: &TrainingSet<T>,
        learning_rate: T,
    ) -> Result<Vec<TransitionDelta<T>>> {
        self.ensure_target(set.outputs())?;

        let pass = self.forward(set.inputs())?;
        let transitions = self.weights.len();

        // errors[i] belongs to the output side of transition i
        let target = Matrix::from_vec(set.outputs());
        let mut errors = Vec::with_capacity(transitions);
        errors.push(Matrix::difference(&target, &pass.activations[transitions])?);

        for i in (1..transitions).rev() {
            let next = &errors[errors.len() - 1];
            let error = Matrix::multiply(&self.weights[i].transpose(), next)?;

            errors.push(error);
        }

        errors.reverse();

        let activation = self.activation;
        let mut deltas = Vec::with_capacity(transitions);

        for i in (0..transitions).rev() {
            let mut gradient = pass.pre_activations[i + 1].mapped(|x| activation.differentiate(x));
            gradient.hadamard(&errors[i])?.scale(learning_rate);

            let weights = Matrix::multiply(&gradient, &pass.activations[i].transpose())?;

            deltas.push(TransitionDelta {
                index: i,
                weights,
                biases: gradient,
            });
        }

        Ok(deltas)
    }

    /// Train the network on one example with a single backpropagation step.
    ///
    /// Nothing is modified if the call fails.
    pub fn train(&mut self, set: &TrainingSet<T>, learning_rate: T) -> Result<()> {
        Self::ensure_learning_rate(learning_rate)?;

        let deltas = self.backpropagate(set, learning_rate)?;

        for delta in deltas {
            self.weights[delta.index].add(&delta.weights)?;
            self.biases[delta.index].add(&delta.biases)?;
        }

        trace!("Applied backpropagation step with learning rate {learning_rate:?}");

        Ok(())
    }

    /// Root mean square error of the network's output for one example.
    pub fn example_error(&self, set: &TrainingSet<T>) -> Result<T> {
        self.ensure_target(set.outputs())?;

        let predicted = self.predict(set.inputs())?;

        let squared = set
            .outputs()
            .iter()
            .zip(predicted)
            .fold(T::zero(), |sum, (&expected, actual)| {
                let diff = expected - actual;
                sum + diff * diff
            });

        let count = T::from(set.outputs().len()).ok_or_else(|| {
            Error::invalid_argument("output size is not representable as a network value")
        })?;

        Ok((squared / count).sqrt())
    }

    /// Mean of the per-example root mean square errors.
    pub fn calculate_error<S>(&self, data: &S) -> Result<T>
    where
        S: TrainingSource<T> + ?Sized,
    {
        if data.is_empty() {
            return Err(Error::invalid_argument(
                "cannot calculate the error of empty training data",
            ));
        }

        let mut sum = T::zero();

        for index in 0..data.len() {
            if let Some(set) = data.get(index) {
                sum = sum + self.example_error(set)?;
            }
        }

        let count = T::from(data.len()).ok_or_else(|| {
            Error::invalid_argument("training data size is not representable as a network value")
        })?;

        Ok(sum / count)
    }

    /// Train for `iterations` steps, each on an example drawn uniformly at
    /// random (with replacement) from `data`.
    pub fn train_stochastic<S, R>(
        &mut self,
        data: &S,
        learning_rate: T,
        iterations: usize,
        rng: &mut R,
    ) -> Result<()>
    where
        S: TrainingSource<T> + ?Sized,
        R: Rng + ?Sized,
    {
        Self::ensure_learning_rate(learning_rate)?;

        if iterations == 0 {
            return Err(Error::invalid_argument("must at least do one iteration"));
        }

        if data.is_empty() {
            return Err(Error::invalid_argument("cannot train on empty training data"));
        }

        for index in 0..data.len() {
            if let Some(set) = data.get(index) {
                self.ensure_input(set.inputs())?;
                self.ensure_target(set.outputs())?;
            }
        }

        debug!(
            "Training {:?} for {iterations} iterations on {} examples, learning rate {:?}",
            self.layers,
            data.len(),
            learning_rate
        );

        for _ in 0..iterations {
            let set = data
                .sample(rng)
                .ok_or_else(|| Error::invalid_argument("cannot train on empty training data"))?;

            self.train(set, learning_rate)?;
        }

        debug!("Finished training {:?}", self.layers);

        Ok(())
    }
}

impl<T> Network<T>
where
    T: NetworkItem + SampleUniform,
{
    /// Randomize every weight in `[low, high)`.
    pub fn randomize_weights<R>(&mut self, low: T, high: T, rng: &mut R) -> Result<()>
    where
        R: Rng + ?Sized,
    {
        Self::randomize_all(&mut self.weights, low, high, rng)?;

        debug!("Randomized weights of {:?} in [{low:?}, {high:?})", self.layers);

        Ok(())
    }

    /// Randomize every bias in `[low, high)`.
    pub fn randomize_biases<R>(&mut self, low: T, high: T, rng: &mut R) -> Result<()>
    where
        R: Rng + ?Sized,
    {
        Self::randomize_all(&mut self.biases, low, high, rng)?;

        debug!("Randomized biases of {:?} in [{low:?}, {high:?})", self.layers);

        Ok(())
    }

    /// Randomizes all matrices inside the network.
    pub fn randomize<R: Rng + ?Sized>(&mut self, low: T, high: T, rng: &mut R) -> Result<()> {
        self.randomize_weights(low, high, rng)?;
        self.randomize_biases(low, high, rng)
    }

    fn randomize_all<R>(matrices: &mut [Matrix<T>], low: T, high: T, rng: &mut R) -> Result<()>
    where
        R: Rng + ?Sized,
    {
        Matrix::ensure_range(low, high)?;

        for matrix in matrices.iter_mut() {
            matrix.randomize(low, high, false, rng)?;
        }

        Ok(())
    }
}

pub trait NetworkItem: MatrixItem + Float {}
impl NetworkItem for f32 {}
impl NetworkItem for f64 {}
