use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;

/// One `(input, target)` example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSet<T = f64> {
    inputs: Vec<T>,
    outputs: Vec<T>,
}

impl<T> TrainingSet<T> {
    pub fn new(inputs: impl Into<Vec<T>>, outputs: impl Into<Vec<T>>) -> Self {
        Self {
            inputs: inputs.into(),
            outputs: outputs.into(),
        }
    }

    #[inline]
    pub fn inputs(&self) -> &[T] {
        &self.inputs
    }

    /// Values the network should produce for [`TrainingSet::inputs`].
    #[inline]
    pub fn outputs(&self) -> &[T] {
        &self.outputs
    }
}

/// Read access to a collection of training examples.
pub trait TrainingSource<T> {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<&TrainingSet<T>>;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Uniformly random example, `None` when the source is empty.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&TrainingSet<T>> {
        if self.is_empty() {
            return None;
        }

        self.get(rng.gen_range(0..self.len()))
    }
}

impl<T> TrainingSource<T> for [TrainingSet<T>] {
    #[inline]
    fn len(&self) -> usize {
        <[TrainingSet<T>]>::len(self)
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&TrainingSet<T>> {
        <[TrainingSet<T>]>::get(self, index)
    }
}

impl<T> TrainingSource<T> for Vec<TrainingSet<T>> {
    #[inline]
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&TrainingSet<T>> {
        self.as_slice().get(index)
    }
}

/// Ordered training examples sharing one input and one output length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingData<T = f64> {
    sets: Vec<TrainingSet<T>>,
}

impl<T> Default for TrainingData<T> {
    fn default() -> Self {
        Self { sets: Vec::new() }
    }
}

impl<T> TrainingData<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect examples, failing if their dimensions disagree.
    pub fn from_sets(sets: impl IntoIterator<Item = TrainingSet<T>>) -> Result<Self> {
        let mut data = Self::new();

        for set in sets {
            data.push(set)?;
        }

        Ok(data)
    }

    /// Append an example. Its input and output lengths must match the
    /// examples already stored.
    pub fn push(&mut self, set: TrainingSet<T>) -> Result<()> {
        if let Some(first) = self.sets.first() {
            let expected = (first.inputs.len(), first.outputs.len());
            let found = (set.inputs.len(), set.outputs.len());

            if expected != found {
                return Err(Error::DimensionMismatch { expected, found });
            }
        }

        self.sets.push(set);

        Ok(())
    }

    #[inline]
    pub fn sets(&self) -> &[TrainingSet<T>] {
        &self.sets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrainingSet<T>> {
        self.sets.iter()
    }

    /// `(input length, output length)` of the stored examples.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.sets
            .first()
            .map(|set| (set.inputs.len(), set.outputs.len()))
    }
}

impl<T> TrainingSource<T> for TrainingData<T> {
    #[inline]
    fn len(&self) -> usize {
        self.sets.len()
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&TrainingSet<T>> {
        self.sets.get(index)
    }
}

impl<'a, T> IntoIterator for &'a TrainingData<T> {
    type Item = &'a TrainingSet<T>;
    type IntoIter = std::slice::Iter<'a, TrainingSet<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}
