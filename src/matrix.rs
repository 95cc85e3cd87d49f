use std::fmt;
use std::ops::AddAssign;
use std::ops::Index;
use std::ops::IndexMut;

use num::Float;
use num::Num;
use rand::distributions::uniform::SampleUniform;
use rand::Rng;

use crate::error::Error;
use crate::error::Result;
use crate::error::Shape;

/// Dense row-major matrix with dimensions fixed at construction.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Matrix<T = f64>
where
    T: MatrixItem,
{
    rows: usize,
    cols: usize,
    items: Vec<T>,
}

impl<T> Matrix<T>
where
    T: MatrixItem,
{
    /// Zero-filled `rows x cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        let items = vec![T::zero(); rows * cols];

        Self { rows, cols, items }
    }

    /// Wrap row-major `items` as a `rows x cols` matrix.
    pub fn with_items<J: Into<Vec<T>>>(rows: usize, cols: usize, items: J) -> Result<Self> {
        let items = items.into();

        if items.len() != rows * cols {
            return Err(Error::DimensionMismatch {
                expected: (rows * cols, 1),
                found: (items.len(), 1),
            });
        }

        Ok(Self { rows, cols, items })
    }

    /// Build a matrix from a grid of rows. Every row must have the same length.
    pub fn from_rows(grid: Vec<Vec<T>>) -> Result<Self> {
        let rows = grid.len();
        let cols = grid.first().map_or(0, Vec::len);
        let mut items = Vec::with_capacity(rows * cols);

        for row in grid {
            if row.len() != cols {
                return Err(Error::DimensionMismatch {
                    expected: (1, cols),
                    found: (1, row.len()),
                });
            }

            items.extend(row);
        }

        Ok(Self { rows, cols, items })
    }

    /// `n x 1` column matrix.
    pub fn from_vec(values: &[T]) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            items: values.to_vec(),
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        (self.rows, self.cols)
    }

    /// Cells in row-major order.
    #[inline]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Flatten in row-major order: row 0 first, then row 1, and so on.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }

    /// Copy out the grid of rows.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }

        self.items.chunks(self.cols).map(<[T]>::to_vec).collect()
    }

    pub fn map(&mut self, mut f: impl FnMut(T) -> T) -> &mut Self {
        for item in self.items.iter_mut() {
            *item = f(*item);
        }

        self
    }

    /// Like [`Matrix::map`], with the cell's `(row, col)` passed along.
    pub fn map_indexed(&mut self, mut f: impl FnMut(T, usize, usize) -> T) -> &mut Self {
        let cols = self.cols;

        for (i, item) in self.items.iter_mut().enumerate() {
            *item = f(*item, i / cols, i % cols);
        }

        self
    }

    /// Pure form of [`Matrix::map`]: the receiver is left unchanged.
    pub fn mapped(&self, f: impl FnMut(T) -> T) -> Self {
        let mut result = self.clone();
        result.map(f);

        result
    }

    /// Pure form of [`Matrix::map_indexed`].
    pub fn mapped_indexed(&self, f: impl FnMut(T, usize, usize) -> T) -> Self {
        let mut result = self.clone();
        result.map_indexed(f);

        result
    }

    fn ensure_same_shape(&self, other: &Self) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::DimensionMismatch {
                expected: self.shape(),
                found: other.shape(),
            });
        }

        Ok(())
    }

    fn zip_assign(&mut self, other: &Self, f: impl Fn(T, T) -> T) -> Result<&mut Self> {
        self.ensure_same_shape(other)?;

        for (item, other_item) in self.items.iter_mut().zip(other.items.iter()) {
            *item = f(*item, *other_item);
        }

        Ok(self)
    }

    pub fn add(&mut self, other: &Self) -> Result<&mut Self> {
        self.zip_assign(other, |a, b| a + b)
    }

    pub fn sub(&mut self, other: &Self) -> Result<&mut Self> {
        self.zip_assign(other, |a, b| a - b)
    }

    /// Elementwise product, in place.
    pub fn hadamard(&mut self, other: &Self) -> Result<&mut Self> {
        self.zip_assign(other, |a, b| a * b)
    }

    pub fn add_scalar(&mut self, scalar: T) -> &mut Self {
        self.map(|x| x + scalar)
    }

    pub fn sub_scalar(&mut self, scalar: T) -> &mut Self {
        self.map(|x| x - scalar)
    }

    pub fn scale(&mut self, scalar: T) -> &mut Self {
        self.map(|x| x * scalar)
    }

    /// `a + b` as a new matrix.
    pub fn sum(a: &Self, b: &Self) -> Result<Self> {
        let mut result = a.clone();
        result.add(b)?;

        Ok(result)
    }

    /// `a - b` as a new matrix.
    pub fn difference(a: &Self, b: &Self) -> Result<Self> {
        let mut result = a.clone();
        result.sub(b)?;

        Ok(result)
    }

    /// Matrix product `a . b`, shaped `a.rows x b.cols`.
    pub fn multiply(a: &Self, b: &Self) -> Result<Self> {
        if a.cols != b.rows {
            return Err(Error::IncompatibleShape {
                left: a.shape(),
                right: b.shape(),
            });
        }

        let mut result = Matrix::new(a.rows, b.cols);

        for i in 0..a.rows {
            for j in 0..b.cols {
                let mut sum = T::zero();

                for k in 0..a.cols {
                    sum += a[(i, k)] * b[(k, j)];
                }

                result[(i, j)] = sum;
            }
        }

        Ok(result)
    }

    pub fn transpose(&self) -> Self {
        let mut result = Matrix::new(self.cols, self.rows);

        for i in 0..self.cols {
            for j in 0..self.rows {
                result[(i, j)] = self[(j, i)];
            }
        }

        result
    }
}

impl<T> Matrix<T>
where
    T: MatrixItem + Float + SampleUniform,
{
    /// Fill every cell with a uniform random value in `[low, high)`.
    ///
    /// With `integer_only` the values are floored, so they are integers in
    /// the same half-open range. An empty range (`low == high`) fills the
    /// matrix with `low`.
    pub fn randomize<R: Rng + ?Sized>(
        &mut self,
        low: T,
        high: T,
        integer_only: bool,
        rng: &mut R,
    ) -> Result<&mut Self> {
        Self::ensure_range(low, high)?;

        if low == high {
            return Ok(self.map(|_| low));
        }

        if integer_only {
            let from = low.ceil();

            if from >= high {
                return Err(Error::invalid_argument(format!(
                    "no integer in range [{low:?}, {high:?})"
                )));
            }

            return Ok(self.map(|_| rng.gen_range(from..high).floor()));
        }

        Ok(self.map(|_| rng.gen_range(low..high)))
    }

    /// Bounds accepted by [`Matrix::randomize`]: finite, ordered, and with a
    /// finite width.
    pub(crate) fn ensure_range(low: T, high: T) -> Result<()> {
        if !low.is_finite() || !high.is_finite() || !(high - low).is_finite() {
            return Err(Error::invalid_argument(format!(
                "random range [{low:?}, {high:?}) is not finite"
            )));
        }

        if low > high {
            return Err(Error::invalid_argument(format!(
                "lower limit {low:?} is higher than upper limit {high:?}"
            )));
        }

        Ok(())
    }

    /// [`Matrix::randomize`] drawing from the thread-local generator.
    pub fn randomize_thread(&mut self, low: T, high: T, integer_only: bool) -> Result<&mut Self> {
        self.randomize(low, high, integer_only, &mut rand::thread_rng())
    }
}

pub trait MatrixItem
where
    Self: std::fmt::Debug + Default + Clone + Copy + Num + AddAssign,
{
}

impl MatrixItem for f32 {}
impl MatrixItem for f64 {}

impl<T> Index<(usize, usize)> for Matrix<T>
where
    T: MatrixItem,
{
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        if row >= self.rows || col >= self.cols {
            panic!("Index out of bounds while indexing matrix.");
        }

        &self.items[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T>
where
    T: MatrixItem,
{
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        if row >= self.rows || col >= self.cols {
            panic!("Index out of bounds while indexing matrix.");
        }

        &mut self.items[row * self.cols + col]
    }
}

impl<T> fmt::Display for Matrix<T>
where
    T: MatrixItem + fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in 0..self.rows {
            let cells = (0..self.cols)
                .map(|col| format!("{:.5}", self[(row, col)]))
                .collect::<Vec<_>>();

            writeln!(f, "[{}]", cells.join(", "))?;
        }

        writeln!(f, "{}", "-----".repeat(self.cols))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn counting(rows: usize, cols: usize) -> Matrix<f64> {
        let items = (0..rows * cols).map(|i| (i + 1) as f64).collect::<Vec<_>>();

        Matrix::with_items(rows, cols, items).unwrap()
    }

    #[test]
    fn new_is_zero_filled() {
        let m = Matrix::<f64>::new(3, 2);

        assert_eq!(m.shape(), (3, 2));
        assert!(m.items().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn from_rows_rejects_ragged_grid() {
        let err = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();

        assert_eq!(err, Error::DimensionMismatch { expected: (1, 2), found: (1, 1) });
    }

    #[test]
    fn with_items_checks_length() {
        assert!(Matrix::with_items(2, 2, vec![1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn from_vec_is_a_column() {
        let m = Matrix::from_vec(&[1.0, 2.0, 3.0]);

        assert_eq!(m.shape(), (3, 1));
        assert_eq!(m[(2, 0)], 3.0);
    }

    #[test]
    fn to_vec_is_row_major_for_non_square() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();

        assert_eq!(m.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.transpose().to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn to_rows_matches_grid() {
        let grid = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let m = Matrix::from_rows(grid.clone()).unwrap();

        assert_eq!(m.to_rows(), grid);
    }

    #[test]
    fn map_indexed_visits_every_cell_once() {
        let mut m = Matrix::<f64>::new(2, 3);
        let mut visits = 0;

        m.map_indexed(|x, row, col| {
            visits += 1;
            x + (row * 10 + col) as f64
        });

        assert_eq!(visits, 6);
        assert_eq!(m.to_vec(), vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    }

    #[test]
    fn mapped_leaves_receiver_unchanged() {
        let m = counting(2, 2);
        let doubled = m.mapped(|x| x * 2.0);

        assert_eq!(m.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(doubled.to_vec(), vec![2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn add_then_sub_recovers_original() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut a = Matrix::<f64>::new(4, 3);
        let mut b = Matrix::<f64>::new(4, 3);
        a.randomize(-10.0, 10.0, false, &mut rng).unwrap();
        b.randomize(-10.0, 10.0, false, &mut rng).unwrap();

        let recovered = Matrix::difference(&Matrix::sum(&a, &b).unwrap(), &b).unwrap();

        for (x, y) in recovered.items().iter().zip(a.items()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn elementwise_shape_mismatch() {
        let mut a = counting(2, 3);
        let b = counting(3, 2);

        assert_eq!(
            a.add(&b).unwrap_err(),
            Error::DimensionMismatch { expected: (2, 3), found: (3, 2) }
        );
        assert!(a.sub(&b).is_err());
        assert!(a.hadamard(&b).is_err());
        assert!(Matrix::sum(&a, &b).is_err());

        // a failed operation leaves the operand untouched
        assert_eq!(a, counting(2, 3));
    }

    #[test]
    fn scalar_operations() {
        let mut m = counting(2, 2);
        m.add_scalar(1.0).scale(2.0).sub_scalar(0.5);

        assert_eq!(m.to_vec(), vec![3.5, 5.5, 7.5, 9.5]);
    }

    #[test]
    fn hadamard_multiplies_cellwise() {
        let mut a = counting(2, 2);
        a.hadamard(&counting(2, 2)).unwrap();

        assert_eq!(a.to_vec(), vec![1.0, 4.0, 9.0, 16.0]);
    }

    #[test]
    fn multiply_known_values() {
        let a = counting(2, 3);
        let b = counting(3, 2);
        let product = Matrix::multiply(&a, &b).unwrap();

        assert_eq!(product.shape(), (2, 2));
        assert_eq!(product.to_vec(), vec![22.0, 28.0, 49.0, 64.0]);
    }

    #[test]
    fn multiply_incompatible() {
        let a = counting(2, 3);

        assert_eq!(
            Matrix::multiply(&a, &a).unwrap_err(),
            Error::IncompatibleShape { left: (2, 3), right: (2, 3) }
        );
    }

    #[test]
    fn transpose_properties() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut a = Matrix::<f64>::new(3, 4);
        let mut b = Matrix::<f64>::new(4, 2);
        a.randomize(-5.0, 5.0, false, &mut rng).unwrap();
        b.randomize(-5.0, 5.0, false, &mut rng).unwrap();

        assert_eq!(a.transpose().transpose(), a);

        let left = Matrix::multiply(&b.transpose(), &a.transpose()).unwrap();
        let right = Matrix::multiply(&a, &b).unwrap().transpose();

        assert_eq!(left.shape(), right.shape());
        for (x, y) in left.items().iter().zip(right.items()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-9);
        }
    }

    #[test]
    fn randomize_stays_in_half_open_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut m = Matrix::<f64>::new(50, 40);
        m.randomize(-2.0, 3.0, false, &mut rng).unwrap();

        let min = m.items().iter().cloned().fold(f64::INFINITY, f64::min);
        let max = m.items().iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        assert!(min >= -2.0);
        assert!(max < 3.0);
        assert!(max > min);
    }

    #[test]
    fn randomize_integer_only() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut m = Matrix::<f64>::new(30, 30);
        m.randomize(-3.0, 4.0, true, &mut rng).unwrap();

        for &x in m.items() {
            assert_eq!(x, x.floor());
            assert!((-3.0..4.0).contains(&x));
        }
    }

    #[test]
    fn randomize_rejects_inverted_range() {
        let mut m = counting(2, 2);
        let err = m.randomize_thread(1.0, 0.0, false).unwrap_err();

        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(m, counting(2, 2));
    }

    #[test]
    fn randomize_rejects_non_finite_ranges() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut m = counting(2, 2);

        for (low, high) in [
            (-1e308, 1e308),
            (f64::NAN, 1.0),
            (0.0, f64::NAN),
            (f64::NEG_INFINITY, 0.0),
            (0.0, f64::INFINITY),
        ] {
            let err = m.randomize(low, high, false, &mut rng).unwrap_err();

            assert!(matches!(err, Error::InvalidArgument(_)), "[{low}, {high})");
        }

        assert_eq!(m, counting(2, 2));
    }

    #[test]
    fn randomize_empty_range_fills_low() {
        let mut m = counting(2, 2);
        m.randomize_thread(0.5, 0.5, false).unwrap();

        assert!(m.items().iter().all(|&x| x == 0.5));
    }

    #[test]
    fn seeded_randomize_is_reproducible() {
        let mut a = Matrix::<f64>::new(3, 3);
        let mut b = Matrix::<f64>::new(3, 3);
        a.randomize(0.0, 1.0, false, &mut StdRng::seed_from_u64(9)).unwrap();
        b.randomize(0.0, 1.0, false, &mut StdRng::seed_from_u64(9)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    #[should_panic]
    fn index_out_of_bounds_panics() {
        let m = counting(2, 2);
        let _ = m[(2, 0)];
    }
}
