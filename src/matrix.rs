//! Runtime-shaped dense matrices.
//!
//! `Matrix` is a row-major `f32` grid whose shape is a runtime value, so
//! shape-reducing operations like [`Matrix::minor`] stay expressible without
//! a recursive type family. Shapes are tiny (4x4 at most in practice);
//! everything uses the plain textbook algorithms, correctness over speed.
//!
//! Fallible operations come in `try_*` / `Result` form. The arithmetic
//! operators and `Index` delegate to them and panic on misuse, which keeps
//! composition code readable where shapes are statically known to agree.

use std::ops::{Add, Div, Index, IndexMut, Mul, Neg, Sub};

use approx::{AbsDiffEq, RelativeEq};

use crate::arithmetic::float_equals;
use crate::error::MathError;
use crate::vector::Vec4;

/// A dense row-major matrix of `f32` values.
///
/// Both dimensions are strictly positive; constructors reject zero-sized
/// shapes with [`MathError::InvalidArgument`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix {
    rows: usize,
    cols: usize,
    values: Vec<f32>,
}

impl Matrix {
    /// A zero-filled `rows` x `cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, MathError> {
        if rows == 0 || cols == 0 {
            return Err(MathError::InvalidArgument("matrix dimensions must be non-zero"));
        }

        Ok(Self::zeroed(rows, cols))
    }

    // Unvalidated constructor for crate-internal callers with literal shapes.
    pub(crate) fn zeroed(rows: usize, cols: usize) -> Self {
        Self { rows, cols, values: vec![0.0; rows * cols] }
    }

    /// A matrix with `scalar` on the main diagonal and zeros elsewhere.
    pub fn diagonal(rows: usize, cols: usize, scalar: f32) -> Result<Self, MathError> {
        let mut matrix = Self::zeros(rows, cols)?;

        for i in 0..rows.min(cols) {
            matrix.values[i * cols + i] = scalar;
        }

        Ok(matrix)
    }

    /// The `size` x `size` identity matrix.
    pub fn identity(size: usize) -> Result<Self, MathError> {
        Self::diagonal(size, size, 1.0)
    }

    /// Builds a matrix from a row-major value slice.
    ///
    /// The value count must equal `rows * cols`.
    pub fn from_row_major(rows: usize, cols: usize, values: &[f32]) -> Result<Self, MathError> {
        let mut matrix = Self::zeros(rows, cols)?;

        if values.len() != rows * cols {
            return Err(MathError::IncompatibleShape {
                lhs: (rows, cols),
                rhs: (1, values.len()),
            });
        }

        matrix.values.copy_from_slice(values);
        Ok(matrix)
    }

    /// Row count.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Column count.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as `(rows, cols)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Whether the matrix is square.
    #[must_use]
    pub const fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Flat row-major index of `(row, col)`, bounds-checked.
    pub fn index_of(&self, row: usize, col: usize) -> Result<usize, MathError> {
        if row >= self.rows {
            return Err(MathError::OutOfRange { index: row, len: self.rows });
        }

        if col >= self.cols {
            return Err(MathError::OutOfRange { index: col, len: self.cols });
        }

        Ok(row * self.cols + col)
    }

    /// Element at `(row, col)`, or `OutOfRange`.
    pub fn get(&self, row: usize, col: usize) -> Result<f32, MathError> {
        Ok(self.values[self.index_of(row, col)?])
    }

    /// Mutable element at `(row, col)`, or `OutOfRange`.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Result<&mut f32, MathError> {
        let index = self.index_of(row, col)?;
        Ok(&mut self.values[index])
    }

    /// Contiguous row-major values, for interop with APIs expecting raw
    /// float arrays.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Elementwise sum; both shapes must match.
    pub fn try_add(&self, other: &Self) -> Result<Self, MathError> {
        self.zip_elementwise(other, |a, b| a + b)
    }

    /// Elementwise difference; both shapes must match.
    pub fn try_sub(&self, other: &Self) -> Result<Self, MathError> {
        self.zip_elementwise(other, |a, b| a - b)
    }

    /// Matrix product; `other.rows` must equal `self.cols`.
    ///
    /// Standard triple-loop inner-product accumulation.
    pub fn try_mul(&self, other: &Self) -> Result<Self, MathError> {
        if self.cols != other.rows {
            return Err(MathError::IncompatibleShape {
                lhs: self.shape(),
                rhs: other.shape(),
            });
        }

        let mut product = Self::zeros(self.rows, other.cols)?;

        for row in 0..self.rows {
            for col in 0..other.cols {
                let mut sum = 0.0;

                for inner in 0..self.cols {
                    sum += self.values[row * self.cols + inner]
                        * other.values[inner * other.cols + col];
                }

                product.values[row * other.cols + col] = sum;
            }
        }

        Ok(product)
    }

    /// Multiplication by the right-hand inverse.
    pub fn try_div(&self, other: &Self) -> Result<Self, MathError> {
        self.try_mul(&other.inverse()?)
    }

    /// Product with a column `Vec4`; the matrix must be 4x4.
    pub fn transform_vec4(&self, vector: &Vec4) -> Result<Vec4, MathError> {
        if self.shape() != (4, 4) {
            return Err(MathError::IncompatibleShape { lhs: self.shape(), rhs: (4, 1) });
        }

        let mut result = [0.0; 4];

        for (row, out) in result.iter_mut().enumerate() {
            for col in 0..4 {
                *out += self.values[row * 4 + col] * vector[col];
            }
        }

        Ok(Vec4::new(result[0], result[1], result[2], result[3]))
    }

    /// Determinant via recursive cofactor expansion along the first row.
    ///
    /// `NonSquare` on rectangular matrices.
    pub fn determinant(&self) -> Result<f32, MathError> {
        if !self.is_square() {
            return Err(MathError::NonSquare { rows: self.rows, cols: self.cols });
        }

        if self.rows == 1 {
            return Ok(self.values[0]);
        }

        let mut determinant = 0.0;

        for col in 0..self.cols {
            determinant += self.values[col] * self.cofactor(0, col)?;
        }

        Ok(determinant)
    }

    /// The submatrix with `row` and `col` deleted.
    ///
    /// Requires at least a 2x2 matrix and in-range indices.
    pub fn minor(&self, row: usize, col: usize) -> Result<Self, MathError> {
        if self.rows < 2 || self.cols < 2 {
            return Err(MathError::InvalidArgument("minor of a 1x1 matrix is empty"));
        }

        self.index_of(row, col)?;

        let mut minor = Self::zeros(self.rows - 1, self.cols - 1)?;
        let mut cursor = 0;

        for r in 0..self.rows {
            if r == row {
                continue;
            }

            for c in 0..self.cols {
                if c == col {
                    continue;
                }

                minor.values[cursor] = self.values[r * self.cols + c];
                cursor += 1;
            }
        }

        Ok(minor)
    }

    /// Signed minor: `(-1)^(row + col) * minor(row, col).determinant()`.
    pub fn cofactor(&self, row: usize, col: usize) -> Result<f32, MathError> {
        if !self.is_square() {
            return Err(MathError::NonSquare { rows: self.rows, cols: self.cols });
        }

        if self.rows == 1 {
            self.index_of(row, col)?;
            return Ok(1.0);
        }

        let minor_determinant = self.minor(row, col)?.determinant()?;

        if (row + col) % 2 == 0 {
            Ok(minor_determinant)
        } else {
            Ok(-minor_determinant)
        }
    }

    /// The matrix of all cofactors.
    pub fn comatrix(&self) -> Result<Self, MathError> {
        let mut comatrix = Self::zeros(self.rows, self.cols)?;

        for row in 0..self.rows {
            for col in 0..self.cols {
                comatrix.values[row * self.cols + col] = self.cofactor(row, col)?;
            }
        }

        Ok(comatrix)
    }

    /// The adjugate: transpose of the cofactor matrix.
    pub fn adjugate(&self) -> Result<Self, MathError> {
        self.comatrix()?.transposed()
    }

    /// The inverse via the adjugate formula.
    ///
    /// `NonInvertible` when the determinant is tolerance-zero.
    pub fn inverse(&self) -> Result<Self, MathError> {
        let determinant = self.determinant()?;

        if float_equals(determinant, 0.0) {
            return Err(MathError::NonInvertible);
        }

        Ok(self.adjugate()? / determinant)
    }

    /// The transpose. Only square matrices are accepted; the rectangular
    /// transpose is representable but has no consumer in this crate.
    pub fn transposed(&self) -> Result<Self, MathError> {
        if !self.is_square() {
            return Err(MathError::NonSquare { rows: self.rows, cols: self.cols });
        }

        let mut transposed = Self::zeros(self.cols, self.rows)?;

        for row in 0..self.rows {
            for col in 0..self.cols {
                transposed.values[col * self.rows + row] = self.values[row * self.cols + col];
            }
        }

        Ok(transposed)
    }

    /// Whether this matrix is tolerance-equal to the identity of its shape.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.values.iter().enumerate().all(|(index, &value)| {
            let expected = if index / self.cols == index % self.cols { 1.0 } else { 0.0 };
            float_equals(value, expected)
        })
    }

    fn zip_elementwise(
        &self,
        other: &Self,
        op: impl Fn(f32, f32) -> f32,
    ) -> Result<Self, MathError> {
        if self.shape() != other.shape() {
            return Err(MathError::IncompatibleShape {
                lhs: self.shape(),
                rhs: other.shape(),
            });
        }

        let mut result = self.clone();

        for (value, &rhs) in result.values.iter_mut().zip(&other.values) {
            *value = op(*value, rhs);
        }

        Ok(result)
    }

    fn map(mut self, op: impl Fn(f32) -> f32) -> Self {
        for value in &mut self.values {
            *value = op(*value);
        }

        self
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(&a, &b)| float_equals(a, b))
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;

    /// # Panics
    /// Panics when the row or column is out of range.
    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        &self.values[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f32 {
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        &mut self.values[row * self.cols + col]
    }
}

impl Index<usize> for Matrix {
    type Output = f32;

    /// Flat row-major access.
    ///
    /// # Panics
    /// Panics when `index` is out of range.
    fn index(&self, index: usize) -> &f32 {
        &self.values[index]
    }
}

impl IndexMut<usize> for Matrix {
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        &mut self.values[index]
    }
}

impl Add for &Matrix {
    type Output = Matrix;

    /// # Panics
    /// Panics on mismatched shapes; use [`Matrix::try_add`] to recover.
    fn add(self, rhs: Self) -> Matrix {
        match self.try_add(rhs) {
            Ok(sum) => sum,
            Err(error) => panic!("{error}"),
        }
    }
}

impl Sub for &Matrix {
    type Output = Matrix;

    /// # Panics
    /// Panics on mismatched shapes; use [`Matrix::try_sub`] to recover.
    fn sub(self, rhs: Self) -> Matrix {
        match self.try_sub(rhs) {
            Ok(difference) => difference,
            Err(error) => panic!("{error}"),
        }
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    /// # Panics
    /// Panics on mismatched inner dimensions; use [`Matrix::try_mul`] to
    /// recover.
    fn mul(self, rhs: Self) -> Matrix {
        match self.try_mul(rhs) {
            Ok(product) => product,
            Err(error) => panic!("{error}"),
        }
    }
}

impl Add<f32> for Matrix {
    type Output = Self;
    fn add(self, rhs: f32) -> Self {
        self.map(|value| value + rhs)
    }
}

impl Sub<f32> for Matrix {
    type Output = Self;
    fn sub(self, rhs: f32) -> Self {
        self.map(|value| value - rhs)
    }
}

impl Mul<f32> for Matrix {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        self.map(|value| value * rhs)
    }
}

impl Div<f32> for Matrix {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        self.map(|value| value / rhs)
    }
}

impl Neg for Matrix {
    type Output = Self;
    fn neg(self) -> Self {
        self.map(|value| -value)
    }
}

impl AbsDiffEq for Matrix {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.shape() == other.shape()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| f32::abs_diff_eq(a, b, epsilon))
    }
}

impl RelativeEq for Matrix {
    fn default_max_relative() -> f32 {
        f32::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.shape() == other.shape()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| f32::relative_eq(a, b, epsilon, max_relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn matrix(rows: usize, cols: usize, values: &[f32]) -> Matrix {
        Matrix::from_row_major(rows, cols, values).unwrap()
    }

    #[test]
    fn test_constructors_reject_zero_dimensions() {
        assert!(matches!(
            Matrix::zeros(0, 3),
            Err(MathError::InvalidArgument(_))
        ));
        assert!(matches!(
            Matrix::zeros(3, 0),
            Err(MathError::InvalidArgument(_))
        ));
        assert!(matches!(
            Matrix::from_row_major(2, 2, &[1.0, 2.0, 3.0]),
            Err(MathError::IncompatibleShape { .. })
        ));
    }

    #[test]
    fn test_identity_and_diagonal() {
        let identity = Matrix::identity(3).unwrap();
        assert!(identity.is_identity());
        assert_eq!(identity[(1, 1)], 1.0);
        assert_eq!(identity[(1, 2)], 0.0);

        let diagonal = Matrix::diagonal(2, 3, 5.0).unwrap();
        assert_eq!(diagonal[(0, 0)], 5.0);
        assert_eq!(diagonal[(1, 1)], 5.0);
        assert_eq!(diagonal[(0, 2)], 0.0);
        assert!(!diagonal.is_identity());
    }

    #[test]
    fn test_element_access() {
        let mut m = matrix(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        assert_eq!(m.get(1, 2), Ok(6.0));
        assert_eq!(m.index_of(1, 1), Ok(4));
        assert_eq!(
            m.get(2, 0),
            Err(MathError::OutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            m.get(0, 3),
            Err(MathError::OutOfRange { index: 3, len: 3 })
        );

        *m.get_mut(0, 1).unwrap() = 20.0;
        assert_eq!(m[(0, 1)], 20.0);
        assert_eq!(m[1], 20.0);
        assert_eq!(m.as_slice(), &[1.0, 20.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_elementwise_arithmetic_requires_matching_shape() {
        let a = matrix(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let b = matrix(2, 2, &[10.0, 20.0, 30.0, 40.0]);

        assert_eq!(&a + &b, matrix(2, 2, &[11.0, 22.0, 33.0, 44.0]));
        assert_eq!(&b - &a, matrix(2, 2, &[9.0, 18.0, 27.0, 36.0]));

        let c = matrix(2, 3, &[0.0; 6]);
        assert_eq!(
            a.try_add(&c),
            Err(MathError::IncompatibleShape { lhs: (2, 2), rhs: (2, 3) })
        );
    }

    #[test]
    fn test_product_shapes_and_values() {
        let a = matrix(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = matrix(3, 2, &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);

        let product = a.try_mul(&b).unwrap();
        assert_eq!(product, matrix(2, 2, &[58.0, 64.0, 139.0, 154.0]));

        assert_eq!(
            b.try_mul(&matrix(3, 3, &[0.0; 9])),
            Err(MathError::IncompatibleShape { lhs: (3, 2), rhs: (3, 3) })
        );
    }

    #[test]
    fn test_scalar_operators() {
        let m = matrix(2, 2, &[1.0, 2.0, 3.0, 4.0]);

        assert_eq!(m.clone() * 2.0, matrix(2, 2, &[2.0, 4.0, 6.0, 8.0]));
        assert_eq!(m.clone() / 2.0, matrix(2, 2, &[0.5, 1.0, 1.5, 2.0]));
        assert_eq!(m.clone() + 1.0, matrix(2, 2, &[2.0, 3.0, 4.0, 5.0]));
        assert_eq!(-m, matrix(2, 2, &[-1.0, -2.0, -3.0, -4.0]));
    }

    #[test]
    fn test_determinant_base_cases() {
        assert_eq!(matrix(1, 1, &[7.5]).determinant(), Ok(7.5));
        assert_eq!(
            matrix(2, 2, &[3.0, 8.0, 4.0, 6.0]).determinant(),
            Ok(-14.0)
        );
        assert_eq!(
            matrix(2, 3, &[0.0; 6]).determinant(),
            Err(MathError::NonSquare { rows: 2, cols: 3 })
        );
    }

    #[test]
    fn test_cofactor_expansion_consistency() {
        // Expanding along any row or column must give the same determinant.
        let m = matrix(
            4,
            4,
            &[
                2.0, -1.0, 0.0, 3.0,
                1.0, 4.0, -2.0, 1.0,
                0.0, 5.0, 1.0, -1.0,
                3.0, 0.0, 2.0, 4.0,
            ],
        );

        let determinant = m.determinant().unwrap();

        for row in 0..4 {
            let mut expansion = 0.0;
            for col in 0..4 {
                expansion += m[(row, col)] * m.cofactor(row, col).unwrap();
            }
            assert_relative_eq!(expansion, determinant, epsilon = 1.0e-3);
        }

        for col in 0..4 {
            let mut expansion = 0.0;
            for row in 0..4 {
                expansion += m[(row, col)] * m.cofactor(row, col).unwrap();
            }
            assert_relative_eq!(expansion, determinant, epsilon = 1.0e-3);
        }
    }

    #[test]
    fn test_minor_deletes_row_and_column() {
        let m = matrix(3, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);

        assert_eq!(m.minor(1, 1).unwrap(), matrix(2, 2, &[1.0, 3.0, 7.0, 9.0]));
        assert_eq!(m.minor(0, 2).unwrap(), matrix(2, 2, &[4.0, 5.0, 7.0, 8.0]));
        assert!(matrix(1, 1, &[1.0]).minor(0, 0).is_err());
    }

    #[test]
    fn test_transpose_requires_square() {
        let m = matrix(3, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let t = m.transposed().unwrap();

        assert_eq!(t, matrix(3, 3, &[1.0, 4.0, 7.0, 2.0, 5.0, 8.0, 3.0, 6.0, 9.0]));
        assert_eq!(
            matrix(2, 3, &[0.0; 6]).transposed(),
            Err(MathError::NonSquare { rows: 2, cols: 3 })
        );
    }

    #[test]
    fn test_inverse_known_3x3() {
        let m = matrix(3, 3, &[3.75, 3.0, 0.75, 4.5, 2.5, 4.0, 6.5, 4.5, 6.0]);
        let inverse = m.inverse().unwrap();

        let product = m.try_mul(&inverse).unwrap();
        assert_relative_eq!(product, Matrix::identity(3).unwrap(), epsilon = 1.0e-4);
        assert!(product.is_identity());
    }

    #[test]
    fn test_inverse_round_trips_for_sizes_up_to_4() {
        let matrices = [
            matrix(1, 1, &[4.0]),
            matrix(2, 2, &[2.0, 1.0, 5.0, 3.0]),
            matrix(3, 3, &[1.0, 2.0, 0.5, 0.0, 1.0, 4.0, 2.0, -1.0, 1.0]),
            matrix(
                4,
                4,
                &[
                    1.0, 0.0, 2.0, 1.0,
                    0.0, 3.0, 0.0, -1.0,
                    1.0, 0.0, 1.0, 0.0,
                    2.0, 1.0, 0.0, 1.0,
                ],
            ),
        ];

        for m in &matrices {
            let product = m.try_mul(&m.inverse().unwrap()).unwrap();
            assert_relative_eq!(
                product,
                Matrix::identity(m.rows()).unwrap(),
                epsilon = 1.0e-4
            );
        }
    }

    #[test]
    fn test_singular_matrix_is_not_invertible() {
        // Second row is a multiple of the first.
        let singular = matrix(3, 3, &[1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 1.0, 1.0]);
        assert_eq!(singular.inverse(), Err(MathError::NonInvertible));
        assert_eq!(
            matrix(2, 2, &[1.0, 0.0, 0.0, 1.0]).try_div(&singular),
            Err(MathError::NonInvertible)
        );
    }

    #[test]
    fn test_try_div_is_multiplication_by_inverse() {
        let a = matrix(2, 2, &[4.0, 7.0, 2.0, 6.0]);
        let b = matrix(2, 2, &[1.0, 2.0, 3.0, 4.0]);

        let quotient = a.try_div(&b).unwrap();
        assert_relative_eq!(quotient.try_mul(&b).unwrap(), a, epsilon = 1.0e-4);
    }

    #[test]
    fn test_transform_vec4() {
        let mut m = Matrix::identity(4).unwrap();
        m[(0, 3)] = 10.0;
        m[(1, 3)] = -5.0;

        let moved = m.transform_vec4(&Vec4::new(1.0, 2.0, 3.0, 1.0)).unwrap();
        assert_relative_eq!(moved, Vec4::new(11.0, -3.0, 3.0, 1.0), epsilon = 1.0e-6);

        // Directions (w = 0) ignore translation.
        let direction = m.transform_vec4(&Vec4::new(1.0, 2.0, 3.0, 0.0)).unwrap();
        assert_relative_eq!(direction, Vec4::new(1.0, 2.0, 3.0, 0.0), epsilon = 1.0e-6);

        assert!(Matrix::identity(3).unwrap().transform_vec4(&Vec4::zero()).is_err());
    }
}
