use std::fmt;
use std::ops::{Add, Mul, Sub};

use rand::Rng;
use rand_distr::StandardNormal;

use crate::activation::activation::Activation;
use crate::error::MatrixError;

type Result<T> = std::result::Result<T, MatrixError>;

/// Dense row-major matrix of `f64`.
///
/// The shape is fixed at construction. Every arithmetic operation comes in an
/// allocating form (`add`, `dot`, ...) and a destination form (`add_into`,
/// `dot_into`, ... or `*_assign` on `self`) that writes into existing storage,
/// so hot loops can run without allocating.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Wraps `data` (row-major) as a `rows x cols` matrix.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Matrix> {
        if data.len() != rows * cols {
            return Err(MatrixError::Shape {
                op: "new",
                left: (rows, cols),
                right: (data.len(), 1),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn identity(size: usize) -> Matrix {
        let mut res = Matrix::zeros(size, size);
        for i in 0..size {
            res.data[i * size + i] = 1.0;
        }
        res
    }

    /// Builds an `n x 1` column vector.
    pub fn column(values: Vec<f64>) -> Matrix {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values,
        }
    }

    /// Builds a matrix from a list of equally long rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Matrix> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(MatrixError::Shape {
                    op: "from_rows",
                    left: (1, n_cols),
                    right: (1, row.len()),
                });
            }
            data.extend(row);
        }
        Ok(Matrix {
            rows: n_rows,
            cols: n_cols,
            data,
        })
    }

    /// Samples every entry i.i.d. from N(0, 1) and multiplies it by `scale`.
    pub fn random_normal<R: Rng + ?Sized>(rows: usize, cols: usize, scale: f64, rng: &mut R) -> Matrix {
        let data = (0..rows * cols)
            .map(|_| rng.sample::<f64, _>(StandardNormal) * scale)
            .collect();
        Matrix { rows, cols, data }
    }

    /// Xavier (Glorot) initialization: N(0, 1) scaled by `1 / sqrt(cols)`.
    ///
    /// `cols` is the fan-in, so the sampled variance of every entry is
    /// `1 / fan_in`. This keeps the pre-activation sums of the next layer
    /// around unit variance and out of the saturated region of
    /// Sigmoid/Tanh.
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::random_normal(rows, cols, 1.0 / (cols as f64).sqrt(), rng)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_vector(&self) -> bool {
        self.rows == 1 || self.cols == 1
    }

    /// Row-major view of the stored values.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_values(self) -> Vec<f64> {
        self.data
    }

    fn index_of(&self, row: usize, col: usize) -> Result<usize> {
        if row < self.rows && col < self.cols {
            Ok(row * self.cols + col)
        } else {
            Err(MatrixError::Index {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.index_of(row, col).map(|i| self.data[i])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        let i = self.index_of(row, col)?;
        self.data[i] = value;
        Ok(())
    }

    /// Zeroes every entry in place.
    pub fn clear(&mut self) {
        self.fill(0.0);
    }

    pub fn fill(&mut self, value: f64) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    // ------------------------------------------------------------------
    // Elementwise arithmetic
    // ------------------------------------------------------------------

    fn check_same(op: &'static str, a: &Matrix, b: &Matrix) -> Result<()> {
        if a.shape() != b.shape() {
            return Err(MatrixError::Shape {
                op,
                left: a.shape(),
                right: b.shape(),
            });
        }
        Ok(())
    }

    fn zip_into<F>(op: &'static str, a: &Matrix, b: &Matrix, dst: &mut Matrix, f: F) -> Result<()>
    where
        F: Fn(f64, f64) -> f64,
    {
        Matrix::check_same(op, a, b)?;
        Matrix::check_same(op, a, dst)?;
        for ((d, &x), &y) in dst.data.iter_mut().zip(&a.data).zip(&b.data) {
            *d = f(x, y);
        }
        Ok(())
    }

    fn zip_assign<F>(&mut self, op: &'static str, other: &Matrix, f: F) -> Result<()>
    where
        F: Fn(f64, f64) -> f64,
    {
        Matrix::check_same(op, self, other)?;
        for (d, &y) in self.data.iter_mut().zip(&other.data) {
            *d = f(*d, y);
        }
        Ok(())
    }

    fn zip_alloc<F>(&self, op: &'static str, other: &Matrix, f: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut res = Matrix::zeros(self.rows, self.cols);
        Matrix::zip_into(op, self, other, &mut res, f)?;
        Ok(res)
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_alloc("add", other, |x, y| x + y)
    }

    pub fn add_into(a: &Matrix, b: &Matrix, dst: &mut Matrix) -> Result<()> {
        Matrix::zip_into("add", a, b, dst, |x, y| x + y)
    }

    pub fn add_assign(&mut self, other: &Matrix) -> Result<()> {
        self.zip_assign("add", other, |x, y| x + y)
    }

    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_alloc("sub", other, |x, y| x - y)
    }

    pub fn sub_into(a: &Matrix, b: &Matrix, dst: &mut Matrix) -> Result<()> {
        Matrix::zip_into("sub", a, b, dst, |x, y| x - y)
    }

    pub fn sub_assign(&mut self, other: &Matrix) -> Result<()> {
        self.zip_assign("sub", other, |x, y| x - y)
    }

    /// Elementwise (Hadamard) product.
    pub fn hadamard(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_alloc("hadamard", other, |x, y| x * y)
    }

    pub fn hadamard_into(a: &Matrix, b: &Matrix, dst: &mut Matrix) -> Result<()> {
        Matrix::zip_into("hadamard", a, b, dst, |x, y| x * y)
    }

    pub fn hadamard_assign(&mut self, other: &Matrix) -> Result<()> {
        self.zip_assign("hadamard", other, |x, y| x * y)
    }

    /// Elementwise division. Division by zero follows IEEE-754 (inf / NaN).
    pub fn hadamard_div(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_alloc("hadamard_div", other, |x, y| x / y)
    }

    pub fn hadamard_div_into(a: &Matrix, b: &Matrix, dst: &mut Matrix) -> Result<()> {
        Matrix::zip_into("hadamard_div", a, b, dst, |x, y| x / y)
    }

    pub fn hadamard_div_assign(&mut self, other: &Matrix) -> Result<()> {
        self.zip_assign("hadamard_div", other, |x, y| x / y)
    }

    pub fn scale(&self, scalar: f64) -> Matrix {
        self.map(|x| scalar * x)
    }

    pub fn scale_into(src: &Matrix, dst: &mut Matrix, scalar: f64) -> Result<()> {
        src.map_into(dst, |x| scalar * x)
    }

    pub fn scale_assign(&mut self, scalar: f64) {
        self.map_in_place(|x| scalar * x);
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    fn check_dst(op: &'static str, expected: (usize, usize), dst: &Matrix) -> Result<()> {
        if dst.shape() != expected {
            return Err(MatrixError::Shape {
                op,
                left: expected,
                right: dst.shape(),
            });
        }
        Ok(())
    }

    /// Standard matrix product `self · other`.
    pub fn dot(&self, other: &Matrix) -> Result<Matrix> {
        let mut res = Matrix::zeros(self.rows, other.cols);
        Matrix::dot_into(self, other, &mut res)?;
        Ok(res)
    }

    /// Writes `a · b` into `dst`, which must be `(a.rows, b.cols)`.
    ///
    /// Each entry is accumulated from `0.0` over the shared index in
    /// increasing order.
    pub fn dot_into(a: &Matrix, b: &Matrix, dst: &mut Matrix) -> Result<()> {
        if a.cols != b.rows {
            return Err(MatrixError::Shape {
                op: "dot",
                left: a.shape(),
                right: b.shape(),
            });
        }
        Matrix::check_dst("dot", (a.rows, b.cols), dst)?;

        for i in 0..a.rows {
            let a_row = &a.data[i * a.cols..(i + 1) * a.cols];
            for j in 0..b.cols {
                let mut sum = 0.0;
                for (k, &x) in a_row.iter().enumerate() {
                    sum += x * b.data[k * b.cols + j];
                }
                dst.data[i * dst.cols + j] = sum;
            }
        }
        Ok(())
    }

    /// `selfᵗ · other` without building the transpose.
    pub fn mul_transpose_a(&self, other: &Matrix) -> Result<Matrix> {
        let mut res = Matrix::zeros(self.cols, other.cols);
        Matrix::mul_transpose_a_into(self, other, &mut res)?;
        Ok(res)
    }

    /// Writes `aᵗ · b` into `dst`, which must be `(a.cols, b.cols)`.
    pub fn mul_transpose_a_into(a: &Matrix, b: &Matrix, dst: &mut Matrix) -> Result<()> {
        if a.rows != b.rows {
            return Err(MatrixError::Shape {
                op: "mul_transpose_a",
                left: a.shape(),
                right: b.shape(),
            });
        }
        Matrix::check_dst("mul_transpose_a", (a.cols, b.cols), dst)?;

        for i in 0..a.cols {
            for j in 0..b.cols {
                let mut sum = 0.0;
                for k in 0..a.rows {
                    sum += a.data[k * a.cols + i] * b.data[k * b.cols + j];
                }
                dst.data[i * dst.cols + j] = sum;
            }
        }
        Ok(())
    }

    /// `self · otherᵗ` without building the transpose.
    ///
    /// With two column vectors this is the outer product.
    pub fn mul_transpose_b(&self, other: &Matrix) -> Result<Matrix> {
        let mut res = Matrix::zeros(self.rows, other.rows);
        Matrix::mul_transpose_b_into(self, other, &mut res)?;
        Ok(res)
    }

    /// Writes `a · bᵗ` into `dst`, which must be `(a.rows, b.rows)`.
    pub fn mul_transpose_b_into(a: &Matrix, b: &Matrix, dst: &mut Matrix) -> Result<()> {
        if a.cols != b.cols {
            return Err(MatrixError::Shape {
                op: "mul_transpose_b",
                left: a.shape(),
                right: b.shape(),
            });
        }
        Matrix::check_dst("mul_transpose_b", (a.rows, b.rows), dst)?;

        for i in 0..a.rows {
            let a_row = &a.data[i * a.cols..(i + 1) * a.cols];
            for j in 0..b.rows {
                let b_row = &b.data[j * b.cols..(j + 1) * b.cols];
                let mut sum = 0.0;
                for (x, y) in a_row.iter().zip(b_row) {
                    sum += x * y;
                }
                dst.data[i * dst.cols + j] = sum;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Transpose
    // ------------------------------------------------------------------

    pub fn transpose(&self) -> Matrix {
        if self.is_vector() {
            // A vector has the same row-major layout either way round.
            return Matrix {
                rows: self.cols,
                cols: self.rows,
                data: self.data.clone(),
            };
        }
        let mut res = Matrix::zeros(self.cols, self.rows);
        self.write_transpose(&mut res);
        res
    }

    /// Like `transpose`, but a vector keeps its allocation.
    pub fn into_transpose(self) -> Matrix {
        if self.is_vector() {
            Matrix {
                rows: self.cols,
                cols: self.rows,
                data: self.data,
            }
        } else {
            self.transpose()
        }
    }

    pub fn transpose_into(&self, dst: &mut Matrix) -> Result<()> {
        Matrix::check_dst("transpose", (self.cols, self.rows), dst)?;
        self.write_transpose(dst);
        Ok(())
    }

    fn write_transpose(&self, dst: &mut Matrix) {
        for i in 0..self.rows {
            for j in 0..self.cols {
                dst.data[j * dst.cols + i] = self.data[i * self.cols + j];
            }
        }
    }

    // ------------------------------------------------------------------
    // Elementwise function application
    // ------------------------------------------------------------------

    pub fn map<F>(&self, f: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    pub fn map_into<F>(&self, dst: &mut Matrix, f: F) -> Result<()>
    where
        F: Fn(f64) -> f64,
    {
        Matrix::check_same("map", self, dst)?;
        for (d, &x) in dst.data.iter_mut().zip(&self.data) {
            *d = f(x);
        }
        Ok(())
    }

    pub fn map_in_place<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64,
    {
        self.data.iter_mut().for_each(|x| *x = f(*x));
    }

    /// Applies `activation` to every entry.
    pub fn activate(&self, activation: Activation) -> Matrix {
        self.map(|x| activation.function(x))
    }

    pub fn activate_into(&self, activation: Activation, dst: &mut Matrix) -> Result<()> {
        self.map_into(dst, |x| activation.function(x))
    }

    /// Applies the derivative of `activation` to every entry.
    pub fn derive(&self, activation: Activation) -> Matrix {
        self.map(|x| activation.derivative(x))
    }

    pub fn derive_into(&self, activation: Activation, dst: &mut Matrix) -> Result<()> {
        self.map_into(dst, |x| activation.derivative(x))
    }

    /// Position of the largest entry.
    ///
    /// Comparison is strict, so the first maximum in row-major order wins.
    /// An empty (or all-NaN) matrix yields `(0, 0)`.
    pub fn argmax(&self) -> (usize, usize) {
        let mut best = f64::NEG_INFINITY;
        let mut index = (0, 0);
        for (n, &value) in self.data.iter().enumerate() {
            if value > best {
                best = value;
                index = (n / self.cols, n % self.cols);
            }
        }
        index
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.data.chunks(self.cols.max(1)).enumerate() {
            if i > 0 {
                writeln!(f, ",")?;
            }
            write!(f, "{{")?;
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{value}")?;
            }
            write!(f, "}}")?;
        }
        Ok(())
    }
}

// Operator sugar. These panic on a shape mismatch; use the `Result`
// returning methods when the shapes are not known to line up.

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        Matrix::add(self, rhs).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        Matrix::sub(self, rhs).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        self.dot(rhs).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl Mul<f64> for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}
