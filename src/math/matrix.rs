use serde::{Serialize, Deserialize};
use std::ops::{Add, Mul};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |r| r.len()),
            data
        }
    }

    /// A 1×n matrix holding `values`.
    pub fn row_vector(values: Vec<f64>) -> Matrix {
        Matrix::from_data(vec![values])
    }

    /// True when `rows`/`cols` agree with the actual data (no ragged rows).
    /// Matrices read from disk must pass this before any arithmetic.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.rows && self.data.iter().all(|r| r.len() == self.cols)
    }

    /// Consumes a 1×n matrix into its only row.
    pub fn into_row(mut self) -> Vec<f64> {
        if self.data.is_empty() { Vec::new() } else { self.data.swap_remove(0) }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Add<&Matrix> for Matrix {
    type Output = Matrix;

    fn add(mut self, rhs: &Matrix) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        for (row, rhs_row) in self.data.iter_mut().zip(rhs.data.iter()) {
            for (x, y) in row.iter_mut().zip(rhs_row.iter()) {
                *x += y;
            }
        }

        self
    }
}

impl Mul<&Matrix> for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: &Matrix) -> Self::Output {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_vector_times_matrix_plus_bias() {
        let x = Matrix::row_vector(vec![1.0, 2.0]);
        let w = Matrix::from_data(vec![vec![1.0, 0.0, 2.0], vec![0.5, 1.0, -1.0]]);
        let b = Matrix::row_vector(vec![0.0, 1.0, 0.5]);
        let out = (&x * &w + &b).into_row();
        assert_eq!(out, vec![2.0, 3.0, 0.5]);
    }

    #[test]
    fn ragged_data_is_not_well_formed() {
        let m = Matrix { rows: 2, cols: 2, data: vec![vec![1.0, 2.0], vec![3.0]] };
        assert!(!m.is_well_formed());
        assert!(Matrix::zeros(3, 4).is_well_formed());
    }

    #[test]
    #[should_panic(expected = "incorrect sizes")]
    fn mismatched_product_panics() {
        let _ = &Matrix::zeros(1, 3) * &Matrix::zeros(2, 2);
    }
}
