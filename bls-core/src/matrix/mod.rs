use std::fmt::{Debug, Display};
use std::ops::{Index, IndexMut};

use crate::scalar::Scalar;
use crate::vector::Vector;
use nalgebra::DMatrix;
use num_traits::{One, Zero};

/// A dense matrix, used wherever a bordered solver needs `J`, or the small
/// `m x m` border blocks, materialised rather than applied matrix-free.
///
/// Only `MatrixBLS` and the block-case Schur complement of `BorderingBLS`
/// require this trait; `MatrixFreeBLS` never does.
pub trait Matrix:
    Index<(usize, usize), Output = Self::T> + IndexMut<(usize, usize), Output = Self::T> + Clone + Debug + Display
{
    type V: Vector<T = Self::T>;
    type T: Scalar;

    fn zeros(nrows: usize, ncols: usize) -> Self;
    fn from_diagonal(v: &Self::V) -> Self;
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;

    /// Extract column `i` as an owned vector.
    fn column(&self, i: usize) -> Self::V;

    /// Overwrite column `i` with `v`.
    fn set_column(&mut self, i: usize, v: &Self::V);

    /// `self := alpha * a * b + beta * self`.
    fn gemm(&mut self, alpha: Self::T, a: &Self, b: &Self, beta: Self::T);

    /// `y := alpha * self * x + beta * y`.
    fn gemv(&self, alpha: Self::T, x: &Self::V, beta: Self::T, y: &mut Self::V);

    fn mat_mul(&self, x: &Self) -> Self {
        let mut y = Self::zeros(self.nrows(), x.ncols());
        y.gemm(Self::T::one(), self, x, Self::T::zero());
        y
    }

    /// `y := self * x` (no accumulation).
    fn mul_vec(&self, x: &Self::V) -> Self::V {
        let mut y = Self::V::zeros(self.nrows());
        self.gemv(Self::T::one(), x, Self::T::zero(), &mut y);
        y
    }
}

impl<T: Scalar> Matrix for DMatrix<T> {
    type V = nalgebra::DVector<T>;
    type T = T;

    fn zeros(nrows: usize, ncols: usize) -> Self {
        DMatrix::from_element(nrows, ncols, T::zero())
    }
    fn from_diagonal(v: &Self::V) -> Self {
        DMatrix::from_diagonal(v)
    }
    fn nrows(&self) -> usize {
        DMatrix::nrows(self)
    }
    fn ncols(&self) -> usize {
        DMatrix::ncols(self)
    }
    fn column(&self, i: usize) -> Self::V {
        DMatrix::column(self, i).into_owned()
    }
    fn set_column(&mut self, i: usize, v: &Self::V) {
        self.set_column(i, v);
    }
    fn gemm(&mut self, alpha: T, a: &Self, b: &Self, beta: T) {
        let a = a.clone();
        let b = b.clone();
        self.gemm(alpha, &a, &b, beta);
    }
    fn gemv(&self, alpha: T, x: &Self::V, beta: T, y: &mut Self::V) {
        y.gemv(alpha, self, x, beta);
    }
}

impl<M: Matrix> crate::solver::LinearAction for M {
    type V = M::V;

    fn apply(&self, x: &Self::V, y: &mut Self::V) {
        self.gemv(M::T::one(), x, M::T::zero(), y)
    }
}

/// Solve the dense `m x m` system `a * x = b` via LU with partial pivoting.
///
/// Used for the Schur-complement solve in the block case of `BorderingBLS`
/// and the assembled-matrix solve of `MatrixBLS`. No conditioning
/// safeguards beyond what nalgebra's LU provides.
pub fn dense_solve<T: Scalar>(a: &DMatrix<T>, b: &nalgebra::DVector<T>) -> Option<nalgebra::DVector<T>> {
    a.clone().lu().solve(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemv_matches_hand_computation() {
        let m = DMatrix::<f64>::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let x = nalgebra::DVector::from_vec(vec![1.0, 1.0]);
        let mut y = nalgebra::DVector::from_vec(vec![0.0, 0.0]);
        m.gemv(1.0, &x, 0.0, &mut y);
        assert_eq!(y, nalgebra::DVector::from_vec(vec![3.0, 7.0]));
    }

    #[test]
    fn dense_solve_identity() {
        let a = DMatrix::<f64>::identity(3, 3);
        let b = nalgebra::DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let x = dense_solve(&a, &b).unwrap();
        assert_eq!(x, b);
    }
}
