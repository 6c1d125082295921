//! `MatrixBLS`: assemble the full bordered matrix and delegate to a dense
//! solve.

use crate::errors::{BlsError, Result};
use crate::matrix::{dense_solve, Matrix};
use crate::result::{BlsSolution, Iterations};
use crate::vector::Vector;
use nalgebra::{DMatrix, DVector};

/// Dense assembly back-end: the reference implementation against which the
/// other two back-ends are checked for cross-implementation agreement.
///
/// `apply_xi_u`, if set, is invoked once per assembled bottom row,
/// immediately before that row is copied into the full matrix. It may
/// mutate the row in place (e.g. to apply a weighting transform) and is
/// not assumed pure.
pub struct MatrixBLS<'a, T: crate::scalar::Scalar> {
    pub apply_xi_u: Option<&'a dyn Fn(&mut DVector<T>)>,
}

impl<'a, T: crate::scalar::Scalar> Default for MatrixBLS<'a, T> {
    fn default() -> Self {
        Self { apply_xi_u: None }
    }
}

impl<'a, T: crate::scalar::Scalar> MatrixBLS<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_apply_xi_u(mut self, f: &'a dyn Fn(&mut DVector<T>)) -> Self {
        self.apply_xi_u = Some(f);
        self
    }

    /// Solve `(shift*I+J)u + a*v = r; b*u + c*v = s` by assembling the full
    /// `(n+m) x (n+m)` system.
    pub fn solve<M>(
        &self,
        j: &M,
        a: &[M::V],
        b: &[M::V],
        c: &DMatrix<T>,
        shift: Option<T>,
        r: &M::V,
        s: &[T],
    ) -> Result<BlsSolution<M::V, Vec<T>>>
    where
        M: Matrix<T = T, V = DVector<T>>,
    {
        let n = j.nrows();
        let m = a.len();
        if b.len() != m || s.len() != m || c.nrows() != m || c.ncols() != m {
            return Err(BlsError::dimension_mismatch(m, b.len().max(s.len())));
        }

        let mut full = DMatrix::<T>::zeros(n + m, n + m);
        for col in 0..n {
            for row in 0..n {
                full[(row, col)] = j[(row, col)];
            }
            if let Some(sh) = shift {
                full[(col, col)] += sh;
            }
        }
        for (i, a_i) in a.iter().enumerate() {
            for row in 0..n {
                full[(row, n + i)] = a_i.at(row);
            }
        }
        for (i, b_i) in b.iter().enumerate() {
            let mut row_vec = b_i.clone();
            if let Some(f) = self.apply_xi_u {
                f(&mut row_vec);
            }
            for col in 0..n {
                full[(n + i, col)] = row_vec.at(col);
            }
        }
        for row in 0..m {
            for col in 0..m {
                full[(n + row, n + col)] = c[(row, col)];
            }
        }

        let mut rhs = DVector::<T>::zeros(n + m);
        for row in 0..n {
            rhs[row] = r.at(row);
        }
        for (i, &si) in s.iter().enumerate() {
            rhs[n + i] = si;
        }

        let (x, converged) = match dense_solve(&full, &rhs) {
            Some(x) => (x, true),
            None => (DVector::<T>::zeros(n + m), false),
        };

        let u = DVector::from_iterator(n, (0..n).map(|i| x[i]));
        let v: Vec<T> = (0..m).map(|i| x[n + i]).collect();

        Ok(BlsSolution::new(u, v, converged, Iterations::Scalar(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_and_solves_identity_border() {
        let j = DMatrix::<f64>::identity(2, 2);
        let a = vec![DVector::from_vec(vec![0.0, 0.0])];
        let b = vec![DVector::from_vec(vec![0.0, 0.0])];
        let c = DMatrix::<f64>::from_element(1, 1, 1.0);
        let r = DVector::from_vec(vec![1.0, 2.0]);
        let s = vec![3.0];

        let bls = MatrixBLS::<f64>::new();
        let sol = bls.solve::<DMatrix<f64>>(&j, &a, &b, &c, None, &r, &s).unwrap();
        assert!(sol.converged);
        sol.u.assert_close(&r, 1e-10);
        assert!((sol.v[0] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn apply_xi_u_transforms_row_before_assembly() {
        let j = DMatrix::<f64>::identity(2, 2);
        let a = vec![DVector::from_vec(vec![0.0, 0.0])];
        let b = vec![DVector::from_vec(vec![1.0, 0.0])];
        let c = DMatrix::<f64>::from_element(1, 1, 0.0);
        let r = DVector::from_vec(vec![0.0, 0.0]);
        let s = vec![2.0];

        let scale_row = |row: &mut DVector<f64>| *row *= 2.0;
        let bls = MatrixBLS::<f64>::new().with_apply_xi_u(&scale_row);
        let sol = bls.solve::<DMatrix<f64>>(&j, &a, &b, &c, None, &r, &s).unwrap();
        // row becomes (2,0), so 2*u0 = 2 -> u0 = 1
        assert!((sol.u.at(0) - 1.0).abs() < 1e-10);
    }
}
