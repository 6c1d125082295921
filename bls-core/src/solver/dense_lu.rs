use crate::errors::Result;
use crate::matrix::Matrix;
use crate::solver::{LinearSolver, SolveOutcome};
use crate::vector::Vector;
use nalgebra::DMatrix;

/// A reference dense inner solver: factorises `shift*I + J` with nalgebra's
/// LU (partial pivoting) and solves against it.
///
/// The default choice for cross-implementation agreement tests.
#[derive(Clone, Debug, Default)]
pub struct DenseLuSolver;

impl<T, M> LinearSolver<M> for DenseLuSolver
where
    T: crate::scalar::Scalar,
    M: Matrix<T = T, V = nalgebra::DVector<T>>,
{
    fn solve(&mut self, op: &M, r: &M::V, shift: Option<T>) -> Result<SolveOutcome<M::V>> {
        let a = shifted(op, shift);
        match a.lu().solve(r) {
            Some(x) => Ok(SolveOutcome::new(x, true, 1)),
            None => Ok(SolveOutcome::new(M::V::zeros(op.nrows()), false, 1)),
        }
    }

    fn solve_two(
        &mut self,
        op: &M,
        r1: &M::V,
        r2: &M::V,
        shift: Option<T>,
    ) -> Result<(SolveOutcome<M::V>, SolveOutcome<M::V>)> {
        let lu = shifted(op, shift).lu();
        let n = op.nrows();
        let o1 = lu
            .solve(r1)
            .map(|x| SolveOutcome::new(x, true, 1))
            .unwrap_or_else(|| SolveOutcome::new(M::V::zeros(n), false, 1));
        let o2 = lu
            .solve(r2)
            .map(|x| SolveOutcome::new(x, true, 1))
            .unwrap_or_else(|| SolveOutcome::new(M::V::zeros(n), false, 1));
        Ok((o1, o2))
    }
}

fn shifted<T, M>(op: &M, shift: Option<T>) -> DMatrix<T>
where
    T: crate::scalar::Scalar,
    M: Matrix<T = T, V = nalgebra::DVector<T>>,
{
    let n = op.nrows();
    let mut a = DMatrix::<T>::zeros(n, n);
    for j in 0..n {
        for i in 0..n {
            a[(i, j)] = op[(i, j)];
        }
    }
    if let Some(s) = shift {
        for i in 0..n {
            a[(i, i)] += s;
        }
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix as _;

    #[test]
    fn solves_identity() {
        let a = DMatrix::<f64>::identity(2, 2);
        let r = nalgebra::DVector::from_vec(vec![1.0, 2.0]);
        let mut s = DenseLuSolver;
        let out = LinearSolver::solve(&mut s, &a, &r, None).unwrap();
        assert!(out.converged);
        out.x.assert_close(&r, 1e-12);
    }

    #[test]
    fn solves_with_shift() {
        let a = DMatrix::<f64>::from_diagonal(&nalgebra::DVector::from_vec(vec![1.0, 2.0]));
        let r = nalgebra::DVector::from_vec(vec![2.0, 4.0]);
        let mut s = DenseLuSolver;
        // (1*I + diag(1,2)) x = r -> diag(2,3) x = r -> x = (1, 4/3)
        let out = LinearSolver::solve(&mut s, &a, &r, Some(1.0)).unwrap();
        let expect = nalgebra::DVector::from_vec(vec![1.0, 4.0 / 3.0]);
        out.x.assert_close(&expect, 1e-10);
    }
}
