//! `LSFromBLS`: expose a bordered solver as a plain linear-solver interface
//! over a dense `(n+1) x (n+1)` matrix, factorising the interior block once
//! and reusing it across right-hand sides.

use crate::bls::bordering::BorderingBLS;
use crate::errors::{BlsError, Result};
use crate::result::Iterations;
use crate::scalar::Scalar;
use crate::solver::{LinearSolver, SolveOutcome};
use nalgebra::{DMatrix, DVector};

/// Wraps an already-factorised `J` as a [`LinearSolver`], so the same
/// factorisation serves every inner solve a [`BorderingBLS`] call makes.
/// A one-shot factorisation, not staleness-tracked, since there is no
/// Newton loop here re-linearising between calls.
struct CachedLu<T: Scalar> {
    lu: nalgebra::linalg::LU<T, nalgebra::Dyn, nalgebra::Dyn>,
}

impl<T: Scalar> LinearSolver<DMatrix<T>> for CachedLu<T> {
    fn solve(&mut self, _op: &DMatrix<T>, r: &DVector<T>, _shift: Option<T>) -> Result<SolveOutcome<DVector<T>>> {
        match self.lu.solve(r) {
            Some(x) => Ok(SolveOutcome::new(x, true, 1)),
            None => Ok(SolveOutcome::new(DVector::zeros(r.len()), false, 1)),
        }
    }
}

/// The result of one [`LSFromBLS::solve`] call: the concatenated `(u, v)`
/// solution as a single `n+1` vector, whether the underlying bordered
/// solve converged, and its iteration detail, kept as [`Iterations`] rather
/// than collapsed to a sum, since the rest of this crate never discards
/// per-solve detail either.
#[derive(Clone, Debug)]
pub struct LsFromBlsOutcome<V> {
    pub x: V,
    pub converged: bool,
    pub iterations: Iterations,
}

/// Partitions `M = [[J, a], [bᵀ, c]]`.
struct Partition<T: Scalar> {
    j: DMatrix<T>,
    a: DVector<T>,
    b: DVector<T>,
    c: T,
}

fn partition<T: Scalar>(m: &DMatrix<T>) -> Result<Partition<T>> {
    let total = m.nrows();
    if m.ncols() != total || total == 0 {
        return Err(BlsError::dimension_mismatch(total, m.ncols()));
    }
    let n = total - 1;
    let mut j = DMatrix::<T>::zeros(n, n);
    for col in 0..n {
        for row in 0..n {
            j[(row, col)] = m[(row, col)];
        }
    }
    let mut a = DVector::<T>::zeros(n);
    for row in 0..n {
        a[row] = m[(row, n)];
    }
    let mut b = DVector::<T>::zeros(n);
    for col in 0..n {
        b[col] = m[(n, col)];
    }
    let c = m[(n, n)];
    Ok(Partition { j, a, b, c })
}

fn euclid<T: Scalar>(x: &DVector<T>, y: &DVector<T>) -> T {
    x.dot(y)
}

/// BLS-as-linear-solver back-end.
pub struct LSFromBLS<T: Scalar> {
    pub tol: T,
    pub check_precision: bool,
    pub k: usize,
}

impl<T: Scalar> Default for LSFromBLS<T> {
    fn default() -> Self {
        Self {
            tol: T::from_f64(1e-12),
            check_precision: true,
            k: 1,
        }
    }
}

impl<T: Scalar> LSFromBLS<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tol(mut self, tol: T) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_k(mut self, k: usize) -> Result<Self> {
        if k == 0 {
            return Err(BlsError::configuration("k must be >= 1"));
        }
        self.k = k;
        Ok(self)
    }

    /// Solve `M x = rhs` where `M` is `(n+1) x (n+1)`, via one bordered
    /// solve against the partitioned `J, a, b, c`.
    pub fn solve(&self, m: &DMatrix<T>, rhs: &DVector<T>) -> Result<LsFromBlsOutcome<DVector<T>>> {
        let n = m.nrows().saturating_sub(1);
        if rhs.len() != n + 1 {
            return Err(BlsError::dimension_mismatch(n + 1, rhs.len()));
        }
        let part = partition(m)?;
        let r = DVector::from_iterator(n, (0..n).map(|i| rhs[i]));
        let s = rhs[n];

        let lu = part.j.clone().lu();
        let mut bls = BorderingBLS::<DMatrix<T>, CachedLu<T>>::with_params(
            CachedLu { lu },
            self.tol,
            self.check_precision,
            self.k,
        )?;
        let sol = bls.solve_scalar(
            &part.j,
            &part.a,
            &part.b,
            part.c,
            &r,
            s,
            T::one(),
            T::one(),
            None,
            &euclid,
        )?;

        let mut x = DVector::<T>::zeros(n + 1);
        for i in 0..n {
            x[i] = sol.u[i];
        }
        x[n] = sol.v;

        Ok(LsFromBlsOutcome {
            x,
            converged: sol.converged,
            iterations: sol.iterations,
        })
    }

    /// Solve `M x1 = rhs1` and `M x2 = rhs2`, partitioning and factorising
    /// `J` only once for both.
    pub fn solve_two(
        &self,
        m: &DMatrix<T>,
        rhs1: &DVector<T>,
        rhs2: &DVector<T>,
    ) -> Result<(LsFromBlsOutcome<DVector<T>>, LsFromBlsOutcome<DVector<T>>)> {
        let n = m.nrows().saturating_sub(1);
        if rhs1.len() != n + 1 || rhs2.len() != n + 1 {
            return Err(BlsError::dimension_mismatch(n + 1, rhs1.len().max(rhs2.len())));
        }
        let part = partition(m)?;
        let lu = part.j.clone().lu();
        let mut bls = BorderingBLS::<DMatrix<T>, CachedLu<T>>::with_params(
            CachedLu { lu },
            self.tol,
            self.check_precision,
            self.k,
        )?;

        let mut solve_one = |rhs: &DVector<T>| -> Result<LsFromBlsOutcome<DVector<T>>> {
            let r = DVector::from_iterator(n, (0..n).map(|i| rhs[i]));
            let s = rhs[n];
            let sol = bls.solve_scalar(
                &part.j,
                &part.a,
                &part.b,
                part.c,
                &r,
                s,
                T::one(),
                T::one(),
                None,
                &euclid,
            )?;
            let mut x = DVector::<T>::zeros(n + 1);
            for i in 0..n {
                x[i] = sol.u[i];
            }
            x[n] = sol.v;
            Ok(LsFromBlsOutcome {
                x,
                converged: sol.converged,
                iterations: sol.iterations,
            })
        };

        let o1 = solve_one(rhs1)?;
        let o2 = solve_one(rhs2)?;
        Ok((o1, o2))
    }
}
