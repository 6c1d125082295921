//! A minimal (non-restarted) GMRES, used as the matrix-free inner solver for
//! `MatrixFreeBLS` and, since `LinearAction` is implemented for anything
//! that implements `Matrix`, as a drop-in inner solver for `BorderingBLS`
//! too (scenario S6, "MatrixFreeBLS with a GMRES-style solver").

use crate::errors::Result;
use crate::scalar::Scalar;
use crate::solver::{apply_shifted, IterativeLinearSolver, LinearAction, LinearSolver, SolveOutcome};
use crate::vector::Vector;
use nalgebra::{DMatrix, DVector};
use num_traits::{Float, One, Zero};

#[derive(Clone, Debug)]
pub struct GmresSolver<T: Scalar> {
    pub tol: T,
    pub max_iter: usize,
}

impl<T: Scalar> Default for GmresSolver<T> {
    fn default() -> Self {
        Self {
            tol: T::from_f64(1e-10),
            max_iter: 200,
        }
    }
}

impl<T: Scalar> GmresSolver<T> {
    pub fn new(tol: T, max_iter: usize) -> Self {
        Self { tol, max_iter }
    }
}

fn givens_rotation<T: Scalar>(a: T, b: T) -> (T, T) {
    if b == T::zero() {
        (T::one(), T::zero())
    } else if b.abs() > a.abs() {
        let tau = a / b;
        let s = T::one() / (T::one() + tau * tau).sqrt();
        (s * tau, s)
    } else {
        let tau = b / a;
        let c = T::one() / (T::one() + tau * tau).sqrt();
        (c, c * tau)
    }
}

fn gmres_solve<T, Op>(op: &Op, rhs: &Op::V, shift: Option<T>, tol: T, max_iter: usize) -> SolveOutcome<Op::V>
where
    T: Scalar,
    Op: LinearAction,
    Op::V: Vector<T = T>,
{
    let n = rhs.len();
    let beta0 = rhs.norm();
    if beta0 <= T::from_f64(1e-300) {
        return SolveOutcome::new(Op::V::zeros(n), true, 0);
    }

    let m = max_iter.max(1).min(n.max(1));
    let mut v: Vec<Op::V> = Vec::with_capacity(m + 1);
    let mut v0 = rhs.clone();
    v0.scale_mut(T::one() / beta0);
    v.push(v0);

    let mut h = DMatrix::<T>::zeros(m + 1, m);
    let mut cs = vec![T::zero(); m];
    let mut sn = vec![T::zero(); m];
    let mut g = DVector::<T>::zeros(m + 1);
    g[0] = beta0;

    let mut k_used = 0;
    let mut converged = false;

    for k in 0..m {
        k_used = k + 1;
        let mut w = Op::V::zeros(n);
        apply_shifted(op, shift, &v[k], &mut w);
        for i in 0..=k {
            let hik = w.dot(&v[i]);
            h[(i, k)] = hik;
            w.axpy(-hik, &v[i], T::one());
        }
        let hk1 = w.norm();
        h[(k + 1, k)] = hk1;
        if hk1 > T::from_f64(1e-300) {
            w.scale_mut(T::one() / hk1);
            v.push(w);
        } else {
            v.push(Op::V::zeros(n));
        }

        for i in 0..k {
            let temp = cs[i] * h[(i, k)] + sn[i] * h[(i + 1, k)];
            h[(i + 1, k)] = -sn[i] * h[(i, k)] + cs[i] * h[(i + 1, k)];
            h[(i, k)] = temp;
        }
        let (c, s) = givens_rotation(h[(k, k)], h[(k + 1, k)]);
        cs[k] = c;
        sn[k] = s;
        h[(k, k)] = c * h[(k, k)] + s * h[(k + 1, k)];
        h[(k + 1, k)] = T::zero();

        let temp = c * g[k];
        g[k + 1] = -s * g[k];
        g[k] = temp;

        if (g[k + 1]).abs() <= tol * beta0 {
            converged = true;
            break;
        }
    }

    let mut y = vec![T::zero(); k_used];
    for i in (0..k_used).rev() {
        let mut sum = g[i];
        for j in (i + 1)..k_used {
            sum -= h[(i, j)] * y[j];
        }
        y[i] = sum / h[(i, i)];
    }

    let mut x = Op::V::zeros(n);
    for (i, yi) in y.iter().enumerate() {
        x.axpy(*yi, &v[i], T::one());
    }

    if !converged {
        // Did not reach `tol` within `max_iter`; still return the best
        // Krylov-subspace estimate, per the "non-fatal, surfaced via
        // converged = false" failure semantics of the bordered-solver
        // contract this feeds into.
        log::debug!("gmres: did not converge to tol={tol:?} within {max_iter} iterations");
    }

    SolveOutcome::new(x, converged, k_used)
}

impl<T, Op> LinearSolver<Op> for GmresSolver<T>
where
    T: Scalar,
    Op: LinearAction,
    Op::V: Vector<T = T>,
{
    fn solve(&mut self, op: &Op, r: &Op::V, shift: Option<T>) -> Result<SolveOutcome<Op::V>> {
        Ok(gmres_solve(op, r, shift, self.tol, self.max_iter))
    }
}

impl<T, Op> IterativeLinearSolver<Op> for GmresSolver<T>
where
    T: Scalar,
    Op: LinearAction,
    Op::V: Vector<T = T>,
{
    fn solve(&mut self, op: &Op, rhs: &Op::V) -> Result<SolveOutcome<Op::V>> {
        Ok(gmres_solve(op, rhs, None, self.tol, self.max_iter))
    }
}
