//! `BorderingBLS`: block elimination with correction (BEC+k).

use crate::errors::{BlsError, Result};
use crate::result::{BlsSolution, Iterations};
use crate::scalar::Scalar;
use crate::solver::{LinearAction, LinearSolver};
use crate::vector::Vector;
use nalgebra::DMatrix;
use num_traits::{Float, One};

/// A custom inner product on the `u`-space, passed per call rather than
/// baked into a type parameter: continuation embeds arclength weighting
/// and PDE-discretisation-specific quadrature here.
pub type DotProduct<'a, V> = &'a dyn Fn(&V, &V) -> <V as Vector>::T;

/// Block-elimination bordered solver with optional Govaerts-style
/// iterative refinement.
///
/// Generic over `Op` (the operator standing in for `J`, either a
/// materialised [`crate::matrix::Matrix`] or a matrix-free
/// [`LinearAction`]) and `S`, the inner linear solver plugged in against
/// it.
pub struct BorderingBLS<Op, S>
where
    Op: LinearAction,
    S: LinearSolver<Op>,
{
    pub solver: S,
    pub tol: <Op::V as Vector>::T,
    pub check_precision: bool,
    pub k: usize,
    _op: std::marker::PhantomData<Op>,
}

impl<Op, S> BorderingBLS<Op, S>
where
    Op: LinearAction,
    S: LinearSolver<Op>,
{
    /// `k` must be at least 1; violating this is a configuration error,
    /// raised here at construction time rather than deep inside a solve.
    pub fn new(solver: S) -> Result<Self> {
        Self::with_params(solver, <Op::V as Vector>::T::from_f64(1e-12), true, 1)
    }

    pub fn with_params(
        solver: S,
        tol: <Op::V as Vector>::T,
        check_precision: bool,
        k: usize,
    ) -> Result<Self> {
        if k == 0 {
            return Err(BlsError::configuration("k must be >= 1"));
        }
        Ok(Self {
            solver,
            tol,
            check_precision,
            k,
            _op: std::marker::PhantomData,
        })
    }

    pub fn with_tol(mut self, tol: <Op::V as Vector>::T) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_check_precision(mut self, check_precision: bool) -> Self {
        self.check_precision = check_precision;
        self
    }

    pub fn with_k(mut self, k: usize) -> Result<Self> {
        if k == 0 {
            return Err(BlsError::configuration("k must be >= 1"));
        }
        self.k = k;
        Ok(self)
    }

    /// One BEC step: two solves against the same `shift*I + J`, then the
    /// scalar elimination formula.
    #[allow(clippy::too_many_arguments)]
    fn bec_step(
        &mut self,
        j: &Op,
        d_r: &Op::V,
        dzu: &Op::V,
        dzp: <Op::V as Vector>::T,
        r: &Op::V,
        n: <Op::V as Vector>::T,
        xi_u: <Op::V as Vector>::T,
        xi_p: <Op::V as Vector>::T,
        shift: Option<<Op::V as Vector>::T>,
        dotp: DotProduct<Op::V>,
    ) -> Result<(Op::V, <Op::V as Vector>::T, bool, usize, usize)> {
        let (o1, o2) = self.solver.solve_two(j, r, d_r, shift)?;
        let x1 = o1.x;
        let dx = o2.x;
        let denom = xi_p * dzp - xi_u * dotp(dzu, &dx);
        let dl = (n - xi_u * dotp(dzu, &x1)) / denom;
        let mut d_x = x1;
        d_x.axpy(-dl, &dx, <Op::V as Vector>::T::one());
        Ok((d_x, dl, o1.converged && o2.converged, o1.iterations, o2.iterations))
    }

    /// Scalar case (`m = 1`): solve for a single border unknown `v`.
    #[allow(clippy::too_many_arguments)]
    pub fn solve_scalar(
        &mut self,
        j: &Op,
        d_r: &Op::V,
        dzu: &Op::V,
        dzp: <Op::V as Vector>::T,
        r: &Op::V,
        n: <Op::V as Vector>::T,
        xi_u: <Op::V as Vector>::T,
        xi_p: <Op::V as Vector>::T,
        shift: Option<<Op::V as Vector>::T>,
        dotp: DotProduct<Op::V>,
    ) -> Result<BlsSolution<Op::V, <Op::V as Vector>::T>> {
        let one = <Op::V as Vector>::T::one();
        let (mut d_x, mut dl, converged0, it1, it2) =
            self.bec_step(j, d_r, dzu, dzp, r, n, xi_u, xi_p, shift, dotp)?;
        let mut converged = converged0;
        let mut iterations = vec![it1, it2];

        if self.check_precision {
            for _ in 0..self.k {
                // delta_X := R - (shift*I+J) dX - dl * dR
                let mut j_dx = Op::V::zeros(r.len());
                crate::solver::apply_shifted(j, shift, &d_x, &mut j_dx);
                let mut delta_x = r.clone();
                delta_x.axpy(-one, &j_dx, one);
                delta_x.axpy(-dl, d_r, one);
                let delta_l = n - xi_p * dzp * dl - xi_u * dotp(dzu, &d_x);

                if delta_x.norm() <= self.tol && delta_l.abs() <= self.tol {
                    break;
                }

                let (corr_x, corr_l, conv_k, it1k, it2k) =
                    self.bec_step(j, d_r, dzu, dzp, &delta_x, delta_l, xi_u, xi_p, shift, dotp)?;
                d_x.axpy(one, &corr_x, one);
                dl += corr_l;
                converged = converged && conv_k;
                iterations.push(it1k);
                iterations.push(it2k);
            }
        }

        Ok(BlsSolution::new(d_x, dl, converged, Iterations::Tuple(iterations)))
    }

    /// Block case (`m > 1`): reduces to an `m x m` Schur complement solve.
    ///
    /// `a_cols` are the `n`-dimensional columns of the top-right border
    /// block, `b_cols` are the row functionals of the bottom-left border
    /// block, represented as `n`-dimensional vectors evaluated through
    /// `dotp`, and `c` is the `m x m` bottom-right block. No iterative
    /// refinement is applied on this path.
    pub fn solve_block(
        &mut self,
        j: &Op,
        a_cols: &[Op::V],
        b_cols: &[Op::V],
        c: &DMatrix<<Op::V as Vector>::T>,
        r: &Op::V,
        s: &[<Op::V as Vector>::T],
        shift: Option<<Op::V as Vector>::T>,
        dotp: DotProduct<Op::V>,
    ) -> Result<BlsSolution<Op::V, Vec<<Op::V as Vector>::T>>> {
        type T = <Op::V as Vector>::T;
        let m = a_cols.len();
        if b_cols.len() != m || s.len() != m || c.nrows() != m || c.ncols() != m {
            return Err(BlsError::dimension_mismatch(m, b_cols.len().max(s.len())));
        }
        let n = r.len();

        let o1 = self.solver.solve(j, r, shift)?;
        let mut converged = o1.converged;
        let mut iterations = vec![o1.iterations];
        let x1 = o1.x;

        let mut x2 = Vec::with_capacity(m);
        for a_i in a_cols {
            let o = self.solver.solve(j, a_i, shift)?;
            converged = converged && o.converged;
            iterations.push(o.iterations);
            x2.push(o.x);
        }

        let mut x2_mat = DMatrix::<T>::zeros(n, m);
        let mut b_mat = DMatrix::<T>::zeros(n, m);
        for i in 0..m {
            for row in 0..n {
                x2_mat[(row, i)] = x2[i].at(row);
                b_mat[(row, i)] = b_cols[i].at(row);
            }
        }

        let schur = c - &b_mat.transpose() * &x2_mat;

        let cx1: Vec<T> = b_cols.iter().map(|b_i| dotp(b_i, &x1)).collect();
        let rhs: Vec<T> = s.iter().zip(cx1.iter()).map(|(&si, &cxi)| si - cxi).collect();
        let rhs_vec = nalgebra::DVector::from_vec(rhs);

        let v = match crate::matrix::dense_solve(&schur, &rhs_vec) {
            Some(v) => v,
            None => {
                converged = false;
                nalgebra::DVector::<T>::zeros(m)
            }
        };

        let mut u = x1;
        for i in 0..m {
            u.axpy(-v[i], &x2[i], T::one());
        }

        Ok(BlsSolution::new(
            u,
            v.as_slice().to_vec(),
            converged,
            Iterations::Tuple(iterations),
        ))
    }
}
