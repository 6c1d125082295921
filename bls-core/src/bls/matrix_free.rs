//! `MatrixFreeBLS`: wrap the bordered system as a single linear operator
//! and delegate to an iterative solver.

use crate::bordered_vector::BorderedVector;
use crate::errors::{BlsError, Result};
use crate::result::{BlsSolution, Iterations};
use crate::solver::{apply_shifted, IterativeLinearSolver, LinearAction};
use crate::vector::Vector;
use nalgebra::DMatrix;
use num_traits::{One, Zero};

/// The bordered operator `B(J, a, b, c, shift, dotp)`, operating on the
/// flat `n+m` representation so it can be plugged into any
/// [`IterativeLinearSolver`].
pub struct BorderedOperator<'a, Op: LinearAction> {
    pub j: &'a Op,
    pub a: &'a [Op::V],
    pub b: &'a [Op::V],
    pub c: &'a DMatrix<<Op::V as Vector>::T>,
    pub shift: Option<<Op::V as Vector>::T>,
    pub dotp: &'a dyn Fn(&Op::V, &Op::V) -> <Op::V as Vector>::T,
    pub n: usize,
    pub m: usize,
    /// Whether `apply` materialises a temporary `BorderedVector` (clearer,
    /// one extra allocation per application) or works directly on the flat
    /// vector's components (leaner, avoids that allocation on every
    /// Krylov-subspace iteration).
    pub use_bordered_array: bool,
}

impl<'a, Op: LinearAction> LinearAction for BorderedOperator<'a, Op> {
    type V = Op::V;

    fn apply(&self, x: &Self::V, y: &mut Self::V) {
        type T = <<Op as LinearAction>::V as Vector>::T;
        let one = T::one();
        let zero = T::zero();
        if self.use_bordered_array {
            let bx = BorderedVector::from_flat(x, self.n, self.m);
            let mut out_u = Op::V::zeros(self.n);
            apply_shifted(self.j, self.shift, &bx.u, &mut out_u);
            for i in 0..self.m {
                out_u.axpy(bx.p[i], &self.a[i], one);
            }
            let mut out_p = vec![zero; self.m];
            for i in 0..self.m {
                let mut cp_i = zero;
                for k in 0..self.m {
                    cp_i += self.c[(i, k)] * bx.p[k];
                }
                out_p[i] = cp_i + (self.dotp)(&self.b[i], &bx.u);
            }
            let out_bv = BorderedVector::new(out_u, out_p);
            y.copy_from(&out_bv.to_flat());
        } else {
            let mut x_u = Op::V::zeros(self.n);
            for i in 0..self.n {
                x_u.set_at(i, x.at(i));
            }
            let mut out_u = Op::V::zeros(self.n);
            apply_shifted(self.j, self.shift, &x_u, &mut out_u);
            for i in 0..self.m {
                let xpi = x.at(self.n + i);
                out_u.axpy(xpi, &self.a[i], one);
            }
            for i in 0..self.n {
                y.set_at(i, out_u.at(i));
            }
            for i in 0..self.m {
                let mut cp_i = zero;
                for k in 0..self.m {
                    cp_i += self.c[(i, k)] * x.at(self.n + k);
                }
                y.set_at(self.n + i, cp_i + (self.dotp)(&self.b[i], &x_u));
            }
        }
    }
}

/// Matrix-free back-end: `J` and the border blocks are only ever applied,
/// never materialised.
pub struct MatrixFreeBLS<S> {
    pub solver: S,
    pub use_bordered_array: bool,
}

impl<S> MatrixFreeBLS<S> {
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            use_bordered_array: true,
        }
    }

    pub fn with_use_bordered_array(mut self, use_bordered_array: bool) -> Self {
        self.use_bordered_array = use_bordered_array;
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn solve<'a, Op>(
        &mut self,
        j: &'a Op,
        a: &'a [Op::V],
        b: &'a [Op::V],
        c: &'a DMatrix<<Op::V as Vector>::T>,
        shift: Option<<Op::V as Vector>::T>,
        r: &Op::V,
        s: &[<Op::V as Vector>::T],
        dotp: &'a dyn Fn(&Op::V, &Op::V) -> <Op::V as Vector>::T,
    ) -> Result<BlsSolution<Op::V, Vec<<Op::V as Vector>::T>>>
    where
        Op: LinearAction,
        S: IterativeLinearSolver<BorderedOperator<'a, Op>>,
    {
        let n = r.len();
        let m = a.len();
        if b.len() != m || s.len() != m || c.nrows() != m || c.ncols() != m {
            return Err(BlsError::dimension_mismatch(m, b.len().max(s.len())));
        }

        let op = BorderedOperator {
            j,
            a,
            b,
            c,
            shift,
            dotp,
            n,
            m,
            use_bordered_array: self.use_bordered_array,
        };
        let rhs = BorderedVector::new(r.clone(), s.to_vec()).to_flat();
        let outcome = self.solver.solve(&op, &rhs)?;
        let sol = BorderedVector::from_flat(&outcome.x, n, m);
        Ok(BlsSolution::new(
            sol.u,
            sol.p,
            outcome.converged,
            Iterations::Scalar(outcome.iterations),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::GmresSolver;
    use nalgebra::DVector;

    fn euclid(a: &DVector<f64>, b: &DVector<f64>) -> f64 {
        a.dot(b)
    }

    #[test]
    fn matches_dense_reference_on_coupled_system() {
        let j = DMatrix::<f64>::from_diagonal(&DVector::from_vec(vec![2.0, 3.0]));
        let a = vec![DVector::from_vec(vec![1.0, 1.0])];
        let b = vec![DVector::from_vec(vec![1.0, 1.0])];
        let c = DMatrix::<f64>::zeros(1, 1);
        let r = DVector::from_vec(vec![3.0, 4.0]);
        let s = vec![2.0];

        let mut mf = MatrixFreeBLS::new(GmresSolver::<f64>::new(1e-12, 100));
        let sol = mf.solve(&j, &a, &b, &c, None, &r, &s, &euclid).unwrap();
        assert!(sol.converged);
        let expected_v = 2.0 / (1.0 / 2.0 + 1.0 / 3.0);
        assert!((sol.v[0] - expected_v).abs() < 1e-6);
    }

    #[test]
    fn flat_and_bordered_apply_agree() {
        let j = DMatrix::<f64>::identity(2, 2);
        let a = vec![DVector::from_vec(vec![1.0, 0.0])];
        let b = vec![DVector::from_vec(vec![0.0, 1.0])];
        let c = DMatrix::<f64>::from_element(1, 1, 2.0);
        let x = DVector::from_vec(vec![1.0, 2.0, 3.0]);

        let op_bordered = BorderedOperator {
            j: &j,
            a: &a,
            b: &b,
            c: &c,
            shift: None,
            dotp: &euclid,
            n: 2,
            m: 1,
            use_bordered_array: true,
        };
        let op_flat = BorderedOperator {
            use_bordered_array: false,
            ..op_bordered
        };
        let mut y1 = DVector::zeros(3);
        let mut y2 = DVector::zeros(3);
        op_bordered.apply(&x, &mut y1);
        op_flat.apply(&x, &mut y2);
        y1.assert_close(&y2, 1e-14);
    }
}
