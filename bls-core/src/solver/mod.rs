//! The inner linear solver contract: a capability a `BorderingBLS` or
//! `MatrixFreeBLS` is parameterised over, rather than a concrete
//! factorisation. Two call shapes are exposed, matching the single- and
//! dual-right-hand-side forms used by one BEC step.

pub mod dense_lu;
pub mod gmres;

use crate::errors::Result;
use crate::scalar::Scalar;
use crate::vector::Vector;
use num_traits::One;

/// The result of one inner solve: the solution, whether the solver
/// considers itself converged, and how many iterations it took (`1` for a
/// direct factorisation).
#[derive(Clone, Debug)]
pub struct SolveOutcome<V> {
    pub x: V,
    pub converged: bool,
    pub iterations: usize,
}

impl<V> SolveOutcome<V> {
    pub fn new(x: V, converged: bool, iterations: usize) -> Self {
        Self {
            x,
            converged,
            iterations,
        }
    }
}

/// A linear operator `J` that can be solved against, either densely
/// (implements [`crate::matrix::Matrix`]) or matrix-free (implements
/// [`LinearAction`] only). `LinearSolver` is generic over whichever of the
/// two a given back-end needs.
pub trait LinearAction {
    type V: Vector;

    /// `y := self * x`.
    fn apply(&self, x: &Self::V, y: &mut Self::V);
}

/// Capability required of the object plugged in as `BorderingBLS::solver`.
pub trait LinearSolver<Op: LinearAction> {
    /// Solve `(shift*I + J)*x = r`.
    fn solve(
        &mut self,
        op: &Op,
        r: &Op::V,
        shift: Option<<Op::V as Vector>::T>,
    ) -> Result<SolveOutcome<Op::V>>;

    /// Solve `(shift*I + J)*x1 = r1` and `(shift*I + J)*x2 = r2`, reusing a
    /// factorisation across both right-hand sides when the back-end
    /// supports it. The default falls back to two independent `solve`
    /// calls.
    fn solve_two(
        &mut self,
        op: &Op,
        r1: &Op::V,
        r2: &Op::V,
        shift: Option<<Op::V as Vector>::T>,
    ) -> Result<(SolveOutcome<Op::V>, SolveOutcome<Op::V>)> {
        let x1 = self.solve(op, r1, shift)?;
        let x2 = self.solve(op, r2, shift)?;
        Ok((x1, x2))
    }
}

/// Capability required of the object plugged in as `MatrixFreeBLS`'s
/// iterative solver.
pub trait IterativeLinearSolver<Op: LinearAction> {
    fn solve(&mut self, op: &Op, rhs: &Op::V) -> Result<SolveOutcome<Op::V>>;
}

pub use dense_lu::DenseLuSolver;
pub use gmres::GmresSolver;

/// A scalar shift applied to the diagonal of whatever operator follows:
/// `out := (shift*I + op) * x`. Used by `LinearAction` implementations that
/// need to honour the optional `shift` in the bordered-solve contract
/// without baking it into the caller's own operator.
pub fn apply_shifted<Op: LinearAction>(op: &Op, shift: Option<<Op::V as Vector>::T>, x: &Op::V, y: &mut Op::V)
where
    <Op::V as Vector>::T: Scalar,
{
    op.apply(x, y);
    if let Some(s) = shift {
        y.axpy(s, x, <Op::V as Vector>::T::one());
    }
}
