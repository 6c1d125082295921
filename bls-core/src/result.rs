//! The `(u, v, converged, iterations)` result of a bordered solve, modelled
//! as a named struct rather than a bare tuple.

/// Either a single iteration count (dense assembly, a single inner solve)
/// or one count per inner solve (block elimination with `m+1` solves, or
/// `LSFromBLS`'s two-solve overload), preserving per-solve detail instead
/// of collapsing it into a sum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Iterations {
    Scalar(usize),
    Tuple(Vec<usize>),
}

impl Iterations {
    /// Total work done, for callers that only care about a budget.
    pub fn total(&self) -> usize {
        match self {
            Iterations::Scalar(n) => *n,
            Iterations::Tuple(ns) => ns.iter().sum(),
        }
    }
}

/// The result of any bordered-linear-solver call: `u` and `v` solving the
/// bordered system, whether every inner solve converged, and how many
/// iterations each inner solve took.
#[derive(Clone, Debug)]
pub struct BlsSolution<U, P> {
    pub u: U,
    pub v: P,
    pub converged: bool,
    pub iterations: Iterations,
}

impl<U, P> BlsSolution<U, P> {
    pub fn new(u: U, v: P, converged: bool, iterations: Iterations) -> Self {
        Self {
            u,
            v,
            converged,
            iterations,
        }
    }
}
