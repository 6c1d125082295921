//! Pseudo-arclength continuation adapter.
//!
//! A thin convenience layer: derives the scalar-case weights `xi_u, xi_p`
//! from a tangent vector and an arclength weight, then forwards to
//! [`crate::bls::BorderingBLS::solve_scalar`]'s primary contract. No
//! independent logic lives here beyond that derivation.

use crate::bls::bordering::{BorderingBLS, DotProduct};
use crate::errors::Result;
use crate::result::BlsSolution;
use crate::solver::{LinearAction, LinearSolver};
use crate::vector::Vector;
use num_traits::One;

/// A pseudo-arclength predictor step: tangent `(tau.u, tau.p)` and
/// arclength weight `theta`, with `xi_u = theta`, `xi_p = 1 - theta`
/// derived at construction.
#[derive(Clone, Debug)]
pub struct TangentPredictor<V: Vector> {
    pub tau_u: V,
    pub tau_p: V::T,
    pub theta: V::T,
    pub xi_u: V::T,
    pub xi_p: V::T,
}

impl<V: Vector> TangentPredictor<V> {
    pub fn from_tangent(tau_u: V, tau_p: V::T, theta: V::T) -> Self {
        let xi_u = theta;
        let xi_p = V::T::one() - theta;
        Self {
            tau_u,
            tau_p,
            theta,
            xi_u,
            xi_p,
        }
    }

    /// Forward to `BorderingBLS::solve_scalar` using this predictor's
    /// tangent as `(dzu, dzp)` and derived `(xi_u, xi_p)`.
    #[allow(clippy::too_many_arguments)]
    pub fn solve<Op, S>(
        &self,
        bls: &mut BorderingBLS<Op, S>,
        j: &Op,
        d_r: &V,
        r: &V,
        n: V::T,
        shift: Option<V::T>,
        dotp: DotProduct<V>,
    ) -> Result<BlsSolution<V, V::T>>
    where
        Op: LinearAction<V = V>,
        S: LinearSolver<Op>,
    {
        bls.solve_scalar(j, d_r, &self.tau_u, self.tau_p, r, n, self.xi_u, self.xi_p, shift, dotp)
    }
}
