//! `BorderedVector`: a composite `(u, p)` pair, with an alternative
//! flat-sequence representation used when the underlying iterative solver
//! requires one contiguous vector.

use crate::scalar::Scalar;
use crate::vector::Vector;
use num_traits::{Float, Zero};

/// `x = (u, p)`: `u` lives in the `n`-dimensional space of the bulk
/// unknowns, `p` holds the `m` border unknowns.
///
/// `m` is fixed for the lifetime of the value (and, by construction, for
/// the lifetime of the solver instance that produces it); nothing here
/// resizes `p` after creation.
#[derive(Clone, Debug)]
pub struct BorderedVector<V: Vector> {
    pub u: V,
    pub p: Vec<V::T>,
}

impl<V: Vector> BorderedVector<V> {
    pub fn new(u: V, p: Vec<V::T>) -> Self {
        Self { u, p }
    }

    pub fn zeros(n: usize, m: usize) -> Self {
        Self {
            u: V::zeros(n),
            p: vec![V::T::zero(); m],
        }
    }

    pub fn m(&self) -> usize {
        self.p.len()
    }

    pub fn n(&self) -> usize {
        self.u.len()
    }

    /// `self := alpha * x + beta * self`, componentwise across both `u` and
    /// `p`.
    pub fn axpy(&mut self, alpha: V::T, x: &Self, beta: V::T) {
        assert_eq!(self.m(), x.m(), "border width mismatch in BorderedVector::axpy");
        self.u.axpy(alpha, &x.u, beta);
        for i in 0..self.p.len() {
            self.p[i] = alpha * x.p[i] + beta * self.p[i];
        }
    }

    pub fn norm(&self) -> V::T {
        let u_norm = self.u.norm();
        let p_norm_sq: V::T = self.p.iter().fold(V::T::zero(), |acc, &pi| acc + pi * pi);
        (u_norm * u_norm + p_norm_sq).sqrt()
    }

    pub fn scale_mut(&mut self, s: V::T) {
        self.u.scale_mut(s);
        for pi in self.p.iter_mut() {
            *pi *= s;
        }
    }

    /// Flatten into a single `n+m` sequence, `V` itself when `V` is also the
    /// flat representation expected by an iterative solver.
    pub fn to_flat(&self) -> V {
        let n = self.n();
        let m = self.m();
        let mut flat = V::zeros(n + m);
        for i in 0..n {
            flat.set_at(i, self.u.at(i));
        }
        for (i, &pi) in self.p.iter().enumerate() {
            flat.set_at(n + i, pi);
        }
        flat
    }

    pub fn from_flat(flat: &V, n: usize, m: usize) -> Self {
        assert_eq!(flat.len(), n + m, "flat vector length mismatch");
        let mut u = V::zeros(n);
        for i in 0..n {
            u.set_at(i, flat.at(i));
        }
        let p = (0..m).map(|i| flat.at(n + i)).collect();
        Self { u, p }
    }

    pub fn assert_close(&self, other: &Self, tol: V::T) {
        self.u.assert_close(&other.u, tol);
        assert_eq!(self.p.len(), other.p.len());
        for (a, b) in self.p.iter().zip(other.p.iter()) {
            assert!((*a - *b).abs() <= tol, "border component differs: {a:?} vs {b:?}");
        }
    }
}

/// The `m = 1` specialisation: a single border scalar rather than a
/// length-1 `Vec`, avoiding a heap allocation per solve in the common
/// fold/arclength case.
#[derive(Clone, Debug)]
pub struct BorderedVectorScalar<V: Vector> {
    pub u: V,
    pub p: V::T,
}

impl<V: Vector> BorderedVectorScalar<V> {
    pub fn new(u: V, p: V::T) -> Self {
        Self { u, p }
    }

    pub fn zeros(n: usize) -> Self {
        Self {
            u: V::zeros(n),
            p: V::T::zero(),
        }
    }

    pub fn norm(&self) -> V::T {
        let u_norm = self.u.norm();
        (u_norm * u_norm + self.p * self.p).sqrt()
    }
}

impl<V: Vector> From<BorderedVectorScalar<V>> for BorderedVector<V> {
    fn from(x: BorderedVectorScalar<V>) -> Self {
        BorderedVector::new(x.u, vec![x.p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    #[test]
    fn flat_round_trip() {
        let bv = BorderedVector::new(DVector::from_vec(vec![1.0, 2.0, 3.0]), vec![4.0, 5.0]);
        let flat = bv.to_flat();
        assert_eq!(flat, DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]));
        let back = BorderedVector::from_flat(&flat, 3, 2);
        back.assert_close(&bv, 1e-14);
    }

    #[test]
    fn axpy_scales_both_components() {
        let mut a = BorderedVector::new(DVector::from_vec(vec![1.0, 1.0]), vec![1.0]);
        let b = BorderedVector::new(DVector::from_vec(vec![2.0, 2.0]), vec![2.0]);
        a.axpy(2.0, &b, 1.0);
        assert_eq!(a.u, DVector::from_vec(vec![5.0, 5.0]));
        assert_eq!(a.p, vec![5.0]);
    }
}
