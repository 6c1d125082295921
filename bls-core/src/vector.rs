use crate::scalar::Scalar;
use nalgebra::DVector;
use num_traits::Float;

/// A normed vector space of fixed dimension `n`, used for the `u`-component
/// of a bordered system.
///
/// Kept deliberately small: the bordered solvers only ever need
/// construction, componentwise scratch-reuse arithmetic (`axpy`), a norm and
/// a caller-supplied inner product (`dotp`, passed separately, never hard
/// -coded to `dot`). Anything richer belongs to the inner linear solver, not
/// here.
pub trait Vector: Clone + std::fmt::Debug {
    type T: Scalar;

    fn zeros(n: usize) -> Self;
    fn from_vec(v: Vec<Self::T>) -> Self;
    fn to_vec(&self) -> Vec<Self::T>;
    fn len(&self) -> usize;
    fn at(&self, i: usize) -> Self::T;
    fn set_at(&mut self, i: usize, value: Self::T);

    /// Euclidean dot product. Continuation code should prefer the
    /// caller-supplied `dotp` callback instead of this when one is
    /// available; this exists for default/test configurations.
    fn dot(&self, other: &Self) -> Self::T;

    fn norm(&self) -> Self::T;

    /// `self := alpha * x + beta * self`, in place.
    fn axpy(&mut self, alpha: Self::T, x: &Self, beta: Self::T);

    fn add_scalar_mut(&mut self, s: Self::T);
    fn scale_mut(&mut self, s: Self::T);
    fn copy_from(&mut self, other: &Self);

    fn assert_close(&self, other: &Self, tol: Self::T) {
        assert_eq!(self.len(), other.len(), "vector length mismatch");
        for i in 0..self.len() {
            let d = (self.at(i) - other.at(i)).abs();
            assert!(
                d <= tol,
                "component {i} differs by {d:?} (tol {tol:?}): {:?} vs {:?}",
                self.at(i),
                other.at(i)
            );
        }
    }
}

impl<T: Scalar> Vector for DVector<T> {
    type T = T;

    fn zeros(n: usize) -> Self {
        DVector::from_element(n, T::zero())
    }
    fn from_vec(v: Vec<T>) -> Self {
        DVector::from_vec(v)
    }
    fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }
    fn len(&self) -> usize {
        self.nrows()
    }
    fn at(&self, i: usize) -> T {
        self[i]
    }
    fn set_at(&mut self, i: usize, value: T) {
        self[i] = value;
    }
    fn dot(&self, other: &Self) -> T {
        DVector::dot(self, other)
    }
    fn norm(&self) -> T {
        DVector::norm(self)
    }
    fn axpy(&mut self, alpha: T, x: &Self, beta: T) {
        DVector::axpy(self, alpha, x, beta)
    }
    fn add_scalar_mut(&mut self, s: T) {
        DVector::add_scalar_mut(self, s)
    }
    fn scale_mut(&mut self, s: T) {
        *self *= s;
    }
    fn copy_from(&mut self, other: &Self) {
        DVector::copy_from(self, other)
    }
}
