use std::fmt::{Debug, Display, LowerExp};

use num_traits::{Float, FromPrimitive, NumAssignOps, One, Signed, Zero};

/// The real field a bordered solve is carried out over (`f32` or `f64`).
///
/// Everything downstream is generic over this trait rather than hard-coding
/// `f64`, so a caller working in single precision pays no extra cost.
pub trait Scalar:
    Float
    + FromPrimitive
    + NumAssignOps
    + Signed
    + One
    + Zero
    + Debug
    + Display
    + LowerExp
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Construct from an `f64` literal, for algorithm constants.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("scalar out of range")
    }
}

impl Scalar for f64 {}
impl Scalar for f32 {}
