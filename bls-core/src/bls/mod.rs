//! The four bordered-linear-solver back-ends.

pub mod bordering;
pub mod ls_from_bls;
pub mod matrix_bls;
pub mod matrix_free;

pub use bordering::{BorderingBLS, DotProduct};
pub use ls_from_bls::{LSFromBLS, LsFromBlsOutcome};
pub use matrix_bls::MatrixBLS;
pub use matrix_free::{BorderedOperator, MatrixFreeBLS};
