//! End-to-end scenarios and cross-component properties that need more than
//! one back-end's public API at once.

use bls_core::solver::{DenseLuSolver, GmresSolver, LinearSolver};
use bls_core::{BorderingBLS, MatrixBLS, MatrixFreeBLS, Vector};
use nalgebra::{DMatrix, DVector};

fn euclid(a: &DVector<f64>, b: &DVector<f64>) -> f64 {
    a.dot(b)
}

// S1: Identity border.
#[test]
fn s1_identity_border() {
    let j = DMatrix::<f64>::identity(3, 3);
    let a = DVector::zeros(3);
    let b = DVector::zeros(3);
    let r = DVector::from_vec(vec![1.0, 2.0, 3.0]);

    let mut bls = BorderingBLS::<DMatrix<f64>, DenseLuSolver>::new(DenseLuSolver).unwrap();
    let sol = bls.solve_scalar(&j, &a, &b, 1.0, &r, 4.0, 1.0, 1.0, None, &euclid).unwrap();
    assert!(sol.converged);
    sol.u.assert_close(&r, 1e-10);
    assert!((sol.v - 4.0).abs() < 1e-10);
}

// S2: Coupled.
#[test]
fn s2_coupled() {
    let j = DMatrix::<f64>::from_diagonal(&DVector::from_vec(vec![2.0, 3.0]));
    let a = DVector::from_vec(vec![1.0, 1.0]);
    let b = DVector::from_vec(vec![1.0, 1.0]);
    let r = DVector::from_vec(vec![3.0, 4.0]);

    let mut bls = BorderingBLS::<DMatrix<f64>, DenseLuSolver>::new(DenseLuSolver).unwrap();
    let sol = bls.solve_scalar(&j, &a, &b, 0.0, &r, 2.0, 1.0, 1.0, None, &euclid).unwrap();
    let expected_v = 12.0 / 5.0;
    assert!((sol.v - expected_v).abs() < 1e-10);
    let expected_u = DVector::from_vec(vec![3.0 / 10.0, 16.0 / 15.0]);
    sol.u.assert_close(&expected_u, 1e-10);
}

// S3: Fold limit, a near-singular J must not crash and must return finite output.
#[test]
fn s3_fold_limit_does_not_crash() {
    let j = DMatrix::<f64>::from_diagonal(&DVector::from_vec(vec![1.0, 1e-12]));
    let a = DVector::from_vec(vec![0.0, 1.0]);
    let b = DVector::from_vec(vec![0.0, 1.0]);
    let r = DVector::from_vec(vec![1.0, 1.0]);

    let mut bls = BorderingBLS::<DMatrix<f64>, DenseLuSolver>::new(DenseLuSolver).unwrap();
    let sol = bls.solve_scalar(&j, &a, &b, 0.0, &r, 1.0, 1.0, 1.0, None, &euclid).unwrap();
    assert!(sol.u.at(0).is_finite());
    assert!(sol.u.at(1).is_finite());
    assert!(sol.v.is_finite());
}

// S4: Refinement recovery, a deliberately noisy inner solver's error is
// corrected back down near tol by iterative refinement.
struct NoisyLu {
    relative_error: f64,
}
impl LinearSolver<DMatrix<f64>> for NoisyLu {
    fn solve(
        &mut self,
        op: &DMatrix<f64>,
        r: &DVector<f64>,
        shift: Option<f64>,
    ) -> bls_core::Result<bls_core::SolveOutcome<DVector<f64>>> {
        let mut out = LinearSolver::solve(&mut DenseLuSolver, op, r, shift)?;
        let mag = out.x.norm().max(1.0);
        let mut perturbed = out.x.clone();
        perturbed.add_scalar_mut(self.relative_error * mag);
        out.x = perturbed;
        Ok(out)
    }
}

#[test]
fn s4_refinement_recovery() {
    let j = DMatrix::<f64>::identity(3, 3);
    let a = DVector::zeros(3);
    let b = DVector::zeros(3);
    let r = DVector::from_vec(vec![1.0, 2.0, 3.0]);

    let mut bls = BorderingBLS::<DMatrix<f64>, NoisyLu>::with_params(
        NoisyLu { relative_error: 1e-6 },
        1e-12,
        true,
        3,
    )
    .unwrap();
    let sol = bls.solve_scalar(&j, &a, &b, 1.0, &r, 4.0, 1.0, 1.0, None, &euclid).unwrap();

    // residual of the u-equation: R - (shift*I+J) u - a*v
    let mut j_u = DVector::zeros(3);
    j.gemv(1.0, &sol.u, 0.0, &mut j_u);
    let mut resid = r.clone();
    resid.axpy(-1.0, &j_u, 1.0);
    resid.axpy(-sol.v, &a, 1.0);
    assert!(resid.norm() <= 1e-9, "residual {} too large", resid.norm());
}

// S5: Block m=2. J=I4, a=b=(e1,e2), c=2*I2, r=0, s=(1,1).
// x1 = 0, x2 = (e1,e2), schur = c - bᵀx2 = 2*I2 - I2 = I2, so v = (1,1)
// and u = x1 - (v1*x2_1 + v2*x2_2) = -e1-e2.
#[test]
fn s5_block_m2() {
    let j = DMatrix::<f64>::identity(4, 4);
    let e1 = DVector::from_vec(vec![1.0, 0.0, 0.0, 0.0]);
    let e2 = DVector::from_vec(vec![0.0, 1.0, 0.0, 0.0]);
    let b_cols = vec![e1.clone(), e2.clone()];
    let c_cols = vec![e1, e2];
    let d = DMatrix::<f64>::identity(2, 2) * 2.0;
    let r = DVector::zeros(4);
    let s = vec![1.0, 1.0];

    let mut bls = BorderingBLS::<DMatrix<f64>, DenseLuSolver>::new(DenseLuSolver).unwrap();
    let sol = bls.solve_block(&j, &b_cols, &c_cols, &d, &r, &s, None, &euclid).unwrap();
    assert!(sol.converged);
    let expected_u = DVector::from_vec(vec![-1.0, -1.0, 0.0, 0.0]);
    sol.u.assert_close(&expected_u, 1e-10);
    assert!((sol.v[0] - 1.0).abs() < 1e-10);
    assert!((sol.v[1] - 1.0).abs() < 1e-10);
}

// S6: Matrix-free equivalence, MatrixFreeBLS with GMRES reproduces
// MatrixBLS's output to 1e-10 on S1 and S2.
#[test]
fn s6_matrix_free_matches_matrix_bls_on_s1() {
    let j = DMatrix::<f64>::identity(3, 3);
    let a = vec![DVector::zeros(3)];
    let b = vec![DVector::zeros(3)];
    let c = DMatrix::<f64>::from_element(1, 1, 1.0);
    let r = DVector::from_vec(vec![1.0, 2.0, 3.0]);
    let s = vec![4.0];

    let dense = MatrixBLS::<f64>::new().solve::<DMatrix<f64>>(&j, &a, &b, &c, None, &r, &s).unwrap();
    let mut mf = MatrixFreeBLS::new(GmresSolver::<f64>::new(1e-12, 200));
    let free = mf.solve(&j, &a, &b, &c, None, &r, &s, &euclid).unwrap();

    free.u.assert_close(&dense.u, 1e-10);
    for i in 0..1 {
        assert!((free.v[i] - dense.v[i]).abs() < 1e-10);
    }
}

#[test]
fn s6_matrix_free_matches_matrix_bls_on_s2() {
    let j = DMatrix::<f64>::from_diagonal(&DVector::from_vec(vec![2.0, 3.0]));
    let a = vec![DVector::from_vec(vec![1.0, 1.0])];
    let b = vec![DVector::from_vec(vec![1.0, 1.0])];
    let c = DMatrix::<f64>::zeros(1, 1);
    let r = DVector::from_vec(vec![3.0, 4.0]);
    let s = vec![2.0];

    let dense = MatrixBLS::<f64>::new().solve::<DMatrix<f64>>(&j, &a, &b, &c, None, &r, &s).unwrap();
    let mut mf = MatrixFreeBLS::new(GmresSolver::<f64>::new(1e-12, 200));
    let free = mf.solve(&j, &a, &b, &c, None, &r, &s, &euclid).unwrap();

    free.u.assert_close(&dense.u, 1e-10);
    assert!((free.v[0] - dense.v[0]).abs() < 1e-10);
}

// Property 2: cross-implementation agreement across all three back-ends.
#[test]
fn property_cross_implementation_agreement() {
    let j = DMatrix::<f64>::from_diagonal(&DVector::from_vec(vec![4.0, 5.0, 6.0]));
    let a = vec![DVector::from_vec(vec![1.0, 0.5, 0.25])];
    let b = vec![DVector::from_vec(vec![0.25, 0.5, 1.0])];
    let c = DMatrix::<f64>::from_element(1, 1, 0.1);
    let r = DVector::from_vec(vec![1.0, 2.0, 3.0]);
    let s = vec![0.5];

    let mut bordering = BorderingBLS::<DMatrix<f64>, DenseLuSolver>::new(DenseLuSolver).unwrap();
    let bordering_sol = bordering
        .solve_scalar(&j, &a[0], &b[0], c[(0, 0)], &r, s[0], 1.0, 1.0, None, &euclid)
        .unwrap();

    let dense_sol = MatrixBLS::<f64>::new().solve::<DMatrix<f64>>(&j, &a, &b, &c, None, &r, &s).unwrap();

    let mut mf = MatrixFreeBLS::new(GmresSolver::<f64>::new(1e-13, 500));
    let free_sol = mf.solve(&j, &a, &b, &c, None, &r, &s, &euclid).unwrap();

    bordering_sol.u.assert_close(&dense_sol.u, 1e-10);
    assert!((bordering_sol.v - dense_sol.v[0]).abs() < 1e-10);
    free_sol.u.assert_close(&dense_sol.u, 1e-8);
    assert!((free_sol.v[0] - dense_sol.v[0]).abs() < 1e-8);
}

// Property 3: refinement monotonicity, residual norm is non-increasing in k.
#[test]
fn property_refinement_monotonicity() {
    let j = DMatrix::<f64>::identity(3, 3);
    let a = DVector::zeros(3);
    let b = DVector::zeros(3);
    let r = DVector::from_vec(vec![1.0, 2.0, 3.0]);

    let residual_norm = |k: usize| -> f64 {
        let mut bls =
            BorderingBLS::<DMatrix<f64>, NoisyLu>::with_params(NoisyLu { relative_error: 1e-4 }, 1e-14, true, k)
                .unwrap();
        let sol = bls.solve_scalar(&j, &a, &b, 1.0, &r, 4.0, 1.0, 1.0, None, &euclid).unwrap();
        let mut j_u = DVector::zeros(3);
        j.gemv(1.0, &sol.u, 0.0, &mut j_u);
        let mut resid = r.clone();
        resid.axpy(-1.0, &j_u, 1.0);
        resid.axpy(-sol.v, &a, 1.0);
        resid.norm()
    };

    let n0 = residual_norm(1);
    let n1 = residual_norm(2);
    let n2 = residual_norm(3);
    assert!(n1 <= n0 + 1e-15);
    assert!(n2 <= n1 + 1e-15);
}

// Property 4: scaling equivariance, (r,s) -> alpha*(r,s) implies (u,v) -> alpha*(u,v).
#[test]
fn property_scaling_equivariance() {
    let j = DMatrix::<f64>::from_diagonal(&DVector::from_vec(vec![2.0, 5.0]));
    let a = DVector::from_vec(vec![1.0, 2.0]);
    let b = DVector::from_vec(vec![0.5, 0.5]);
    let r = DVector::from_vec(vec![3.0, 7.0]);
    let s = 1.5;
    let alpha = 2.5;

    let mut bls = BorderingBLS::<DMatrix<f64>, DenseLuSolver>::new(DenseLuSolver).unwrap();
    let base = bls.solve_scalar(&j, &a, &b, 0.3, &r, s, 1.0, 1.0, None, &euclid).unwrap();

    let mut r_scaled = r.clone();
    r_scaled.scale_mut(alpha);
    let scaled = bls.solve_scalar(&j, &a, &b, 0.3, &r_scaled, alpha * s, 1.0, 1.0, None, &euclid).unwrap();

    let mut expected_u = base.u.clone();
    expected_u.scale_mut(alpha);
    scaled.u.assert_close(&expected_u, 1e-8);
    assert!((scaled.v - alpha * base.v).abs() < 1e-8);
}

// Property 5: block/scalar consistency, the m=1 block path matches the
// scalar path to 1e-12.
#[test]
fn property_block_scalar_consistency() {
    let j = DMatrix::<f64>::from_diagonal(&DVector::from_vec(vec![2.0, 3.0, 5.0]));
    let a_col = DVector::from_vec(vec![1.0, 0.5, 0.25]);
    let b_col = DVector::from_vec(vec![0.25, 0.5, 1.0]);
    let r = DVector::from_vec(vec![1.0, 2.0, 3.0]);

    let mut bls = BorderingBLS::<DMatrix<f64>, DenseLuSolver>::new(DenseLuSolver).unwrap();
    let scalar_sol = bls.solve_scalar(&j, &a_col, &b_col, 0.2, &r, 0.7, 1.0, 1.0, None, &euclid).unwrap();

    let d = DMatrix::<f64>::from_element(1, 1, 0.2);
    let block_sol = bls
        .solve_block(&j, &[a_col], &[b_col], &d, &r, &[0.7], None, &euclid)
        .unwrap();

    scalar_sol.u.assert_close(&block_sol.u, 1e-12);
    assert!((scalar_sol.v - block_sol.v[0]).abs() < 1e-12);
}
