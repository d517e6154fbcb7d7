use na::DMatrix;
use tracing::debug;

use crate::types::Float;

/// Compute the regularized operational-space inertia Λ from its inverse.
///
/// Eigendecompose Λ⁻¹ = V diag(λ) Vᵀ and reassemble Λ = V diag(1/λ) Vᵀ,
/// except that directions whose eigenvalue falls below `eigen_thresh` are
/// dropped (their reciprocal set to zero). Those are directions the task
/// Jacobian cannot actuate without excessive force, i.e. kinematic
/// singularity directions, and keeping them would blow up the mapped torque
/// as the Jacobian loses rank.
///
/// The input must be symmetric. The result is symmetric positive
/// semi-definite, and equals the exact inverse whenever every eigenvalue
/// clears the threshold.
pub fn compute(lambda_inv: &DMatrix<Float>, eigen_thresh: Float) -> DMatrix<Float> {
    let eigen = lambda_inv.clone().symmetric_eigen();

    let mut recip = eigen.eigenvalues.clone();
    for (j, lambda_j) in eigen.eigenvalues.iter().enumerate() {
        if *lambda_j < eigen_thresh {
            debug!(eigenvalue = *lambda_j, "dropping near-singular direction");
            recip[j] = 0.0;
        } else {
            recip[j] = 1.0 / lambda_j;
        }
    }

    &eigen.eigenvectors * DMatrix::from_diagonal(&recip) * eigen.eigenvectors.transpose()
}
