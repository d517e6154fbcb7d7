use std::sync::Arc;

use na::{DMatrix, DVector, Matrix3, Rotation3, UnitQuaternion, Vector3};

use crate::effective_mass_matrix;
use crate::error::{ControlError, ModelError};
use crate::manipulator::ManipulatorModel;
use crate::task::{ControlParam, Task, TaskCycle};
use crate::types::Float;

/// Cartesian orientation control of one target link.
///
/// Each cycle, `update_model` extracts the angular block Jw of the target
/// link's basic Jacobian and derives the operational-space quantities:
///     Λ⁻¹ = Jw M⁻¹ Jwᵀ          (regularized to Λ near singularities)
///     J⁺  = M⁻¹ Jwᵀ Λ           (dynamically-consistent inverse)
///     N   = I − Jwᵀ J⁺ᵀ         (null-space projector)
/// `compute_generalized_force` then drives the axis-angle orientation error
/// with a task-space PD law and maps it back through Jwᵀ Λ.
pub struct OrientationControl {
    target_link: String,
    idx: usize,
    dof: usize,
    eigen_thresh: Float,
    param: Arc<ControlParam>,

    Rd: Matrix3<Float>,
    Jw: DMatrix<Float>,
    lambda: DMatrix<Float>,
    N: DMatrix<Float>,
    cycle: TaskCycle,
}

impl OrientationControl {
    pub fn new(
        mnp: &ManipulatorModel,
        target_link: &str,
        eigen_thresh: Float,
    ) -> Result<Self, ModelError> {
        let idx = mnp.link_index(target_link)?;
        Ok(OrientationControl {
            target_link: target_link.to_string(),
            idx,
            dof: mnp.dof,
            eigen_thresh,
            param: Arc::new(ControlParam::default()),
            Rd: Matrix3::identity(),
            Jw: DMatrix::zeros(3, mnp.dof),
            lambda: DMatrix::zeros(3, 3),
            N: DMatrix::identity(mnp.dof, mnp.dof),
            cycle: TaskCycle::Uninitialized,
        })
    }

    pub fn target_link(&self) -> &str {
        &self.target_link
    }

    /// Orientation error of R against the goal, as the axis-angle vector of
    /// the rotation Qerr = R Rdᵀ: zero when the vector part vanishes, else
    /// scaled so its magnitude equals the rotation angle.
    fn orientation_error(&self, R: &Matrix3<Float>) -> Vector3<Float> {
        let q_err = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(
            R * self.Rd.transpose(),
        ));
        let norm = (q_err.i * q_err.i + q_err.j * q_err.j + q_err.k * q_err.k).sqrt();
        let mut c = 0.0;
        if norm != 0.0 {
            c = 2.0 * q_err.w.clamp(-1.0, 1.0).acos() / norm;
        }
        Vector3::new(q_err.i * c, q_err.j * c, q_err.k * c)
    }
}

impl Task for OrientationControl {
    fn name(&self) -> &'static str {
        "orientation_control"
    }

    fn set_param(&mut self, param: Arc<ControlParam>) {
        self.param = param;
    }

    /// The goal is a 3x3 rotation matrix; anything else is rejected and the
    /// previous goal kept.
    fn set_goal(&mut self, goal: &DMatrix<Float>) -> Result<(), ControlError> {
        if goal.nrows() != 3 || goal.ncols() != 3 {
            return Err(ControlError::InvalidGoalShape {
                task: self.name(),
                expected_rows: 3,
                expected_cols: 3,
                rows: goal.nrows(),
                cols: goal.ncols(),
            });
        }
        self.Rd = goal.fixed_view::<3, 3>(0, 0).into_owned();
        Ok(())
    }

    fn update_model(&mut self, mnp: &ManipulatorModel) -> Result<(), ControlError> {
        if mnp.dof != self.dof {
            return Err(ControlError::Model(ModelError::Dimension {
                context: "OrientationControl::update_model",
                expected: self.dof,
                got: mnp.dof,
            }));
        }

        self.Jw = mnp.j0[self.idx].rows(3, 3).clone_owned();
        let lambda_inv = &self.Jw * &mnp.M_inv * self.Jw.transpose();
        self.lambda = effective_mass_matrix::compute(&lambda_inv, self.eigen_thresh);
        let J_dyn_inv = &mnp.M_inv * self.Jw.transpose() * &self.lambda;
        self.N = DMatrix::identity(self.dof, self.dof) - self.Jw.transpose() * J_dyn_inv.transpose();

        self.cycle = TaskCycle::ModelUpdated;
        Ok(())
    }

    fn compute_generalized_force(&mut self, mnp: &ManipulatorModel) -> DVector<Float> {
        if !self.cycle.ready() {
            return DVector::zeros(self.dof);
        }

        let R = mnp.t_abs[self.idx].rot();
        let del_phi = self.orientation_error(&R);

        let omega = &self.Jw * &mnp.dq;
        let omega = Vector3::new(omega[0], omega[1], omega[2]);
        let F_unit = -del_phi * self.param.kp - omega * self.param.kv;
        let F = &self.lambda * F_unit;

        self.cycle = TaskCycle::ForceComputed;
        self.Jw.transpose() * F
    }

    fn null_space(&self) -> Option<&DMatrix<Float>> {
        Some(&self.N)
    }
}
