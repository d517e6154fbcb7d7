use std::sync::Arc;

use na::{DMatrix, DVector};

use crate::error::{ControlError, ModelError};
use crate::manipulator::ManipulatorModel;
use crate::task::{ControlParam, Task, TaskCycle};
use crate::types::Float;

/// Joint-space posture control.
///
/// Drives the joint vector toward a desired configuration with a PD law
/// shaped by the mass matrix:
///     tau = M (-kp (q - qd) - kv dq)
/// Uses every degree of freedom, so it exposes no null space; stack it below
/// operational-space tasks to resolve redundancy.
pub struct JointControl {
    dof: usize,
    qd: DVector<Float>,
    has_goal: bool,
    param: Arc<ControlParam>,
    cycle: TaskCycle,
}

impl JointControl {
    pub fn new(mnp: &ManipulatorModel) -> Self {
        JointControl {
            dof: mnp.dof,
            qd: DVector::zeros(mnp.dof),
            has_goal: false,
            param: Arc::new(ControlParam::default()),
            cycle: TaskCycle::Uninitialized,
        }
    }
}

impl Task for JointControl {
    fn name(&self) -> &'static str {
        "joint_control"
    }

    fn set_param(&mut self, param: Arc<ControlParam>) {
        self.param = param;
    }

    /// The goal is a dof x 1 joint vector.
    fn set_goal(&mut self, goal: &DMatrix<Float>) -> Result<(), ControlError> {
        if goal.nrows() != self.dof || goal.ncols() != 1 {
            return Err(ControlError::InvalidGoalShape {
                task: self.name(),
                expected_rows: self.dof,
                expected_cols: 1,
                rows: goal.nrows(),
                cols: goal.ncols(),
            });
        }
        self.qd = goal.column(0).clone_owned();
        self.has_goal = true;
        Ok(())
    }

    fn update_model(&mut self, mnp: &ManipulatorModel) -> Result<(), ControlError> {
        if mnp.dof != self.dof {
            return Err(ControlError::Model(ModelError::Dimension {
                context: "JointControl::update_model",
                expected: self.dof,
                got: mnp.dof,
            }));
        }
        self.cycle = TaskCycle::ModelUpdated;
        Ok(())
    }

    fn compute_generalized_force(&mut self, mnp: &ManipulatorModel) -> DVector<Float> {
        if !self.cycle.ready() || !self.has_goal {
            return DVector::zeros(self.dof);
        }

        let tau_unit =
            (&self.qd - &mnp.q) * self.param.kp_joint - &mnp.dq * self.param.kv_joint;
        self.cycle = TaskCycle::ForceComputed;
        &mnp.M * tau_unit
    }
}
