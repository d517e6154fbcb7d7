use std::sync::Arc;

use na::{DMatrix, DVector, Vector3};

use crate::error::ControlError;
use crate::manipulator::ManipulatorModel;
use crate::types::Float;
use crate::GRAVITY;

pub mod gravity_compensation;
pub mod joint_control;
pub mod orientation_control;

/// Shared tunable gains and physical constants, replaced between control
/// cycles by the configuration side.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlParam {
    /// Operational-space proportional gain
    pub kp: Float,
    /// Operational-space velocity damping gain
    pub kv: Float,
    /// Joint-space proportional gain
    pub kp_joint: Float,
    /// Joint-space velocity damping gain
    pub kv_joint: Float,
    /// Gravity vector in world frame
    pub g: Vector3<Float>,
}

impl Default for ControlParam {
    fn default() -> Self {
        ControlParam {
            kp: 100.0,
            kv: 20.0,
            kp_joint: 100.0,
            kv_joint: 10.0,
            g: Vector3::new(0.0, 0.0, -GRAVITY),
        }
    }
}

/// Per-cycle lifecycle of a task's cached matrices.
///
/// `compute_generalized_force` only acts on a model the task has seen via
/// `update_model` this cycle; before that it falls back to a zero force.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TaskCycle {
    Uninitialized,
    ModelUpdated,
    ForceComputed,
}

impl TaskCycle {
    pub fn ready(&self) -> bool {
        !matches!(self, TaskCycle::Uninitialized)
    }
}

/// One control objective in a priority stack.
///
/// A task refreshes its cached matrices from the manipulator in
/// `update_model` and turns the current state error into a generalized joint
/// force in `compute_generalized_force`. Tasks that constrain only a subspace
/// of joint motion expose a null-space projector so lower-priority tasks can
/// act inside it.
pub trait Task {
    fn name(&self) -> &'static str;

    fn set_param(&mut self, _param: Arc<ControlParam>) {}

    fn set_goal(&mut self, _goal: &DMatrix<Float>) -> Result<(), ControlError> {
        Ok(())
    }

    fn update_model(&mut self, _mnp: &ManipulatorModel) -> Result<(), ControlError> {
        Ok(())
    }

    /// Produce a dof-length joint-torque contribution. Tasks return a zero
    /// vector when `update_model` has not run since the last model change,
    /// never a force computed from stale matrices.
    fn compute_generalized_force(&mut self, mnp: &ManipulatorModel) -> DVector<Float>;

    /// The dof x dof null-space projector, if this task leaves a subspace of
    /// joint motion unconstrained. Tasks using all degrees of freedom return
    /// None (projector = identity is implicit).
    fn null_space(&self) -> Option<&DMatrix<Float>> {
        None
    }

    fn have_null_space(&self) -> bool {
        self.null_space().is_some()
    }
}
