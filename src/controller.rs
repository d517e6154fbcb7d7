use std::sync::Arc;

use na::{DMatrix, DVector};
use tracing::warn;

use crate::error::ControlError;
use crate::manipulator::ManipulatorModel;
use crate::task::{ControlParam, Task};
use crate::types::Float;

/// Composes an ordered stack of tasks into one joint-torque command.
///
/// Priority is list order, index 0 highest. Each cycle the caller runs
/// `update_model` over the whole stack and then `compute_torque`, which sums
///     tau = Σ_i (N_0 N_1 ⋯ N_{i-1}) tau_i
/// so that every lower-priority contribution lies in the null space of all
/// higher-priority task Jacobians and cannot disturb them to first order.
///
/// The stack is owned exclusively and reconfigured only between cycles.
pub struct TaskPriorityController {
    dof: usize,
    tasks: Vec<Box<dyn Task>>,
}

impl TaskPriorityController {
    pub fn new(dof: usize) -> Self {
        TaskPriorityController {
            dof,
            tasks: vec![],
        }
    }

    /// Append a task at the lowest priority.
    pub fn push_task(&mut self, task: Box<dyn Task>) {
        self.tasks.push(task);
    }

    pub fn clear_tasks(&mut self) {
        self.tasks.clear();
    }

    pub fn set_param(&mut self, param: &Arc<ControlParam>) {
        for task in self.tasks.iter_mut() {
            task.set_param(param.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn dof(&self) -> usize {
        self.dof
    }

    /// Refresh every task's cached matrices, in priority order. On the first
    /// failure no partial torque may be applied this cycle; the caller holds
    /// the previous command or commands zero.
    pub fn update_model(&mut self, mnp: &ManipulatorModel) -> Result<(), ControlError> {
        for task in self.tasks.iter_mut() {
            if let Err(e) = task.update_model(mnp) {
                warn!(task = task.name(), error = %e, "task model update failed");
                return Err(ControlError::TaskUpdate {
                    task: task.name(),
                    source: Box::new(e),
                });
            }
        }
        Ok(())
    }

    /// Successive null-space projection: the projector product starts at
    /// identity and picks up each task's projector after its contribution
    /// is added.
    pub fn compute_torque(&mut self, mnp: &ManipulatorModel) -> DVector<Float> {
        let mut tau = DVector::zeros(self.dof);
        let mut projector = DMatrix::<Float>::identity(self.dof, self.dof);

        for task in self.tasks.iter_mut() {
            let tau_task = task.compute_generalized_force(mnp);
            tau += &projector * tau_task;
            if let Some(N) = task.null_space() {
                projector = &projector * N;
            }
        }
        tau
    }
}
