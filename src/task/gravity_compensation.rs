use std::sync::Arc;

use itertools::izip;
use na::DVector;

use crate::manipulator::ManipulatorModel;
use crate::task::{ControlParam, Task};
use crate::types::Float;

/// Torque that statically holds the manipulator against gravity in the
/// current configuration:
///     tau = Σ_links -m_i * Jv_i^T * g
/// where Jv_i is the linear block of link i's basic Jacobian and g the
/// world-frame gravity vector.
///
/// Has no goal and no null space; it acts on the full joint space and is
/// meant as the lowest-priority or additive baseline of a stack.
pub struct GravityCompensation {
    param: Arc<ControlParam>,
}

impl GravityCompensation {
    pub fn new() -> Self {
        GravityCompensation {
            param: Arc::new(ControlParam::default()),
        }
    }
}

impl Default for GravityCompensation {
    fn default() -> Self {
        GravityCompensation::new()
    }
}

impl Task for GravityCompensation {
    fn name(&self) -> &'static str {
        "gravity_compensation"
    }

    fn set_param(&mut self, param: Arc<ControlParam>) {
        self.param = param;
    }

    fn compute_generalized_force(&mut self, mnp: &ManipulatorModel) -> DVector<Float> {
        let mut tau = DVector::zeros(mnp.dof);
        for (link, j0) in izip!(mnp.links.iter(), mnp.j0.iter()) {
            let jv = j0.fixed_rows::<3>(0);
            tau -= jv.transpose() * self.param.g * link.mass;
        }
        tau
    }
}

#[cfg(test)]
mod gravity_compensation_tests {
    use na::{dvector, vector};

    use crate::helpers::{build_pendulum, build_rr_arm};
    use crate::{assert_close, GRAVITY, PI};

    use super::*;

    /// A horizontal link of mass m at distance l from the joint needs
    /// torque of magnitude m*g*l to hold.
    #[test]
    fn horizontal_link_holding_torque() {
        // Arrange
        let (m, l) = (2.0, 0.8);
        let mut mnp = build_pendulum(m, l, 0.3);
        mnp.update(&dvector![0.0], &dvector![0.0]).unwrap();
        let mut task = GravityCompensation::new();

        // Act
        let tau = task.compute_generalized_force(&mnp);

        // Assert
        assert_close!(tau[0].abs(), m * GRAVITY * l, 1e-9);
    }

    /// Pointing straight down, gravity has no moment arm.
    #[test]
    fn vertical_link_needs_no_torque() {
        // Arrange
        let (m, l) = (2.0, 0.8);
        let mut mnp = build_pendulum(m, l, 0.3);
        mnp.update(&dvector![PI / 2.0], &dvector![0.0]).unwrap();
        let mut task = GravityCompensation::new();

        // Act
        let tau = task.compute_generalized_force(&mnp);

        // Assert
        assert_close!(tau[0], 0.0, 1e-9);
    }

    /// Joints about z cannot be loaded by gravity along -z.
    #[test]
    fn planar_arm_sees_no_gravity_load() {
        // Arrange
        let mut mnp = build_rr_arm(1.0, 1.0, 0.1, 2.0, 0.5, 0.05);
        mnp.update(&dvector![0.7, -0.3], &dvector![0.0, 0.0]).unwrap();
        let mut task = GravityCompensation::new();

        // Act
        let tau = task.compute_generalized_force(&mnp);

        // Assert
        assert_close!(tau.amax(), 0.0, 1e-12);
    }

    #[test]
    fn custom_gravity_vector_scales_torque() {
        // Arrange
        let (m, l) = (1.0, 1.0);
        let mut mnp = build_pendulum(m, l, 0.1);
        mnp.update(&dvector![0.0], &dvector![0.0]).unwrap();
        let mut task = GravityCompensation::new();
        let param = ControlParam {
            g: vector![0.0, 0.0, -1.62], // lunar
            ..ControlParam::default()
        };
        task.set_param(Arc::new(param));

        // Act
        let tau = task.compute_generalized_force(&mnp);

        // Assert
        assert_close!(tau[0].abs(), 1.62 * m * l, 1e-9);
    }

    #[test]
    fn has_no_null_space() {
        let task = GravityCompensation::new();
        assert!(!task.have_null_space());
        assert!(task.null_space().is_none());
    }
}
