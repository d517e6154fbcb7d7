use std::collections::HashMap;

use na::{DVector, UnitQuaternion, Vector3};

use crate::error::ModelError;
use crate::manipulator::ManipulatorModel;
use crate::transform::Transform3D;
use crate::types::Float;
use crate::WORLD_FRAME;

/// One or more manipulators attached to a common base.
///
/// Owns its manipulators exclusively and keeps an insertion-ordered name
/// list for deterministic iteration. The base pose has no effect on
/// joint-space quantities of a fixed-base arm; for a mobile base it is
/// composed into every manipulator's world-frame transforms.
pub struct RobotModel {
    name: String,
    world_frame: String,
    position: Vector3<Float>,
    orientation: UnitQuaternion<Float>,
    manipulators: HashMap<String, ManipulatorModel>,
    manipulator_names: Vec<String>,
}

impl RobotModel {
    pub fn new(name: &str) -> Self {
        RobotModel {
            name: name.to_string(),
            world_frame: WORLD_FRAME.to_string(),
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            manipulators: HashMap::new(),
            manipulator_names: vec![],
        }
    }

    pub fn add_manipulator(&mut self, mut mnp: ManipulatorModel) {
        mnp.set_base_transform(self.base_transform(&mnp.name));
        self.manipulator_names.push(mnp.name.clone());
        self.manipulators.insert(mnp.name.clone(), mnp);
    }

    /// Refresh the named manipulator's joint state and all derived
    /// quantities.
    pub fn update(
        &mut self,
        mnp_name: &str,
        q: &DVector<Float>,
        dq: &DVector<Float>,
    ) -> Result<(), ModelError> {
        self.manipulator_mut(mnp_name)?.update(q, dq)
    }

    /// Explicit Jacobian recompute for callers that changed kinematic state
    /// through a different path (e.g. a base-only update).
    pub fn compute_basic_jacobian(&mut self, mnp_name: &str) -> Result<(), ModelError> {
        self.manipulator_mut(mnp_name)?.compute_basic_jacobian();
        Ok(())
    }

    /// Explicit mass-matrix recompute, same rationale as
    /// `compute_basic_jacobian`.
    pub fn compute_mass_matrix(&mut self, mnp_name: &str) -> Result<(), ModelError> {
        self.manipulator_mut(mnp_name)?.compute_mass_matrix()
    }

    pub fn reached(
        &self,
        mnp_name: &str,
        qd: &DVector<Float>,
        threshold: Float,
    ) -> Result<bool, ModelError> {
        self.manipulator(mnp_name)?.reached(qd, threshold)
    }

    /// Move the base. Every manipulator's transforms and Jacobians are
    /// rederived against the new base pose.
    pub fn set_position(&mut self, position: Vector3<Float>) {
        self.position = position;
        self.reinstall_base();
    }

    pub fn set_orientation(&mut self, orientation: UnitQuaternion<Float>) {
        self.orientation = orientation;
        self.reinstall_base();
    }

    pub fn set_world_frame(&mut self, world_frame: &str) {
        self.world_frame = world_frame.to_string();
        self.reinstall_base();
    }

    pub fn manipulator(&self, mnp_name: &str) -> Result<&ManipulatorModel, ModelError> {
        self.manipulators
            .get(mnp_name)
            .ok_or_else(|| ModelError::ManipulatorNotFound {
                name: mnp_name.to_string(),
            })
    }

    pub fn manipulator_mut(&mut self, mnp_name: &str) -> Result<&mut ManipulatorModel, ModelError> {
        self.manipulators
            .get_mut(mnp_name)
            .ok_or_else(|| ModelError::ManipulatorNotFound {
                name: mnp_name.to_string(),
            })
    }

    pub fn dof(&self, mnp_name: &str) -> Result<usize, ModelError> {
        Ok(self.manipulator(mnp_name)?.dof)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn world_frame(&self) -> &str {
        &self.world_frame
    }

    pub fn position(&self) -> &Vector3<Float> {
        &self.position
    }

    pub fn orientation(&self) -> &UnitQuaternion<Float> {
        &self.orientation
    }

    pub fn manipulator_names(&self) -> &[String] {
        &self.manipulator_names
    }

    fn base_transform(&self, mnp_name: &str) -> Transform3D {
        let base_frame = format!("{}_base", mnp_name);
        Transform3D::from_parts(
            &base_frame,
            &self.world_frame,
            &self.orientation.to_rotation_matrix().into_inner(),
            &self.position,
        )
    }

    fn reinstall_base(&mut self) {
        for name in self.manipulator_names.clone() {
            let base = self.base_transform(&name);
            if let Some(mnp) = self.manipulators.get_mut(&name) {
                mnp.set_base_transform(base);
            }
        }
    }
}
