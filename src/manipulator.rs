use std::collections::HashMap;

use itertools::izip;
use na::{DMatrix, DVector, Vector3};
use tracing::warn;

use crate::error::ModelError;
use crate::link::{JointKind, Link};
use crate::pose::Pose;
use crate::transform::Transform3D;
use crate::types::Float;
use crate::WORLD_FRAME;

/// The kinematic/dynamic model of one serial manipulator.
///
/// Holds the ordered base-to-tip link chain and the joint state, and derives
/// per-link world transforms `t_abs`, per-link basic Jacobians `j0` (6 x dof,
/// rows 0-2 linear, rows 3-5 angular, world frame, evaluated at the link
/// origin), and the joint-space mass matrix `M` with its inverse `M_inv`.
///
/// Derived quantities are consistent with `q` only right after `update`;
/// callers must not mutate the joint state without recomputing.
pub struct ManipulatorModel {
    pub name: String,
    pub links: Vec<Link>,
    pub name_to_idx: HashMap<String, usize>,
    pub dof: usize,

    pub q: DVector<Float>,
    pub dq: DVector<Float>,

    pub t_abs: Vec<Transform3D>,
    pub j0: Vec<DMatrix<Float>>,
    pub M: DMatrix<Float>,
    pub M_inv: DMatrix<Float>,

    base_to_world: Transform3D,
    /// Link index of each actuated joint, base to tip
    actuated: Vec<usize>,
    /// Per actuated joint: rotation/sliding axis in world frame
    joint_axes_world: Vec<Vector3<Float>>,
    /// Per actuated joint: joint origin in world frame
    joint_origins_world: Vec<Vector3<Float>>,
}

impl ManipulatorModel {
    /// Build the model and derive all quantities at the zero configuration.
    pub fn new(name: &str, links: Vec<Link>) -> Result<Self, ModelError> {
        let mut name_to_idx = HashMap::new();
        let mut actuated = vec![];
        for (i, link) in links.iter().enumerate() {
            name_to_idx.insert(link.name.clone(), i);
            if link.joint.is_actuated() {
                actuated.push(i);
            }
        }
        let dof = actuated.len();

        let base_frame = format!("{}_base", name);
        let mut model = ManipulatorModel {
            name: name.to_string(),
            links,
            name_to_idx,
            dof,
            q: DVector::zeros(dof),
            dq: DVector::zeros(dof),
            t_abs: vec![],
            j0: vec![],
            M: DMatrix::zeros(dof, dof),
            M_inv: DMatrix::zeros(dof, dof),
            base_to_world: Transform3D::identity(&base_frame, WORLD_FRAME),
            actuated,
            joint_axes_world: vec![],
            joint_origins_world: vec![],
        };
        model.compute_forward_kinematics();
        model.compute_basic_jacobian();
        model.compute_mass_matrix()?;
        Ok(model)
    }

    /// Refresh the joint state and rederive transforms, Jacobians and the
    /// mass matrix, in that order.
    pub fn update(&mut self, q: &DVector<Float>, dq: &DVector<Float>) -> Result<(), ModelError> {
        if q.len() != self.dof {
            return Err(ModelError::Dimension {
                context: "ManipulatorModel::update q",
                expected: self.dof,
                got: q.len(),
            });
        }
        if dq.len() != self.dof {
            return Err(ModelError::Dimension {
                context: "ManipulatorModel::update dq",
                expected: self.dof,
                got: dq.len(),
            });
        }

        self.q = q.clone();
        self.dq = dq.clone();
        self.compute_forward_kinematics();
        self.compute_basic_jacobian();
        self.compute_mass_matrix()
    }

    /// Chain each link's joint motion and fixed offset, base to tip, to get
    /// the absolute transform of every link frame, recording world-frame
    /// joint axes and origins along the way.
    pub fn compute_forward_kinematics(&mut self) {
        self.t_abs.clear();
        self.joint_axes_world.clear();
        self.joint_origins_world.clear();

        let mut parent = self.base_to_world.mat;
        let mut qi = 0;
        for link in self.links.iter() {
            let parent_rot = parent.fixed_view::<3, 3>(0, 0);
            match &link.joint {
                JointKind::Revolute { axis } | JointKind::Prismatic { axis } => {
                    self.joint_axes_world.push(parent_rot * axis.into_inner());
                    self.joint_origins_world
                        .push(parent.fixed_view::<3, 1>(0, 3).into());
                }
                JointKind::Fixed => {}
            }

            let motion = if link.joint.is_actuated() {
                let m = link.joint.motion(self.q[qi]);
                qi += 1;
                m
            } else {
                link.joint.motion(0.0)
            };

            let mat = parent * motion * link.offset;
            self.t_abs
                .push(Transform3D::new(&link.name, WORLD_FRAME, &mat));
            parent = mat;
        }
    }

    /// Accumulate, for every link, each ancestor joint's contribution to the
    /// link-origin velocity: a revolute joint at origin o with world axis a
    /// contributes angular column a and linear column a x (p - o); a
    /// prismatic joint contributes linear column a only.
    pub fn compute_basic_jacobian(&mut self) {
        self.j0.clear();

        for i in 0..self.links.len() {
            let mut j = DMatrix::zeros(6, self.dof);
            let p = self.t_abs[i].trans();

            for k in 0..self.dof {
                let link_idx = self.actuated[k];
                if link_idx > i {
                    break;
                }
                let axis = self.joint_axes_world[k];
                match &self.links[link_idx].joint {
                    JointKind::Revolute { .. } => {
                        let origin = self.joint_origins_world[k];
                        let linear = axis.cross(&(p - origin));
                        j.fixed_view_mut::<3, 1>(0, k).copy_from(&linear);
                        j.fixed_view_mut::<3, 1>(3, k).copy_from(&axis);
                    }
                    JointKind::Prismatic { .. } => {
                        j.fixed_view_mut::<3, 1>(0, k).copy_from(&axis);
                    }
                    JointKind::Fixed => unreachable!("fixed joints are not actuated"),
                }
            }
            self.j0.push(j);
        }
    }

    /// Assemble the joint-space mass matrix
    ///     M = Σ_links Jv^T m Jv + Jw^T (R I R^T) Jw
    /// symmetrize it to cancel floating-point asymmetry, and invert it.
    pub fn compute_mass_matrix(&mut self) -> Result<(), ModelError> {
        let mut M = DMatrix::zeros(self.dof, self.dof);
        for (link, j0, t_abs) in izip!(self.links.iter(), self.j0.iter(), self.t_abs.iter()) {
            let jv = j0.fixed_rows::<3>(0);
            let jw = j0.fixed_rows::<3>(3);
            let R = t_abs.rot();
            let inertia_world = R * link.inertia * R.transpose();

            M += (jv.transpose() * jv) * link.mass + jw.transpose() * inertia_world * jw;
        }
        let M = (&M + M.transpose()) / 2.0;

        let M_inv = match M.clone().try_inverse() {
            Some(inv) if inv.iter().all(|x| x.is_finite()) => inv,
            _ => {
                warn!(manipulator = %self.name, "mass matrix inversion failed");
                return Err(ModelError::SingularMassMatrix {
                    name: self.name.clone(),
                });
            }
        };
        if self.dof > 0 {
            let residual = (&M * &M_inv - DMatrix::identity(self.dof, self.dof)).amax();
            if residual > 1e-6 {
                warn!(manipulator = %self.name, residual, "mass matrix inversion unstable");
                return Err(ModelError::SingularMassMatrix {
                    name: self.name.clone(),
                });
            }
        }

        self.M = M;
        self.M_inv = M_inv;
        Ok(())
    }

    /// Whether every joint is within `threshold` of the desired vector, by
    /// max norm. Pure, no side effects.
    pub fn reached(&self, qd: &DVector<Float>, threshold: Float) -> Result<bool, ModelError> {
        if qd.len() != self.dof {
            return Err(ModelError::Dimension {
                context: "ManipulatorModel::reached",
                expected: self.dof,
                got: qd.len(),
            });
        }
        if self.dof == 0 {
            return Ok(true);
        }
        Ok((&self.q - qd).amax() < threshold)
    }

    pub fn link_index(&self, name: &str) -> Result<usize, ModelError> {
        self.name_to_idx
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::LinkNotFound {
                name: name.to_string(),
            })
    }

    /// Absolute link poses for the display/broadcast side.
    pub fn link_poses(&self) -> Vec<(String, Pose)> {
        self.t_abs
            .iter()
            .map(|t| (t.from.clone(), Pose::from_transform(t)))
            .collect()
    }

    /// Install the base-to-world transform. Rederives transforms and
    /// Jacobians; the mass matrix follows on the next `update` or explicit
    /// `compute_mass_matrix`.
    pub fn set_base_transform(&mut self, base_to_world: Transform3D) {
        self.base_to_world = base_to_world;
        self.compute_forward_kinematics();
        self.compute_basic_jacobian();
    }

    pub fn base_to_world(&self) -> &Transform3D {
        &self.base_to_world
    }
}

#[cfg(test)]
mod manipulator_tests {
    use na::{dvector, Matrix3, Matrix4, UnitQuaternion, Vector3};

    use crate::helpers::{build_prismatic_lift, build_rr_arm, build_single_link};
    use crate::link::{JointKind, Link};
    use crate::transform::translation;
    use crate::{assert_close, PI};

    use super::*;

    #[test]
    fn update_rejects_wrong_dimension() {
        // Arrange
        let mut mnp = build_single_link(1.0, 1.0, 0.1);

        // Act
        let result = mnp.update(&dvector![0.0, 0.0], &dvector![0.0, 0.0]);

        // Assert
        assert!(matches!(
            result,
            Err(ModelError::Dimension {
                expected: 1,
                got: 2,
                ..
            })
        ));
    }

    #[test]
    fn update_is_deterministic() {
        // Arrange
        let mut mnp = build_rr_arm(1.0, 1.0, 0.1, 2.0, 0.5, 0.05);
        let mut rng = rand::rng();
        let q = crate::util::test_utils::random_q(&mut rng, 2, PI);
        let dq = dvector![0.3, -0.2];

        // Act
        mnp.update(&q, &dq).unwrap();
        let t_abs_first: Vec<Matrix4<Float>> = mnp.t_abs.iter().map(|t| t.mat).collect();
        let j0_first = mnp.j0.clone();
        let M_first = mnp.M.clone();
        mnp.update(&q, &dq).unwrap();

        // Assert
        let t_abs_second: Vec<Matrix4<Float>> = mnp.t_abs.iter().map(|t| t.mat).collect();
        assert_eq!(t_abs_first, t_abs_second);
        assert_eq!(j0_first, mnp.j0);
        assert_eq!(M_first, mnp.M);
    }

    /// Single revolute link about z, origin at distance l along x:
    /// Jv = l * (-sin q, cos q, 0), Jw = z, M = m l^2 + Izz.
    #[test]
    fn single_link_jacobian_and_mass_matrix() {
        // Arrange
        let (m, l, izz) = (5.0, 7.0, 2.0);
        let mut mnp = build_single_link(m, l, izz);

        for q in [0.0, PI / 2.0] {
            // Act
            mnp.update(&dvector![q], &dvector![0.0]).unwrap();

            // Assert
            let j0 = &mnp.j0[0];
            assert_close!(j0[(0, 0)], -l * q.sin(), 1e-12);
            assert_close!(j0[(1, 0)], l * q.cos(), 1e-12);
            assert_close!(j0[(2, 0)], 0.0, 1e-12);
            assert_close!(j0[(5, 0)], 1.0, 1e-12);
            assert_close!(mnp.M[(0, 0)], m * l * l + izz, 1e-9);
        }
    }

    /// Closed-form planar RR inertia:
    /// M[0][0] = m1 l1^2 + Izz1 + m2 (l1^2 + l2^2 + 2 l1 l2 cos th2) + Izz2
    #[test]
    fn two_link_mass_matrix_closed_form() {
        // Arrange
        let (m1, l1, izz1) = (1.5, 1.0, 0.2);
        let (m2, l2, izz2) = (0.8, 0.7, 0.1);
        let mut mnp = build_rr_arm(m1, l1, izz1, m2, l2, izz2);

        for th2 in [0.0, PI / 3.0, PI / 2.0] {
            // Act
            mnp.update(&dvector![0.4, th2], &dvector![0.0, 0.0]).unwrap();

            // Assert
            let expected = m1 * l1 * l1
                + izz1
                + m2 * (l1 * l1 + l2 * l2 + 2.0 * l1 * l2 * th2.cos())
                + izz2;
            assert_close!(mnp.M[(0, 0)], expected, 1e-9);
        }
    }

    #[test]
    fn two_link_tip_jacobian_closed_form() {
        // Arrange
        let (l1, l2) = (1.0, 0.7);
        let mut mnp = build_rr_arm(1.0, l1, 0.1, 1.0, l2, 0.1);
        let (th1, th2) = (-PI / 2.0, PI / 2.0);

        // Act
        mnp.update(&dvector![th1, th2], &dvector![0.0, 0.0]).unwrap();

        // Assert
        let j = &mnp.j0[1];
        let s1 = th1.sin();
        let c1 = th1.cos();
        let s12 = (th1 + th2).sin();
        let c12 = (th1 + th2).cos();
        assert_close!(j[(0, 0)], -l1 * s1 - l2 * s12, 1e-12);
        assert_close!(j[(1, 0)], l1 * c1 + l2 * c12, 1e-12);
        assert_close!(j[(0, 1)], -l2 * s12, 1e-12);
        assert_close!(j[(1, 1)], l2 * c12, 1e-12);
    }

    #[test]
    fn mass_matrix_is_symmetric_and_inverts() {
        // Arrange
        let mut mnp = build_rr_arm(1.0, 1.0, 0.2, 2.0, 0.5, 0.1);

        // Act
        mnp.update(&dvector![0.7, -1.2], &dvector![0.0, 0.0]).unwrap();

        // Assert
        let asym = (&mnp.M - mnp.M.transpose()).amax();
        assert_close!(asym, 0.0, 1e-14);
        let eye = &mnp.M * &mnp.M_inv;
        assert!((eye - DMatrix::<Float>::identity(2, 2)).amax() < 1e-9);
    }

    #[test]
    fn prismatic_joint_jacobian() {
        // Arrange
        let m = 3.0;
        let mut mnp = build_prismatic_lift(m);

        // Act
        mnp.update(&dvector![0.4], &dvector![0.0]).unwrap();

        // Assert
        let j0 = &mnp.j0[0];
        assert_eq!(j0.fixed_view::<3, 1>(0, 0).into_owned(), Vector3::z());
        assert_eq!(j0.fixed_view::<3, 1>(3, 0).into_owned(), Vector3::zeros());
        assert_close!(mnp.M[(0, 0)], m, 1e-12);
        assert_close!(mnp.t_abs[0].trans().z, 0.4, 1e-12);
    }

    /// A fixed tool link consumes no joint variable but still sees the
    /// ancestor joint with the full lever arm.
    #[test]
    fn fixed_tool_link_extends_lever_arm() {
        // Arrange
        let l = 1.0;
        let tool_offset = 0.25;
        let links = vec![
            Link::new(
                "link1",
                1.0,
                Matrix3::from_diagonal(&Vector3::new(0.0, 0.0, 0.1)),
                JointKind::Revolute {
                    axis: Vector3::z_axis(),
                },
                translation(&Vector3::x(), l),
            ),
            Link::fixed("tool", translation(&Vector3::x(), tool_offset)),
        ];
        let mut mnp = ManipulatorModel::new("arm", links).unwrap();

        // Act
        mnp.update(&dvector![0.0], &dvector![0.0]).unwrap();

        // Assert
        assert_eq!(mnp.dof, 1);
        let j_tool = &mnp.j0[1];
        assert_close!(j_tool[(1, 0)], l + tool_offset, 1e-12);
        assert_close!(mnp.t_abs[1].trans().x, l + tool_offset, 1e-12);
    }

    #[test]
    fn base_transform_shifts_world_poses() {
        // Arrange
        let mut mnp = build_single_link(1.0, 1.0, 0.1);
        let base = Transform3D::new(
            "arm_base",
            WORLD_FRAME,
            &translation(&Vector3::y(), 2.0),
        );

        // Act
        mnp.set_base_transform(base);
        mnp.update(&dvector![0.0], &dvector![0.0]).unwrap();

        // Assert
        assert_close!(mnp.t_abs[0].trans().y, 2.0, 1e-12);
        assert_close!(mnp.t_abs[0].trans().x, 1.0, 1e-12);
    }

    #[test]
    fn reached_uses_max_norm() {
        // Arrange
        let mut mnp = build_rr_arm(1.0, 1.0, 0.1, 1.0, 1.0, 0.1);
        mnp.update(&dvector![0.5, -0.5], &dvector![0.0, 0.0]).unwrap();

        // Act & Assert
        assert!(mnp.reached(&dvector![0.5, -0.5], 1e-6).unwrap());
        assert!(mnp.reached(&dvector![0.52, -0.5], 0.05).unwrap());
        assert!(!mnp.reached(&dvector![0.6, -0.5], 0.05).unwrap());
        assert!(matches!(
            mnp.reached(&dvector![0.0], 0.05),
            Err(ModelError::Dimension { .. })
        ));
    }

    #[test]
    fn link_lookup_and_poses() {
        // Arrange
        let mnp = build_rr_arm(1.0, 1.0, 0.1, 1.0, 1.0, 0.1);

        // Act & Assert
        assert_eq!(mnp.link_index("link1").unwrap(), 0);
        assert_eq!(mnp.link_index("link2").unwrap(), 1);
        assert!(matches!(
            mnp.link_index("gripper"),
            Err(ModelError::LinkNotFound { .. })
        ));

        let poses = mnp.link_poses();
        assert_eq!(poses.len(), 2);
        assert_eq!(poses[0].0, "link1");
    }

    #[test]
    fn rotated_base_rotates_joint_axis() {
        // Arrange
        let mut mnp = build_single_link(1.0, 1.0, 0.1);
        let rot = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI / 2.0)
            .to_rotation_matrix()
            .into_inner();
        let base = Transform3D::from_parts("arm_base", WORLD_FRAME, &rot, &Vector3::zeros());

        // Act
        mnp.set_base_transform(base);
        mnp.update(&dvector![0.0], &dvector![0.0]).unwrap();

        // Assert: the z joint axis now points along world -y
        let jw = mnp.j0[0].fixed_view::<3, 1>(3, 0).into_owned();
        assert_close!(jw.x, 0.0, 1e-12);
        assert_close!(jw.y, -1.0, 1e-12);
        assert_close!(jw.z, 0.0, 1e-12);
    }
}
