use na::{Matrix3, Matrix4, Vector3};

use crate::link::{JointKind, Link};
use crate::manipulator::ManipulatorModel;
use crate::transform::translation;
use crate::types::Float;

/// Build a single-link arm rotating about z, with the link frame at
/// distance `length` along x from the joint.
pub fn build_single_link(mass: Float, length: Float, izz: Float) -> ManipulatorModel {
    let links = vec![Link::new(
        "link1",
        mass,
        Matrix3::from_diagonal(&Vector3::new(0.0, 0.0, izz)),
        JointKind::Revolute {
            axis: Vector3::z_axis(),
        },
        translation(&Vector3::x(), length),
    )];
    ManipulatorModel::new("arm", links).unwrap()
}

/// Build a pendulum rotating about y, horizontal along x at q = 0, with the
/// link frame at distance `length` from the joint.
pub fn build_pendulum(mass: Float, length: Float, iyy: Float) -> ManipulatorModel {
    let links = vec![Link::new(
        "rod",
        mass,
        Matrix3::from_diagonal(&Vector3::new(0.0, iyy, 0.0)),
        JointKind::Revolute {
            axis: Vector3::y_axis(),
        },
        translation(&Vector3::x(), length),
    )];
    ManipulatorModel::new("pendulum", links).unwrap()
}

/// Build a planar RR arm, both joints about z, link frames at the far end of
/// each link.
pub fn build_rr_arm(
    m1: Float,
    l1: Float,
    izz1: Float,
    m2: Float,
    l2: Float,
    izz2: Float,
) -> ManipulatorModel {
    let links = vec![
        Link::new(
            "link1",
            m1,
            Matrix3::from_diagonal(&Vector3::new(0.0, 0.0, izz1)),
            JointKind::Revolute {
                axis: Vector3::z_axis(),
            },
            translation(&Vector3::x(), l1),
        ),
        Link::new(
            "link2",
            m2,
            Matrix3::from_diagonal(&Vector3::new(0.0, 0.0, izz2)),
            JointKind::Revolute {
                axis: Vector3::z_axis(),
            },
            translation(&Vector3::x(), l2),
        ),
    ];
    ManipulatorModel::new("arm", links).unwrap()
}

/// Build a single prismatic lift sliding along z.
pub fn build_prismatic_lift(mass: Float) -> ManipulatorModel {
    let links = vec![Link::new(
        "carriage",
        mass,
        Matrix3::zeros(),
        JointKind::Prismatic {
            axis: Vector3::z_axis(),
        },
        Matrix4::identity(),
    )];
    ManipulatorModel::new("lift", links).unwrap()
}
