use na::{Matrix3, Matrix4, UnitVector3};

use crate::transform::{rotation, translation};
use crate::types::Float;

/// The kind of joint connecting a link to its parent.
#[derive(Clone, Debug, PartialEq)]
pub enum JointKind {
    /// Rotation about an axis expressed in the parent link frame.
    Revolute { axis: UnitVector3<Float> },
    /// Translation along an axis expressed in the parent link frame.
    Prismatic { axis: UnitVector3<Float> },
    /// Rigid attachment, consumes no joint variable.
    Fixed,
}

impl JointKind {
    pub fn is_actuated(&self) -> bool {
        !matches!(self, JointKind::Fixed)
    }

    /// The joint motion transform for joint variable q: rotation about the
    /// axis for revolute joints, translation along it for prismatic ones.
    pub fn motion(&self, q: Float) -> Matrix4<Float> {
        match self {
            JointKind::Revolute { axis } => rotation(axis, q),
            JointKind::Prismatic { axis } => translation(axis, q),
            JointKind::Fixed => Matrix4::identity(),
        }
    }
}

/// A single link of a serial chain.
///
/// The joint sits at the parent link's origin; `offset` then carries the
/// frame from the moved joint to this link's origin, which is anchored at the
/// link's center of mass. `inertia` is the rotational inertia about that
/// origin, expressed in the link frame. A tool flange or sensor mount with a
/// displaced attachment point is modeled as an intermediate `Fixed` link.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub name: String,
    pub mass: Float,
    pub inertia: Matrix3<Float>,
    pub joint: JointKind,
    pub offset: Matrix4<Float>,
}

impl Link {
    pub fn new(
        name: &str,
        mass: Float,
        inertia: Matrix3<Float>,
        joint: JointKind,
        offset: Matrix4<Float>,
    ) -> Self {
        Link {
            name: name.to_string(),
            mass,
            inertia,
            joint,
            offset,
        }
    }

    /// A massless fixed link, useful for relocating a frame mid-chain.
    pub fn fixed(name: &str, offset: Matrix4<Float>) -> Self {
        Link::new(name, 0.0, Matrix3::zeros(), JointKind::Fixed, offset)
    }
}
