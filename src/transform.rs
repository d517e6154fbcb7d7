use std::ops::Mul;

use na::{Matrix3, Matrix4, Vector3};

use crate::math::inverse_transform;
use crate::types::Float;
use crate::WORLD_FRAME;

/// A homogeneous transformation matrix representing the transformation from
/// one 3-dimensional Cartesian coordinate system to another.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform3D {
    pub from: String,
    pub to: String,
    pub mat: Matrix4<Float>,
}

impl Transform3D {
    pub fn new(from: &str, to: &str, mat: &Matrix4<Float>) -> Self {
        Transform3D {
            from: from.to_string(),
            to: to.to_string(),
            mat: mat.clone(),
        }
    }

    pub fn identity(from: &str, to: &str) -> Self {
        Transform3D::new(from, to, &Matrix4::identity())
    }

    pub fn from_parts(from: &str, to: &str, rot: &Matrix3<Float>, trans: &Vector3<Float>) -> Self {
        let mut mat = Matrix4::identity();
        mat.fixed_view_mut::<3, 3>(0, 0).copy_from(rot);
        mat.fixed_view_mut::<3, 1>(0, 3).copy_from(trans);
        Transform3D::new(from, to, &mat)
    }

    pub fn move_x(from: &str, to: &str, amount: Float) -> Self {
        Transform3D::new(from, to, &translation(&Vector3::x(), amount))
    }

    pub fn move_z(from: &str, to: &str, amount: Float) -> Self {
        Transform3D::new(from, to, &translation(&Vector3::z(), amount))
    }

    /// Rigid inverse, swapping the frame tags.
    pub fn inv(&self) -> Self {
        Transform3D {
            from: self.to.clone(),
            to: self.from.clone(),
            mat: inverse_transform(&self.mat),
        }
    }

    pub fn rot(&self) -> Matrix3<Float> {
        self.mat.fixed_view::<3, 3>(0, 0).into()
    }

    pub fn trans(&self) -> Vector3<Float> {
        self.mat.fixed_view::<3, 1>(0, 3).into()
    }

    pub fn transform_point(&self, point: &Vector3<Float>) -> Vector3<Float> {
        self.rot() * point + self.trans()
    }

    pub fn to_world(&self) -> bool {
        self.to == WORLD_FRAME
    }
}

/// Returns a transformation matrix for a rotation about axis by theta.
/// https://en.wikipedia.org/wiki/Rotation_matrix
#[rustfmt::skip]
pub fn rotation(axis: &Vector3<Float>, theta: Float) -> Matrix4<Float> {
    let x = axis.x;
    let y = axis.y;
    let z = axis.z;
    let c = theta.cos();
    let s = theta.sin();
    let t = 1.0 - c;
    Matrix4::new(
        t * x * x + c,      t * x * y - s * z,  t * x * z + s * y,  0.0,
        t * x * y + s * z,  t * y * y + c,      t * y * z - s * x,  0.0,
        t * x * z - s * y,  t * y * z + s * x,  t * z * z + c,      0.0,
        0.0,                0.0,                0.0,                1.0,
    )
}

/// Returns a transformation matrix for a translation along axis by distance.
#[rustfmt::skip]
pub fn translation(axis: &Vector3<Float>, distance: Float) -> Matrix4<Float> {
    let p = axis * distance;
    Matrix4::new(
        1.0, 0.0, 0.0, p.x,
        0.0, 1.0, 0.0, p.y,
        0.0, 0.0, 1.0, p.z,
        0.0, 0.0, 0.0, 1.0,
    )
}

impl Mul for Transform3D {
    type Output = Transform3D;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.from != rhs.to {
            panic!("lhs from frame is not same as rhs to frame!");
        }
        Transform3D {
            from: rhs.from,
            to: self.to,
            mat: self.mat * rhs.mat,
        }
    }
}

impl<'a, 'b> Mul<&'b Transform3D> for &'a Transform3D {
    type Output = Transform3D;

    fn mul(self, rhs: &'b Transform3D) -> Self::Output {
        if self.from != rhs.to {
            panic!("lhs from frame is not same as rhs to frame!");
        }
        Transform3D {
            from: rhs.from.clone(),
            to: self.to.clone(),
            mat: self.mat * rhs.mat,
        }
    }
}
