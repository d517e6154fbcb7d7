use na::{Matrix3, Matrix4, Vector3};

use crate::types::Float;

/// Build a rotation matrix from roll/pitch/yaw angles, composed as
/// R = Rz(yaw) * Ry(pitch) * Rx(roll).
#[rustfmt::skip]
pub fn rotation_from_rpy(roll: Float, pitch: Float, yaw: Float) -> Matrix3<Float> {
    let (sr, cr) = roll.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();

    Matrix3::new(
        cy * cp,  cy * sp * sr - sy * cr,  cy * sp * cr + sy * sr,
        sy * cp,  sy * sp * sr + cy * cr,  sy * sp * cr - cy * sr,
        -sp,      cp * sr,                 cp * cr,
    )
}

/// Invert a rigid homogeneous transform without a general matrix inverse:
///     inv([R p; 0 1]) = [R^T  -R^T p; 0 1]
pub fn inverse_transform(src: &Matrix4<Float>) -> Matrix4<Float> {
    let R: Matrix3<Float> = src.fixed_view::<3, 3>(0, 0).into();
    let p: Vector3<Float> = src.fixed_view::<3, 1>(0, 3).into();

    let Rt = R.transpose();
    let pt = -Rt * p;

    let mut dst = Matrix4::identity();
    dst.fixed_view_mut::<3, 3>(0, 0).copy_from(&Rt);
    dst.fixed_view_mut::<3, 1>(0, 3).copy_from(&pt);
    dst
}

/// Skew-symmetric cross-product matrix, such that skew(a) * b == a.cross(b)
#[rustfmt::skip]
pub fn skew(v: &Vector3<Float>) -> Matrix3<Float> {
    Matrix3::new(
        0.0,  -v.z,  v.y,
        v.z,   0.0, -v.x,
        -v.y,  v.x,  0.0,
    )
}
