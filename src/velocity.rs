//! Angular velocity from consecutive orientations
use crate::{
    matrix::{AngularVelocityMatrix, RotationMatrix},
    mp_error::MpError,
    types::EPSILON,
};
use log::{info, warn};
use nalgebra_glm as glm;

/// Axis used when the relative rotation is too small to have a meaningful
/// one. This only keeps the normalize below away from a zero length vector.
/// The angle in that case is effectively zero so the axis has no physical
/// meaning.
fn fallback_axis() -> glm::Vec3 {
    glm::vec3(1.0, 0.0, 0.0)
}

/// Angle in radians and unnormalized axis of a rotation. The quaternion is
/// normalized first and flipped into the `w >= 0` hemisphere so the angle is
/// the short way round, in `[0, pi]`.
fn angle_axis(q: &glm::Quat) -> (f32, glm::Vec3) {
    let q = glm::quat_normalize(q);
    let q = if q.w < 0.0 { -q } else { q };
    let axis = q.imag();
    let angle = 2.0 * axis.norm().atan2(q.w);
    (angle, axis)
}

/// Angular velocity that takes `q1` to `q2` in `delta_time` seconds.
///
/// The relative rotation is always taken the short way round, so the angle
/// is in `[0, pi]`. A 200 degree turn about `+y` comes out as 160 degrees
/// about `-y`, and `q` against `-q` is no motion at all. Consecutive frames
/// of real capture never turn more than half a revolution, so the short way
/// is the one the joint took.
///
/// Returns `None` if either quaternion is degenerate (squared norm below
/// `EPSILON`) or `delta_time` is too close to zero to divide by. Those cells
/// are left at zero rather than filled with `NaN`.
#[must_use]
pub fn angular_velocity(
    q1: &glm::Quat,
    q2: &glm::Quat,
    delta_time: f32,
) -> Option<glm::Vec3> {
    if glm::quat_dot(q1, q1) < EPSILON || glm::quat_dot(q2, q2) < EPSILON {
        return None;
    }
    if delta_time.abs() < EPSILON {
        return None;
    }
    let relative = q2 * glm::quat_inverse(q1);
    let (angle, axis) = angle_axis(&relative);
    let axis = if axis.norm() < EPSILON {
        fallback_axis()
    } else {
        axis
    };
    Some(glm::normalize(&axis) * (angle / delta_time))
}

/// Derives a velocity for every joint at every frame from the frame before.
/// Row 0 has no previous frame and is all zero.
///
/// # Errors
/// `MpError::InsufficientFrames` unless there are more than 2 frames
pub fn angular_velocities(
    rotations: &RotationMatrix,
    delta_time: f32,
) -> Result<AngularVelocityMatrix, MpError> {
    let frames = rotations.frame_count();
    let joints = rotations.joint_count();
    if frames <= 2 {
        warn!("not enough frames to compute angular velocity: {}", frames);
        return Err(MpError::InsufficientFrames(frames));
    }

    let mut output =
        AngularVelocityMatrix::filled(frames, joints, glm::Vec3::zeros());
    let mut skipped = 0usize;
    for frame in 1..frames {
        let (Some(prev), Some(cur)) =
            (rotations.row(frame - 1), rotations.row(frame))
        else {
            break;
        };
        let Some(out) = output.row_mut(frame) else {
            break;
        };
        for (joint, (dst, (q1, q2))) in
            out.iter_mut().zip(prev.iter().zip(cur)).enumerate()
        {
            if let Some(v) = angular_velocity(q1, q2, delta_time) {
                *dst = v;
            } else {
                warn!(
                    "frame {} joint {}: degenerate rotation or time step, \
                     skipped",
                    frame, joint
                );
                skipped += 1;
            }
        }
    }

    info!(
        "angular velocity {} x {}, {} frames processed, dt={}, {} skipped",
        frames,
        joints,
        frames - 1,
        delta_time,
        skipped
    );
    Ok(output)
}
