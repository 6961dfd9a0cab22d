use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};

/// Below this a squared quaternion norm, a rotation axis length or a time
/// step is treated as zero
pub const EPSILON: f32 = 1e-6;

/// One sampled pose of one joint. The orientation is expected to be unit
/// length but nothing here normalizes it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointSample {
    pub position: glm::Vec3,
    pub orientation: glm::Quat,
}

impl Default for JointSample {
    fn default() -> Self {
        Self {
            position: glm::vec3(0.0, 0.0, 0.0),
            orientation: glm::Quat::identity(),
        }
    }
}

/// How joints are keyed when a source is sampled.
///
/// `LeafName` uses the last segment of the binding path, so two joints with
/// the same name under different parents end up sharing one entry (the first
/// one seen wins). `FullPath` keeps them apart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointNaming {
    #[default]
    LeafName,
    FullPath,
}

/// The all zero quaternion used to fill cells that were never written. It is
/// not a rotation and `velocity` skips it.
#[must_use]
pub fn zero_quat() -> glm::Quat {
    glm::quat(0.0, 0.0, 0.0, 0.0)
}

/// Last `/` separated segment of a binding path
#[must_use]
pub fn leaf_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
