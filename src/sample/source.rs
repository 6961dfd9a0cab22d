use crate::mp_error::MpError;
use serde::{Deserialize, Serialize};

/// The seven scalar curves a joint may carry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    PositionX,
    PositionY,
    PositionZ,
    RotationX,
    RotationY,
    RotationZ,
    RotationW,
}

impl Channel {
    pub const ALL: [Self; 7] = [
        Self::PositionX,
        Self::PositionY,
        Self::PositionZ,
        Self::RotationX,
        Self::RotationY,
        Self::RotationZ,
        Self::RotationW,
    ];

    pub const ROTATION: [Self; 4] =
        [Self::RotationX, Self::RotationY, Self::RotationZ, Self::RotationW];

    /// Value used when the curve is absent. Every component defaults to 0
    /// except `RotationW`, so a joint with no curves at all samples as the
    /// identity rotation at the origin.
    #[must_use]
    pub const fn default_value(self) -> f32 {
        match self {
            Self::RotationW => 1.0,
            _ => 0.0,
        }
    }
}

/// Something that can be sampled into a `SampleStore`. Implemented by
/// `ClipSource` and by whatever parses raw motion capture files.
pub trait AnimationSource {
    /// Samples per second
    fn sample_rate(&self) -> f32;

    /// Clip length in seconds
    fn length(&self) -> f32;

    /// Binding paths of every animated joint, e.g. `Hips/Spine/Spine1`, in
    /// the order they should become columns.
    ///
    /// # Errors
    /// Returns `MpError::SourceUnavailable` if the source cannot be read
    fn joint_paths(&self) -> Result<Vec<String>, MpError>;

    /// Value of one curve at `time`, or `None` if the joint has no such curve
    fn evaluate(&self, path: &str, channel: Channel, time: f32) -> Option<f32>;
}

/// Where previously saved clips come from
pub trait ClipLibrary {
    /// Opens a clip by its identifier
    ///
    /// # Errors
    /// Returns `MpError::SourceUnavailable` if the clip cannot be found or read
    fn open(&self, clip_id: &str) -> Result<Box<dyn AnimationSource>, MpError>;
}
