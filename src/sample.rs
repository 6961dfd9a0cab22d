//! Turning an animation source into per joint sample tracks
pub mod clip;
pub mod source;
pub mod store;

// Re-exports
pub use {
    clip::{
        ClipDirectory, ClipSource, Curve, CurveBinding, Interpolation,
        Keyframe, SavedClip,
    },
    source::{AnimationSource, Channel, ClipLibrary},
    store::{frame_count_for, SampleStore},
};
