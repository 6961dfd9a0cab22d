use crate::{mp_error::MpError, retarget::RemovalConfig, types::JointNaming};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a source is turned into a dataset. Every field has a default so a
/// config file only needs to name what it changes.
///
/// ```yaml
/// naming: LeafName
/// strict_lengths: true
/// delta_time: 0.05
/// removal:
///   by: name
///   remove: [Spine, Neck]
///   recompute:
///     - [Hips, Spine, Spine1]
///     - [Spine1, Neck, Head]
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    /// How sampled joints are keyed
    pub naming: JointNaming,
    /// Refuse joints with a sample count different from the clip's frame
    /// count. When off they are padded with zero quaternions.
    pub strict_lengths: bool,
    /// Joints to remove after sampling, if any
    pub removal: Option<RemovalConfig>,
    /// Time between frames for angular velocity. Defaults to one over the
    /// sample rate.
    pub delta_time: Option<f32>,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            naming: JointNaming::LeafName,
            strict_lengths: true,
            removal: None,
            delta_time: None,
        }
    }
}

impl PrepConfig {
    /// # Errors
    /// May return `MpError`
    pub fn from_yaml(text: &str) -> Result<Self, MpError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// # Errors
    /// May return `MpError`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MpError> {
        let path = path.as_ref();
        debug!("reading config {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Time step to use for a clip sampled at `sample_rate`
    #[must_use]
    pub fn delta_time_for(&self, sample_rate: f32) -> f32 {
        self.delta_time.unwrap_or(if sample_rate > 0.0 {
            1.0 / sample_rate
        } else {
            0.0
        })
    }
}
