use super::source::{AnimationSource, Channel};
use crate::{
    mp_error::MpError,
    types::{leaf_name, JointNaming, JointSample},
};
use ahash::{HashMap, HashMapExt};
use log::{debug, info, warn};
use nalgebra_glm as glm;

/// Number of frames sampled from a clip of `length` seconds. One less than
/// the rounded up sample count, so the final partial frame is dropped.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn frame_count_for(length: f32, sample_rate: f32) -> usize {
    let n = (length * sample_rate).ceil() - 1.0;
    if n.is_finite() && n > 0.0 {
        n as usize
    } else {
        0
    }
}

/// Per joint sample tracks in insertion order.
///
/// Each entry has a key (the leaf name or full path depending on
/// `JointNaming`), the binding path it was sampled from and its samples.
/// Tracks are expected to all be `frame_count` long but `insert` does not
/// enforce that. `RotationMatrix::from_store` does.
#[derive(Clone, Debug)]
pub struct SampleStore {
    sample_rate: f32,
    frame_count: usize,
    keys: Vec<String>,
    paths: Vec<String>,
    tracks: Vec<Vec<JointSample>>,
    lookup: HashMap<String, usize>,
}

impl SampleStore {
    #[must_use]
    pub fn new(sample_rate: f32, frame_count: usize) -> Self {
        Self {
            sample_rate,
            frame_count,
            keys: Vec::new(),
            paths: Vec::new(),
            tracks: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Samples every joint of `source` at `i / sample_rate` for each frame.
    ///
    /// # Errors
    /// Returns `MpError::SourceUnavailable` if the source can't be read or has
    /// an unusable sample rate, `MpError::EmptySource` if it has no curves.
    #[allow(clippy::cast_precision_loss)]
    pub fn sample(
        source: &dyn AnimationSource,
        naming: JointNaming,
    ) -> Result<Self, MpError> {
        let sample_rate = source.sample_rate();
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(MpError::SourceUnavailable(format!(
                "unusable sample rate {sample_rate}"
            )));
        }
        let paths = source.joint_paths()?;
        if paths.is_empty() {
            return Err(MpError::EmptySource);
        }
        let frame_count = frame_count_for(source.length(), sample_rate);

        let mut store = Self::new(sample_rate, frame_count);
        for path in &paths {
            let key = match naming {
                JointNaming::LeafName => leaf_name(path),
                JointNaming::FullPath => path.as_str(),
            };
            if store.lookup.contains_key(key) {
                warn!(
                    "joint '{}' from {} collides with {}, keeping the first",
                    key,
                    path,
                    store.path_of(key).unwrap_or_default()
                );
                continue;
            }
            report_missing_rotation(source, path);
            let samples = (0..frame_count)
                .map(|i| sample_joint(source, path, i as f32 / sample_rate))
                .collect();
            store.push(key.to_owned(), path.clone(), samples);
        }

        info!(
            "sampled {} joints over {} frames at {} fps",
            store.joint_count(),
            frame_count,
            sample_rate
        );
        store.debug_first_frame();
        Ok(store)
    }

    /// Adds a joint track. Returns `false` and leaves the store unchanged if
    /// `name` is already present.
    pub fn insert(&mut self, name: &str, samples: Vec<JointSample>) -> bool {
        if self.lookup.contains_key(name) {
            return false;
        }
        self.push(name.to_owned(), name.to_owned(), samples);
        true
    }

    fn push(&mut self, key: String, path: String, samples: Vec<JointSample>) {
        self.lookup.insert(key.clone(), self.keys.len());
        self.keys.push(key);
        self.paths.push(path);
        self.tracks.push(samples);
    }

    #[must_use]
    pub const fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.keys.len()
    }

    /// Joint keys in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// `(key, samples)` pairs in insertion order
    pub fn tracks(&self) -> impl Iterator<Item = (&str, &[JointSample])> {
        self.keys
            .iter()
            .zip(&self.tracks)
            .map(|(k, t)| (k.as_str(), t.as_slice()))
    }

    #[must_use]
    pub fn track(&self, name: &str) -> Option<&[JointSample]> {
        self.lookup.get(name).map(|&i| self.tracks[i].as_slice())
    }

    /// Binding path the joint was sampled from
    #[must_use]
    pub fn path_of(&self, name: &str) -> Option<&str> {
        self.lookup.get(name).map(|&i| self.paths[i].as_str())
    }

    /// Short name for display, the leaf of the binding path whichever key
    /// naming was used
    #[must_use]
    pub fn display_name(&self, index: usize) -> Option<&str> {
        self.paths.get(index).map(|p| leaf_name(p))
    }

    /// Copies the position track of one joint, typically the hips, into
    /// `output`.
    ///
    /// # Errors
    /// `MpError::UnknownJoint` if there is no such joint,
    /// `MpError::DimensionMismatch` if `output` is not the track length.
    pub fn positions(
        &self,
        name: &str,
        output: &mut [glm::Vec3],
    ) -> Result<(), MpError> {
        let track = self
            .track(name)
            .ok_or_else(|| MpError::UnknownJoint(name.to_owned()))?;
        if track.len() != output.len() {
            return Err(MpError::DimensionMismatch {
                expected: track.len(),
                actual: output.len(),
            });
        }
        for (out, sample) in output.iter_mut().zip(track) {
            *out = sample.position;
        }
        Ok(())
    }

    /// Orientation of every joint at one frame
    ///
    /// # Errors
    /// `MpError::IndexOutOfRange` if any joint's track is too short
    pub fn rotations_at(
        &self,
        frame: usize,
    ) -> Result<Vec<(&str, glm::Quat)>, MpError> {
        self.tracks()
            .map(|(name, track)| {
                track
                    .get(frame)
                    .map(|s| (name, s.orientation))
                    .ok_or(MpError::IndexOutOfRange(frame))
            })
            .collect()
    }

    fn debug_first_frame(&self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        for (i, (name, track)) in self.tracks().enumerate() {
            if let Some(first) = track.first() {
                let euler = glm::quat_euler_angles(&glm::quat_normalize(
                    &first.orientation,
                ));
                debug!(
                    "joint {} {} first frame euler x={:.2} y={:.2} z={:.2}",
                    i,
                    name,
                    euler.x.to_degrees(),
                    euler.y.to_degrees(),
                    euler.z.to_degrees()
                );
            } else {
                warn!("no frames for joint {}", name);
            }
        }
    }
}

fn curve_value(
    source: &dyn AnimationSource,
    path: &str,
    channel: Channel,
    time: f32,
) -> f32 {
    source
        .evaluate(path, channel, time)
        .unwrap_or_else(|| channel.default_value())
}

/// Samples one joint at one time, filling absent curves with defaults
fn sample_joint(
    source: &dyn AnimationSource,
    path: &str,
    time: f32,
) -> JointSample {
    let c = |ch| curve_value(source, path, ch, time);
    JointSample {
        position: glm::vec3(
            c(Channel::PositionX),
            c(Channel::PositionY),
            c(Channel::PositionZ),
        ),
        orientation: glm::quat(
            c(Channel::RotationX),
            c(Channel::RotationY),
            c(Channel::RotationZ),
            c(Channel::RotationW),
        ),
    }
}

fn report_missing_rotation(source: &dyn AnimationSource, path: &str) {
    for ch in Channel::ROTATION {
        if source.evaluate(path, ch, 0.0).is_none() {
            warn!("joint {} has no {:?} curve", path, ch);
        }
    }
}
