//! Keyframed clips saved as YAML, and a folder per clip library of them
use super::source::{AnimationSource, Channel, ClipLibrary};
use crate::mp_error::MpError;
use ahash::{HashMap, HashMapExt};
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

/// A scalar curve. Keys must be sorted by time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    #[serde(default)]
    pub interpolation: Interpolation,
    pub keys: Vec<Keyframe>,
}

/// Helper to calculate the parameter used for interpolation
fn weight(start: f32, end: f32, current: f32) -> f32 {
    const EPSILON: f32 = 0.0005;
    ((current - start) / (end - start).max(EPSILON)).clamp(0.0f32, 1.0f32)
}

impl Curve {
    /// Value at `time`. Before the first key and after the last the curve
    /// holds the end value. An empty curve has no value.
    #[must_use]
    pub fn evaluate(&self, time: f32) -> Option<f32> {
        let mut frame = self.keys.first()?;
        for k in &self.keys {
            if k.time <= time {
                // Candidate key at or before the requested time
                frame = k;
            } else {
                if self.interpolation == Interpolation::Step {
                    return Some(frame.value);
                }
                let w = weight(frame.time, k.time, time);
                return Some((k.value - frame.value).mul_add(w, frame.value));
            }
        }
        Some(frame.value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveBinding {
    pub path: String,
    pub channel: Channel,
    pub curve: Curve,
}

/// A clip as written to disk
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedClip {
    pub name: String,
    pub sample_rate: f32,
    pub length: f32,
    pub curves: Vec<CurveBinding>,
}

impl SavedClip {
    /// # Errors
    /// May return `MpError`
    pub fn from_yaml(text: &str) -> Result<Self, MpError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// # Errors
    /// May return `MpError`
    pub fn to_yaml(&self) -> Result<String, MpError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// A `SavedClip` indexed for sampling
#[derive(Clone, Debug)]
pub struct ClipSource {
    clip: SavedClip,
    paths: Vec<String>,
    lookup: HashMap<(String, Channel), usize>,
}

impl From<SavedClip> for ClipSource {
    fn from(clip: SavedClip) -> Self {
        let paths = clip
            .curves
            .iter()
            .map(|b| b.path.clone())
            .unique()
            .collect();
        let mut lookup = HashMap::new();
        for (i, b) in clip.curves.iter().enumerate() {
            // First binding of a path and channel wins
            lookup.entry((b.path.clone(), b.channel)).or_insert(i);
        }
        Self {
            clip,
            paths,
            lookup,
        }
    }
}

impl ClipSource {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.clip.name
    }
}

impl AnimationSource for ClipSource {
    fn sample_rate(&self) -> f32 {
        self.clip.sample_rate
    }

    fn length(&self) -> f32 {
        self.clip.length
    }

    fn joint_paths(&self) -> Result<Vec<String>, MpError> {
        Ok(self.paths.clone())
    }

    fn evaluate(&self, path: &str, channel: Channel, time: f32) -> Option<f32> {
        self.lookup
            .get(&(path.to_owned(), channel))
            .and_then(|&i| self.clip.curves[i].curve.evaluate(time))
    }
}

/// Clips stored one folder per clip under `root`. The first `.yaml` or `.yml`
/// file in the clip's folder, in name order, is the clip.
#[derive(Clone, Debug)]
pub struct ClipDirectory {
    root: PathBuf,
}

impl ClipDirectory {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn find_clip_file(&self, clip_id: &str) -> Result<PathBuf, MpError> {
        let folder = self.root.join(clip_id);
        if !folder.is_dir() {
            return Err(MpError::SourceUnavailable(format!(
                "folder not found: {}",
                folder.display()
            )));
        }
        let entries = std::fs::read_dir(&folder).map_err(|e| {
            MpError::SourceUnavailable(format!("{}: {e}", folder.display()))
        })?;
        entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| {
                p.extension()
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
            })
            .sorted()
            .next()
            .ok_or_else(|| {
                MpError::SourceUnavailable(format!(
                    "no clip files in {}",
                    folder.display()
                ))
            })
    }
}

impl ClipLibrary for ClipDirectory {
    fn open(&self, clip_id: &str) -> Result<Box<dyn AnimationSource>, MpError> {
        let file = self.find_clip_file(clip_id)?;
        debug!("loading clip {} from {}", clip_id, file.display());
        let text = std::fs::read_to_string(&file).map_err(|e| {
            MpError::SourceUnavailable(format!("{}: {e}", file.display()))
        })?;
        let clip = SavedClip::from_yaml(&text).map_err(|e| {
            MpError::SourceUnavailable(format!("{}: {e}", file.display()))
        })?;
        info!(
            "clip {} has {} curves, {} s at {} fps",
            clip.name,
            clip.curves.len(),
            clip.length,
            clip.sample_rate
        );
        Ok(Box::new(ClipSource::from(clip)))
    }
}
