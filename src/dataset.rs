//! A loaded, processed motion ready to be stepped through
use crate::{
    config::PrepConfig,
    cursor::FrameCursor,
    frame_control::FrameClock,
    matrix::{AngularVelocityMatrix, RotationMatrix, SkeletonStructure},
    mp_error::MpError,
    retarget,
    sample::{AnimationSource, ClipLibrary, SampleStore},
    velocity,
};
use log::{debug, info};
use nalgebra_glm as glm;
use rand::Rng;
use serde::Serialize;

/// Everything a stepper needs for one clip: the skeleton, rotation and
/// angular velocity grids, the root trajectory and a playback position.
///
/// A dataset is built in one go by `load` and is replaced, not modified,
/// when another clip is loaded.
#[derive(Clone, Debug)]
pub struct MotionDataset {
    structure: SkeletonStructure,
    rotations: RotationMatrix,
    velocities: AngularVelocityMatrix,
    root_positions: Vec<glm::Vec3>,
    sample_rate: f32,
    delta_time: f32,
    cursor: FrameCursor,
    clock: FrameClock,
}

/// Plain data copy of a dataset for writing out
#[derive(Clone, Debug, Serialize)]
pub struct ProcessedMotion<'a> {
    pub sample_rate: f32,
    pub delta_time: f32,
    pub joints: &'a SkeletonStructure,
    pub rotations: &'a RotationMatrix,
    pub angular_velocities: &'a AngularVelocityMatrix,
}

impl MotionDataset {
    /// Samples `source`, builds the rotation matrix, retargets it if the
    /// config asks for it and derives angular velocities.
    ///
    /// # Errors
    /// Any `MpError` from the individual stages
    pub fn load(
        source: &dyn AnimationSource,
        config: &PrepConfig,
    ) -> Result<Self, MpError> {
        let store = SampleStore::sample(source, config.naming)?;
        Self::from_store(&store, config)
    }

    /// Same as `load` for a clip out of a library
    ///
    /// # Errors
    /// Any `MpError` from opening the clip or from `load`
    pub fn load_clip(
        library: &dyn ClipLibrary,
        clip_id: &str,
        config: &PrepConfig,
    ) -> Result<Self, MpError> {
        let source = library.open(clip_id)?;
        let dataset = Self::load(source.as_ref(), config)?;
        info!("loaded clip {}", clip_id);
        Ok(dataset)
    }

    /// Builds a dataset from an already sampled store
    ///
    /// # Errors
    /// Any `MpError` from building, retargeting or velocity derivation
    pub fn from_store(
        store: &SampleStore,
        config: &PrepConfig,
    ) -> Result<Self, MpError> {
        let (structure, rotations) = if config.strict_lengths {
            RotationMatrix::from_store(store)?
        } else {
            RotationMatrix::from_store_padded(store)
        };

        let root_positions = root_trajectory(store, rotations.frame_count())?;

        let (structure, rotations) = match &config.removal {
            Some(removal) => {
                let spec = removal.resolve(&structure)?;
                retarget::retarget(&structure, &rotations, &spec)?
            }
            None => (structure, rotations),
        };

        let sample_rate = store.sample_rate();
        let delta_time = config.delta_time_for(sample_rate);
        let velocities = velocity::angular_velocities(&rotations, delta_time)?;

        info!(
            "dataset ready: {} frames x {} joints at {} fps",
            rotations.frame_count(),
            structure.len(),
            sample_rate
        );
        Ok(Self {
            cursor: FrameCursor::new(rotations.frame_count()),
            clock: FrameClock::new(sample_rate),
            structure,
            rotations,
            velocities,
            root_positions,
            sample_rate,
            delta_time,
        })
    }

    #[must_use]
    pub const fn structure(&self) -> &SkeletonStructure {
        &self.structure
    }

    #[must_use]
    pub const fn rotations(&self) -> &RotationMatrix {
        &self.rotations
    }

    #[must_use]
    pub const fn velocities(&self) -> &AngularVelocityMatrix {
        &self.velocities
    }

    /// Position of the root joint at every frame
    #[must_use]
    pub fn root_positions(&self) -> &[glm::Vec3] {
        &self.root_positions
    }

    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.rotations.frame_count()
    }

    #[must_use]
    pub const fn joint_count(&self) -> usize {
        self.rotations.joint_count()
    }

    #[must_use]
    pub const fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    #[must_use]
    pub const fn delta_time(&self) -> f32 {
        self.delta_time
    }

    #[must_use]
    pub const fn current_frame(&self) -> usize {
        self.cursor.current_frame()
    }

    pub fn advance_frame(&mut self) {
        self.cursor.advance();
    }

    /// # Errors
    /// `MpError::IndexOutOfRange` outside `[0, frame_count)`
    pub fn set_frame(&mut self, frame: usize) -> Result<(), MpError> {
        self.cursor.set_frame(frame)
    }

    /// Start of an episode: back to frame 0 with no time accumulated
    pub fn reset(&mut self) {
        self.cursor.reset();
        self.clock.reset();
    }

    /// Start of an episode at a random frame
    ///
    /// # Errors
    /// `MpError::IndexOutOfRange` if the dataset has no frames
    pub fn reset_random<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<usize, MpError> {
        self.clock.reset();
        self.cursor.set_random_frame(rng)
    }

    /// # Errors
    /// `MpError::DimensionMismatch` unless `buffer` has one entry per joint
    pub fn read_current_rotations(
        &self,
        buffer: &mut [glm::Quat],
    ) -> Result<(), MpError> {
        self.cursor.read_rotations(&self.rotations, buffer)
    }

    /// # Errors
    /// `MpError::DimensionMismatch` unless `buffer` has one entry per joint
    pub fn read_current_velocities(
        &self,
        buffer: &mut [glm::Vec3],
    ) -> Result<(), MpError> {
        self.cursor.read_velocities(&self.velocities, buffer)
    }

    /// Feeds `elapsed` seconds of wall clock time to the playback clock. When
    /// a frame is due the cursor advances by one and the new frame is read
    /// into the buffers. Returns whether that happened.
    ///
    /// # Errors
    /// `MpError::DimensionMismatch` unless both buffers have one entry per
    /// joint
    pub fn step(
        &mut self,
        elapsed: f32,
        rotations: &mut [glm::Quat],
        velocities: &mut [glm::Vec3],
    ) -> Result<bool, MpError> {
        if !self.clock.tick(elapsed) {
            return Ok(false);
        }
        self.cursor.advance();
        self.read_current_rotations(rotations)?;
        self.read_current_velocities(velocities)?;
        Ok(true)
    }

    #[must_use]
    pub const fn snapshot(&self) -> ProcessedMotion<'_> {
        ProcessedMotion {
            sample_rate: self.sample_rate,
            delta_time: self.delta_time,
            joints: &self.structure,
            rotations: &self.rotations,
            angular_velocities: &self.velocities,
        }
    }

    /// The processed grids as YAML
    ///
    /// # Errors
    /// May return `MpError`
    pub fn to_yaml(&self) -> Result<String, MpError> {
        Ok(serde_yaml::to_string(&self.snapshot())?)
    }
}

/// Joint whose positions are the root trajectory
pub const ROOT_JOINT: &str = "Hips";

/// Positions of `ROOT_JOINT`, or of the first sampled joint if there is no
/// such joint, one per frame. Frames past the end of the track are zero.
fn root_trajectory(
    store: &SampleStore,
    frames: usize,
) -> Result<Vec<glm::Vec3>, MpError> {
    let name = if store.track(ROOT_JOINT).is_some() {
        Some(ROOT_JOINT)
    } else {
        store.names().next()
    };
    let Some(name) = name else {
        return Ok(Vec::new());
    };
    let len = store.track(name).map_or(0, <[_]>::len);
    let mut positions = vec![glm::Vec3::zeros(); len];
    store.positions(name, &mut positions)?;
    positions.resize(frames, glm::Vec3::zeros());
    debug!("root trajectory from {}, {} frames", name, frames);
    Ok(positions)
}
