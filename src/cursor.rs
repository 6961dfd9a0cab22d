use crate::{
    matrix::{AngularVelocityMatrix, Grid, RotationMatrix},
    mp_error::MpError,
};
use log::trace;
use nalgebra_glm as glm;
use rand::Rng;

/// Playback position in a dataset. Reads copy one row of a grid into a
/// buffer owned by the caller so stepping never allocates.
///
/// There is one cursor per stepper. It is not meant to be shared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameCursor {
    current_frame: usize,
    frame_count: usize,
}

impl FrameCursor {
    #[must_use]
    pub const fn new(frame_count: usize) -> Self {
        Self {
            current_frame: 0,
            frame_count,
        }
    }

    #[must_use]
    pub const fn current_frame(&self) -> usize {
        self.current_frame
    }

    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Moves to the next frame, wrapping to 0 after the last one
    pub fn advance(&mut self) {
        self.current_frame += 1;
        if self.current_frame >= self.frame_count {
            self.current_frame = 0;
        }
        trace!("advance current_frame={}", self.current_frame);
    }

    /// Back to the first frame, for the start of an episode
    pub fn reset(&mut self) {
        self.current_frame = 0;
    }

    /// # Errors
    /// `MpError::IndexOutOfRange` if `frame` is not below the frame count
    pub fn set_frame(&mut self, frame: usize) -> Result<(), MpError> {
        if frame >= self.frame_count {
            return Err(MpError::IndexOutOfRange(frame));
        }
        self.current_frame = frame;
        Ok(())
    }

    /// Jumps to a uniformly chosen frame and returns it
    ///
    /// # Errors
    /// `MpError::IndexOutOfRange` if there are no frames
    pub fn set_random_frame<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<usize, MpError> {
        if self.frame_count == 0 {
            return Err(MpError::IndexOutOfRange(0));
        }
        self.current_frame = rng.gen_range(0..self.frame_count);
        Ok(self.current_frame)
    }

    /// Copies the current row of `grid` into `buffer`, in column order
    ///
    /// # Errors
    /// `MpError::DimensionMismatch` if `buffer` is not one entry per joint,
    /// `MpError::IndexOutOfRange` if `grid` is shorter than the cursor's
    /// frame count
    pub fn read<T: Copy>(
        &self,
        grid: &Grid<T>,
        buffer: &mut [T],
    ) -> Result<(), MpError> {
        if buffer.len() != grid.joint_count() {
            return Err(MpError::DimensionMismatch {
                expected: grid.joint_count(),
                actual: buffer.len(),
            });
        }
        let row = grid
            .row(self.current_frame)
            .ok_or(MpError::IndexOutOfRange(self.current_frame))?;
        buffer.copy_from_slice(row);
        Ok(())
    }

    /// # Errors
    /// See `read`
    pub fn read_rotations(
        &self,
        rotations: &RotationMatrix,
        buffer: &mut [glm::Quat],
    ) -> Result<(), MpError> {
        self.read(rotations, buffer)
    }

    /// # Errors
    /// See `read`
    pub fn read_velocities(
        &self,
        velocities: &AngularVelocityMatrix,
        buffer: &mut [glm::Vec3],
    ) -> Result<(), MpError> {
        self.read(velocities, buffer)
    }
}
