//! Dense frame by joint grids and the skeleton structure naming their columns
use crate::{mp_error::MpError, sample::SampleStore, types::zero_quat};
use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};
use itertools::Itertools;
use log::{info, warn};
use nalgebra_glm as glm;
use serde::Serialize;

/// Row major `[frame][joint]` grid
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Grid<T> {
    frames: usize,
    joints: usize,
    cells: Vec<T>,
}

/// Orientation of every joint at every frame
pub type RotationMatrix = Grid<glm::Quat>;

/// Angular velocity in radians per second of every joint at every frame
pub type AngularVelocityMatrix = Grid<glm::Vec3>;

impl<T: Copy> Grid<T> {
    #[must_use]
    pub fn filled(frames: usize, joints: usize, value: T) -> Self {
        Self {
            frames,
            joints,
            cells: vec![value; frames * joints],
        }
    }

    /// Builds a grid from rows which must all have the same length
    ///
    /// # Errors
    /// `MpError::DimensionMismatch` for a ragged row
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self, MpError> {
        let joints = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(rows.len() * joints);
        for row in rows {
            if row.len() != joints {
                return Err(MpError::DimensionMismatch {
                    expected: joints,
                    actual: row.len(),
                });
            }
            cells.extend_from_slice(row);
        }
        Ok(Self {
            frames: rows.len(),
            joints,
            cells,
        })
    }

    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.frames
    }

    #[must_use]
    pub const fn joint_count(&self) -> usize {
        self.joints
    }

    #[must_use]
    pub fn get(&self, frame: usize, joint: usize) -> Option<T> {
        if joint < self.joints {
            self.cells.get(frame * self.joints + joint).copied()
        } else {
            None
        }
    }

    /// Writes one cell. Out of range writes are refused.
    ///
    /// # Errors
    /// `MpError::IndexOutOfRange` for a bad frame,
    /// `MpError::InvalidJointIndex` for a bad joint
    pub fn set(
        &mut self,
        frame: usize,
        joint: usize,
        value: T,
    ) -> Result<(), MpError> {
        if frame >= self.frames {
            return Err(MpError::IndexOutOfRange(frame));
        }
        if joint >= self.joints {
            return Err(MpError::InvalidJointIndex(joint));
        }
        self.cells[frame * self.joints + joint] = value;
        Ok(())
    }

    #[must_use]
    pub fn row(&self, frame: usize) -> Option<&[T]> {
        if frame < self.frames {
            let start = frame * self.joints;
            Some(&self.cells[start..start + self.joints])
        } else {
            None
        }
    }

    pub fn row_mut(&mut self, frame: usize) -> Option<&mut [T]> {
        if frame < self.frames {
            let start = frame * self.joints;
            Some(&mut self.cells[start..start + self.joints])
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        (0..self.frames).filter_map(|f| self.row(f))
    }

    /// Every frame's value for one joint
    pub fn column(&self, joint: usize) -> impl Iterator<Item = T> + '_ {
        (0..self.frames).filter_map(move |f| self.get(f, joint))
    }
}

/// Ordered joint names. Position in the list is the column in the grids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SkeletonStructure {
    names: Vec<String>,
}

impl SkeletonStructure {
    /// # Errors
    /// `MpError::DuplicateJoint` naming the first repeated name
    pub fn new(names: Vec<String>) -> Result<Self, MpError> {
        let mut seen = HashSet::with_capacity(names.len());
        for n in &names {
            if !seen.insert(n.as_str()) {
                return Err(MpError::DuplicateJoint(n.clone()));
            }
        }
        Ok(Self { names })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Name to column lookup table
    #[must_use]
    pub fn lookup(&self) -> HashMap<&str, usize> {
        let mut map = HashMap::with_capacity(self.names.len());
        for (i, n) in self.names.iter().enumerate() {
            map.insert(n.as_str(), i);
        }
        map
    }

    /// A new structure without the given columns. Indices are removed from
    /// highest to lowest so the remaining ones stay valid while removing.
    #[must_use]
    pub fn without(&self, removed: &[usize]) -> Self {
        let mut names = self.names.clone();
        for &i in removed.iter().sorted().rev().dedup() {
            if i < names.len() {
                names.remove(i);
            }
        }
        Self { names }
    }

    /// Checks a grid has one column per joint
    ///
    /// # Errors
    /// `MpError::DimensionMismatch` if it doesn't
    pub fn check<T>(&self, grid: &Grid<T>) -> Result<(), MpError> {
        if grid.joints == self.names.len() {
            Ok(())
        } else {
            Err(MpError::DimensionMismatch {
                expected: self.names.len(),
                actual: grid.joints,
            })
        }
    }
}

impl RotationMatrix {
    /// Builds the structure and rotation matrix from a sample store, refusing
    /// stores whose joints don't all have `frame_count` samples.
    ///
    /// # Errors
    /// `MpError::DimensionMismatch` for a joint with the wrong sample count
    pub fn from_store(
        store: &SampleStore,
    ) -> Result<(SkeletonStructure, Self), MpError> {
        for (_, track) in store.tracks() {
            if track.len() != store.frame_count() {
                return Err(MpError::DimensionMismatch {
                    expected: store.frame_count(),
                    actual: track.len(),
                });
            }
        }
        Ok(Self::fill(store, store.frame_count()))
    }

    /// Builds the structure and rotation matrix using the longest joint
    /// track as the frame count. Cells past the end of a shorter track are
    /// left as the zero quaternion, which is not a valid pose.
    #[must_use]
    pub fn from_store_padded(store: &SampleStore) -> (SkeletonStructure, Self) {
        let frames = store.tracks().map(|(_, t)| t.len()).max().unwrap_or(0);
        for (name, track) in store.tracks() {
            if track.len() < frames {
                warn!(
                    "joint {} has {} of {} frames, padding with zeros",
                    name,
                    track.len(),
                    frames
                );
            }
        }
        Self::fill(store, frames)
    }

    fn fill(store: &SampleStore, frames: usize) -> (SkeletonStructure, Self) {
        let names: Vec<String> = store.names().map(str::to_owned).collect();
        let mut grid = Self::filled(frames, names.len(), zero_quat());
        for (column, (_, track)) in store.tracks().enumerate() {
            for (frame, sample) in track.iter().take(frames).enumerate() {
                grid.cells[frame * grid.joints + column] = sample.orientation;
            }
        }
        info!(
            "rotation matrix {} x {} for {}",
            grid.frames,
            grid.joints,
            names.iter().join(", ")
        );
        // Store keys are unique so this can't have duplicates
        (SkeletonStructure { names }, grid)
    }
}

#[cfg(test)]
mod tests {
    use super::{Grid, RotationMatrix, SkeletonStructure};
    use crate::{
        mp_error::MpError,
        sample::SampleStore,
        types::{zero_quat, JointSample},
    };
    use nalgebra_glm as glm;

    fn sample(x: f32) -> JointSample {
        JointSample {
            position: glm::vec3(x, 0.0, 0.0),
            orientation: glm::quat_angle_axis(x, &glm::vec3(0.0, 1.0, 0.0)),
        }
    }

    fn store(lengths: &[usize]) -> SampleStore {
        let mut store = SampleStore::new(30.0, lengths[0]);
        for (j, &len) in lengths.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let track = (0..len).map(|f| sample((f * 10 + j) as f32)).collect();
            assert!(store.insert(&format!("joint{j}"), track));
        }
        store
    }

    #[test]
    fn grid_access() {
        let mut g = Grid::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(g.frame_count(), 2);
        assert_eq!(g.joint_count(), 3);
        assert_eq!(g.get(1, 2), Some(6));
        assert_eq!(g.get(0, 3), None);
        assert_eq!(g.get(2, 0), None);
        assert_eq!(g.column(1).collect::<Vec<_>>(), [2, 5]);
        g.set(0, 0, 9).unwrap();
        assert_eq!(g.row(0), Some(&[9, 2, 3][..]));
        assert!(matches!(g.set(2, 0, 0), Err(MpError::IndexOutOfRange(2))));
        assert!(matches!(g.set(0, 3, 0), Err(MpError::InvalidJointIndex(3))));
        assert!(Grid::from_rows(&[vec![1], vec![1, 2]]).is_err());
        assert_eq!(g.rows().count(), 2);
    }

    #[test]
    fn exact_copy() {
        let store = store(&[4, 4, 4]);
        let (structure, m) = RotationMatrix::from_store(&store).unwrap();
        assert_eq!(structure.names(), ["joint0", "joint1", "joint2"]);
        assert_eq!((m.frame_count(), m.joint_count()), (4, 3));
        for (j, (_, track)) in store.tracks().enumerate() {
            for (f, s) in track.iter().enumerate() {
                assert_eq!(m.get(f, j), Some(s.orientation));
            }
        }
        structure.check(&m).unwrap();
    }

    #[test]
    fn strict_refuses_short_tracks() {
        let store = store(&[4, 3, 4]);
        assert!(matches!(
            RotationMatrix::from_store(&store),
            Err(MpError::DimensionMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn padded_fills_zero() {
        let store = store(&[3, 5]);
        let (_, m) = RotationMatrix::from_store_padded(&store);
        assert_eq!(m.frame_count(), 5);
        assert_eq!(m.get(2, 0), Some(sample(20.0).orientation));
        assert_eq!(m.get(3, 0), Some(zero_quat()));
        assert_eq!(m.get(4, 1), Some(sample(41.0).orientation));
    }

    #[test]
    fn structure() {
        let names = ["Hips", "Spine", "Spine1", "Neck"].map(String::from);
        let s = SkeletonStructure::new(names.to_vec()).unwrap();
        assert_eq!(s.index_of("Spine1"), Some(2));
        assert_eq!(s.lookup()["Neck"], 3);
        let s2 = s.without(&[1, 3, 1]);
        assert_eq!(s2.names(), ["Hips", "Spine1"]);
        assert_eq!(s.len(), 4);
        assert!(SkeletonStructure::new(vec!["a".into(), "a".into()]).is_err());
        let g = Grid::filled(2, 3, 0u8);
        assert!(matches!(
            s.check(&g),
            Err(MpError::DimensionMismatch { .. })
        ));
    }
}
