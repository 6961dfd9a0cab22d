use super::removal::JointRemovalSpec;
use crate::{
    matrix::{Grid, RotationMatrix, SkeletonStructure},
    mp_error::MpError,
    types::zero_quat,
};
use itertools::Itertools;
use log::info;
use nalgebra_glm as glm;
use smallvec::SmallVec;

/// Chains rarely go past a handful of joints
type Chain = SmallVec<[glm::Quat; 8]>;

/// Global rotations along a chain of local rotations ordered root to leaf.
/// The first global is the first local, each following one is its parent's
/// global times its own local.
#[must_use]
pub fn global_rotations(locals: &[glm::Quat]) -> SmallVec<[glm::Quat; 8]> {
    let mut globals = Chain::with_capacity(locals.len());
    for local in locals {
        let global = globals.last().map_or(*local, |parent| parent * local);
        globals.push(global);
    }
    globals
}

/// Local rotation of a child relative to a parent given both global
/// rotations
#[must_use]
pub fn local_rotation(
    parent_global: &glm::Quat,
    child_global: &glm::Quat,
) -> glm::Quat {
    glm::quat_inverse(parent_global) * child_global
}

/// Folds the rotation of every joint along `chain` into its last joint,
/// relative to its first
fn fold(row: &[glm::Quat], chain: &[usize]) -> glm::Quat {
    let locals: Chain = chain.iter().map(|&c| row[c]).collect();
    let globals = global_rotations(&locals);
    match (globals.first(), globals.last()) {
        (Some(parent), Some(child)) => local_rotation(parent, child),
        // Chains are validated to have at least two entries
        _ => zero_quat(),
    }
}

/// Removes joints from a skeleton and its rotation matrix.
///
/// Every joint named by a chain in `spec.recompute` gets a new local rotation
/// so that its global rotation is the same as before, now relative to the
/// surviving ancestor at the start of its chain. All other surviving joints
/// keep their rotations unchanged. Neither input is modified.
///
/// # Errors
/// `MpError::DimensionMismatch` if `structure` doesn't match `rotations`,
/// otherwise any error from validating `spec`
pub fn retarget(
    structure: &SkeletonStructure,
    rotations: &RotationMatrix,
    spec: &JointRemovalSpec,
) -> Result<(SkeletonStructure, RotationMatrix), MpError> {
    structure.check(rotations)?;
    let joint_count = structure.len();
    let frame_count = rotations.frame_count();
    let plan = spec.plan(joint_count)?;

    info!(
        "retargeting {} frames, {} joints, removing {}",
        frame_count,
        joint_count,
        plan.removed
            .iter()
            .filter_map(|&i| structure.name(i))
            .join(", ")
    );

    let mut output = Grid::filled(frame_count, plan.keep.len(), zero_quat());
    for (frame, row) in rotations.rows().enumerate() {
        let Some(out) = output.row_mut(frame) else {
            break;
        };
        for (dst, &src) in out.iter_mut().zip(&plan.keep) {
            *dst = row[src];
        }
        for f in &plan.folds {
            out[f.target] = fold(row, f.chain);
        }
    }

    let new_structure = structure.without(&plan.removed);
    info!(
        "retargeting done, {} frames, {} -> {} joints: {}",
        frame_count,
        joint_count,
        new_structure.len(),
        new_structure.names().join(", ")
    );
    Ok((new_structure, output))
}
