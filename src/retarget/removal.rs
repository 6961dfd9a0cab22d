use crate::{matrix::SkeletonStructure, mp_error::MpError};
use ahash::{HashSet, HashSetExt};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Columns, before removal, from the nearest surviving ancestor of a joint
/// down to the joint itself. Everything between the two ends must be a
/// removed joint.
///
/// For a `Hips, Spine, Spine1` hierarchy where `Spine` is removed, the chain
/// for `Spine1` is `[Hips, Spine, Spine1]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AncestorChain(pub Vec<usize>);

impl AncestorChain {
    #[must_use]
    pub fn anchor(&self) -> Option<usize> {
        self.0.first().copied()
    }

    #[must_use]
    pub fn joint(&self) -> Option<usize> {
        self.0.last().copied()
    }
}

/// Which columns to delete and which surviving joints need their local
/// rotation recomputed because their parent is going away. This is always
/// supplied by the caller, nothing here looks at the skeleton topology.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointRemovalSpec {
    pub remove: Vec<usize>,
    #[serde(default)]
    pub recompute: Vec<AncestorChain>,
}

/// Same as `JointRemovalSpec` but written with joint names, which is easier
/// to keep right in a config file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRemoval {
    pub remove: Vec<String>,
    #[serde(default)]
    pub recompute: Vec<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum RemovalConfig {
    Index(JointRemovalSpec),
    Name(NamedRemoval),
}

impl RemovalConfig {
    /// Resolves to column indices for `structure`
    ///
    /// # Errors
    /// `MpError::UnknownJoint` if a name is not in the structure
    pub fn resolve(
        &self,
        structure: &SkeletonStructure,
    ) -> Result<JointRemovalSpec, MpError> {
        match self {
            Self::Index(spec) => Ok(spec.clone()),
            Self::Name(named) => JointRemovalSpec::from_names(structure, named),
        }
    }
}

/// A validated recomputation: the chain and where its joint ends up
#[derive(Clone, Debug)]
pub(super) struct Fold<'a> {
    pub chain: &'a [usize],
    pub target: usize,
}

/// A validated `JointRemovalSpec`
#[derive(Clone, Debug)]
pub(super) struct Plan<'a> {
    pub keep: Vec<usize>,
    pub removed: Vec<usize>,
    pub folds: Vec<Fold<'a>>,
}

impl JointRemovalSpec {
    /// # Errors
    /// `MpError::UnknownJoint` if a name is not in the structure
    pub fn from_names(
        structure: &SkeletonStructure,
        named: &NamedRemoval,
    ) -> Result<Self, MpError> {
        let lookup = structure.lookup();
        let index = |name: &String| {
            lookup
                .get(name.as_str())
                .copied()
                .ok_or_else(|| MpError::UnknownJoint(name.clone()))
        };
        let remove = named
            .remove
            .iter()
            .map(index)
            .collect::<Result<Vec<_>, _>>()?;
        let recompute = named
            .recompute
            .iter()
            .map(|chain| {
                chain
                    .iter()
                    .map(index)
                    .collect::<Result<Vec<_>, _>>()
                    .map(AncestorChain)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { remove, recompute })
    }

    /// Checks every index against a skeleton of `joint_count` joints and every
    /// chain for consistency with the removal set.
    ///
    /// # Errors
    /// `MpError::InvalidJointIndex` for an index outside the skeleton,
    /// `MpError::BrokenAncestorChain` for a chain that doesn't connect a
    /// surviving ancestor to a surviving joint through removed joints only,
    /// or that recomputes a joint already recomputed.
    pub(super) fn plan(&self, joint_count: usize) -> Result<Plan<'_>, MpError> {
        let removed: Vec<usize> =
            self.remove.iter().copied().sorted().dedup().collect();
        if let Some(&bad) = removed.iter().find(|&&i| i >= joint_count) {
            return Err(MpError::InvalidJointIndex(bad));
        }
        let is_removed = |i: usize| removed.binary_search(&i).is_ok();

        let mut targets = HashSet::with_capacity(self.recompute.len());
        let mut folds = Vec::with_capacity(self.recompute.len());
        for chain in &self.recompute {
            if let Some(&bad) = chain.0.iter().find(|&&i| i >= joint_count) {
                return Err(MpError::InvalidJointIndex(bad));
            }
            let (Some(anchor), Some(joint)) = (chain.anchor(), chain.joint())
            else {
                return Err(MpError::BrokenAncestorChain(0));
            };
            if chain.0.len() < 2 {
                return Err(MpError::BrokenAncestorChain(joint));
            }
            let inner = &chain.0[1..chain.0.len() - 1];
            let connected = !is_removed(anchor)
                && !is_removed(joint)
                && inner.iter().all(|&i| is_removed(i));
            if !connected || !targets.insert(joint) {
                return Err(MpError::BrokenAncestorChain(joint));
            }
            // Column after removal, one less per removed column before it
            let shift = removed.iter().take_while(|&&r| r < joint).count();
            folds.push(Fold {
                chain: &chain.0,
                target: joint - shift,
            });
        }

        let keep = (0..joint_count).filter(|&i| !is_removed(i)).collect();
        Ok(Plan {
            keep,
            removed,
            folds,
        })
    }
}
