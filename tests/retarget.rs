//! Tests for the retarget module
//!
//! Random unit quaternions are built from an angle about a random axis so
//! they are always valid rotations. Comparisons treat `q` and `-q` as equal
//! because they are the same rotation.

use log::info;
use motionprep::{
    matrix::{RotationMatrix, SkeletonStructure},
    mp_error::MpError,
    retarget::{
        global_rotations, local_rotation, retarget, AncestorChain,
        JointRemovalSpec,
    },
};
use nalgebra_glm as glm;
use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};
use std::sync::Once;

const EPSILON: f32 = 0.0001f32; // Small value for float comparisons
static INIT: Once = Once::new();

/// Initializes logging in a "once per test run" manner. Call at the start of
/// each test that needs logging.
fn init_tests() {
    INIT.call_once(|| {
        env_logger::init();
    });
}

fn random_rotation(rng: &mut StdRng) -> glm::Quat {
    let axis =
        glm::vec3(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 1.0);
    glm::quat_angle_axis(
        rng.gen_range(-std::f32::consts::PI..std::f32::consts::PI),
        &glm::normalize(&axis),
    )
}

/// Compare two rotations for approximate equality
fn same_rotation(q1: &glm::Quat, q2: &glm::Quat) -> bool {
    let c = glm::quat_equal_eps(q1, q2, EPSILON);
    let d = glm::quat_equal_eps(q1, &-*q2, EPSILON);
    (c.x && c.y && c.z && c.w) || (d.x && d.y && d.z && d.w)
}

fn structure(n: usize) -> SkeletonStructure {
    SkeletonStructure::new((0..n).map(|i| format!("joint{i}")).collect())
        .unwrap()
}

/// Composing a chain, recovering the leaf's local rotation relative to the
/// root and composing again gives back the leaf's global rotation
#[test]
fn round_trip_law() {
    init_tests();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for len in 2..=5 {
        for _ in 0..100 {
            let chain: Vec<glm::Quat> =
                (0..len).map(|_| random_rotation(&mut rng)).collect();
            let globals = global_rotations(&chain);
            let root = globals[0];
            let leaf = globals[len - 1];
            let local = local_rotation(&root, &leaf);
            assert!(
                same_rotation(&(root * local), &leaf),
                "chain length {len}"
            );
        }
    }
}

/// Output has one column fewer per removed joint for any valid removal set
#[test]
fn column_count() {
    init_tests();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let joints = rng.gen_range(1..12);
        let frames = rng.gen_range(1..6);
        let rows: Vec<Vec<glm::Quat>> = (0..frames)
            .map(|_| (0..joints).map(|_| random_rotation(&mut rng)).collect())
            .collect();
        let m = RotationMatrix::from_rows(&rows).unwrap();
        let removed = rng.gen_range(0..=joints);
        let spec = JointRemovalSpec {
            remove: index::sample(&mut rng, joints, removed).into_vec(),
            recompute: Vec::new(),
        };
        let (s, out) = retarget(&structure(joints), &m, &spec).unwrap();
        assert_eq!(out.joint_count(), joints - removed);
        assert_eq!(s.len(), joints - removed);
        assert_eq!(out.frame_count(), frames);
    }
}

/// 22 joint mocap skeleton pruned to the 15 joints of a simple humanoid
const NAMES: [&str; 22] = [
    "Hips",
    "LeftUpLeg",
    "LeftLeg",
    "LeftFoot",
    "LeftToeBase",
    "RightUpLeg",
    "RightLeg",
    "RightFoot",
    "RightToeBase",
    "Spine",
    "Spine1",
    "Spine2",
    "Neck",
    "Head",
    "LeftShoulder",
    "LeftArm",
    "LeftForeArm",
    "LeftHand",
    "RightShoulder",
    "RightArm",
    "RightForeArm",
    "RightHand",
];

const PARENTS: [Option<usize>; 22] = [
    None,
    Some(0),
    Some(1),
    Some(2),
    Some(3),
    Some(0),
    Some(5),
    Some(6),
    Some(7),
    Some(0),
    Some(9),
    Some(10),
    Some(11),
    Some(12),
    Some(11),
    Some(14),
    Some(15),
    Some(16),
    Some(11),
    Some(18),
    Some(19),
    Some(20),
];

fn humanoid_spec() -> JointRemovalSpec {
    JointRemovalSpec {
        remove: vec![4, 8, 9, 11, 12, 14, 18],
        recompute: vec![
            AncestorChain(vec![0, 9, 10]),
            AncestorChain(vec![10, 11, 12, 13]),
            AncestorChain(vec![10, 11, 14, 15]),
            AncestorChain(vec![10, 11, 18, 19]),
        ],
    }
}

/// World rotation of every joint given local rotations and a parent table
fn world(row: &[glm::Quat], parents: &[Option<usize>]) -> Vec<glm::Quat> {
    let mut out: Vec<glm::Quat> = Vec::with_capacity(row.len());
    for (j, local) in row.iter().enumerate() {
        // Parents always come before their children here
        let g = parents[j].map_or(*local, |p| out[p] * local);
        out.push(g);
    }
    out
}

/// Every surviving joint keeps its world rotation after pruning
#[test]
fn humanoid_pruning() {
    init_tests();
    let mut rng = StdRng::seed_from_u64(7);
    let rows: Vec<Vec<glm::Quat>> = (0..8)
        .map(|_| (0..22).map(|_| random_rotation(&mut rng)).collect())
        .collect();
    let m = RotationMatrix::from_rows(&rows).unwrap();
    let s = SkeletonStructure::new(
        NAMES.iter().map(|n| (*n).to_string()).collect(),
    )
    .unwrap();

    let (new_s, out) = retarget(&s, &m, &humanoid_spec()).unwrap();
    info!("pruned structure {:?}", new_s.names());
    assert_eq!(new_s.len(), 15);
    assert_eq!(out.joint_count(), 15);

    // New hierarchy, by name
    let new_parent = |name: &str| -> Option<&'static str> {
        match name {
            "Hips" => None,
            "Spine1" => Some("Hips"),
            "Head" | "LeftArm" | "RightArm" => Some("Spine1"),
            _ => {
                let j = NAMES.iter().position(|n| *n == name)?;
                PARENTS[j].map(|p| NAMES[p])
            }
        }
    };
    let parents: Vec<Option<usize>> = new_s
        .names()
        .iter()
        .map(|n| new_parent(n.as_str()).and_then(|p| new_s.index_of(p)))
        .collect();

    for (f, row) in rows.iter().enumerate() {
        let before = world(row, &PARENTS);
        let after = world(out.row(f).unwrap(), &parents);
        for (j, name) in new_s.names().iter().enumerate() {
            let old = s.index_of(name).unwrap();
            assert!(
                same_rotation(&after[j], &before[old]),
                "frame {f} joint {name}"
            );
        }
    }
}

/// Pruning leaves the input grid alone
#[test]
fn inputs_untouched() {
    let mut rng = StdRng::seed_from_u64(3);
    let rows: Vec<Vec<glm::Quat>> = (0..3)
        .map(|_| (0..22).map(|_| random_rotation(&mut rng)).collect())
        .collect();
    let m = RotationMatrix::from_rows(&rows).unwrap();
    let copy = m.clone();
    let s = structure(22);
    let _ = retarget(&s, &m, &humanoid_spec()).unwrap();
    assert_eq!(m, copy);
    assert_eq!(s, structure(22));
}

/// A chain that runs through a joint which is kept is a configuration error
#[test]
fn broken_chain() {
    let m = RotationMatrix::filled(3, 22, glm::Quat::identity());
    let mut spec = humanoid_spec();
    spec.recompute.push(AncestorChain(vec![0, 1, 2]));
    assert!(matches!(
        retarget(&structure(22), &m, &spec),
        Err(MpError::BrokenAncestorChain(2))
    ));
}
