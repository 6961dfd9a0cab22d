//! Recommend using with
//! `RUSTFLAGS="-C target-cpu=x86-64-v2" cargo bench`
//!
//! Sizes are roughly a few seconds of 60 Hz capture on a 22 joint humanoid,
//! which is what a single training clip usually is.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use motionprep::{
    matrix::{RotationMatrix, SkeletonStructure},
    retarget::{self, AncestorChain, JointRemovalSpec},
    velocity,
};
use nalgebra_glm as glm;

const FRAMES: usize = 240;
const JOINTS: usize = 22;
const DELTA_TIME: f32 = 1.0 / 60.0;

#[allow(clippy::cast_precision_loss)]
fn use_this_matrix() -> RotationMatrix {
    let rows: Vec<Vec<glm::Quat>> = (0..FRAMES)
        .map(|f| {
            (0..JOINTS)
                .map(|j| {
                    let angle = 0.01 * (f * (j + 1)) as f32;
                    let axis = glm::normalize(&glm::vec3(
                        1.0,
                        j as f32 * 0.1,
                        0.5,
                    ));
                    glm::quat_angle_axis(angle, &axis)
                })
                .collect()
        })
        .collect();
    RotationMatrix::from_rows(&rows).unwrap()
}

fn use_this_structure() -> SkeletonStructure {
    SkeletonStructure::new((0..JOINTS).map(|j| format!("joint{j}")).collect())
        .unwrap()
}

fn use_this_spec() -> JointRemovalSpec {
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

fn retarget_humanoid(c: &mut Criterion) {
    let structure = black_box(use_this_structure());
    let m = black_box(use_this_matrix());
    let spec = black_box(use_this_spec());
    c.bench_function(
        "retarget humanoid", //
        |b| b.iter(|| retarget::retarget(&structure, &m, &spec)),
    );
}

fn velocity_matrix(c: &mut Criterion) {
    let m = black_box(use_this_matrix());
    c.bench_function(
        "angular velocities", //
        |b| b.iter(|| velocity::angular_velocities(&m, DELTA_TIME)),
    );
}

fn single_velocity(c: &mut Criterion) {
    let q1 = black_box(glm::quat_angle_axis(
        0.376_f32,
        &glm::vec3(0.0_f32, 0.0_f32, 1.0_f32),
    ));
    let q2 = black_box(glm::quat_angle_axis(
        0.512_f32,
        &glm::vec3(0.0_f32, 1.0_f32, 0.0_f32),
    ));
    c.bench_function(
        "angular velocity", //
        |b| b.iter(|| velocity::angular_velocity(&q1, &q2, DELTA_TIME)),
    );
}

criterion_group!(benches, retarget_humanoid, velocity_matrix, single_velocity);
criterion_main!(benches);
