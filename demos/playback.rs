//! Demo of stepping through a processed clip using motionprep
//!
//! `cargo run --example playback -- <clip folder> <clip id> [config.yaml]`
//!
//! With no arguments it plays the `walk` clip under `demos/assets`.
use log::info;
use motionprep::{
    config::PrepConfig, dataset::MotionDataset, sample::ClipDirectory,
};
use nalgebra_glm as glm;
use std::time::{Duration, Instant};

const CLIP_ROOT: &str = "./demos/assets";
const CLIP_ID: &str = "walk";
const FRAME_DURATION: Duration = Duration::from_micros(5000);
const RUN_TIME: Duration = Duration::from_secs(3);

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let root = args.get(1).map_or(CLIP_ROOT, String::as_str);
    let clip_id = args.get(2).map_or(CLIP_ID, String::as_str);
    let config = args.get(3).map_or_else(
        || Ok(PrepConfig::default()),
        PrepConfig::from_file,
    );
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Could not read config: {e}");
            return;
        }
    };

    let library = ClipDirectory::new(root);
    let mut dataset = match MotionDataset::load_clip(&library, clip_id, &config)
    {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Could not load {clip_id} from {root}: {e}");
            return;
        }
    };
    info!(
        "{} frames of {} joints at {} Hz",
        dataset.frame_count(),
        dataset.joint_count(),
        dataset.sample_rate()
    );

    // Start somewhere random, as a training episode would
    if let Err(e) = dataset.reset_random(&mut rand::thread_rng()) {
        eprintln!("Could not pick a start frame: {e}");
        return;
    }

    let mut rotations = vec![glm::Quat::identity(); dataset.joint_count()];
    let mut velocities = vec![glm::Vec3::zeros(); dataset.joint_count()];
    let start = Instant::now();
    let mut last = start;
    while start.elapsed() < RUN_TIME {
        std::thread::sleep(FRAME_DURATION);
        let now = Instant::now();
        let elapsed = (now - last).as_secs_f32();
        last = now;
        match dataset.step(elapsed, &mut rotations, &mut velocities) {
            Ok(true) => {
                let fastest = dataset
                    .structure()
                    .names()
                    .iter()
                    .zip(&velocities)
                    .max_by(|a, b| a.1.norm().total_cmp(&b.1.norm()));
                if let Some((name, v)) = fastest {
                    info!(
                        "frame {} fastest joint {} at {:.3} rad/s",
                        dataset.current_frame(),
                        name,
                        v.norm()
                    );
                }
            }
            Ok(false) => (),
            Err(e) => {
                eprintln!("Step failed: {e}");
                return;
            }
        }
    }
}
