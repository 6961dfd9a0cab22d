//! Motion capture preparation for humanoid agents.
//!
//! A clip is sampled at its frame rate into per joint tracks, turned into a
//! frame by joint rotation matrix, optionally pruned of joints the agent
//! doesn't have (folding their rotation into the joints below them) and
//! differentiated into angular velocities. The result is stepped through one
//! frame at a time by whatever drives the agent.
//!
//! ```no_run
//! use motionprep::{
//!     config::PrepConfig, dataset::MotionDataset, sample::ClipDirectory,
//! };
//! use nalgebra_glm as glm;
//!
//! let config = PrepConfig::from_file("prep.yaml")?;
//! let library = ClipDirectory::new("clips");
//! let mut dataset = MotionDataset::load_clip(&library, "walk", &config)?;
//! let mut rotations = vec![glm::Quat::identity(); dataset.joint_count()];
//! dataset.advance_frame();
//! dataset.read_current_rotations(&mut rotations)?;
//! # Ok::<(), motionprep::mp_error::MpError>(())
//! ```
pub mod config;
pub mod cursor;
pub mod dataset;
pub mod frame_control;
pub mod matrix;
pub mod mp_error;
pub mod retarget;
pub mod sample;
pub mod types;
pub mod velocity;
