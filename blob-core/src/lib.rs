//! Core library for the animated "liquid" branch structure.
//!
//! Main components:
//! - [`noise`]: seeded 3-D gradient noise.
//! - [`curve`]: branch centerlines and the centripetal Catmull-Rom spline.
//! - [`tube`]: skinning a centerline into a twisted, ridged tube.
//! - [`branch`]: one tube with its rest shape and per-frame buffers.
//! - [`deform`]: per-frame displacement, growth and proximity coloring.
//! - [`structure`]: every branch plus the shared rotation.
//! - [`camera`]: perspective camera and pointer rays.
//! - [`raycast`]: ray/triangle and ray/box intersection.
//! - [`engine`]: lifecycle and the per-frame pipeline.
//! - [`scheduler`], [`surface`]: seams to the host's frame loop and display.
//! - [`config`]: tunables, loadable from TOML.
//! - [`error`]: error types.
//! - [`types`]: shared small types.

pub mod branch;
pub mod camera;
pub mod config;
pub mod curve;
pub mod deform;
pub mod engine;
pub mod error;
pub mod noise;
pub mod raycast;
pub mod scheduler;
pub mod structure;
pub mod surface;
pub mod tube;
pub mod types;
