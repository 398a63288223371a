//! Camera pose capture, scene normalization and NeRF dataset export.
//!
//! A [`rig::CameraRig`] plus one RGB and one depth image per camera is turned
//! into an Instant-NGP style dataset by [`dataset::write_dataset`]. Poses are
//! moved into the graphics convention ([`convention`]), centered on the point
//! the cameras look at and rescaled ([`normalization`]). Per-trial datasets
//! are gathered into one experiment directory by [`aggregate::aggregate`].

pub mod aggregate;
pub mod convention;
pub mod dataset;
pub mod error;
pub mod io;
pub mod manifest;
pub mod normalization;
pub mod rig;
pub mod synthetic;
pub mod types;

pub use error::{DatasetError, Result};
