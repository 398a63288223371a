use std::path::Path;

use image::RgbImage;
use indicatif::ProgressIterator;
use log::{info, trace};
use serde::{Deserialize, Serialize};

use crate::convention::to_graphics;
use crate::error::{DatasetError, Result};
use crate::io::{object_to_json, write_depth, write_rgb};
use crate::manifest::{
    FrameRecord, Manifest, NORMALIZATION_PARAMS, NORMALIZED_MANIFEST, UNNORMALIZED_MANIFEST,
};
use crate::normalization::find_center_and_scale;
use crate::rig::CameraRig;
use crate::types::{DepthImage, NormalizationParams};

pub const RGB_DIR: &str = "rgbs";
pub const DEPTH_DIR: &str = "depths";

/// Manifest-level settings that do not come from the rig.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasetOptions {
    /// Reconstruction volume hint.
    pub aabb_scale: u32,
    /// Written to the manifest as-is, unrelated to the normalization scale.
    pub scale: f64,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            aabb_scale: 4,
            scale: 1.0,
        }
    }
}

/// Zero padded to three digits; datasets over 1000 frames lose lexicographic order.
pub fn image_file_name(index: usize) -> String {
    format!("{:03}.png", index)
}

fn check_inputs(rig: &CameraRig, rgbs: &[RgbImage], depths: &[DepthImage]) -> Result<()> {
    let cameras = rig.frame_count();
    if rgbs.len() != cameras || depths.len() != cameras {
        return Err(DatasetError::FrameCountMismatch {
            cameras,
            rgbs: rgbs.len(),
            depths: depths.len(),
        });
    }
    rig.check_rigid()?;
    let k = rig.intrinsics()?;
    let expected = (k.width, k.height);
    for (index, rgb) in rgbs.iter().enumerate() {
        if rgb.dimensions() != expected {
            return Err(DatasetError::ResolutionMismatch {
                kind: "rgb",
                index,
                got: rgb.dimensions(),
                expected,
            });
        }
    }
    for (index, depth) in depths.iter().enumerate() {
        if depth.dimensions() != expected {
            return Err(DatasetError::ResolutionMismatch {
                kind: "depth",
                index,
                got: depth.dimensions(),
                expected,
            });
        }
    }
    Ok(())
}

/// Writes an Instant-NGP style dataset for one trial.
///
/// Layout under `output_dir`:
/// - `rgbs/000.png ...` 8-bit color
/// - `depths/000.png ...` 16-bit millimeters
/// - `transforms_unnormalized.json`, `transforms.json`, `normalization_params.json`
///
/// All inputs are validated before anything touches the disk. If the camera
/// rays are degenerate the error surfaces after the images and the
/// unnormalized manifest have been written.
pub fn write_dataset(
    rig: &CameraRig,
    rgbs: &[RgbImage],
    depths: &[DepthImage],
    output_dir: &Path,
    options: &DatasetOptions,
) -> Result<NormalizationParams> {
    check_inputs(rig, rgbs, depths)?;
    let intrinsics = rig.intrinsics()?;

    let rgb_dir = output_dir.join(RGB_DIR);
    let depth_dir = output_dir.join(DEPTH_DIR);
    std::fs::create_dir_all(&rgb_dir).map_err(DatasetError::io(&rgb_dir))?;
    std::fs::create_dir_all(&depth_dir).map_err(DatasetError::io(&depth_dir))?;

    let mut records = Vec::with_capacity(rig.frame_count());
    for (i, ((cam, rgb), depth)) in rig
        .cameras
        .iter()
        .zip(rgbs)
        .zip(depths)
        .enumerate()
        .progress_count(rig.frame_count() as u64)
    {
        let img_fname = image_file_name(i);
        trace!("writing frame {}", img_fname);
        write_rgb(&rgb_dir.join(&img_fname), rgb)?;
        write_depth(&depth_dir.join(&img_fname), depth)?;
        records.push(FrameRecord::new(
            format!("./{}/{}", RGB_DIR, img_fname),
            &to_graphics(&cam.pose),
        ));
    }

    let manifest = Manifest::new(&intrinsics, options.aabb_scale, options.scale, records);
    object_to_json(&output_dir.join(UNNORMALIZED_MANIFEST), &manifest)?;

    let params = find_center_and_scale(&manifest.poses())?;
    object_to_json(
        &output_dir.join(NORMALIZED_MANIFEST),
        &manifest.normalized(&params),
    )?;
    object_to_json(&output_dir.join(NORMALIZATION_PARAMS), &params)?;

    info!(
        "wrote {} frame dataset to {}",
        rig.frame_count(),
        output_dir.display()
    );
    Ok(params)
}
