use std::io::Write;
use std::path::Path;

use image::{ImageBuffer, Luma, RgbImage};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{DatasetError, Result};
use crate::manifest::Manifest;
use crate::types::{DepthImage, DepthImageMm, NormalizationParams};

/// Serializes an object to a pretty-printed JSON file, replacing any existing file.
pub fn object_to_json<T: Serialize>(output_path: &Path, object: &T) -> Result<()> {
    let j = serde_json::to_string_pretty(object)?;
    let mut file = std::fs::File::create(output_path).map_err(DatasetError::io(output_path))?;
    file.write_all(j.as_bytes())
        .map_err(DatasetError::io(output_path))?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(file_path).map_err(DatasetError::io(file_path))?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn read_manifest(file_path: &Path) -> Result<Manifest> {
    object_from_json(file_path)
}

pub fn read_normalization_params(file_path: &Path) -> Result<NormalizationParams> {
    let params: NormalizationParams = object_from_json(file_path)?;
    if !(params.scale.is_finite() && params.scale > 0.0) {
        return Err(DatasetError::InvalidScale(params.scale));
    }
    Ok(params)
}

/// Meters to millimeters, rounded. Out of range values saturate, NaN becomes 0.
pub fn depth_to_mm(depth: &DepthImage) -> DepthImageMm {
    ImageBuffer::from_fn(depth.width(), depth.height(), |x, y| {
        Luma([(depth.get_pixel(x, y).0[0] * 1000.0).round() as u16])
    })
}

pub fn write_rgb(output_path: &Path, rgb: &RgbImage) -> Result<()> {
    rgb.save_with_format(output_path, image::ImageFormat::Png)?;
    Ok(())
}

/// Writes depth as a 16-bit png in millimeters.
pub fn write_depth(output_path: &Path, depth: &DepthImage) -> Result<()> {
    depth_to_mm(depth).save_with_format(output_path, image::ImageFormat::Png)?;
    Ok(())
}
