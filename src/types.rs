use image::{ImageBuffer, Luma, RgbImage};
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Camera-to-world homogeneous transform.
pub type Pose = na::Matrix4<f64>;

/// Depth in meters, one value per pixel.
pub type DepthImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Depth in millimeters as stored on disk.
pub type DepthImageMm = ImageBuffer<Luma<u16>, Vec<u16>>;

const RIGID_EPS: f64 = 1e-6;

/// Returns true when the upper-left block is a proper rotation and the
/// bottom row is `[0, 0, 0, 1]`.
pub fn is_rigid(pose: &Pose) -> bool {
    let r = pose.fixed_view::<3, 3>(0, 0);
    let orthonormal = (r.transpose() * r - na::Matrix3::identity()).norm() < RIGID_EPS;
    let proper = (r.determinant() - 1.0).abs() < RIGID_EPS;
    let bottom = pose.fixed_view::<1, 4>(3, 0) - na::RowVector4::new(0.0, 0.0, 0.0, 1.0);
    orthonormal && proper && bottom.norm() < RIGID_EPS
}

pub fn pose_translation(pose: &Pose) -> na::Vector3<f64> {
    pose.fixed_view::<3, 1>(0, 3).into_owned()
}

/// Pinhole intrinsics shared by every camera of a rig.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub focal_x: f64,
    pub focal_y: f64,
    pub principal_x: f64,
    pub principal_y: f64,
    pub width: u32,
    pub height: u32,
}

impl Intrinsics {
    /// Square-pixel intrinsics with the principal point at the image center,
    /// derived from a vertical field of view in degrees.
    pub fn from_vertical_fov(width: u32, height: u32, fov_deg: f64) -> Intrinsics {
        let focal = height as f64 / (2.0 * (fov_deg.to_radians() / 2.0).tan());
        Intrinsics {
            focal_x: focal,
            focal_y: focal,
            principal_x: width as f64 / 2.0,
            principal_y: height as f64 / 2.0,
            width,
            height,
        }
    }

    pub fn camera_angle_x(&self) -> f64 {
        2.0 * (self.width as f64 / (2.0 * self.focal_x)).atan()
    }

    pub fn camera_angle_y(&self) -> f64 {
        2.0 * (self.height as f64 / (2.0 * self.focal_y)).atan()
    }

    /// Element-wise comparison with relative and absolute tolerance.
    pub fn approx_eq(&self, other: &Intrinsics) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= 1e-8 + 1e-5 * b.abs();
        self.width == other.width
            && self.height == other.height
            && close(self.focal_x, other.focal_x)
            && close(self.focal_y, other.focal_y)
            && close(self.principal_x, other.principal_x)
            && close(self.principal_y, other.principal_y)
    }
}

/// Translation and uniform scale mapping the raw scene into normalized space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    pub translation: na::Vector3<f64>,
    pub scale: f64,
}

impl NormalizationParams {
    pub fn new(translation: na::Vector3<f64>, scale: f64) -> NormalizationParams {
        NormalizationParams { translation, scale }
    }

    pub fn identity() -> NormalizationParams {
        NormalizationParams::new(na::Vector3::zeros(), 1.0)
    }
}

/// One captured view.
#[derive(Debug, Clone)]
pub struct Frame {
    pub camera_pose: Pose,
    pub rgb: RgbImage,
    pub depth: DepthImage,
}

impl Frame {
    /// Splits frames into the parallel rgb/depth lists taken by the writer.
    pub fn unzip(frames: Vec<Frame>) -> (Vec<RgbImage>, Vec<DepthImage>) {
        frames.into_iter().map(|f| (f.rgb, f.depth)).unzip()
    }
}
