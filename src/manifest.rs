use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::normalization::{normalize_pose, unnormalize_pose};
use crate::types::{Intrinsics, NormalizationParams, Pose};

pub const UNNORMALIZED_MANIFEST: &str = "transforms_unnormalized.json";
pub const NORMALIZED_MANIFEST: &str = "transforms.json";
pub const NORMALIZATION_PARAMS: &str = "normalization_params.json";

/// One frame entry: image path relative to the dataset root and its pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub file_path: String,
    pub transform_matrix: [[f64; 4]; 4],
}

impl FrameRecord {
    pub fn new(file_path: String, pose: &Pose) -> FrameRecord {
        FrameRecord {
            file_path,
            transform_matrix: pose_to_rows(pose),
        }
    }

    pub fn pose(&self) -> Pose {
        rows_to_pose(&self.transform_matrix)
    }
}

/// Instant-NGP style `transforms.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub fl_x: f64,
    pub fl_y: f64,
    pub cx: f64,
    pub cy: f64,
    pub w: u32,
    pub h: u32,
    pub aabb_scale: u32,
    pub scale: f64,
    pub camera_angle_x: f64,
    pub camera_angle_y: f64,
    pub frames: Vec<FrameRecord>,
}

impl Manifest {
    pub fn new(
        intrinsics: &Intrinsics,
        aabb_scale: u32,
        scale: f64,
        frames: Vec<FrameRecord>,
    ) -> Manifest {
        Manifest {
            fl_x: intrinsics.focal_x,
            fl_y: intrinsics.focal_y,
            cx: intrinsics.principal_x,
            cy: intrinsics.principal_y,
            w: intrinsics.width,
            h: intrinsics.height,
            aabb_scale,
            scale,
            camera_angle_x: intrinsics.camera_angle_x(),
            camera_angle_y: intrinsics.camera_angle_y(),
            frames,
        }
    }

    pub fn intrinsics(&self) -> Intrinsics {
        Intrinsics {
            focal_x: self.fl_x,
            focal_y: self.fl_y,
            principal_x: self.cx,
            principal_y: self.cy,
            width: self.w,
            height: self.h,
        }
    }

    pub fn poses(&self) -> Vec<Pose> {
        self.frames.iter().map(FrameRecord::pose).collect()
    }

    fn map_poses(&self, f: impl Fn(&Pose) -> Pose) -> Manifest {
        let frames = self
            .frames
            .iter()
            .map(|r| FrameRecord::new(r.file_path.clone(), &f(&r.pose())))
            .collect();
        Manifest {
            frames,
            ..self.clone()
        }
    }

    pub fn normalized(&self, params: &NormalizationParams) -> Manifest {
        self.map_poses(|p| normalize_pose(p, params))
    }

    pub fn unnormalized(&self, params: &NormalizationParams) -> Manifest {
        self.map_poses(|p| unnormalize_pose(p, params))
    }
}

/// Row-major nested array, the layout used by the manifest files.
pub fn pose_to_rows(pose: &Pose) -> [[f64; 4]; 4] {
    let mut rows = [[0.0; 4]; 4];
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, v) in row.iter_mut().enumerate() {
            *v = pose[(r, c)];
        }
    }
    rows
}

pub fn rows_to_pose(rows: &[[f64; 4]; 4]) -> Pose {
    na::Matrix4::from_fn(|r, c| rows[r][c])
}
