use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};
use crate::types::{Intrinsics, Pose, is_rigid};

/// Orbit of cameras looking at a common focus point.
///
/// Angles are in degrees. `yaw_angles`, `pitch_angles` and `distances` are
/// per-camera schedules and need at least `n_cameras` entries each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigConfig {
    pub n_cameras: usize,
    pub yaw_angles: Vec<f64>,
    pub pitch_angles: Vec<f64>,
    pub distances: Vec<f64>,
    pub focus_point: [f64; 3],
    pub width: u32,
    pub height: u32,
    pub fov_deg: f64,
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => (0..n)
            .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

impl Default for RigConfig {
    /// Two loops around the focus point at decreasing pitch and distance.
    fn default() -> Self {
        let n = 30;
        Self {
            n_cameras: n,
            yaw_angles: linspace(0.0, 720.0, n),
            pitch_angles: linspace(-25.0, -50.0, n),
            distances: linspace(0.9, 0.8, n),
            focus_point: [0.5, 0.0, 0.1],
            width: 640,
            height: 480,
            fov_deg: 60.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub intrinsics: Intrinsics,
    /// Camera-to-world, +Z forward, +Y down.
    pub pose: Pose,
}

/// Ordered set of cameras sharing one set of intrinsics.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub cameras: Vec<Camera>,
}

/// Camera-to-world pose at `eye` with +Z pointing at `target` and +X
/// horizontal in the world (z-up) frame.
pub fn look_at(eye: &na::Vector3<f64>, target: &na::Vector3<f64>) -> Option<Pose> {
    let z = (target - eye).try_normalize(1e-12)?;
    let x = z.cross(&na::Vector3::z()).try_normalize(1e-9)?;
    let y = z.cross(&x);
    let mut pose = Pose::identity();
    pose.fixed_view_mut::<3, 1>(0, 0).copy_from(&x);
    pose.fixed_view_mut::<3, 1>(0, 1).copy_from(&y);
    pose.fixed_view_mut::<3, 1>(0, 2).copy_from(&z);
    pose.fixed_view_mut::<3, 1>(0, 3).copy_from(eye);
    Some(pose)
}

impl CameraRig {
    pub fn new(cameras: Vec<Camera>) -> CameraRig {
        CameraRig { cameras }
    }

    pub fn from_config(config: &RigConfig) -> Result<CameraRig> {
        let n = config.n_cameras;
        for (name, len) in [
            ("yaw_angles", config.yaw_angles.len()),
            ("pitch_angles", config.pitch_angles.len()),
            ("distances", config.distances.len()),
        ] {
            if len < n {
                return Err(DatasetError::InvalidRigConfig(format!(
                    "{} has {} entries, need {}",
                    name, len, n
                )));
            }
        }
        let intrinsics = Intrinsics::from_vertical_fov(config.width, config.height, config.fov_deg);
        let focus = na::Vector3::from(config.focus_point);
        let cameras = (0..n)
            .map(|i| {
                let yaw = config.yaw_angles[i].to_radians();
                let pitch = config.pitch_angles[i].to_radians();
                let dist = config.distances[i];
                if pitch.abs() >= std::f64::consts::FRAC_PI_2 || dist <= 0.0 {
                    return Err(DatasetError::InvalidRigConfig(format!(
                        "camera {}: pitch must be within (-90, 90) and distance positive",
                        i
                    )));
                }
                let forward = na::Vector3::new(
                    pitch.cos() * yaw.cos(),
                    pitch.cos() * yaw.sin(),
                    pitch.sin(),
                );
                let eye = focus - forward * dist;
                let pose = look_at(&eye, &focus).ok_or_else(|| {
                    DatasetError::InvalidRigConfig(format!("camera {} has no horizon", i))
                })?;
                Ok(Camera { intrinsics, pose })
            })
            .collect::<Result<Vec<_>>>()?;
        log::debug!("built rig with {} cameras around {:?}", n, config.focus_point);
        Ok(CameraRig { cameras })
    }

    pub fn frame_count(&self) -> usize {
        self.cameras.len()
    }

    /// Intrinsics of camera 0, after checking every other camera matches.
    pub fn intrinsics(&self) -> Result<Intrinsics> {
        let first = self.cameras.first().ok_or(DatasetError::EmptyRig)?.intrinsics;
        for (index, cam) in self.cameras.iter().enumerate().skip(1) {
            if !first.approx_eq(&cam.intrinsics) {
                return Err(DatasetError::IntrinsicsMismatch { index });
            }
        }
        Ok(first)
    }

    pub fn poses(&self) -> Vec<Pose> {
        self.cameras.iter().map(|c| c.pose).collect()
    }

    pub fn check_rigid(&self) -> Result<()> {
        match self.cameras.iter().position(|c| !is_rigid(&c.pose)) {
            Some(index) => Err(DatasetError::NonRigidPose { index }),
            None => Ok(()),
        }
    }
}

pub fn create_default_rig() -> Result<CameraRig> {
    CameraRig::from_config(&RigConfig::default())
}
