use log::debug;
use nalgebra as na;

use crate::error::{DatasetError, Result};
use crate::types::{NormalizationParams, Pose, pose_translation};

/// Below this the mean projector is treated as singular.
const SINGULAR_DET: f64 = 1e-10;
/// Smallest average camera distance accepted as a scale.
const MIN_SCALE: f64 = 1e-9;

/// Point closest, in the least-squares sense, to every camera viewing ray.
///
/// Ray origins are the pose translations and directions the third rotation
/// column. Each ray contributes the projector `A = I - d dᵀ` onto the plane
/// orthogonal to it; the minimizer solves `mean(A) p = mean(A o)`.
pub fn center_of_attention(poses: &[Pose]) -> Result<na::Vector3<f64>> {
    if poses.is_empty() {
        return Err(DatasetError::NoPoses);
    }
    let (a_sum, b_sum) = poses.iter().fold(
        (na::Matrix3::<f64>::zeros(), na::Vector3::<f64>::zeros()),
        |(a_acc, b_acc), pose| {
            let o = pose_translation(pose);
            let d = pose.fixed_view::<3, 1>(0, 2).into_owned();
            let a = na::Matrix3::identity() - d * d.transpose();
            (a_acc + a.transpose() * a, b_acc - a * o)
        },
    );
    let n = poses.len() as f64;
    let a_mean = a_sum / n;
    let b_mean = b_sum / n;
    let det = a_mean.determinant();
    if det.abs() < SINGULAR_DET {
        return Err(DatasetError::SingularGeometry { det });
    }
    let a_inv = a_mean
        .try_inverse()
        .ok_or(DatasetError::SingularGeometry { det })?;
    Ok(-(a_inv * b_mean))
}

/// Center of attention and the average camera distance to it.
///
/// The average distance itself is the scale, so wide rigs stay large after
/// normalization instead of being squeezed into a unit cube.
pub fn find_center_and_scale(poses: &[Pose]) -> Result<NormalizationParams> {
    let translation = center_of_attention(poses)?;
    let avg_len = poses
        .iter()
        .map(|p| (pose_translation(p) - translation).norm())
        .sum::<f64>()
        / poses.len() as f64;
    debug!(
        "center of attention {:?}, avg camera distance {:.6}",
        translation.as_slice(),
        avg_len
    );
    if !(avg_len.is_finite() && avg_len > MIN_SCALE) {
        return Err(DatasetError::DegenerateScale { scale: avg_len });
    }
    Ok(NormalizationParams::new(translation, avg_len))
}

pub fn normalize_pose(pose: &Pose, params: &NormalizationParams) -> Pose {
    let mut out = *pose;
    let t = (pose_translation(pose) - params.translation) * params.scale;
    out.fixed_view_mut::<3, 1>(0, 3).copy_from(&t);
    out
}

pub fn unnormalize_pose(pose: &Pose, params: &NormalizationParams) -> Pose {
    let mut out = *pose;
    let t = pose_translation(pose) / params.scale + params.translation;
    out.fixed_view_mut::<3, 1>(0, 3).copy_from(&t);
    out
}

pub fn normalize_pcd(
    points: &[na::Point3<f64>],
    params: &NormalizationParams,
) -> Vec<na::Point3<f64>> {
    points
        .iter()
        .map(|p| na::Point3::from((p.coords - params.translation) * params.scale))
        .collect()
}

pub fn unnormalize_pcd(
    points: &[na::Point3<f64>],
    params: &NormalizationParams,
) -> Vec<na::Point3<f64>> {
    points
        .iter()
        .map(|p| na::Point3::from(p.coords / params.scale + params.translation))
        .collect()
}
