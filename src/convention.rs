use nalgebra as na;

use crate::types::Pose;

/// Reassigns axis roles from the robot world frame to the graphics world frame.
/// Cyclic permutation: x' = y, y' = z, z' = x.
pub fn robot_to_graphics() -> Pose {
    #[rustfmt::skip]
    let m = na::Matrix4::new(
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Camera looking along +Z to camera looking along -Z with +Y up.
pub fn convert_pose(c2w: &Pose) -> Pose {
    let flip_yz = na::Matrix4::from_diagonal(&na::Vector4::new(1.0, -1.0, -1.0, 1.0));
    c2w * flip_yz
}

/// Simulator camera-to-world pose into the convention written to the manifest.
pub fn to_graphics(c2w: &Pose) -> Pose {
    convert_pose(&(robot_to_graphics() * c2w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_negates_camera_y_and_z() {
        let pose = Pose::new_translation(&na::Vector3::new(1.0, 2.0, 3.0));
        let converted = convert_pose(&pose);
        assert_eq!(converted.column(0), pose.column(0));
        assert_eq!(converted.column(1), -pose.column(1));
        assert_eq!(converted.column(2), -pose.column(2));
        assert_eq!(converted.column(3), pose.column(3));
    }

    #[test]
    fn permutation_moves_translation() {
        let pose = Pose::new_translation(&na::Vector3::new(1.0, 2.0, 3.0));
        let g = to_graphics(&pose);
        assert_eq!(g[(0, 3)], 2.0);
        assert_eq!(g[(1, 3)], 3.0);
        assert_eq!(g[(2, 3)], 1.0);
        assert!((robot_to_graphics().fixed_view::<3, 3>(0, 0).determinant() - 1.0).abs() < 1e-12);
    }
}
