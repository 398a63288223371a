use image::{ImageBuffer, Luma, Rgb, RgbImage};
use nalgebra as na;

use crate::rig::{Camera, CameraRig};
use crate::types::{DepthImage, Frame, pose_translation};

const SKY: Rgb<u8> = Rgb([135, 170, 215]);
const LIGHT: Rgb<u8> = Rgb([230, 230, 230]);
const DARK: Rgb<u8> = Rgb([40, 40, 40]);

/// Renders a checkered `z = 0` ground plane seen from `camera`.
///
/// Depth is the camera-frame z of the hit point, 0 where the ray misses.
pub fn render_ground_plane(camera: &Camera, square_size: f64) -> Frame {
    let k = &camera.intrinsics;
    let rot = camera.pose.fixed_view::<3, 3>(0, 0).into_owned();
    let origin = pose_translation(&camera.pose);

    let mut rgb = RgbImage::new(k.width, k.height);
    let mut depth = DepthImage::new(k.width, k.height);
    for (u, v, px) in rgb.enumerate_pixels_mut() {
        // pixel center, z = 1 in the camera frame
        let dir_cam = na::Vector3::new(
            (u as f64 + 0.5 - k.principal_x) / k.focal_x,
            (v as f64 + 0.5 - k.principal_y) / k.focal_y,
            1.0,
        );
        let dir = rot * dir_cam;
        if dir.z >= -1e-12 {
            *px = SKY;
            continue;
        }
        let t = -origin.z / dir.z;
        if t <= 0.0 {
            *px = SKY;
            continue;
        }
        let hit = origin + dir * t;
        let cell = (hit.x / square_size).floor() as i64 + (hit.y / square_size).floor() as i64;
        *px = if cell.rem_euclid(2) == 0 { LIGHT } else { DARK };
        depth.put_pixel(u, v, Luma([t as f32]));
    }
    Frame {
        camera_pose: camera.pose,
        rgb,
        depth,
    }
}

pub fn capture(rig: &CameraRig, square_size: f64) -> Vec<Frame> {
    rig.cameras
        .iter()
        .enumerate()
        .map(|(i, cam)| {
            log::trace!("rendering cam{}", i);
            render_ground_plane(cam, square_size)
        })
        .collect()
}

/// Flat color and constant depth, useful when image content is irrelevant.
pub fn blank_frame(camera: &Camera, color: [u8; 3], depth_m: f32) -> Frame {
    let k = &camera.intrinsics;
    Frame {
        camera_pose: camera.pose,
        rgb: RgbImage::from_pixel(k.width, k.height, Rgb(color)),
        depth: ImageBuffer::from_pixel(k.width, k.height, Luma([depth_m])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::look_at;
    use crate::types::Intrinsics;

    #[test]
    fn straight_down_center_depth() {
        let eye = na::Vector3::new(0.0, 0.0, 2.0);
        // slight tilt so the horizon axis is defined
        let pose = look_at(&eye, &na::Vector3::new(1e-3, 0.0, 0.0)).unwrap();
        let camera = Camera {
            intrinsics: Intrinsics::from_vertical_fov(32, 24, 60.0),
            pose,
        };
        let frame = render_ground_plane(&camera, 0.1);
        let d = frame.depth.get_pixel(16, 12).0[0];
        assert!((d - 2.0).abs() < 0.05, "depth {}", d);
    }
}
