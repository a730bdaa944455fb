//! Camera holding the triangle's orientation and the projection parameters
//!
//! The orientation is a unit quaternion mutated only through [`Camera::rotate`],
//! which composes a fixed-axis increment and renormalizes. The field of view is
//! mutated only through [`Camera::zoom`].

use trispin_math::{mat4, Mat4, Quat};
use trispin_input::ViewControl;

/// Field-of-view clamp range in degrees. Keeps `tan(fov/2)` well away from
/// its degenerate values at 0 and 180 degrees.
pub const FOV_MIN_DEGREES: f32 = 1.0;
pub const FOV_MAX_DEGREES: f32 = 179.0;

/// View state for the spinning triangle
pub struct Camera {
    /// Unit orientation quaternion
    pub orientation: Quat,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Far clipping distance
    pub far: f32,
}

impl Camera {
    pub fn new(fov_degrees: f32, far: f32) -> Self {
        Self {
            orientation: Quat::IDENTITY,
            fov_degrees,
            far,
        }
    }

    /// Rotate about the Z axis by `degrees` and renormalize the orientation
    pub fn rotate(&mut self, degrees: f32) {
        self.orientation = self.orientation.rotate_z(degrees).normalized();
    }

    /// Change the field of view by `delta` degrees, clamped to a usable range
    pub fn zoom(&mut self, delta: f32) {
        self.fov_degrees = (self.fov_degrees + delta).clamp(FOV_MIN_DEGREES, FOV_MAX_DEGREES);
    }

    /// Rotation matrix for the current orientation
    pub fn rotation_matrix(&self) -> Mat4 {
        self.orientation.to_matrix()
    }

    /// Projection matrix for the current field of view
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        mat4::perspective(self.fov_degrees.to_radians(), aspect, self.far)
    }
}

impl ViewControl for Camera {
    fn rotate(&mut self, degrees: f32) {
        Camera::rotate(self, degrees);
    }

    fn zoom(&mut self, delta: f32) {
        Camera::zoom(self, delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    #[test]
    fn test_new_camera_is_identity() {
        let cam = Camera::new(90.0, 10.0);
        assert_eq!(cam.orientation, Quat::IDENTITY);
        assert_eq!(cam.fov_degrees, 90.0);
    }

    #[test]
    fn test_rotate_keeps_unit_norm() {
        let mut cam = Camera::new(90.0, 10.0);
        for _ in 0..1000 {
            cam.rotate(2.0);
        }
        assert!((cam.orientation.magnitude() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_four_quarter_turns_return_to_identity() {
        let mut cam = Camera::new(90.0, 10.0);
        for _ in 0..4 {
            cam.rotate(90.0);
        }
        let q = cam.orientation;
        assert!((q.x).abs() < EPSILON);
        assert!((q.y).abs() < EPSILON);
        assert!((q.z).abs() < EPSILON);
        assert!((q.w.abs() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut cam = Camera::new(90.0, 10.0);
        cam.zoom(-500.0);
        assert_eq!(cam.fov_degrees, FOV_MIN_DEGREES);
        cam.zoom(1000.0);
        assert_eq!(cam.fov_degrees, FOV_MAX_DEGREES);
    }

    #[test]
    fn test_rotation_matrix_identity() {
        let cam = Camera::new(90.0, 10.0);
        let m = cam.rotation_matrix();
        assert_eq!(m, mat4::IDENTITY);
    }

    #[test]
    fn test_projection_uses_current_fov() {
        let mut cam = Camera::new(90.0, 10.0);
        let before = cam.projection_matrix(1.0);
        cam.zoom(-30.0);
        let after = cam.projection_matrix(1.0);
        // Narrower fov scales both axes up
        assert!(after[0][0] > before[0][0]);
        assert!(after[1][1] > before[1][1]);
    }
}
