//! 4x4 matrix utilities
//!
//! Matrices are stored row-major, in the same element order the uniform
//! buffer receives them. The shaders multiply row vectors on the left
//! (`v * M`), which is how the row-major layout stays correct under the
//! GPU's column-major uniform interpretation.

/// 4x4 matrix type (row-major)
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Near clipping plane distance. Not configurable.
pub const NEAR_PLANE: f32 = 1.0;

/// Build a perspective projection from a vertical field of view (radians),
/// an aspect ratio, and a far clipping distance. The near plane is fixed at
/// [`NEAR_PLANE`].
///
/// `fov` must lie in the open interval (0, pi); values at or outside that
/// range degenerate `tan(fov/2)` and produce a degenerate matrix. Not checked.
pub fn perspective(fov: f32, aspect: f32, far: f32) -> Mat4 {
    let c = 1.0 / (fov / 2.0).tan();
    let depth = far - NEAR_PLANE;

    let mut m = [[0.0f32; 4]; 4];
    m[0][0] = c / aspect;
    m[1][1] = c;
    m[2][2] = -(far + NEAR_PLANE) / depth;
    m[2][3] = -2.0 * far * NEAR_PLANE / depth;
    m[3][2] = -1.0;
    m
}
