//! Rotation quaternion
//!
//! Orientations are represented as unit quaternions. Composing two rotations
//! with the Hamilton product only preserves unit length up to floating error,
//! so orientation state is renormalized after every composition before it is
//! converted to a matrix.

use bytemuck::{Pod, Zeroable};
use serde::{Serialize, Deserialize};

use crate::{Mat4, Vec3};

/// Quaternion with vector part (x, y, z) and scalar part w
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Create a new Quat from four components
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create a Quat from a vector part and a scalar part
    #[inline]
    pub const fn from_vector_scalar(v: Vec3, w: f32) -> Self {
        Self { x: v.x, y: v.y, z: v.z, w }
    }

    /// Build a quaternion for a rotation of `degrees` about `axis`.
    ///
    /// `axis` is assumed to be unit length; this is not verified. A non-unit
    /// axis produces a non-unit quaternion.
    pub fn from_axis_angle(degrees: f32, axis: Vec3) -> Self {
        let radians = degrees.to_radians();
        Self::from_vector_scalar(axis * radians.sin(), radians.cos())
    }

    /// Compose an incremental rotation of `degrees` about the Z axis onto this
    /// orientation. The result is not renormalized.
    pub fn rotate_z(self, degrees: f32) -> Self {
        self * Self::from_axis_angle(degrees, Vec3::Z)
    }

    /// The vector part (x, y, z)
    #[inline]
    pub fn vector_part(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// The scalar part (w)
    #[inline]
    pub fn scalar_part(self) -> f32 {
        self.w
    }

    /// Components as an array
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Conjugate: negated vector part. Equals the inverse for unit quaternions.
    #[inline]
    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Squared Euclidean norm of all four components
    #[inline]
    pub fn magnitude_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    /// Euclidean norm of all four components
    #[inline]
    pub fn magnitude(self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    /// Scale to unit magnitude.
    ///
    /// The zero quaternion has no defined normalization; callers must not
    /// pass one.
    #[inline]
    pub fn normalized(self) -> Self {
        self * (1.0 / self.magnitude())
    }

    /// Convert a unit quaternion to a 4x4 rotation matrix.
    ///
    /// Assumes a unit quaternion. A non-unit input produces a scaled, skewed
    /// matrix with no error signaled.
    pub fn to_matrix(self) -> Mat4 {
        let Self { x, y, z, w } = self;

        let mut m = [[0.0f32; 4]; 4];
        m[0][0] = 1.0 - 2.0 * (y * y + z * z);
        m[0][1] = 2.0 * (x * y - w * z);
        m[0][2] = 2.0 * (x * z + w * y);

        m[1][0] = 2.0 * (x * y + w * z);
        m[1][1] = 1.0 - 2.0 * (x * x + z * z);
        m[1][2] = 2.0 * (y * z - w * x);

        m[2][0] = 2.0 * (x * z - w * y);
        m[2][1] = 2.0 * (y * z + w * x);
        m[2][2] = 1.0 - 2.0 * (x * x + y * y);

        m[3][3] = 1.0;
        m
    }
}

// Operator overloads

impl std::ops::Add for Quat {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
            self.w + other.w,
        )
    }
}

impl std::ops::Mul<f32> for Quat {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self::new(
            self.x * scalar,
            self.y * scalar,
            self.z * scalar,
            self.w * scalar,
        )
    }
}

/// Hamilton product: `q * r` composes `q` followed by `r`. Non-commutative.
impl std::ops::Mul for Quat {
    type Output = Self;
    fn mul(self, r: Self) -> Self {
        let qv = self.vector_part();
        let rv = r.vector_part();
        let v = qv.cross(rv) + qv * r.w + rv * self.w;
        let w = self.w * r.w - qv.dot(rv);
        Self::from_vector_scalar(v, w)
    }
}
