/// Node transforms and rotation state
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Rotation around three axes (in radians), applied in XYZ order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    /// Advance by an angular velocity (radians per second) over `dt` seconds
    pub fn advance(&mut self, rate: &RotationState, dt: f32) {
        self.rotate(rate.x * dt, rate.y * dt, rate.z * dt);
    }

    /// Rotation matrix, `Rx * Ry * Rz`
    pub fn matrix(&self) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(self.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, self.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, self.z));

        rx * ry * rz
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Local transform of a scene node relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Point3<f32>,
    pub rotation: RotationState,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            rotation: RotationState::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_position(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            ..Self::identity()
        }
    }

    /// Translation * rotation * scale
    pub fn matrix(&self) -> Matrix4<f32> {
        Self::translation_matrix(self.position.x, self.position.y, self.position.z)
            * self.rotation.matrix()
            * Self::scale_matrix(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Largest scale factor encoded in an affine matrix's basis columns
pub fn max_axis_scale(matrix: &Matrix4<f32>) -> f32 {
    (0..3)
        .map(|i| matrix.fixed_view::<3, 1>(0, i).norm())
        .fold(0.0_f32, f32::max)
}

/// Inverse-transpose of the model matrix's linear part, for normals
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    let linear: Matrix3<f32> = model.fixed_view::<3, 3>(0, 0).into_owned();
    linear
        .try_inverse()
        .map(|inverse| inverse.transpose())
        .unwrap_or(linear)
}

/// Transform a model-space normal to a unit world-space normal
pub fn world_normal(normal_matrix: &Matrix3<f32>, normal: &Vector3<f32>) -> Vector3<f32> {
    (normal_matrix * normal)
        .try_normalize(1e-6)
        .unwrap_or_else(Vector3::zeros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        assert!(state.is_zero());

        state.rotate(0.1, 0.2, 0.3);
        assert!((state.x - 0.1).abs() < 1e-6);
        assert!((state.y - 0.2).abs() < 1e-6);
        assert!((state.z - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_advance_scales_rate_by_dt() {
        let mut state = RotationState::zero();
        let rate = RotationState::new(0.0, 0.0, 4.0);
        state.advance(&rate, 0.5);
        state.advance(&rate, 0.25);
        assert!((state.z - 3.0).abs() < 1e-6);
        assert_eq!(state.x, 0.0);
    }

    #[test]
    fn test_identity_rotation() {
        let matrix = RotationState::zero().matrix();
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_transform_applies_rotation_before_translation() {
        let mut transform = Transform::from_position(6.0, 0.0, 0.0);
        transform.rotation.z = FRAC_PI_2;
        let p = transform.matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(6.0, 1.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_normals_survive_non_uniform_scale() {
        let mut transform = Transform::identity();
        transform.scale = Vector3::new(4.0, 1.0, 1.0);
        let normals = normal_matrix(&transform.matrix());

        // A diagonal face of a stretched box tilts towards +Y
        let n = world_normal(&normals, &Vector3::new(1.0, 1.0, 0.0).normalize());
        assert!((n.norm() - 1.0).abs() < 1e-6);
        assert!(n.y > n.x);
    }

    #[test]
    fn test_max_axis_scale() {
        let mut transform = Transform::identity();
        transform.scale = Vector3::new(1.0, 3.0, 2.0);
        transform.rotation.x = 0.7;
        assert!((max_axis_scale(&transform.matrix()) - 3.0).abs() < 1e-5);
    }
}
