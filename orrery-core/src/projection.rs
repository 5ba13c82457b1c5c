/// Camera, projection and unprojection
use nalgebra::{Matrix4, Point3, Vector3};

use crate::picking::Ndc;
use crate::ray::Ray;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: aspect_ratio(width as f32, height as f32),
            near: 0.1,
            far: 100.0,
            mode: ProjectionMode::Perspective,
        }
    }

    /// Perspective camera at the origin looking down -Z
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Point3::origin(),
            target: Point3::new(0.0, 0.0, -1.0),
            up: Vector3::y(),
            fov: fov_degrees.to_radians(),
            aspect,
            near,
            far,
            mode: ProjectionMode::Perspective,
        }
    }

    /// Point the camera at `target`, keeping its position
    pub fn look_at(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    /// Update the aspect ratio after the display surface was resized.
    ///
    /// Returns whether the aspect actually changed.
    pub fn set_aspect(&mut self, width: f32, height: f32) -> bool {
        let aspect = aspect_ratio(width, height);
        let changed = (aspect - self.aspect).abs() > f32::EPSILON;
        self.aspect = aspect;
        changed
    }

    /// Unit vector the camera looks along
    pub fn forward(&self) -> Vector3<f32> {
        (self.target - self.position)
            .try_normalize(1e-6)
            .unwrap_or(-Vector3::z())
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = (self.position - self.target).norm();
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Projection * view
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a model-space point to screen space.
    ///
    /// Returns `(x, y, depth)` with `x`/`y` in pixels from the top-left
    /// corner and `depth` in NDC [-1, 1], or `None` when the point falls
    /// outside the view volume.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = self.view_projection() * model_matrix;
        let clip = mvp * point.to_homogeneous();

        // Behind the eye or on the camera plane
        if clip.w <= 1e-6 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let depth = clip.z / clip.w;

        if !(-1.0..=1.0).contains(&depth) {
            return None;
        }

        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

        Some((screen_x, screen_y, depth))
    }

    /// World-space point at the given NDC and NDC depth
    pub fn unproject(&self, ndc: Ndc, depth: f32) -> Option<Point3<f32>> {
        let inverse = self.view_projection().try_inverse()?;
        let point = inverse * Point3::new(ndc.x, ndc.y, depth).to_homogeneous();
        if point.w.abs() < f32::EPSILON {
            return None;
        }
        Some(Point3::from(point.xyz() / point.w))
    }

    /// Ray from the camera through a point on the view plane.
    ///
    /// Perspective rays start at the eye; orthographic rays start on the
    /// near plane and run parallel to the view direction. `None` when the
    /// camera matrices are degenerate.
    pub fn ray_from_ndc(&self, ndc: Ndc) -> Option<Ray> {
        match self.mode {
            ProjectionMode::Perspective => {
                let through = self.unproject(ndc, 0.5)?;
                Ray::new(self.position, through - self.position)
            }
            ProjectionMode::Orthographic => {
                let origin = self.unproject(ndc, -1.0)?;
                Ray::new(origin, self.forward())
            }
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

fn aspect_ratio(width: f32, height: f32) -> f32 {
    if height > 0.0 {
        width / height
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert_eq!(camera.mode, ProjectionMode::Perspective);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_view_matrix() {
        let camera = Camera::new(800, 600);
        let view = camera.view_matrix();
        // View matrix should be non-zero
        assert!(view.norm() > 0.0);
    }

    #[test]
    fn test_set_aspect_reports_change() {
        let mut camera = Camera::new(800, 600);
        assert!(!camera.set_aspect(800.0, 600.0));
        assert!(camera.set_aspect(1000.0, 500.0));
        assert!((camera.aspect - 2.0).abs() < 1e-6);
        // Zero height falls back to a square aspect
        camera.set_aspect(10.0, 0.0);
        assert_eq!(camera.aspect, 1.0);
    }

    #[test]
    fn test_target_projects_to_screen_centre() {
        let camera = Camera::new(800, 600);
        let (x, y, depth) = camera
            .project_to_screen(&camera.target, &Matrix4::identity(), 800, 600)
            .unwrap();
        assert!((x - 400.0).abs() < 1e-3);
        assert!((y - 300.0).abs() < 1e-3);
        assert!(depth > -1.0 && depth < 1.0);
    }

    #[test]
    fn test_point_behind_camera_is_clipped() {
        let camera = Camera::new(800, 600);
        let behind = Point3::new(0.0, 0.0, 10.0);
        assert!(camera
            .project_to_screen(&behind, &Matrix4::identity(), 800, 600)
            .is_none());
    }

    #[test]
    fn test_perspective_ray_starts_at_eye() {
        let camera = Camera::new(800, 600);
        let ray = camera.ray_from_ndc(Ndc::new(0.0, 0.0)).unwrap();
        assert!((ray.origin - camera.position).norm() < 1e-5);
        assert!((ray.direction - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-4);

        // Right half of the screen bends the ray towards +X
        let ray = camera.ray_from_ndc(Ndc::new(1.0, 0.0)).unwrap();
        assert!(ray.direction.x > 0.0);
    }

    #[test]
    fn test_orthographic_rays_are_parallel() {
        let mut camera = Camera::new(800, 800);
        camera.mode = ProjectionMode::Orthographic;
        let a = camera.ray_from_ndc(Ndc::new(-0.5, 0.5)).unwrap();
        let b = camera.ray_from_ndc(Ndc::new(0.5, -0.5)).unwrap();
        assert!((a.direction - b.direction).norm() < 1e-6);
        assert!(a.origin.x < 0.0 && a.origin.y > 0.0);
        assert!((a.origin.z - (camera.position.z - camera.near)).abs() < 1e-3);
    }
}
