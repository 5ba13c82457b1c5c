/// Rays and ray/geometry intersection
use nalgebra::{Matrix4, Point3, Vector3};

use crate::geometry::{BoundingSphere, Mesh, Triangle};
use crate::transform::max_axis_scale;

const EPSILON: f32 = 1e-7;

/// Half-line with a unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Build a ray, normalizing `direction`; `None` for a zero direction
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Option<Self> {
        let direction = direction.try_normalize(EPSILON)?;
        Some(Self { origin, direction })
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Whether the ray passes through a sphere in front of its origin
    pub fn hits_sphere(&self, center: &Point3<f32>, radius: f32) -> bool {
        let to_center = center - self.origin;
        let along = to_center.dot(&self.direction);
        let distance_sq = to_center.norm_squared() - along * along;
        if distance_sq > radius * radius {
            return false;
        }
        // Sphere entirely behind the origin
        along >= 0.0 || to_center.norm_squared() <= radius * radius
    }

    /// Möller–Trumbore intersection against both faces of a triangle.
    ///
    /// Returns the ray parameter of the hit.
    pub fn intersect_triangle(
        &self,
        a: &Point3<f32>,
        b: &Point3<f32>,
        c: &Point3<f32>,
    ) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(&edge2);
        let det = edge1.dot(&p);
        if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(&p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = self.direction.dot(&q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(&q) * inv_det;
        (t > EPSILON).then_some(t)
    }

    /// Nearest hit against a mesh placed in the world by `world`.
    ///
    /// Vertices are moved into world space so `t` is a world distance.
    pub fn intersect_mesh(&self, mesh: &Mesh, world: &Matrix4<f32>) -> Option<f32> {
        if let Some(bounds) = mesh.bounding_sphere() {
            let BoundingSphere { center, radius } = bounds;
            let center = world.transform_point(&center);
            if !self.hits_sphere(&center, radius * max_axis_scale(world)) {
                return None;
            }
        }

        mesh.triangles()
            .iter()
            .filter_map(|triangle| self.intersect_world_triangle(triangle, world))
            .min_by(f32::total_cmp)
    }

    fn intersect_world_triangle(&self, triangle: &Triangle, world: &Matrix4<f32>) -> Option<f32> {
        let [a, b, c] = triangle
            .vertices
            .map(|vertex| world.transform_point(&vertex.position));
        self.intersect_triangle(&a, &b, &c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward_ray() -> Ray {
        Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -2.0)).unwrap()
    }

    #[test]
    fn test_direction_is_normalized() {
        let ray = forward_ray();
        assert!((ray.direction.norm() - 1.0).abs() < 1e-6);
        assert!(Ray::new(Point3::origin(), Vector3::zeros()).is_none());
    }

    #[test]
    fn test_triangle_hit_both_faces() {
        let ray = forward_ray();
        let a = Point3::new(-1.0, -1.0, -3.0);
        let b = Point3::new(1.0, -1.0, -3.0);
        let c = Point3::new(0.0, 1.0, -3.0);
        let t = ray.intersect_triangle(&a, &b, &c).unwrap();
        assert!((t - 3.0).abs() < 1e-5);
        let t = ray.intersect_triangle(&a, &c, &b).unwrap();
        assert!((t - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_miss_and_behind() {
        let ray = forward_ray();
        let a = Point3::new(2.0, 2.0, -3.0);
        let b = Point3::new(3.0, 2.0, -3.0);
        let c = Point3::new(2.0, 3.0, -3.0);
        assert!(ray.intersect_triangle(&a, &b, &c).is_none());

        let a = Point3::new(-1.0, -1.0, 3.0);
        let b = Point3::new(1.0, -1.0, 3.0);
        let c = Point3::new(0.0, 1.0, 3.0);
        assert!(ray.intersect_triangle(&a, &b, &c).is_none());
    }

    #[test]
    fn test_mesh_hit_uses_world_transform() {
        let ray = forward_ray();
        let cube = Mesh::cube(1.0);

        let world = Matrix4::new_translation(&Vector3::new(0.0, 0.0, -4.0));
        let t = ray.intersect_mesh(&cube, &world).unwrap();
        assert!((t - 3.5).abs() < 1e-5);

        let world = Matrix4::new_translation(&Vector3::new(2.0, 0.0, -4.0));
        assert!(ray.intersect_mesh(&cube, &world).is_none());
    }

    #[test]
    fn test_sphere_test() {
        let ray = forward_ray();
        assert!(ray.hits_sphere(&Point3::new(0.0, 0.5, -10.0), 1.0));
        assert!(!ray.hits_sphere(&Point3::new(0.0, 5.0, -10.0), 1.0));
        assert!(!ray.hits_sphere(&Point3::new(0.0, 0.0, 10.0), 1.0));
        assert!(ray.hits_sphere(&Point3::origin(), 1.0));
    }
}
