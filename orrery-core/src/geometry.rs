/// Geometry primitives for the demo scenes
use nalgebra::{Point3, Vector3};
use std::f32::consts::PI;

/// Finest subdivision `Mesh::sphere` will build
pub const MAX_SPHERE_SEGMENTS: u32 = 256;

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }
}

/// Sphere enclosing every vertex of a mesh, in mesh-local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Point3<f32>,
    pub radius: f32,
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone)]
pub struct Mesh {
    triangles: Vec<Triangle>,
    // Axis-aligned extent, grown on every insert
    extent: Option<(Point3<f32>, Point3<f32>)>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
            extent: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
            extent: None,
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        for vertex in &triangle.vertices {
            let p = vertex.position;
            self.extent = Some(match self.extent {
                Some((min, max)) => (min.inf(&p), max.sup(&p)),
                None => (p, p),
            });
        }
        self.triangles.push(triangle);
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Sphere around the mesh's axis-aligned extent, `None` when empty
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        let (min, max) = self.extent?;
        Some(BoundingSphere {
            center: nalgebra::center(&min, &max),
            radius: (max - min).norm() / 2.0,
        })
    }

    /// Create an axis-aligned cube centred on the origin
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::with_capacity(12);

        // Front face
        mesh.add_triangle(Triangle::new(
            Vertex::new(-half, -half, half, 0.0, 0.0, 1.0),
            Vertex::new(half, -half, half, 0.0, 0.0, 1.0),
            Vertex::new(half, half, half, 0.0, 0.0, 1.0),
        ));
        mesh.add_triangle(Triangle::new(
            Vertex::new(-half, -half, half, 0.0, 0.0, 1.0),
            Vertex::new(half, half, half, 0.0, 0.0, 1.0),
            Vertex::new(-half, half, half, 0.0, 0.0, 1.0),
        ));

        // Back face
        mesh.add_triangle(Triangle::new(
            Vertex::new(-half, -half, -half, 0.0, 0.0, -1.0),
            Vertex::new(-half, half, -half, 0.0, 0.0, -1.0),
            Vertex::new(half, half, -half, 0.0, 0.0, -1.0),
        ));
        mesh.add_triangle(Triangle::new(
            Vertex::new(-half, -half, -half, 0.0, 0.0, -1.0),
            Vertex::new(half, half, -half, 0.0, 0.0, -1.0),
            Vertex::new(half, -half, -half, 0.0, 0.0, -1.0),
        ));

        // Top face
        mesh.add_triangle(Triangle::new(
            Vertex::new(-half, half, -half, 0.0, 1.0, 0.0),
            Vertex::new(-half, half, half, 0.0, 1.0, 0.0),
            Vertex::new(half, half, half, 0.0, 1.0, 0.0),
        ));
        mesh.add_triangle(Triangle::new(
            Vertex::new(-half, half, -half, 0.0, 1.0, 0.0),
            Vertex::new(half, half, half, 0.0, 1.0, 0.0),
            Vertex::new(half, half, -half, 0.0, 1.0, 0.0),
        ));

        // Bottom face
        mesh.add_triangle(Triangle::new(
            Vertex::new(-half, -half, -half, 0.0, -1.0, 0.0),
            Vertex::new(half, -half, -half, 0.0, -1.0, 0.0),
            Vertex::new(half, -half, half, 0.0, -1.0, 0.0),
        ));
        mesh.add_triangle(Triangle::new(
            Vertex::new(-half, -half, -half, 0.0, -1.0, 0.0),
            Vertex::new(half, -half, half, 0.0, -1.0, 0.0),
            Vertex::new(-half, -half, half, 0.0, -1.0, 0.0),
        ));

        // Right face
        mesh.add_triangle(Triangle::new(
            Vertex::new(half, -half, -half, 1.0, 0.0, 0.0),
            Vertex::new(half, half, -half, 1.0, 0.0, 0.0),
            Vertex::new(half, half, half, 1.0, 0.0, 0.0),
        ));
        mesh.add_triangle(Triangle::new(
            Vertex::new(half, -half, -half, 1.0, 0.0, 0.0),
            Vertex::new(half, half, half, 1.0, 0.0, 0.0),
            Vertex::new(half, -half, half, 1.0, 0.0, 0.0),
        ));

        // Left face
        mesh.add_triangle(Triangle::new(
            Vertex::new(-half, -half, -half, -1.0, 0.0, 0.0),
            Vertex::new(-half, -half, half, -1.0, 0.0, 0.0),
            Vertex::new(-half, half, half, -1.0, 0.0, 0.0),
        ));
        mesh.add_triangle(Triangle::new(
            Vertex::new(-half, -half, -half, -1.0, 0.0, 0.0),
            Vertex::new(-half, half, half, -1.0, 0.0, 0.0),
            Vertex::new(-half, half, -half, -1.0, 0.0, 0.0),
        ));

        mesh
    }

    /// Create a UV sphere centred on the origin.
    ///
    /// `segments` is used for both the horizontal and vertical subdivision
    /// and is clamped to `3..=MAX_SPHERE_SEGMENTS`. Vertex normals point
    /// outward, so the sphere shades smoothly when the renderer
    /// interpolates them.
    pub fn sphere(radius: f32, segments: u32) -> Self {
        let segments = segments.clamp(3, MAX_SPHERE_SEGMENTS);
        let rings = segments as usize;

        let mut grid: Vec<Vec<Vertex>> = Vec::with_capacity(rings + 1);
        for iy in 0..=segments {
            let theta = iy as f32 / segments as f32 * PI;
            let row = (0..=segments)
                .map(|ix| {
                    let phi = ix as f32 / segments as f32 * 2.0 * PI;
                    let normal = Vector3::new(
                        -phi.cos() * theta.sin(),
                        theta.cos(),
                        phi.sin() * theta.sin(),
                    );
                    let position = normal * radius;
                    Vertex::new(
                        position.x, position.y, position.z, normal.x, normal.y, normal.z,
                    )
                })
                .collect();
            grid.push(row);
        }

        let mut mesh = Self::with_capacity(rings * rings * 2);
        for iy in 0..rings {
            for ix in 0..rings {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];

                // The pole rows collapse to a single point; skip the
                // degenerate half of each quad there.
                if iy != 0 {
                    mesh.add_triangle(Triangle::new(a, b, d));
                }
                if iy != rings - 1 {
                    mesh.add_triangle(Triangle::new(b, c, d));
                }
            }
        }

        mesh
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
