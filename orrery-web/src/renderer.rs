/// Painter's-algorithm renderer for a 2D canvas context
use orrery_core::transform::{normal_matrix, world_normal};
use orrery_core::{Camera, DirectionalLight, Rgb, SceneGraph};
use web_sys::CanvasRenderingContext2d;

/// Light every face receives, so unlit sides keep their silhouette
const AMBIENT: f32 = 0.15;

const BACKGROUND: &str = "rgb(0, 0, 0)";

/// A projected, shaded triangle ready to fill
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub points: [(f32, f32); 3],
    pub depth: f32,
    pub color: Rgb,
}

/// Project and flat-shade every visible triangle, ordered far to near.
///
/// Triangles with a vertex outside the view volume are dropped whole.
pub fn collect_faces(
    scene: &SceneGraph,
    camera: &Camera,
    light: &DirectionalLight,
    width: u32,
    height: u32,
) -> Vec<Face> {
    let mut faces = Vec::new();

    for visit in scene.traverse() {
        let Some(mesh) = visit.node.mesh.as_deref() else {
            continue;
        };
        let normals = normal_matrix(&visit.world);

        'triangles: for triangle in mesh.triangles() {
            let mut points = [(0.0, 0.0); 3];
            let mut depth = 0.0;
            for (slot, vertex) in points.iter_mut().zip(&triangle.vertices) {
                let Some((x, y, z)) =
                    camera.project_to_screen(&vertex.position, &visit.world, width, height)
                else {
                    continue 'triangles;
                };
                *slot = (x, y);
                depth += z / 3.0;
            }

            let normal = world_normal(&normals, &triangle.calculate_normal());
            let brightness = AMBIENT + (1.0 - AMBIENT) * light.brightness(&normal);
            faces.push(Face {
                points,
                depth,
                color: visit.node.color.shade(brightness),
            });
        }
    }

    faces.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    faces
}

/// Whether the drawing buffer must be resized to match the displayed size
pub fn needs_resize(buffer: (u32, u32), display: (u32, u32)) -> bool {
    buffer != display && display.0 > 0 && display.1 > 0
}

pub struct CanvasRenderer {
    context: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        Self { context }
    }

    pub fn render(
        &self,
        scene: &SceneGraph,
        camera: &Camera,
        light: &DirectionalLight,
        width: u32,
        height: u32,
    ) {
        let ctx = &self.context;
        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, f64::from(width), f64::from(height));

        for face in collect_faces(scene, camera, light, width, height) {
            let css = face.color.to_css();
            let [a, b, c] = face.points;
            ctx.begin_path();
            ctx.move_to(f64::from(a.0), f64::from(a.1));
            ctx.line_to(f64::from(b.0), f64::from(b.1));
            ctx.line_to(f64::from(c.0), f64::from(c.1));
            ctx.close_path();
            ctx.set_fill_style_str(&css);
            ctx.fill();
            // Stroke in the same colour to hide seams between neighbours
            ctx.set_stroke_style_str(&css);
            ctx.stroke();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::{Mesh, Node};
    use std::rc::Rc;

    fn two_cubes() -> (SceneGraph, Camera) {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let cube = Rc::new(Mesh::cube(1.0));
        scene
            .add(root, Node::with_mesh(Rc::clone(&cube)).named("far").at(0.0, 0.0, -8.0))
            .unwrap();
        scene
            .add(root, Node::with_mesh(cube).named("near").at(0.0, 0.0, -4.0))
            .unwrap();
        (scene, Camera::perspective(75.0, 1.0, 0.1, 20.0))
    }

    #[test]
    fn test_faces_sorted_far_to_near() {
        let (scene, camera) = two_cubes();
        let faces = collect_faces(&scene, &camera, &DirectionalLight::default(), 100, 100);
        assert_eq!(faces.len(), 24);
        assert!(faces.windows(2).all(|w| w[0].depth >= w[1].depth));
    }

    #[test]
    fn test_hidden_nodes_are_skipped() {
        let (mut scene, camera) = two_cubes();
        let near = scene.find_by_name("near").unwrap();
        scene.get_mut(near).unwrap().visible = false;
        let faces = collect_faces(&scene, &camera, &DirectionalLight::default(), 100, 100);
        assert_eq!(faces.len(), 12);
    }

    #[test]
    fn test_faces_behind_camera_are_dropped() {
        let (mut scene, camera) = two_cubes();
        let near = scene.find_by_name("near").unwrap();
        scene.get_mut(near).unwrap().transform.position.z = 4.0;
        let faces = collect_faces(&scene, &camera, &DirectionalLight::default(), 100, 100);
        assert_eq!(faces.len(), 12);
    }

    #[test]
    fn test_needs_resize() {
        assert!(!needs_resize((300, 150), (300, 150)));
        assert!(needs_resize((300, 150), (640, 480)));
        assert!(!needs_resize((300, 150), (0, 480)));
    }
}
