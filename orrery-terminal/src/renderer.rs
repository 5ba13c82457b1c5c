/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix3, Matrix4, Point3};
use orrery_core::config::RenderConfig;
use orrery_core::scene::Visit;
use orrery_core::transform::{normal_matrix, world_normal};
use orrery_core::{Camera, DirectionalLight, Rgb, SceneGraph, Triangle};
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Light every lit surface receives, so unlit sides keep their silhouette
const AMBIENT: f32 = 0.08;

/// One terminal cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub character: char,
    pub color: Option<Rgb>,
}

impl Cell {
    const BLANK: Cell = Cell {
        character: ' ',
        color: None,
    };
}

/// A vertex after projection: screen position, depth and brightness
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    brightness: f32,
}

/// ASCII renderer that converts a scene graph to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![Cell::BLANK; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Match the buffers to the terminal size; returns whether it changed
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        if width == self.width && height == self.height {
            return false;
        }
        *self = Self::new(width, height);
        true
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(Cell::BLANK);
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    /// Rasterize every visible mesh node, then the optional axes overlay
    pub fn render_scene(
        &mut self,
        scene: &SceneGraph,
        camera: &Camera,
        light: &DirectionalLight,
        options: &RenderConfig,
    ) {
        let visits = scene.traverse();
        for visit in &visits {
            self.render_node(visit, camera, light, options.flat_shading);
        }
        if options.show_axes {
            for visit in visits.iter().filter(|v| v.node.mesh.is_some()) {
                self.render_axes(&visit.world, camera);
            }
        }
    }

    fn render_node(
        &mut self,
        visit: &Visit<'_>,
        camera: &Camera,
        light: &DirectionalLight,
        flat_shading: bool,
    ) {
        let Some(mesh) = visit.node.mesh.as_deref() else {
            return;
        };
        let normal_matrix = normal_matrix(&visit.world);

        for triangle in mesh.triangles() {
            let face_brightness = flat_shading.then(|| {
                let normal = world_normal(&normal_matrix, &triangle.calculate_normal());
                light.brightness(&normal)
            });
            self.render_triangle(
                triangle,
                &visit.world,
                &normal_matrix,
                camera,
                light,
                face_brightness,
                visit.node.color,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        model_matrix: &Matrix4<f32>,
        normal_matrix: &Matrix3<f32>,
        camera: &Camera,
        light: &DirectionalLight,
        face_brightness: Option<f32>,
        color: Rgb,
    ) {
        // Project vertices to screen space
        let mut screen = [ScreenVertex {
            x: 0.0,
            y: 0.0,
            depth: 0.0,
            brightness: 0.0,
        }; 3];
        for (slot, vertex) in screen.iter_mut().zip(&triangle.vertices) {
            let Some((x, y, depth)) = camera.project_to_screen(
                &vertex.position,
                model_matrix,
                self.width as u32,
                self.height as u32,
            ) else {
                return; // Triangle is clipped
            };
            let brightness = face_brightness.unwrap_or_else(|| {
                light.brightness(&world_normal(normal_matrix, &vertex.normal))
            });
            *slot = ScreenVertex {
                x,
                y,
                depth,
                brightness,
            };
        }

        self.rasterize_triangle(&screen, color);
    }

    fn rasterize_triangle(&mut self, coords: &[ScreenVertex; 3], color: Rgb) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    let brightness =
                        w0 * v0.brightness + w1 * v1.brightness + w2 * v2.brightness;
                    self.depth_buffer[idx] = depth;
                    self.cells[idx] = shade_cell(brightness, color);
                }
            }
        }
    }

    /// Unit-length local axes, drawn over the geometry regardless of depth
    fn render_axes(&mut self, model_matrix: &Matrix4<f32>, camera: &Camera) {
        let (w, h) = (self.width as u32, self.height as u32);
        let Some(origin) = camera.project_to_screen(&Point3::origin(), model_matrix, w, h) else {
            return;
        };
        let axes = [
            (Point3::new(1.0, 0.0, 0.0), Rgb::RED),
            (Point3::new(0.0, 1.0, 0.0), Rgb::GREEN),
            (Point3::new(0.0, 0.0, 1.0), Rgb::BLUE),
        ];
        for (tip, color) in axes {
            if let Some(end) = camera.project_to_screen(&tip, model_matrix, w, h) {
                self.draw_line((origin.0, origin.1), (end.0, end.1), color);
            }
        }
    }

    /// Bresenham line between two screen points
    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb) {
        let (mut x0, mut y0) = (from.0.floor() as i64, from.1.floor() as i64);
        let (x1, y1) = (to.0.floor() as i64, to.1.floor() as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            if x0 >= 0 && y0 >= 0 && (x0 as usize) < self.width && (y0 as usize) < self.height {
                let idx = y0 as usize * self.width + x0 as usize;
                self.cells[idx] = Cell {
                    character: '·',
                    color: Some(color),
                };
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current: Option<Rgb> = None;
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for cell in &self.cells[y * self.width..(y + 1) * self.width] {
                if cell.color != current {
                    writer.queue(SetForegroundColor(terminal_color(cell.color)))?;
                    current = cell.color;
                }
                writer.queue(Print(cell.character))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn terminal_color(color: Option<Rgb>) -> Color {
    match color {
        Some(rgb) => {
            let (r, g, b) = rgb.to_u8();
            Color::Rgb { r, g, b }
        }
        None => Color::Reset,
    }
}

fn shade_cell(brightness: f32, color: Rgb) -> Cell {
    let lit = AMBIENT + (1.0 - AMBIENT) * brightness.clamp(0.0, 1.0);
    let index = (lit * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
    Cell {
        character: LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)],
        color: Some(color.shade(0.3 + 0.7 * lit)),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
