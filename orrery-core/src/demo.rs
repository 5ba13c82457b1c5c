/// Ready-made demo scenes shared by the terminal and web front ends.
use nalgebra::Point3;
use std::rc::Rc;
use tracing::info;

use crate::config::{BoxesConfig, OrreryConfig, SolarConfig};
use crate::error::Result;
use crate::geometry::Mesh;
use crate::lighting::{DirectionalLight, Rgb};
use crate::projection::Camera;
use crate::scene::{Node, SceneGraph};
use crate::transform::RotationState;

/// Which demo to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoKind {
    /// Three spinning cubes side by side
    Boxes,
    /// Sun, earth and moon; orbits come from nesting the spinning bodies
    Solar,
}

impl DemoKind {
    pub fn name(&self) -> &'static str {
        match self {
            DemoKind::Boxes => "boxes",
            DemoKind::Solar => "solar",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [DemoKind::Boxes, DemoKind::Solar]
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

/// A scene with the camera and light it is meant to be viewed with
#[derive(Debug)]
pub struct Demo {
    pub kind: DemoKind,
    pub scene: SceneGraph,
    pub camera: Camera,
    pub light: DirectionalLight,
}

impl Demo {
    /// Build a demo; `hues` colours the three cubes of the box demo
    pub fn build(kind: DemoKind, config: &OrreryConfig, hues: [f32; 3]) -> Result<Self> {
        let demo = match kind {
            DemoKind::Boxes => boxes(&config.boxes, config.camera.fov_degrees, hues)?,
            DemoKind::Solar => solar(&config.solar, config.camera.fov_degrees)?,
        };
        info!(?kind, nodes = demo.scene.len(), "demo scene built");
        Ok(demo)
    }
}

fn boxes(config: &BoxesConfig, fov_degrees: f32, hues: [f32; 3]) -> Result<Demo> {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    // One geometry shared by all three cubes
    let cube = Rc::new(Mesh::cube(config.size));
    let names = ["left", "middle", "right"];

    for (i, (name, hue)) in names.iter().zip(hues).enumerate() {
        let x = (i as f32 - 1.0) * config.spacing;
        let node = Node::with_mesh(Rc::clone(&cube))
            .named(*name)
            .at(x, 0.0, config.depth)
            .colored(Rgb::from_hsl(hue, 1.0, 0.5))
            .spinning(RotationState::new(config.spin, config.spin, 0.0));
        scene.add(root, node)?;
    }

    Ok(Demo {
        kind: DemoKind::Boxes,
        scene,
        camera: Camera::perspective(fov_degrees, 1.0, 0.1, 5.0),
        light: DirectionalLight::from_position(Point3::new(-1.0, 2.0, 4.0), 1.0),
    })
}

fn solar(config: &SolarConfig, fov_degrees: f32) -> Result<Demo> {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    let spin_z = |rate: f32| RotationState::new(0.0, 0.0, rate);

    let sun = scene.add(
        root,
        Node::with_mesh(Rc::new(Mesh::sphere(config.sun_radius, config.segments)))
            .named("sun")
            .colored(Rgb::from_hex(0xff0000))
            .spinning(spin_z(config.sun_spin)),
    )?;
    // The earth rides on the sun's spin, which makes it orbit
    let earth = scene.add(
        sun,
        Node::with_mesh(Rc::new(Mesh::sphere(config.earth_radius, config.segments)))
            .named("earth")
            .at(config.earth_offset, 0.0, 0.0)
            .colored(Rgb::from_hex(0x0000ff))
            .spinning(spin_z(config.earth_spin)),
    )?;
    scene.add(
        earth,
        Node::with_mesh(Rc::new(Mesh::sphere(config.moon_radius, config.segments)))
            .named("moon")
            .at(config.moon_offset, 0.0, 0.0)
            .colored(Rgb::from_hex(0xffff00))
            .spinning(spin_z(config.moon_spin)),
    )?;

    // Low and pulled back, so the earth grows as it swings towards the viewer
    let mut camera = Camera::perspective(fov_degrees, 1.0, 1.0, 100.0);
    camera.position = Point3::new(-1.0, -12.0, 10.0);
    camera.look_at(Point3::new(1.0, 12.0, -10.0));

    Ok(Demo {
        kind: DemoKind::Solar,
        scene,
        camera,
        light: DirectionalLight::from_position(Point3::new(0.0, -12.0, 30.0), 1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picking::{pick, Ndc};

    #[test]
    fn test_kind_names() {
        assert_eq!(DemoKind::from_name("Solar"), Some(DemoKind::Solar));
        assert_eq!(DemoKind::from_name(DemoKind::Boxes.name()), Some(DemoKind::Boxes));
        assert_eq!(DemoKind::from_name("galaxy"), None);
    }

    #[test]
    fn test_boxes_layout() {
        let demo = Demo::build(DemoKind::Boxes, &OrreryConfig::default(), [0.0, 0.3, 0.6]).unwrap();
        assert_eq!(demo.scene.len(), 3);

        let middle = demo.scene.find_by_name("middle").unwrap();
        let node = demo.scene.get(middle).unwrap();
        assert_eq!(node.transform.position, Point3::new(0.0, 0.0, -4.0));
        assert_eq!(node.color, Rgb::from_hsl(0.3, 1.0, 0.5));

        let hit = pick(Ndc::new(0.0, 0.0), &demo.scene, &demo.camera).unwrap();
        assert_eq!(hit.node, middle);
    }

    #[test]
    fn test_solar_hierarchy() {
        let demo = Demo::build(DemoKind::Solar, &OrreryConfig::default(), [0.0; 3]).unwrap();
        let scene = &demo.scene;
        let sun = scene.find_by_name("sun").unwrap();
        let earth = scene.find_by_name("earth").unwrap();
        let moon = scene.find_by_name("moon").unwrap();
        assert_eq!(scene.parent(earth), Some(sun));
        assert_eq!(scene.parent(moon), Some(earth));

        let origin = Point3::origin();
        let p = scene.world_matrix(moon).unwrap().transform_point(&origin);
        assert!((p - Point3::new(8.0, 0.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_solar_bodies_orbit_as_time_advances() {
        let mut demo = Demo::build(DemoKind::Solar, &OrreryConfig::default(), [0.0; 3]).unwrap();
        let earth = demo.scene.find_by_name("earth").unwrap();
        let origin = Point3::origin();

        demo.scene.advance(std::f32::consts::FRAC_PI_2);
        let p = demo.scene.world_matrix(earth).unwrap().transform_point(&origin);
        assert!((p - Point3::new(0.0, 6.0, 0.0)).norm() < 1e-4);
    }

    #[test]
    fn test_sun_is_picked_at_view_centre() {
        let demo = Demo::build(DemoKind::Solar, &OrreryConfig::default(), [0.0; 3]).unwrap();
        // The view axis runs straight through the origin
        let hit = pick(Ndc::new(0.0, 0.0), &demo.scene, &demo.camera).unwrap();
        assert_eq!(hit.label(), "sun");
    }
}
