/// Pointer-to-object picking.
///
/// A pointer position is mapped to normalized device coordinates, a ray is
/// cast from the camera through that point, and the nearest visible mesh
/// node along the ray is reported.
use nalgebra::Point3;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::projection::Camera;
use crate::ray::Ray;
use crate::scene::{NodeId, SceneGraph};
use crate::surface::{PointerEventKind, PointerHandler, SubscriptionId, Surface, SurfaceRect};

/// Pixel position of a pointer, in the same space as [`SurfaceRect`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

impl PointerPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Normalized device coordinates: [-1, 1] on both axes, +Y up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ndc {
    pub x: f32,
    pub y: f32,
}

impl Ndc {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Map a pointer position to NDC relative to `rect`.
///
/// The caller must ensure `rect` is not empty; a zero width or height
/// yields non-finite coordinates.
pub fn compute_ndc(pointer: PointerPosition, rect: &SurfaceRect) -> Ndc {
    let fx = (pointer.x - rect.left) / rect.width;
    let fy = (pointer.y - rect.top) / rect.height;
    Ndc::new((fx - 0.5) * 2.0, (0.5 - fy) * 2.0)
}

/// A node intersected by a pick ray
#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    pub name: Option<String>,
    /// Distance from the ray origin
    pub distance: f32,
    /// World-space intersection point
    pub point: Point3<f32>,
}

impl PickHit {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

/// Every visible mesh node hit by `ray`, nearest first.
///
/// Equal distances keep traversal order.
pub fn intersect_scene(ray: &Ray, scene: &SceneGraph) -> Vec<PickHit> {
    let mut hits: Vec<PickHit> = scene
        .traverse()
        .into_iter()
        .filter_map(|visit| {
            let mesh = visit.node.mesh.as_deref()?;
            let distance = ray.intersect_mesh(mesh, &visit.world)?;
            Some(PickHit {
                node: visit.id,
                name: visit.node.name.clone(),
                distance,
                point: ray.at(distance),
            })
        })
        .collect();

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Nearest node under `ndc` as seen from `camera`, if any
pub fn pick(ndc: Ndc, scene: &SceneGraph, camera: &Camera) -> Option<PickHit> {
    let ray = camera.ray_from_ndc(ndc)?;
    let hit = intersect_scene(&ray, scene).into_iter().next();
    trace!(?ndc, hit = ?hit.as_ref().map(PickHit::label), "pick");
    hit
}

/// Reaction invoked with the picked node
pub type PickCallback = Box<dyn FnMut(&PickHit)>;

/// Binds click (and optionally hover) reactions to a surface.
///
/// The picker owns its subscriptions and releases them when dropped or
/// disposed; a drop while the surface is mid-dispatch cannot release them
/// and logs a warning instead. It reads the scene and camera at event time
/// and never mutates them; the reaction runs after both borrows are
/// released, so it may edit the scene itself. Hover reactions fire on
/// every move that lands on a node; de-duplicating them is up to the caller.
pub struct Picker<S: Surface> {
    surface: Rc<RefCell<S>>,
    subscriptions: Vec<SubscriptionId>,
}

impl<S: Surface> Picker<S> {
    /// Subscribe the reactions to `surface`.
    ///
    /// Fails with [`Error::SurfaceBusy`] when called while the surface is
    /// borrowed, e.g. from inside one of its own pointer handlers.
    pub fn new(
        surface: Rc<RefCell<S>>,
        scene: Rc<RefCell<SceneGraph>>,
        camera: Rc<RefCell<Camera>>,
        on_click: impl FnMut(&PickHit) + 'static,
        on_hover: Option<PickCallback>,
    ) -> Result<Self> {
        let mut subscriptions = Vec::with_capacity(2);
        {
            let mut target = surface.try_borrow_mut().map_err(|_| Error::SurfaceBusy)?;
            let click = reaction(
                Rc::clone(&scene),
                Rc::clone(&camera),
                Box::new(on_click),
            );
            subscriptions.push(target.subscribe(PointerEventKind::Click, click));

            if let Some(on_hover) = on_hover {
                let hover = reaction(scene, camera, on_hover);
                subscriptions.push(target.subscribe(PointerEventKind::Move, hover));
            }
        }
        debug!(count = subscriptions.len(), "picker attached");

        Ok(Self {
            surface,
            subscriptions,
        })
    }

    /// Whether the picker reacts to pointer moves
    pub fn hovers(&self) -> bool {
        self.subscriptions.len() > 1
    }

    /// Release the surface subscriptions now instead of at drop
    pub fn dispose(self) {}
}

impl<S: Surface> Drop for Picker<S> {
    fn drop(&mut self) {
        let Ok(mut surface) = self.surface.try_borrow_mut() else {
            warn!("surface busy while dropping picker; subscriptions leaked");
            return;
        };
        for id in self.subscriptions.drain(..) {
            surface.unsubscribe(id);
        }
        debug!("picker detached");
    }
}

fn reaction(
    scene: Rc<RefCell<SceneGraph>>,
    camera: Rc<RefCell<Camera>>,
    mut callback: PickCallback,
) -> PointerHandler {
    Box::new(move |event, rect| {
        if rect.is_empty() {
            trace!(?rect, "ignoring pointer event on empty surface");
            return;
        }
        let ndc = compute_ndc(event.position, rect);

        let hit = match (scene.try_borrow(), camera.try_borrow()) {
            (Ok(scene), Ok(camera)) => pick(ndc, &scene, &camera),
            _ => {
                warn!(kind = ?event.kind, "scene or camera busy; pointer event dropped");
                return;
            }
        };

        if let Some(hit) = hit {
            debug!(node = %hit.node, name = hit.label(), distance = hit.distance, "picked");
            callback(&hit);
        }
    })
}
