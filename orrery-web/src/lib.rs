//! Orrery Web - canvas front end compiled to WASM
//!
//! Draws a demo scene onto a 2D canvas and reports picked nodes back to
//! JavaScript through a callback.

pub mod renderer;
pub mod surface;

use std::cell::RefCell;
use std::rc::Rc;

use orrery_core::{
    compute_ndc, pick, Camera, Demo, DemoKind, DirectionalLight, OrreryConfig, PickHit, Picker,
    PointerPosition, SceneGraph, Surface,
};
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub use renderer::{collect_faces, needs_resize, CanvasRenderer, Face};
pub use surface::CanvasSurface;

/// Longest step fed to the animation, so a backgrounded tab doesn't jump
const MAX_FRAME_SECONDS: f32 = 0.1;

fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn canvas_by_id(canvas_id: &str) -> Result<HtmlCanvasElement, JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| js_error("no document available"))?;
    document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| js_error(format!("no element with id '{canvas_id}'")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error(format!("'{canvas_id}' is not a canvas")))
}

/// Invoke a JS callback with the picked node's label
fn notify(callback: &js_sys::Function, hit: &PickHit) {
    if let Err(error) = callback.call1(&JsValue::NULL, &JsValue::from_str(hit.label())) {
        warn!(?error, "pick callback threw");
    }
}

#[wasm_bindgen]
pub struct WebOrrery {
    kind: DemoKind,
    scene: Rc<RefCell<SceneGraph>>,
    camera: Rc<RefCell<Camera>>,
    light: DirectionalLight,
    surface: Rc<RefCell<CanvasSurface>>,
    renderer: CanvasRenderer,
    picker: Option<Picker<CanvasSurface>>,
    last_time_ms: Option<f64>,
}

#[wasm_bindgen]
impl WebOrrery {
    /// Build the named demo (`"boxes"` or `"solar"`) on the canvas with `canvas_id`
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, demo: &str) -> Result<WebOrrery, JsValue> {
        let kind =
            DemoKind::from_name(demo).ok_or_else(|| js_error(format!("unknown demo '{demo}'")))?;
        let canvas = canvas_by_id(canvas_id)?;
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| js_error("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| js_error("unexpected context type"))?;

        let hues = [0; 3].map(|_| js_sys::Math::random() as f32);
        let Demo {
            scene,
            camera,
            light,
            ..
        } = Demo::build(kind, &OrreryConfig::default(), hues).map_err(js_error)?;

        let mut app = WebOrrery {
            kind,
            scene: Rc::new(RefCell::new(scene)),
            camera: Rc::new(RefCell::new(camera)),
            light,
            surface: Rc::new(RefCell::new(CanvasSurface::new(canvas))),
            renderer: CanvasRenderer::new(context),
            picker: None,
            last_time_ms: None,
        };
        app.resize_to_display();
        info!(demo = kind.name(), "web orrery ready");
        Ok(app)
    }

    #[wasm_bindgen(getter)]
    pub fn demo(&self) -> String {
        self.kind.name().to_string()
    }

    #[wasm_bindgen(getter = nodeCount)]
    pub fn node_count(&self) -> usize {
        self.scene.borrow().len()
    }

    /// One animation frame; pass the `requestAnimationFrame` timestamp
    pub fn frame(&mut self, time_ms: f64) {
        let dt = self
            .last_time_ms
            .map(|last| ((time_ms - last) / 1000.0) as f32)
            .unwrap_or(0.0)
            .clamp(0.0, MAX_FRAME_SECONDS);
        self.last_time_ms = Some(time_ms);

        self.advance(dt);
        self.resize_to_display();
        self.render();
    }

    /// Advance every spinning node by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.scene.borrow_mut().advance(dt);
    }

    /// Match the drawing buffer to the canvas's displayed size; returns
    /// whether it changed
    #[wasm_bindgen(js_name = resizeToDisplay)]
    pub fn resize_to_display(&mut self) -> bool {
        let surface = self.surface.borrow();
        let canvas = surface.canvas();
        let (width, height) = (canvas.client_width() as u32, canvas.client_height() as u32);
        if !needs_resize((canvas.width(), canvas.height()), (width, height)) {
            return false;
        }
        canvas.set_width(width);
        canvas.set_height(height);
        self.camera
            .borrow_mut()
            .set_aspect(width as f32, height as f32);
        debug!(width, height, "canvas resized");
        true
    }

    pub fn render(&self) {
        let surface = self.surface.borrow();
        let canvas = surface.canvas();
        self.renderer.render(
            &self.scene.borrow(),
            &self.camera.borrow(),
            &self.light,
            canvas.width(),
            canvas.height(),
        );
    }

    /// Report clicked nodes (and, when given, hovered nodes) by name.
    ///
    /// Replaces any earlier callbacks.
    #[wasm_bindgen(js_name = onPick)]
    pub fn on_pick(
        &mut self,
        on_click: js_sys::Function,
        on_hover: Option<js_sys::Function>,
    ) -> Result<(), JsValue> {
        self.detach_picker();
        let on_hover = on_hover.map(|callback| {
            Box::new(move |hit: &PickHit| notify(&callback, hit)) as Box<dyn FnMut(&PickHit)>
        });
        let picker = Picker::new(
            Rc::clone(&self.surface),
            Rc::clone(&self.scene),
            Rc::clone(&self.camera),
            move |hit: &PickHit| notify(&on_click, hit),
            on_hover,
        )
        .map_err(js_error)?;
        self.picker = Some(picker);
        Ok(())
    }

    /// Release the pick callbacks; returns whether any were attached
    #[wasm_bindgen(js_name = detachPicker)]
    pub fn detach_picker(&mut self) -> bool {
        self.picker.take().map(Picker::dispose).is_some()
    }

    /// Name of the node under a client-space point, if any
    #[wasm_bindgen(js_name = pickAt)]
    pub fn pick_at(&self, client_x: f32, client_y: f32) -> Option<String> {
        let rect = self.surface.borrow().rect();
        if rect.is_empty() {
            return None;
        }
        let ndc = compute_ndc(PointerPosition::new(client_x, client_y), &rect);
        pick(ndc, &self.scene.borrow(), &self.camera.borrow()).map(|hit| hit.label().to_string())
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // tracing events are forwarded to `log` when no subscriber is installed
    if console_log::init_with_level(log::Level::Debug).is_err() {
        warn!("console logger already installed");
    }
}
