/// A canvas element as a pointer surface
use orrery_core::surface::{PointerHandler, SubscriptionId};
use orrery_core::{PointerEvent, PointerEventKind, Surface, SurfaceRect};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, MouseEvent};

/// DOM event name for a pointer event kind
pub fn event_name(kind: PointerEventKind) -> &'static str {
    match kind {
        PointerEventKind::Click => "click",
        PointerEventKind::Move => "mousemove",
    }
}

struct Listener {
    id: SubscriptionId,
    event: &'static str,
    closure: Closure<dyn FnMut(MouseEvent)>,
}

/// Surface backed by a canvas; pointer positions are client coordinates
/// and the rectangle is the canvas's bounding client rect.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    listeners: Vec<Listener>,
    next_id: u64,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self {
            canvas,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn detach(&self, listener: &Listener) {
        let callback = listener.closure.as_ref().unchecked_ref();
        if let Err(error) = self
            .canvas
            .remove_event_listener_with_callback(listener.event, callback)
        {
            warn!(?error, event = listener.event, "failed to remove listener");
        }
    }
}

fn client_rect(canvas: &HtmlCanvasElement) -> SurfaceRect {
    let rect = canvas.get_bounding_client_rect();
    SurfaceRect::new(
        rect.left() as f32,
        rect.top() as f32,
        rect.width() as f32,
        rect.height() as f32,
    )
}

impl Surface for CanvasSurface {
    fn rect(&self) -> SurfaceRect {
        client_rect(&self.canvas)
    }

    fn subscribe(&mut self, kind: PointerEventKind, mut handler: PointerHandler) -> SubscriptionId {
        let id = SubscriptionId::from_raw(self.next_id);
        self.next_id += 1;

        let canvas = self.canvas.clone();
        let closure = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let (x, y) = (event.client_x() as f32, event.client_y() as f32);
            let pointer = match kind {
                PointerEventKind::Click => PointerEvent::click(x, y),
                PointerEventKind::Move => PointerEvent::moved(x, y),
            };
            handler(&pointer, &client_rect(&canvas));
        });

        let event = event_name(kind);
        if let Err(error) = self
            .canvas
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        {
            warn!(?error, event, "failed to add listener");
        }
        debug!(?id, event, "canvas listener added");
        self.listeners.push(Listener { id, event, closure });
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(index) = self.listeners.iter().position(|l| l.id == id) else {
            return false;
        };
        let listener = self.listeners.swap_remove(index);
        self.detach(&listener);
        debug!(?id, event = listener.event, "canvas listener removed");
        true
    }
}

impl Drop for CanvasSurface {
    fn drop(&mut self) {
        for listener in &self.listeners {
            self.detach(listener);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(event_name(PointerEventKind::Click), "click");
        assert_eq!(event_name(PointerEventKind::Move), "mousemove");
    }
}
