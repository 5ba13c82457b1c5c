/// Display surfaces and pointer event subscriptions
use tracing::debug;

use crate::picking::PointerPosition;

/// Bounding rectangle of a display surface, in the coordinate space of
/// its pointer events
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle anchored at the coordinate origin
    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// A surface with no area cannot map pointers to NDC
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Click,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub position: PointerPosition,
}

impl PointerEvent {
    pub fn click(x: f32, y: f32) -> Self {
        Self {
            kind: PointerEventKind::Click,
            position: PointerPosition::new(x, y),
        }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            kind: PointerEventKind::Move,
            position: PointerPosition::new(x, y),
        }
    }
}

/// Token returned by [`Surface::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// For surfaces that keep their own handler tables
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Pointer handler; receives the surface rectangle at dispatch time
pub type PointerHandler = Box<dyn FnMut(&PointerEvent, &SurfaceRect)>;

/// Something that can be drawn on and clicked
pub trait Surface {
    /// Current bounding rectangle
    fn rect(&self) -> SurfaceRect;

    fn subscribe(&mut self, kind: PointerEventKind, handler: PointerHandler) -> SubscriptionId;

    /// Release a subscription; returns `false` if it was already gone
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// Handler registry for surfaces that dispatch their own events
#[derive(Default)]
pub struct Subscriptions {
    next_id: u64,
    handlers: Vec<(SubscriptionId, PointerEventKind, PointerHandler)>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: PointerEventKind, handler: PointerHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, kind, handler));
        debug!(?id, ?kind, "pointer subscription added");
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(existing, _, _)| *existing != id);
        let removed = self.handlers.len() != before;
        if removed {
            debug!(?id, "pointer subscription released");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run every handler subscribed to the event's kind, in subscription order
    pub fn dispatch(&mut self, event: &PointerEvent, rect: &SurfaceRect) {
        for (_, kind, handler) in &mut self.handlers {
            if *kind == event.kind {
                handler(event, rect);
            }
        }
    }
}

impl std::fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriptions")
            .field("next_id", &self.next_id)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
