/// The terminal grid as a pointer surface
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use orrery_core::surface::{PointerHandler, SubscriptionId, Subscriptions};
use orrery_core::{PointerEvent, PointerEventKind, Surface, SurfaceRect};

/// Surface measured in terminal cells, with the origin at the top-left cell
#[derive(Debug)]
pub struct TerminalSurface {
    columns: u16,
    rows: u16,
    subscriptions: Subscriptions,
}

impl TerminalSurface {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            subscriptions: Subscriptions::new(),
        }
    }

    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.columns = columns;
        self.rows = rows;
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Translate a crossterm mouse event and dispatch it.
    ///
    /// Cells are addressed by their centre so a click maps to the same
    /// point the rasterizer samples for that cell.
    pub fn handle_mouse(&mut self, event: MouseEvent) {
        let kind = match event.kind {
            MouseEventKind::Down(MouseButton::Left) => PointerEventKind::Click,
            MouseEventKind::Moved => PointerEventKind::Move,
            _ => return,
        };
        let x = f32::from(event.column) + 0.5;
        let y = f32::from(event.row) + 0.5;
        let pointer = match kind {
            PointerEventKind::Click => PointerEvent::click(x, y),
            PointerEventKind::Move => PointerEvent::moved(x, y),
        };
        self.dispatch(&pointer);
    }

    pub fn dispatch(&mut self, event: &PointerEvent) {
        let rect = self.rect();
        self.subscriptions.dispatch(event, &rect);
    }
}

impl Surface for TerminalSurface {
    fn rect(&self) -> SurfaceRect {
        SurfaceRect::sized(f32::from(self.columns), f32::from(self.rows))
    }

    fn subscribe(&mut self, kind: PointerEventKind, handler: PointerHandler) -> SubscriptionId {
        self.subscriptions.add(kind, handler)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use orrery_core::compute_ndc;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_left_click_maps_to_cell_centre() {
        let mut surface = TerminalSurface::new(80, 24);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        surface.subscribe(
            PointerEventKind::Click,
            Box::new(move |event, rect| log.borrow_mut().push(compute_ndc(event.position, rect))),
        );

        surface.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Right), 0, 0));
        surface.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 39, 11));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!((seen[0].x - (-0.5 / 40.0)).abs() < 1e-6);
        assert!((seen[0].y - (0.5 / 12.0)).abs() < 1e-6);
    }

    #[test]
    fn test_moves_reach_move_subscribers_only() {
        let mut surface = TerminalSurface::new(10, 10);
        let clicks = Rc::new(RefCell::new(0));
        let moves = Rc::new(RefCell::new(0));
        let (c, m) = (Rc::clone(&clicks), Rc::clone(&moves));
        surface.subscribe(PointerEventKind::Click, Box::new(move |_, _| *c.borrow_mut() += 1));
        let id = surface.subscribe(PointerEventKind::Move, Box::new(move |_, _| *m.borrow_mut() += 1));

        surface.handle_mouse(mouse(MouseEventKind::Moved, 1, 1));
        assert_eq!((*clicks.borrow(), *moves.borrow()), (0, 1));

        assert!(surface.unsubscribe(id));
        surface.handle_mouse(mouse(MouseEventKind::Moved, 1, 1));
        assert_eq!(*moves.borrow(), 1);
        assert_eq!(surface.subscription_count(), 1);
    }

    #[test]
    fn test_rect_follows_resize() {
        let mut surface = TerminalSurface::new(80, 24);
        surface.resize(120, 40);
        assert_eq!(surface.rect(), SurfaceRect::sized(120.0, 40.0));
    }
}
