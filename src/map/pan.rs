use crate::map::{Cursor, Point, ScrollPosition};

/// Scroll distance per pixel of pointer movement.
const DRAG_SPEED: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct DragStart {
    pointer: Point,
    scroll: ScrollPosition,
}

/// Drag-to-scroll over the floor plan.
///
/// Pointer positions are relative to the map container. Panning never
/// starts while a placement is pending; the click belongs to the placement.
#[derive(Debug, Clone)]
pub struct DragPan {
    drag: Option<DragStart>,
    /// Cursor while neither dragging nor placing
    resting: Cursor,
}

impl Default for DragPan {
    fn default() -> Self {
        Self {
            drag: None,
            resting: Cursor::Grab,
        }
    }
}

impl DragPan {
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Returns true when a drag started.
    pub fn mouse_down(
        &mut self,
        button: MouseButton,
        pointer: Point,
        scroll: ScrollPosition,
        placing: bool,
    ) -> bool {
        if button != MouseButton::Primary || placing {
            return false;
        }
        self.drag = Some(DragStart { pointer, scroll });
        true
    }

    /// New scroll position for a pointer move, if a drag is in progress.
    /// A move without the primary button held ends the drag.
    pub fn mouse_move(
        &mut self,
        primary_held: bool,
        pointer: Point,
        placing: bool,
    ) -> Option<ScrollPosition> {
        if placing {
            return None;
        }
        let start = self.drag?;
        if !primary_held {
            self.end_drag();
            return None;
        }
        let walk_x = (pointer.x - start.pointer.x) * DRAG_SPEED;
        let walk_y = (pointer.y - start.pointer.y) * DRAG_SPEED;
        Some(ScrollPosition::new(
            start.scroll.left - walk_x,
            start.scroll.top - walk_y,
        ))
    }

    pub fn mouse_up(&mut self) {
        self.end_drag();
    }

    /// Leaving placement mode resets the map to the plain arrow.
    pub fn placement_ended(&mut self) {
        self.resting = Cursor::Arrow;
    }

    pub fn cursor(&self, placing: bool) -> Cursor {
        if placing {
            Cursor::Crosshair
        } else if self.is_dragging() {
            Cursor::Grabbing
        } else {
            self.resting
        }
    }

    fn end_drag(&mut self) {
        if self.drag.take().is_some() {
            self.resting = Cursor::Grab;
        }
    }
}
