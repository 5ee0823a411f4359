use crate::types::{PointerSnapshot, ViewportDimensions};

/// Last-write-wins store for pointer and viewport state delivered by host
/// events. The tick loop reads one immutable snapshot per frame; both sides
/// run on the same thread, so no synchronisation is needed here.
///
/// Pointer coordinates arrive in host screen space (y from the top) and are
/// flipped to the simulation's bottom-origin convention at capture time.
#[derive(Debug)]
pub struct InputChannel {
    pointer: PointerSnapshot,
    viewport: ViewportDimensions,
}

impl InputChannel {
    pub fn new(viewport: ViewportDimensions) -> Self {
        Self {
            pointer: PointerSnapshot::default(),
            viewport,
        }
    }

    /// Records a pointer move at host coordinates (top-origin pixels).
    pub fn pointer_moved(&mut self, host_x: f64, host_y: f64) {
        self.pointer.x = host_x as f32;
        self.pointer.y = self.viewport.height as f32 - host_y as f32;
    }

    pub fn pointer_pressed(&mut self) {
        self.pointer.active = true;
    }

    pub fn pointer_released(&mut self) {
        self.pointer.active = false;
    }

    /// Records a new viewport size. Does not reinterpret the stored pointer
    /// position; the next move event refreshes it against the new height.
    pub fn viewport_resized(&mut self, viewport: ViewportDimensions) {
        self.viewport = viewport;
    }

    pub fn snapshot(&self) -> PointerSnapshot {
        self.pointer
    }

    pub fn viewport(&self) -> ViewportDimensions {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_moves_are_flipped_to_bottom_origin() {
        let mut input = InputChannel::new(ViewportDimensions::new(800, 600));
        input.pointer_moved(100.0, 50.0);
        input.pointer_pressed();

        let snapshot = input.snapshot();
        assert_eq!(snapshot.x, 100.0);
        assert_eq!(snapshot.y, 550.0);
        assert!(snapshot.active);
    }

    #[test]
    fn pointer_release_keeps_last_position() {
        let mut input = InputChannel::new(ViewportDimensions::new(800, 600));
        input.pointer_moved(320.0, 240.0);
        input.pointer_pressed();
        input.pointer_released();

        let snapshot = input.snapshot();
        assert!(!snapshot.active);
        assert_eq!(snapshot.x, 320.0);
        assert_eq!(snapshot.y, 360.0);
    }

    #[test]
    fn later_events_overwrite_earlier_ones() {
        let mut input = InputChannel::new(ViewportDimensions::new(400, 300));
        input.pointer_moved(10.0, 10.0);
        input.pointer_moved(20.0, 30.0);

        let snapshot = input.snapshot();
        assert_eq!(snapshot.x, 20.0);
        assert_eq!(snapshot.y, 270.0);
    }

    #[test]
    fn resize_updates_the_flip_height_for_subsequent_moves() {
        let mut input = InputChannel::new(ViewportDimensions::new(800, 600));
        input.viewport_resized(ViewportDimensions::new(400, 300));
        input.pointer_moved(50.0, 50.0);

        assert_eq!(input.viewport(), ViewportDimensions::new(400, 300));
        assert_eq!(input.snapshot().y, 250.0);
    }
}
