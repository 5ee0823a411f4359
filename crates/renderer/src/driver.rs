use crate::types::{PipelineError, PointerSnapshot, ViewportDimensions};

/// Inputs captured at the start of a tick. The simulation program sees this
/// exact snapshot even if host events arrive while the tick is in flight.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TickInputs {
    pub pointer: PointerSnapshot,
    pub frame_index: u32,
    pub viewport: ViewportDimensions,
}

/// Orchestration state for the simulation step loop: the monotonic frame
/// index and the resize coordination around it.
///
/// A resize request is never applied mid-tick. It is parked in
/// `pending_resize` and consumed at the next tick boundary via
/// [`TickState::take_pending_resize`], which also resets the frame index to
/// zero so the simulation program reseeds into the freshly allocated
/// targets.
#[derive(Debug)]
pub(crate) struct TickState {
    frame_index: u32,
    viewport: ViewportDimensions,
    pending_resize: Option<ViewportDimensions>,
}

impl TickState {
    pub fn new(viewport: ViewportDimensions) -> Result<Self, PipelineError> {
        if viewport.is_empty() {
            return Err(PipelineError::allocation(viewport, "viewport is empty"));
        }
        Ok(Self {
            frame_index: 0,
            viewport,
            pending_resize: None,
        })
    }

    /// Records a host resize for the next tick boundary. Empty dimensions
    /// are rejected here, before any target is touched.
    pub fn request_resize(&mut self, viewport: ViewportDimensions) -> Result<(), PipelineError> {
        if viewport.is_empty() {
            return Err(PipelineError::allocation(viewport, "viewport is empty"));
        }
        if viewport == self.viewport && self.pending_resize.is_none() {
            return Ok(());
        }
        self.pending_resize = Some(viewport);
        Ok(())
    }

    /// Consumes a parked resize, if any. Must be called before the tick
    /// reads the target pool; the caller reallocates the targets with the
    /// returned dimensions.
    pub fn take_pending_resize(&mut self) -> Option<ViewportDimensions> {
        let viewport = self.pending_resize.take()?;
        if viewport == self.viewport {
            return None;
        }
        self.viewport = viewport;
        self.frame_index = 0;
        Some(viewport)
    }

    /// Captures the immutable per-tick snapshot (step 1 of the tick).
    pub fn begin_tick(&self, pointer: PointerSnapshot) -> TickInputs {
        TickInputs {
            pointer,
            frame_index: self.frame_index,
            viewport: self.viewport,
        }
    }

    /// Marks the simulation step done; the caller has already swapped the
    /// target tags.
    pub fn complete_tick(&mut self) {
        self.frame_index = self.frame_index.saturating_add(1);
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    pub fn viewport(&self) -> ViewportDimensions {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::targets::PingPong;

    fn dims(width: u32, height: u32) -> ViewportDimensions {
        ViewportDimensions::new(width, height)
    }

    #[test]
    fn first_tick_runs_at_frame_zero_then_increments() {
        let mut ticks = TickState::new(dims(800, 600)).expect("tick state");
        assert!(ticks.take_pending_resize().is_none());

        let inputs = ticks.begin_tick(PointerSnapshot::default());
        assert_eq!(inputs.frame_index, 0);
        assert_eq!(inputs.viewport, dims(800, 600));
        ticks.complete_tick();

        assert_eq!(ticks.frame_index(), 1);
        assert_eq!(ticks.viewport(), dims(800, 600));
    }

    #[test]
    fn resize_applies_at_the_next_tick_boundary_and_resets_the_frame_index() {
        let mut ticks = TickState::new(dims(800, 600)).expect("tick state");
        ticks.begin_tick(PointerSnapshot::default());
        ticks.complete_tick();
        assert_eq!(ticks.frame_index(), 1);

        ticks.request_resize(dims(400, 300)).expect("resize accepted");
        // Still the old state until the boundary is crossed.
        assert_eq!(ticks.viewport(), dims(800, 600));

        assert_eq!(ticks.take_pending_resize(), Some(dims(400, 300)));
        assert_eq!(ticks.viewport(), dims(400, 300));
        assert_eq!(ticks.frame_index(), 0);

        let inputs = ticks.begin_tick(PointerSnapshot::default());
        assert_eq!(inputs.frame_index, 0);
        assert_eq!(inputs.viewport, dims(400, 300));
    }

    #[test]
    fn empty_resize_requests_are_rejected_without_touching_state() {
        let mut ticks = TickState::new(dims(800, 600)).expect("tick state");
        ticks.begin_tick(PointerSnapshot::default());
        ticks.complete_tick();

        assert!(ticks.request_resize(dims(0, 600)).is_err());
        assert!(ticks.request_resize(dims(800, 0)).is_err());
        assert!(ticks.take_pending_resize().is_none());
        assert_eq!(ticks.viewport(), dims(800, 600));
        assert_eq!(ticks.frame_index(), 1);
    }

    #[test]
    fn resize_to_the_current_size_is_a_no_op() {
        let mut ticks = TickState::new(dims(800, 600)).expect("tick state");
        ticks.request_resize(dims(800, 600)).expect("accepted");
        assert!(ticks.take_pending_resize().is_none());
        assert_eq!(ticks.frame_index(), 0);
    }

    #[test]
    fn only_the_latest_of_several_resize_requests_wins() {
        let mut ticks = TickState::new(dims(800, 600)).expect("tick state");
        ticks.request_resize(dims(1024, 768)).expect("accepted");
        ticks.request_resize(dims(400, 300)).expect("accepted");
        assert_eq!(ticks.take_pending_resize(), Some(dims(400, 300)));
    }

    #[test]
    fn ten_ticks_produce_ten_invocations_with_alternating_targets() {
        let mut ticks = TickState::new(dims(800, 600)).expect("tick state");
        let mut ping = PingPong::new();
        let mut invocations = 0u32;
        let mut read_history = Vec::new();

        for _ in 0..10 {
            assert!(ticks.take_pending_resize().is_none());
            let inputs = ticks.begin_tick(PointerSnapshot::default());
            assert_eq!(inputs.frame_index, invocations);

            // The step writes into the write slot, then roles flip.
            let wrote = ping.write_slot();
            invocations += 1;
            ping.swap();
            ticks.complete_tick();

            assert_eq!(ping.read_slot(), wrote);
            read_history.push(ping.read_slot());
        }

        assert_eq!(invocations, 10);
        assert_eq!(ticks.frame_index(), 10);
        for pair in read_history.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }
}
