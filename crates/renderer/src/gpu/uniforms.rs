use bytemuck::{Pod, Zeroable};

use crate::types::{PointerSnapshot, ViewportDimensions};

/// Uniform block shared by the simulation and composition programs.
/// Layout mirrors the WGSL `Params` struct in `passes.rs`.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct RippleUniforms {
    /// width, height, pixel density, unused.
    pub resolution: [f32; 4],
    /// x, y (bottom-origin pixels), active flag, unused.
    pub mouse: [f32; 4],
    pub frame: i32,
    pub _padding: [f32; 3],
}

unsafe impl Zeroable for RippleUniforms {}
unsafe impl Pod for RippleUniforms {}

impl RippleUniforms {
    pub fn new(viewport: ViewportDimensions, pixel_density: f32) -> Self {
        Self {
            resolution: [
                viewport.width as f32,
                viewport.height as f32,
                pixel_density,
                0.0,
            ],
            mouse: [0.0; 4],
            frame: 0,
            _padding: [0.0; 3],
        }
    }

    pub fn set_resolution(&mut self, viewport: ViewportDimensions) {
        self.resolution[0] = viewport.width as f32;
        self.resolution[1] = viewport.height as f32;
    }

    pub fn set_pixel_density(&mut self, pixel_density: f32) {
        self.resolution[2] = pixel_density;
    }

    pub fn set_pointer(&mut self, pointer: PointerSnapshot) {
        self.mouse = [
            pointer.x,
            pointer.y,
            if pointer.active { 1.0 } else { 0.0 },
            0.0,
        ];
    }

    pub fn set_frame(&mut self, frame_index: u32) {
        self.frame = frame_index.min(i32::MAX as u32) as i32;
    }
}
