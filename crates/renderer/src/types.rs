use std::path::PathBuf;

use thiserror::Error;

/// Viewport size in physical pixels. A change in either value is the sole
/// trigger for the resize path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewportDimensions {
    pub width: u32,
    pub height: u32,
}

impl ViewportDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Empty viewports cannot back a render target.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Latest observed pointer state, in the simulation's coordinate space:
/// x from the left, y from the bottom, both in physical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSnapshot {
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

/// Everything the host needs to hand over before the pipeline starts.
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Initial surface size in physical pixels.
    pub surface_size: (u32, u32),
    /// Background image composited under the ripple field. `None` (or a
    /// file that fails to decode) falls back to a neutral placeholder.
    pub background: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot allocate {width}x{height} simulation targets: {reason}")]
    ResourceAllocation {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("failed to load background image at {path}")]
    AssetLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{pass} program rejected by the GPU: {detail}")]
    ProgramInvocation { pass: &'static str, detail: String },
}

impl PipelineError {
    pub(crate) fn allocation(dims: ViewportDimensions, reason: impl Into<String>) -> Self {
        Self::ResourceAllocation {
            width: dims.width,
            height: dims.height,
            reason: reason.into(),
        }
    }
}
