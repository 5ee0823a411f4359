mod background;
mod context;
mod passes;
pub(crate) mod state;
pub(crate) mod targets;
mod uniforms;

pub(crate) use state::RippleState;
