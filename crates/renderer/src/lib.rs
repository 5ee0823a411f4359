//! Feedback simulation pipeline for the waterwall ripple effect.
//!
//! A 2D state field evolves on the GPU under a wave-equation step, perturbed
//! by pointer input, and is composited over a background image every frame.
//! The core of the crate is the ping-pong buffer protocol around that loop:
//!
//! ```text
//!   host events ──▶ InputChannel ──snapshot──▶ tick
//!                                               │
//!                   ┌── read target ──▶ simulation program ──▶ write target
//!                   │                                               │
//!                   └────────────────── swap ◀─────────────────────┘
//!                                               │
//!                          composite (state + background) ──▶ surface
//! ```
//!
//! Each tick the simulation program reads the previous frame's entire state
//! from one target and writes the next into the other; the roles then swap.
//! Resizes reallocate both targets at the new size and reset the frame index
//! to zero, which tells the simulation program to reseed. Everything runs on
//! a single thread, one tick per displayed frame.

mod driver;
mod gpu;
mod input;
mod types;
mod window;

pub use input::InputChannel;
pub use types::{PipelineError, PointerSnapshot, RendererConfig, ViewportDimensions};
pub use window::run;
