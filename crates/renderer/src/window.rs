use std::sync::Arc;

use anyhow::{anyhow, Result};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use tracing::{error, warn};

use crate::gpu::RippleState;
use crate::input::InputChannel;
use crate::types::{RendererConfig, ViewportDimensions};

/// Opens a window and drives the simulation pipeline at the display's
/// refresh rate. Events and ticks share this thread: pointer and resize
/// handlers only overwrite the input channel, and each redraw consumes one
/// snapshot, so no event can tear a tick.
pub fn run(config: RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let (width, height) = config.surface_size;
    let window = WindowBuilder::new()
        .with_title("waterwall")
        .with_inner_size(PhysicalSize::new(width, height))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let size = window.inner_size();
    let mut input = InputChannel::new(ViewportDimensions::new(size.width, size.height));
    let mut state = RippleState::new(window.as_ref(), size, window.scale_factor(), &config)?;

    tracing::info!(width = size.width, height = size.height, "pipeline initialised");

    // The window is moved into the closure so it outlives the GPU surface
    // created from its raw handles.
    let run_result = event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    elwt.exit();
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input.pointer_moved(position.x, position.y);
                }
                WindowEvent::MouseInput {
                    state: button_state,
                    button: MouseButton::Left,
                    ..
                } => match button_state {
                    ElementState::Pressed => input.pointer_pressed(),
                    ElementState::Released => input.pointer_released(),
                },
                WindowEvent::Resized(new_size) => {
                    input.viewport_resized(ViewportDimensions::new(
                        new_size.width,
                        new_size.height,
                    ));
                    if let Err(err) = state.request_resize(new_size) {
                        // Minimised windows report zero dimensions; keep the
                        // current targets and wait for a usable size.
                        warn!(error = %err, "ignoring resize request");
                    }
                }
                WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                    state.set_pixel_density(scale_factor);
                }
                WindowEvent::RedrawRequested => match state.render(input.snapshot()) {
                    Ok(()) => {}
                    Err(err) => {
                        if let Some(surface_err) = err.as_surface_error() {
                            match surface_err {
                                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                                    state.reconfigure_surface();
                                }
                                wgpu::SurfaceError::OutOfMemory => {
                                    error!("surface out of memory; exiting");
                                    elwt.exit();
                                }
                                wgpu::SurfaceError::Timeout => {
                                    warn!("surface timeout; retrying next frame");
                                }
                                other => {
                                    warn!("surface error: {other:?}; retrying next frame");
                                }
                            }
                        } else {
                            // Target reallocation or program failure:
                            // halting beats rendering against stale buffers.
                            error!(error = %err, "pipeline failure");
                            elwt.exit();
                        }
                    }
                },
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
                elwt.set_control_flow(ControlFlow::Poll);
            }
            _ => {}
        }
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}
