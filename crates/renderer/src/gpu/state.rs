use std::fmt;

use anyhow::Result;
use winit::dpi::PhysicalSize;

use crate::driver::TickState;
use crate::types::{PipelineError, PointerSnapshot, RendererConfig, ViewportDimensions};

use super::background::BackgroundTexture;
use super::context::GpuContext;
use super::passes::{CompositePass, PassLayouts, SimulationPass};
use super::targets::TargetPool;
use super::uniforms::RippleUniforms;

/// Failures surfaced by a tick. Surface errors are usually recoverable by
/// reconfiguring; fatal errors halt the pipeline rather than letting it
/// render against mismatched buffers.
#[derive(Debug)]
pub(crate) enum RenderError {
    Surface(wgpu::SurfaceError),
    Fatal(PipelineError),
}

impl RenderError {
    pub fn as_surface_error(&self) -> Option<&wgpu::SurfaceError> {
        match self {
            RenderError::Surface(err) => Some(err),
            RenderError::Fatal(_) => None,
        }
    }
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(value: wgpu::SurfaceError) -> Self {
        RenderError::Surface(value)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Surface(err) => write!(f, "surface error: {err:?}"),
            RenderError::Fatal(err) => write!(f, "pipeline error: {err}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// All GPU state for one viewport: context, the ping-pong target pool, both
/// programs, and the tick orchestration around them.
pub(crate) struct RippleState {
    context: GpuContext,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: RippleUniforms,
    targets: TargetPool,
    simulation: SimulationPass,
    composite: CompositePass,
    background: BackgroundTexture,
    ticks: TickState,
}

impl RippleState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        pixel_density: f64,
        config: &RendererConfig,
    ) -> Result<Self>
    where
        T: raw_window_handle::HasDisplayHandle + raw_window_handle::HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size)?;
        let viewport = ViewportDimensions::new(context.size.width, context.size.height);

        let layouts = PassLayouts::new(&context.device);
        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform buffer"),
            size: std::mem::size_of::<RippleUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &layouts.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let simulation = SimulationPass::new(&context.device, &layouts)?;
        let composite = CompositePass::new(&context.device, &layouts, context.surface_format)?;
        let targets = TargetPool::allocate(&context.device, viewport)?;
        let background = BackgroundTexture::load_or_placeholder(
            &context.device,
            &context.queue,
            config.background.as_deref(),
        );

        let uniforms = RippleUniforms::new(viewport, pixel_density as f32);
        let ticks = TickState::new(viewport)?;

        Ok(Self {
            context,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            targets,
            simulation,
            composite,
            background,
            ticks,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    /// Parks a host resize for the next tick boundary. Empty dimensions are
    /// rejected here, leaving the current targets untouched.
    pub(crate) fn request_resize(&mut self, new_size: PhysicalSize<u32>) -> Result<(), PipelineError> {
        self.ticks
            .request_resize(ViewportDimensions::new(new_size.width, new_size.height))
    }

    pub(crate) fn set_pixel_density(&mut self, pixel_density: f64) {
        self.uniforms.set_pixel_density(pixel_density as f32);
    }

    pub(crate) fn reconfigure_surface(&mut self) {
        self.context.reconfigure();
    }

    /// Runs one tick: apply any parked resize, step the simulation from the
    /// read target into the write target, swap roles, then composite the
    /// fresh state over the background into the surface frame.
    pub(crate) fn render(&mut self, pointer: PointerSnapshot) -> Result<(), RenderError> {
        if let Some(viewport) = self.ticks.take_pending_resize() {
            self.context
                .resize(PhysicalSize::new(viewport.width, viewport.height));
            self.targets
                .resize(&self.context.device, viewport)
                .map_err(RenderError::Fatal)?;
            tracing::debug!(
                width = viewport.width,
                height = viewport.height,
                "reallocated simulation targets"
            );
        }

        let frame = self.context.surface.get_current_texture()?;
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // One immutable snapshot per tick; events arriving from here on are
        // seen by the next tick.
        let inputs = self.ticks.begin_tick(pointer);
        self.uniforms.set_resolution(inputs.viewport);
        self.uniforms.set_pointer(inputs.pointer);
        self.uniforms.set_frame(inputs.frame_index);
        self.context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("tick encoder"),
                });

        let state_bind = self.simulation.bind(
            &self.context.device,
            self.targets.read_view(),
            self.targets.sampler(),
        );
        self.simulation.encode(
            &mut encoder,
            self.targets.write_view(),
            &self.uniform_bind_group,
            &state_bind,
        );

        // The just-written target becomes `read`; the composite below and
        // the next step both sample it.
        self.targets.swap();
        self.ticks.complete_tick();

        let composite_bind = self.composite.bind(
            &self.context.device,
            self.targets.read_view(),
            self.targets.sampler(),
            self.background.view(),
            self.background.sampler(),
        );
        self.composite.encode(
            &mut encoder,
            &surface_view,
            &self.uniform_bind_group,
            &composite_bind,
        );

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
