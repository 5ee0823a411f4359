use std::borrow::Cow;

use crate::types::PipelineError;

use super::targets::STATE_FORMAT;

/// Uniform block and fullscreen-triangle vertex stage shared by both
/// programs. `uv` is texture-space (first texel row at v = 0) so feedback
/// reads land on the texel being rewritten; bottom-origin scene coordinates
/// are reconstructed in the fragment stages where needed.
const COMMON_WGSL: &str = r#"
struct Params {
    resolution: vec4<f32>,
    mouse: vec4<f32>,
    frame: i32,
};

@group(0) @binding(0) var<uniform> params: Params;

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VsOut {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -3.0),
        vec2<f32>(3.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let p = positions[index];
    var out: VsOut;
    out.position = vec4<f32>(p, 0.0, 1.0);
    out.uv = vec2<f32>(p.x * 0.5 + 0.5, 0.5 - p.y * 0.5);
    return out;
}
"#;

/// Wave-equation step over the previous state field. Height lives in the
/// red channel, velocity in green. Frame zero seeds a flat field into
/// freshly allocated targets; an active pointer injects a drop.
const SIMULATION_WGSL: &str = r#"
@group(1) @binding(0) var state_tex: texture_2d<f32>;
@group(1) @binding(1) var state_samp: sampler;

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    if (params.frame == 0) {
        return vec4<f32>(0.0, 0.0, 0.0, 1.0);
    }

    let res = params.resolution.xy;
    let texel = vec2<f32>(1.0, 1.0) / res;

    let center = textureSampleLevel(state_tex, state_samp, in.uv, 0.0);
    let left = textureSampleLevel(state_tex, state_samp, in.uv - vec2<f32>(texel.x, 0.0), 0.0);
    let right = textureSampleLevel(state_tex, state_samp, in.uv + vec2<f32>(texel.x, 0.0), 0.0);
    let above = textureSampleLevel(state_tex, state_samp, in.uv - vec2<f32>(0.0, texel.y), 0.0);
    let below = textureSampleLevel(state_tex, state_samp, in.uv + vec2<f32>(0.0, texel.y), 0.0);

    let laplacian = (left.r + right.r + above.r + below.r) * 0.25 - center.r;
    let velocity = (center.g + laplacian * 2.0) * 0.995;
    var height = center.r + velocity;

    if (params.mouse.z > 0.5) {
        let frag = vec2<f32>(in.uv.x, 1.0 - in.uv.y) * res;
        let d = distance(frag, params.mouse.xy);
        height += 0.8 * exp(-d * d / 48.0);
    }

    return vec4<f32>(height, velocity, 0.0, 1.0);
}
"#;

/// Refracts the background through the height-field gradient and adds a
/// small slope highlight. The background sampler wraps on both axes, so
/// tiling falls out of the offset lookup.
const COMPOSITE_WGSL: &str = r#"
@group(1) @binding(0) var state_tex: texture_2d<f32>;
@group(1) @binding(1) var state_samp: sampler;
@group(1) @binding(2) var background_tex: texture_2d<f32>;
@group(1) @binding(3) var background_samp: sampler;

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let res = params.resolution.xy;
    let texel = vec2<f32>(1.0, 1.0) / res;

    let center = textureSampleLevel(state_tex, state_samp, in.uv, 0.0).r;
    let dx = textureSampleLevel(state_tex, state_samp, in.uv + vec2<f32>(texel.x, 0.0), 0.0).r - center;
    let dy = textureSampleLevel(state_tex, state_samp, in.uv + vec2<f32>(0.0, texel.y), 0.0).r - center;

    let scene = vec2<f32>(in.uv.x, 1.0 - in.uv.y);
    let refracted = scene + vec2<f32>(dx, -dy) * 24.0;
    let bg = textureSampleLevel(background_tex, background_samp, refracted, 0.0);

    let sparkle = clamp((dy - dx) * 30.0, -0.2, 0.4);
    return vec4<f32>(bg.rgb + vec3<f32>(sparkle), 1.0);
}
"#;

/// Bind group layout shared by both passes (group 0).
pub(crate) struct PassLayouts {
    pub uniform_layout: wgpu::BindGroupLayout,
}

impl PassLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        Self { uniform_layout }
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

/// Catches validation failures raised while `build` runs, so a rejected
/// program surfaces as an error at start-up instead of a device panic.
fn checked<T>(
    device: &wgpu::Device,
    pass: &'static str,
    build: impl FnOnce() -> T,
) -> Result<T, PipelineError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = build();
    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        return Err(PipelineError::ProgramInvocation {
            pass,
            detail: error.to_string(),
        });
    }
    Ok(value)
}

/// The simulation step program: reads the previous state field, writes the
/// next one.
pub(crate) struct SimulationPass {
    pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
}

impl SimulationPass {
    pub fn new(device: &wgpu::Device, layouts: &PassLayouts) -> Result<Self, PipelineError> {
        checked(device, "simulation", || {
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("simulation shader"),
                source: wgpu::ShaderSource::Wgsl(Cow::Owned(
                    [COMMON_WGSL, SIMULATION_WGSL].concat(),
                )),
            });
            let texture_layout =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("simulation texture layout"),
                    entries: &[texture_entry(0), sampler_entry(1)],
                });
            let pipeline = build_pipeline(
                device,
                "simulation pipeline",
                &module,
                &layouts.uniform_layout,
                &texture_layout,
                STATE_FORMAT,
            );
            Self {
                pipeline,
                texture_layout,
            }
        })
    }

    pub fn bind(
        &self,
        device: &wgpu::Device,
        state_view: &wgpu::TextureView,
        state_sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("simulation bind group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(state_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(state_sampler),
                },
            ],
        })
    }

    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        uniform_bind_group: &wgpu::BindGroup,
        state_bind_group: &wgpu::BindGroup,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("simulation pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, uniform_bind_group, &[]);
        pass.set_bind_group(1, state_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

/// The composition program: samples the freshly produced state field
/// together with the background and writes the visible frame.
pub(crate) struct CompositePass {
    pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
}

impl CompositePass {
    pub fn new(
        device: &wgpu::Device,
        layouts: &PassLayouts,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, PipelineError> {
        checked(device, "composition", || {
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("composite shader"),
                source: wgpu::ShaderSource::Wgsl(Cow::Owned(
                    [COMMON_WGSL, COMPOSITE_WGSL].concat(),
                )),
            });
            let texture_layout =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("composite texture layout"),
                    entries: &[
                        texture_entry(0),
                        sampler_entry(1),
                        texture_entry(2),
                        sampler_entry(3),
                    ],
                });
            let pipeline = build_pipeline(
                device,
                "composite pipeline",
                &module,
                &layouts.uniform_layout,
                &texture_layout,
                surface_format,
            );
            Self {
                pipeline,
                texture_layout,
            }
        })
    }

    pub fn bind(
        &self,
        device: &wgpu::Device,
        state_view: &wgpu::TextureView,
        state_sampler: &wgpu::Sampler,
        background_view: &wgpu::TextureView,
        background_sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("composite bind group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(state_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(state_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(background_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(background_sampler),
                },
            ],
        })
    }

    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        uniform_bind_group: &wgpu::BindGroup,
        texture_bind_group: &wgpu::BindGroup,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("composite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, uniform_bind_group, &[]);
        pass.set_bind_group(1, texture_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    label: &str,
    module: &wgpu::ShaderModule,
    uniform_layout: &wgpu::BindGroupLayout,
    texture_layout: &wgpu::BindGroupLayout,
    target_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[uniform_layout, texture_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    })
}
