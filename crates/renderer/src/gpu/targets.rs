use crate::types::{PipelineError, ViewportDimensions};

/// Texel format of the simulation state field. Filterable float so the
/// nearest-sampled feedback loop and the composite pass can share bindings.
pub(crate) const STATE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// One-bit read/write role assignment over two fixed slots. Swapping is a
/// tag toggle, never a data copy.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PingPong {
    read_is_first: bool,
}

impl PingPong {
    pub fn new() -> Self {
        Self { read_is_first: true }
    }

    pub fn read_slot(&self) -> usize {
        if self.read_is_first {
            0
        } else {
            1
        }
    }

    pub fn write_slot(&self) -> usize {
        1 - self.read_slot()
    }

    pub fn swap(&mut self) {
        self.read_is_first = !self.read_is_first;
    }
}

struct SimulationTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl SimulationTarget {
    fn new(device: &wgpu::Device, dims: ViewportDimensions, slot: usize) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("simulation target #{slot}")),
            size: wgpu::Extent3d {
                width: dims.width,
                height: dims.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STATE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Owns the two off-screen state targets and their read/write tagging.
/// Exactly one slot is `read` and the other `write` at any instant; the
/// simulation program never samples the texture it is writing.
pub(crate) struct TargetPool {
    slots: [SimulationTarget; 2],
    ping: PingPong,
    dimensions: ViewportDimensions,
    sampler: wgpu::Sampler,
}

impl TargetPool {
    pub fn allocate(device: &wgpu::Device, dims: ViewportDimensions) -> Result<Self, PipelineError> {
        Self::validate(device, dims)?;
        // Nearest filtering preserves exact per-cell state across the
        // feedback loop.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("state sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Ok(Self {
            slots: [
                SimulationTarget::new(device, dims, 0),
                SimulationTarget::new(device, dims, 1),
            ],
            ping: PingPong::new(),
            dimensions: dims,
            sampler,
        })
    }

    /// Drops both targets and reallocates at the new size. Contents are not
    /// preserved: stale dimensions make old state meaningless, and wgpu
    /// zero-initialises fresh textures, so the frame-zero reseed is
    /// deterministic. The old textures are released once no submitted GPU
    /// work references them.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        dims: ViewportDimensions,
    ) -> Result<(), PipelineError> {
        Self::validate(device, dims)?;
        self.slots = [
            SimulationTarget::new(device, dims, 0),
            SimulationTarget::new(device, dims, 1),
        ];
        self.ping = PingPong::new();
        self.dimensions = dims;
        Ok(())
    }

    /// Exchanges the read/write roles in O(1).
    pub fn swap(&mut self) {
        self.ping.swap();
    }

    pub fn read_view(&self) -> &wgpu::TextureView {
        &self.slots[self.ping.read_slot()].view
    }

    pub fn write_view(&self) -> &wgpu::TextureView {
        &self.slots[self.ping.write_slot()].view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn dimensions(&self) -> ViewportDimensions {
        self.dimensions
    }

    fn validate(device: &wgpu::Device, dims: ViewportDimensions) -> Result<(), PipelineError> {
        if dims.is_empty() {
            return Err(PipelineError::allocation(dims, "dimensions must be non-zero"));
        }
        let max_dimension = device.limits().max_texture_dimension_2d;
        if dims.width > max_dimension || dims.height > max_dimension {
            return Err(PipelineError::allocation(
                dims,
                format!("exceeds device texture limit of {max_dimension}"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_start_distinct_and_stay_distinct_across_swaps() {
        let mut ping = PingPong::new();
        for _ in 0..5 {
            assert_ne!(ping.read_slot(), ping.write_slot());
            ping.swap();
        }
    }

    #[test]
    fn swap_promotes_the_written_slot_to_read() {
        let mut ping = PingPong::new();
        let wrote = ping.write_slot();
        ping.swap();
        assert_eq!(ping.read_slot(), wrote);

        let wrote = ping.write_slot();
        ping.swap();
        assert_eq!(ping.read_slot(), wrote);
    }

    #[test]
    fn two_swaps_restore_the_original_assignment() {
        let mut ping = PingPong::new();
        let initial = ping.read_slot();
        ping.swap();
        assert_ne!(ping.read_slot(), initial);
        ping.swap();
        assert_eq!(ping.read_slot(), initial);
    }
}
