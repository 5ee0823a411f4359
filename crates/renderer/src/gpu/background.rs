use std::path::Path;

use image::imageops::flip_vertical_in_place;
use image::GenericImageView;
use wgpu::util::{DeviceExt, TextureDataOrder};

use crate::types::PipelineError;

/// The static backdrop the composition pass refracts through the ripple
/// field. Immutable once loaded; the sampler wraps on both axes.
pub(crate) struct BackgroundTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl BackgroundTexture {
    /// Loads the configured image, or substitutes a neutral placeholder when
    /// none is configured or decoding fails. A bad asset degrades the
    /// composite output but never stops the pipeline.
    pub fn load_or_placeholder(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: Option<&Path>,
    ) -> Self {
        match path {
            Some(path) => match Self::load(device, queue, path) {
                Ok(background) => background,
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %error,
                        "failed to load background image; using placeholder"
                    );
                    Self::placeholder(device, queue)
                }
            },
            None => Self::placeholder(device, queue),
        }
    }

    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> Result<Self, PipelineError> {
        let image = image::open(path).map_err(|source| PipelineError::AssetLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let (width, height) = image.dimensions();
        let mut rgba = image.to_rgba8();
        // Stored bottom-row-first to match the simulation's bottom-origin
        // scene coordinates.
        flip_vertical_in_place(&mut rgba);

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("background texture"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            &rgba,
        );
        tracing::debug!(path = %path.display(), width, height, "loaded background image");
        Ok(Self::from_texture(device, texture))
    }

    fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let data = [90u8, 110, 130, 255];
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("placeholder background texture"),
                size: wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            &data,
        );
        Self::from_texture(device, texture)
    }

    fn from_texture(device: &wgpu::Device, texture: wgpu::Texture) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("background sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            _texture: texture,
            view,
            sampler,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}
