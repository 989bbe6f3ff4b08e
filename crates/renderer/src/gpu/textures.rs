use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use wgpu::util::{DeviceExt, TextureDataOrder};

use super::context::SurfaceColorSpace;

const PLACEHOLDER_PIXEL: Rgba<u8> = Rgba([48, 48, 52, 255]);
const PLACEHOLDER_SIZE: (u32, u32) = (16, 9);

/// Decoded slides, all resized to a common layer size.
#[derive(Debug, Clone)]
pub(crate) struct SlideLayers {
    pub width: u32,
    pub height: u32,
    pub layers: Vec<RgbaImage>,
}

impl SlideLayers {
    /// Decodes `paths` in order. The first image that loads fixes the layer
    /// size; images that fail to load become flat placeholder layers.
    pub(crate) fn load(paths: &[PathBuf], max_dimension: u32) -> Self {
        let decoded: Vec<Option<RgbaImage>> = paths
            .iter()
            .enumerate()
            .map(|(index, path)| match decode(path) {
                Ok(image) => Some(image),
                Err(error) => {
                    tracing::warn!(
                        slide = index,
                        path = %path.display(),
                        error = %format!("{error:#}"),
                        "failed to load slide; using placeholder"
                    );
                    None
                }
            })
            .collect();

        let (width, height) = decoded
            .iter()
            .flatten()
            .next()
            .map(|image| image.dimensions())
            .unwrap_or(PLACEHOLDER_SIZE);
        let (width, height) = fit_within(width, height, max_dimension);

        let layers = decoded
            .into_iter()
            .map(|slot| match slot {
                Some(image) if image.dimensions() == (width, height) => image,
                Some(image) => imageops::resize(&image, width, height, FilterType::Triangle),
                None => RgbaImage::from_pixel(width, height, PLACEHOLDER_PIXEL),
            })
            .collect();

        Self {
            width,
            height,
            layers,
        }
    }

    pub(crate) fn bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.layers.len() * (self.width * self.height * 4) as usize);
        for layer in &self.layers {
            data.extend_from_slice(layer.as_raw());
        }
        data
    }
}

fn decode(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path)
        .with_context(|| format!("failed to open slide image at {}", path.display()))?;
    Ok(image.to_rgba8())
}

/// Shrinks `(width, height)` so neither side exceeds `max_dimension`, keeping aspect.
fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let width = width.max(1);
    let height = height.max(1);
    let max_dimension = max_dimension.max(1);
    let longest = width.max(height);
    if longest <= max_dimension {
        return (width, height);
    }
    let ratio = max_dimension as f64 / longest as f64;
    (
        ((width as f64 * ratio).round() as u32).clamp(1, max_dimension),
        ((height as f64 * ratio).round() as u32).clamp(1, max_dimension),
    )
}

pub(crate) struct SlideTextures {
    pub _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub layer_count: u32,
}

pub(crate) fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    slides: &SlideLayers,
    color_space: SurfaceColorSpace,
) -> Result<SlideTextures> {
    let layer_count = u32::try_from(slides.layers.len()).context("too many slide layers")?;
    let texture_format = match color_space {
        SurfaceColorSpace::Gamma => wgpu::TextureFormat::Rgba8Unorm,
        SurfaceColorSpace::Linear => wgpu::TextureFormat::Rgba8UnormSrgb,
    };
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("slide texture array"),
            size: wgpu::Extent3d {
                width: slides.width,
                height: slides.height,
                depth_or_array_layers: layer_count,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: texture_format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        TextureDataOrder::LayerMajor,
        &slides.bytes(),
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("slide texture array view"),
        dimension: Some(wgpu::TextureViewDimension::D2Array),
        array_layer_count: Some(layer_count),
        ..Default::default()
    });
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("slide sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });

    tracing::debug!(
        width = slides.width,
        height = slides.height,
        layers = layer_count,
        ?texture_format,
        "uploaded slide textures"
    );

    Ok(SlideTextures {
        _texture: texture,
        view,
        sampler,
        layer_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32, value: u8) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(width, height, Rgba([value, value, value, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn layers_take_size_of_first_image() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_png(dir.path(), "a.png", 8, 4, 10);
        let second = write_png(dir.path(), "b.png", 4, 4, 200);
        let slides = SlideLayers::load(&[first, second], 4096);

        assert_eq!((slides.width, slides.height), (8, 4));
        assert_eq!(slides.layers.len(), 2);
        assert!(slides.layers.iter().all(|layer| layer.dimensions() == (8, 4)));
        assert_eq!(slides.bytes().len(), 2 * 8 * 4 * 4);
    }

    #[test]
    fn missing_image_becomes_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(dir.path(), "good.png", 6, 3, 90);
        let missing = dir.path().join("missing.png");
        let slides = SlideLayers::load(&[missing, good], 4096);

        assert_eq!(slides.layers.len(), 2);
        assert_eq!((slides.width, slides.height), (6, 3));
        assert_eq!(*slides.layers[0].get_pixel(0, 0), PLACEHOLDER_PIXEL);
        assert_eq!(slides.layers[1].get_pixel(0, 0).0[0], 90);
    }

    #[test]
    fn all_missing_still_yields_layers() {
        let slides = SlideLayers::load(&[PathBuf::from("/nonexistent/slide.png")], 4096);
        assert_eq!((slides.width, slides.height), PLACEHOLDER_SIZE);
        assert_eq!(slides.layers.len(), 1);
    }

    #[test]
    fn oversized_images_are_capped() {
        assert_eq!(fit_within(8000, 4000, 4096), (4096, 2048));
        assert_eq!(fit_within(100, 50, 4096), (100, 50));
        assert_eq!(fit_within(0, 0, 4096), (1, 1));
    }
}
