use std::path::PathBuf;

use slidemotion::MotionTuning;

/// Shader knobs the slider reads every tick.
///
/// The renderer never owns these values: a [`BlendTweaks`] implementation
/// hands out a reference each frame and may change them at any time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendParams {
    /// Portion of a transition (0-1) over which the warp fades in.
    pub distortion_range: f32,
    /// Horizontal warp amplitude in UV units.
    pub distortion_strength: f32,
    /// Spatial frequency of the warp wave.
    pub distortion_frequency: f32,
    /// Cross-fade sharpness; 1.0 is a plain smoothstep.
    pub boundary_clarity: f32,
}

impl Default for BlendParams {
    fn default() -> Self {
        Self {
            distortion_range: 0.5,
            distortion_strength: 0.06,
            distortion_frequency: 8.0,
            boundary_clarity: 1.0,
        }
    }
}

/// Externally owned source of [`BlendParams`].
pub trait BlendTweaks {
    /// Gives the source a chance to pick up changes; called once per tick.
    fn refresh(&mut self) {}
    fn params(&self) -> &BlendParams;
}

/// Fixed parameters for runs without a tweak source.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticBlend(pub BlendParams);

impl BlendTweaks for StaticBlend {
    fn params(&self) -> &BlendParams {
        &self.0
    }
}

/// Output color handling for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Photos are sRGB-encoded; sample them as-is onto a non-sRGB swapchain.
    #[default]
    Auto,
    /// Treat textures as gamma-encoded; use non-sRGB surfaces.
    Gamma,
    /// Decode textures to linear and let an sRGB swapchain re-encode.
    Linear,
}

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Summary of the adapter wgpu picked, used for logging and throttling decisions.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub max_texture_dimension_2d: u32,
    pub max_texture_array_layers: u32,
}

impl AdapterProfile {
    pub fn from_wgpu(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            max_texture_dimension_2d: limits.max_texture_dimension_2d,
            max_texture_array_layers: limits.max_texture_array_layers,
        }
    }

    /// True for CPU rasterizers such as llvmpipe or WARP.
    pub fn is_software(&self) -> bool {
        matches!(self.device_type, wgpu::DeviceType::Cpu)
            || self.name.to_ascii_lowercase().contains("llvmpipe")
    }
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Initial window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Window title.
    pub title: String,
    /// Ordered image set; fixed for the lifetime of the window.
    pub images: Vec<PathBuf>,
    /// Image shown first.
    pub start_at: usize,
    /// Drag and settle behaviour.
    pub motion: MotionTuning,
    /// Optional FPS cap; None = render every vblank.
    pub target_fps: Option<f32>,
    /// Advance the clock by a fixed step per frame instead of wall time.
    pub fixed_step_ms: Option<f32>,
    /// Anti-aliasing mode requested by the caller.
    pub antialiasing: Antialiasing,
    /// Desired color handling for swapchain/textures.
    pub color_space: ColorSpaceMode,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            title: "slidewarp".to_string(),
            images: Vec::new(),
            start_at: 0,
            motion: MotionTuning::default(),
            target_fps: None,
            fixed_step_ms: None,
            antialiasing: Antialiasing::default(),
            color_space: ColorSpaceMode::default(),
        }
    }
}
