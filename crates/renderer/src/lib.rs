//! Renderer crate for slidewarp.
//!
//! Glues the winit window, the `wgpu` pipeline and the slider's progress
//! controller together:
//!
//! ```text
//!   slidewarp CLI
//!          │ RendererConfig + BlendTweaks
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!                         │                                      │
//!             pointer/touch/keys ──▶ ProgressController::advance ─┴─▶ BlendSurface ─▶ GPU UBO
//! ```
//!
//! `WindowState` owns the GPU resources and the slider; `Renderer` is the thin
//! entry point that validates the configuration and starts the loop.

mod compile;
pub mod gpu;
pub mod runtime;
mod types;
mod window;

use anyhow::{bail, Result};

pub use gpu::BlendSurface;
pub use runtime::{
    BoxedTimeSource, FixedStepTimeSource, FrameScheduler, SystemTimeSource, TimeSample,
    TimeSource, Viewport,
};
pub use types::{
    AdapterProfile, Antialiasing, BlendParams, BlendTweaks, ColorSpaceMode, RendererConfig,
    StaticBlend,
};

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
    tweaks: Box<dyn BlendTweaks>,
}

impl Renderer {
    /// Builds a renderer with fixed default blend parameters.
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            tweaks: Box::new(StaticBlend::default()),
        }
    }

    /// Replaces the blend parameter source read every tick.
    pub fn with_tweaks(mut self, tweaks: Box<dyn BlendTweaks>) -> Self {
        self.tweaks = tweaks;
        self
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Opens the slider window and blocks until it is closed.
    pub fn run(self) -> Result<()> {
        if self.config.images.is_empty() {
            bail!("no images to show");
        }
        window::run_window(self.config, self.tweaks)
    }
}
