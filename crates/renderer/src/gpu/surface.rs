//! CPU-side state of the rendered slide plane.
//!
//! [`BlendSurface`] owns the uniform block and tracks whether it changed since
//! the last upload. The GPU state flushes it once per frame.

use slidemotion::ProgressSink;

use super::uniforms::SliderUniforms;
use crate::runtime::Viewport;
use crate::types::BlendParams;

#[derive(Debug, Clone)]
pub struct BlendSurface {
    uniforms: SliderUniforms,
    dirty: bool,
}

impl BlendSurface {
    pub fn new(image_count: usize, viewport: &Viewport) -> Self {
        let mut surface = Self {
            uniforms: SliderUniforms::new(image_count),
            dirty: true,
        };
        surface.resize(viewport);
        surface
    }

    pub fn uniforms(&self) -> &SliderUniforms {
        &self.uniforms
    }

    pub fn image_count(&self) -> usize {
        self.uniforms.image_count.max(0) as usize
    }

    pub fn progress(&self) -> f32 {
        self.uniforms.progress
    }

    pub fn scale(&self) -> f32 {
        self.uniforms.scale()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the uniforms if they changed since the last call.
    pub fn take_dirty(&mut self) -> Option<&SliderUniforms> {
        if std::mem::take(&mut self.dirty) {
            Some(&self.uniforms)
        } else {
            None
        }
    }

    pub fn set_time(&mut self, elapsed_seconds: f32) {
        if self.uniforms.time != elapsed_seconds {
            self.uniforms.time = elapsed_seconds;
            self.dirty = true;
        }
    }

    /// Recomputes the geometry scale for `viewport`. Repeated calls with the
    /// same viewport leave the surface untouched.
    pub fn resize(&mut self, viewport: &Viewport) {
        let before = self.uniforms.viewport;
        self.uniforms
            .set_viewport(viewport.width, viewport.height, viewport.pixel_ratio);
        if self.uniforms.viewport != before {
            tracing::debug!(
                width = viewport.width,
                height = viewport.height,
                pixel_ratio = viewport.pixel_ratio,
                scale = self.uniforms.scale(),
                "blend surface resized"
            );
            self.dirty = true;
        }
    }

    pub fn set_blend(&mut self, params: &BlendParams) {
        let before = self.uniforms.distortion;
        self.uniforms.set_blend(params);
        if self.uniforms.distortion != before {
            self.dirty = true;
        }
    }
}

impl ProgressSink for BlendSurface {
    fn set_progress(&mut self, value: f32, z_offset: f32) {
        let before = (self.uniforms.progress, self.uniforms.z_offset());
        self.uniforms.progress = value;
        self.uniforms.set_z_offset(z_offset);
        if (self.uniforms.progress, self.uniforms.z_offset()) != before {
            self.dirty = true;
        }
    }
}
