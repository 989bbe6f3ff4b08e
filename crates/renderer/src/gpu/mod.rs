//! GPU side of the slider.
//!
//! - `context` owns the wgpu instance/device/surface wiring and rebuilds the
//!   swapchain when the window resizes.
//! - `textures` decodes the image set into one texture array.
//! - `pipeline` builds the bind group layouts and the single render pipeline.
//! - `uniforms` mirrors the GLSL uniform block.
//! - `surface` is the CPU-side [`BlendSurface`] that the progress controller
//!   writes into every tick.
//! - `state` glues everything together and exposes `GpuState` to `window`.

mod context;
mod pipeline;
mod state;
mod surface;
mod textures;
mod uniforms;

pub(crate) use state::GpuState;
pub use surface::BlendSurface;
pub use uniforms::{surface_scale, SliderUniforms, CAMERA_DISTANCE, PLANE_HEIGHT, PLANE_WIDTH};
