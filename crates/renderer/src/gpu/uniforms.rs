use bytemuck::{Pod, Zeroable};

use crate::types::BlendParams;

/// Authored plane size in logical units.
pub const PLANE_WIDTH: f32 = 800.0;
pub const PLANE_HEIGHT: f32 = 450.0;
/// Distance from the eye to the plane; z offsets move the plane along this axis.
pub const CAMERA_DISTANCE: f32 = 600.0;
/// Viewport width at which the plane is drawn at its authored size.
pub const REFERENCE_WIDTH: f32 = 1280.0;

/// Geometry scale for a viewport `width` logical units wide.
pub fn surface_scale(width: f32) -> f32 {
    if !width.is_finite() || width <= 0.0 {
        return 0.0;
    }
    width.min(REFERENCE_WIDTH) / REFERENCE_WIDTH
}

/// Uniform block shared by the vertex and fragment stages.
///
/// Must stay in sync with the `SliderParams` block in `compile.rs`.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliderUniforms {
    /// Logical width, logical height, pixel ratio, geometry scale.
    pub viewport: [f32; 4],
    /// Half plane width, half plane height, camera distance, z offset.
    pub plane: [f32; 4],
    /// Range, strength, frequency, boundary clarity.
    pub distortion: [f32; 4],
    pub time: f32,
    pub progress: f32,
    pub image_count: i32,
    pub _padding0: f32,
}

unsafe impl Zeroable for SliderUniforms {}
unsafe impl Pod for SliderUniforms {}

impl SliderUniforms {
    pub fn new(image_count: usize) -> Self {
        let mut uniforms = Self {
            viewport: [0.0, 0.0, 1.0, 0.0],
            plane: [
                PLANE_WIDTH * 0.5,
                PLANE_HEIGHT * 0.5,
                CAMERA_DISTANCE,
                0.0,
            ],
            distortion: [0.0; 4],
            time: 0.0,
            progress: 0.0,
            image_count: image_count.min(i32::MAX as usize) as i32,
            _padding0: 0.0,
        };
        uniforms.set_blend(&BlendParams::default());
        uniforms
    }

    pub fn set_viewport(&mut self, width: f32, height: f32, pixel_ratio: f32) {
        self.viewport = [width, height, pixel_ratio, surface_scale(width)];
    }

    pub fn set_z_offset(&mut self, z_offset: f32) {
        // Keep the plane in front of the camera no matter how far the user overscrolls.
        self.plane[3] = z_offset.min(CAMERA_DISTANCE * 0.9);
    }

    pub fn set_blend(&mut self, params: &BlendParams) {
        self.distortion = [
            params.distortion_range,
            params.distortion_strength,
            params.distortion_frequency,
            params.boundary_clarity,
        ];
    }

    pub fn scale(&self) -> f32 {
        self.viewport[3]
    }

    pub fn z_offset(&self) -> f32 {
        self.plane[3]
    }
}
