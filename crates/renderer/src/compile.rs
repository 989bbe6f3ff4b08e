use std::borrow::Cow;

use anyhow::Result;
use wgpu::naga::ShaderStage;

/// Compiles the perspective slide-plane vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("slide plane vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    }))
}

/// Compiles the fragment shader that blends the slide texture array.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("slide blend fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(format!("{UNIFORM_BLOCK}{FRAGMENT_BODY}")),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    }))
}

/// Shared uniform declaration; the layout must match `SliderUniforms`.
const UNIFORM_BLOCK: &str = r"#version 450

layout(std140, set = 0, binding = 0) uniform SliderParams {
    vec4 viewport;    // logical width, logical height, pixel ratio, scale
    vec4 plane;       // half width, half height, camera distance, z offset
    vec4 distortion;  // range, strength, frequency, boundary clarity
    float time;
    float progress;
    int image_count;
    float _padding0;
} ubo;
";

const FRAGMENT_BODY: &str = r"
layout(location = 0) in vec2 v_uv;
layout(location = 1) in vec2 v_local;
layout(location = 0) out vec4 outColor;

layout(set = 1, binding = 0) uniform texture2DArray slides_texture;
layout(set = 1, binding = 1) uniform sampler slides_sampler;

const int MAX_IMAGES = 16;
const float CORNER_RADIUS = 12.0;

float mix_strength(int index, float progress, float clarity) {
    float t = clamp(progress - float(index - 1), 0.0, 1.0);
    t = clamp((t - 0.5) * max(clarity, 1.0) + 0.5, 0.0, 1.0);
    return t * t * (3.0 - 2.0 * t);
}

vec4 sample_slide(vec2 uv, int layer) {
    return texture(sampler2DArray(slides_texture, slides_sampler), vec3(uv, float(layer)));
}

void main() {
    // Warp peaks halfway between two slides and vanishes on whole indices.
    float transition = 1.0 - abs(fract(ubo.progress) * 2.0 - 1.0);
    float amount = clamp(transition / max(ubo.distortion.x, 0.0001), 0.0, 1.0);
    vec2 uv = v_uv;
    uv.x += sin(uv.y * ubo.distortion.z + ubo.time) * ubo.distortion.y * amount;

    int last = max(ubo.image_count - 1, 0);
    float count = float(ubo.image_count);
    vec4 color = sample_slide(uv, 0);
    for (int i = 1; i < MAX_IMAGES; i++) {
        float enabled = step(float(i), count - 0.5);
        vec4 next = sample_slide(uv, min(i, last));
        color = mix(color, next, mix_strength(i, ubo.progress, ubo.distortion.w) * enabled);
    }

    vec2 q = abs(v_local) - (ubo.plane.xy - vec2(CORNER_RADIUS));
    float d = length(max(q, vec2(0.0))) + min(max(q.x, q.y), 0.0) - CORNER_RADIUS;
    float aa = max(fwidth(d), 0.0001);
    float coverage = 1.0 - smoothstep(-aa, aa, d);

    float alpha = color.a * coverage;
    outColor = vec4(color.rgb * alpha, alpha);
}
";

/// Six-vertex quad scaled to the viewport and pushed along z by the overscroll offset.
const VERTEX_SHADER_GLSL: &str = r"#version 450

layout(std140, set = 0, binding = 0) uniform SliderParams {
    vec4 viewport;
    vec4 plane;
    vec4 distortion;
    float time;
    float progress;
    int image_count;
    float _padding0;
} ubo;

layout(location = 0) out vec2 v_uv;
layout(location = 1) out vec2 v_local;

const vec2 corners[6] = vec2[6](
    vec2(-1.0, -1.0),
    vec2(1.0, -1.0),
    vec2(1.0, 1.0),
    vec2(-1.0, -1.0),
    vec2(1.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    vec2 corner = corners[gl_VertexIndex];
    float camera = ubo.plane.z;
    float depth = camera / max(camera - ubo.plane.w, 1.0);
    vec2 logical = corner * ubo.plane.xy * ubo.viewport.w * depth;
    vec2 half_viewport = max(ubo.viewport.xy * 0.5, vec2(1.0));

    gl_Position = vec4(logical / half_viewport, 0.0, 1.0);
    v_uv = vec2(corner.x * 0.5 + 0.5, 0.5 - corner.y * 0.5);
    v_local = corner * ubo.plane.xy;
}
";
