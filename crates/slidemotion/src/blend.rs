//! CPU mirror of the blend contract the fragment shader implements.
//!
//! The shader starts from image 0 and, for every later image `i`, mixes it
//! over the running colour with [`mix_strength`]. Because each step reaches
//! full strength exactly when the next one starts, at most two neighbouring
//! images are ever visible at once.

/// Upper bound on the image count; the shader loop and texture array are sized to it.
pub const MAX_IMAGES: usize = 16;

fn smoothstep01(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Strength used when mixing image `index` over the running colour.
///
/// Rises smoothly from 0 at `progress == index - 1` to 1 at `progress == index`.
/// `clarity` above 1 narrows the cross-fade toward the midpoint; values below 1
/// are treated as 1.
pub fn mix_strength(index: usize, progress: f32, clarity: f32) -> f32 {
    if index == 0 {
        return 1.0;
    }
    let t = (progress - (index - 1) as f32).clamp(0.0, 1.0);
    let clarity = if clarity.is_finite() {
        clarity.max(1.0)
    } else {
        1.0
    };
    smoothstep01((t - 0.5) * clarity + 0.5)
}

/// How much image `index` contributes to the final colour at `progress`.
///
/// Zero at and beyond one index away, one exactly at `progress == index`.
/// `progress` is expected to be the shader-visible (clamped) value.
pub fn blend_strength(index: usize, progress: f32, clarity: f32) -> f32 {
    mix_strength(index, progress, clarity) * (1.0 - mix_strength(index + 1, progress, clarity))
}

/// Effective per-image weights for `count` images, replaying the shader's mix chain.
pub fn blend_weights(progress: f32, count: usize, clarity: f32) -> Vec<f32> {
    let mut weights = vec![0.0; count];
    if let Some(base) = weights.first_mut() {
        *base = 1.0;
    }
    for index in 1..count {
        let strength = mix_strength(index, progress, clarity);
        for weight in &mut weights[..index] {
            *weight *= 1.0 - strength;
        }
        weights[index] = strength;
    }
    weights
}
