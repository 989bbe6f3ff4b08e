//! Motion core for the slidewarp image slider.
//!
//! A single scalar "progress" indexes into the ordered image set. Drag input
//! moves it freely (overscroll included), and once the pointer lets go the
//! value settles onto the nearest image with frame-rate independent
//! exponential smoothing:
//!
//! ```text
//!   PointerSubscription ──▶ ProgressController ──advance()──▶ ProgressSink
//!        (drag deltas)        (raw progress)        (clamped progress, z offset)
//! ```
//!
//! - `progress` owns the controller and its tuning.
//! - `input` turns pointer/touch events into normalised drag deltas.
//! - `blend` mirrors the shader's multi-texture blend contract on the CPU.

pub mod blend;
pub mod input;
pub mod progress;

pub use blend::{blend_strength, blend_weights, mix_strength, MAX_IMAGES};
pub use input::{CursorHint, DragSession, PointerEvent, PointerId, PointerKind, PointerSubscription};
pub use progress::{smoothing_factor, Frame, MotionTuning, ProgressController, ProgressSink};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MotionError {
    #[error("slider requires at least one image")]
    NoImages,
    #[error("slider supports at most {max} images, got {count}")]
    TooManyImages { count: usize, max: usize },
    #[error("invalid motion tuning: {0}")]
    InvalidTuning(String),
}
