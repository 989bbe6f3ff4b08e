use crate::blend::MAX_IMAGES;
use crate::MotionError;

/// Reference frame rate the settle rate is expressed against.
const REFERENCE_FPS: f32 = 60.0;

/// Distance from the settle target below which the controller reports itself
/// as settled.
const SETTLE_EPSILON: f32 = 1e-4;

/// Knobs that shape how drag input and settling feel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionTuning {
    /// Progress units moved per full viewport width of drag.
    pub drag_sensitivity: f32,
    /// Fraction of the remaining distance covered per 1/60 s while settling.
    pub settle_rate: f32,
    /// Out-of-plane offset per unit of overscroll.
    pub overscroll_depth: f32,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            drag_sensitivity: 1.5,
            settle_rate: 0.1,
            overscroll_depth: 50.0,
        }
    }
}

impl MotionTuning {
    pub fn validate(&self) -> Result<(), MotionError> {
        if !self.drag_sensitivity.is_finite() || self.drag_sensitivity <= 0.0 {
            return Err(MotionError::InvalidTuning(format!(
                "drag sensitivity must be a positive number, got {}",
                self.drag_sensitivity
            )));
        }
        if !self.settle_rate.is_finite() || self.settle_rate <= 0.0 || self.settle_rate > 1.0 {
            return Err(MotionError::InvalidTuning(format!(
                "settle rate must be within (0, 1], got {}",
                self.settle_rate
            )));
        }
        if !self.overscroll_depth.is_finite() || self.overscroll_depth < 0.0 {
            return Err(MotionError::InvalidTuning(format!(
                "overscroll depth must be non-negative, got {}",
                self.overscroll_depth
            )));
        }
        Ok(())
    }
}

/// Receives the shader-visible state produced by each tick.
pub trait ProgressSink {
    fn set_progress(&mut self, value: f32, z_offset: f32);
}

/// Snapshot of what a tick pushed to the sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Progress clamped to `[0, N-1]`.
    pub progress: f32,
    /// Out-of-plane push-back; negative below the first image, positive past the last.
    pub z_offset: f32,
}

impl ProgressSink for Option<Frame> {
    fn set_progress(&mut self, value: f32, z_offset: f32) {
        *self = Some(Frame {
            progress: value,
            z_offset,
        });
    }
}

/// Frame-rate independent smoothing coefficient.
///
/// `rate` is the fraction covered per 1/60 s; the result is the fraction to
/// cover over `delta_ms`. Always within `[0, 1]`.
pub fn smoothing_factor(rate: f32, delta_ms: f32) -> f32 {
    if !delta_ms.is_finite() || delta_ms <= 0.0 {
        return 0.0;
    }
    let rate = rate.clamp(0.0, 1.0);
    let frames = REFERENCE_FPS * delta_ms / 1000.0;
    (1.0 - (1.0 - rate).powf(frames)).clamp(0.0, 1.0)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Owns the scrub position and its settle animation.
#[derive(Debug, Clone)]
pub struct ProgressController {
    progress: f32,
    image_count: usize,
    dragging: bool,
    tuning: MotionTuning,
}

impl ProgressController {
    pub fn new(image_count: usize, tuning: MotionTuning) -> Result<Self, MotionError> {
        if image_count == 0 {
            return Err(MotionError::NoImages);
        }
        if image_count > MAX_IMAGES {
            return Err(MotionError::TooManyImages {
                count: image_count,
                max: MAX_IMAGES,
            });
        }
        tuning.validate()?;
        Ok(Self {
            progress: 0.0,
            image_count,
            dragging: false,
            tuning,
        })
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    pub fn tuning(&self) -> MotionTuning {
        self.tuning
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    fn last_index(&self) -> f32 {
        (self.image_count - 1) as f32
    }

    /// Nearest image index the controller settles toward.
    pub fn target(&self) -> usize {
        self.progress.round().clamp(0.0, self.last_index()) as usize
    }

    pub fn is_settled(&self) -> bool {
        !self.dragging && (self.progress - self.target() as f32).abs() < SETTLE_EPSILON
    }

    /// Shader-visible progress.
    pub fn clamped(&self) -> f32 {
        self.progress.clamp(0.0, self.last_index())
    }

    /// Out-of-plane offset proportional to how far progress overshoots the ends.
    pub fn overscroll_offset(&self) -> f32 {
        let last = self.last_index();
        if self.progress < 0.0 {
            self.progress * self.tuning.overscroll_depth
        } else if self.progress > last {
            (self.progress - last) * self.tuning.overscroll_depth
        } else {
            0.0
        }
    }

    /// Applies a drag delta expressed as a signed fraction of the viewport width.
    ///
    /// Dragging right (positive delta) moves toward earlier images. The raw
    /// value is left unclamped so the surface can show overscroll.
    pub fn apply_drag_delta(&mut self, delta_normalized: f32) {
        if !delta_normalized.is_finite() {
            return;
        }
        self.progress -= delta_normalized * self.tuning.drag_sensitivity;
    }

    pub fn set_drag_active(&mut self, active: bool) {
        if self.dragging != active {
            tracing::trace!(active, progress = self.progress, "drag state changed");
        }
        self.dragging = active;
    }

    /// Jumps straight to `value` (clamped), bypassing the settle animation.
    pub fn scrub_to(&mut self, value: f32) {
        if !value.is_finite() {
            return;
        }
        self.progress = value.clamp(0.0, self.last_index());
    }

    /// Advances one tick and pushes the shader-visible state into `sink`.
    pub fn advance<S>(&mut self, delta_ms: f32, sink: &mut S) -> Frame
    where
        S: ProgressSink + ?Sized,
    {
        let frame = Frame {
            progress: self.clamped(),
            z_offset: self.overscroll_offset(),
        };

        if !self.dragging {
            let target = self.target() as f32;
            let beta = smoothing_factor(self.tuning.settle_rate, delta_ms);
            self.progress = lerp(self.progress, target, beta);
        }

        sink.set_progress(frame.progress, frame.z_offset);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(count: usize) -> ProgressController {
        ProgressController::new(count, MotionTuning::default()).unwrap()
    }

    #[test]
    fn rejects_empty_image_set() {
        let err = ProgressController::new(0, MotionTuning::default()).unwrap_err();
        assert_eq!(err, MotionError::NoImages);
    }

    #[test]
    fn rejects_image_sets_beyond_shader_bound() {
        let err = ProgressController::new(MAX_IMAGES + 1, MotionTuning::default()).unwrap_err();
        assert!(matches!(err, MotionError::TooManyImages { .. }));
    }

    #[test]
    fn rejects_out_of_range_settle_rate() {
        let tuning = MotionTuning {
            settle_rate: 1.5,
            ..MotionTuning::default()
        };
        assert!(matches!(
            ProgressController::new(3, tuning),
            Err(MotionError::InvalidTuning(_))
        ));
    }

    #[test]
    fn smoothing_factor_never_exceeds_one() {
        assert_eq!(smoothing_factor(0.1, 0.0), 0.0);
        assert_eq!(smoothing_factor(0.1, -5.0), 0.0);
        assert_eq!(smoothing_factor(0.1, f32::NAN), 0.0);
        let huge = smoothing_factor(0.1, 3_600_000.0);
        assert!(huge <= 1.0);
        assert!(huge > 0.99);
        assert!((smoothing_factor(0.1, 1000.0 / 60.0) - 0.1).abs() < 1e-5);
    }

    #[test]
    fn smoothing_composes_across_tick_rates() {
        let once = smoothing_factor(0.1, 32.0);
        let half = smoothing_factor(0.1, 16.0);
        let twice = 1.0 - (1.0 - half) * (1.0 - half);
        assert!((once - twice).abs() < 1e-5);
    }

    #[test]
    fn drag_delta_moves_against_pointer() {
        let mut slider = controller(4);
        slider.apply_drag_delta(-0.5);
        assert!((slider.progress() - 0.75).abs() < 1e-6);
        slider.apply_drag_delta(f32::INFINITY);
        assert!((slider.progress() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn dragging_freezes_settle() {
        let mut slider = controller(4);
        slider.set_drag_active(true);
        slider.apply_drag_delta(-0.3);
        let before = slider.progress();
        let mut sink = None;
        for _ in 0..10 {
            slider.advance(16.0, &mut sink);
        }
        assert_eq!(slider.progress(), before);
    }

    #[test]
    fn toggling_drag_keeps_position() {
        let mut slider = controller(4);
        slider.set_drag_active(true);
        slider.apply_drag_delta(-1.0);
        slider.set_drag_active(false);
        let mut sink = None;
        slider.advance(16.0, &mut sink);
        let mid = slider.progress();
        slider.set_drag_active(true);
        slider.set_drag_active(false);
        assert_eq!(slider.progress(), mid);
        slider.set_drag_active(true);
        slider.apply_drag_delta(-0.1);
        assert!((slider.progress() - (mid + 0.15)).abs() < 1e-6);
    }

    #[test]
    fn huge_delta_lands_on_target_without_overshoot() {
        let mut slider = controller(4);
        slider.apply_drag_delta(-1.2);
        let mut sink = None;
        slider.advance(10_000_000.0, &mut sink);
        assert!(slider.progress() <= 2.0 + 1e-6);
        assert!((slider.progress() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn single_image_always_shows_first() {
        let mut slider = controller(1);
        slider.set_drag_active(true);
        slider.apply_drag_delta(-0.8);
        let mut sink = None;
        let frame = slider.advance(16.0, &mut sink);
        assert_eq!(frame.progress, 0.0);
        assert!(frame.z_offset > 0.0);
        assert_eq!(slider.target(), 0);
    }

    #[test]
    fn scrub_clamps_without_smoothing() {
        let mut slider = controller(4);
        slider.scrub_to(2.5);
        assert_eq!(slider.progress(), 2.5);
        slider.scrub_to(9.0);
        assert_eq!(slider.progress(), 3.0);
        slider.scrub_to(-1.0);
        assert_eq!(slider.progress(), 0.0);
        assert!(slider.is_settled());
    }

    #[test]
    fn advance_reports_pre_settle_state_to_sink() {
        let mut slider = controller(3);
        slider.set_drag_active(true);
        slider.apply_drag_delta(-2.0);
        slider.set_drag_active(false);
        let mut sink = None;
        let frame = slider.advance(16.0, &mut sink);
        assert_eq!(sink, Some(frame));
        assert_eq!(frame.progress, 2.0);
        assert!((frame.z_offset - 50.0).abs() < 1e-3);
    }
}
