use std::time::{Duration, Instant};

use winit::dpi::PhysicalSize;

/// Snapshot of the clock for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Milliseconds since the clock started.
    pub elapsed_ms: f32,
    /// Milliseconds since the previous tick; zero on the first tick.
    pub delta_ms: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(elapsed_ms: f32, delta_ms: f32, frame_index: u64) -> Self {
        Self {
            elapsed_ms,
            delta_ms,
            frame_index,
        }
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed_ms / 1000.0
    }
}

/// Abstraction over where time values originate from.
pub trait TimeSource {
    /// Resets the source to its initial state.
    fn reset(&mut self);
    /// Produces a time sample for the next tick.
    fn sample(&mut self) -> TimeSample;
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
    last: Option<Instant>,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            last: None,
            frame: 0,
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self) {
        self.origin = Instant::now();
        self.last = None;
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let now = Instant::now();
        let delta = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last = Some(now);
        let elapsed = now.saturating_duration_since(self.origin);
        let sample = TimeSample::new(
            elapsed.as_secs_f32() * 1000.0,
            delta.as_secs_f32() * 1000.0,
            self.frame,
        );
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Deterministic clock that advances by the same step every tick.
#[derive(Debug, Clone, Copy)]
pub struct FixedStepTimeSource {
    step_ms: f32,
    frame: u64,
}

impl FixedStepTimeSource {
    pub fn new(step_ms: f32) -> Self {
        Self {
            step_ms: step_ms.max(0.0),
            frame: 0,
        }
    }
}

impl TimeSource for FixedStepTimeSource {
    fn reset(&mut self) {
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let delta = if self.frame == 0 { 0.0 } else { self.step_ms };
        let sample = TimeSample::new(self.frame as f32 * self.step_ms, delta, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Convenient alias for owning time sources behind trait objects.
pub type BoxedTimeSource = Box<dyn TimeSource>;

pub fn time_source(fixed_step_ms: Option<f32>) -> BoxedTimeSource {
    match fixed_step_ms {
        Some(step) if step > 0.0 => Box::new(FixedStepTimeSource::new(step)),
        _ => Box::new(SystemTimeSource::new()),
    }
}

/// Current viewport in logical units plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let pixel_ratio = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor as f32
        } else {
            1.0
        };
        Self {
            width: size.width as f32 / pixel_ratio,
            height: size.height as f32 / pixel_ratio,
            pixel_ratio,
        }
    }

    pub fn physical_width(&self) -> f32 {
        self.width * self.pixel_ratio
    }
}

/// Decides when the next frame is due under an optional FPS cap.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    last_render: Option<Instant>,
}

impl FrameScheduler {
    pub fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps)));
        Self {
            interval,
            last_render: None,
        }
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match (self.interval, self.last_render) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
            _ => true,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_render = Some(now);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.interval, self.last_render) {
            (Some(interval), Some(last)) => Some(last + interval),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.last_render = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_step_reports_zero_delta_first() {
        let mut clock = FixedStepTimeSource::new(16.0);
        let first = clock.sample();
        assert_eq!(first.delta_ms, 0.0);
        assert_eq!(first.elapsed_ms, 0.0);
        let second = clock.sample();
        assert_eq!(second.delta_ms, 16.0);
        assert_eq!(second.elapsed_ms, 16.0);
        assert_eq!(second.frame_index, 1);
        clock.reset();
        assert_eq!(clock.sample().frame_index, 0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let mut clock = SystemTimeSource::new();
        let first = clock.sample();
        let second = clock.sample();
        assert!(second.elapsed_ms >= first.elapsed_ms);
        assert!(second.delta_ms >= 0.0);
    }

    #[test]
    fn viewport_converts_to_logical_units() {
        let viewport = Viewport::from_physical(PhysicalSize::new(2560, 1440), 2.0);
        assert_eq!(viewport.width, 1280.0);
        assert_eq!(viewport.height, 720.0);
        assert_eq!(viewport.physical_width(), 2560.0);
        let fallback = Viewport::from_physical(PhysicalSize::new(800, 600), 0.0);
        assert_eq!(fallback.pixel_ratio, 1.0);
    }

    #[test]
    fn uncapped_scheduler_is_always_ready() {
        let mut scheduler = FrameScheduler::new(None);
        let now = Instant::now();
        scheduler.mark_rendered(now);
        assert!(scheduler.ready_for_frame(now));
        assert!(scheduler.next_deadline().is_none());
    }

    #[test]
    fn capped_scheduler_waits_for_interval() {
        let mut scheduler = FrameScheduler::new(Some(10.0));
        let now = Instant::now();
        assert!(scheduler.ready_for_frame(now));
        scheduler.mark_rendered(now);
        assert!(!scheduler.ready_for_frame(now + Duration::from_millis(50)));
        assert!(scheduler.ready_for_frame(now + Duration::from_millis(100)));
        let deadline = scheduler.next_deadline().unwrap();
        let wait = deadline.duration_since(now).as_secs_f64();
        assert!((wait - 0.1).abs() < 1e-6, "{wait}");
    }

    #[test]
    fn capped_interval_is_exact_for_common_rates() {
        for fps in [10.0_f32, 24.0, 30.0, 60.0, 144.0] {
            let mut scheduler = FrameScheduler::new(Some(fps));
            let now = Instant::now();
            scheduler.mark_rendered(now);
            let interval = Duration::from_secs_f64(1.0 / f64::from(fps));
            assert!(scheduler.ready_for_frame(now + interval), "{fps} fps");
        }
    }
}
