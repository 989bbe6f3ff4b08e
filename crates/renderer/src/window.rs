use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use slidemotion::{
    CursorHint, PointerEvent, PointerId, PointerKind, PointerSubscription, ProgressController,
};
use tracing::{debug, error, info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{CursorIcon, Window, WindowBuilder};

use crate::gpu::GpuState;
use crate::runtime::{time_source, BoxedTimeSource, FrameScheduler, Viewport};
use crate::types::{BlendTweaks, RendererConfig};

const SOFTWARE_FPS_CAP: f32 = 15.0;

/// Window, GPU and slider state driven by the event loop.
pub(crate) struct WindowState {
    // Declared before `window` so the surface is dropped first.
    gpu: Option<GpuState>,
    window: Arc<Window>,
    config: RendererConfig,
    slider: ProgressController,
    input: Option<PointerSubscription>,
    cursor: CursorHint,
    cursor_x: f64,
    viewport: Viewport,
    clock: BoxedTimeSource,
    scheduler: FrameScheduler,
    tweaks: Box<dyn BlendTweaks>,
    was_settled: bool,
}

impl WindowState {
    pub(crate) fn new(
        window: Arc<Window>,
        config: RendererConfig,
        tweaks: Box<dyn BlendTweaks>,
    ) -> Result<Self> {
        let mut slider = ProgressController::new(config.images.len(), config.motion)?;
        slider.scrub_to(config.start_at as f32);
        let viewport = Viewport::from_physical(window.inner_size(), window.scale_factor());
        let input = PointerSubscription::subscribe(&[PointerKind::Mouse, PointerKind::Touch]);
        window.set_cursor_icon(cursor_icon(input.cursor_hint()));

        Ok(Self {
            gpu: None,
            window,
            clock: time_source(config.fixed_step_ms),
            scheduler: FrameScheduler::new(config.target_fps),
            config,
            slider,
            cursor: input.cursor_hint(),
            input: Some(input),
            cursor_x: 0.0,
            viewport,
            tweaks,
            was_settled: true,
        })
    }

    pub(crate) fn window(&self) -> &Window {
        self.window.as_ref()
    }

    /// Creates the GPU state on first resume; later resumes are no-ops.
    pub(crate) fn ensure_gpu(&mut self) -> Result<()> {
        if self.gpu.is_some() {
            return Ok(());
        }
        let size = self.window.inner_size();
        let gpu = GpuState::new(self.window.as_ref(), size, &self.viewport, &self.config)?;

        let profile = gpu.adapter_profile();
        if profile.is_software() && self.config.target_fps.is_none() {
            warn!(
                adapter = %profile.name,
                backend = ?profile.backend,
                cap = SOFTWARE_FPS_CAP,
                "software rasterizer detected; capping to {} FPS (override with --fps)",
                SOFTWARE_FPS_CAP
            );
            self.scheduler = FrameScheduler::new(Some(SOFTWARE_FPS_CAP));
        }

        self.gpu = Some(gpu);
        self.clock.reset();
        self.scheduler.reset();
        Ok(())
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.viewport = Viewport::from_physical(new_size, self.window.scale_factor());
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(new_size, &self.viewport);
        }
    }

    fn route_pointer(&mut self, event: PointerEvent) {
        if self.gpu.is_none() {
            return;
        }
        let Some(input) = self.input.as_mut() else {
            return;
        };
        let width = f64::from(self.viewport.physical_width());
        if input.handle(event, width, &mut self.slider) {
            self.was_settled = false;
        }
        let hint = input.cursor_hint();
        if hint != self.cursor {
            self.cursor = hint;
            self.window.set_cursor_icon(cursor_icon(hint));
        }
    }

    pub(crate) fn handle_cursor_moved(&mut self, x: f64) {
        self.cursor_x = x;
        self.route_pointer(PointerEvent::Moved {
            pointer: PointerId::Mouse,
            x,
        });
    }

    pub(crate) fn handle_mouse_button(&mut self, state: ElementState) {
        let pointer = PointerId::Mouse;
        let event = match state {
            ElementState::Pressed => PointerEvent::Pressed {
                pointer,
                x: self.cursor_x,
            },
            ElementState::Released => PointerEvent::Released { pointer },
        };
        self.route_pointer(event);
    }

    pub(crate) fn handle_touch(&mut self, phase: TouchPhase, id: u64, x: f64) {
        self.route_pointer(touch_event(phase, id, x));
    }

    pub(crate) fn handle_key(&mut self, key: &Key) {
        if self.gpu.is_none() || self.slider.is_dragging() {
            return;
        }
        if let Some(target) =
            scrub_target(key, self.slider.target(), self.slider.image_count())
        {
            debug!(target, "keyboard scrub");
            self.slider.scrub_to(target as f32);
            self.was_settled = false;
        }
    }

    /// Cancels a drag whose release will never arrive.
    pub(crate) fn handle_focus_lost(&mut self) {
        let Some(event) = self.input.as_ref().and_then(focus_lost_event) else {
            return;
        };
        debug!(pointer = ?event.pointer(), "focus lost mid-drag");
        self.route_pointer(event);
    }

    /// Ends pointer routing. Safe to call more than once.
    pub(crate) fn detach_input(&mut self) {
        if let Some(input) = self.input.take() {
            input.dispose(&mut self.slider);
        }
    }

    /// One clock tick: settle the slider, push it into the surface and draw.
    pub(crate) fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let Some(gpu) = self.gpu.as_mut() else {
            return Ok(());
        };
        let sample = self.clock.sample();
        self.tweaks.refresh();

        let surface = gpu.surface_mut();
        surface.set_time(sample.elapsed_seconds());
        surface.set_blend(self.tweaks.params());
        let frame = self.slider.advance(sample.delta_ms, surface);

        let settled = self.slider.is_settled();
        if settled && !self.was_settled {
            debug!(
                index = self.slider.target(),
                progress = frame.progress,
                frame = sample.frame_index,
                "slider settled"
            );
        }
        self.was_settled = settled;

        gpu.render()
    }

    pub(crate) fn recover_surface(&mut self) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.recover_surface();
        }
    }
}

fn cursor_icon(hint: CursorHint) -> CursorIcon {
    match hint {
        CursorHint::Grab => CursorIcon::Grab,
        CursorHint::Grabbing => CursorIcon::Grabbing,
    }
}

fn touch_event(phase: TouchPhase, id: u64, x: f64) -> PointerEvent {
    let pointer = PointerId::Touch(id);
    match phase {
        TouchPhase::Started => PointerEvent::Pressed { pointer, x },
        TouchPhase::Moved => PointerEvent::Moved { pointer, x },
        TouchPhase::Ended => PointerEvent::Released { pointer },
        TouchPhase::Cancelled => PointerEvent::Cancelled { pointer },
    }
}

fn focus_lost_event(input: &PointerSubscription) -> Option<PointerEvent> {
    input.session().map(|session| PointerEvent::Cancelled {
        pointer: session.pointer(),
    })
}

/// Maps navigation keys to the image index they select.
fn scrub_target(key: &Key, current: usize, count: usize) -> Option<usize> {
    let last = count.saturating_sub(1);
    match key {
        Key::Named(NamedKey::ArrowLeft) => Some(current.saturating_sub(1)),
        Key::Named(NamedKey::ArrowRight) => Some((current + 1).min(last)),
        Key::Named(NamedKey::Home) => Some(0),
        Key::Named(NamedKey::End) => Some(last),
        _ => None,
    }
}

pub(crate) fn run_window(config: RendererConfig, tweaks: Box<dyn BlendTweaks>) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create slider window: {err}"))?;
    let window = Arc::new(window);

    info!(
        images = config.images.len(),
        start_at = config.start_at,
        width = window_size.width,
        height = window_size.height,
        "opening slider window"
    );
    let mut state = WindowState::new(window, config, tweaks)?;

    let mut result = Ok(());
    let run_result = event_loop.run(|event, elwt| match event {
        Event::Resumed => {
            if let Err(err) = state.ensure_gpu() {
                error!("failed to initialise GPU state: {err:?}");
                result = Err(err);
                elwt.exit();
                return;
            }
            state.window().request_redraw();
        }
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    state.detach_input();
                    elwt.exit();
                }
                WindowEvent::Resized(new_size) => state.resize(new_size),
                WindowEvent::Focused(false) => state.handle_focus_lost(),
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = state.window().inner_size();
                    state.resize(size);
                }
                WindowEvent::CursorMoved { position, .. } => state.handle_cursor_moved(position.x),
                WindowEvent::MouseInput {
                    state: button_state,
                    button: MouseButton::Left,
                    ..
                } => state.handle_mouse_button(button_state),
                WindowEvent::Touch(touch) => {
                    state.handle_touch(touch.phase, touch.id, touch.location.x)
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if event.state == ElementState::Pressed {
                        state.handle_key(&event.logical_key);
                    }
                }
                WindowEvent::RedrawRequested => match state.render_frame() {
                    Ok(()) => state.scheduler.mark_rendered(Instant::now()),
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.recover_surface();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("surface out of memory; exiting");
                        state.detach_input();
                        elwt.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        warn!("surface timeout; retrying next frame");
                    }
                    Err(other) => {
                        warn!("surface error: {other:?}; retrying next frame");
                    }
                },
                _ => {}
            }
        }
        Event::AboutToWait => {
            let now = Instant::now();
            if state.scheduler.ready_for_frame(now) {
                tracing::trace!("scheduler: issuing redraw now");
                state.window().request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = state.scheduler.next_deadline() {
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            } else {
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        Event::LoopExiting => state.detach_input(),
        _ => {}
    });

    if let Err(err) = run_result {
        result = Err(anyhow!("window event loop error: {err}"));
    }

    result
}
