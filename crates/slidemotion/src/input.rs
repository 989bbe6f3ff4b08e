//! Pointer and touch drag handling.
//!
//! Window events are translated into [`PointerEvent`]s by the host and routed
//! through a [`PointerSubscription`]. The subscription is the only handle to
//! the drag listeners: dropping routing for every pointer kind at once is a
//! single [`PointerSubscription::dispose`] call.

use crate::progress::ProgressController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Identifies the physical pointer behind an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

impl PointerId {
    pub fn kind(self) -> PointerKind {
        match self {
            PointerId::Mouse => PointerKind::Mouse,
            PointerId::Touch(_) => PointerKind::Touch,
        }
    }
}

/// Host-agnostic pointer input, horizontal position in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Pressed { pointer: PointerId, x: f64 },
    Moved { pointer: PointerId, x: f64 },
    Released { pointer: PointerId },
    Cancelled { pointer: PointerId },
}

impl PointerEvent {
    pub fn pointer(&self) -> PointerId {
        match *self {
            PointerEvent::Pressed { pointer, .. }
            | PointerEvent::Moved { pointer, .. }
            | PointerEvent::Released { pointer }
            | PointerEvent::Cancelled { pointer } => pointer,
        }
    }
}

/// Cursor affordance the host should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Grab,
    Grabbing,
}

/// A pointer that is currently held down on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pointer: PointerId,
    last_pointer_x: f64,
}

impl DragSession {
    pub fn begin(pointer: PointerId, x: f64) -> Self {
        Self {
            pointer,
            last_pointer_x: x,
        }
    }

    pub fn pointer(&self) -> PointerId {
        self.pointer
    }

    pub fn last_pointer_x(&self) -> f64 {
        self.last_pointer_x
    }

    /// Records a new pointer position and returns the movement as a fraction
    /// of the viewport width.
    pub fn update(&mut self, x: f64, viewport_width: f64) -> f32 {
        let delta = x - self.last_pointer_x;
        self.last_pointer_x = x;
        if viewport_width <= 0.0 || !viewport_width.is_finite() {
            return 0.0;
        }
        (delta / viewport_width) as f32
    }
}

/// Handle for the drag listeners registered on the render surface.
#[derive(Debug)]
pub struct PointerSubscription {
    mouse: bool,
    touch: bool,
    session: Option<DragSession>,
}

impl PointerSubscription {
    pub fn subscribe(kinds: &[PointerKind]) -> Self {
        Self {
            mouse: kinds.contains(&PointerKind::Mouse),
            touch: kinds.contains(&PointerKind::Touch),
            session: None,
        }
    }

    pub fn is_subscribed(&self, kind: PointerKind) -> bool {
        match kind {
            PointerKind::Mouse => self.mouse,
            PointerKind::Touch => self.touch,
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn cursor_hint(&self) -> CursorHint {
        if self.session.is_some() {
            CursorHint::Grabbing
        } else {
            CursorHint::Grab
        }
    }

    /// Routes one event into `controller`. Returns true when the event was consumed.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        viewport_width: f64,
        controller: &mut ProgressController,
    ) -> bool {
        let pointer = event.pointer();
        if !self.is_subscribed(pointer.kind()) {
            return false;
        }

        match event {
            PointerEvent::Pressed { pointer, x } => {
                if self.session.is_some() {
                    return false;
                }
                self.session = Some(DragSession::begin(pointer, x));
                controller.set_drag_active(true);
                tracing::debug!(?pointer, x, "drag started");
                true
            }
            PointerEvent::Moved { pointer, x } => match self.session.as_mut() {
                Some(session) if session.pointer() == pointer => {
                    let delta = session.update(x, viewport_width);
                    controller.apply_drag_delta(delta);
                    true
                }
                _ => false,
            },
            PointerEvent::Released { pointer } | PointerEvent::Cancelled { pointer } => {
                match self.session {
                    Some(session) if session.pointer() == pointer => {
                        self.session = None;
                        controller.set_drag_active(false);
                        tracing::debug!(
                            ?pointer,
                            progress = controller.progress(),
                            target = controller.target(),
                            "drag ended"
                        );
                        true
                    }
                    _ => false,
                }
            }
        }
    }

    /// Detaches every listener at once, ending any drag in flight.
    pub fn dispose(mut self, controller: &mut ProgressController) {
        if self.session.take().is_some() {
            controller.set_drag_active(false);
        }
        self.mouse = false;
        self.touch = false;
        tracing::debug!("pointer subscription disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::MotionTuning;

    fn controller() -> ProgressController {
        ProgressController::new(4, MotionTuning::default()).unwrap()
    }

    #[test]
    fn session_normalises_by_viewport_width() {
        let mut session = DragSession::begin(PointerId::Mouse, 100.0);
        assert!((session.update(300.0, 1000.0) - 0.2).abs() < 1e-6);
        assert!((session.update(200.0, 1000.0) + 0.1).abs() < 1e-6);
        assert_eq!(session.update(500.0, 0.0), 0.0);
        assert_eq!(session.last_pointer_x(), 500.0);
    }

    #[test]
    fn press_move_release_drives_controller() {
        let mut slider = controller();
        let mut input = PointerSubscription::subscribe(&[PointerKind::Mouse, PointerKind::Touch]);
        assert_eq!(input.cursor_hint(), CursorHint::Grab);

        assert!(input.handle(
            PointerEvent::Pressed {
                pointer: PointerId::Mouse,
                x: 500.0
            },
            1000.0,
            &mut slider
        ));
        assert!(slider.is_dragging());
        assert_eq!(input.cursor_hint(), CursorHint::Grabbing);

        input.handle(
            PointerEvent::Moved {
                pointer: PointerId::Mouse,
                x: 300.0,
            },
            1000.0,
            &mut slider,
        );
        assert!((slider.progress() - 0.3).abs() < 1e-6);

        input.handle(
            PointerEvent::Released {
                pointer: PointerId::Mouse,
            },
            1000.0,
            &mut slider,
        );
        assert!(!slider.is_dragging());
        assert!(input.session().is_none());
    }

    #[test]
    fn hover_without_press_is_ignored() {
        let mut slider = controller();
        let mut input = PointerSubscription::subscribe(&[PointerKind::Mouse]);
        let consumed = input.handle(
            PointerEvent::Moved {
                pointer: PointerId::Mouse,
                x: 10.0,
            },
            1000.0,
            &mut slider,
        );
        assert!(!consumed);
        assert_eq!(slider.progress(), 0.0);
    }

    #[test]
    fn second_pointer_cannot_hijack_session() {
        let mut slider = controller();
        let mut input = PointerSubscription::subscribe(&[PointerKind::Touch]);
        input.handle(
            PointerEvent::Pressed {
                pointer: PointerId::Touch(1),
                x: 400.0,
            },
            800.0,
            &mut slider,
        );
        assert!(!input.handle(
            PointerEvent::Moved {
                pointer: PointerId::Touch(2),
                x: 0.0
            },
            800.0,
            &mut slider
        ));
        assert!(!input.handle(
            PointerEvent::Released {
                pointer: PointerId::Touch(2)
            },
            800.0,
            &mut slider
        ));
        assert!(slider.is_dragging());
        assert_eq!(slider.progress(), 0.0);
    }

    #[test]
    fn unsubscribed_kinds_are_ignored() {
        let mut slider = controller();
        let mut input = PointerSubscription::subscribe(&[PointerKind::Touch]);
        assert!(!input.handle(
            PointerEvent::Pressed {
                pointer: PointerId::Mouse,
                x: 1.0
            },
            800.0,
            &mut slider
        ));
        assert!(!slider.is_dragging());
    }

    #[test]
    fn dispose_ends_active_drag() {
        let mut slider = controller();
        let mut input = PointerSubscription::subscribe(&[PointerKind::Mouse]);
        input.handle(
            PointerEvent::Pressed {
                pointer: PointerId::Mouse,
                x: 0.0,
            },
            800.0,
            &mut slider,
        );
        input.handle(
            PointerEvent::Moved {
                pointer: PointerId::Mouse,
                x: -400.0,
            },
            800.0,
            &mut slider,
        );
        let held = slider.progress();
        input.dispose(&mut slider);
        assert!(!slider.is_dragging());
        assert_eq!(slider.progress(), held);
    }
}
