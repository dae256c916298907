//! "Tap to show navigation" hint

use crate::events::{EventSystem, EventType};
use crate::foundation::time::DelayTimer;

/// Caption of the hint
pub const TAP_HINT_TEXT: &str = "Tap anywhere to show navigation";

/// Shows the hint once after a delay, then hides it again
#[derive(Debug, Clone)]
pub struct TapHint {
    show_timer: DelayTimer,
    hide_timer: DelayTimer,
    duration: f32,
    visible: bool,
}

impl TapHint {
    /// Schedule the hint `delay` seconds from now, visible for `duration`
    pub fn new(delay: f32, duration: f32) -> Self {
        let mut show_timer = DelayTimer::new();
        show_timer.arm(delay);
        Self {
            show_timer,
            hide_timer: DelayTimer::new(),
            duration,
            visible: false,
        }
    }

    /// Whether the hint is on screen
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the hint has yet to appear or disappear
    pub fn is_pending(&self) -> bool {
        self.show_timer.is_armed() || self.hide_timer.is_armed()
    }

    /// Advance the show and hide countdowns
    pub fn update(&mut self, delta_time: f32, events: &mut EventSystem) {
        if self.hide_timer.tick(delta_time) {
            self.set_visible(false, events);
        }
        if self.show_timer.tick(delta_time) {
            self.set_visible(true, events);
            self.hide_timer.arm(self.duration);
        }
    }

    /// Hide the hint for good (the user already tapped)
    pub fn dismiss(&mut self, events: &mut EventSystem) {
        self.show_timer.cancel();
        self.hide_timer.cancel();
        self.set_visible(false, events);
    }

    fn set_visible(&mut self, visible: bool, events: &mut EventSystem) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        let event = events.stamp(if visible { EventType::TapHintShown } else { EventType::TapHintHidden });
        events.send(event);
    }
}
