//! Tour event system
//!
//! Key principles:
//! - Key-value arguments (no order dependency)
//! - Handler returns bool (true = consumed, stops forwarding)
//! - Registration system (only notify interested handlers)
//! - Events queue up during an engine update and are dispatched at its end

use std::collections::HashMap;

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// A scene finished materializing
    SceneLoaded,
    /// A scene failed to materialize and is back to unloaded
    SceneLoadFailed,
    /// A resident scene was released
    SceneEvicted,
    /// A scene became the visible one
    SceneActivated,
    /// A scene switch started its lead-out animation
    TransitionStarted,
    /// A scene switch finished its lead-in animation
    TransitionFinished,
    /// A scene switch was abandoned; the previous scene stays active
    TransitionAborted,
    /// Hotspot markers became visible
    HotspotsShown,
    /// Hotspot markers were hidden (toggle, auto-hide or scene switch)
    HotspotsHidden,
    /// The camera of the visible scene turned
    ViewChanged,
    /// The "tap to show navigation" hint appeared
    TapHintShown,
    /// The "tap to show navigation" hint disappeared
    TapHintHidden,
}

/// Variant for type-safe event arguments
/// Uses key-value pairs to avoid order dependency problems
#[derive(Debug, Clone, PartialEq)]
pub enum EventArg {
    /// Scene identifier
    SceneId(String),
    /// Floor number
    Floor(i32),
    /// Camera yaw in radians
    Bearing(f32),
    /// Human-readable explanation
    Reason(String),
}

/// Event with type ID and key-value arguments
#[derive(Debug, Clone)]
pub struct Event {
    /// Type of event
    pub event_type: EventType,
    /// Session time when the event was created (seconds)
    pub timestamp: f64,
    args: HashMap<&'static str, EventArg>,
}

impl Event {
    /// Create a new event with the given type and timestamp
    pub fn new(event_type: EventType, timestamp: f64) -> Self {
        Self {
            event_type,
            timestamp,
            args: HashMap::new(),
        }
    }

    /// Add an argument to the event (builder pattern)
    pub fn with_arg(mut self, key: &'static str, value: EventArg) -> Self {
        self.args.insert(key, value);
        self
    }

    /// Add the `scene_id` argument
    pub fn with_scene(self, scene_id: impl Into<String>) -> Self {
        self.with_arg("scene_id", EventArg::SceneId(scene_id.into()))
    }

    /// Get an argument by key
    pub fn get_arg(&self, key: &str) -> Option<&EventArg> {
        self.args.get(key)
    }

    /// Get scene_id argument if present
    pub fn get_scene_id(&self) -> Option<&str> {
        if let Some(EventArg::SceneId(id)) = self.get_arg("scene_id") {
            Some(id)
        } else {
            None
        }
    }

    /// Get floor argument if present
    pub fn get_floor(&self) -> Option<i32> {
        if let Some(EventArg::Floor(floor)) = self.get_arg("floor") {
            Some(*floor)
        } else {
            None
        }
    }

    /// Get bearing argument if present
    pub fn get_bearing(&self) -> Option<f32> {
        if let Some(EventArg::Bearing(bearing)) = self.get_arg("bearing") {
            Some(*bearing)
        } else {
            None
        }
    }

    /// Get reason argument if present
    pub fn get_reason(&self) -> Option<&str> {
        if let Some(EventArg::Reason(reason)) = self.get_arg("reason") {
            Some(reason)
        } else {
            None
        }
    }
}

/// Event handler trait
/// Returns true if event was consumed (stops forwarding)
/// Returns false to allow forwarding to other handlers
pub trait EventHandler {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, event: &Event) -> bool;
}

/// Event system with registration and queuing
/// Follows chain of responsibility pattern
pub struct EventSystem {
    queue: Vec<Event>,
    handlers: HashMap<EventType, Vec<Box<dyn EventHandler>>>,
    current_time: f64,
    dispatched: u64,
}

impl EventSystem {
    /// Create a new empty event system
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            handlers: HashMap::new(),
            current_time: 0.0,
            dispatched: 0,
        }
    }

    /// Update current time (seconds since start)
    pub fn update_time(&mut self, time: f64) {
        self.current_time = time;
    }

    /// Current time used to stamp new events
    pub fn now(&self) -> f64 {
        self.current_time
    }

    /// Register a handler for a specific event type
    /// Only handlers registered for this type will be notified
    pub fn register_handler(&mut self, event_type: EventType, handler: Box<dyn EventHandler>) {
        self.handlers
            .entry(event_type)
            .or_default()
            .push(handler);
    }

    /// Queue an event for the next dispatch
    pub fn send(&mut self, event: Event) {
        log::trace!("Queued {:?}", event.event_type);
        self.queue.push(event);
    }

    /// Create an event of `event_type` stamped with the current time
    pub fn stamp(&self, event_type: EventType) -> Event {
        Event::new(event_type, self.current_time)
    }

    /// Events waiting for dispatch
    pub fn pending(&self) -> &[Event] {
        &self.queue
    }

    /// Total events dispatched since creation
    pub fn dispatched_count(&self) -> u64 {
        self.dispatched
    }

    /// Dispatch all pending events in the order they were queued
    pub fn dispatch(&mut self) {
        let queued = std::mem::take(&mut self.queue);
        for event in queued {
            self.dispatch_event(&event);
            self.dispatched += 1;
        }
    }

    /// Dispatch single event to registered handlers
    /// Stops on first handler that returns true (consumed)
    fn dispatch_event(&mut self, event: &Event) {
        if let Some(handlers) = self.handlers.get_mut(&event.event_type) {
            for handler in handlers.iter_mut() {
                if handler.on_event(event) {
                    // Event consumed, stop forwarding
                    break;
                }
            }
        }
    }

    /// Drop all queued events
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new()
    }
}
