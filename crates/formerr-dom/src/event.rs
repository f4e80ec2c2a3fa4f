#![forbid(unsafe_code)]

//! Dispatched event objects.

use formerr_core::event::{EventType, KeyCode};

use crate::NodeId;

/// An event travelling through the document.
///
/// Propagation flags default from [`EventType`]; `prevent_default` has no
/// effect on non-cancelable events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    ty: EventType,
    target: NodeId,
    current_target: NodeId,
    key: Option<KeyCode>,
    bubbles: bool,
    cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_stopped: bool,
}

impl Event {
    /// Create an event of `ty` aimed at `target`.
    #[must_use]
    pub fn new(ty: EventType, target: NodeId) -> Self {
        Self {
            ty,
            target,
            current_target: target,
            key: None,
            bubbles: ty.bubbles(),
            cancelable: ty.cancelable(),
            default_prevented: false,
            propagation_stopped: false,
            immediate_stopped: false,
        }
    }

    /// Create a `keydown` event for `key`.
    #[must_use]
    pub fn key_down(target: NodeId, key: KeyCode) -> Self {
        Self {
            key: Some(key),
            ..Self::new(EventType::KeyDown, target)
        }
    }

    /// Override the bubbling default.
    #[must_use]
    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    /// Event type.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.ty
    }

    /// Node the event was dispatched to.
    #[must_use]
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Node whose listeners are currently running.
    #[must_use]
    pub fn current_target(&self) -> NodeId {
        self.current_target
    }

    pub(crate) fn set_current_target(&mut self, node: NodeId) {
        self.current_target = node;
    }

    /// Key for `keydown` events.
    #[must_use]
    pub fn key(&self) -> Option<KeyCode> {
        self.key
    }

    /// Whether the event propagates to ancestors.
    #[must_use]
    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Whether the default action may be prevented.
    #[must_use]
    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    /// Cancel the default action, if cancelable.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Whether a listener cancelled the default action.
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stop propagation after the current node's listeners finish.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Stop propagation and skip the remaining listeners on this node.
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_stopped = true;
    }

    pub(crate) fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub(crate) fn immediate_stopped(&self) -> bool {
        self.immediate_stopped
    }
}
