#![forbid(unsafe_code)]

//! Listener table with connection-token gating.
//!
//! Listeners may be registered with a [`ConnectionToken`]. A listener whose
//! token has been retired is dead: it is skipped even if a dispatch already
//! snapshotted it, and it is pruned the next time the table is touched.
//! Retiring a token therefore deregisters every listener of that epoch in a
//! single synchronous step.

use std::fmt;
use std::rc::Rc;

use formerr_core::epoch::ConnectionToken;
use formerr_core::event::EventType;

use crate::event::Event;
use crate::{Document, NodeId};

/// Callback signature for event listeners.
pub type ListenerFn = dyn Fn(&Document, &mut Event);

/// Handle identifying one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

struct Entry {
    id: ListenerId,
    target: NodeId,
    ty: EventType,
    token: Option<ConnectionToken>,
    callback: Rc<ListenerFn>,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.token.as_ref().is_none_or(ConnectionToken::is_live)
    }
}

/// All listeners of one document.
pub(crate) struct ListenerTable {
    next_id: u64,
    entries: Vec<Entry>,
}

impl fmt::Debug for ListenerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerTable")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ListenerTable {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }

    pub(crate) fn add(
        &mut self,
        target: NodeId,
        ty: EventType,
        token: Option<ConnectionToken>,
        callback: Rc<ListenerFn>,
    ) -> ListenerId {
        self.prune();
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            target,
            ty,
            token,
            callback,
        });
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    /// Whether `id` is registered and its token is live.
    pub(crate) fn is_active(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|e| e.id == id && e.is_live())
    }

    /// Live listeners for `(target, ty)` in registration order.
    pub(crate) fn snapshot(
        &mut self,
        target: NodeId,
        ty: EventType,
    ) -> Vec<(ListenerId, Rc<ListenerFn>)> {
        self.prune();
        self.entries
            .iter()
            .filter(|e| e.target == target && e.ty == ty)
            .map(|e| (e.id, Rc::clone(&e.callback)))
            .collect()
    }

    /// Number of live listeners attached to `target`.
    pub(crate) fn live_count(&self, target: NodeId) -> usize {
        self.entries
            .iter()
            .filter(|e| e.target == target && e.is_live())
            .count()
    }

    /// Drop every listener whose token has been retired.
    pub(crate) fn prune(&mut self) {
        self.entries.retain(Entry::is_live);
    }

    /// Drop every listener attached to `target`.
    pub(crate) fn forget_target(&mut self, target: NodeId) {
        self.entries.retain(|e| e.target != target);
    }
}
