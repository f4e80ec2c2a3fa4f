#![forbid(unsafe_code)]

//! Binding lifecycle state and per-connection wiring.
//!
//! ```text
//! Unattached --connect--> Resolving --resolved--> Wired
//!      ^                     ^  |                   |
//!      |                     |  +--(inert)          |
//!      |                     +------ `for` changed -+
//!      +------------------- disconnect -------------+
//! ```
//!
//! Every transition out of `Wired` retires the connection epoch, so the
//! listeners installed for it die before any new ones are registered.

use std::fmt;

use formerr_core::epoch::{ConnectionToken, Epoch, EpochSource};
use formerr_dom::NodeId;

/// Where a binding is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BindingState {
    /// Not connected to the document.
    #[default]
    Unattached,
    /// Connected, but the control is missing, ineligible, or a required
    /// template is absent.
    Resolving,
    /// Listeners are installed on the control and its form.
    Wired,
}

impl BindingState {
    /// Name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unattached => "unattached",
            Self::Resolving => "resolving",
            Self::Wired => "wired",
        }
    }
}

impl fmt::Display for BindingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a finished epoch was attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EndedWiring {
    pub(crate) epoch: Epoch,
    pub(crate) control: NodeId,
    pub(crate) pushed_custom: Option<String>,
}

/// Bookkeeping for the current connection epoch.
#[derive(Debug, Default)]
pub(crate) struct Wiring {
    epochs: EpochSource,
    control: Option<NodeId>,
    form: Option<NodeId>,
    pushed_custom: Option<String>,
}

impl Wiring {
    /// Start an epoch bound to `control` (and its owning `form`).
    pub(crate) fn begin(&mut self, control: NodeId, form: Option<NodeId>) -> ConnectionToken {
        self.control = Some(control);
        self.form = form;
        self.pushed_custom = None;
        self.epochs.begin()
    }

    /// Retire the current epoch. `None` if nothing was wired.
    pub(crate) fn end(&mut self) -> Option<EndedWiring> {
        let control = self.control.take()?;
        self.form = None;
        Some(EndedWiring {
            epoch: self.epochs.invalidate(),
            control,
            pushed_custom: self.pushed_custom.take(),
        })
    }

    /// Remember a custom validity message pushed during this epoch.
    pub(crate) fn record_push(&mut self, message: String) {
        self.pushed_custom = Some(message);
    }

    pub(crate) fn control(&self) -> Option<NodeId> {
        self.control
    }

    pub(crate) fn form(&self) -> Option<NodeId> {
        self.form
    }

    pub(crate) fn epoch(&self) -> Epoch {
        self.epochs.current()
    }
}
