#![forbid(unsafe_code)]

//! Connection epochs: generation-counter cancellation for listener sets.
//!
//! Every time a binding wires itself to a control it begins a new epoch and
//! receives a [`ConnectionToken`]. Listeners registered under that token stay
//! live only while the epoch is current. Beginning another epoch, or calling
//! [`EpochSource::invalidate`], retires every token of the previous epoch at
//! once, synchronously, with no per-listener bookkeeping.
//!
//! # Invariants
//!
//! - Epochs are strictly monotonic per source: `epoch_n < epoch_{n+1}`.
//! - Epoch 0 is reserved for "nothing connected".
//! - At most one epoch per source is live at any time.
//!
//! Single-threaded by construction: tokens share an `Rc<Cell<_>>` with their
//! source.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Identifier of one connection epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Epoch(u64);

impl Epoch {
    /// The null epoch: nothing connected.
    pub const NONE: Self = Self(0);

    /// Create an epoch from a raw value (for tests and traces).
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whether this is [`Epoch::NONE`].
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Epoch({})", self.0)
    }
}

/// Issues epochs and tracks which one is current.
#[derive(Debug)]
pub struct EpochSource {
    next: u64,
    current: Rc<Cell<u64>>,
}

impl Default for EpochSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EpochSource {
    /// Create a source with no live epoch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: 1,
            current: Rc::new(Cell::new(Epoch::NONE.raw())),
        }
    }

    /// Retire the current epoch (if any) and start a new one.
    pub fn begin(&mut self) -> ConnectionToken {
        let epoch = Epoch(self.next);
        self.next += 1;
        self.current.set(epoch.raw());
        ConnectionToken {
            epoch,
            current: Rc::clone(&self.current),
        }
    }

    /// Retire the current epoch without starting another.
    ///
    /// Returns the epoch that was retired, or [`Epoch::NONE`].
    pub fn invalidate(&mut self) -> Epoch {
        Epoch(self.current.replace(Epoch::NONE.raw()))
    }

    /// The live epoch, or [`Epoch::NONE`].
    #[must_use]
    pub fn current(&self) -> Epoch {
        Epoch(self.current.get())
    }
}

/// Handle carried by every listener of one epoch.
#[derive(Clone)]
pub struct ConnectionToken {
    epoch: Epoch,
    current: Rc<Cell<u64>>,
}

impl ConnectionToken {
    /// The epoch this token belongs to.
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Whether the token's epoch is still the source's current epoch.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.epoch.is_none() && self.current.get() == self.epoch.raw()
    }
}

impl fmt::Debug for ConnectionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionToken")
            .field("epoch", &self.epoch)
            .field("live", &self.is_live())
            .finish()
    }
}
