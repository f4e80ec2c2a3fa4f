#![forbid(unsafe_code)]

//! Core: validity model, control capabilities, events, and connection epochs.
//!
//! Everything in this crate is host-agnostic. The document model lives in
//! `formerr-dom`; the `<form-error>` binding lives in `formerr-widgets`.

pub mod control;
pub mod epoch;
pub mod event;
pub mod fragment;
pub mod logging;
pub mod validity;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace, warn};

pub use control::{ControlKind, FormControl, InputType};
pub use epoch::{ConnectionToken, Epoch, EpochSource};
pub use event::{EventType, KeyCode};
pub use fragment::{Fragment, FragmentNode};
pub use validity::{UnknownValidityKind, ValidityFlags, ValidityKind, ValidityState};
