#![forbid(unsafe_code)]

//! formerr public facade crate.
//!
//! Re-exports the document model and the `<form-error>` binding, and offers
//! a prelude plus a crate-wide [`Error`] for applications that touch more
//! than one layer.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use formerr_core::{
    ConnectionToken, ControlKind, Epoch, EpochSource, EventType, FormControl, Fragment,
    FragmentNode, InputType, KeyCode, UnknownValidityKind, ValidityKind, ValidityState,
};

// --- Document re-exports ---------------------------------------------------

pub use formerr_dom::{
    ControlElement, Document, DomError, ElementDefinition, ElementReactions, Event, ListenerId,
    NodeId,
};

// --- Binding re-exports ----------------------------------------------------

#[cfg(feature = "serde")]
pub use formerr_widgets::OptionsError;
pub use formerr_widgets::{
    BindingRegistry, BindingState, ClearNotify, FORM_ERROR_TAG, FormError, FormErrorOptions,
    Message, MessageSource, PatternError, PatternFilter, SharedRegistry, ValidityFilter,
    define_form_error,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for formerr apps.
#[derive(Debug)]
pub enum Error {
    /// Structural document operation failed.
    Dom(DomError),
    /// A pattern filter failed to compile.
    Pattern(PatternError),
    /// A validity-kind name was not recognized.
    UnknownValidityKind(UnknownValidityKind),
    /// Options could not be loaded.
    #[cfg(feature = "serde")]
    Options(OptionsError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dom(err) => write!(f, "{err}"),
            Self::Pattern(err) => write!(f, "{err}"),
            Self::UnknownValidityKind(err) => write!(f, "{err}"),
            #[cfg(feature = "serde")]
            Self::Options(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dom(err) => Some(err),
            Self::Pattern(err) => Some(err),
            Self::UnknownValidityKind(err) => Some(err),
            #[cfg(feature = "serde")]
            Self::Options(err) => Some(err),
        }
    }
}

impl From<DomError> for Error {
    fn from(err: DomError) -> Self {
        Self::Dom(err)
    }
}

impl From<PatternError> for Error {
    fn from(err: PatternError) -> Self {
        Self::Pattern(err)
    }
}

impl From<UnknownValidityKind> for Error {
    fn from(err: UnknownValidityKind) -> Self {
        Self::UnknownValidityKind(err)
    }
}

#[cfg(feature = "serde")]
impl From<OptionsError> for Error {
    fn from(err: OptionsError) -> Self {
        Self::Options(err)
    }
}

/// Standard result type for formerr APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ClearNotify, Document, Error, EventType, FormError, FormErrorOptions, KeyCode, NodeId,
        Result, ValidityKind, ValidityState, define_form_error,
    };

    pub use crate::{core, dom, widgets};
}

pub use formerr_core as core;
pub use formerr_dom as dom;
pub use formerr_widgets as widgets;
