#![forbid(unsafe_code)]

//! The `<form-error>` binding.
//!
//! A `<form-error for="email">` element shows the validation message of the
//! control with id `email` whenever the control fires `invalid`, and clears
//! it again when the user fixes the value, blurs the control, presses Enter,
//! or resets the form.
//!
//! # Example
//!
//! ```
//! use formerr_core::validity::{ValidityKind, ValidityState};
//! use formerr_dom::Document;
//! use formerr_widgets::{FormError, FormErrorOptions, define_form_error};
//!
//! let doc = Document::new();
//! define_form_error(&doc, FormErrorOptions::default(), None).unwrap();
//!
//! let input = doc.create_element("input");
//! doc.set_attribute(input, "id", "email").unwrap();
//! doc.set_attribute(input, "type", "email").unwrap();
//! doc.append_child(doc.body(), input).unwrap();
//!
//! let error = doc.create_element("form-error");
//! doc.set_attribute(error, "for", "email").unwrap();
//! doc.append_child(doc.body(), error).unwrap();
//!
//! doc.set_validity(input, ValidityState::new().with(ValidityKind::TypeMismatch))
//!     .unwrap();
//! doc.report_validity(input);
//!
//! let binding = FormError::from_node(&doc, error).unwrap();
//! assert_eq!(binding.rendered_text(), "Please enter an email address.");
//! ```

pub mod binding;
pub mod lifecycle;
pub mod matcher;
pub mod options;
pub mod pattern;
pub mod presenter;
pub mod registry;
pub mod resolver;

use std::rc::Rc;

use formerr_dom::{Document, DomError};

pub use binding::{ALERT_ROLE, FormError, FormErrorDefinition, OBSERVED_ATTRIBUTES};
pub use lifecycle::BindingState;
pub use matcher::ValidityFilter;
#[cfg(feature = "serde")]
pub use options::OptionsError;
pub use options::{ClearNotify, FormErrorOptions};
pub use pattern::{PatternError, PatternFilter, PatternSource};
pub use presenter::{ContentRegion, CustomContent, Message, MessageSource};
pub use registry::{BindingRegistry, SharedRegistry};

/// Tag name the binding is registered under.
pub const FORM_ERROR_TAG: &str = "form-error";

/// Register the `<form-error>` definition on `doc`.
///
/// Existing `<form-error>` elements are upgraded immediately; later ones are
/// upgraded on creation. Fails if the tag is already defined.
pub fn define_form_error(
    doc: &Document,
    options: FormErrorOptions,
    registry: Option<SharedRegistry>,
) -> Result<(), DomError> {
    doc.define(
        FORM_ERROR_TAG,
        Rc::new(FormErrorDefinition::new(options, registry)),
    )
}
