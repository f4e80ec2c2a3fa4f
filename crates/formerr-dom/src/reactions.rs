#![forbid(unsafe_code)]

//! Custom element reactions.
//!
//! A definition registered with [`Document::define`] upgrades every element
//! carrying its tag into an object implementing [`ElementReactions`]. The
//! document then calls the reactions when the element enters or leaves the
//! connected tree and when an observed attribute changes.
//!
//! Reactions are always invoked with no internal document borrow held, so a
//! reaction may freely read, mutate, and dispatch on the document.

use std::any::Any;
use std::rc::Rc;

use crate::{Document, NodeId};

/// Lifecycle callbacks of an upgraded element.
pub trait ElementReactions: Any {
    /// Attribute names whose changes are reported.
    fn observed_attributes(&self) -> &'static [&'static str];

    /// The element became connected to the document.
    fn connected(&self, _doc: &Document) {}

    /// The element was removed from the connected tree.
    fn disconnected(&self, _doc: &Document) {}

    /// An observed attribute was set or removed.
    fn attribute_changed(
        &self,
        _doc: &Document,
        _name: &str,
        _old: Option<&str>,
        _new: Option<&str>,
    ) {
    }

    /// Access for downcasting to the concrete reaction type.
    fn as_any(&self) -> &dyn Any;
}

/// Factory turning a plain element into an upgraded one.
pub trait ElementDefinition {
    /// Build the reactions object for `node`.
    fn upgrade(&self, doc: &Document, node: NodeId) -> Rc<dyn ElementReactions>;
}

/// Whether `name` is a valid custom element name.
///
/// Requires a lowercase ASCII letter first, at least one hyphen, and only
/// lowercase letters, digits, `-`, `.` or `_`.
#[must_use]
pub fn is_valid_custom_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_lowercase()
        && name.contains('-')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "-._".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_element_names() {
        assert!(is_valid_custom_element_name("form-error"));
        assert!(is_valid_custom_element_name("x-a.b_c1"));
        assert!(!is_valid_custom_element_name("formerror"));
        assert!(!is_valid_custom_element_name("Form-Error"));
        assert!(!is_valid_custom_element_name("-error"));
        assert!(!is_valid_custom_element_name(""));
    }
}
