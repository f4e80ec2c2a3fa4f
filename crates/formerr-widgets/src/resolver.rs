#![forbid(unsafe_code)]

//! Control resolution.
//!
//! Lookups are never cached: the document is shared state and the referenced
//! control may be replaced at any time.

use formerr_core::control::ControlKind;
use formerr_core::debug;
use formerr_dom::{Document, NodeId};

/// Element with id `control_ref`, if any. Empty references resolve to nothing.
#[must_use]
pub fn resolve(doc: &Document, control_ref: &str) -> Option<NodeId> {
    doc.get_element_by_id(control_ref)
}

/// Whether `node` is a control a binding may attach to.
///
/// Field sets, selects, text areas, outputs, and inputs other than
/// `type=image` qualify.
#[must_use]
pub fn is_eligible(doc: &Document, node: NodeId) -> bool {
    doc.control_kind(node).is_some_and(ControlKind::is_eligible)
}

/// [`resolve`] filtered by [`is_eligible`].
#[must_use]
pub fn resolve_eligible(doc: &Document, control_ref: &str) -> Option<NodeId> {
    let Some(node) = resolve(doc, control_ref) else {
        debug!(control_ref, "control not found");
        return None;
    };
    if !is_eligible(doc, node) {
        debug!(control_ref, node = %node, "element is not an eligible control");
        return None;
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_element(doc: &Document, tag: &str, id: &str) -> NodeId {
        let node = doc.create_element(tag);
        doc.set_attribute(node, "id", id).unwrap();
        doc.append_child(doc.body(), node).unwrap();
        node
    }

    #[test]
    fn eligible_tags() {
        let doc = Document::new();
        for tag in ["fieldset", "input", "select", "textarea", "output"] {
            let node = with_element(&doc, tag, tag);
            assert!(is_eligible(&doc, node), "{tag} should be eligible");
            assert_eq!(resolve_eligible(&doc, tag), Some(node));
        }
    }

    #[test]
    fn image_inputs_and_plain_elements_are_rejected() {
        let doc = Document::new();
        let image = with_element(&doc, "input", "pic");
        doc.set_attribute(image, "type", "image").unwrap();
        let div = with_element(&doc, "div", "box");

        assert_eq!(resolve(&doc, "pic"), Some(image));
        assert_eq!(resolve_eligible(&doc, "pic"), None);
        assert_eq!(resolve(&doc, "box"), Some(div));
        assert_eq!(resolve_eligible(&doc, "box"), None);
    }

    #[test]
    fn resolution_is_not_memoized() {
        let doc = Document::new();
        let first = with_element(&doc, "input", "email");
        assert_eq!(resolve(&doc, "email"), Some(first));

        doc.remove(first).unwrap();
        assert_eq!(resolve(&doc, "email"), None);

        let second = with_element(&doc, "textarea", "email");
        assert_eq!(resolve(&doc, "email"), Some(second));
    }

    #[test]
    fn empty_reference_resolves_to_nothing() {
        let doc = Document::new();
        assert_eq!(resolve_eligible(&doc, ""), None);
    }
}
