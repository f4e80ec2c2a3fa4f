#![forbid(unsafe_code)]

//! Registry of connected bindings.
//!
//! The registry is injected when the element is defined; bindings add
//! themselves on connection and remove themselves on disconnection.
//! Iteration follows insertion order and entries are unique by identity.
//! Bindings only hold the registry weakly; it is owned by its handles.

use std::cell::RefCell;
use std::rc::Rc;

use formerr_dom::NodeId;

use crate::binding::FormError;

/// Shared handle passed to [`crate::define_form_error`].
///
/// Do not hold a borrow across document mutations: bindings update the
/// registry from their lifecycle reactions.
pub type SharedRegistry = Rc<RefCell<BindingRegistry>>;

/// Connected bindings, in insertion order.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: Vec<FormError>,
}

impl BindingRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry behind a shared handle.
    #[must_use]
    pub fn shared() -> SharedRegistry {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Add `binding`. Returns `false` if it is already present.
    pub fn add(&mut self, binding: FormError) -> bool {
        if self.contains(&binding) {
            return false;
        }
        self.bindings.push(binding);
        true
    }

    /// Remove `binding`. Returns whether it was present.
    pub fn remove(&mut self, binding: &FormError) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|b| !b.ptr_eq(binding));
        before != self.bindings.len()
    }

    /// Whether `binding` is registered.
    #[must_use]
    pub fn contains(&self, binding: &FormError) -> bool {
        self.bindings.iter().any(|b| b.ptr_eq(binding))
    }

    /// Binding whose element is `node`.
    #[must_use]
    pub fn find(&self, node: NodeId) -> Option<&FormError> {
        self.bindings.iter().find(|b| b.node() == node)
    }

    /// Registered bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FormError> {
        self.bindings.iter()
    }

    /// Element ids of registered bindings in insertion order.
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeId> {
        self.bindings.iter().map(FormError::node).collect()
    }

    /// Number of registered bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<'a> IntoIterator for &'a BindingRegistry {
    type Item = &'a FormError;
    type IntoIter = std::slice::Iter<'a, FormError>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::FormErrorOptions;

    fn binding(raw: u32) -> FormError {
        FormError::new(NodeId::from_raw(raw), FormErrorOptions::default(), None)
    }

    #[test]
    fn dedups_by_identity() {
        let mut registry = BindingRegistry::new();
        let a = binding(1);
        assert!(registry.add(a.clone()));
        assert!(!registry.add(a.clone()));
        assert_eq!(registry.len(), 1);

        let twin = binding(1);
        assert!(registry.add(twin));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn keeps_insertion_order() {
        let mut registry = BindingRegistry::new();
        let (a, b, c) = (binding(3), binding(1), binding(2));
        registry.add(a.clone());
        registry.add(b.clone());
        registry.add(c);
        assert_eq!(
            registry.nodes(),
            vec![NodeId::from_raw(3), NodeId::from_raw(1), NodeId::from_raw(2)]
        );

        assert!(registry.remove(&b));
        assert!(!registry.remove(&b));
        assert_eq!(registry.nodes(), vec![NodeId::from_raw(3), NodeId::from_raw(2)]);
        assert!(registry.find(NodeId::from_raw(3)).is_some_and(|f| f.ptr_eq(&a)));
        assert_eq!((&registry).into_iter().count(), 2);
    }
}
