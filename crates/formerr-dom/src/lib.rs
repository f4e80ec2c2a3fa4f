#![forbid(unsafe_code)]

//! `formerr-dom` is a headless, host-driven document model.
//!
//! It provides exactly the platform surface a `<form-error>` binding relies
//! on:
//! - **Element tree** with id lookup, attributes, templates, and text.
//! - **Controls** implementing [`FormControl`], with host-supplied validity.
//! - **Events** with bubbling, cancellation, and token-gated listeners.
//! - **Custom element reactions** (connected, disconnected, attribute
//!   changed).
//! - **Constraint validation entry points** (`report_validity`,
//!   `request_submit`, `reset`) that fire `invalid`, `submit`, and `reset`
//!   the way a browser would.
//!
//! The document is single-threaded and uses interior mutability: every method
//! takes `&self`, and no internal borrow is held while listeners or reactions
//! run. A browser embedding would implement the same surface over the real
//! DOM instead.
//!
//! # Example
//!
//! ```
//! use formerr_core::validity::{ValidityKind, ValidityState};
//! use formerr_dom::Document;
//!
//! let doc = Document::new();
//! let input = doc.create_element("input");
//! doc.set_attribute(input, "id", "email").unwrap();
//! doc.append_child(doc.body(), input).unwrap();
//!
//! doc.set_validity(input, ValidityState::new().with(ValidityKind::ValueMissing))
//!     .unwrap();
//! assert_eq!(doc.get_element_by_id("email"), Some(input));
//! assert!(!doc.report_validity(input));
//! ```

pub mod controls;
pub mod event;
pub mod listener;
pub mod reactions;
mod validation;

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use formerr_core::control::{ControlKind, FormControl, InputType};
use formerr_core::epoch::ConnectionToken;
use formerr_core::event::EventType;
use formerr_core::fragment::{Fragment, FragmentNode};
use formerr_core::validity::ValidityState;
use formerr_core::{debug, trace};

pub use controls::ControlElement;
pub use event::Event;
pub use listener::{ListenerFn, ListenerId};
pub use reactions::{ElementDefinition, ElementReactions};
pub use validation::MAX_NATIVE_REPORTS;

use listener::ListenerTable;

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Identifier of a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Create an id from a raw value (for tests and traces).
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Raw value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// DomError
// ---------------------------------------------------------------------------

/// Errors from structural document operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// No node with this id exists.
    UnknownNode(NodeId),
    /// The node is a text or document node.
    NotAnElement(NodeId),
    /// The element is not a form control.
    NotAControl(NodeId),
    /// The element is not a `<template>`.
    NotATemplate(NodeId),
    /// The insertion would create a cycle or attach under a text node.
    HierarchyRequest { parent: NodeId, child: NodeId },
    /// Custom element names need a lowercase first letter and a hyphen.
    InvalidCustomElementName(String),
    /// A definition for this name already exists.
    AlreadyDefined(String),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "unknown node {id}"),
            Self::NotAnElement(id) => write!(f, "node {id} is not an element"),
            Self::NotAControl(id) => write!(f, "node {id} is not a form control"),
            Self::NotATemplate(id) => write!(f, "node {id} is not a template"),
            Self::HierarchyRequest { parent, child } => {
                write!(f, "cannot insert {child} under {parent}")
            }
            Self::InvalidCustomElementName(name) => {
                write!(f, "invalid custom element name: {name:?}")
            }
            Self::AlreadyDefined(name) => write!(f, "custom element {name:?} already defined"),
        }
    }
}

impl std::error::Error for DomError {}

// ---------------------------------------------------------------------------
// Tree storage
// ---------------------------------------------------------------------------

const ROOT: NodeId = NodeId(0);
const BODY: NodeId = NodeId(1);

enum ElementKind {
    Form,
    Control(ControlElement),
    Template(Fragment),
    Generic,
}

struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    kind: ElementKind,
    reactions: Option<Rc<dyn ElementReactions>>,
    error_message_elements: Vec<NodeId>,
}

impl Element {
    fn new(tag: String) -> Self {
        let kind = match tag.as_str() {
            "form" => ElementKind::Form,
            "template" => ElementKind::Template(Fragment::new()),
            other => ControlElement::for_tag(other).map_or(ElementKind::Generic, ElementKind::Control),
        };
        Self {
            tag,
            attributes: Vec::new(),
            kind,
            reactions: None,
            error_message_elements: Vec::new(),
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn set_attribute(&mut self, name: &str, value: Option<&str>) -> Option<String> {
        let pos = self.attributes.iter().position(|(n, _)| n == name);
        let old = match (pos, value) {
            (Some(i), Some(v)) => Some(std::mem::replace(&mut self.attributes[i].1, v.to_owned())),
            (Some(i), None) => Some(self.attributes.remove(i).1),
            (None, Some(v)) => {
                self.attributes.push((name.to_owned(), v.to_owned()));
                None
            }
            (None, None) => None,
        };
        self.reflect(name, value);
        old
    }

    /// Keep control state in step with the attributes it mirrors.
    fn reflect(&mut self, name: &str, value: Option<&str>) {
        let ElementKind::Control(control) = &mut self.kind else {
            return;
        };
        match name {
            "title" => control.core_mut().set_title(value),
            "value" => control.core_mut().set_default_value(value.unwrap_or_default()),
            "type" => {
                if let ControlElement::Input(input) = control {
                    input.set_input_type(InputType::from_attribute(value.unwrap_or_default()));
                }
            }
            _ => {}
        }
    }

    fn control(&self) -> Option<&ControlElement> {
        match &self.kind {
            ElementKind::Control(c) => Some(c),
            _ => None,
        }
    }
}

enum NodeData {
    Document,
    Text(String),
    Element(Element),
}

struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes
            .get(id.0 as usize)
            .ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes
            .get_mut(id.0 as usize)
            .ok_or(DomError::UnknownNode(id))
    }

    fn element(&self, id: NodeId) -> Result<&Element, DomError> {
        match &self.node(id)?.data {
            NodeData::Element(e) => Ok(e),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(e) => Ok(e),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    fn control(&self, id: NodeId) -> Option<&ControlElement> {
        self.element(id).ok().and_then(Element::control)
    }

    fn control_mut(&mut self, id: NodeId) -> Option<&mut ControlElement> {
        match &mut self.element_mut(id).ok()?.kind {
            ElementKind::Control(c) => Some(c),
            _ => None,
        }
    }

    fn is_form(&self, id: NodeId) -> bool {
        matches!(
            self.element(id).map(|e| &e.kind),
            Ok(ElementKind::Form)
        )
    }

    /// `node` followed by its ancestors, nearest first.
    fn inclusive_ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = vec![node];
        let mut cursor = self.node(node).ok().and_then(|n| n.parent);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.node(id).ok().and_then(|n| n.parent);
        }
        out
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.inclusive_ancestors(node).last() == Some(&ROOT)
    }

    /// Subtree rooted at `from`, in tree order.
    fn preorder(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let Ok(node) = self.node(id) else {
                continue;
            };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    fn fragment_of(&self, id: NodeId) -> Option<FragmentNode> {
        let node = self.node(id).ok()?;
        match &node.data {
            NodeData::Text(data) => Some(FragmentNode::Text(data.clone())),
            NodeData::Element(e) if matches!(e.kind, ElementKind::Template(_)) => None,
            NodeData::Element(e) => Some(FragmentNode::Element {
                tag: e.tag.clone(),
                attributes: e.attributes.clone(),
                children: node
                    .children
                    .iter()
                    .filter_map(|c| self.fragment_of(*c))
                    .collect(),
            }),
            NodeData::Document => None,
        }
    }

    /// Recompute every fieldset's aggregate of its descendant controls.
    fn refresh_fieldsets(&mut self) {
        let fieldsets: Vec<NodeId> = (0..self.nodes.len() as u32)
            .map(NodeId)
            .filter(|id| matches!(self.control(*id), Some(ControlElement::FieldSet(_))))
            .collect();
        for fieldset in fieldsets {
            let aggregate = self
                .preorder(fieldset)
                .into_iter()
                .skip(1)
                .filter_map(|id| self.control(id).map(ControlElement::own_validity))
                .fold(ValidityState::VALID, ValidityState::union);
            if let Some(ControlElement::FieldSet(fs)) = self.control_mut(fieldset) {
                fs.set_descendant_validity(aggregate);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A single-threaded document: tree, listeners, and element definitions.
pub struct Document {
    tree: RefCell<Tree>,
    listeners: RefCell<ListenerTable>,
    definitions: RefCell<HashMap<String, Rc<dyn ElementDefinition>>>,
    native_reports: RefCell<VecDeque<NodeId>>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.tree.borrow().nodes.len())
            .field("listeners", &*self.listeners.borrow())
            .field("definitions", &self.definitions.borrow().len())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
enum Lifecycle {
    Connected,
    Disconnected,
}

impl Document {
    /// Create a document holding an empty `<body>`.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Tree { nodes: Vec::new() };
        let root = tree.push(NodeData::Document);
        let body = tree.push(NodeData::Element(Element::new("body".to_owned())));
        debug_assert_eq!((root, body), (ROOT, BODY));
        tree.nodes[BODY.0 as usize].parent = Some(ROOT);
        tree.nodes[ROOT.0 as usize].children.push(BODY);
        Self {
            tree: RefCell::new(tree),
            listeners: RefCell::new(ListenerTable::new()),
            definitions: RefCell::new(HashMap::new()),
            native_reports: RefCell::new(VecDeque::new()),
        }
    }

    /// The document node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// The `<body>` element.
    #[must_use]
    pub fn body(&self) -> NodeId {
        BODY
    }

    // -- Construction -------------------------------------------------------

    /// Create a detached element. Upgrades it if its tag has a definition.
    pub fn create_element(&self, tag: &str) -> NodeId {
        let tag = tag.to_ascii_lowercase();
        let definition = self.definitions.borrow().get(&tag).cloned();
        let id = self
            .tree
            .borrow_mut()
            .push(NodeData::Element(Element::new(tag)));
        if let Some(definition) = definition {
            let reactions = definition.upgrade(self, id);
            if let Ok(element) = self.tree.borrow_mut().element_mut(id) {
                element.reactions = Some(reactions);
            }
        }
        id
    }

    /// Create a detached text node.
    pub fn create_text(&self, data: &str) -> NodeId {
        self.tree
            .borrow_mut()
            .push(NodeData::Text(data.to_owned()))
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        {
            let tree = self.tree.borrow();
            let parent_node = tree.node(parent)?;
            tree.node(child)?;
            let hierarchy = DomError::HierarchyRequest { parent, child };
            if matches!(parent_node.data, NodeData::Text(_)) || child == ROOT {
                return Err(hierarchy);
            }
            if tree.inclusive_ancestors(parent).contains(&child) {
                return Err(hierarchy);
            }
        }
        if self.parent(child).is_some() {
            self.remove(child)?;
        }
        {
            let mut tree = self.tree.borrow_mut();
            tree.node_mut(parent)?.children.push(child);
            tree.node_mut(child)?.parent = Some(parent);
            tree.refresh_fieldsets();
        }
        if self.is_connected(child) {
            self.run_lifecycle(child, Lifecycle::Connected);
        }
        Ok(())
    }

    /// Detach `node` from its parent. Detaching a parentless node is a no-op.
    pub fn remove(&self, node: NodeId) -> Result<(), DomError> {
        let was_connected = self.is_connected(node);
        {
            let mut tree = self.tree.borrow_mut();
            let Some(parent) = tree.node_mut(node)?.parent.take() else {
                return Ok(());
            };
            tree.node_mut(parent)?.children.retain(|c| *c != node);
            tree.refresh_fieldsets();
        }
        if was_connected {
            self.run_lifecycle(node, Lifecycle::Disconnected);
        }
        Ok(())
    }

    fn run_lifecycle(&self, subtree: NodeId, which: Lifecycle) {
        let upgraded: Vec<Rc<dyn ElementReactions>> = {
            let tree = self.tree.borrow();
            tree.preorder(subtree)
                .into_iter()
                .filter_map(|id| tree.element(id).ok().and_then(|e| e.reactions.clone()))
                .collect()
        };
        for reactions in upgraded {
            match which {
                Lifecycle::Connected => reactions.connected(self),
                Lifecycle::Disconnected => reactions.disconnected(self),
            }
        }
    }

    // -- Tree queries -------------------------------------------------------

    /// Parent of `node`.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().node(node).ok().and_then(|n| n.parent)
    }

    /// Children of `node`, in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree
            .borrow()
            .node(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Whether `node` is attached to the document.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.tree.borrow().is_connected(node)
    }

    /// Lowercase tag name of an element.
    #[must_use]
    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        self.tree.borrow().element(node).ok().map(|e| e.tag.clone())
    }

    /// First connected element, in tree order, whose `id` equals `id`.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        let tree = self.tree.borrow();
        tree.preorder(ROOT)
            .into_iter()
            .find(|node| {
                tree.element(*node)
                    .is_ok_and(|e| e.attribute("id") == Some(id))
            })
    }

    // -- Attributes ---------------------------------------------------------

    /// Attribute value, if present.
    #[must_use]
    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        self.tree
            .borrow()
            .element(node)
            .ok()
            .and_then(|e| e.attribute(&name).map(str::to_owned))
    }

    /// Set an attribute, notifying the element's reactions if observed.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.change_attribute(node, name, Some(value))
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_attribute(&self, node: NodeId, name: &str) -> Result<bool, DomError> {
        let present = self.get_attribute(node, name).is_some();
        if present {
            self.change_attribute(node, name, None)?;
        } else {
            self.tree.borrow().element(node)?;
        }
        Ok(present)
    }

    fn change_attribute(&self, node: NodeId, name: &str, value: Option<&str>) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        let (old, reactions) = {
            let mut tree = self.tree.borrow_mut();
            let element = tree.element_mut(node)?;
            let old = element.set_attribute(&name, value);
            (old, element.reactions.clone())
        };
        if let Some(reactions) = reactions
            && reactions.observed_attributes().contains(&name.as_str())
        {
            reactions.attribute_changed(self, &name, old.as_deref(), value);
        }
        Ok(())
    }

    // -- Content ------------------------------------------------------------

    /// Replace the children of `node` with a single text node.
    ///
    /// Empty `text` leaves the element without children.
    pub fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), DomError> {
        self.tree.borrow().element(node)?;
        for child in self.children(node) {
            self.remove(child)?;
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(node, text_node)?;
        }
        Ok(())
    }

    /// Concatenated descendant text, templates excluded.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        self.child_fragment(node).text_content()
    }

    /// Light-DOM children of `node` as a detached fragment, templates excluded.
    #[must_use]
    pub fn child_fragment(&self, node: NodeId) -> Fragment {
        let tree = self.tree.borrow();
        let Ok(n) = tree.node(node) else {
            return Fragment::new();
        };
        n.children
            .iter()
            .filter_map(|c| tree.fragment_of(*c))
            .collect()
    }

    /// Replace the content of a `<template>`.
    pub fn set_template_content(&self, node: NodeId, content: Fragment) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        match &mut tree.element_mut(node)?.kind {
            ElementKind::Template(existing) => {
                *existing = content;
                Ok(())
            }
            _ => Err(DomError::NotATemplate(node)),
        }
    }

    /// A clone of a `<template>`'s content.
    #[must_use]
    pub fn template_content(&self, node: NodeId) -> Option<Fragment> {
        match &self.tree.borrow().element(node).ok()?.kind {
            ElementKind::Template(content) => Some(content.clone()),
            _ => None,
        }
    }

    /// First `<template>` child of `node`.
    #[must_use]
    pub fn template_child(&self, node: NodeId) -> Option<NodeId> {
        let tree = self.tree.borrow();
        tree.node(node).ok()?.children.iter().copied().find(|c| {
            tree.element(*c)
                .is_ok_and(|e| matches!(e.kind, ElementKind::Template(_)))
        })
    }

    // -- Controls -----------------------------------------------------------

    /// Control flavor of `node`, if it is a control.
    #[must_use]
    pub fn control_kind(&self, node: NodeId) -> Option<ControlKind> {
        self.tree
            .borrow()
            .control(node)
            .map(|c| c.as_control().kind())
    }

    /// Run `f` against a control.
    ///
    /// `f` must not call back into the document.
    pub fn with_control<R>(&self, node: NodeId, f: impl FnOnce(&dyn FormControl) -> R) -> Option<R> {
        let tree = self.tree.borrow();
        tree.control(node).map(|c| f(c.as_control()))
    }

    /// Run `f` against a mutable control, then refresh fieldset aggregates.
    ///
    /// `f` must not call back into the document.
    pub fn with_control_mut<R>(
        &self,
        node: NodeId,
        f: impl FnOnce(&mut dyn FormControl) -> R,
    ) -> Option<R> {
        let mut tree = self.tree.borrow_mut();
        let result = tree.control_mut(node).map(|c| f(c.as_control_mut()))?;
        tree.refresh_fieldsets();
        Some(result)
    }

    /// Record the host constraint engine's verdict for a control.
    pub fn set_validity(&self, node: NodeId, state: ValidityState) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        tree.control_mut(node)
            .ok_or(DomError::NotAControl(node))?
            .core_mut()
            .set_constraint(state);
        tree.refresh_fieldsets();
        Ok(())
    }

    /// Set a control's current value.
    pub fn set_value(&self, node: NodeId, value: &str) -> Result<(), DomError> {
        self.tree
            .borrow_mut()
            .control_mut(node)
            .ok_or(DomError::NotAControl(node))?
            .core_mut()
            .set_value(value);
        Ok(())
    }

    /// Whether `node` is a `<form>`.
    #[must_use]
    pub fn is_form(&self, node: NodeId) -> bool {
        self.tree.borrow().is_form(node)
    }

    /// The form a control belongs to.
    ///
    /// An explicit `form` attribute names the owner by id; otherwise the
    /// nearest ancestor `<form>` owns the control.
    #[must_use]
    pub fn form_owner(&self, node: NodeId) -> Option<NodeId> {
        let explicit = {
            let tree = self.tree.borrow();
            let element = tree.element(node).ok()?;
            element.control()?;
            match element.attribute("form") {
                Some(form_id) => Some(form_id.to_owned()),
                None => {
                    return tree
                        .inclusive_ancestors(node)
                        .into_iter()
                        .skip(1)
                        .find(|id| tree.is_form(*id));
                }
            }
        };
        explicit
            .and_then(|form_id| self.get_element_by_id(&form_id))
            .filter(|id| self.is_form(*id))
    }

    /// Connected controls owned by `form`, in tree order.
    #[must_use]
    pub fn form_controls(&self, form: NodeId) -> Vec<NodeId> {
        let candidates: Vec<NodeId> = {
            let tree = self.tree.borrow();
            tree.preorder(ROOT)
                .into_iter()
                .filter(|id| tree.control(*id).is_some())
                .collect()
        };
        candidates
            .into_iter()
            .filter(|id| self.form_owner(*id) == Some(form))
            .collect()
    }

    /// Point a control's accessible error message at `elements`.
    pub fn set_error_message_elements(
        &self,
        control: NodeId,
        elements: Vec<NodeId>,
    ) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        let element = tree.element_mut(control)?;
        if element.control().is_none() {
            return Err(DomError::NotAControl(control));
        }
        element.error_message_elements = elements;
        Ok(())
    }

    /// Elements currently announced as a control's error message.
    #[must_use]
    pub fn error_message_elements(&self, control: NodeId) -> Vec<NodeId> {
        self.tree
            .borrow()
            .element(control)
            .map(|e| e.error_message_elements.clone())
            .unwrap_or_default()
    }

    // -- Custom elements ----------------------------------------------------

    /// Register a custom element definition and upgrade existing elements.
    ///
    /// Upgrading replays observed attributes already present, then calls
    /// `connected` for elements in the document.
    pub fn define(&self, name: &str, definition: Rc<dyn ElementDefinition>) -> Result<(), DomError> {
        if !reactions::is_valid_custom_element_name(name) {
            return Err(DomError::InvalidCustomElementName(name.to_owned()));
        }
        {
            let mut definitions = self.definitions.borrow_mut();
            if definitions.contains_key(name) {
                return Err(DomError::AlreadyDefined(name.to_owned()));
            }
            definitions.insert(name.to_owned(), Rc::clone(&definition));
        }
        debug!(name, "custom element defined");

        let pending: Vec<NodeId> = {
            let tree = self.tree.borrow();
            (0..tree.nodes.len() as u32)
                .map(NodeId)
                .filter(|id| {
                    tree.element(*id)
                        .is_ok_and(|e| e.tag == name && e.reactions.is_none())
                })
                .collect()
        };
        for node in pending {
            let reactions = definition.upgrade(self, node);
            self.tree.borrow_mut().element_mut(node)?.reactions = Some(Rc::clone(&reactions));
            for attribute in reactions.observed_attributes() {
                if let Some(value) = self.get_attribute(node, attribute) {
                    reactions.attribute_changed(self, attribute, None, Some(&value));
                }
            }
            if self.is_connected(node) {
                reactions.connected(self);
            }
        }
        Ok(())
    }

    /// Whether a definition exists for `name`.
    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.borrow().contains_key(name)
    }

    /// Reactions object of an upgraded element.
    #[must_use]
    pub fn reactions(&self, node: NodeId) -> Option<Rc<dyn ElementReactions>> {
        self.tree
            .borrow()
            .element(node)
            .ok()
            .and_then(|e| e.reactions.clone())
    }

    // -- Events -------------------------------------------------------------

    /// Register a listener that stays live until removed.
    pub fn add_event_listener(
        &self,
        target: NodeId,
        ty: EventType,
        callback: impl Fn(&Document, &mut Event) + 'static,
    ) -> ListenerId {
        self.listeners
            .borrow_mut()
            .add(target, ty, None, Rc::new(callback))
    }

    /// Register a listener that dies with `token`'s epoch.
    pub fn add_event_listener_with_token(
        &self,
        target: NodeId,
        ty: EventType,
        token: &ConnectionToken,
        callback: impl Fn(&Document, &mut Event) + 'static,
    ) -> ListenerId {
        self.listeners
            .borrow_mut()
            .add(target, ty, Some(token.clone()), Rc::new(callback))
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        self.listeners.borrow_mut().remove(id)
    }

    /// Remove every listener attached to `target`.
    pub fn remove_all_listeners(&self, target: NodeId) {
        self.listeners.borrow_mut().forget_target(target);
    }

    /// Number of live listeners attached to `target`.
    #[must_use]
    pub fn live_listener_count(&self, target: NodeId) -> usize {
        self.listeners.borrow().live_count(target)
    }

    /// Dispatch `event` to its target and, if it bubbles, the target's
    /// ancestors.
    ///
    /// The propagation path is fixed before any listener runs. Each
    /// listener's liveness is re-checked right before it is invoked, so a
    /// listener removed or retired by an earlier listener never fires.
    /// Returns `false` if a listener cancelled the default action.
    pub fn dispatch_event(&self, event: &mut Event) -> bool {
        let path = {
            let tree = self.tree.borrow();
            if event.bubbles() {
                tree.inclusive_ancestors(event.target())
            } else {
                vec![event.target()]
            }
        };
        trace!(
            event = %event.event_type(),
            target = %event.target(),
            path_len = path.len(),
            "dispatch"
        );

        for node in path {
            event.set_current_target(node);
            let listeners = self
                .listeners
                .borrow_mut()
                .snapshot(node, event.event_type());
            for (id, callback) in listeners {
                if !self.listeners.borrow().is_active(id) {
                    continue;
                }
                callback(self, event);
                if event.immediate_stopped() {
                    break;
                }
            }
            if event.propagation_stopped() {
                break;
            }
        }
        !event.default_prevented()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
