#![forbid(unsafe_code)]

//! The `<form-error>` binding.
//!
//! A [`FormError`] is the reactions object of one `<form-error>` element. It
//! resolves the control named by its `for` attribute, listens for the
//! control's `invalid`, `blur`, and `keydown` events and its form's `reset`
//! (and optionally `submit`), and keeps its [`ContentRegion`] in step with the
//! control's validity.
//!
//! # Reentrancy
//!
//! Listener closures hold a `Weak` reference to the binding. The binding
//! never holds its own borrow while dispatching `errorshow`/`errorhide` or
//! while mutating attributes, so listeners on ancestors may read or
//! reconfigure the binding synchronously. Listeners are tied to the current
//! connection epoch; a teardown during dispatch silences them immediately.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use formerr_core::epoch::{ConnectionToken, Epoch};
use formerr_core::event::{EventType, KeyCode};
use formerr_core::fragment::Fragment;
use formerr_core::{debug, trace, warn};
use formerr_dom::{Document, DomError, ElementDefinition, ElementReactions, Event, NodeId};

use crate::lifecycle::{BindingState, Wiring};
use crate::matcher::{self, ValidityFilter};
use crate::options::{ClearNotify, FormErrorOptions};
use crate::pattern::{PatternFilter, PatternSource};
use crate::presenter::{self, Composed, ContentRegion, CustomContent, Message, MessageSource};
use crate::registry::{BindingRegistry, SharedRegistry};
use crate::resolver;

/// Attributes whose changes the binding reacts to.
pub const OBSERVED_ATTRIBUTES: &[&str] = &["for", "validity", "pattern"];

/// Accessible role reported while a binding is wired to a control.
pub const ALERT_ROLE: &str = "alert";

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Cached attribute values.
#[derive(Debug, Default)]
struct Config {
    html_for: String,
    validity: String,
    filter: ValidityFilter,
    pattern_source: String,
    pattern: Option<PatternFilter>,
}

impl Config {
    fn set_validity(&mut self, raw: &str) {
        if self.validity == raw {
            return;
        }
        self.validity = raw.to_owned();
        self.filter = ValidityFilter::parse(raw);
    }

    fn set_pattern(&mut self, raw: &str) {
        if self.pattern_source == raw {
            return;
        }
        self.pattern_source = raw.to_owned();
        self.pattern = match PatternFilter::compile(raw) {
            Ok(pattern) => pattern,
            Err(err) => {
                warn!(error = %err, "malformed pattern ignored");
                None
            }
        };
    }

    /// Matcher gate against `control`.
    fn applies(&self, doc: &Document, control: NodeId) -> bool {
        doc.with_control(control, |c| {
            matcher::applies(c, &self.filter, self.pattern.as_ref())
        })
        .unwrap_or(false)
    }
}

#[derive(Debug, Default)]
struct BindingData {
    config: Config,
    state: BindingState,
    connected: bool,
    wiring: Wiring,
    region: ContentRegion,
    role: Option<&'static str>,
}

struct Binding {
    node: NodeId,
    options: FormErrorOptions,
    // Weak: the registry holds the binding strongly.
    registry: Option<Weak<RefCell<BindingRegistry>>>,
    data: RefCell<BindingData>,
}

// ---------------------------------------------------------------------------
// FormError
// ---------------------------------------------------------------------------

/// Handle to one `<form-error>` binding.
///
/// Cheap to clone; clones share state. Obtain one for an element with
/// [`FormError::from_node`].
#[derive(Clone)]
pub struct FormError {
    inner: Rc<Binding>,
}

impl fmt::Debug for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("FormError");
        s.field("node", &self.inner.node);
        if let Ok(data) = self.inner.data.try_borrow() {
            s.field("for", &data.config.html_for)
                .field("state", &data.state)
                .field("epoch", &data.wiring.epoch());
        }
        s.finish()
    }
}

impl FormError {
    pub(crate) fn new(
        node: NodeId,
        options: FormErrorOptions,
        registry: Option<SharedRegistry>,
    ) -> Self {
        Self {
            inner: Rc::new(Binding {
                node,
                options,
                registry: registry.as_ref().map(Rc::downgrade),
                data: RefCell::new(BindingData::default()),
            }),
        }
    }

    /// The binding attached to `node`, if `node` is an upgraded
    /// `<form-error>`.
    #[must_use]
    pub fn from_node(doc: &Document, node: NodeId) -> Option<Self> {
        doc.reactions(node)?
            .as_any()
            .downcast_ref::<Self>()
            .cloned()
    }

    fn data(&self) -> Ref<'_, BindingData> {
        self.inner.data.borrow()
    }

    fn data_mut(&self) -> RefMut<'_, BindingData> {
        self.inner.data.borrow_mut()
    }

    /// The `<form-error>` element.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.inner.node
    }

    /// Whether both handles refer to the same binding.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Options of the definition that created this binding.
    #[must_use]
    pub fn options(&self) -> &FormErrorOptions {
        &self.inner.options
    }

    // -- Properties ---------------------------------------------------------

    /// Control identifier (`for`).
    #[must_use]
    pub fn html_for(&self) -> String {
        self.data().config.html_for.clone()
    }

    /// Set `for`. Reflects to the attribute, which re-wires the binding.
    pub fn set_html_for(&self, doc: &Document, value: &str) -> Result<(), DomError> {
        if self.html_for() == value {
            return Ok(());
        }
        doc.set_attribute(self.node(), "for", value)
    }

    /// Raw `validity` filter.
    #[must_use]
    pub fn validity(&self) -> String {
        self.data().config.validity.clone()
    }

    /// Set `validity`. Reflects to the attribute.
    pub fn set_validity(&self, doc: &Document, value: &str) -> Result<(), DomError> {
        if self.validity() == value {
            return Ok(());
        }
        doc.set_attribute(self.node(), "validity", value)
    }

    /// Parsed `validity` filter.
    #[must_use]
    pub fn validity_filter(&self) -> ValidityFilter {
        self.data().config.filter.clone()
    }

    /// Compiled `pattern`, if set and well formed.
    #[must_use]
    pub fn pattern(&self) -> Option<PatternFilter> {
        self.data().config.pattern.clone()
    }

    /// Raw `pattern` source.
    #[must_use]
    pub fn pattern_source(&self) -> String {
        self.data().config.pattern_source.clone()
    }

    /// Set `pattern` from a source string or a compiled regex. Reflects the
    /// source to the attribute.
    pub fn set_pattern(
        &self,
        doc: &Document,
        pattern: impl Into<PatternSource>,
    ) -> Result<(), DomError> {
        let pattern = pattern.into();
        if self.pattern_source() == pattern.as_str() {
            return Ok(());
        }
        doc.set_attribute(self.node(), "pattern", pattern.as_str())
    }

    /// Element currently named by `for`, looked up now.
    #[must_use]
    pub fn control(&self, doc: &Document) -> Option<NodeId> {
        resolver::resolve(doc, &self.html_for())
    }

    /// Owning form of [`FormError::control`].
    #[must_use]
    pub fn form(&self, doc: &Document) -> Option<NodeId> {
        self.control(doc).and_then(|control| doc.form_owner(control))
    }

    /// Rendered content as a detached fragment.
    #[must_use]
    pub fn content(&self) -> Fragment {
        self.data().region.content()
    }

    /// Rendered text.
    #[must_use]
    pub fn rendered_text(&self) -> String {
        self.data().region.text()
    }

    /// Top-level nodes the output region has created so far.
    #[must_use]
    pub fn rendered_nodes_created(&self) -> u64 {
        self.data().region.nodes_created()
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> BindingState {
        self.data().state
    }

    /// Accessible role, set while the binding is wired to a control.
    #[must_use]
    pub fn role(&self) -> Option<&'static str> {
        self.data().role
    }

    /// Current connection epoch, or [`Epoch::NONE`].
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.data().wiring.epoch()
    }

    /// Control the live listeners are attached to.
    #[must_use]
    pub fn wired_control(&self) -> Option<NodeId> {
        self.data().wiring.control()
    }

    /// Whether the binding is connected, names an eligible control, and has
    /// a template when one is required.
    #[must_use]
    pub fn is_active(&self, doc: &Document) -> bool {
        let (connected, html_for) = {
            let data = self.data();
            (data.connected, data.config.html_for.clone())
        };
        connected
            && resolver::resolve_eligible(doc, &html_for).is_some()
            && (!self.inner.options.require_template
                || doc.template_child(self.node()).is_some())
    }

    // -- Lifecycle ----------------------------------------------------------

    fn registry(&self) -> Option<SharedRegistry> {
        self.inner.registry.as_ref().and_then(Weak::upgrade)
    }

    fn on_connected(&self, doc: &Document) {
        if let Some(registry) = self.registry() {
            match registry.try_borrow_mut() {
                Ok(mut registry) => {
                    registry.add(self.clone());
                }
                Err(_) => {
                    warn!(node = %self.node(), "binding registry busy; not registered");
                }
            }
        }
        self.sync_from_attributes(doc);
        self.data_mut().connected = true;
        self.resolve_and_wire(doc, true);
    }

    fn on_disconnected(&self, doc: &Document) {
        if let Some(registry) = self.registry() {
            match registry.try_borrow_mut() {
                Ok(mut registry) => {
                    registry.remove(self);
                }
                Err(_) => {
                    warn!(node = %self.node(), "binding registry busy; not unregistered");
                }
            }
        }
        self.teardown(doc);
        {
            let mut data = self.data_mut();
            data.connected = false;
            data.state = BindingState::Unattached;
        }
        debug!(node = %self.node(), "binding disconnected");
        if self.inner.options.clear_on_disconnect {
            self.clear(doc);
        }
    }

    fn on_attribute_changed(&self, doc: &Document, name: &str, value: Option<&str>) {
        let value = value.unwrap_or_default();
        match name {
            "for" => {
                let connected = {
                    let mut data = self.data_mut();
                    data.config.html_for = value.to_owned();
                    data.connected
                };
                if connected {
                    self.teardown(doc);
                    self.clear(doc);
                    self.resolve_and_wire(doc, false);
                }
            }
            "validity" => self.data_mut().config.set_validity(value),
            "pattern" => self.data_mut().config.set_pattern(value),
            _ => {}
        }
    }

    fn sync_from_attributes(&self, doc: &Document) {
        let node = self.node();
        let html_for = doc.get_attribute(node, "for").unwrap_or_default();
        let validity = doc.get_attribute(node, "validity").unwrap_or_default();
        let pattern = doc.get_attribute(node, "pattern").unwrap_or_default();
        let mut data = self.data_mut();
        data.config.html_for = html_for;
        data.config.set_validity(&validity);
        data.config.set_pattern(&pattern);
    }

    fn resolve_and_wire(&self, doc: &Document, on_connect: bool) {
        let node = self.node();
        let html_for = {
            let mut data = self.data_mut();
            if !data.connected {
                return;
            }
            data.state = BindingState::Resolving;
            data.config.html_for.clone()
        };

        let Some(control) = resolver::resolve_eligible(doc, &html_for) else {
            debug!(node = %node, control_ref = %html_for, "binding inert: no eligible control");
            return;
        };
        let content = CustomContent::from_element(doc, node);
        if self.inner.options.require_template && !content.has_template() {
            debug!(node = %node, "binding inert: template required");
            return;
        }

        let form = doc.form_owner(control);
        let token = {
            let mut data = self.data_mut();
            data.role = Some(ALERT_ROLE);
            data.wiring.begin(control, form)
        };
        debug!(
            node = %node,
            control = %control,
            epoch = %token.epoch(),
            "binding resolved"
        );

        if on_connect && let Some(inline) = content.inline() {
            let text = inline.text_content().trim().to_owned();
            self.push_custom_validity(doc, control, &text);
            self.render(
                doc,
                Composed {
                    message: Message::Fragment(inline.clone()),
                    source: MessageSource::Inline,
                },
            );
        }
        if !token.is_live() {
            // Torn down by an `errorshow` listener.
            return;
        }

        self.install_listeners(doc, &token, control, form);
        self.data_mut().state = BindingState::Wired;
    }

    fn install_listeners(
        &self,
        doc: &Document,
        token: &ConnectionToken,
        control: NodeId,
        form: Option<NodeId>,
    ) {
        let weak = Rc::downgrade(&self.inner);
        doc.add_event_listener_with_token(
            control,
            EventType::Invalid,
            token,
            listener(&weak, Self::on_invalid),
        );
        doc.add_event_listener_with_token(
            control,
            EventType::Blur,
            token,
            listener(&weak, |binding, doc, _| binding.maybe_clear(doc)),
        );
        doc.add_event_listener_with_token(
            control,
            EventType::KeyDown,
            token,
            listener(&weak, |binding, doc, event| {
                if event.key() == Some(KeyCode::Enter) {
                    binding.maybe_clear(doc);
                }
            }),
        );
        if let Some(form) = form {
            doc.add_event_listener_with_token(
                form,
                EventType::Reset,
                token,
                listener(&weak, |binding, doc, _| binding.clear(doc)),
            );
            if self.inner.options.clear_on_submit {
                doc.add_event_listener_with_token(
                    form,
                    EventType::Submit,
                    token,
                    listener(&weak, |binding, doc, _| binding.maybe_clear(doc)),
                );
            }
        }
        trace!(
            node = %self.node(),
            control = %control,
            epoch = %token.epoch(),
            has_form = form.is_some(),
            "listeners installed"
        );
    }

    fn teardown(&self, doc: &Document) {
        let ended = {
            let mut data = self.data_mut();
            data.role = None;
            data.wiring.end()
        };
        let Some(ended) = ended else {
            return;
        };
        if let Some(pushed) = ended.pushed_custom {
            doc.with_control_mut(ended.control, |c| {
                if c.custom_validity() == pushed {
                    c.set_custom_validity("");
                }
            });
        }
        trace!(
            node = %self.node(),
            control = %ended.control,
            epoch = %ended.epoch,
            "binding torn down"
        );
    }

    // -- Event handling -----------------------------------------------------

    fn on_invalid(&self, doc: &Document, event: &mut Event) {
        event.prevent_default();
        let Some(control) = self.wired_control() else {
            return;
        };
        if !self.data().config.applies(doc, control) {
            trace!(node = %self.node(), "invalid not matched by filter");
            return;
        }
        if self.inner.options.claim_error_message
            && let Err(err) = doc.set_error_message_elements(control, vec![self.node()])
        {
            debug!(error = %err, "error message association failed");
        }
        self.show(doc);
    }

    /// Clear unless the control still fails in a way this binding covers.
    pub fn maybe_clear(&self, doc: &Document) {
        let Some(control) = self.wired_control() else {
            return;
        };
        let still_failing = {
            let data = self.data();
            let invalid = doc
                .with_control(control, |c| !c.validity().is_valid())
                .unwrap_or(false);
            invalid && data.config.applies(doc, control)
        };
        if !still_failing {
            self.clear(doc);
        }
    }

    /// Render the message for the wired control's current state.
    ///
    /// A valid control clears the region instead.
    pub fn show(&self, doc: &Document) {
        let Some(control) = self.wired_control() else {
            return;
        };
        let content = CustomContent::from_element(doc, self.node());
        let composed = {
            let data = self.data();
            let pattern = data.config.pattern.as_ref();
            doc.with_control(control, |c| {
                presenter::compose(c, &content, pattern.is_some_and(|p| p.rejects(c.value())))
            })
            .flatten()
        };
        let Some(composed) = composed else {
            self.clear(doc);
            return;
        };
        if composed.source == MessageSource::Inline
            && let Some(text) = content.inline_validity_text()
        {
            self.push_custom_validity(doc, control, &text);
        }
        self.render(doc, composed);
    }

    /// Empty the region and emit `errorhide` per the clear policy.
    pub fn clear(&self, doc: &Document) {
        let had_content = self.data_mut().region.clear();
        let notify = match self.inner.options.clear_notify {
            ClearNotify::Always => true,
            ClearNotify::WhenVisible => had_content,
        };
        trace!(node = %self.node(), had_content, notify, "message cleared");
        if notify {
            doc.dispatch_event(&mut Event::new(EventType::ErrorHide, self.node()));
        }
    }

    fn render(&self, doc: &Document, composed: Composed) {
        self.data_mut().region.show(&composed.message);
        trace!(node = %self.node(), source = %composed.source, "message shown");
        doc.dispatch_event(&mut Event::new(EventType::ErrorShow, self.node()));
    }

    fn push_custom_validity(&self, doc: &Document, control: NodeId, text: &str) {
        doc.with_control_mut(control, |c| c.set_custom_validity(text));
        self.data_mut().wiring.record_push(text.to_owned());
    }
}

/// Wrap a binding method as a document listener holding only a weak
/// reference.
fn listener(
    weak: &Weak<Binding>,
    handler: fn(&FormError, &Document, &mut Event),
) -> impl Fn(&Document, &mut Event) + 'static {
    let weak = weak.clone();
    move |doc: &Document, event: &mut Event| {
        if let Some(inner) = weak.upgrade() {
            handler(&FormError { inner }, doc, event);
        }
    }
}

impl ElementReactions for FormError {
    fn observed_attributes(&self) -> &'static [&'static str] {
        OBSERVED_ATTRIBUTES
    }

    fn connected(&self, doc: &Document) {
        self.on_connected(doc);
    }

    fn disconnected(&self, doc: &Document) {
        self.on_disconnected(doc);
    }

    fn attribute_changed(
        &self,
        doc: &Document,
        name: &str,
        _old: Option<&str>,
        new: Option<&str>,
    ) {
        self.on_attribute_changed(doc, name, new);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Definition
// ---------------------------------------------------------------------------

/// Upgrades `<form-error>` elements into [`FormError`] bindings.
#[derive(Debug, Clone, Default)]
pub struct FormErrorDefinition {
    options: FormErrorOptions,
    registry: Option<SharedRegistry>,
}

impl FormErrorDefinition {
    /// Definition sharing `options` and, optionally, a registry.
    #[must_use]
    pub fn new(options: FormErrorOptions, registry: Option<SharedRegistry>) -> Self {
        Self { options, registry }
    }
}

impl ElementDefinition for FormErrorDefinition {
    fn upgrade(&self, _doc: &Document, node: NodeId) -> Rc<dyn ElementReactions> {
        trace!(node = %node, "upgrading form-error");
        Rc::new(FormError::new(
            node,
            self.options.clone(),
            self.registry.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formerr_core::validity::{ValidityKind, ValidityState};
    use pretty_assertions::assert_eq;

    fn setup() -> (Document, NodeId, FormError) {
        let doc = Document::new();
        doc.define(
            "form-error",
            Rc::new(FormErrorDefinition::new(FormErrorOptions::default(), None)),
        )
        .unwrap();
        let input = doc.create_element("input");
        doc.set_attribute(input, "id", "email").unwrap();
        doc.append_child(doc.body(), input).unwrap();

        let node = doc.create_element("form-error");
        doc.set_attribute(node, "for", "email").unwrap();
        doc.append_child(doc.body(), node).unwrap();
        let binding = FormError::from_node(&doc, node).unwrap();
        (doc, input, binding)
    }

    #[test]
    fn connection_wires_and_sets_role() {
        let (doc, input, binding) = setup();
        assert_eq!(binding.state(), BindingState::Wired);
        assert_eq!(binding.role(), Some(ALERT_ROLE));
        assert_eq!(binding.wired_control(), Some(input));
        assert!(binding.is_active(&doc));
        assert_eq!(doc.live_listener_count(input), 3);
    }

    #[test]
    fn attributes_are_cached() {
        let (doc, _, binding) = setup();
        binding.set_validity(&doc, "tooShort").unwrap();
        binding.set_pattern(&doc, "[a-z]+").unwrap();
        assert_eq!(binding.validity(), "tooShort");
        assert_eq!(
            binding.validity_filter(),
            ValidityFilter::Kind(ValidityKind::TooShort)
        );
        assert_eq!(binding.pattern_source(), "[a-z]+");
        assert_eq!(
            doc.get_attribute(binding.node(), "pattern").as_deref(),
            Some("[a-z]+")
        );
    }

    #[test]
    fn malformed_pattern_degrades_to_none() {
        let (doc, input, binding) = setup();
        binding.set_pattern(&doc, "(oops").unwrap();
        assert_eq!(binding.pattern(), None);
        assert_eq!(binding.pattern_source(), "(oops");

        doc.set_validity(input, ValidityState::new().with(ValidityKind::ValueMissing))
            .unwrap();
        doc.report_validity(input);
        assert_eq!(binding.rendered_text(), "Please fill out this field.");
    }

    #[test]
    fn disconnect_releases_listeners() {
        let (doc, input, binding) = setup();
        let epoch = binding.epoch();
        assert!(!epoch.is_none());
        doc.remove(binding.node()).unwrap();
        assert_eq!(binding.state(), BindingState::Unattached);
        assert_eq!(binding.wired_control(), None);
        assert!(binding.epoch().is_none());
        assert_eq!(binding.role(), None);
        assert!(!binding.is_active(&doc));
        assert_eq!(doc.live_listener_count(input), 0);

        doc.append_child(doc.body(), binding.node()).unwrap();
        assert_eq!(binding.role(), Some(ALERT_ROLE));
    }

    #[test]
    fn repointing_to_a_missing_control_drops_the_role() {
        let (doc, _, binding) = setup();
        binding.set_html_for(&doc, "nowhere").unwrap();
        assert_eq!(binding.state(), BindingState::Resolving);
        assert_eq!(binding.role(), None);
    }

    #[test]
    fn pattern_with_stray_group_close_is_no_filter() {
        let (doc, input, binding) = setup();
        binding.set_pattern(&doc, "a)|(?:b").unwrap();
        assert_eq!(binding.pattern(), None);

        doc.set_attribute(input, "value", "axxxx").unwrap();
        doc.set_validity(input, ValidityState::new().with(ValidityKind::ValueMissing))
            .unwrap();
        doc.report_validity(input);
        assert_eq!(binding.rendered_text(), "Please fill out this field.");
    }

    #[test]
    fn from_node_rejects_other_elements() {
        let (doc, input, _) = setup();
        assert!(FormError::from_node(&doc, input).is_none());
    }

    #[test]
    fn handles_share_state() {
        let (doc, _, binding) = setup();
        let again = FormError::from_node(&doc, binding.node()).unwrap();
        assert!(again.ptr_eq(&binding));
        assert!(format!("{binding:?}").contains("Wired"));
    }
}
