#![forbid(unsafe_code)]

//! Message presenter.
//!
//! Picks what a binding renders, in precedence order:
//!
//! 1. The control's `title` hint, for a pattern mismatch with no template.
//! 2. A clone of the template child's content.
//! 3. Non-blank inline content (also pushed as the custom validity message).
//! 4. The control's native validation message.
//!
//! The chosen [`Message`] is rendered into a [`ContentRegion`], the binding's
//! private output area.

use std::fmt;

use formerr_core::control::FormControl;
use formerr_core::fragment::{Fragment, FragmentNode};
use formerr_core::validity::ValidityKind;
use formerr_dom::{Document, NodeId};

use crate::matcher::{self, ValidityFilter};
use crate::pattern::PatternFilter;

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Content chosen for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Plain text (hint or native message).
    Text(String),
    /// Structured content (template or inline).
    Fragment(Fragment),
}

impl Message {
    /// Text a screen reader would announce.
    #[must_use]
    pub fn text_content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Fragment(fragment) => fragment.text_content(),
        }
    }

    /// Whether rendering this would produce nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Fragment(fragment) => fragment.is_empty(),
        }
    }
}

/// Where a [`Message`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageSource {
    /// The control's `title`.
    Hint,
    /// The binding's `<template>` child.
    Template,
    /// The binding's inline children.
    Inline,
    /// The control's validation message.
    Native,
}

impl MessageSource {
    /// Name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hint => "hint",
            Self::Template => "template",
            Self::Inline => "inline",
            Self::Native => "native",
        }
    }
}

impl fmt::Display for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message together with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composed {
    pub message: Message,
    pub source: MessageSource,
}

// ---------------------------------------------------------------------------
// Custom content
// ---------------------------------------------------------------------------

/// Author-supplied content of a binding element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomContent {
    template: Option<Fragment>,
    inline: Fragment,
}

impl CustomContent {
    /// Content with neither template nor inline children.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Read the template child and inline children of `element`.
    #[must_use]
    pub fn from_element(doc: &Document, element: NodeId) -> Self {
        Self {
            template: doc
                .template_child(element)
                .and_then(|tpl| doc.template_content(tpl)),
            inline: doc.child_fragment(element),
        }
    }

    /// Use `fragment` as the template.
    #[must_use]
    pub fn with_template(mut self, fragment: Fragment) -> Self {
        self.template = Some(fragment);
        self
    }

    /// Use `fragment` as inline content.
    #[must_use]
    pub fn with_inline(mut self, fragment: Fragment) -> Self {
        self.inline = fragment;
        self
    }

    /// Template content, if a template child exists.
    #[must_use]
    pub fn template(&self) -> Option<&Fragment> {
        self.template.as_ref()
    }

    /// Whether a template child exists.
    #[must_use]
    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    /// Inline content when it applies: non-blank and no template.
    #[must_use]
    pub fn inline(&self) -> Option<&Fragment> {
        (!self.has_template() && !self.inline.is_blank()).then_some(&self.inline)
    }

    /// Inline text pushed into the custom validity channel.
    #[must_use]
    pub fn inline_validity_text(&self) -> Option<String> {
        self.inline().map(|f| f.text_content().trim().to_owned())
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Choose content for an invalid control, ignoring filters.
///
/// `pattern_rejects` reports whether the binding's own pattern filter
/// rejects the current value; it counts as a pattern mismatch for the hint.
/// Returns `None` for a valid control or when every source is empty.
#[must_use]
pub fn compose(
    control: &dyn FormControl,
    content: &CustomContent,
    pattern_rejects: bool,
) -> Option<Composed> {
    let validity = control.validity();
    if validity.is_valid() {
        return None;
    }

    let pattern_mismatch = pattern_rejects || validity.has(ValidityKind::PatternMismatch);
    let hint = control.title().filter(|t| !t.is_empty());
    let composed = match (hint, content.template(), content.inline()) {
        (Some(title), None, _) if pattern_mismatch => Composed {
            message: Message::Text(title.to_owned()),
            source: MessageSource::Hint,
        },
        (_, Some(template), _) => Composed {
            message: Message::Fragment(template.clone()),
            source: MessageSource::Template,
        },
        (_, None, Some(inline)) => Composed {
            message: Message::Fragment(inline.clone()),
            source: MessageSource::Inline,
        },
        _ => Composed {
            message: Message::Text(control.validation_message()),
            source: MessageSource::Native,
        },
    };
    (!composed.message.is_empty()).then_some(composed)
}

/// Gate on the matcher, then [`compose`].
#[must_use]
pub fn present(
    control: &dyn FormControl,
    filter: &ValidityFilter,
    pattern: Option<&PatternFilter>,
    content: &CustomContent,
) -> Option<Composed> {
    if !matcher::applies(control, filter, pattern) {
        return None;
    }
    compose(control, content, pattern.is_some_and(|p| p.rejects(control.value())))
}

// ---------------------------------------------------------------------------
// ContentRegion
// ---------------------------------------------------------------------------

/// The binding's output area.
///
/// Showing text while a single text node is rendered rewrites that node in
/// place; anything else replaces the children. Clearing an empty region does
/// nothing.
#[derive(Debug, Clone, Default)]
pub struct ContentRegion {
    nodes: Vec<FragmentNode>,
    nodes_created: u64,
}

impl ContentRegion {
    /// An empty region.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `message`, replacing what was there.
    pub fn show(&mut self, message: &Message) {
        match message {
            Message::Text(text) => {
                if let [FragmentNode::Text(existing)] = self.nodes.as_mut_slice() {
                    existing.clone_from(text);
                    return;
                }
                self.replace(vec![FragmentNode::Text(text.clone())]);
            }
            Message::Fragment(fragment) => self.replace(fragment.nodes().to_vec()),
        }
    }

    fn replace(&mut self, nodes: Vec<FragmentNode>) {
        self.nodes_created += nodes.len() as u64;
        self.nodes = nodes;
    }

    /// Remove all content. Returns whether anything was rendered.
    pub fn clear(&mut self) -> bool {
        let had_content = !self.nodes.is_empty();
        self.nodes.clear();
        had_content
    }

    /// Whether nothing is rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Rendered content as a detached fragment.
    #[must_use]
    pub fn content(&self) -> Fragment {
        self.nodes.iter().cloned().collect()
    }

    /// Rendered text.
    #[must_use]
    pub fn text(&self) -> String {
        self.content().text_content()
    }

    /// Top-level nodes created over the region's lifetime.
    #[must_use]
    pub fn nodes_created(&self) -> u64 {
        self.nodes_created
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formerr_core::control::ControlKind;
    use formerr_core::control::InputType;
    use formerr_core::validity::ValidityState;
    use pretty_assertions::assert_eq;

    struct Control {
        validity: ValidityState,
        title: Option<&'static str>,
        custom: String,
    }

    impl Control {
        fn failing(kind: ValidityKind) -> Self {
            Self {
                validity: ValidityState::new().with(kind),
                title: None,
                custom: String::new(),
            }
        }
    }

    impl FormControl for Control {
        fn kind(&self) -> ControlKind {
            ControlKind::Input(InputType::Email)
        }
        fn validity(&self) -> ValidityState {
            self.validity
        }
        fn custom_validity(&self) -> &str {
            &self.custom
        }
        fn set_custom_validity(&mut self, message: &str) {
            self.custom = message.to_owned();
        }
        fn title(&self) -> Option<&str> {
            self.title
        }
        fn value(&self) -> &str {
            "nope"
        }
    }

    fn text(composed: Option<Composed>) -> Option<(String, MessageSource)> {
        composed.map(|c| (c.message.text_content(), c.source))
    }

    #[test]
    fn valid_control_yields_nothing() {
        let control = Control {
            validity: ValidityState::VALID,
            title: Some("hint"),
            custom: String::new(),
        };
        let content = CustomContent::none().with_template(Fragment::from_text("tpl"));
        assert_eq!(compose(&control, &content, true), None);
    }

    #[test]
    fn native_message_by_default() {
        let control = Control::failing(ValidityKind::TypeMismatch);
        assert_eq!(
            text(compose(&control, &CustomContent::none(), false)),
            Some((
                "Please enter an email address.".to_owned(),
                MessageSource::Native
            ))
        );
    }

    #[test]
    fn hint_wins_on_pattern_mismatch_without_template() {
        let mut control = Control::failing(ValidityKind::PatternMismatch);
        control.title = Some("Use format x@y.com");
        let inline = CustomContent::none().with_inline(Fragment::from_text("inline"));
        assert_eq!(
            text(compose(&control, &inline, false)),
            Some(("Use format x@y.com".to_owned(), MessageSource::Hint))
        );

        let templated = CustomContent::none().with_template(Fragment::from_text("tpl"));
        assert_eq!(
            text(compose(&control, &templated, false)),
            Some(("tpl".to_owned(), MessageSource::Template))
        );
    }

    #[test]
    fn hint_needs_a_pattern_mismatch() {
        let mut control = Control::failing(ValidityKind::ValueMissing);
        control.title = Some("hint");
        assert_eq!(
            text(compose(&control, &CustomContent::none(), false)).map(|(_, s)| s),
            Some(MessageSource::Native)
        );
        assert_eq!(
            text(compose(&control, &CustomContent::none(), true)).map(|(_, s)| s),
            Some(MessageSource::Hint)
        );
    }

    #[test]
    fn blank_inline_falls_back_to_native() {
        let control = Control::failing(ValidityKind::ValueMissing);
        let content = CustomContent::none().with_inline(Fragment::from_text("  \n "));
        assert_eq!(content.inline(), None);
        assert_eq!(
            text(compose(&control, &content, false)).map(|(_, s)| s),
            Some(MessageSource::Native)
        );
    }

    #[test]
    fn template_shadows_inline() {
        let content = CustomContent::none()
            .with_inline(Fragment::from_text("inline"))
            .with_template(Fragment::from_text("tpl"));
        assert_eq!(content.inline(), None);
        assert_eq!(content.inline_validity_text(), None);
    }

    #[test]
    fn present_respects_filter() {
        let control = Control::failing(ValidityKind::TooShort);
        let content = CustomContent::none();
        assert!(present(&control, &ValidityFilter::parse("too-short"), None, &content).is_some());
        assert!(present(&control, &ValidityFilter::parse("too-long"), None, &content).is_none());
    }

    #[test]
    fn region_reuses_single_text_node() {
        let mut region = ContentRegion::new();
        region.show(&Message::Text("one".into()));
        region.show(&Message::Text("two".into()));
        assert_eq!(region.text(), "two");
        assert_eq!(region.nodes_created(), 1);

        region.show(&Message::Fragment(
            Fragment::new()
                .with(FragmentNode::element("b", vec![FragmentNode::text("x")]))
                .with(FragmentNode::text("y")),
        ));
        assert_eq!(region.content().to_markup(), "<b>x</b>y");
        assert_eq!(region.nodes_created(), 3);
    }

    #[test]
    fn clearing_reports_prior_content() {
        let mut region = ContentRegion::new();
        assert!(!region.clear());
        region.show(&Message::Text("shown".into()));
        assert!(region.clear());
        assert!(region.is_empty());
        assert!(!region.clear());
        assert_eq!(region.nodes_created(), 1);
    }
}
