#![forbid(unsafe_code)]

//! Form control capabilities.
//!
//! The binding never cares which concrete element it is attached to. It only
//! needs the capability set described by [`FormControl`]: structured
//! validity, the native validation message, the custom-validity channel, the
//! authoring hint (`title`), and the current value. Hosts implement the trait
//! once per concrete control type.

use std::fmt;

use crate::validity::{ValidityKind, ValidityState};

/// The `type` of an `<input>` element.
///
/// Unknown or missing types fall back to [`InputType::Text`], matching how
/// browsers treat an unrecognized `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputType {
    #[default]
    Text,
    Button,
    Checkbox,
    Date,
    Email,
    File,
    Hidden,
    Image,
    Number,
    Password,
    Radio,
    Range,
    Reset,
    Search,
    Submit,
    Tel,
    Url,
}

impl InputType {
    /// Parse a `type` attribute value.
    #[must_use]
    pub fn from_attribute(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "button" => Self::Button,
            "checkbox" => Self::Checkbox,
            "date" => Self::Date,
            "email" => Self::Email,
            "file" => Self::File,
            "hidden" => Self::Hidden,
            "image" => Self::Image,
            "number" => Self::Number,
            "password" => Self::Password,
            "radio" => Self::Radio,
            "range" => Self::Range,
            "reset" => Self::Reset,
            "search" => Self::Search,
            "submit" => Self::Submit,
            "tel" => Self::Tel,
            "url" => Self::Url,
            _ => Self::Text,
        }
    }

    /// Canonical attribute spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Button => "button",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Email => "email",
            Self::File => "file",
            Self::Hidden => "hidden",
            Self::Image => "image",
            Self::Number => "number",
            Self::Password => "password",
            Self::Radio => "radio",
            Self::Range => "range",
            Self::Reset => "reset",
            Self::Search => "search",
            Self::Submit => "submit",
            Self::Tel => "tel",
            Self::Url => "url",
        }
    }
}

/// Concrete control flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    FieldSet,
    Input(InputType),
    Select,
    TextArea,
    Output,
}

impl ControlKind {
    /// Whether a `<form-error>` may bind to this control.
    ///
    /// Image inputs are buttons in disguise and never carry a message.
    #[must_use]
    pub const fn is_eligible(self) -> bool {
        !matches!(self, Self::Input(InputType::Image))
    }

    /// Element tag name.
    #[must_use]
    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::FieldSet => "fieldset",
            Self::Input(_) => "input",
            Self::Select => "select",
            Self::TextArea => "textarea",
            Self::Output => "output",
        }
    }

    /// Browser-style message for `kind` on this control flavor.
    ///
    /// Falls back to [`ValidityKind::native_message`] where the control adds
    /// nothing specific.
    #[must_use]
    pub const fn native_message(self, kind: ValidityKind) -> &'static str {
        match (self, kind) {
            (Self::Input(InputType::Email), ValidityKind::TypeMismatch) => {
                "Please enter an email address."
            }
            (Self::Input(InputType::Url), ValidityKind::TypeMismatch) => "Please enter a URL.",
            (Self::Input(InputType::Number), ValidityKind::BadInput) => "Please enter a number.",
            (Self::Input(InputType::Checkbox), ValidityKind::ValueMissing) => {
                "Please check this box if you want to proceed."
            }
            (Self::Input(InputType::Radio), ValidityKind::ValueMissing) => {
                "Please select one of these options."
            }
            (Self::Input(InputType::File), ValidityKind::ValueMissing) => "Please select a file.",
            (Self::Select, ValidityKind::ValueMissing) => "Please select an item in the list.",
            _ => kind.native_message(),
        }
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(ty) => write!(f, "input[type={}]", ty.as_str()),
            other => f.write_str(other.tag_name()),
        }
    }
}

/// Capability set a binding relies on.
///
/// Implemented by every control-like element type. The owning form is not
/// part of this trait because it depends on the surrounding tree; hosts
/// expose it separately.
pub trait FormControl {
    /// Concrete control flavor.
    fn kind(&self) -> ControlKind;

    /// Current structured validity.
    fn validity(&self) -> ValidityState;

    /// Text set through [`FormControl::set_custom_validity`], or empty.
    fn custom_validity(&self) -> &str;

    /// Set (non-empty) or clear (empty) the custom validity message.
    ///
    /// A non-empty message makes the control fail with `customError`.
    fn set_custom_validity(&mut self, message: &str);

    /// Authoring hint from the `title` attribute, if any.
    fn title(&self) -> Option<&str>;

    /// Current value. Controls without a value report an empty string.
    fn value(&self) -> &str;

    /// Native message for the current invalid state, or empty when valid.
    ///
    /// A custom message always wins; otherwise the highest-priority failing
    /// kind picks the text.
    fn validation_message(&self) -> String {
        let validity = self.validity();
        if validity.is_valid() {
            return String::new();
        }
        if validity.has(ValidityKind::CustomError) && !self.custom_validity().is_empty() {
            return self.custom_validity().to_owned();
        }
        validity
            .primary_failure()
            .map(|kind| self.kind().native_message(kind).to_owned())
            .unwrap_or_default()
    }
}
