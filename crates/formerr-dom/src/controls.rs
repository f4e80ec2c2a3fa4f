#![forbid(unsafe_code)]

//! Concrete control element types.
//!
//! Each type implements [`FormControl`]. Constraint flags come from the host
//! (the document has no constraint engine of its own); the `customError`
//! flag is always derived from the custom validity message so the two can
//! never disagree.

use formerr_core::control::{ControlKind, FormControl, InputType};
use formerr_core::validity::{ValidityKind, ValidityState};

/// State shared by every control flavor.
#[derive(Debug, Clone, Default)]
pub struct ControlCore {
    constraint: ValidityState,
    custom: String,
    title: Option<String>,
    value: String,
    default_value: String,
}

impl ControlCore {
    /// Validity from host constraints plus the custom message.
    #[must_use]
    pub fn validity(&self) -> ValidityState {
        let mut state = self.constraint;
        state.set(ValidityKind::CustomError, !self.custom.is_empty());
        state
    }

    /// Replace host constraint flags. `customError` in `state` is ignored.
    pub fn set_constraint(&mut self, mut state: ValidityState) {
        state.set(ValidityKind::CustomError, false);
        self.constraint = state;
    }

    pub(crate) fn set_title(&mut self, title: Option<&str>) {
        self.title = title.map(str::to_owned);
    }

    pub(crate) fn set_value(&mut self, value: &str) {
        self.value = value.to_owned();
    }

    pub(crate) fn set_default_value(&mut self, value: &str) {
        self.default_value = value.to_owned();
        self.value = value.to_owned();
    }

    pub(crate) fn restore_default(&mut self) {
        self.value.clone_from(&self.default_value);
    }
}

macro_rules! delegate_form_control {
    ($ty:ty, $kind:expr) => {
        impl FormControl for $ty {
            fn kind(&self) -> ControlKind {
                $kind
            }

            fn validity(&self) -> ValidityState {
                self.core.validity()
            }

            fn custom_validity(&self) -> &str {
                &self.core.custom
            }

            fn set_custom_validity(&mut self, message: &str) {
                self.core.custom = message.to_owned();
            }

            fn title(&self) -> Option<&str> {
                self.core.title.as_deref()
            }

            fn value(&self) -> &str {
                &self.core.value
            }
        }
    };
}

/// `<input>`.
#[derive(Debug, Clone, Default)]
pub struct InputElement {
    pub(crate) core: ControlCore,
    input_type: InputType,
}

impl InputElement {
    /// Current `type`.
    #[must_use]
    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    pub(crate) fn set_input_type(&mut self, ty: InputType) {
        self.input_type = ty;
    }
}

impl FormControl for InputElement {
    fn kind(&self) -> ControlKind {
        ControlKind::Input(self.input_type)
    }

    fn validity(&self) -> ValidityState {
        self.core.validity()
    }

    fn custom_validity(&self) -> &str {
        &self.core.custom
    }

    fn set_custom_validity(&mut self, message: &str) {
        self.core.custom = message.to_owned();
    }

    fn title(&self) -> Option<&str> {
        self.core.title.as_deref()
    }

    fn value(&self) -> &str {
        &self.core.value
    }
}

/// `<select>`.
#[derive(Debug, Clone, Default)]
pub struct SelectElement {
    pub(crate) core: ControlCore,
}

delegate_form_control!(SelectElement, ControlKind::Select);

/// `<textarea>`.
#[derive(Debug, Clone, Default)]
pub struct TextAreaElement {
    pub(crate) core: ControlCore,
}

delegate_form_control!(TextAreaElement, ControlKind::TextArea);

/// `<output>`.
#[derive(Debug, Clone, Default)]
pub struct OutputElement {
    pub(crate) core: ControlCore,
}

delegate_form_control!(OutputElement, ControlKind::Output);

/// `<fieldset>`.
///
/// Reports the union of its own flags and those of every control nested
/// inside it, so a binding pointed at a fieldset reflects the group.
#[derive(Debug, Clone, Default)]
pub struct FieldSetElement {
    pub(crate) core: ControlCore,
    descendants: ValidityState,
}

impl FieldSetElement {
    /// Validity of the fieldset itself, without its descendants.
    #[must_use]
    pub fn own_validity(&self) -> ValidityState {
        self.core.validity()
    }

    pub(crate) fn set_descendant_validity(&mut self, state: ValidityState) {
        self.descendants = state;
    }
}

impl FormControl for FieldSetElement {
    fn kind(&self) -> ControlKind {
        ControlKind::FieldSet
    }

    fn validity(&self) -> ValidityState {
        self.core.validity().union(self.descendants)
    }

    fn custom_validity(&self) -> &str {
        &self.core.custom
    }

    fn set_custom_validity(&mut self, message: &str) {
        self.core.custom = message.to_owned();
    }

    fn title(&self) -> Option<&str> {
        self.core.title.as_deref()
    }

    fn value(&self) -> &str {
        ""
    }
}

/// Any control flavor.
#[derive(Debug, Clone)]
pub enum ControlElement {
    Input(InputElement),
    Select(SelectElement),
    TextArea(TextAreaElement),
    FieldSet(FieldSetElement),
    Output(OutputElement),
}

impl ControlElement {
    /// Build the control matching `tag`, if the tag names a control.
    #[must_use]
    pub fn for_tag(tag: &str) -> Option<Self> {
        match tag {
            "input" => Some(Self::Input(InputElement::default())),
            "select" => Some(Self::Select(SelectElement::default())),
            "textarea" => Some(Self::TextArea(TextAreaElement::default())),
            "fieldset" => Some(Self::FieldSet(FieldSetElement::default())),
            "output" => Some(Self::Output(OutputElement::default())),
            _ => None,
        }
    }

    /// Borrow as the capability trait.
    #[must_use]
    pub fn as_control(&self) -> &dyn FormControl {
        match self {
            Self::Input(e) => e,
            Self::Select(e) => e,
            Self::TextArea(e) => e,
            Self::FieldSet(e) => e,
            Self::Output(e) => e,
        }
    }

    /// Mutably borrow as the capability trait.
    pub fn as_control_mut(&mut self) -> &mut dyn FormControl {
        match self {
            Self::Input(e) => e,
            Self::Select(e) => e,
            Self::TextArea(e) => e,
            Self::FieldSet(e) => e,
            Self::Output(e) => e,
        }
    }

    /// Validity excluding fieldset aggregation; used to build aggregates.
    #[must_use]
    pub fn own_validity(&self) -> ValidityState {
        self.core().validity()
    }

    pub(crate) fn core(&self) -> &ControlCore {
        match self {
            Self::Input(e) => &e.core,
            Self::Select(e) => &e.core,
            Self::TextArea(e) => &e.core,
            Self::FieldSet(e) => &e.core,
            Self::Output(e) => &e.core,
        }
    }

    pub(crate) fn core_mut(&mut self) -> &mut ControlCore {
        match self {
            Self::Input(e) => &mut e.core,
            Self::Select(e) => &mut e.core,
            Self::TextArea(e) => &mut e.core,
            Self::FieldSet(e) => &mut e.core,
            Self::Output(e) => &mut e.core,
        }
    }
}
