#![forbid(unsafe_code)]

//! Event vocabulary shared by hosts and bindings.
//!
//! Only the handful of event types the binding listens to or emits are
//! modeled. Propagation defaults follow the web platform: `invalid` and
//! `blur` target the control only, everything else bubbles.

use std::fmt;

/// Type of a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// A control failed constraint validation.
    Invalid,
    /// A control lost focus.
    Blur,
    /// A key was pressed while a control had focus.
    KeyDown,
    /// A form is being reset.
    Reset,
    /// A form passed validation and is being submitted.
    Submit,
    /// A binding rendered a message.
    ErrorShow,
    /// A binding cleared its message.
    ErrorHide,
}

impl EventType {
    /// Event name as it appears in markup and listeners.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Blur => "blur",
            Self::KeyDown => "keydown",
            Self::Reset => "reset",
            Self::Submit => "submit",
            Self::ErrorShow => "errorshow",
            Self::ErrorHide => "errorhide",
        }
    }

    /// Whether events of this type propagate to ancestors by default.
    #[must_use]
    pub const fn bubbles(self) -> bool {
        !matches!(self, Self::Invalid | Self::Blur)
    }

    /// Whether listeners may cancel the default action.
    #[must_use]
    pub const fn cancelable(self) -> bool {
        matches!(
            self,
            Self::Invalid | Self::KeyDown | Self::Reset | Self::Submit
        )
    }

    /// Look up an event type by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "invalid" => Some(Self::Invalid),
            "blur" => Some(Self::Blur),
            "keydown" => Some(Self::KeyDown),
            "reset" => Some(Self::Reset),
            "submit" => Some(Self::Submit),
            "errorshow" => Some(Self::ErrorShow),
            "errorhide" => Some(Self::ErrorHide),
            _ => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key identity carried by `keydown` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Escape key.
    Escape,
    /// Tab key.
    Tab,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
}

impl KeyCode {
    /// The `key` string a browser would report.
    #[must_use]
    pub fn key_name(self) -> String {
        match self {
            Self::Char(c) => c.to_string(),
            Self::Enter => "Enter".to_owned(),
            Self::Escape => "Escape".to_owned(),
            Self::Tab => "Tab".to_owned(),
            Self::Backspace => "Backspace".to_owned(),
            Self::Delete => "Delete".to_owned(),
        }
    }
}
