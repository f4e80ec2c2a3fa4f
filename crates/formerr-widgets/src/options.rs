#![forbid(unsafe_code)]

//! Binding options.
//!
//! Options are fixed when the element definition is registered and shared by
//! every binding it upgrades.
//!
//! # Environment variables
//!
//! [`FormErrorOptions::from_env`] reads:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `FORMERR_CLEAR_ON_SUBMIT` | `clear_on_submit` |
//! | `FORMERR_CLEAR_ON_DISCONNECT` | `clear_on_disconnect` |
//! | `FORMERR_REQUIRE_TEMPLATE` | `require_template` |
//!
//! A variable counts as set when its value is `1` or `true` (any case).

use std::env;

/// Env var enabling `clear_on_submit`.
pub const ENV_CLEAR_ON_SUBMIT: &str = "FORMERR_CLEAR_ON_SUBMIT";
/// Env var enabling `clear_on_disconnect`.
pub const ENV_CLEAR_ON_DISCONNECT: &str = "FORMERR_CLEAR_ON_DISCONNECT";
/// Env var enabling `require_template`.
pub const ENV_REQUIRE_TEMPLATE: &str = "FORMERR_REQUIRE_TEMPLATE";

/// When clearing emits `errorhide`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum ClearNotify {
    /// Every clear emits `errorhide`, even when nothing was shown.
    #[default]
    Always,
    /// Only clears that removed visible content emit `errorhide`.
    WhenVisible,
}

/// Behavior switches shared by every binding of one definition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FormErrorOptions {
    /// Listen for `submit` on the owning form and re-check the message.
    pub clear_on_submit: bool,
    /// Clear the rendered message when the binding is disconnected.
    pub clear_on_disconnect: bool,
    /// Stay inert unless the element has a `<template>` child.
    pub require_template: bool,
    /// `errorhide` policy.
    pub clear_notify: ClearNotify,
    /// Point the control's error-message association at the binding that
    /// last showed a message.
    pub claim_error_message: bool,
}

impl Default for FormErrorOptions {
    fn default() -> Self {
        Self {
            clear_on_submit: false,
            clear_on_disconnect: false,
            require_template: false,
            clear_notify: ClearNotify::Always,
            claim_error_message: true,
        }
    }
}

impl FormErrorOptions {
    /// Create default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `clear_on_submit`.
    #[must_use]
    pub fn clear_on_submit(mut self, enabled: bool) -> Self {
        self.clear_on_submit = enabled;
        self
    }

    /// Set `clear_on_disconnect`.
    #[must_use]
    pub fn clear_on_disconnect(mut self, enabled: bool) -> Self {
        self.clear_on_disconnect = enabled;
        self
    }

    /// Set `require_template`.
    #[must_use]
    pub fn require_template(mut self, enabled: bool) -> Self {
        self.require_template = enabled;
        self
    }

    /// Set the `errorhide` policy.
    #[must_use]
    pub fn clear_notify(mut self, policy: ClearNotify) -> Self {
        self.clear_notify = policy;
        self
    }

    /// Set `claim_error_message`.
    #[must_use]
    pub fn claim_error_message(mut self, enabled: bool) -> Self {
        self.claim_error_message = enabled;
        self
    }

    /// Defaults overridden by the `FORMERR_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`FormErrorOptions::from_env`], reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |name: &str| {
            lookup(name)
                .map(|v| {
                    let v = v.trim();
                    v == "1" || v.eq_ignore_ascii_case("true")
                })
                .unwrap_or(false)
        };
        Self {
            clear_on_submit: flag(ENV_CLEAR_ON_SUBMIT),
            clear_on_disconnect: flag(ENV_CLEAR_ON_DISCONNECT),
            require_template: flag(ENV_REQUIRE_TEMPLATE),
            ..Self::default()
        }
    }

    /// Parse options from JSON. Missing fields keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        serde_json::from_str(json).map_err(OptionsError::Json)
    }
}

/// Failure loading [`FormErrorOptions`].
#[cfg(feature = "serde")]
#[derive(Debug)]
pub enum OptionsError {
    /// Malformed JSON or a field of the wrong type.
    Json(serde_json::Error),
}

#[cfg(feature = "serde")]
impl std::fmt::Display for OptionsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid form-error options: {err}"),
        }
    }
}

#[cfg(feature = "serde")]
impl std::error::Error for OptionsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let options = FormErrorOptions::default();
        assert!(!options.clear_on_submit);
        assert!(!options.clear_on_disconnect);
        assert!(!options.require_template);
        assert_eq!(options.clear_notify, ClearNotify::Always);
        assert!(options.claim_error_message);
    }

    #[test]
    fn builder_chain() {
        let options = FormErrorOptions::new()
            .clear_on_submit(true)
            .clear_notify(ClearNotify::WhenVisible)
            .claim_error_message(false);
        assert!(options.clear_on_submit);
        assert_eq!(options.clear_notify, ClearNotify::WhenVisible);
        assert!(!options.claim_error_message);
    }

    #[test]
    fn lookup_accepts_one_and_true() {
        let vars: HashMap<&str, &str> = [
            (ENV_CLEAR_ON_SUBMIT, "1"),
            (ENV_CLEAR_ON_DISCONNECT, "TRUE"),
            (ENV_REQUIRE_TEMPLATE, "yes"),
        ]
        .into_iter()
        .collect();
        let options = FormErrorOptions::from_lookup(|name| vars.get(name).map(|v| (*v).to_owned()));
        assert!(options.clear_on_submit);
        assert!(options.clear_on_disconnect);
        assert!(!options.require_template);
    }

    #[test]
    fn lookup_with_nothing_set_is_default() {
        assert_eq!(FormErrorOptions::from_lookup(|_| None), FormErrorOptions::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_fills_missing_fields() {
        let options =
            FormErrorOptions::from_json(r#"{"clear_notify":"when-visible","require_template":true}"#)
                .unwrap();
        assert_eq!(options.clear_notify, ClearNotify::WhenVisible);
        assert!(options.require_template);
        assert!(options.claim_error_message);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_errors_are_reported() {
        let err = FormErrorOptions::from_json("{\"clear_on_submit\": 3}").unwrap_err();
        assert!(err.to_string().starts_with("invalid form-error options"));
    }
}
