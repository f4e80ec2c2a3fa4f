#![forbid(unsafe_code)]

//! Validity matcher: is this binding responsible for the control's current
//! failure?

use formerr_core::control::FormControl;
use formerr_core::validity::{ValidityKind, ValidityState};
use formerr_core::warn;

use crate::pattern::PatternFilter;

/// Parsed `validity` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidityFilter {
    /// No filter: any failing state matches.
    #[default]
    Any,
    /// Only this failure kind matches.
    Kind(ValidityKind),
    /// A name that is not a validity kind. Never matches.
    Unrecognized(String),
}

impl ValidityFilter {
    /// Parse an attribute value.
    ///
    /// Accepts dash (`range-overflow`) and camel (`rangeOverflow`) forms in
    /// any case. Blank input means [`ValidityFilter::Any`]. Unknown names are
    /// logged here, once per parse.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let name = raw.trim();
        if name.is_empty() {
            return Self::Any;
        }
        match ValidityKind::parse(name) {
            Some(kind) => Self::Kind(kind),
            None => {
                warn!(validity = name, "unrecognized validity kind; binding will never match");
                Self::Unrecognized(name.to_owned())
            }
        }
    }

    /// Configured kind, if any.
    #[must_use]
    pub fn kind(&self) -> Option<ValidityKind> {
        match self {
            Self::Kind(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Whether `state` is a failure this filter covers.
    #[must_use]
    pub fn matches_state(&self, state: ValidityState) -> bool {
        match self {
            Self::Any => !state.is_valid(),
            Self::Kind(kind) => state.has(*kind),
            Self::Unrecognized(_) => false,
        }
    }
}

/// Whether `control`'s current failure matches `filter`.
#[must_use]
pub fn matches(control: &dyn FormControl, filter: &ValidityFilter) -> bool {
    filter.matches_state(control.validity())
}

/// Full gate: `filter` matches and, with a pattern, the value fails it.
#[must_use]
pub fn applies(
    control: &dyn FormControl,
    filter: &ValidityFilter,
    pattern: Option<&PatternFilter>,
) -> bool {
    matches(control, filter) && pattern.is_none_or(|p| p.rejects(control.value()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use formerr_core::control::ControlKind;

    struct Control {
        validity: ValidityState,
        value: &'static str,
    }

    impl FormControl for Control {
        fn kind(&self) -> ControlKind {
            ControlKind::TextArea
        }
        fn validity(&self) -> ValidityState {
            self.validity
        }
        fn custom_validity(&self) -> &str {
            ""
        }
        fn set_custom_validity(&mut self, _message: &str) {}
        fn title(&self) -> Option<&str> {
            None
        }
        fn value(&self) -> &str {
            self.value
        }
    }

    fn failing(kind: ValidityKind) -> Control {
        Control {
            validity: ValidityState::new().with(kind),
            value: "",
        }
    }

    #[test]
    fn parse_forms() {
        assert_eq!(ValidityFilter::parse(""), ValidityFilter::Any);
        assert_eq!(ValidityFilter::parse("   "), ValidityFilter::Any);
        assert_eq!(
            ValidityFilter::parse("range-overflow"),
            ValidityFilter::Kind(ValidityKind::RangeOverflow)
        );
        assert_eq!(
            ValidityFilter::parse("rangeOverflow"),
            ValidityFilter::Kind(ValidityKind::RangeOverflow)
        );
        assert_eq!(
            ValidityFilter::parse("VALUE-MISSING"),
            ValidityFilter::Kind(ValidityKind::ValueMissing)
        );
        assert_eq!(
            ValidityFilter::parse("bogus"),
            ValidityFilter::Unrecognized("bogus".into())
        );
    }

    #[test]
    fn empty_filter_matches_any_failure() {
        assert!(matches(&failing(ValidityKind::StepMismatch), &ValidityFilter::Any));
        let valid = Control {
            validity: ValidityState::VALID,
            value: "",
        };
        assert!(!matches(&valid, &ValidityFilter::Any));
    }

    #[test]
    fn named_filter_matches_only_its_kind() {
        let filter = ValidityFilter::parse("type-mismatch");
        assert!(matches(&failing(ValidityKind::TypeMismatch), &filter));
        assert!(!matches(&failing(ValidityKind::ValueMissing), &filter));
    }

    #[test]
    fn unrecognized_never_matches() {
        let filter = ValidityFilter::parse("bogus");
        for kind in ValidityKind::ALL {
            assert!(!matches(&failing(kind), &filter));
        }
    }

    #[test]
    fn pattern_gate_requires_rejected_value() {
        let pattern = PatternFilter::compile("[0-9]+").unwrap();
        let mut control = failing(ValidityKind::CustomError);

        control.value = "123";
        assert!(!applies(&control, &ValidityFilter::Any, pattern.as_ref()));
        control.value = "12a";
        assert!(applies(&control, &ValidityFilter::Any, pattern.as_ref()));
        assert!(applies(&control, &ValidityFilter::Any, None));
    }
}
