#![forbid(unsafe_code)]

//! Structured validity state for form controls.
//!
//! A control's validity is a set of independent failure flags, one per
//! [`ValidityKind`]. A control is valid exactly when no flag is set.
//!
//! Kind names arrive from markup in two spellings: the attribute form
//! (`range-overflow`) and the native flag form (`rangeOverflow`). Both are
//! accepted case-insensitively by [`ValidityKind::parse`].
//!
//! # Example
//!
//! ```
//! use formerr_core::validity::{ValidityKind, ValidityState};
//!
//! let state = ValidityState::new().with(ValidityKind::TypeMismatch);
//! assert!(!state.is_valid());
//! assert_eq!(ValidityKind::parse("Type-Mismatch"), Some(ValidityKind::TypeMismatch));
//! assert_eq!(ValidityKind::parse("typeMismatch"), Some(ValidityKind::TypeMismatch));
//! ```

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

// ---------------------------------------------------------------------------
// ValidityKind
// ---------------------------------------------------------------------------

/// One of the platform-defined constraint failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ValidityKind {
    BadInput,
    CustomError,
    PatternMismatch,
    RangeOverflow,
    RangeUnderflow,
    StepMismatch,
    TooLong,
    TooShort,
    TypeMismatch,
    ValueMissing,
}

impl ValidityKind {
    /// Every kind, in attribute-name order.
    pub const ALL: [Self; 10] = [
        Self::BadInput,
        Self::CustomError,
        Self::PatternMismatch,
        Self::RangeOverflow,
        Self::RangeUnderflow,
        Self::StepMismatch,
        Self::TooLong,
        Self::TooShort,
        Self::TypeMismatch,
        Self::ValueMissing,
    ];

    /// Order in which a native validation message is chosen when several
    /// flags are set at once.
    pub const MESSAGE_PRIORITY: [Self; 10] = [
        Self::CustomError,
        Self::ValueMissing,
        Self::TypeMismatch,
        Self::PatternMismatch,
        Self::TooLong,
        Self::TooShort,
        Self::RangeUnderflow,
        Self::RangeOverflow,
        Self::StepMismatch,
        Self::BadInput,
    ];

    /// Dashed attribute spelling, e.g. `range-overflow`.
    #[must_use]
    pub const fn attribute_name(self) -> &'static str {
        match self {
            Self::BadInput => "bad-input",
            Self::CustomError => "custom-error",
            Self::PatternMismatch => "pattern-mismatch",
            Self::RangeOverflow => "range-overflow",
            Self::RangeUnderflow => "range-underflow",
            Self::StepMismatch => "step-mismatch",
            Self::TooLong => "too-long",
            Self::TooShort => "too-short",
            Self::TypeMismatch => "type-mismatch",
            Self::ValueMissing => "value-missing",
        }
    }

    /// Native flag spelling, e.g. `rangeOverflow`.
    #[must_use]
    pub const fn flag_name(self) -> &'static str {
        match self {
            Self::BadInput => "badInput",
            Self::CustomError => "customError",
            Self::PatternMismatch => "patternMismatch",
            Self::RangeOverflow => "rangeOverflow",
            Self::RangeUnderflow => "rangeUnderflow",
            Self::StepMismatch => "stepMismatch",
            Self::TooLong => "tooLong",
            Self::TooShort => "tooShort",
            Self::TypeMismatch => "typeMismatch",
            Self::ValueMissing => "valueMissing",
        }
    }

    /// The flag bit for this kind.
    #[must_use]
    pub const fn flag(self) -> ValidityFlags {
        match self {
            Self::BadInput => ValidityFlags::BAD_INPUT,
            Self::CustomError => ValidityFlags::CUSTOM_ERROR,
            Self::PatternMismatch => ValidityFlags::PATTERN_MISMATCH,
            Self::RangeOverflow => ValidityFlags::RANGE_OVERFLOW,
            Self::RangeUnderflow => ValidityFlags::RANGE_UNDERFLOW,
            Self::StepMismatch => ValidityFlags::STEP_MISMATCH,
            Self::TooLong => ValidityFlags::TOO_LONG,
            Self::TooShort => ValidityFlags::TOO_SHORT,
            Self::TypeMismatch => ValidityFlags::TYPE_MISMATCH,
            Self::ValueMissing => ValidityFlags::VALUE_MISSING,
        }
    }

    /// Generic browser-style message for this failure.
    ///
    /// Controls refine some of these (an email input's type mismatch, a
    /// select's missing value). `CustomError` has no generic text: the
    /// control's custom message is used instead.
    #[must_use]
    pub const fn native_message(self) -> &'static str {
        match self {
            Self::BadInput => "Please enter a valid value.",
            Self::CustomError => "",
            Self::PatternMismatch => "Please match the requested format.",
            Self::RangeOverflow => "Value must be less than or equal to the maximum.",
            Self::RangeUnderflow => "Value must be greater than or equal to the minimum.",
            Self::StepMismatch => "Please enter a valid value.",
            Self::TooLong => "Please shorten this text.",
            Self::TooShort => "Please lengthen this text.",
            Self::TypeMismatch => "Please enter a valid value.",
            Self::ValueMissing => "Please fill out this field.",
        }
    }

    /// Parse a kind name in either spelling, ignoring case and surrounding
    /// whitespace.
    ///
    /// Dashed names must split on the same word boundaries as the native
    /// flag (`range-overflow`, not `range-over-flow`). Returns `None` for
    /// empty or unrecognized input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.contains('-') {
            let normalized = normalize_kind_name(raw);
            Self::ALL.into_iter().find(|k| k.flag_name() == normalized)
        } else {
            Self::ALL
                .into_iter()
                .find(|k| k.flag_name().eq_ignore_ascii_case(raw))
        }
    }
}

impl fmt::Display for ValidityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute_name())
    }
}

impl FromStr for ValidityKind {
    type Err = UnknownValidityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownValidityKind {
            name: s.trim().to_owned(),
        })
    }
}

/// Convert a dashed kind name to native flag casing.
///
/// The input is lowercased, then every segment after the first has its first
/// letter capitalized: `RANGE-overflow` becomes `rangeOverflow`. Empty
/// segments (doubled dashes) are dropped.
#[must_use]
pub fn normalize_kind_name(raw: &str) -> String {
    let lowered = raw.trim().to_ascii_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for (i, segment) in lowered.split('-').filter(|s| !s.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(segment);
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Error returned when a validity kind name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValidityKind {
    /// The offending name, trimmed.
    pub name: String,
}

impl fmt::Display for UnknownValidityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown validity kind: {:?}", self.name)
    }
}

impl std::error::Error for UnknownValidityKind {}

// ---------------------------------------------------------------------------
// ValidityFlags
// ---------------------------------------------------------------------------

bitflags! {
    /// Bit set of failing validity kinds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ValidityFlags: u16 {
        const BAD_INPUT        = 1 << 0;
        const CUSTOM_ERROR     = 1 << 1;
        const PATTERN_MISMATCH = 1 << 2;
        const RANGE_OVERFLOW   = 1 << 3;
        const RANGE_UNDERFLOW  = 1 << 4;
        const STEP_MISMATCH    = 1 << 5;
        const TOO_LONG         = 1 << 6;
        const TOO_SHORT        = 1 << 7;
        const TYPE_MISMATCH    = 1 << 8;
        const VALUE_MISSING    = 1 << 9;
    }
}

// ---------------------------------------------------------------------------
// ValidityState
// ---------------------------------------------------------------------------

/// A control's current structured validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ValidityState {
    flags: ValidityFlags,
}

impl ValidityState {
    /// A valid state (no flags set).
    pub const VALID: Self = Self {
        flags: ValidityFlags::empty(),
    };

    /// Create a valid state.
    #[must_use]
    pub const fn new() -> Self {
        Self::VALID
    }

    /// Create a state from raw flags.
    #[must_use]
    pub const fn from_flags(flags: ValidityFlags) -> Self {
        Self { flags }
    }

    /// Return a copy with `kind` set.
    #[must_use]
    pub fn with(mut self, kind: ValidityKind) -> Self {
        self.flags.insert(kind.flag());
        self
    }

    /// Set or clear a single flag.
    pub fn set(&mut self, kind: ValidityKind, failing: bool) {
        self.flags.set(kind.flag(), failing);
    }

    /// Whether `kind` is currently failing.
    #[must_use]
    pub const fn has(&self, kind: ValidityKind) -> bool {
        self.flags.contains(kind.flag())
    }

    /// Aggregate validity: `true` when no flag is set.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.flags.is_empty()
    }

    /// Raw flags.
    #[must_use]
    pub const fn flags(&self) -> ValidityFlags {
        self.flags
    }

    /// Union of two states.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            flags: self.flags.union(other.flags),
        }
    }

    /// Failing kinds in attribute-name order.
    pub fn kinds(&self) -> impl Iterator<Item = ValidityKind> + '_ {
        ValidityKind::ALL.into_iter().filter(|k| self.has(*k))
    }

    /// The failure whose message a browser would report first.
    #[must_use]
    pub fn primary_failure(&self) -> Option<ValidityKind> {
        ValidityKind::MESSAGE_PRIORITY
            .into_iter()
            .find(|k| self.has(*k))
    }
}

impl FromIterator<ValidityKind> for ValidityState {
    fn from_iter<I: IntoIterator<Item = ValidityKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::VALID, Self::with)
    }
}

impl From<ValidityFlags> for ValidityState {
    fn from(flags: ValidityFlags) -> Self {
        Self::from_flags(flags)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_both_spellings() {
        for kind in ValidityKind::ALL {
            assert_eq!(ValidityKind::parse(kind.attribute_name()), Some(kind));
            assert_eq!(ValidityKind::parse(kind.flag_name()), Some(kind));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            ValidityKind::parse("RANGE-OVERFLOW"),
            Some(ValidityKind::RangeOverflow)
        );
        assert_eq!(
            ValidityKind::parse("rangeoverflow"),
            Some(ValidityKind::RangeOverflow)
        );
        assert_eq!(
            ValidityKind::parse("  Value-Missing "),
            Some(ValidityKind::ValueMissing)
        );
    }

    #[test]
    fn parse_rejects_misaligned_segments() {
        assert_eq!(ValidityKind::parse("range-over-flow"), None);
        assert_eq!(ValidityKind::parse("rangeoverflow-"), None);
    }

    #[test]
    fn parse_rejects_unknown_and_empty() {
        assert_eq!(ValidityKind::parse(""), None);
        assert_eq!(ValidityKind::parse("   "), None);
        assert_eq!(ValidityKind::parse("too-wide"), None);
    }

    #[test]
    fn from_str_reports_name() {
        let err = "nope".parse::<ValidityKind>().unwrap_err();
        assert_eq!(err.name, "nope");
        assert_eq!(err.to_string(), "unknown validity kind: \"nope\"");
    }

    #[test]
    fn normalize_camel_cases_segments() {
        assert_eq!(normalize_kind_name("pattern-mismatch"), "patternMismatch");
        assert_eq!(normalize_kind_name("TOO--SHORT"), "tooShort");
        assert_eq!(normalize_kind_name("valueMissing"), "valuemissing");
    }

    #[test]
    fn state_tracks_flags() {
        let mut state = ValidityState::new();
        assert!(state.is_valid());

        state.set(ValidityKind::TooShort, true);
        assert!(!state.is_valid());
        assert!(state.has(ValidityKind::TooShort));
        assert!(!state.has(ValidityKind::TooLong));

        state.set(ValidityKind::TooShort, false);
        assert!(state.is_valid());
    }

    #[test]
    fn primary_failure_follows_priority() {
        let state: ValidityState = [ValidityKind::StepMismatch, ValidityKind::ValueMissing]
            .into_iter()
            .collect();
        assert_eq!(state.primary_failure(), Some(ValidityKind::ValueMissing));
        assert_eq!(ValidityState::VALID.primary_failure(), None);
    }

    #[test]
    fn kinds_lists_failures_in_order() {
        let state = ValidityState::new()
            .with(ValidityKind::ValueMissing)
            .with(ValidityKind::BadInput);
        let kinds: Vec<_> = state.kinds().collect();
        assert_eq!(kinds, vec![ValidityKind::BadInput, ValidityKind::ValueMissing]);
    }

    #[test]
    fn union_merges_flags() {
        let a = ValidityState::new().with(ValidityKind::TooLong);
        let b = ValidityState::new().with(ValidityKind::CustomError);
        let merged = a.union(b);
        assert!(merged.has(ValidityKind::TooLong));
        assert!(merged.has(ValidityKind::CustomError));
    }
}
