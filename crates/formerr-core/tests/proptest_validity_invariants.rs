//! Property-based invariant tests for validity kinds and states.
//!
//! 1. Every kind parses from its attribute name under any ASCII casing.
//! 2. Every kind parses from its flag name under any ASCII casing.
//! 3. A state is valid iff it has no failing kind.
//! 4. `primary_failure` is always one of the failing kinds.
//! 5. Parsing never panics on arbitrary input.

use formerr_core::validity::{ValidityKind, ValidityState};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn kind_strategy() -> impl Strategy<Value = ValidityKind> {
    (0usize..ValidityKind::ALL.len()).prop_map(|i| ValidityKind::ALL[i])
}

fn state_strategy() -> impl Strategy<Value = ValidityState> {
    proptest::collection::vec(kind_strategy(), 0..6)
        .prop_map(|kinds| kinds.into_iter().collect())
}

fn recase(name: &str, mask: &[bool]) -> String {
    name.chars()
        .zip(mask.iter().cycle())
        .map(|(c, upper)| {
            if *upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Case-insensitive parsing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn attribute_name_parses_under_any_casing(
        kind in kind_strategy(),
        mask in proptest::collection::vec(any::<bool>(), 1..8),
    ) {
        let name = recase(kind.attribute_name(), &mask);
        prop_assert_eq!(ValidityKind::parse(&name), Some(kind), "name={}", name);
    }

    #[test]
    fn flag_name_parses_under_any_casing(
        kind in kind_strategy(),
        mask in proptest::collection::vec(any::<bool>(), 1..8),
    ) {
        let name = recase(kind.flag_name(), &mask);
        prop_assert_eq!(ValidityKind::parse(&name), Some(kind), "name={}", name);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3-4. State invariants
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn valid_iff_no_failures(state in state_strategy()) {
        prop_assert_eq!(state.is_valid(), state.kinds().next().is_none());
    }

    #[test]
    fn primary_failure_is_failing(state in state_strategy()) {
        match state.primary_failure() {
            Some(kind) => prop_assert!(state.has(kind)),
            None => prop_assert!(state.is_valid()),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. No panics
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn parse_never_panics(raw in ".{0,24}") {
        let _ = ValidityKind::parse(&raw);
    }
}
