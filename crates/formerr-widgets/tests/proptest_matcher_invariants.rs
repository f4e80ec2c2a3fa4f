//! Property-based invariant tests for the matcher, the pattern filter, and
//! the binding lifecycle.
//!
//! 1. A named filter matches a failure iff the kinds are equal.
//! 2. A blank filter matches iff the control is invalid.
//! 3. Unrecognized filters never match.
//! 4. Escaped literal patterns accept exactly their literal.
//! 5. Under any sequence of host operations, at most one listener set is
//!    live and the lifecycle state agrees with the wiring.

use formerr_core::control::{ControlKind, FormControl};
use formerr_core::event::KeyCode;
use formerr_core::validity::{ValidityKind, ValidityState};
use formerr_dom::{Document, NodeId};
use formerr_widgets::matcher::{self, ValidityFilter};
use formerr_widgets::{BindingState, FormError, FormErrorOptions, PatternFilter, define_form_error};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

struct Control(ValidityState);

impl FormControl for Control {
    fn kind(&self) -> ControlKind {
        ControlKind::Select
    }
    fn validity(&self) -> ValidityState {
        self.0
    }
    fn custom_validity(&self) -> &str {
        ""
    }
    fn set_custom_validity(&mut self, _message: &str) {}
    fn title(&self) -> Option<&str> {
        None
    }
    fn value(&self) -> &str {
        ""
    }
}

fn kind_strategy() -> impl Strategy<Value = ValidityKind> {
    (0usize..ValidityKind::ALL.len()).prop_map(|i| ValidityKind::ALL[i])
}

fn state_strategy() -> impl Strategy<Value = ValidityState> {
    proptest::collection::vec(kind_strategy(), 0..4).prop_map(|kinds| kinds.into_iter().collect())
}

/// A kind name in dash or camel form with random casing.
fn spelled(kind: ValidityKind, dashed: bool, upper: &[bool]) -> String {
    let base = if dashed {
        kind.attribute_name()
    } else {
        kind.flag_name()
    };
    base.chars()
        .zip(upper.iter().cycle())
        .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3. Matcher
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn named_filter_matches_iff_same_kind(
        filter_kind in kind_strategy(),
        failing in kind_strategy(),
        dashed in any::<bool>(),
        upper in proptest::collection::vec(any::<bool>(), 1..6),
    ) {
        let filter = ValidityFilter::parse(&spelled(filter_kind, dashed, &upper));
        let control = Control(ValidityState::new().with(failing));
        prop_assert_eq!(matcher::matches(&control, &filter), filter_kind == failing);
    }

    #[test]
    fn blank_filter_matches_iff_invalid(
        state in state_strategy(),
        blank in "[ \t\n]{0,4}",
    ) {
        let filter = ValidityFilter::parse(&blank);
        prop_assert_eq!(filter.clone(), ValidityFilter::Any);
        prop_assert_eq!(matcher::matches(&Control(state), &filter), !state.is_valid());
    }

    #[test]
    fn unrecognized_filters_never_match(
        raw in "[a-z]{1,12}",
        state in state_strategy(),
    ) {
        let filter = ValidityFilter::parse(&raw);
        if let ValidityFilter::Unrecognized(_) = filter {
            prop_assert!(!matcher::matches(&Control(state), &filter));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Pattern filter
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn escaped_literal_matches_only_itself(
        literal in "[a-z0-9.*+?()|]{1,10}",
        other in "[a-z0-9.*+?()|]{0,10}",
    ) {
        let filter = PatternFilter::compile(&regex::escape(&literal))
            .expect("escaped literal compiles")
            .expect("non-empty source");
        prop_assert!(filter.is_match(&literal));
        prop_assert_eq!(filter.is_match(&other), other == literal);
    }

    #[test]
    fn compile_never_panics(source in ".{0,24}") {
        let _ = PatternFilter::compile(&source);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Lifecycle under arbitrary host operations
// ═════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
enum Op {
    Fail(usize, ValidityKind),
    Pass(usize),
    Report(usize),
    Blur(usize),
    Enter(usize),
    Reset,
    Point(usize),
    PointMissing,
    Detach,
    Attach,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..2, kind_strategy()).prop_map(|(i, k)| Op::Fail(i, k)),
        (0usize..2).prop_map(Op::Pass),
        (0usize..2).prop_map(Op::Report),
        (0usize..2).prop_map(Op::Blur),
        (0usize..2).prop_map(Op::Enter),
        Just(Op::Reset),
        (0usize..2).prop_map(Op::Point),
        Just(Op::PointMissing),
        Just(Op::Detach),
        Just(Op::Attach),
    ]
}

const IDS: [&str; 2] = ["first", "second"];

fn build() -> (Document, NodeId, [NodeId; 2], FormError) {
    let doc = Document::new();
    define_form_error(&doc, FormErrorOptions::default(), None).unwrap();
    let form = doc.create_element("form");
    doc.append_child(doc.body(), form).unwrap();
    let controls = IDS.map(|id| {
        let input = doc.create_element("input");
        doc.set_attribute(input, "id", id).unwrap();
        doc.append_child(form, input).unwrap();
        input
    });
    let node = doc.create_element("form-error");
    doc.set_attribute(node, "for", IDS[0]).unwrap();
    doc.append_child(form, node).unwrap();
    let binding = FormError::from_node(&doc, node).unwrap();
    (doc, form, controls, binding)
}

proptest! {
    #[test]
    fn one_listener_set_at_a_time(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let (doc, form, controls, binding) = build();

        for op in ops {
            match op {
                Op::Fail(i, kind) => {
                    doc.set_validity(controls[i], ValidityState::new().with(kind)).unwrap();
                }
                Op::Pass(i) => doc.set_validity(controls[i], ValidityState::VALID).unwrap(),
                Op::Report(i) => {
                    doc.report_validity(controls[i]);
                }
                Op::Blur(i) => doc.blur(controls[i]),
                Op::Enter(i) => {
                    doc.key_down(controls[i], KeyCode::Enter);
                }
                Op::Reset => {
                    doc.reset(form);
                }
                Op::Point(i) => binding.set_html_for(&doc, IDS[i]).unwrap(),
                Op::PointMissing => binding.set_html_for(&doc, "missing").unwrap(),
                Op::Detach => doc.remove(binding.node()).unwrap(),
                Op::Attach => {
                    if doc.parent(binding.node()).is_none() {
                        doc.append_child(form, binding.node()).unwrap();
                    }
                }
            }

            let wired = controls
                .iter()
                .filter(|c| doc.live_listener_count(**c) > 0)
                .count();
            prop_assert!(wired <= 1, "listeners on {} controls", wired);

            let state = binding.state();
            prop_assert_eq!(state == BindingState::Wired, binding.wired_control().is_some());
            prop_assert_eq!(state == BindingState::Wired, !binding.epoch().is_none());
            if let Some(control) = binding.wired_control() {
                prop_assert_eq!(doc.live_listener_count(control), 3);
                prop_assert_eq!(doc.live_listener_count(form), 1);
            } else {
                prop_assert_eq!(doc.live_listener_count(form), 0);
            }
        }
    }
}
