#![forbid(unsafe_code)]

//! Constraint validation entry points.
//!
//! These mirror what a browser does when validation is triggered: `invalid`
//! is fired on each failing control, and a native report is recorded for a
//! control whose `invalid` event nobody cancelled. The host drives them; the
//! document never validates on its own.

use formerr_core::control::ControlKind;
use formerr_core::event::{EventType, KeyCode};
use formerr_core::{debug, trace};

use crate::event::Event;
use crate::{Document, NodeId};

/// Native reports retained before the oldest is dropped.
pub const MAX_NATIVE_REPORTS: usize = 64;

impl Document {
    /// Fire `invalid` at `control` if it fails. Returns whether it is valid.
    ///
    /// Non-controls are always valid.
    pub fn check_validity(&self, control: NodeId) -> bool {
        self.fire_invalid(control).is_none()
    }

    /// Like [`Document::check_validity`], but an uncancelled `invalid` event
    /// also records a native report for the control.
    pub fn report_validity(&self, control: NodeId) -> bool {
        match self.fire_invalid(control) {
            None => true,
            Some(prevented) => {
                if !prevented {
                    self.record_native_report(control);
                }
                false
            }
        }
    }

    /// Validate every submittable control of `form`, then fire `submit` if
    /// all of them pass.
    ///
    /// Only the first control whose `invalid` event was left uncancelled is
    /// reported natively. Returns whether the submission went ahead.
    pub fn request_submit(&self, form: NodeId) -> bool {
        let mut all_valid = true;
        let mut reported = false;
        for control in self.form_controls(form) {
            let submittable = !matches!(
                self.control_kind(control),
                Some(ControlKind::FieldSet | ControlKind::Output)
            );
            if !submittable {
                continue;
            }
            if let Some(prevented) = self.fire_invalid(control) {
                all_valid = false;
                if !prevented && !reported {
                    self.record_native_report(control);
                    reported = true;
                }
            }
        }
        if !all_valid {
            debug!(form = %form, "submission blocked by invalid controls");
            return false;
        }
        self.dispatch_event(&mut Event::new(EventType::Submit, form))
    }

    /// Fire `reset` at `form`; unless cancelled, restore each control's
    /// default value. Returns whether the reset went ahead.
    pub fn reset(&self, form: NodeId) -> bool {
        if !self.dispatch_event(&mut Event::new(EventType::Reset, form)) {
            return false;
        }
        let controls = self.form_controls(form);
        let mut tree = self.tree.borrow_mut();
        for control in controls {
            if let Some(c) = tree.control_mut(control) {
                c.core_mut().restore_default();
            }
        }
        true
    }

    /// Fire `blur` at `node`.
    pub fn blur(&self, node: NodeId) {
        self.dispatch_event(&mut Event::new(EventType::Blur, node));
    }

    /// Fire `keydown` for `key` at `node`. Returns `false` if cancelled.
    pub fn key_down(&self, node: NodeId, key: KeyCode) -> bool {
        self.dispatch_event(&mut Event::key_down(node, key))
    }

    /// Controls that received a native validation report, oldest first.
    ///
    /// Only the last [`MAX_NATIVE_REPORTS`] are kept.
    #[must_use]
    pub fn native_reports(&self) -> Vec<NodeId> {
        self.native_reports.borrow().iter().copied().collect()
    }

    /// Drain the recorded native reports.
    pub fn take_native_reports(&self) -> Vec<NodeId> {
        self.native_reports.borrow_mut().drain(..).collect()
    }

    /// `None` if valid, otherwise whether `invalid` was cancelled.
    fn fire_invalid(&self, control: NodeId) -> Option<bool> {
        let valid = self
            .with_control(control, |c| c.validity().is_valid())
            .unwrap_or(true);
        if valid {
            return None;
        }
        let mut event = Event::new(EventType::Invalid, control);
        let proceed = self.dispatch_event(&mut event);
        Some(!proceed)
    }

    fn record_native_report(&self, control: NodeId) {
        trace!(control = %control, "native validation report");
        let mut reports = self.native_reports.borrow_mut();
        if reports.len() == MAX_NATIVE_REPORTS {
            reports.pop_front();
        }
        reports.push_back(control);
    }
}
