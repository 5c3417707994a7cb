//! Minimum-amount gates for the manager's balance and stake.

use relreg_sdk::Wei;
use tracing::{info, warn};

/// Tracks an observed amount against a required minimum.
///
/// `refresh` reports whether satisfaction flipped; the owner decides what to do
/// about it (the registration manager re-renders its status report).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdGate {
    label: &'static str,
    required: Wei,
    current: Wei,
}

impl ThresholdGate {
    pub fn new(label: &'static str, required: Wei) -> Self {
        Self {
            label,
            required,
            current: Wei::ZERO,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn required(&self) -> Wei {
        self.required
    }

    pub fn current(&self) -> Wei {
        self.current
    }

    pub fn is_satisfied(&self) -> bool {
        self.current >= self.required
    }

    /// Record a freshly observed amount. Returns `true` if satisfaction changed.
    pub fn refresh(&mut self, current: Wei) -> bool {
        let was_satisfied = self.is_satisfied();
        self.current = current;
        self.log_transition(was_satisfied)
    }

    /// Change the required amount (config reload). Returns `true` if satisfaction changed.
    pub fn set_required(&mut self, required: Wei) -> bool {
        let was_satisfied = self.is_satisfied();
        self.required = required;
        self.log_transition(was_satisfied)
    }

    /// One status line, e.g. `Balance       | false | actual: 3 | required: 10`.
    pub fn description(&self) -> String {
        format!(
            "{:<14}| {} | actual: {} | required: {}",
            self.label,
            self.is_satisfied(),
            self.current,
            self.required
        )
    }

    fn log_transition(&self, was_satisfied: bool) -> bool {
        let satisfied = self.is_satisfied();
        if satisfied == was_satisfied {
            return false;
        }
        if satisfied {
            info!(
                gate = self.label,
                current = %self.current,
                required = %self.required,
                "Requirement has been satisfied"
            );
        } else {
            warn!(
                gate = self.label,
                current = %self.current,
                required = %self.required,
                "Requirement was satisfied but is no longer"
            );
        }
        true
    }
}
