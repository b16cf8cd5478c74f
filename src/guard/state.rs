//! The two-state gate.

/// Whether validation has passed for the changes currently present.
///
/// Only two transitions exist: a successful validation run opens the gate,
/// and any change-set mutation closes it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Unvalidated,
    Validated,
}

impl GateState {
    pub fn is_validated(&self) -> bool {
        matches!(self, GateState::Validated)
    }

    /// A validation command finished successfully.
    pub fn observe_validation_success(&mut self) {
        *self = GateState::Validated;
    }

    /// Files were edited or history was rewritten.
    pub fn observe_mutation(&mut self) {
        *self = GateState::Unvalidated;
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Unvalidated => "unvalidated",
            GateState::Validated => "validated",
        }
    }
}

impl std::fmt::Display for GateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
