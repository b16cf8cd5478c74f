//! Operator-facing text for blocks and end-of-turn reminders.

use super::changes::ChangeSummary;

/// The fixed message returned when a push is blocked.
pub fn block_message(validation_command: &str) -> String {
    format!(
        "CI has not passed for the current changes. Run `{}` and wait for it to succeed before pushing.",
        validation_command
    )
}

/// Reminder text for unvalidated changes, or `None` when there are none.
pub fn compose(summary: &ChangeSummary, trunk: &str, validation_command: &str) -> Option<String> {
    let mut parts = Vec::new();
    if summary.uncommitted {
        parts.push("uncommitted changes".to_string());
    }
    if summary.ahead > 0 {
        parts.push(format!("{} commit(s) ahead of {}", summary.ahead, trunk));
    }
    if parts.is_empty() {
        return None;
    }

    Some(format!(
        "CI has not passed for {}. Run `{}` before pushing.",
        parts.join(" and "),
        validation_command
    ))
}
