//! Ticket status constants, numbering and submitter rules.
//!
//! Defines the valid ticket statuses, how `finished_at` follows a status
//! change, how the next human-facing ticket number is derived, and who a
//! ticket is recorded as submitted by.

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Initial status for a newly filed ticket.
pub const STATUS_OPEN: &str = "open";
/// Someone is working on the ticket.
pub const STATUS_IN_PROGRESS: &str = "in_progress";
/// The ticket is resolved. Only this status carries a `finished_at`.
pub const STATUS_CLOSED: &str = "closed";

/// All valid ticket statuses, in their stored (lowercase) form.
pub const VALID_STATUSES: &[&str] = &[STATUS_OPEN, STATUS_IN_PROGRESS, STATUS_CLOSED];

// ---------------------------------------------------------------------------
// Validation constants
// ---------------------------------------------------------------------------

/// Maximum length of a ticket title (characters).
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of a ticket description or comment body (characters).
pub const MAX_BODY_LENGTH: usize = 20_000;

/// Prefix of the generated name recorded for anonymous submitters.
pub const ANONYMOUS_PREFIX: &str = "anon";

// ---------------------------------------------------------------------------
// Status handling
// ---------------------------------------------------------------------------

/// Normalize a user-supplied status to its stored form.
///
/// Matching is case-insensitive and ignores surrounding whitespace, so
/// `"Closed"`, `" CLOSED "` and `"closed"` all map to [`STATUS_CLOSED`].
pub fn normalize_status(input: &str) -> Result<&'static str, CoreError> {
    let lowered = input.trim().to_lowercase();
    VALID_STATUSES
        .iter()
        .copied()
        .find(|s| *s == lowered)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid ticket status '{}'. Must be one of: {:?}",
                input, VALID_STATUSES
            ))
        })
}

/// Whether a status counts as closed (case-insensitive).
pub fn is_closed(status: &str) -> bool {
    status.trim().eq_ignore_ascii_case(STATUS_CLOSED)
}

/// The `finished_at` value a ticket must carry after moving to `status`.
///
/// Closing stamps `now`; every other status clears the timestamp.
pub fn finished_at_for(status: &str, now: Timestamp) -> Option<Timestamp> {
    if is_closed(status) {
        Some(now)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Numbering and submitter
// ---------------------------------------------------------------------------

/// Next ticket number given the current maximum (`None` when no tickets exist).
pub fn next_ticket_number(current_max: Option<i64>) -> i64 {
    current_max.unwrap_or(0) + 1
}

/// Pseudo-name recorded for an anonymous ticket.
pub fn anonymous_name(ticket_number: i64) -> String {
    format!("{ANONYMOUS_PREFIX}{ticket_number}")
}

/// Resolve who a ticket is recorded as submitted by.
///
/// Precedence: the authenticated username, then a non-blank supplied name,
/// then the generated anonymous name for `ticket_number`.
pub fn resolve_submitter(
    authenticated: Option<&str>,
    supplied: Option<&str>,
    ticket_number: i64,
) -> String {
    if let Some(username) = authenticated {
        return username.to_string();
    }
    match supplied.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => anonymous_name(ticket_number),
    }
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Validate a ticket title: non-blank and at most [`MAX_TITLE_LENGTH`] characters.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters (got {len})"
        )));
    }
    Ok(())
}

/// Validate free text such as a description or comment body.
pub fn validate_body(field: &str, body: &str) -> Result<(), CoreError> {
    if body.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    let len = body.chars().count();
    if len > MAX_BODY_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {MAX_BODY_LENGTH} characters (got {len})"
        )));
    }
    Ok(())
}

/// Build an `ILIKE` pattern matching `query` as a literal substring.
///
/// `%`, `_` and `\` are escaped. Returns `None` for a blank query, which
/// means "no filter".
pub fn title_filter_pattern(query: Option<&str>) -> Option<String> {
    let q = query.map(str::trim).filter(|q| !q.is_empty())?;
    let mut escaped = String::with_capacity(q.len() + 2);
    escaped.push('%');
    for c in q.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    Some(escaped)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn statuses_normalize_case_insensitively() {
        assert_eq!(normalize_status("Closed").unwrap(), STATUS_CLOSED);
        assert_eq!(normalize_status(" OPEN ").unwrap(), STATUS_OPEN);
        assert_eq!(normalize_status("In_Progress").unwrap(), STATUS_IN_PROGRESS);
    }

    #[test]
    fn unknown_status_is_invalid() {
        assert!(normalize_status("resolved").is_err());
        assert!(normalize_status("").is_err());
    }

    #[test]
    fn closing_sets_finished_at() {
        let now = Utc::now();
        assert_eq!(finished_at_for("closed", now), Some(now));
        assert_eq!(finished_at_for("CLOSED", now), Some(now));
    }

    #[test]
    fn other_statuses_clear_finished_at() {
        let now = Utc::now();
        assert_eq!(finished_at_for("open", now), None);
        assert_eq!(finished_at_for("in_progress", now), None);
    }

    #[test]
    fn numbering_starts_at_one() {
        assert_eq!(next_ticket_number(None), 1);
        assert_eq!(next_ticket_number(Some(41)), 42);
    }

    #[test]
    fn authenticated_user_wins_over_supplied_name() {
        assert_eq!(resolve_submitter(Some("alice"), Some("bob"), 3), "alice");
    }

    #[test]
    fn supplied_name_used_without_session() {
        assert_eq!(resolve_submitter(None, Some("  bob "), 3), "bob");
    }

    #[test]
    fn blank_name_falls_back_to_anonymous() {
        assert_eq!(resolve_submitter(None, Some("   "), 7), "anon7");
        assert_eq!(resolve_submitter(None, None, 12), "anon12");
    }

    #[test]
    fn title_rules() {
        assert!(validate_title("Printer on fire").is_ok());
        assert!(validate_title("  ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH)).is_ok());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }

    #[test]
    fn body_must_not_be_blank() {
        let err = validate_body("Comment", "\n\t").unwrap_err();
        assert!(err.to_string().contains("Comment must not be empty"));
    }

    #[test]
    fn filter_pattern_escapes_wildcards() {
        assert_eq!(title_filter_pattern(Some("vpn")), Some("%vpn%".to_string()));
        assert_eq!(
            title_filter_pattern(Some("100%_done")),
            Some("%100\\%\\_done%".to_string())
        );
        assert_eq!(title_filter_pattern(Some("  ")), None);
        assert_eq!(title_filter_pattern(None), None);
    }
}
