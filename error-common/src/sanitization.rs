// Sanitization of error text before it leaves the service boundary

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CONNECTION_STRING_REGEX: Regex =
        Regex::new(r"(?i)\b(postgres(?:ql)?|mysql|redis)://[^\s]+").unwrap();
    static ref PASSWORD_PAIR_REGEX: Regex = Regex::new(r"(?i)password\s*=\s*[^\s;]+").unwrap();
}

const MAX_MESSAGE_LEN: usize = 512;

/// Reduce an error message to something safe to show a user.
///
/// Keeps only the first line (driver errors append DETAIL/HINT lines),
/// masks connection strings and inline passwords, and caps the length.
pub fn sanitize_message(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or_default().trim();
    let masked = CONNECTION_STRING_REGEX.replace_all(first_line, "$1://[REDACTED]");
    let masked = PASSWORD_PAIR_REGEX.replace_all(&masked, "password=[REDACTED]");

    if masked.chars().count() > MAX_MESSAGE_LEN {
        let truncated: String = masked.chars().take(MAX_MESSAGE_LEN).collect();
        format!("{truncated}...")
    } else {
        masked.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_driver_detail_lines() {
        let raw = "Database error: duplicate key value\nDETAIL: Key (bill_number)=(BILL-1) already exists.";
        assert_eq!(sanitize_message(raw), "Database error: duplicate key value");
    }

    #[test]
    fn masks_connection_strings() {
        let raw = "Connection failed: postgres://ward:secret@db:5432/wardcare refused";
        assert_eq!(
            sanitize_message(raw),
            "Connection failed: postgres://[REDACTED] refused"
        );
        assert_eq!(
            sanitize_message("host=db password=hunter2 user=ward"),
            "host=db password=[REDACTED] user=ward"
        );
    }

    #[test]
    fn caps_very_long_messages() {
        let raw = "x".repeat(2000);
        let clean = sanitize_message(&raw);
        assert!(clean.ends_with("..."));
        assert_eq!(clean.len(), MAX_MESSAGE_LEN + 3);
    }
}
