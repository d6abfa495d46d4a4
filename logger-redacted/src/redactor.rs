use regex::Regex;
use lazy_static::lazy_static;
use sha2::{Sha256, Digest};
use base64::{Engine as _, engine::general_purpose};

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
    // Local and international numbers: "+91 98765 43210", "(555) 123-4567", "9876543210"
    static ref PHONE_REGEX: Regex = Regex::new(r"(?:\+\d{1,3}[-.\s]?)?(?:\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}|\d{5}[-.\s]?\d{5})\b").unwrap();
    static ref CARD_REGEX: Regex = Regex::new(r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b").unwrap();
}

/// Record fields that always carry patient-identifying free text
const SENSITIVE_FIELDS: &[&str] = &["name", "emergency_contact", "phone", "email", "notes"];

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub enabled: bool,
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub redact_card_numbers: bool,
    pub hash_for_correlation: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redact_emails: true,
            redact_phones: true,
            redact_card_numbers: true,
            hash_for_correlation: true,
        }
    }
}

impl RedactionConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// PII redactor for log messages and record fields
#[derive(Debug, Clone)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl Default for PiiRedactor {
    fn default() -> Self {
        Self::new(RedactionConfig::default())
    }
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    /// Redact free text. Card numbers are handled before phones so a
    /// sixteen digit number is never half-matched as a phone.
    pub fn redact(&self, text: &str) -> String {
        if !self.config.enabled {
            return text.to_string();
        }

        let mut result = text.to_string();

        if self.config.redact_emails {
            result = self.redact_emails(&result);
        }

        if self.config.redact_card_numbers {
            result = self.redact_card_numbers(&result);
        }

        if self.config.redact_phones {
            result = self.redact_phones(&result);
        }

        result
    }

    /// Redact a named record field. Fields known to hold identifying text
    /// are replaced wholesale; anything else goes through pattern redaction.
    pub fn redact_field(&self, field: &str, value: &str) -> String {
        if !self.config.enabled {
            return value.to_string();
        }
        if SENSITIVE_FIELDS.contains(&field) {
            if self.config.hash_for_correlation {
                return format!("{}[{}]", field.to_uppercase(), self.hash_value(value));
            }
            return "[REDACTED]".to_string();
        }
        self.redact(value)
    }

    fn redact_emails(&self, text: &str) -> String {
        EMAIL_REGEX.replace_all(text, |caps: &regex::Captures| {
            let email = caps.get(0).map_or("", |m| m.as_str());
            if self.config.hash_for_correlation {
                format!("EMAIL[{}]", self.hash_value(email))
            } else {
                match email.split_once('@') {
                    Some((local, domain)) => format!(
                        "{}***@{}***",
                        local.chars().next().unwrap_or('*'),
                        domain.chars().next().unwrap_or('*')
                    ),
                    None => "***@***".to_string(),
                }
            }
        }).to_string()
    }

    fn redact_phones(&self, text: &str) -> String {
        PHONE_REGEX.replace_all(text, |caps: &regex::Captures| {
            let phone = caps.get(0).map_or("", |m| m.as_str());
            if self.config.hash_for_correlation {
                format!("PHONE[{}]", self.hash_value(phone))
            } else {
                "[PHONE]".to_string()
            }
        }).to_string()
    }

    fn redact_card_numbers(&self, text: &str) -> String {
        CARD_REGEX.replace_all(text, |caps: &regex::Captures| {
            let card = caps.get(0).map_or("", |m| m.as_str());
            let digits: String = card.chars().filter(char::is_ascii_digit).collect();
            let last_four = digits.get(digits.len().saturating_sub(4)..).unwrap_or("****");
            format!("****-****-****-{last_four}")
        }).to_string()
    }

    fn hash_value(&self, value: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(value.as_bytes());
        let result = hasher.finalize();
        general_purpose::STANDARD.encode(result.get(..8).unwrap_or_default())
    }
}
