use chrono::{DateTime, Utc};
use database_layer::WardStore;
use std::sync::Arc;
use tracing::warn;

/// Client-side number used when the store's sequence is unavailable
pub fn fallback_number(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}-{}", now.timestamp_millis())
}

/// Bill and payment number generator backed by the store's sequences
#[derive(Clone)]
pub struct DocumentNumbers {
    store: Arc<dyn WardStore>,
    bill_prefix: String,
    payment_prefix: String,
}

impl DocumentNumbers {
    pub fn new(store: Arc<dyn WardStore>, bill_prefix: impl Into<String>, payment_prefix: impl Into<String>) -> Self {
        Self {
            store,
            bill_prefix: bill_prefix.into(),
            payment_prefix: payment_prefix.into(),
        }
    }

    pub async fn bill_number(&self) -> String {
        match self.store.next_bill_number(&self.bill_prefix).await {
            Ok(number) => number,
            Err(e) => {
                warn!(error = %e, "Bill number sequence unavailable, using timestamp");
                fallback_number(&self.bill_prefix, Utc::now())
            }
        }
    }

    pub async fn payment_number(&self) -> String {
        match self.store.next_payment_number(&self.payment_prefix).await {
            Ok(number) => number,
            Err(e) => {
                warn!(error = %e, "Payment number sequence unavailable, using timestamp");
                fallback_number(&self.payment_prefix, Utc::now())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use database_layer::InMemoryStore;

    #[test]
    fn fallback_uses_unix_millis() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(fallback_number("BILL", now), "BILL-1705314600000");
    }

    #[tokio::test]
    async fn sequence_numbers_use_configured_prefix() {
        let numbers = DocumentNumbers::new(Arc::new(InMemoryStore::new()), "INV", "RCPT");
        assert!(numbers.bill_number().await.starts_with("INV-"));
        assert!(numbers.payment_number().await.starts_with("RCPT-"));
    }
}
