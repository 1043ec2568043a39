//! The coupon redemption resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A coupon redemption applied to an account or invoice.
///
/// Reached through [`Invoice::redemption`](crate::Invoice::redemption);
/// redemptions have no standalone listing in this client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Redemption {
    /// Opaque unique identifier assigned by the service.
    pub uuid: String,
    /// Code of the redeemed coupon.
    pub coupon_code: String,
    /// Redemption state, such as `active` or `inactive`.
    pub state: Option<String>,
    /// Whether the coupon was single-use.
    #[serde(default)]
    pub single_use: bool,
    /// Total discounted so far, in minor currency units.
    #[serde(default)]
    pub total_discounted_in_cents: i64,
    /// ISO 4217 currency code.
    #[serde(default = "crate::config::default_currency")]
    pub currency: String,
    /// When the coupon was redeemed.
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redemption_deserialization() {
        let redemption: Redemption = serde_json::from_str(
            r#"{
                "uuid": "red-77",
                "coupon_code": "SPRING20",
                "state": "active",
                "single_use": true,
                "total_discounted_in_cents": 2000,
                "currency": "USD",
                "created_at": "2026-03-01T00:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(redemption.coupon_code, "SPRING20");
        assert!(redemption.single_use);
        assert_eq!(redemption.total_discounted_in_cents, 2000);
    }

    #[test]
    fn test_redemption_defaults() {
        let redemption: Redemption =
            serde_json::from_str(r#"{"uuid": "red-1", "coupon_code": "X", "currency": "EUR"}"#)
                .unwrap();
        assert!(!redemption.single_use);
        assert_eq!(redemption.total_discounted_in_cents, 0);
        assert_eq!(redemption.currency, "EUR");
    }
}
