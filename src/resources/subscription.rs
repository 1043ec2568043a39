//! The subscription resource, at the depth needed to resolve invoice
//! relationships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    error::{ClientError, Result},
    http::Client,
};

/// A plan subscription on an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Opaque unique identifier assigned by the service.
    pub uuid: String,
    /// Subscription state, such as `active`, `canceled`, or `expired`.
    pub state: String,
    /// Code of the plan being billed.
    pub plan_code: Option<String>,
    /// Number of seats or licenses.
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    /// Recurring amount in minor currency units.
    pub unit_amount_in_cents: Option<i64>,
    /// ISO 4217 currency code.
    #[serde(default = "crate::config::default_currency")]
    pub currency: String,
    /// When the subscription became active.
    pub activated_at: Option<DateTime<Utc>>,
    /// When the subscription expires or expired.
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_quantity() -> i32 {
    1
}

impl Subscription {
    /// Fetches one subscription by its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 404 when no such
    /// subscription exists, and propagates transport and decoding errors.
    #[instrument(skip(client))]
    pub async fn find(client: &Client, uuid: &str) -> Result<Self> {
        if uuid.is_empty() || !uuid.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ClientError::InvalidUrl(format!(
                "subscription identifier contains invalid characters: {uuid}"
            )));
        }
        client.get_json(&format!("/subscriptions/{uuid}")).await
    }
}
