//! The account resource, the owning parent of invoices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    error::{ClientError, Result},
    http::Client,
    pager::Pager,
    resources::{Writable, invoice::Invoice},
};

/// A customer account.
///
/// Accounts are directly writable ([`Writable`]) and are the only path
/// through which invoices come into existence: [`Account::invoice`]
/// collects the account's pending charges into a new invoice on the
/// service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique, caller-chosen account code.
    pub account_code: String,
    /// Account state, such as `active` or `closed`.
    #[serde(default)]
    pub state: Option<String>,
    /// Contact email address.
    pub email: Option<String>,
    /// Contact first name.
    pub first_name: Option<String>,
    /// Contact last name.
    pub last_name: Option<String>,
    /// Company name, for business accounts.
    pub company_name: Option<String>,
    /// VAT registration number.
    pub vat_number: Option<String>,
    /// When the account was created.
    pub created_at: Option<DateTime<Utc>>,
}

/// Validates an account code before it is placed in a path.
fn validate_account_code(code: &str) -> Result<()> {
    if code.is_empty() || code.len() > 50 {
        return Err(ClientError::InvalidUrl(format!(
            "account code must be 1-50 characters, got {} characters",
            code.len()
        )));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '@' || c == '.')
    {
        return Err(ClientError::InvalidUrl(format!(
            "account code contains invalid characters: {code}"
        )));
    }
    Ok(())
}

impl Account {
    /// Fetches one account by its code.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 404 when no such account
    /// exists, and propagates transport and decoding errors.
    #[instrument(skip(client))]
    pub async fn find(client: &Client, account_code: &str) -> Result<Self> {
        validate_account_code(account_code)?;
        client.get_json(&format!("/accounts/{account_code}")).await
    }

    /// Collects this account's pending charges into a new invoice.
    ///
    /// This is the only way a client creates an invoice; the returned
    /// [`Invoice`] is whatever the service issued, typically in the
    /// `open` state.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 422 when the account has
    /// no pending charges, and propagates transport and decoding errors.
    #[instrument(skip(self, client), fields(account_code = %self.account_code))]
    pub async fn invoice(&self, client: &Client) -> Result<Invoice> {
        validate_account_code(&self.account_code)?;
        let invoice: Invoice =
            client.post_json(&format!("/accounts/{}/invoices", self.account_code)).await?;
        info!(invoice = %invoice.invoice_number_with_prefix(), "invoice issued");
        Ok(invoice)
    }

    /// Returns a pager over this account's invoices.
    #[must_use]
    pub fn invoices(&self, client: &Client) -> Pager<Invoice> {
        Pager::new(
            client.clone(),
            format!("/accounts/{}/invoices", self.account_code),
            Vec::new(),
        )
    }
}

impl Writable for Account {
    fn resource_path(&self) -> String {
        format!("/accounts/{}", self.account_code)
    }

    async fn save(&mut self, client: &Client) -> Result<()> {
        validate_account_code(&self.account_code)?;
        *self = client.put_json(&self.resource_path(), self).await?;
        Ok(())
    }

    async fn destroy(&self, client: &Client) -> Result<()> {
        validate_account_code(&self.account_code)?;
        client.delete(&self.resource_path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Account {
        serde_json::from_str(
            r#"{
                "account_code": "acct-42",
                "state": "active",
                "email": "billing@example.com",
                "first_name": "Ada",
                "last_name": "Lovelace",
                "company_name": null,
                "vat_number": null,
                "created_at": "2025-01-10T00:00:00Z"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_account_deserialization() {
        let account = fixture();
        assert_eq!(account.account_code, "acct-42");
        assert_eq!(account.state.as_deref(), Some("active"));
        assert_eq!(account.email.as_deref(), Some("billing@example.com"));
    }

    #[test]
    fn test_resource_path() {
        assert_eq!(fixture().resource_path(), "/accounts/acct-42");
    }

    #[test]
    fn test_validate_account_code() {
        assert!(validate_account_code("acct-42").is_ok());
        assert!(validate_account_code("user@example.com").is_ok());
        assert!(validate_account_code("").is_err());
        assert!(validate_account_code(&"a".repeat(51)).is_err());
        assert!(validate_account_code("a/../b").is_err());
        assert!(validate_account_code("a b").is_err());
    }

    #[test]
    fn test_minimal_account() {
        let account: Account = serde_json::from_str(r#"{"account_code": "a1"}"#).unwrap();
        assert!(account.email.is_none());
        assert!(account.state.is_none());
    }
}
