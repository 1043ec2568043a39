//! The invoice resource.
//!
//! Invoices are created through their owning [`Account`]:
//!
//! ```no_run
//! use rebill::{Account, Client, ClientConfig};
//!
//! # async fn example() -> rebill::Result<()> {
//! # let client = Client::new(&ClientConfig::new("https://api.rebill.example.com", "k"))?;
//! let account = Account::find(&client, "acct-42").await?;
//! let invoice = account.invoice(&client).await?;
//! # Ok(())
//! # }
//! ```
//!
//! They are never saved or destroyed directly; the only client-triggered
//! mutations are the server-side transitions [`Invoice::mark_successful`]
//! and [`Invoice::mark_failed`], which replace the whole loaded
//! representation from the service's response.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    error::{ClientError, Result},
    http::{Client, decode_json},
    pager::Pager,
    resources::{
        ActionLink, account::Account, redemption::Redemption, subscription::Subscription,
    },
};

/// Collection state of an invoice, as reported by the service.
///
/// Transitions are computed server-side; this client only triggers
/// `open -> collected` (via [`Invoice::mark_successful`]) and
/// `open | past_due -> failed` (via [`Invoice::mark_failed`]) and observes
/// the rest after a reload. States this crate does not know about yet are
/// preserved in [`Other`](Self::Other).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InvoiceState {
    /// Awaiting collection.
    Open,
    /// Payment collected in full.
    Collected,
    /// Collection failed.
    Failed,
    /// Open past its due date.
    PastDue,
    /// A state defined by the service but not by this crate.
    Other(String),
}

impl InvoiceState {
    /// Wire representation of the state, used in scope query filters.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::Collected => "collected",
            Self::Failed => "failed",
            Self::PastDue => "past_due",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for InvoiceState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "open" => Self::Open,
            "collected" => Self::Collected,
            "failed" => Self::Failed,
            "past_due" => Self::PastDue,
            _ => Self::Other(s),
        }
    }
}

impl From<InvoiceState> for String {
    fn from(state: InvoiceState) -> Self {
        state.as_str().to_owned()
    }
}

/// A single charge or credit on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique line-item identifier.
    pub uuid: String,
    /// Human-readable description of the charge.
    pub description: Option<String>,
    /// Accounting code for revenue reporting.
    pub accounting_code: Option<String>,
    /// Number of units billed.
    pub quantity: i32,
    /// Price per unit in minor currency units.
    pub unit_amount_in_cents: i64,
    /// Line total in minor currency units.
    pub total_in_cents: i64,
    /// ISO 4217 currency code.
    #[serde(default = "crate::config::default_currency")]
    pub currency: String,
    /// Service period start, when the charge covers a period.
    pub start_date: Option<DateTime<Utc>>,
    /// Service period end.
    pub end_date: Option<DateTime<Utc>>,
}

/// A payment attempt recorded against an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier.
    pub uuid: String,
    /// Transaction kind, such as `purchase` or `refund`.
    pub action: String,
    /// Amount in minor currency units.
    pub amount_in_cents: i64,
    /// Processor status, such as `success` or `declined`.
    pub status: String,
    /// Processor reference number, when one exists.
    pub reference: Option<String>,
    /// When the transaction was recorded.
    pub created_at: Option<DateTime<Utc>>,
}

/// An invoice for collected or pending charges on an account.
///
/// Invoices are an embedded resource: the service creates and destroys
/// them only as a side effect of account-level actions, so this type has
/// no `save` or `destroy` and cannot be constructed locally. Instances
/// come from scope queries, [`Invoice::find`], [`Account::invoices`], or
/// [`Account::invoice`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Opaque unique identifier assigned by the service.
    pub uuid: String,
    /// Collection state.
    pub state: InvoiceState,
    /// Sequential invoice number, unique per prefix.
    pub invoice_number: i64,
    /// Site-configured prefix for the invoice number.
    #[serde(default)]
    pub invoice_number_prefix: String,
    /// Purchase order number supplied by the customer.
    pub po_number: Option<String>,
    /// VAT registration number applied to this invoice.
    pub vat_number: Option<String>,
    /// Sum of line items before tax, in minor currency units.
    pub subtotal_in_cents: i64,
    /// Tax amount in minor currency units.
    pub tax_in_cents: i64,
    /// Tax classification, such as `vat` or `usst`.
    pub tax_type: Option<String>,
    /// Region the tax rate was determined from.
    pub tax_region: Option<String>,
    /// Fractional tax rate applied, such as `0.095`.
    pub tax_rate: Option<Decimal>,
    /// Invoice total including tax, in minor currency units.
    pub total_in_cents: i64,
    /// ISO 4217 currency code. Filled from the process-wide default when
    /// the representation omits it; immutable thereafter except through a
    /// full reload.
    #[serde(default = "crate::config::default_currency")]
    currency: String,
    /// When the invoice was created.
    pub created_at: Option<DateTime<Utc>>,
    /// When the invoice left the open state.
    pub closed_at: Option<DateTime<Utc>>,
    /// Amount still owed, in minor currency units.
    pub amount_remaining_in_cents: i64,
    /// Charges and credits on this invoice, in service order.
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    /// Payment attempts against this invoice, in service order.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// Terms and conditions text printed on the invoice.
    pub terms_and_conditions: Option<String>,
    /// Free-form notes for the customer.
    pub customer_notes: Option<String>,
    /// Billing address as rendered on the invoice.
    pub address: Option<String>,
    /// Payment terms in days, for manual-collection invoices.
    pub net_terms: Option<i32>,
    /// How the invoice is collected, `automatic` or `manual`.
    pub collection_method: Option<String>,

    /// Code of the owning account.
    pub account_code: Option<String>,
    /// Identifier of the subscription billed by this invoice, if any.
    pub subscription_uuid: Option<String>,
    /// Display identifier of the invoice this one amends, if any.
    pub original_invoice_number: Option<String>,

    /// Transition capabilities exposed by this representation.
    #[serde(default)]
    actions: HashMap<String, ActionLink>,
}

/// Validates an invoice display identifier before it is placed in a path.
fn validate_display_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 {
        return Err(ClientError::InvalidUrl(format!(
            "invoice identifier must be 1-64 characters, got {} characters",
            id.len()
        )));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ClientError::InvalidUrl(format!(
            "invoice identifier may only contain alphanumerics and hyphens: {id}"
        )));
    }
    Ok(())
}

impl Invoice {
    /// Returns a pager over all open invoices on the site.
    #[must_use]
    pub fn open(client: &Client) -> Pager<Self> {
        Self::scoped(client, InvoiceState::Open)
    }

    /// Returns a pager over all collected invoices on the site.
    #[must_use]
    pub fn collected(client: &Client) -> Pager<Self> {
        Self::scoped(client, InvoiceState::Collected)
    }

    /// Returns a pager over all invoices that failed collection.
    #[must_use]
    pub fn failed(client: &Client) -> Pager<Self> {
        Self::scoped(client, InvoiceState::Failed)
    }

    /// Returns a pager over all past-due invoices on the site.
    #[must_use]
    pub fn past_due(client: &Client) -> Pager<Self> {
        Self::scoped(client, InvoiceState::PastDue)
    }

    fn scoped(client: &Client, state: InvoiceState) -> Pager<Self> {
        Pager::new(
            client.clone(),
            "/invoices",
            vec![("state".to_owned(), state.as_str().to_owned())],
        )
    }

    /// Fetches one invoice by its display identifier, such as `"1000-1234"`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 404 when no such invoice
    /// exists, and propagates transport and decoding errors.
    #[instrument(skip(client))]
    pub async fn find(client: &Client, number_with_prefix: &str) -> Result<Self> {
        validate_display_id(number_with_prefix)?;
        client.get_json(&format!("/invoices/{number_with_prefix}")).await
    }

    /// The prefixed invoice number, the invoice's external display and
    /// reference identifier.
    ///
    /// Always recomputed from `invoice_number_prefix` and `invoice_number`
    /// with no separator; never stored.
    #[must_use]
    pub fn invoice_number_with_prefix(&self) -> String {
        format!("{}{}", self.invoice_number_prefix, self.invoice_number)
    }

    /// Path parameter identifying this invoice in URLs.
    ///
    /// Alias for [`invoice_number_with_prefix`](Self::invoice_number_with_prefix).
    #[must_use]
    pub fn to_param(&self) -> String {
        self.invoice_number_with_prefix()
    }

    /// ISO 4217 currency code of this invoice.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Tells the service that this invoice was collected out-of-band.
    ///
    /// Returns `Ok(false)` without side effects when the loaded
    /// representation carries no mark-successful capability, meaning the
    /// invoice is not currently eligible (for example, it is no longer
    /// open). On `Ok(true)` every field of `self` has been replaced from
    /// the service's response; there is no partial-update state.
    ///
    /// # Errors
    ///
    /// Propagates transport, API, and decoding errors from the triggered
    /// call. Only the absent-capability case collapses to `Ok(false)`.
    #[instrument(skip(self, client), fields(invoice = %self.invoice_number_with_prefix()))]
    pub async fn mark_successful(&mut self, client: &Client) -> Result<bool> {
        self.invoke_transition(client, "mark_successful").await
    }

    /// Tells the service that collection of this invoice failed.
    ///
    /// Same contract as [`mark_successful`](Self::mark_successful), for
    /// the failed-collection transition.
    ///
    /// # Errors
    ///
    /// Propagates transport, API, and decoding errors from the triggered
    /// call. Only the absent-capability case collapses to `Ok(false)`.
    #[instrument(skip(self, client), fields(invoice = %self.invoice_number_with_prefix()))]
    pub async fn mark_failed(&mut self, client: &Client) -> Result<bool> {
        self.invoke_transition(client, "mark_failed").await
    }

    async fn invoke_transition(&mut self, client: &Client, action: &str) -> Result<bool> {
        let Some(link) = self.actions.get(action).cloned() else {
            debug!(action, "transition not exposed by loaded representation");
            return Ok(false);
        };

        let body = client.follow_link(link.http_method(), &link.href).await?;
        self.reload_from_slice(&body)?;
        info!(action, state = self.state.as_str(), "invoice transition applied");
        Ok(true)
    }

    /// Replaces every field of `self` from a fresh server representation.
    ///
    /// Decoding happens before any mutation, so a malformed body leaves
    /// `self` untouched.
    pub(crate) fn reload_from_slice(&mut self, body: &[u8]) -> Result<()> {
        *self = decode_json(body)?;
        Ok(())
    }

    /// Fetches the PDF representation of this invoice.
    ///
    /// This is a distinct representation of the same remote resource,
    /// addressed by the display identifier; `self` is left untouched.
    ///
    /// # Errors
    ///
    /// Propagates transport and API errors.
    #[instrument(skip(self, client), fields(invoice = %self.invoice_number_with_prefix()))]
    pub async fn pdf(&self, client: &Client) -> Result<Vec<u8>> {
        let param = self.to_param();
        validate_display_id(&param)?;
        client.get_bytes(&format!("/invoices/{param}"), "application/pdf").await
    }

    /// Resolves the owning account.
    ///
    /// # Errors
    ///
    /// Propagates transport, API, and decoding errors from the lookup.
    pub async fn account(&self, client: &Client) -> Result<Option<Account>> {
        match &self.account_code {
            Some(code) => Account::find(client, code).await.map(Some),
            None => Ok(None),
        }
    }

    /// Resolves the subscription billed by this invoice, if any.
    ///
    /// # Errors
    ///
    /// Propagates transport, API, and decoding errors from the lookup.
    pub async fn subscription(&self, client: &Client) -> Result<Option<Subscription>> {
        match &self.subscription_uuid {
            Some(uuid) => Subscription::find(client, uuid).await.map(Some),
            None => Ok(None),
        }
    }

    /// Resolves the invoice this one amends or supersedes, if any.
    ///
    /// # Errors
    ///
    /// Propagates transport, API, and decoding errors from the lookup.
    pub async fn original_invoice(&self, client: &Client) -> Result<Option<Self>> {
        match &self.original_invoice_number {
            Some(number) => Self::find(client, number).await.map(Some),
            None => Ok(None),
        }
    }

    /// Resolves the coupon redemption applied to this invoice, if any.
    ///
    /// A 404 from the service means no redemption exists and maps to
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Propagates transport, API, and decoding errors other than the
    /// not-found case.
    pub async fn redemption(&self, client: &Client) -> Result<Option<Redemption>> {
        let param = self.to_param();
        validate_display_id(&param)?;
        match client.get_json(&format!("/invoices/{param}/redemption")).await {
            Ok(redemption) => Ok(Some(redemption)),
            Err(e) if e.is_status(404) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
