//! Rebill: async Rust client for a subscription-billing REST API.
//!
//! This crate models the billing service's resources as plain structs and
//! exposes their remote behavior as explicit async operations. The
//! centerpiece is the [`Invoice`] resource: scoped queries, lazy
//! relationship resolvers, a PDF representation fetch, and the two
//! server-side collection transitions.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rebill::{Client, ClientConfig, Invoice};
//!
//! # async fn example() -> rebill::Result<()> {
//! let config = ClientConfig::new("https://api.rebill.example.com/v2", "sk_live_abc123");
//! let client = Client::new(&config)?;
//!
//! // Scopes return lazy page cursors; nothing is fetched until driven.
//! let mut past_due = Invoice::past_due(&client);
//! while let Some(mut invoice) = past_due.try_next().await? {
//!     // Report an out-of-band collection. `false` means the invoice was
//!     // not eligible (for example, already collected) and nothing changed.
//!     if invoice.mark_successful(&client).await? {
//!         println!("{} collected", invoice.invoice_number_with_prefix());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Resource model
//!
//! Invoices are an *embedded* resource: the service creates them only
//! through account-level actions ([`Account::invoice`]) and never lets a
//! client update or delete one directly. That rule is enforced
//! statically; [`Invoice`] simply does not implement
//! [`Writable`](resources::Writable), so there is no `save` or `destroy`
//! to call. The only client-triggered mutations are
//! [`Invoice::mark_successful`] and [`Invoice::mark_failed`], which
//! replace the whole loaded representation from the service's
//! authoritative response.
//!
//! # Module Organization
//!
//! - [`config`]: client configuration and the process-wide default currency
//! - [`http`]: authenticated HTTP client over the billing API
//! - [`pager`]: lazy, restartable page cursors for list endpoints
//! - [`resources`]: the resource models (invoice, account, subscription,
//!   redemption)
//! - [`error`]: error types and the crate-wide [`Result`]
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`](error::Result). Remote failures
//! surface unmodified as [`ClientError`]; the single downgraded case is an
//! ineligible invoice transition, which the mark-* actions report as
//! `Ok(false)` because it is an expected outcome rather than a fault.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod http;
pub mod pager;
pub mod resources;

pub use config::{ClientConfig, default_currency, set_default_currency};
pub use error::{ClientError, Result};
pub use http::Client;
pub use pager::Pager;
pub use resources::{
    account::Account,
    invoice::{Invoice, InvoiceState, LineItem, Transaction},
    redemption::Redemption,
    subscription::Subscription,
};
