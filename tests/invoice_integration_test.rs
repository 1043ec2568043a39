//! Integration tests for the public client surface.
//!
//! These tests exercise the crate the way a consumer would: configuration
//! from TOML, client construction, scope cursors, and the invoice
//! transition contract. Nothing here requires a live billing service.

use rebill::{Account, Client, ClientConfig, Invoice, InvoiceState};

fn test_client() -> Client {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let config = ClientConfig::new("https://api.rebill.example.com/v2", "sk_test_xyz");
    Client::new(&config).expect("valid test config")
}

const OPEN_INVOICE: &str = r#"{
    "uuid": "f6e9f2a3b1c84d07",
    "state": "open",
    "invoice_number": 1234,
    "invoice_number_prefix": "1000-",
    "subtotal_in_cents": 9000,
    "tax_in_cents": 855,
    "total_in_cents": 9855,
    "currency": "USD",
    "amount_remaining_in_cents": 9855,
    "net_terms": 30,
    "collection_method": "manual",
    "account_code": "acct-42"
}"#;

#[test]
fn test_config_roundtrips_through_toml() {
    let toml = r#"
        base_url = "https://api.rebill.example.com/v2"
        api_key = "sk_test_xyz"
        timeout_secs = 45
    "#;

    let config: ClientConfig = toml::from_str(toml).expect("parseable config");
    assert_eq!(config.timeout_secs, 45);
    assert!(config.validate().is_ok());
    assert!(Client::new(&config).is_ok());
}

#[test]
fn test_insecure_config_is_rejected_before_any_request() {
    let config = ClientConfig::new("http://api.rebill.example.com", "sk_test_xyz");
    assert!(Client::new(&config).is_err());

    let config = ClientConfig::new("https://127.0.0.1:8443", "sk_test_xyz");
    assert!(Client::new(&config).is_err());
}

#[test]
fn test_invoice_deserializes_from_service_representation() {
    let invoice: Invoice = serde_json::from_str(OPEN_INVOICE).expect("valid representation");
    assert_eq!(invoice.state, InvoiceState::Open);
    assert_eq!(invoice.invoice_number_with_prefix(), "1000-1234");
    assert_eq!(invoice.to_param(), "1000-1234");
    assert_eq!(invoice.currency(), "USD");
    assert_eq!(invoice.amount_remaining_in_cents, 9855);
}

#[test]
fn test_scope_invocations_yield_independent_cursors() {
    let client = test_client();

    // Two invocations of the same scope are separate cursors, each
    // starting before its first page.
    let first = Invoice::open(&client);
    let second = Invoice::open(&client);
    assert!(first.total().is_none());
    assert!(second.total().is_none());

    // Dropping one cursor has no bearing on the other.
    drop(first);
    assert!(second.total().is_none());
}

#[tokio::test]
async fn test_mark_actions_on_ineligible_invoice_report_false_without_side_effects() {
    // A representation without action links models an invoice fetched in a
    // state that exposes no transitions (for example, already collected).
    let mut invoice: Invoice = serde_json::from_str(OPEN_INVOICE).expect("valid representation");
    let before = invoice.clone();
    let client = test_client();

    // The test host is unroutable; a network attempt would fail loudly
    // rather than return Ok(false).
    assert!(!invoice.mark_successful(&client).await.expect("no-op"));
    assert!(!invoice.mark_failed(&client).await.expect("no-op"));
    assert_eq!(invoice, before);
}

#[test]
fn test_unknown_states_are_preserved() {
    let json = OPEN_INVOICE.replace("\"state\": \"open\"", "\"state\": \"pending_review\"");
    let invoice: Invoice = serde_json::from_str(&json).expect("valid representation");
    assert_eq!(invoice.state, InvoiceState::Other("pending_review".to_owned()));
    assert_eq!(invoice.state.as_str(), "pending_review");
}

#[test]
fn test_account_deserializes_and_paths_are_stable() {
    use rebill::resources::Writable;

    let account: Account =
        serde_json::from_str(r#"{"account_code": "acct-42"}"#).expect("valid representation");
    assert_eq!(account.resource_path(), "/accounts/acct-42");

    // Listing an account's invoices is lazy like any other cursor.
    let pager = account.invoices(&test_client());
    assert!(pager.total().is_none());
}
