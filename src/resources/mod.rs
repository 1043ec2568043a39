//! Resource models for the billing API.
//!
//! Each resource is a plain struct mirroring the service's JSON
//! representation, with explicit resolver methods for its relationships.
//! Directly-editable resources implement [`Writable`]; embedded resources
//! such as [`Invoice`](invoice::Invoice) deliberately do not, so local
//! mutation of them is not expressible at all.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{error::Result, http::Client};

pub mod account;
pub mod invoice;
pub mod redemption;
pub mod subscription;

/// A state-transition capability exposed by a loaded representation.
///
/// The service includes an action link only while the resource is eligible
/// for that transition; an absent link means the transition is currently
/// unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLink {
    /// Target of the action, either a path or an absolute URL on the same
    /// API site.
    pub href: String,
    /// HTTP method to invoke the action with.
    #[serde(default = "default_action_method")]
    pub method: String,
}

fn default_action_method() -> String {
    "put".to_owned()
}

impl ActionLink {
    /// HTTP method for invoking this action. Unrecognized methods fall
    /// back to PUT, the service's convention for state transitions.
    #[must_use]
    pub(crate) fn http_method(&self) -> Method {
        match self.method.to_ascii_lowercase().as_str() {
            "post" => Method::POST,
            "delete" => Method::DELETE,
            _ => Method::PUT,
        }
    }
}

/// A resource that can be updated and deleted directly through the API.
///
/// Embedded resources (created and destroyed only via actions on their
/// owning parent) do not implement this trait, which makes `save` and
/// `destroy` on them a compile error rather than a runtime surprise.
#[allow(async_fn_in_trait, reason = "client-side SDK, no dyn or Send bounds needed")]
pub trait Writable: Sized {
    /// Canonical path of this resource instance.
    fn resource_path(&self) -> String;

    /// Pushes local field values to the service and reloads this instance
    /// from the authoritative response.
    ///
    /// # Errors
    ///
    /// Propagates transport, API, and decoding errors.
    async fn save(&mut self, client: &Client) -> Result<()>;

    /// Deletes this resource on the service.
    ///
    /// # Errors
    ///
    /// Propagates transport and API errors.
    async fn destroy(&self, client: &Client) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_link_deserialization() {
        let json = r#"{"href":"/invoices/abc/mark_successful","method":"put"}"#;
        let link: ActionLink = serde_json::from_str(json).unwrap();
        assert_eq!(link.href, "/invoices/abc/mark_successful");
        assert_eq!(link.http_method(), Method::PUT);
    }

    #[test]
    fn test_action_link_method_defaults_to_put() {
        let json = r#"{"href":"/invoices/abc/mark_failed"}"#;
        let link: ActionLink = serde_json::from_str(json).unwrap();
        assert_eq!(link.method, "put");
        assert_eq!(link.http_method(), Method::PUT);
    }

    #[test]
    fn test_action_link_post_method() {
        let link = ActionLink { href: "/x".to_owned(), method: "POST".to_owned() };
        assert_eq!(link.http_method(), Method::POST);
    }

    #[test]
    fn test_action_link_unknown_method_falls_back() {
        let link = ActionLink { href: "/x".to_owned(), method: "patch".to_owned() };
        assert_eq!(link.http_method(), Method::PUT);
    }
}
