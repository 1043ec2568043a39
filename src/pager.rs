//! Lazy page cursor over list endpoints.
//!
//! A [`Pager`] is created by a scope or listing call and performs no I/O
//! until driven. Each pager owns its page state, so two pagers over the
//! same scope iterate independently and a fresh invocation of a scope
//! always restarts from the first page.

use std::collections::VecDeque;

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::{
    error::Result,
    http::{Client, decode_json, path_with_query},
};

/// Response header carrying the total record count for a listing.
const RECORDS_HEADER: &str = "X-Records";

const DEFAULT_PER_PAGE: u32 = 50;
const MAX_PER_PAGE: u32 = 200;

/// Cursor over a paged listing of resources.
///
/// The listing is finite but its size is unknown until the service reports
/// it; [`total`](Self::total) becomes available after the first fetch.
/// Exhaustion is signaled by `Ok(None)` from either iteration method.
#[derive(Debug)]
pub struct Pager<T> {
    client: Client,
    path: String,
    params: Vec<(String, String)>,
    per_page: u32,
    page: u32,
    total: Option<u64>,
    buffer: VecDeque<T>,
    exhausted: bool,
}

impl<T> Pager<T> {
    pub(crate) fn new(client: Client, path: impl Into<String>, params: Vec<(String, String)>) -> Self {
        Self {
            client,
            path: path.into(),
            params,
            per_page: DEFAULT_PER_PAGE,
            page: 1,
            total: None,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Sets the page size, clamped to the service maximum of 200.
    #[must_use]
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    /// Total record count reported by the service, once known.
    ///
    /// `None` before the first page has been fetched.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Advances the internal cursor after a page of `len` items.
    fn record_page(&mut self, len: usize) {
        self.page += 1;
        if (len as u64) < u64::from(self.per_page) {
            self.exhausted = true;
        }
    }
}

impl<T: DeserializeOwned> Pager<T> {
    /// Fetches the next page of results.
    ///
    /// Returns `Ok(None)` once the listing is exhausted; subsequent calls
    /// keep returning `Ok(None)` without touching the network.
    ///
    /// # Errors
    ///
    /// Propagates transport and decoding errors. A failed fetch does not
    /// advance the cursor, so the call can be retried.
    #[instrument(skip(self), fields(path = %self.path, page = self.page))]
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self.page.to_string();
        let per_page = self.per_page.to_string();
        let mut params: Vec<(&str, &str)> =
            self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        params.push(("page", &page));
        params.push(("per_page", &per_page));

        let path = path_with_query(&self.path, &params)?;
        let url = self.client.resolve(&path)?;
        let response = self.client.execute(Method::GET, url, None, "application/json").await?;

        if self.total.is_none() {
            self.total = response
                .headers
                .get(RECORDS_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
        }

        let items: Vec<T> = decode_json(&response.body)?;
        debug!(count = items.len(), "fetched page");
        self.record_page(items.len());

        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(items))
    }

    /// Returns the next item, fetching pages on demand.
    ///
    /// Returns `Ok(None)` once the listing is exhausted.
    ///
    /// # Errors
    ///
    /// Propagates transport and decoding errors from the underlying page
    /// fetch.
    pub async fn try_next(&mut self) -> Result<Option<T>> {
        if self.buffer.is_empty() {
            match self.next_page().await? {
                Some(items) => self.buffer.extend(items),
                None => return Ok(None),
            }
        }
        Ok(self.buffer.pop_front())
    }
}
