//! Caching client for the CDISC Library API
//!
//! One client instance owns one credential and one unbounded in-memory
//! cache. A given cache key hits the network at most once per client
//! lifetime; later reads return the stored value even if the remote
//! resource has changed since (staleness is accepted, the process is
//! short-lived). Failed fetches are not cached.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use sdtmpipe_core::{SHARED_RUNTIME, http_client};

use crate::error::LibraryError;
use crate::link::Link;

/// Production endpoint of the CDISC Library API.
pub const DEFAULT_BASE_URL: &str = "https://library.cdisc.org/api";

/// Request header carrying the caller's credential.
const API_KEY_HEADER: &str = "api-key";

/// Cache key for the product tabulation singleton.
const KEY_PRODUCT_TABULATION: &str = "product_tabulation";

/// Memoizing, authenticated client for the Library hypermedia API.
///
/// Methods take `&mut self`: the cache's check-then-insert is not atomic,
/// so single-threaded use is enforced by the borrow checker. Wrap the
/// whole client in a `Mutex` for a multi-threaded embedding.
pub struct LibraryClient {
    token: String,
    base_url: String,
    cache: HashMap<String, Arc<Value>>,
}

impl LibraryClient {
    /// Create a client for the production API.
    ///
    /// Construction never fails; an invalid credential only surfaces as a
    /// 401 `LibraryError::Status` on first use.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Create a client against a different host (tests, mirrors).
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: base_url.into(),
            cache: HashMap::new(),
        }
    }

    /// Follow a hypermedia link.
    ///
    /// Cache key is the href verbatim: no normalization, so trailing
    /// slashes, case, or query strings produce distinct entries.
    pub fn get_link(&mut self, link: &Link) -> Result<Arc<Value>, LibraryError> {
        self.fetch_cached(&link.href, &link.href)
    }

    /// Get a named implementation-guide dataset by version.
    pub fn get_ig_dataset(
        &mut self,
        version: &str,
        dataset: &str,
    ) -> Result<Arc<Value>, LibraryError> {
        let key = format!("{version}_{dataset}");
        let path = format!("/mdr/sdtmig/{version}/datasets/{dataset}");
        self.fetch_cached(&key, &path)
    }

    /// Get the DataTabulation product group.
    ///
    /// Its `_links` section feeds [`get_sdtmig_versions`] and
    /// [`get_sdtm_versions`], so the underlying request happens at most
    /// once across all three entry points.
    ///
    /// [`get_sdtmig_versions`]: Self::get_sdtmig_versions
    /// [`get_sdtm_versions`]: Self::get_sdtm_versions
    pub fn get_product_tabulation(&mut self) -> Result<Arc<Value>, LibraryError> {
        self.fetch_cached(KEY_PRODUCT_TABULATION, "/mdr/products/DataTabulation")
    }

    /// Published SDTM Implementation Guide versions.
    pub fn get_sdtmig_versions(&mut self) -> Result<Vec<Link>, LibraryError> {
        self.product_links("versions_sdtmig", "sdtmig")
    }

    /// Published SDTM model versions.
    pub fn get_sdtm_versions(&mut self) -> Result<Vec<Link>, LibraryError> {
        self.product_links("versions_sdtm", "sdtm")
    }

    /// Get a controlled-terminology package for SDTM.
    pub fn get_ct_package(&mut self, version: &str) -> Result<Arc<Value>, LibraryError> {
        let key = format!("sdtmct_{version}");
        let path = format!("/mdr/ct/packages/sdtmct-{version}");
        self.fetch_cached(&key, &path)
    }

    /// Memoized GET: return the cached entry or fetch, store, and return.
    fn fetch_cached(&mut self, key: &str, path: &str) -> Result<Arc<Value>, LibraryError> {
        if let Some(hit) = self.cache.get(key) {
            return Ok(Arc::clone(hit));
        }
        let value = Arc::new(self.get_json(path)?);
        self.cache.insert(key.to_string(), Arc::clone(&value));
        Ok(value)
    }

    /// Derived lookup: a named member of the product tabulation `_links`.
    fn product_links(&mut self, key: &str, product: &str) -> Result<Vec<Link>, LibraryError> {
        let entry = match self.cache.get(key) {
            Some(hit) => Arc::clone(hit),
            None => {
                let tabulation = self.get_product_tabulation()?;
                let links = tabulation
                    .get("_links")
                    .and_then(|links| links.get(product))
                    .cloned()
                    .ok_or_else(|| LibraryError::MissingLinks(product.to_string()))?;
                let links = Arc::new(links);
                self.cache.insert(key.to_string(), Arc::clone(&links));
                links
            }
        };
        serde_json::from_value((*entry).clone()).map_err(LibraryError::Json)
    }

    /// Authenticated GET of `base_url + path`, parsed as JSON.
    fn get_json(&self, path: &str) -> Result<Value, LibraryError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {url}");
        let (status, body) = SHARED_RUNTIME
            .handle()
            .block_on(async {
                let resp = http_client()
                    .get(&url)
                    .header(API_KEY_HEADER, self.token.as_str())
                    .send()
                    .await?;
                let status = resp.status().as_u16();
                let body = resp.text().await?;
                Ok::<_, reqwest::Error>((status, body))
            })
            .map_err(LibraryError::Transport)?;
        if status != 200 {
            return Err(LibraryError::Status { status, body });
        }
        serde_json::from_str(&body).map_err(LibraryError::Json)
    }
}
