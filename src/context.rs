//! Execution context and API URL resolution
//!
//! The original widget re-derived its execution context (embedded admin,
//! local dev, public storefront) inside every fetch call by sniffing the
//! page URL. Here the context is resolved once at startup into a value
//! object and injected into the fetch client.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use url::Url;

/// Where the caller is executing, which decides how API URLs are built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    /// Embedded admin app: relative paths, bearer session token
    Admin,
    /// Local development: relative paths, no auth
    #[default]
    Dev,
    /// Public storefront: absolute app-proxy URLs
    Storefront,
}

/// Resolved execution context, built once and passed to the fetch client
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub kind: ContextKind,
    pub shop: Option<String>,
    pub proxy_subpath: String,
    /// Base origin for relative paths (admin/dev); empty means caller-relative
    pub base: String,
}

impl ExecutionContext {
    pub fn new(kind: ContextKind, shop: Option<String>, proxy_subpath: impl Into<String>) -> Self {
        Self {
            kind,
            shop,
            proxy_subpath: proxy_subpath.into(),
            base: String::new(),
        }
    }

    /// Override the origin used for relative (admin/dev) paths.
    /// The CLI always needs one; the embedded widget did not.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Build the URL for an API path according to the current context.
    ///
    /// Admin and dev use paths relative to `base`, with the shop appended
    /// as a query parameter when known. Storefront goes through the app
    /// proxy: `https://{shop}/apps/{subpath}{path}?shop=...`. When no shop
    /// can be determined for a storefront call, fall back to the bare path
    /// with a warning rather than failing.
    pub fn api_url(&self, path: &str) -> String {
        let path = normalize_path(path);

        match self.kind {
            ContextKind::Admin | ContextKind::Dev => {
                let mut u = format!("{}{}", self.base, path);
                if let Some(shop) = &self.shop {
                    u = append_shop_param(&u, shop);
                }
                u
            }
            ContextKind::Storefront => match &self.shop {
                Some(shop) if shop.contains("myshopify.com") => {
                    let u = format!("https://{}/apps/{}{}", shop, self.proxy_subpath, path);
                    append_shop_param(&u, shop)
                }
                Some(shop) => {
                    warn!("Invalid shop domain for app proxy: {}", shop);
                    format!("{}{}", self.base, path)
                }
                None => {
                    warn!("No shop available for API URL, using relative path: {}", path);
                    format!("{}{}", self.base, path)
                }
            },
        }
    }

    /// Whether requests should carry the admin bearer token
    pub fn wants_admin_auth(&self) -> bool {
        self.kind == ContextKind::Admin
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

fn append_shop_param(url: &str, shop: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}shop={}",
        url,
        separator,
        url_encode_component(shop)
    )
}

fn url_encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Determine the shop domain from the available hints, in priority order:
/// explicit value, page-URL `shop` query parameter, admin-style
/// `/store/{name}` path segment, `*.myshopify.com` hostname, the same two
/// rules applied to the referrer, then a previously stored value.
pub fn discover_shop(
    explicit: Option<&str>,
    page_url: Option<&Url>,
    referrer: Option<&Url>,
    stored: Option<&str>,
) -> Option<String> {
    if let Some(shop) = explicit {
        if !shop.is_empty() {
            debug!("Shop from explicit value: {}", shop);
            return Some(shop.to_string());
        }
    }

    if let Some(url) = page_url {
        if let Some(shop) = shop_from_url(url) {
            debug!("Shop from page URL: {}", shop);
            return Some(shop);
        }
    }

    if let Some(url) = referrer {
        if let Some(shop) = shop_from_url(url) {
            debug!("Shop from referrer: {}", shop);
            return Some(shop);
        }
    }

    if let Some(shop) = stored {
        if !shop.is_empty() {
            debug!("Shop from stored value: {}", shop);
            return Some(shop.to_string());
        }
    }

    warn!("Could not determine shop from any source");
    None
}

/// Extract a shop domain from a single URL: query param, admin path
/// segment, or myshopify hostname.
fn shop_from_url(url: &Url) -> Option<String> {
    if let Some((_, shop)) = url.query_pairs().find(|(k, _)| k == "shop") {
        if !shop.is_empty() {
            return Some(shop.into_owned());
        }
    }

    let host = url.host_str().unwrap_or_default();

    // Admin URLs look like https://admin.shopify.com/store/{name}/...
    if host.contains("admin.shopify.com") {
        let segments: Vec<&str> = url.path().split('/').collect();
        if let Some(pos) = segments.iter().position(|s| *s == "store") {
            if let Some(name) = segments.get(pos + 1) {
                if !name.is_empty() {
                    return Some(format!("{}.myshopify.com", name));
                }
            }
        }
    }

    if host.ends_with("myshopify.com") {
        return Some(host.to_string());
    }

    None
}
