//! Yahoo session handling.
//!
//! quoteSummary requires a session cookie (set by `fc.yahoo.com`, kept in the
//! client's cookie jar) and a matching crumb passed as a query parameter.

use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domains::finance::error::{ProviderError, ProviderResult};

const COOKIE_URL: &str = "https://fc.yahoo.com";
const REFERER: &str = "https://finance.yahoo.com/";
const CRUMB_ENDPOINTS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Accept a crumb body only if it looks like a token and not an error page.
pub fn validate_crumb(body: &str) -> Option<&str> {
    let body = body.trim();
    let is_html = body.contains("<html") || body.contains("<!DOCTYPE");
    if body.is_empty() || is_html || body.len() >= 100 || body.contains(' ') {
        return None;
    }
    Some(body)
}

/// The current crumb, fetched lazily and dropped when Yahoo rejects it.
#[derive(Debug, Default)]
pub struct CrumbStore {
    crumb: RwLock<Option<String>>,
}

impl CrumbStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached crumb or fetch a fresh one.
    pub async fn get(&self, client: &reqwest::Client) -> ProviderResult<String> {
        if let Some(crumb) = self.crumb.read().await.as_ref() {
            return Ok(crumb.clone());
        }

        let mut slot = self.crumb.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(crumb) = slot.as_ref() {
            return Ok(crumb.clone());
        }
        let crumb = fetch_crumb(client).await?;
        *slot = Some(crumb.clone());
        Ok(crumb)
    }

    /// Forget the crumb so the next [`get`](Self::get) refreshes the session.
    pub async fn invalidate(&self) {
        debug!("Invalidating Yahoo crumb");
        *self.crumb.write().await = None;
    }

    #[cfg(test)]
    async fn set(&self, crumb: &str) {
        *self.crumb.write().await = Some(crumb.to_string());
    }
}

/// Prime the cookie jar, then ask for a crumb from each endpoint in turn.
pub async fn fetch_crumb(client: &reqwest::Client) -> ProviderResult<String> {
    // fc.yahoo.com answers 404 but still sets the session cookie.
    client
        .get(COOKIE_URL)
        .header(reqwest::header::REFERER, REFERER)
        .timeout(AUTH_TIMEOUT)
        .send()
        .await
        .map_err(|e| ProviderError::auth(format!("failed to fetch session cookie: {e}")))?;

    for endpoint in CRUMB_ENDPOINTS {
        let response = match client
            .get(endpoint)
            .header(reqwest::header::REFERER, REFERER)
            .timeout(AUTH_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Crumb request to {} failed: {}", endpoint, e);
                continue;
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited("crumb endpoint".into()));
        }
        if !status.is_success() {
            debug!("Crumb endpoint {} answered {}", endpoint, status);
            continue;
        }

        let body = response.text().await?;
        if body.to_lowercase().contains("too many requests") {
            return Err(ProviderError::RateLimited("crumb endpoint".into()));
        }
        if let Some(crumb) = validate_crumb(&body) {
            debug!("Obtained Yahoo crumb from {}", endpoint);
            return Ok(crumb.to_string());
        }
    }

    Err(ProviderError::auth("no crumb endpoint returned a usable crumb"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_crumb() {
        assert_eq!(validate_crumb("aBc.123/xyz\n"), Some("aBc.123/xyz"));
        assert_eq!(validate_crumb(""), None);
        assert_eq!(validate_crumb("<!DOCTYPE html><html></html>"), None);
        assert_eq!(validate_crumb("Too Many Requests"), None);
        assert_eq!(validate_crumb(&"x".repeat(100)), None);
    }

    #[tokio::test]
    async fn test_cached_crumb_is_reused_until_invalidated() {
        let store = CrumbStore::new();
        store.set("cached").await;

        // A client is never touched while the crumb is cached.
        let client = reqwest::Client::new();
        assert_eq!(store.get(&client).await.unwrap(), "cached");

        store.invalidate().await;
        assert!(store.crumb.read().await.is_none());
    }
}
