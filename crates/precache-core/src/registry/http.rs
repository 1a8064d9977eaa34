//! Registry client over the public metadata API.

use std::time::Duration;

use super::{parse, CoreOffer, Registry};
use crate::error::PrecacheError;
use crate::fetch_head;
use crate::http;
use crate::package::{ItemKind, PackageDescriptor};
use crate::resolver::RegistryEndpoints;

/// `Registry` backed by blocking libcurl requests.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    endpoints: RegistryEndpoints,
    timeout: Duration,
}

impl HttpRegistry {
    /// `timeout` bounds every metadata request and HEAD probe.
    pub fn new(endpoints: RegistryEndpoints, timeout: Duration) -> Self {
        Self { endpoints, timeout }
    }

    pub fn endpoints(&self) -> &RegistryEndpoints {
        &self.endpoints
    }

    fn get(&self, url: &str) -> Result<http::HttpResponse, PrecacheError> {
        tracing::debug!(url, "registry GET");
        http::get(url, &[("Accept", "application/json")], self.timeout).map_err(|e| {
            PrecacheError::RegistryUnreachable {
                url: url.to_string(),
                status: 0,
                reason: e.to_string(),
            }
        })
    }
}

fn bad_url(url: String, e: url::ParseError) -> PrecacheError {
    PrecacheError::RegistryUnreachable {
        url,
        status: 0,
        reason: format!("invalid URL: {e}"),
    }
}

impl Registry for HttpRegistry {
    fn core_offers(&self, locale: &str) -> Result<Vec<CoreOffer>, PrecacheError> {
        let url = self
            .endpoints
            .version_check_url(locale)
            .map_err(|e| bad_url(self.endpoints.api_base.clone(), e))?;
        let resp = self.get(&url)?;
        if !resp.is_success() {
            return Err(PrecacheError::RegistryUnreachable {
                url,
                status: resp.status,
                reason: "version check failed".to_string(),
            });
        }
        parse::parse_offers(&url, &resp.body)
    }

    fn item_info(&self, kind: ItemKind, slug: &str) -> Result<PackageDescriptor, PrecacheError> {
        let url = self
            .endpoints
            .item_info_url(kind, slug)
            .map_err(|e| bad_url(self.endpoints.api_base.clone(), e))?;
        let resp = self.get(&url)?;
        // 5xx is the registry being down, not the slug being wrong.
        if resp.status >= 500 {
            return Err(PrecacheError::RegistryUnreachable {
                url,
                status: resp.status,
                reason: format!("{kind} information lookup failed"),
            });
        }
        parse::parse_item_info(kind, slug, &url, resp.status, &resp.body)
    }

    fn probe(&self, url: &str) -> Result<u32, PrecacheError> {
        let head = fetch_head::probe(url, self.timeout).map_err(|e| PrecacheError::RegistryUnreachable {
            url: url.to_string(),
            status: 0,
            reason: e.to_string(),
        })?;
        tracing::debug!(url, status = head.status, content_length = ?head.content_length, "HEAD probe");
        Ok(head.status)
    }

    fn fetch_text(&self, url: &str) -> Result<String, PrecacheError> {
        let resp = self.get(url)?;
        if !resp.is_success() {
            return Err(PrecacheError::RegistryUnreachable {
                url: url.to_string(),
                status: resp.status,
                reason: "unexpected status".to_string(),
            });
        }
        Ok(resp.text())
    }
}
