//! Decode registry JSON bodies into offers and descriptors.

use serde::Deserialize;
use serde_json::Value;

use super::CoreOffer;
use crate::error::PrecacheError;
use crate::package::{ItemKind, PackageDescriptor};

#[derive(Debug, Deserialize)]
struct VersionCheck {
    #[serde(default)]
    offers: Vec<CoreOffer>,
}

/// Parses a version-check response body.
pub fn parse_offers(url: &str, body: &[u8]) -> Result<Vec<CoreOffer>, PrecacheError> {
    let parsed: VersionCheck =
        serde_json::from_slice(body).map_err(|e| PrecacheError::MalformedResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    Ok(parsed.offers)
}

/// Picks the first offer and checks that it is for the requested locale.
pub fn select_offer(offers: Vec<CoreOffer>, locale: &str) -> Result<CoreOffer, PrecacheError> {
    let Some(offer) = offers.into_iter().next() else {
        return Err(PrecacheError::LocaleNotFound {
            requested: locale.to_string(),
            offered: None,
        });
    };
    if offer.locale != locale {
        return Err(PrecacheError::LocaleNotFound {
            requested: locale.to_string(),
            offered: Some(offer.locale),
        });
    }
    Ok(offer)
}

/// Parses an item-info response into a descriptor.
///
/// A non-2xx status, or a body carrying an `error` field, means the slug is
/// unknown to the registry.
pub fn parse_item_info(
    kind: ItemKind,
    slug: &str,
    url: &str,
    status: u32,
    body: &[u8],
) -> Result<PackageDescriptor, PrecacheError> {
    let invalid = || PrecacheError::InvalidSlug {
        kind: kind.into(),
        slug: slug.to_string(),
        status,
    };
    if !(200..300).contains(&status) {
        return Err(invalid());
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| PrecacheError::MalformedResponse {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if value.is_null() || value.get("error").is_some() {
        return Err(invalid());
    }

    let malformed = |field: &str| PrecacheError::MalformedResponse {
        url: url.to_string(),
        reason: format!("missing `{field}`"),
    };
    let download_url = string_field(&value, "download_link").ok_or_else(|| malformed("download_link"))?;
    let version = string_field(&value, "version").ok_or_else(|| malformed("version"))?;

    Ok(PackageDescriptor {
        name: string_field(&value, "name").unwrap_or_else(|| slug.to_string()),
        slug: string_field(&value, "slug").unwrap_or_else(|| slug.to_string()),
        version,
        download_url,
        kind: kind.into(),
    })
}

/// Reads a field that the API sometimes encodes as a number.
fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
