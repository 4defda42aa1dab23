//! `(site id, url)` pairs.

use serde::Serialize;

/// A URL attached to a site.
///
/// Used both for alias rows and for the raw primary+alias URL extract, where
/// the same URL may appear under several sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SiteUrl {
    pub site_id: i64,
    pub url: String,
}

impl SiteUrl {
    pub fn new(site_id: i64, url: impl Into<String>) -> Self {
        Self {
            site_id,
            url: url.into(),
        }
    }
}
