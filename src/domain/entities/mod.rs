//! Core entities of the site directory.
//!
//! Entities are plain data structures. Creation and partial updates use
//! separate input types:
//!
//! - [`Site`] - A tracked site (tenant/property record)
//! - [`NewSite`] - Input for creating a site
//! - [`SitePatch`] - Partial update of a site
//! - [`SiteState`] - Lifecycle state of a stored site
//! - [`SiteUrl`] - A `(site id, url)` pair, used for alias rows and URL extracts

pub mod site;
pub mod site_url;

pub use site::{NewSite, Site, SitePatch, SiteState};
pub use site_url::SiteUrl;
