//! Application layer services implementing the directory's rules.
//!
//! Services consume repository traits, apply validation and lifecycle rules,
//! and provide the API used by callers such as the admin CLI.
//!
//! # Available Services
//!
//! - [`services::site_service::SiteService`] - Site lifecycle and alias URLs
//! - [`services::url_resolver::UrlResolver`] - URL to site id resolution
//! - [`services::search_service::SearchService`] - Pattern search over candidate sites
//! - [`services::directory_service::DirectoryService`] - Grouping views and backfill

pub mod services;
