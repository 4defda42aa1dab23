//! Repository trait for alias URLs.

use crate::domain::entities::SiteUrl;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the secondary URLs of a site.
///
/// Inserts are unchecked: the site id is not verified against the site table
/// and duplicates are stored as given.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgAliasRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AliasRepository: Send + Sync {
    async fn add(&self, site_id: i64, url: &str) -> Result<(), AppError>;

    /// Alias URLs of a site in insertion order.
    async fn list(&self, site_id: i64) -> Result<Vec<String>, AppError>;

    /// Removes every alias of a site. Returns the number removed.
    async fn clear(&self, site_id: i64) -> Result<u64, AppError>;

    /// Replaces the alias set of a site in one transaction.
    async fn replace(&self, site_id: i64, urls: &[String]) -> Result<(), AppError>;

    /// Ids of non-deleted sites having an alias exactly equal to one of `urls`.
    async fn ids_by_url(&self, urls: &[String]) -> Result<Vec<i64>, AppError>;

    /// Every alias of every non-deleted site.
    async fn all(&self) -> Result<Vec<SiteUrl>, AppError>;
}
