//! Site record and alias URL management service.

use std::sync::Arc;

use crate::domain::entities::{NewSite, Site, SitePatch};
use crate::domain::repositories::{AliasRepository, SiteRepository};
use crate::error::AppError;
use serde_json::json;

/// Service for the site lifecycle and its alias URLs.
///
/// Enforces:
/// - Required, well-formed `name` and `main_url` on create and update
/// - Deleted sites are invisible to every read
/// - `Active -> SoftDeleted -> Purged`, with no purge of an active site
pub struct SiteService<S: SiteRepository, A: AliasRepository> {
    site_repository: Arc<S>,
    alias_repository: Arc<A>,
}

impl<S: SiteRepository, A: AliasRepository> SiteService<S, A> {
    /// Creates a new site service.
    pub fn new(site_repository: Arc<S>, alias_repository: Arc<A>) -> Self {
        Self {
            site_repository,
            alias_repository,
        }
    }

    /// Creates a site together with its alias URLs and returns the new id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the name is blank or a URL is blank
    /// or malformed. Nothing is written in that case.
    /// Returns [`AppError::Storage`] on database errors; the site and its
    /// aliases are written together or not at all.
    pub async fn create_site(&self, new_site: NewSite, aliases: Vec<String>) -> Result<i64, AppError> {
        validate_name(&new_site.name)?;
        validate_url(&new_site.main_url, "main_url")?;
        for alias in &aliases {
            validate_url(alias, "alias_url")?;
        }

        let id = self.site_repository.create(new_site, &aliases).await?;

        tracing::info!(site_id = id, aliases = aliases.len(), "Site created");
        Ok(id)
    }

    /// Retrieves a non-deleted site.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the site does not exist or is deleted.
    pub async fn get_site(&self, id: i64) -> Result<Site, AppError> {
        self.site_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Site not found", json!({ "id": id })))
    }

    /// All non-deleted sites, ascending id.
    pub async fn list_sites(&self) -> Result<Vec<Site>, AppError> {
        self.site_repository.list().await
    }

    /// Non-deleted sites among `ids`, ascending id, truncated to `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidArgument`] if `limit` is not positive.
    pub async fn list_sites_by_ids(
        &self,
        ids: &[i64],
        limit: Option<i64>,
    ) -> Result<Vec<Site>, AppError> {
        if let Some(limit) = limit
            && limit < 1
        {
            return Err(AppError::invalid_argument(
                "List limit must be positive",
                json!({ "limit": limit }),
            ));
        }

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.site_repository.list_by_ids(ids, limit).await
    }

    /// Ids of all non-deleted sites, ascending.
    pub async fn list_site_ids(&self) -> Result<Vec<i64>, AppError> {
        self.site_repository.list_ids().await
    }

    /// Partially updates a non-deleted site.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the patch blanks `name` or sets a
    /// malformed `main_url`.
    /// Returns [`AppError::NotFound`] if the site does not exist or is deleted.
    pub async fn update_site(&self, id: i64, patch: SitePatch) -> Result<Site, AppError> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(main_url) = &patch.main_url {
            validate_url(main_url, "main_url")?;
        }

        if patch.is_empty() {
            return self.get_site(id).await;
        }

        let site = self.site_repository.update(id, patch).await?;
        tracing::info!(site_id = id, "Site updated");
        Ok(site)
    }

    /// Marks a site deleted. Deleting an already deleted site succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no row exists for the id.
    pub async fn soft_delete_site(&self, id: i64) -> Result<(), AppError> {
        if !self.site_repository.soft_delete(id).await? {
            return Err(AppError::not_found("Site not found", json!({ "id": id })));
        }

        tracing::info!(site_id = id, "Site soft-deleted");
        Ok(())
    }

    /// Permanently removes a soft-deleted site with its aliases and access grants.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no row exists for the id.
    /// Returns [`AppError::InvariantViolation`] if the site is not soft-deleted.
    pub async fn purge_site(&self, id: i64) -> Result<(), AppError> {
        let state = self
            .site_repository
            .find_state(id)
            .await?
            .ok_or_else(|| AppError::not_found("Site not found", json!({ "id": id })))?;

        if let Err(e) = state.ensure_purgeable(id) {
            tracing::warn!(site_id = id, "Refusing to purge active site");
            return Err(e);
        }

        self.site_repository.purge(id).await?;
        tracing::info!(site_id = id, "Site purged");
        Ok(())
    }

    /// Adds one alias URL. The site id is not checked.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is blank or malformed.
    pub async fn add_alias(&self, site_id: i64, url: &str) -> Result<(), AppError> {
        validate_url(url, "alias_url")?;
        self.alias_repository.add(site_id, url).await
    }

    pub async fn list_aliases(&self, site_id: i64) -> Result<Vec<String>, AppError> {
        self.alias_repository.list(site_id).await
    }

    /// Removes every alias of a site and returns how many were removed.
    pub async fn clear_aliases(&self, site_id: i64) -> Result<u64, AppError> {
        let removed = self.alias_repository.clear(site_id).await?;
        tracing::info!(site_id, removed, "Alias URLs cleared");
        Ok(removed)
    }

    /// Replaces the alias set of a non-deleted site.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if any URL is blank or malformed.
    /// Returns [`AppError::NotFound`] if the site does not exist or is deleted.
    pub async fn replace_aliases(&self, site_id: i64, urls: Vec<String>) -> Result<(), AppError> {
        for url in &urls {
            validate_url(url, "alias_url")?;
        }
        self.get_site(site_id).await?;

        self.alias_repository.replace(site_id, &urls).await?;
        tracing::info!(site_id, aliases = urls.len(), "Alias URLs replaced");
        Ok(())
    }

    /// `main_url` followed by the alias URLs of a non-deleted site.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the site does not exist or is deleted.
    pub async fn site_urls(&self, id: i64) -> Result<Vec<String>, AppError> {
        let site = self.get_site(id).await?;
        let aliases = self.alias_repository.list(id).await?;

        let mut urls = Vec::with_capacity(aliases.len() + 1);
        urls.push(site.main_url);
        urls.extend(aliases);
        Ok(urls)
    }
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::validation(
            "Site name is required",
            json!({ "field": "name" }),
        ));
    }
    Ok(())
}

/// URLs must be present and parse as absolute URLs. They are stored verbatim.
fn validate_url(raw: &str, field: &str) -> Result<(), AppError> {
    if raw.trim().is_empty() {
        return Err(AppError::validation(
            "URL is required",
            json!({ "field": field }),
        ));
    }

    url::Url::parse(raw).map_err(|e| {
        AppError::validation(
            "Invalid URL format",
            json!({ "field": field, "url": raw, "reason": e.to_string() }),
        )
    })?;

    Ok(())
}
