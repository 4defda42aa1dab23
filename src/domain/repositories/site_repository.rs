//! Repository trait for site records.

use crate::domain::entities::{NewSite, Site, SitePatch, SiteState, SiteUrl};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

/// Validated pattern search over a candidate id set.
///
/// The pattern is trimmed once; the numeric and substring branches both use
/// the trimmed text. Construction rejects an empty candidate set and a blank pattern, so a
/// repository never has to render an empty membership list.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSearch {
    candidate_ids: Vec<i64>,
    pattern: String,
    numeric_id: Option<i64>,
    limit: Option<i64>,
}

impl SiteSearch {
    /// Builds a search.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidArgument`] if `candidate_ids` is empty, the
    /// pattern is blank, or `limit` is not positive.
    pub fn new(
        candidate_ids: Vec<i64>,
        pattern: &str,
        limit: Option<i64>,
    ) -> Result<Self, AppError> {
        if candidate_ids.is_empty() {
            return Err(AppError::invalid_argument(
                "Candidate site id set must not be empty",
                json!({ "pattern": pattern }),
            ));
        }

        if pattern.trim().is_empty() {
            return Err(AppError::invalid_argument(
                "Search pattern must not be blank",
                json!({}),
            ));
        }

        if let Some(limit) = limit
            && limit < 1
        {
            return Err(AppError::invalid_argument(
                "Search limit must be positive",
                json!({ "limit": limit }),
            ));
        }

        let pattern = pattern.trim();
        let numeric_id = if pattern.chars().all(|c| c.is_ascii_digit()) {
            pattern.parse::<i64>().ok()
        } else {
            None
        };

        Ok(Self {
            candidate_ids,
            pattern: pattern.to_string(),
            numeric_id,
            limit,
        })
    }

    pub fn candidate_ids(&self) -> &[i64] {
        &self.candidate_ids
    }

    /// Site id the pattern denotes, when it is purely numeric.
    pub fn numeric_id(&self) -> Option<i64> {
        self.numeric_id
    }

    pub fn limit(&self) -> Option<i64> {
        self.limit
    }

    /// `%pattern%` with LIKE wildcards in the pattern escaped.
    pub fn contains_pattern(&self) -> String {
        format!("%{}%", escape_like(&self.pattern))
    }

    /// `http%pattern%`, for patterns typed without a scheme.
    pub fn http_pattern(&self) -> String {
        format!("http%{}%", escape_like(&self.pattern))
    }
}

/// Escapes `\`, `%` and `_` for a LIKE expression using the default escape.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Repository interface for site records.
///
/// Every read except [`SiteRepository::find_state`] ignores soft-deleted rows.
/// Ordering of site lists is ascending id.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgSiteRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_site.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SiteRepository: Send + Sync {
    /// Inserts a site with its alias URLs in one transaction and returns the
    /// assigned id. Nothing is written when any insert fails.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn create(&self, new_site: NewSite, aliases: &[String]) -> Result<i64, AppError>;

    /// Finds a non-deleted site by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Site>, AppError>;

    /// Lifecycle state of a stored row, including soft-deleted ones.
    ///
    /// Returns `Ok(None)` when no row exists (never created, or purged).
    async fn find_state(&self, id: i64) -> Result<Option<SiteState>, AppError>;

    /// All non-deleted sites.
    async fn list(&self) -> Result<Vec<Site>, AppError>;

    /// Non-deleted sites among `ids`, optionally truncated to `limit`.
    async fn list_by_ids(&self, ids: &[i64], limit: Option<i64>) -> Result<Vec<Site>, AppError>;

    /// Ids of all non-deleted sites.
    async fn list_ids(&self) -> Result<Vec<i64>, AppError>;

    /// Partially updates a non-deleted site.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no non-deleted site has this id.
    async fn update(&self, id: i64, patch: SitePatch) -> Result<Site, AppError>;

    /// Sets the deleted flag.
    ///
    /// Returns `Ok(false)` if no row exists. Already deleted rows report `true`.
    async fn soft_delete(&self, id: i64) -> Result<bool, AppError>;

    /// Removes a soft-deleted site, its alias URLs and its access grants in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvariantViolation`] if the row is missing or not
    /// soft-deleted at the time of the delete; nothing is removed in that case.
    async fn purge(&self, id: i64) -> Result<(), AppError>;

    /// Non-deleted sites whose group equals `group` (`""` selects ungrouped sites).
    async fn list_by_group(&self, group: &str) -> Result<Vec<Site>, AppError>;

    /// Distinct groups of non-deleted sites, ungrouped reported once as `""`.
    async fn list_groups(&self) -> Result<Vec<String>, AppError>;

    async fn ids_by_timezones(&self, timezones: &[String]) -> Result<Vec<i64>, AppError>;

    async fn distinct_timezones(&self) -> Result<Vec<String>, AppError>;

    async fn distinct_types(&self) -> Result<Vec<String>, AppError>;

    /// Ids of non-deleted sites whose `main_url` is exactly one of `urls`.
    async fn ids_by_main_url(&self, urls: &[String]) -> Result<Vec<i64>, AppError>;

    /// `(id, main_url)` for every non-deleted site.
    async fn main_urls(&self) -> Result<Vec<SiteUrl>, AppError>;

    /// Runs a pattern search restricted to the search's candidate ids.
    async fn search(&self, search: &SiteSearch) -> Result<Vec<Site>, AppError>;

    /// Sets `created_at = floor` on non-deleted sites among `ids` that were
    /// created after `floor`. Returns the number of rows changed.
    async fn backfill_created_at(
        &self,
        ids: &[i64],
        floor: DateTime<Utc>,
    ) -> Result<u64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_rejects_empty_candidates() {
        let err = SiteSearch::new(vec![], "news", None).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument { .. }));
    }

    #[test]
    fn test_search_rejects_blank_pattern() {
        let err = SiteSearch::new(vec![1], "   ", None).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument { .. }));
    }

    #[test]
    fn test_search_rejects_non_positive_limit() {
        let err = SiteSearch::new(vec![1], "a", Some(0)).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument { .. }));
    }

    #[test]
    fn test_numeric_pattern_detected() {
        let search = SiteSearch::new(vec![42, 7], "42", None).unwrap();
        assert_eq!(search.numeric_id(), Some(42));

        let search = SiteSearch::new(vec![42], " 42 ", None).unwrap();
        assert_eq!(search.numeric_id(), Some(42));
    }

    #[test]
    fn test_non_numeric_pattern() {
        for pattern in ["4a2", "-3", "1.5", "example"] {
            let search = SiteSearch::new(vec![1], pattern, None).unwrap();
            assert_eq!(search.numeric_id(), None, "pattern {pattern}");
        }
    }

    #[test]
    fn test_like_patterns_escape_wildcards() {
        let search = SiteSearch::new(vec![1], "50%_off\\", None).unwrap();

        assert_eq!(search.contains_pattern(), "%50\\%\\_off\\\\%");
        assert_eq!(search.http_pattern(), "http%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_padded_pattern_is_trimmed_for_every_branch() {
        let search = SiteSearch::new(vec![42], " 42 ", None).unwrap();

        assert_eq!(search.numeric_id(), Some(42));
        assert_eq!(search.contains_pattern(), "%42%");
        assert_eq!(search.http_pattern(), "http%42%");
    }

    #[test]
    fn test_like_patterns_plain() {
        let search = SiteSearch::new(vec![1], "example.com", None).unwrap();

        assert_eq!(search.contains_pattern(), "%example.com%");
        assert_eq!(search.http_pattern(), "http%example.com%");
    }
}
