//! Site entity and its lifecycle.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::error::AppError;

pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_SITE_TYPE: &str = "website";

/// A tracked site.
///
/// `group` is an optional grouping label; `site_type` is an opaque kind string
/// that is never checked against a closed set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Site {
    pub id: i64,
    pub name: String,
    pub main_url: String,
    pub group: Option<String>,
    pub timezone: String,
    pub site_type: String,
    pub created_at: DateTime<Utc>,
    pub deleted: bool,
}

impl Site {
    /// Creates a new Site instance.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        name: String,
        main_url: String,
        group: Option<String>,
        timezone: String,
        site_type: String,
        created_at: DateTime<Utc>,
        deleted: bool,
    ) -> Self {
        Self {
            id,
            name,
            main_url,
            group,
            timezone,
            site_type,
            created_at,
            deleted,
        }
    }

    /// Group label with the "no group" bucket rendered as `""`.
    pub fn group_label(&self) -> &str {
        self.group.as_deref().unwrap_or("")
    }
}

/// Lifecycle of a stored site: `Active -> SoftDeleted -> Purged`.
///
/// A purged site has no row, so it has no state value; repositories report it
/// as absent. Purge is only reachable from `SoftDeleted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SiteState {
    Active,
    SoftDeleted,
}

impl SiteState {
    pub fn from_deleted_flag(deleted: bool) -> Self {
        if deleted {
            SiteState::SoftDeleted
        } else {
            SiteState::Active
        }
    }

    /// Checks that a purge may proceed from this state.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvariantViolation`] when the site is still active.
    pub fn ensure_purgeable(self, site_id: i64) -> Result<(), AppError> {
        match self {
            SiteState::SoftDeleted => Ok(()),
            SiteState::Active => Err(AppError::invariant(
                "Site must be soft-deleted before it can be purged",
                json!({ "id": site_id, "state": "active" }),
            )),
        }
    }
}

/// Input data for creating a new site.
///
/// Use [`NewSite::new`] for the required fields; the remaining fields default to
/// `UTC`, `website`, no group, and the insertion time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSite {
    pub name: String,
    pub main_url: String,
    pub group: Option<String>,
    pub timezone: String,
    pub site_type: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewSite {
    pub fn new(name: impl Into<String>, main_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            main_url: main_url.into(),
            group: None,
            timezone: DEFAULT_TIMEZONE.to_string(),
            site_type: DEFAULT_SITE_TYPE.to_string(),
            created_at: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_type(mut self, site_type: impl Into<String>) -> Self {
        self.site_type = site_type.into();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Partial update for an existing site.
///
/// `None` fields are left unchanged.
/// `group: Some(None)` clears the group; `Some(Some(g))` sets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SitePatch {
    pub name: Option<String>,
    pub main_url: Option<String>,
    pub group: Option<Option<String>>,
    pub timezone: Option<String>,
    pub site_type: Option<String>,
}

impl SitePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.main_url.is_none()
            && self.group.is_none()
            && self.timezone.is_none()
            && self.site_type.is_none()
    }
}
