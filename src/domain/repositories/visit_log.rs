//! Visit-log collaborator.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Read-only existence checks against recorded visits.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgVisitLog`] - reads `visit_log`
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitLog: Send + Sync {
    /// Whether the site has a visit whose last action time lies in the
    /// half-open window `(start, end]`.
    async fn has_visits_between(
        &self,
        site_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, AppError>;
}
