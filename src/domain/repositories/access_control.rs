//! Access-control collaborator.

use std::collections::HashSet;

use crate::error::AppError;
use async_trait::async_trait;

/// The caller on whose behalf a scoped query runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub login: String,
    /// Superusers may access every site.
    pub superuser: bool,
}

impl Principal {
    pub fn user(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            superuser: false,
        }
    }

    pub fn superuser(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            superuser: true,
        }
    }
}

/// Supplies the set of site ids a principal may access.
///
/// Consumers treat the result as an opaque membership set and only intersect
/// against it.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgAccessControl`] - reads `access_grants`
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessControl: Send + Sync {
    async fn accessible_site_ids(&self, principal: &Principal) -> Result<HashSet<i64>, AppError>;
}
