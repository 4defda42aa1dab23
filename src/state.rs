//! Wiring of repositories into services.

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::{DirectoryService, SearchService, SiteService, UrlResolver};
use crate::infrastructure::persistence::{
    PgAccessControl, PgAliasRepository, PgSiteRepository, PgVisitLog,
};

pub type PgSiteService = SiteService<PgSiteRepository, PgAliasRepository>;
pub type PgUrlResolver = UrlResolver<PgSiteRepository, PgAliasRepository, PgAccessControl>;
pub type PgSearchService = SearchService<PgSiteRepository, PgAccessControl>;
pub type PgDirectoryService = DirectoryService<PgSiteRepository, PgVisitLog>;

/// PostgreSQL-backed services sharing one pool.
///
/// Each service holds its own repository handles; nothing is reached through
/// process-wide state.
#[derive(Clone)]
pub struct AppState {
    pub site_service: Arc<PgSiteService>,
    pub url_resolver: Arc<PgUrlResolver>,
    pub search_service: Arc<PgSearchService>,
    pub directory_service: Arc<PgDirectoryService>,
}

impl AppState {
    pub fn new(pool: Arc<PgPool>) -> Self {
        let site_repo = Arc::new(PgSiteRepository::new(pool.clone()));
        let alias_repo = Arc::new(PgAliasRepository::new(pool.clone()));
        let access = Arc::new(PgAccessControl::new(pool.clone()));
        let visit_log = Arc::new(PgVisitLog::new(pool));

        Self {
            site_service: Arc::new(SiteService::new(site_repo.clone(), alias_repo.clone())),
            url_resolver: Arc::new(UrlResolver::new(
                site_repo.clone(),
                alias_repo,
                access.clone(),
            )),
            search_service: Arc::new(SearchService::new(site_repo.clone(), access)),
            directory_service: Arc::new(DirectoryService::new(site_repo, visit_log)),
        }
    }
}
