//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx with bound
//! parameters; set membership is passed as array parameters.
//!
//! # Repositories
//!
//! - [`PgSiteRepository`] - Site records, lifecycle and grouping views
//! - [`PgAliasRepository`] - Alias URL storage
//! - [`PgAccessControl`] - Accessible site ids per principal
//! - [`PgVisitLog`] - Visit existence checks

pub mod pg_access_control;
pub mod pg_alias_repository;
pub mod pg_site_repository;
pub mod pg_visit_log;

pub use pg_access_control::PgAccessControl;
pub use pg_alias_repository::PgAliasRepository;
pub use pg_site_repository::PgSiteRepository;
pub use pg_visit_log::PgVisitLog;
