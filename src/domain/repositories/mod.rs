//! Repository and collaborator trait definitions.
//!
//! These traits abstract data access and are implemented by concrete
//! PostgreSQL types in the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Traits
//!
//! - [`SiteRepository`] - Site records, lifecycle and grouping views
//! - [`AliasRepository`] - Alias URLs per site
//! - [`AccessControl`] - Sites a principal may access
//! - [`VisitLog`] - Visit existence checks
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod access_control;
pub mod alias_repository;
pub mod site_repository;
pub mod visit_log;

pub use access_control::{AccessControl, Principal};
pub use alias_repository::AliasRepository;
pub use site_repository::{SiteRepository, SiteSearch};
pub use visit_log::VisitLog;

#[cfg(test)]
pub use access_control::MockAccessControl;
#[cfg(test)]
pub use alias_repository::MockAliasRepository;
#[cfg(test)]
pub use site_repository::MockSiteRepository;
#[cfg(test)]
pub use visit_log::MockVisitLog;
