//! Business logic services for the application layer.

pub mod directory_service;
pub mod search_service;
pub mod site_service;
pub mod url_resolver;

pub use directory_service::DirectoryService;
pub use search_service::SearchService;
pub use site_service::SiteService;
pub use url_resolver::{UrlResolver, union_ids};
