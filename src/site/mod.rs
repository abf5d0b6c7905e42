pub mod site_models;
pub mod site_service;
pub mod site_handlers;

pub use site_models::SiteReference;
pub use site_service::{SiteService, SITES_PROPERTY};
