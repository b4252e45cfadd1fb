//! Service layer containing business logic orchestration.

mod opener;
mod scan_service;

pub use opener::open_in_browser;
pub use scan_service::ScanService;
