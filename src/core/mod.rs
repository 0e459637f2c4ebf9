//! Core types - pure abstractions shared across the codebase.

mod error;
mod state;
mod website;

pub use error::{SiteError, SiteResult};
pub use state::{is_shutdown, register_server, setup_shutdown_handler};
pub use website::WebsiteType;
