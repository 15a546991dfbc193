//! Sitemapper server: axum integration, configuration and a demo site.

pub mod config;
pub mod demo;
pub mod error;
pub mod response;
pub mod server;
pub mod site;

pub use config::{ConfigOverrides, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use response::xml_response;
pub use server::serve;
pub use site::{SiteBlueprint, SiteRouter};
