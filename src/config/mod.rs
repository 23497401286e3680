//! Configuration module

mod site;

pub use site::HighlightConfig;
pub use site::SanitizeConfig;
pub use site::SiteConfig;
