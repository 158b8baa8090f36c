pub mod analytics;
pub mod config;
pub mod dom;
pub mod error;
pub mod namespace;
pub mod performance;
pub mod site;
pub mod utils;

pub mod behaviors {
    pub mod forms;
    pub mod logos;
    pub mod menu;
    pub mod navbar;
    pub mod reveal;
    pub mod smooth_scroll;
}

pub use error::SiteError;
pub use site::{boot, Site, SiteOptions};
