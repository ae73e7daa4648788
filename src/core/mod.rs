pub mod browser;
pub mod config;
pub mod session;

pub use browser::BrowserTrait;
pub use config::{Config, ExtractionConfig, MissingLinkPolicy, PaginationConfig};
pub use session::{Locate, SessionTrait};
