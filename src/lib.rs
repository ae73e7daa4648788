pub mod browser;
pub mod cli;
pub mod core;
pub mod dom;
pub mod errors;
pub mod output;
pub mod pagination;
pub mod runner;
pub mod selectors;
pub mod testing;
pub mod types;

#[cfg(feature = "chrome")]
pub use browser::ChromeBrowser;
pub use browser::BrowserSession;
pub use dom::{ExtractionResult, RawResultElement, ResultExtractor};
pub use errors::{LikersError, Result};
pub use pagination::{PaginationDriver, PaginationReport, PaginationState};
pub use types::*;
