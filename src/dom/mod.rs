pub mod element;
pub mod processor;
pub mod state;

pub use element::{LinkElement, RawResultElement};
pub use processor::{canonical_profile_url, profile_record, ResultExtractor};
pub use state::ExtractionResult;
