use crate::core::config::{ExtractionConfig, MissingLinkPolicy};
use crate::dom::{ExtractionResult, LinkElement};
use crate::errors::{LikersError, Result};
use crate::types::ProfileRecord;
use std::collections::HashSet;
use tracing::debug;

/// Strips the query string: everything from the first `?` on.
pub fn canonical_profile_url(href: &str) -> &str {
    match href.split_once('?') {
        Some((prefix, _)) => prefix,
        None => href,
    }
}

/// Converts one located result link into a record.
pub fn profile_record<E: LinkElement + ?Sized>(element: &E) -> Result<ProfileRecord> {
    let text = element.text().trim();
    let href = element
        .attribute("href")
        .filter(|href| !href.trim().is_empty())
        .ok_or_else(|| LikersError::MissingLinkTarget {
            text: text.to_string(),
        })?;

    Ok(ProfileRecord::new(text, canonical_profile_url(href.trim())))
}

pub struct ResultExtractor {
    config: ExtractionConfig,
}

impl ResultExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Builds deduplicated records in first-seen order.
    ///
    /// Under [`MissingLinkPolicy::Drop`] elements without a link target are
    /// counted and skipped; under [`MissingLinkPolicy::Abort`] the first one
    /// fails the whole pass.
    pub fn extract<E: LinkElement>(&self, elements: &[E]) -> Result<ExtractionResult> {
        let mut result = ExtractionResult::new();
        let mut seen = HashSet::new();

        for (index, element) in elements.iter().enumerate() {
            let record = match profile_record(element) {
                Ok(record) => record,
                Err(err @ LikersError::MissingLinkTarget { .. }) => {
                    if self.config.missing_link_policy == MissingLinkPolicy::Abort {
                        return Err(err);
                    }
                    debug!(index, "{}", err);
                    result.dropped += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };

            if seen.insert(record.profile_url.clone()) {
                result.records.push(record);
            } else {
                result.duplicates += 1;
            }
        }

        debug!(
            records = result.records.len(),
            dropped = result.dropped,
            duplicates = result.duplicates,
            "Extraction pass complete"
        );

        Ok(result)
    }
}

impl Default for ResultExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}
