//! Locator catalog, loaded once before the browser starts.
//!
//! The file is TOML with one table per entity type:
//!
//! ```toml
//! [Page]
//! expand_control = '//a[contains(@class, "uiMorePagerPrimary")]'
//! result_link = '//div[contains(@class, "fbProfileBrowserListItem")]//a[@data-hovercard]'
//! ```
//!
//! `see_more_link` and `profile_link` are accepted as older names for the two
//! keys.

use crate::errors::{LikersError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

pub const EXPAND_CONTROL: &str = "expand_control";
pub const RESULT_LINK: &str = "result_link";

const LEGACY_NAMES: &[(&str, &str)] = &[
    (EXPAND_CONTROL, "see_more_link"),
    (RESULT_LINK, "profile_link"),
];

/// Kind of object whose likers are exported.
///
/// Only pages are supported; groups and profiles would need their own
/// locators and listing URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum EntityType {
    #[default]
    Page,
}

impl EntityType {
    /// Table name in the selector file.
    pub fn section(self) -> &'static str {
        match self {
            EntityType::Page => "Page",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section())
    }
}

/// Raw catalog: entity section -> logical name -> locator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SelectorCatalog {
    sections: HashMap<String, HashMap<String, String>>,
}

impl SelectorCatalog {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LikersError::ConfigurationError(format!(
                "cannot read selector file {}: {}",
                path.display(),
                e
            ))
        })?;
        debug!(path = %path.display(), "Loaded selector file");
        Self::from_toml(&content)
    }

    /// Validates that every locator the run needs exists for `entity`.
    pub fn resolve(&self, entity: EntityType) -> Result<SelectorSet> {
        let section = self.sections.get(entity.section()).ok_or_else(|| {
            LikersError::ConfigurationError(format!(
                "selector file has no [{}] section",
                entity.section()
            ))
        })?;

        Ok(SelectorSet {
            entity,
            expand_control: Self::lookup(section, entity, EXPAND_CONTROL)?,
            result_link: Self::lookup(section, entity, RESULT_LINK)?,
        })
    }

    fn lookup(section: &HashMap<String, String>, entity: EntityType, name: &str) -> Result<String> {
        let legacy = LEGACY_NAMES
            .iter()
            .find(|(current, _)| *current == name)
            .map(|(_, legacy)| *legacy);

        std::iter::once(name)
            .chain(legacy)
            .filter_map(|key| section.get(key))
            .map(|locator| locator.trim())
            .find(|locator| !locator.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                LikersError::ConfigurationError(format!(
                    "missing locator '{}' in [{}]",
                    name,
                    entity.section()
                ))
            })
    }
}

/// Locators for one entity type, checked at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorSet {
    pub entity: EntityType,
    pub expand_control: String,
    pub result_link: String,
}
