use crate::core::{Config, MissingLinkPolicy};
use crate::output::OutputFormat;
use crate::runner::RunOptions;
use crate::selectors::EntityType;
use clap::Parser;
use std::path::PathBuf;

/// Extracts information about who likes a given Facebook page.
#[derive(Debug, Parser)]
#[command(name = "page-likers", version, about)]
pub struct Cli {
    /// The Facebook page's numeric ID or name.
    pub target_id: String,

    /// Format of exported data.
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Csv)]
    pub output_format: OutputFormat,

    /// Chrome profile directory with a logged-in Facebook session (required).
    #[arg(long)]
    pub profile_path: Option<PathBuf>,

    /// Selector file with one table per entity type.
    #[arg(long, default_value = "selectors.toml")]
    pub selectors: PathBuf,

    #[arg(long, value_enum, default_value_t = EntityType::Page, hide = true)]
    pub entity_type: EntityType,

    /// Seconds to wait for the "See More" control before treating the list as complete.
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Give up (non-zero exit) after this many expansions.
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// What to do with a listed person that has no profile link.
    #[arg(long, value_enum, default_value_t = MissingLinkPolicy::Drop)]
    pub on_missing_link: MissingLinkPolicy,

    /// Run Chrome without a window.
    #[arg(long)]
    pub headless: bool,

    /// Log debug output to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn into_run_options(self) -> RunOptions {
        let mut config = Config::default();
        config.browser.headless = self.headless;
        config.pagination.locate_timeout_ms = self.timeout.saturating_mul(1000);
        config.pagination.max_iterations = self.max_iterations;
        config.extraction.missing_link_policy = self.on_missing_link;

        RunOptions {
            target_id: self.target_id,
            entity: self.entity_type,
            selectors_path: self.selectors,
            profile_path: self.profile_path,
            output_format: self.output_format,
            config,
        }
    }
}
