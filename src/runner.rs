//! Pre-launch validation and the navigate → paginate → extract run.

use crate::core::{Config, SessionTrait};
use crate::dom::{ExtractionResult, ResultExtractor};
use crate::errors::{LikersError, Result};
use crate::output::OutputFormat;
use crate::pagination::{PaginationDriver, PaginationReport};
use crate::selectors::{EntityType, SelectorCatalog, SelectorSet};
use crate::types::{ProfileRecord, RunSummary};
use regex::Regex;
use std::path::PathBuf;
use tracing::{info, info_span, warn, Instrument};
use url::Url;

const SITE_ROOT: &str = "https://www.facebook.com/";
const TARGET_ID_PATTERN: &str = r"^[A-Za-z0-9.]+$";

/// Everything the user asked for, before validation.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub target_id: String,
    pub entity: EntityType,
    pub selectors_path: PathBuf,
    pub profile_path: Option<PathBuf>,
    pub output_format: OutputFormat,
    pub config: Config,
}

/// A validated run, ready to launch a browser for.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub target_id: String,
    pub target_url: Url,
    pub selectors: SelectorSet,
    pub output_format: OutputFormat,
    pub config: Config,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub records: Vec<ProfileRecord>,
    pub summary: RunSummary,
}

/// Address of the "people who like this page" listing.
pub fn likes_url(target_id: &str) -> Result<Url> {
    let pattern = Regex::new(TARGET_ID_PATTERN)
        .map_err(|e| LikersError::ConfigurationError(e.to_string()))?;
    if !pattern.is_match(target_id) {
        return Err(LikersError::ConfigurationError(format!(
            "{:?} is not a page ID or username",
            target_id
        )));
    }

    let mut url = Url::parse(SITE_ROOT)?.join(&format!("{}/settings/", target_id))?;
    url.set_query(Some("tab=people_and_other_pages"));
    Ok(url)
}

/// Checks everything that can fail without a browser.
pub fn prepare(options: RunOptions) -> Result<RunPlan> {
    let RunOptions {
        target_id,
        entity,
        selectors_path,
        profile_path,
        output_format,
        mut config,
    } = options;

    let profile_path = profile_path.ok_or_else(|| {
        LikersError::ConfigurationError("a browser profile path is required".to_string())
    })?;
    if !profile_path.is_dir() {
        return Err(LikersError::ConfigurationError(format!(
            "browser profile {} is not a directory",
            profile_path.display()
        )));
    }
    config.browser.profile_path = Some(profile_path);

    let selectors = SelectorCatalog::load(&selectors_path)?.resolve(entity)?;
    let target_url = likes_url(&target_id)?;

    Ok(RunPlan {
        target_id,
        target_url,
        selectors,
        output_format,
        config,
    })
}

/// Runs the plan on `session` and releases it on every path.
///
/// A failing `close` is logged and never replaces the run's own outcome.
pub async fn execute<S: SessionTrait>(mut session: S, plan: &RunPlan) -> Result<RunOutput> {
    let span = info_span!(
        "run",
        run_id = %uuid::Uuid::new_v4(),
        target = %plan.target_id,
        entity = %plan.selectors.entity
    );

    async move {
        let outcome = scrape(&mut session, plan).await;
        if let Err(e) = session.close().await {
            warn!("Failed to release browser session: {}", e);
        }
        outcome
    }
    .instrument(span)
    .await
}

async fn scrape<S: SessionTrait>(session: &mut S, plan: &RunPlan) -> Result<RunOutput> {
    info!(url = %plan.target_url, "Opening likes listing");
    session.navigate_and_wait(plan.target_url.as_str()).await?;

    let report = PaginationDriver::new(
        &*session,
        &plan.selectors.expand_control,
        plan.config.pagination.clone(),
    )
    .run()
    .await?;

    let links = session.find_all(&plan.selectors.result_link).await?;

    if !report.is_complete() {
        // Counted under the drop policy whatever the configured one is.
        let partial_records = ResultExtractor::default().extract(&links)?.record_count();
        return Err(LikersError::PaginationAborted {
            expansions: report.expansions,
            partial_records,
        });
    }

    let extraction = ResultExtractor::new(plan.config.extraction.clone()).extract(&links)?;
    let summary = summarize(&report, &extraction);
    info!(
        expansions = summary.expansions,
        records = summary.records_written,
        dropped = summary.records_dropped,
        duplicates = extraction.duplicates,
        extracted_at = %summary.extracted_at.to_rfc3339(),
        "Likes listing exported"
    );
    if summary.records_dropped > 0 {
        warn!(
            dropped = summary.records_dropped,
            "Some listed people had no profile link and were left out"
        );
    }

    Ok(RunOutput {
        records: extraction.records,
        summary,
    })
}

fn summarize(report: &PaginationReport, extraction: &ExtractionResult) -> RunSummary {
    RunSummary {
        expansions: report.expansions,
        locate_attempts: report.locate_attempts,
        stale_retries: report.stale_retries,
        records_written: extraction.record_count(),
        records_dropped: extraction.dropped,
        extracted_at: extraction.timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn options(dir: &tempfile::TempDir, selectors: &str) -> RunOptions {
        let selectors_path = dir.path().join("selectors.toml");
        let mut file = std::fs::File::create(&selectors_path).unwrap();
        file.write_all(selectors.as_bytes()).unwrap();

        RunOptions {
            target_id: "SomePage".to_string(),
            entity: EntityType::Page,
            selectors_path,
            profile_path: Some(dir.path().to_path_buf()),
            output_format: OutputFormat::Csv,
            config: Config::default(),
        }
    }

    const SELECTORS: &str = "[Page]\nexpand_control = '//a[1]'\nresult_link = '//a[2]'\n";

    #[test]
    fn likes_url_for_username() {
        assert_eq!(
            likes_url("example.page").unwrap().as_str(),
            "https://www.facebook.com/example.page/settings/?tab=people_and_other_pages"
        );
    }

    #[test]
    fn likes_url_for_numeric_id() {
        assert_eq!(
            likes_url("100044").unwrap().as_str(),
            "https://www.facebook.com/100044/settings/?tab=people_and_other_pages"
        );
    }

    #[test]
    fn likes_url_rejects_paths() {
        for bad in ["", "../admin", "a/b", "page?x=1"] {
            assert!(likes_url(bad).unwrap_err().is_configuration(), "{bad}");
        }
    }

    #[test]
    fn prepare_resolves_everything() {
        let dir = tempfile::tempdir().unwrap();
        let plan = prepare(options(&dir, SELECTORS)).unwrap();

        assert_eq!(plan.selectors.expand_control, "//a[1]");
        assert_eq!(plan.config.browser.profile_path.as_deref(), Some(dir.path()));
        assert!(plan.target_url.as_str().contains("/SomePage/settings/"));
    }

    #[test]
    fn prepare_requires_a_profile() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(&dir, SELECTORS);
        opts.profile_path = None;
        assert!(prepare(opts).unwrap_err().is_configuration());

        let mut opts = options(&dir, SELECTORS);
        opts.profile_path = Some(dir.path().join("missing-profile"));
        assert!(prepare(opts).unwrap_err().is_configuration());
    }

    #[test]
    fn prepare_fails_on_incomplete_selectors() {
        let dir = tempfile::tempdir().unwrap();
        let err = prepare(options(&dir, "[Page]\nexpand_control = '//a'\n")).unwrap_err();
        assert!(err.is_configuration());
    }
}
