use clap::Parser;
use page_likers::cli::Cli;
use page_likers::output::write_records;
use page_likers::{runner, BrowserSession, ChromeBrowser, LikersError};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "page_likers=debug,warn"
    } else {
        "page_likers=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), LikersError> {
    let plan = runner::prepare(cli.into_run_options())?;

    let session = BrowserSession::new(ChromeBrowser::new(), plan.config.clone()).await?;
    info!(session_id = session.session_id(), "Browser ready");

    let output = runner::execute(session, &plan).await?;
    write_records(&output.records, plan.output_format, std::io::stdout().lock())?;
    Ok(())
}
