//! Jellyfin Organizer CLI
//!
//! A command-line tool that lays out movies and TV shows for Jellyfin,
//! optionally downmixing their audio to stereo.

use clap::Parser;
use jellyfin_organizer::cli::{
    args::Cli,
    commands::{interactive, organize},
};
use jellyfin_organizer::models::config::{load_config, AppConfig, RunConfig};
use jellyfin_organizer::preflight;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let mut config = load_config();
    if let Some(max) = cli.max_transcodes {
        config.transcode.max_concurrent = usize::from(max);
    }

    let run = if cli.wants_interactive() {
        let defaults = interactive::PromptDefaults {
            source: cli.source.clone(),
            target: cli.target.clone(),
            content_mode: cli.content_type,
            downmix_audio: cli.downmix_audio,
            dry_run: cli.dry_run,
        };
        match interactive::prompt_run(&defaults)? {
            Some(run) => run,
            None => return Ok(()),
        }
    } else {
        match (cli.source.clone(), cli.target.clone()) {
            (Some(source), Some(target)) => RunConfig {
                source,
                target,
                content_mode: cli.content_type,
                downmix_audio: cli.downmix_audio,
                selected_files: None,
                dry_run: cli.dry_run,
            },
            _ => anyhow::bail!("Both SOURCE_DIR and TARGET_DIR are required"),
        }
    };

    // Run preflight checks unless skipped
    if !cli.skip_preflight && !run.dry_run {
        run_preflight_checks(&config, run.downmix_audio)?;
    }

    let report = organize::organize(&run, config, cli.plan_output.as_deref()).await?;
    if report.has_failures() {
        tracing::warn!("Run {} finished with failures", report.run_id);
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("jellyfin_organizer=debug")
    } else {
        EnvFilter::new("jellyfin_organizer=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

/// Run preflight checks and exit if any fail.
fn run_preflight_checks(config: &AppConfig, downmix_audio: bool) -> anyhow::Result<()> {
    use colored::Colorize;

    let results = preflight::run_preflight_checks(config, downmix_audio);
    if results.is_empty() {
        return Ok(());
    }

    println!("{}", "Running preflight checks...".bold());
    println!();
    preflight::print_results(&results);
    println!();

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    Ok(())
}
