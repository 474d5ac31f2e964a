//! Organize command implementation.
//!
//! Runs the pipeline, renders its progress events and prints the summary.

use crate::core::pipeline::{OrganizationPipeline, RunReport};
use crate::core::planner::save_plan;
use crate::models::config::{AppConfig, RunConfig};
use crate::models::event::{EventLevel, PipelineStage, ProgressEvent};
use crate::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tokio::sync::mpsc::UnboundedReceiver;

/// Run one organization pass and print its outcome.
///
/// Ctrl-C while downmixing stops queued jobs and lets running ones finish.
/// Ctrl-C at any other stage, or a second one, aborts the process.
pub async fn organize(
    run: &RunConfig,
    config: AppConfig,
    plan_output: Option<&Path>,
) -> Result<RunReport> {
    let title = if run.dry_run {
        "[PLAN] Planning library layout (dry run)..."
    } else {
        "[EXEC] Organizing library..."
    };
    println!("{}", title.bold().cyan());
    println!();
    println!("  {} {}", "Source:".bold(), run.source.display());
    println!("  {} {}", "Target:".bold(), run.target.display());
    println!("  {} {}", "Content:".bold(), run.content_mode);
    let downmix = if run.downmix_audio { "stereo FLAC" } else { "off" };
    println!("  {} {}", "Downmix:".bold(), downmix);
    if let Some(ref selected) = run.selected_files {
        println!("  {} {} files", "Selected:".bold(), selected.len());
    }
    println!();

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let pipeline = OrganizationPipeline::new(config).with_events(tx);

    let cancel = pipeline.cancel_handle();
    let ctrl_c = tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if cancel.request_cancel() {
                tracing::warn!(
                    "Interrupted, running downmixes finish but no new ones start \
                     (Ctrl-C again to abort)"
                );
            } else {
                tracing::warn!("Aborted");
                std::process::exit(130);
            }
        }
    });
    let renderer = tokio::spawn(render_events(rx));

    let result = pipeline.run(run).await;

    // Closes the event channel so the renderer drains and exits.
    drop(pipeline);
    ctrl_c.abort();
    if let Err(e) = renderer.await {
        tracing::error!("Progress renderer failed: {}", e);
    }

    let report = result?;

    if let Some(path) = plan_output {
        save_plan(&report.plan, path)?;
        println!("{} {}", "Plan saved to".bold(), path.display());
        println!();
    }

    if report.dry_run {
        print_plan(&report);
    }
    print_summary(&report);

    Ok(report)
}

/// Render progress events until the channel closes.
async fn render_events(mut rx: UnboundedReceiver<ProgressEvent>) {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    while let Some(event) = rx.recv().await {
        pb.set_position(event.overall_percent.clamp(0.0, 100.0) as u64);

        let line = match &event.current_file {
            Some(file) => format!("{}: {}", file, event.message),
            None => event.message.clone(),
        };

        match event.level {
            EventLevel::Error => pb.println(format!("{} {}", "[FAIL]".red(), line)),
            EventLevel::Warning => pb.println(format!("{} {}", "[WARN]".yellow(), line)),
            EventLevel::Success if event.stage != PipelineStage::Done => {
                pb.println(format!("{} {}", "[OK]".green(), line))
            }
            _ => {}
        }

        if event.stage == PipelineStage::Done {
            pb.finish_with_message(event.message);
        } else {
            pb.set_message(format!("[{}] {}", event.stage, line));
        }
    }

    if !pb.is_finished() {
        pb.abandon();
    }
    println!();
}

fn print_plan(report: &RunReport) {
    println!("{}", "[Plan]".bold().green());
    for entry in &report.plan.entries {
        println!(
            "  {} {} -> {}{}",
            format!("{:>4}", entry.operation.to_string()).cyan(),
            entry.source.filename,
            entry.target.display(),
            if entry.needs_transcode { " (downmix)" } else { "" }
        );
    }
    for failure in &report.plan.failures {
        println!(
            "  {} {}: {}",
            "[FAIL]".red(),
            failure.folder.display(),
            failure.reason
        );
    }
    println!();
}

fn print_summary(report: &RunReport) {
    let header = if report.has_failures() {
        "[Run Summary]".bold().yellow()
    } else {
        "[Run Summary]".bold().green()
    };
    println!("{}", header);
    println!("  {} {}", "Run:".bold(), report.run_id);
    println!("  {} {}", "Video files:".bold(), report.scanned);
    if report.unselected > 0 {
        println!("  {} {}", "Not selected:".bold(), report.unselected);
    }
    println!("  {} {}", "Planned:".bold(), report.planned);
    if report.folder_failures > 0 {
        println!("  {} {}", "Folder failures:".bold(), report.folder_failures.to_string().red());
    }
    if !report.dry_run {
        println!("  {} {}", "Copied:".bold(), report.copied);
        println!("  {} {}", "Moved:".bold(), report.moved);
        println!("  {} {}", "Failed transfers:".bold(), report.transfer_failed);
    }
    if report.transcoded + report.transcode_failed + report.transcode_cancelled > 0 {
        println!("  {} {}", "Downmixed:".bold(), report.transcoded);
        println!("  {} {}", "Failed downmixes:".bold(), report.transcode_failed);
        if report.transcode_cancelled > 0 {
            println!("  {} {}", "Cancelled downmixes:".bold(), report.transcode_cancelled);
        }
    }
    if let Some(finished) = report.finished_at {
        let elapsed = finished - report.started_at;
        println!("  {} {:.1}s", "Elapsed:".bold(), elapsed.num_milliseconds() as f64 / 1000.0);
    }
    println!();
}
