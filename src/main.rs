use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use note_publish::cli::orchestration::all_issues;
use note_publish::cli::{run_publish_workflow, PublishWorkflowArgs, WorkflowResult};
use note_publish::config::{self, Config};
use note_publish::git::lock;
use note_publish::publish::{FlowOutcome, RunOutcome, Trigger};
use note_publish::ui;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Exit code for a run the user cancelled or interrupted
const EXIT_CANCELLED: i32 = 130;

#[derive(Parser)]
#[command(
    name = "note-publish",
    version,
    about = "Build a static site from markdown notes and publish it with git"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, global = true, help = "Echo every command before it runs")]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site, then commit, pull and push it (default)
    Publish(PublishOpts),

    /// Commit and push the markdown source directory
    Sync(MessageOpts),

    /// Validate the configuration and report every problem
    Check,

    /// Write a default configuration file
    Init {
        #[arg(help = "Where to write the file (default: user config directory)")]
        path: Option<String>,

        #[arg(short, long, help = "Overwrite an existing file")]
        force: bool,
    },
}

#[derive(clap::Args, Default)]
struct MessageOpts {
    #[arg(short, long, help = "Commit message (skips the prompt)")]
    message: Option<String>,

    #[arg(short = 'y', long, help = "Commit with the default message without prompting")]
    yes: bool,

    #[arg(long, help = "Preview what would happen without making changes")]
    dry_run: bool,
}

#[derive(clap::Args, Default)]
struct PublishOpts {
    #[command(flatten)]
    message: MessageOpts,

    #[arg(long, help = "Don't sync the markdown source even if configured")]
    no_sync: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    ui::set_verbose(args.verbose);
    setup_interrupt_handler()?;

    let command = args
        .command
        .unwrap_or_else(|| Command::Publish(PublishOpts::default()));

    let (trigger, opts) = match command {
        Command::Init { path, force } => return init_config(path.as_deref(), force),
        Command::Check => {
            check_config(&load_or_exit(args.config.as_deref()));
            return Ok(());
        }
        Command::Publish(opts) => (
            Trigger::Publish {
                sync_source: !opts.no_sync,
            },
            opts.message,
        ),
        Command::Sync(opts) => (Trigger::SyncSource, opts),
    };

    let config = load_or_exit(args.config.as_deref());

    let workflow_args = PublishWorkflowArgs {
        message: opts.message,
        assume_yes: opts.yes,
        dry_run: opts.dry_run,
        heartbeat: Some(HEARTBEAT_INTERVAL),
    };

    let result = match run_publish_workflow(&workflow_args, &config, trigger) {
        Ok(result) => result,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    if let WorkflowResult::Ran(RunOutcome::Finished(flows)) = &result {
        for flow in flows {
            if let FlowOutcome::Completed(report) = flow {
                if let Some(head) = &report.head {
                    ui::display_head_commit(&head.hash, &head.summary);
                }
            }
        }
    }

    std::process::exit(result.exit_code());
}

/// Ctrl+C kills the process without unwinding, so held locks are removed here.
fn setup_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        lock::release_held();
        eprintln!();
        ui::display_warning("Interrupted; nothing further will run");
        std::process::exit(EXIT_CANCELLED);
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

fn load_or_exit(path: Option<&str>) -> Config {
    match config::load_config(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

fn check_config(config: &Config) {
    let trigger = Trigger::Publish { sync_source: true };
    let issues = all_issues(config, trigger);

    if issues.is_empty() {
        ui::display_success("Configuration is valid");
        return;
    }

    ui::display_config_issues(&issues);
    std::process::exit(1);
}

fn init_config(path: Option<&str>, force: bool) -> Result<()> {
    let target = match path {
        Some(path) => PathBuf::from(path),
        None => config::user_config_path()
            .unwrap_or_else(|| PathBuf::from(config::LOCAL_CONFIG_FILE)),
    };

    if target.exists() && !force {
        ui::display_error(&format!(
            "{} already exists (use --force to overwrite)",
            target.display()
        ));
        std::process::exit(1);
    }

    config::save_config(&target, &Config::default())?;
    ui::display_success(&format!("Wrote default configuration to {}", target.display()));
    ui::display_status("Set generator_project_path, markdown_source_path and html_output_path, then run `note-publish check`");
    Ok(())
}
