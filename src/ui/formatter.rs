//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use console::style;

use crate::error::ConfigIssue;

/// Global verbose flag (set by `--verbose`)
static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a warning message in yellow.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Echo a command before it runs. Only printed in verbose mode.
pub fn display_command(command: &str, cwd: &Path) {
    if is_verbose() {
        println!(
            "  {} {} {}",
            style("$").dim(),
            style(command).cyan(),
            style(format!("(in {})", cwd.display())).dim()
        );
    }
}

/// Display every configuration issue, one per line.
pub fn display_config_issues(issues: &[ConfigIssue]) {
    display_error("Configuration is not valid:");
    for issue in issues {
        eprintln!("  - {}", issue);
    }
}

/// Display the steps a run would perform, numbered.
pub fn display_plan(title: &str, steps: &[String]) {
    println!("\n{}", style(title).bold());
    for (i, step) in steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
}

/// Display the commit that ended up on the branch after publishing.
pub fn display_head_commit(short_hash: &str, summary: &str) {
    println!(
        "  {} {}",
        style(short_hash).yellow(),
        style(summary).dim()
    );
}
