use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

use crate::ui::PromptOutcome;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `Updated at <local time>`, generated fresh for each run.
pub fn default_message() -> String {
    default_message_at(&Local::now())
}

pub fn default_message_at<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("Updated at {}", at.format(TIMESTAMP_FORMAT))
}

/// Turns a prompt result into the message to commit with.
///
/// Blank submissions fall back to `default`; cancellation yields `None`
/// and the caller stops before touching git.
pub fn resolve_message(outcome: PromptOutcome, default: &str) -> Option<String> {
    match outcome {
        PromptOutcome::Submitted(text) if text.trim().is_empty() => Some(default.to_string()),
        PromptOutcome::Submitted(text) => Some(text.trim().to_string()),
        PromptOutcome::Cancelled => None,
    }
}
