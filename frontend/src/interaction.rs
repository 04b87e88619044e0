//! Timestamped record of what the visitor did on the page.
//!
//! Separate from the diagnostic `log` output: every entry is a single
//! `[User Interaction] <timestamp>: <message>` line on the browser console.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    PageLoaded,
    Navigated(String),
    NavToggled { open: bool },
    SectionVisible(String),
    ContactOpened,
    ContactClosed,
    ContactSubmitted,
    BackToTop,
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interaction::PageLoaded => write!(f, "Page loaded"),
            Interaction::Navigated(section) => write!(f, "Navigated to section: {}", section),
            Interaction::NavToggled { open } => {
                write!(f, "Nav toggled: {}", if *open { "open" } else { "closed" })
            }
            Interaction::SectionVisible(section) => write!(f, "Section visible: {}", section),
            Interaction::ContactOpened => write!(f, "Contact form opened"),
            Interaction::ContactClosed => write!(f, "Contact form closed"),
            Interaction::ContactSubmitted => write!(f, "Contact form submitted"),
            Interaction::BackToTop => write!(f, "Back to top clicked"),
        }
    }
}

pub trait InteractionLog {
    /// Emits one entry immediately. Never fails.
    fn record(&self, interaction: &Interaction);
}

/// Matches `Date.prototype.toISOString`, e.g. `2024-05-01T12:30:00.000Z`.
pub fn format_entry(at: DateTime<Utc>, interaction: &Interaction) -> String {
    format!(
        "[User Interaction] {}: {}",
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        interaction
    )
}

/// Writes entries to the browser console.
pub struct ConsoleLog;

impl InteractionLog for ConsoleLog {
    fn record(&self, interaction: &Interaction) {
        let line = format_entry(Utc::now(), interaction);
        gloo_console::log!(line);
    }
}
