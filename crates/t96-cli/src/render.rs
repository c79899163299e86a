//! Terminal styling for output lines.

use colored::{ColoredString, Colorize};
use t96_core::MediaTrigger;
use t96_engine::{EntryKind, OutputLine};

/// Colour a line by its display category.
pub fn styled(line: &OutputLine) -> ColoredString {
    let text = line.content.as_str();
    match line.kind {
        EntryKind::Error => text.red(),
        EntryKind::Warning => text.yellow(),
        EntryKind::System => text.dimmed(),
        EntryKind::Notice => text.cyan().bold(),
        EntryKind::Input => text.bold(),
        EntryKind::Ufo74 => text.green(),
        EntryKind::File => text.white(),
        EntryKind::Output => text.normal(),
    }
}

/// Placeholder line for an image or video the terminal cannot show.
pub fn media(label: &str, trigger: &MediaTrigger) -> ColoredString {
    format!("[{label}: {}]", trigger.alt).dimmed()
}
