//! Input sanitizing and command parsing.

/// Result of [`sanitize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    /// Cleaned text.
    pub value: String,
    /// Whether anything changed.
    pub was_modified: bool,
    /// Whether the text was cut to the length limit.
    pub was_truncated: bool,
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCommand {
    /// Lowercased command word; empty for blank input.
    pub command: String,
    /// Remaining words, case preserved.
    pub args: Vec<String>,
}

impl ParsedCommand {
    /// First argument, if any.
    pub fn arg(&self, idx: usize) -> Option<&str> {
        self.args.get(idx).map(String::as_str)
    }

    /// Whether the input was blank.
    pub fn is_empty(&self) -> bool {
        self.command.is_empty()
    }
}

fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200B}'..='\u{200F}' | '\u{FEFF}')
}

/// Fold compatibility-width characters to their canonical form.
fn fold_width(c: char) -> char {
    match c {
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(u32::from(c) - 0xFEE0).unwrap_or(c),
        '\u{3000}' => ' ',
        _ => c,
    }
}

/// Normalize width, replace control characters with spaces, drop
/// zero-width characters and cut to `max_length` characters.
pub fn sanitize(input: &str, max_length: usize) -> Sanitized {
    let cleaned: Vec<char> = input
        .chars()
        .map(fold_width)
        .filter(|c| !is_zero_width(*c))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let was_truncated = cleaned.len() > max_length;
    let value: String = cleaned.into_iter().take(max_length).collect();
    Sanitized {
        was_modified: value != input,
        value,
        was_truncated,
    }
}

/// Split sanitized input into a lowercased command and its arguments.
pub fn parse(input: &str) -> ParsedCommand {
    let mut words = input.split_whitespace();
    let Some(first) = words.next() else {
        return ParsedCommand::default();
    };
    ParsedCommand {
        command: first.to_lowercase(),
        args: words.map(str::to_string).collect(),
    }
}
