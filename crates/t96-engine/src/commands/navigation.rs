//! Directory listing and navigation.

use t96_core::fs::path::{join, parent, resolve_path};
use t96_core::{DirEntry, EntryType, FileStatus, GameState, flag};

use crate::context::Ctx;
use crate::detection::calculate_delay;
use crate::output::{CommandResult, OutputLine};

const READING_WORDS_PER_MINUTE: usize = 200;
const PREVIEW_CHARS: usize = 30;

fn file_row(entry: &DirEntry, dir: &str, long: bool, state: &GameState, ctx: &Ctx<'_>) -> String {
    let path = join(dir, &entry.name);
    let mut row = format!("  {}", entry.name);
    if state.bookmarked_files.contains(&path) {
        row.push_str(" ★");
    }
    let status = entry.status.unwrap_or(FileStatus::Intact);
    if long || status != FileStatus::Intact {
        row.push_str(&format!(" [{}]", status.tag()));
    }
    row.push_str(if state.files_read.contains(&path) {
        " [READ]"
    } else {
        " [NEW]"
    });
    if let Some(file) = ctx.fs.get_file(&path, state) {
        let minutes = file.word_count() / READING_WORDS_PER_MINUTE;
        if minutes >= 2 {
            row.push_str(&format!(" [~{minutes}min]"));
        }
        let first_line = (long && status != FileStatus::Encrypted)
            .then(|| file.content.iter().find(|l| !l.trim().is_empty()))
            .flatten();
        if let Some(first) = first_line {
            let preview: String = first.chars().take(PREVIEW_CHARS).collect();
            let ellipsis = if first.chars().count() > PREVIEW_CHARS { "…" } else { "" };
            row.push_str(&format!("  {preview}{ellipsis}"));
        }
    }
    row
}

/// `ls [-l]`: list the working directory.
pub(super) fn ls(args: &[String], state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    let long = args.iter().any(|a| a == "-l");
    let dir = state.current_path.as_str();
    let Some(entries) = ctx.fs.list_directory(dir, state) else {
        return CommandResult::with_output(vec![OutputLine::error("ERROR: Cannot read directory")]);
    };

    let mut output = vec![
        OutputLine::blank(),
        OutputLine::system(format!("Directory: {dir}")),
        OutputLine::blank(),
    ];
    if entries.is_empty() {
        output.push(OutputLine::output("  (empty)"));
    }
    for entry in &entries {
        let row = match entry.kind {
            EntryType::Dir => format!("  {}", entry.name),
            EntryType::File => file_row(entry, dir, long, state, ctx),
        };
        output.push(OutputLine::output(row));
    }
    output.push(OutputLine::blank());

    let mut result = CommandResult::with_output(output);
    result.patch.detection_level = Some(state.detection_plus(2));
    result.delay_ms = Some(calculate_delay(state));
    result
}

fn changed_to(path: &str, state: &GameState) -> CommandResult {
    let mut result = CommandResult::with_output(vec![OutputLine::system(format!("Changed to: {path}"))]);
    result.patch.current_path = Some(path.to_string());
    result.patch.detection_level = Some(state.detection_plus(1));
    result
}

/// `cd <dir>`: change directory.
pub(super) fn cd(args: &[String], state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    let Some(target) = args.first() else {
        return CommandResult::with_output(vec![
            OutputLine::error("ERROR: Specify directory"),
            OutputLine::blank(),
            OutputLine::system("TIP: Use \"ls\" to see available directories."),
        ]);
    };
    let path = resolve_path(target, &state.current_path);

    if !ctx.fs.is_dir(&path, state) {
        if ctx.fs.get_file(&path, state).is_some() {
            return CommandResult::with_output(vec![
                OutputLine::error(format!("ERROR: Not a directory: {target}")),
                OutputLine::system(format!("TIP: To read a file, use: open {target}")),
            ]);
        }
        let mut result = CommandResult::with_output(vec![
            OutputLine::error(format!("ERROR: Directory not found: {target}")),
            OutputLine::blank(),
            OutputLine::system("TIP: Use \"ls\" to see available directories."),
        ]);
        result.patch.detection_level = Some(state.detection_plus(3));
        return result;
    }

    let mut result = changed_to(&path, state);
    let mut history = state.navigation_history.clone();
    history.push(state.current_path.clone());
    let overflow = history.len().saturating_sub(ctx.limits.max_navigation_history);
    history.drain(..overflow);
    result.patch.navigation_history = Some(history);

    if !state.flag(flag::FIRST_CD_DONE) {
        result.output.extend([
            OutputLine::blank(),
            OutputLine::system("TIP: Use \"cd ..\" to go up one level."),
            OutputLine::system("TIP: Use \"back\" to return to the previous directory."),
        ]);
        result.patch.set_flag(flag::FIRST_CD_DONE);
    }
    result
}

/// `back`: return to the previous directory.
pub(super) fn back(state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    let mut history = state.navigation_history.clone();
    while let Some(previous) = history.pop() {
        if ctx.fs.is_dir(&previous, state) {
            let mut result = changed_to(&previous, state);
            result.patch.navigation_history = Some(history);
            return result;
        }
    }
    if state.current_path == "/" {
        return CommandResult::with_output(vec![OutputLine::system(
            "Already at root directory. No navigation history.",
        )]);
    }
    let mut result = changed_to(&parent(&state.current_path), state);
    result.patch.navigation_history = Some(Vec::new());
    result
}

fn tree_level(dir: &str, prefix: &str, depth: usize, state: &GameState, ctx: &Ctx<'_>, out: &mut Vec<OutputLine>) {
    let Some(entries) = ctx.fs.list_directory(dir, state) else {
        return;
    };
    let count = entries.len();
    for (idx, entry) in entries.iter().enumerate() {
        let last = idx + 1 == count;
        let connector = if last { "└── " } else { "├── " };
        let name = entry.name.trim_end_matches('/');
        let path = join(dir, name);
        let mut row = format!("{prefix}{connector}{}", entry.name);
        if entry.kind == EntryType::File {
            if state.files_read.contains(&path) {
                row.push_str(" [READ]");
            } else if entry.status == Some(FileStatus::Encrypted)
                && !state.mutation(&path).is_some_and(|m| m.decrypted)
            {
                row.push_str(" [ENC]");
            }
        }
        out.push(OutputLine::output(row));
        if entry.kind == EntryType::Dir && depth < 3 {
            let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
            tree_level(&path, &child_prefix, depth + 1, state, ctx, out);
        }
    }
}

/// `tree`: show the archive three levels deep.
pub(super) fn tree(state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    let mut output = vec![OutputLine::blank(), OutputLine::output("/")];
    tree_level("/", "", 1, state, ctx, &mut output);
    output.extend([
        OutputLine::blank(),
        OutputLine::system(format!("Current location: {}", state.current_path)),
    ]);
    CommandResult::with_output(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{args, run};

    #[test]
    fn ls_lists_and_costs_detection() {
        let mut state = GameState::without_tutorial(1);
        state.current_path = "/storage/assets".into();
        let result = run(&state, |s, c| ls(&[], s, c));
        assert!(result.mentions("Directory: /storage/assets"));
        assert!(result.mentions("material_x_analysis.dat [UNSTABLE] [NEW]"));
        assert_eq!(result.patch.detection_level, Some(2));
    }

    #[test]
    fn ls_marks_read_and_bookmarked() {
        let mut state = GameState::without_tutorial(1);
        state.current_path = "/tmp".into();
        state.files_read.insert("/tmp/note_to_self.tmp".into());
        state.bookmarked_files.insert("/tmp/note_to_self.tmp".into());
        let result = run(&state, |s, c| ls(&args(&["-l"]), s, c));
        assert!(result.mentions("note_to_self.tmp ★ [INTACT] [READ]"));
    }

    #[test]
    fn cd_into_directory() {
        let state = GameState::without_tutorial(1);
        let result = run(&state, |s, c| cd(&args(&["storage"]), s, c));
        assert_eq!(result.patch.current_path.as_deref(), Some("/storage"));
        assert_eq!(result.patch.navigation_history, Some(vec!["/".to_string()]));
        assert_eq!(result.patch.flags.get(flag::FIRST_CD_DONE), Some(&true));
        assert_eq!(result.patch.detection_level, Some(1));
    }

    #[test]
    fn cd_failures() {
        let state = GameState::without_tutorial(1);
        let missing = run(&state, |s, c| cd(&args(&["nowhere"]), s, c));
        assert!(missing.mentions("ERROR: Directory not found: nowhere"));
        assert_eq!(missing.patch.detection_level, Some(3));

        let gated = run(&state, |s, c| cd(&args(&["admin"]), s, c));
        assert!(gated.mentions("Directory not found"));

        let file = run(&state, |s, c| cd(&args(&["/tmp/note_to_self.tmp"]), s, c));
        assert!(file.mentions("Not a directory"));
        assert!(file.patch.detection_level.is_none());

        let none = run(&state, |s, c| cd(&[], s, c));
        assert!(none.mentions("Specify directory"));
    }

    #[test]
    fn navigation_history_is_capped() {
        let mut state = GameState::without_tutorial(1);
        state.navigation_history = vec!["/tmp".into(); 20];
        let result = run(&state, |s, c| cd(&args(&["ops"]), s, c));
        assert_eq!(result.patch.navigation_history.map(|h| h.len()), Some(20));
    }

    #[test]
    fn back_uses_history_then_parent() {
        let mut state = GameState::without_tutorial(1);
        state.current_path = "/ops/prato".into();
        state.navigation_history = vec!["/tmp".into()];
        let result = run(&state, |s, c| back(s, c));
        assert_eq!(result.patch.current_path.as_deref(), Some("/tmp"));

        state.navigation_history.clear();
        let result = run(&state, |s, c| back(s, c));
        assert_eq!(result.patch.current_path.as_deref(), Some("/ops"));

        state.current_path = "/".into();
        let result = run(&state, |s, c| back(s, c));
        assert!(result.mentions("Already at root"));
    }

    #[test]
    fn tree_shows_encrypted_markers() {
        let state = GameState::without_tutorial(1);
        let result = run(&state, |s, c| tree(s, c));
        assert!(result.mentions("├── comms/"));
        assert!(result.mentions("transcript_core.enc [ENC]"));
        assert!(result.mentions("Current location: /"));
        assert!(!result.mentions("admin/"));
    }
}
