//! Reading files: `open`, `last`, `bookmark`, `unread`.

use t96_core::fs::path::{file_name, join};
use t96_core::rng::Mulberry32;
use t96_core::{AccessDenied, EntryType, FileNode, FileStatus, GameState, flag};

use crate::context::Ctx;
use crate::detection::calculate_delay;
use crate::evidence::check_truth_progress;
use crate::output::{CommandResult, OutputLine, StreamingMode};

use super::resolve_target;

/// Decoy files planted to catch careless intruders.
pub const TRAP_FILES: &[&str] = &[
    "URGENT_classified_alpha.txt",
    "LEAKED_alien_autopsy_REAL.dat",
    "FOR_PRESIDENTS_EYES_ONLY.enc",
    "SMOKING_GUN_proof.txt",
];

const QUIET_PREFIXES: &[&str] = &["/internal/admin/", "/internal/misc/"];
const QUIET_FLOOR: u32 = 5;
const UNSTABLE_CORRUPTION_CHANCE: f64 = 0.3;
const OVERRIDE_HINT_AFTER: usize = 5;
const UNREAD_SCAN_DEPTH: usize = 5;
const UNREAD_SCAN_LIMIT: usize = 100;
const UNREAD_SHOWN: usize = 15;

/// Archive categories by path prefix.
const CATEGORY_PREFIXES: &[(&str, &str)] = &[
    ("/ops/medical/", "medical"),
    ("/ops/assessments/", "assessments"),
    ("/ops/", "military"),
    ("/comms/liaison/", "liaison"),
    ("/comms/intercepts/", "intercepts"),
    ("/comms/", "comms"),
    ("/storage/", "storage"),
    ("/admin/", "admin"),
    ("/internal/", "internal"),
];

fn file_lines(content: &[String]) -> impl Iterator<Item = OutputLine> + '_ {
    content.iter().map(|l| OutputLine::file(l.clone()))
}

fn trap(path: &str, file: &FileNode, state: &GameState) -> CommandResult {
    if state.traps_triggered.contains(path) {
        let mut output = vec![OutputLine::system(format!("=== {path} ==="))];
        output.extend(file_lines(&file.content));
        output.extend([
            OutputLine::blank(),
            OutputLine::ufo74("UFO74: you already fell for this trap, kid. lets move on."),
        ]);
        let mut result = CommandResult::with_output(output);
        result.patch.detection_level = Some(state.detection_plus(1));
        return result;
    }

    let mut output = Vec::new();
    if state.traps_triggered.is_empty() && !state.trap_warning_given {
        output.extend([
            OutputLine::blank(),
            OutputLine::ufo74("UFO74: HACKERKID NO!"),
            OutputLine::ufo74("UFO74: thats a honeypot. too obvious. they WANT you to open it."),
            OutputLine::ufo74("       real evidence doesnt have URGENT in the name."),
            OutputLine::blank(),
        ]);
    }
    output.extend(file.content.iter().map(|l| OutputLine::error(l.clone())));

    let mut result = CommandResult::with_output(output);
    let mut traps = state.traps_triggered.clone();
    traps.insert(path.to_string());
    let mut read = state.files_read.clone();
    read.insert(path.to_string());
    result.patch.detection_level = Some(state.detection_plus(12));
    result.patch.traps_triggered = Some(traps);
    result.patch.trap_warning_given = Some(true);
    result.patch.files_read = Some(read);
    result.trigger_flicker = true;
    result.add_delay(1000);
    tracing::info!(path, "trap_triggered");
    result
}

fn already_read(path: &str, state: &GameState, ctx: &Ctx<'_>) -> CommandResult {
    let content = ctx.fs.get_file_content(path, state, true).unwrap_or_default();
    let mut output = vec![OutputLine::system(format!("=== {path} ==="))];
    output.extend(file_lines(&content));
    output.extend([
        OutputLine::blank(),
        OutputLine::warning("UFO74: you already read this file, kid. lets move on."),
    ]);
    let mut result = CommandResult::with_output(output);
    result.patch.detection_level = Some(state.detection_plus(1));
    result.patch.last_opened_file = Some(Some(path.to_string()));
    result.streaming_mode = Some(StreamingMode::Fast);
    result.target_file = Some(path.to_string());
    result
}

/// Lower detection a little for reading dull administrative files. Replaces
/// the usual read cost; never goes below [`QUIET_FLOOR`].
fn quiet_relief(path: &str, state: &GameState) -> Option<(u32, Vec<OutputLine>)> {
    let detection = state.detection_level;
    if !QUIET_PREFIXES.iter().any(|p| path.starts_with(p)) || detection <= QUIET_FLOOR {
        return None;
    }
    let key = state.seed.wrapping_add((path.len() as u32).wrapping_mul(100));
    let mut rng = Mulberry32::new(key);
    let relief = rng.int_range(1, 3) as u32;
    let lowered = detection.saturating_sub(relief).max(QUIET_FLOOR);
    let mut lines = vec![
        OutputLine::blank(),
        OutputLine::notice("[SYSTEM: access pattern normalized]"),
    ];
    if rng.int_range(0, 3) == 0 {
        lines.push(OutputLine::ufo74(
            "UFO74: good thinking, kid. reading the boring stuff keeps you looking like a regular user.",
        ));
    }
    Some((lowered, lines))
}

const TRACE_PARANOIA: u32 = 15;

fn special_effects(path: &str, state: &GameState, result: &mut CommandResult) -> Vec<OutputLine> {
    let mut lines = Vec::new();
    if path.contains("maintenance_notes") {
        let mut hidden = state.hidden_commands_discovered.clone();
        hidden.extend(["disconnect", "scan", "decode"].map(String::from));
        result.patch.hidden_commands_discovered = Some(hidden);
    }
    if path.contains("transfer_authorization") {
        let mut found = state.passwords_found.clone();
        found.insert("varginha1996".to_string());
        result.patch.passwords_found = Some(found);
    }
    if path.contains("incident_summary_official") {
        result.patch.set_flag(flag::DISINFORMATION_DISCOVERED);
    }
    if path.contains("morse_intercept") {
        result.patch.set_flag(flag::MORSE_FILE_READ);
        lines.extend([
            OutputLine::blank(),
            OutputLine::system("TIP: Use \"message <answer>\" to submit a deciphered transmission."),
        ]);
    }
    if path.contains("active_trace.sys") && !state.trace_spike_active {
        result.patch.trace_spike_active = Some(true);
        result.patch.paranoia_level = Some((state.paranoia_level + TRACE_PARANOIA).min(100));
        lines.extend([
            OutputLine::blank(),
            OutputLine::error(">> ACTIVE TRACE RUNNING <<"),
            OutputLine::ufo74("UFO74: theyre tracing you. purge it or get out."),
        ]);
    }
    if path.starts_with("/internal/sanitized/") {
        lines.extend([
            OutputLine::blank(),
            OutputLine::ufo74("UFO74: sanitized version. the official lie."),
            OutputLine::ufo74("       compare it with the real logs."),
        ]);
    }
    lines
}

fn lock_hints(file: &FileNode, target: &str, ctx: &mut Ctx<'_>) -> Vec<OutputLine> {
    let (pool, tip): (&[&str], String) = if file.security_question.is_some() {
        (
            &[
                "UFO74: this file is encrypted, kid. look around for clues to the password.",
                "UFO74: encrypted. the answer is somewhere in the system. keep digging.",
                "UFO74: locked tight. check the other files for hints about the security question.",
            ],
            format!("TIP: Use \"decrypt {target}\" to attempt decryption."),
        )
    } else {
        (
            &[
                "UFO74: try the decrypt command, kid.",
                "UFO74: encrypted. use decrypt to crack it open.",
            ],
            format!("TIP: Use \"decrypt {target}\" to decrypt this file."),
        )
    };
    let mut lines = vec![OutputLine::blank()];
    if let Some(hint) = ctx.rolls.pick(pool) {
        lines.push(OutputLine::ufo74(*hint));
    }
    lines.push(OutputLine::system(tip));
    lines
}

/// `open <file>`: read a file.
pub(super) fn open(args: &[String], state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    let Some(target) = args.first() else {
        return CommandResult::with_output(vec![
            OutputLine::error("ERROR: Specify file"),
            OutputLine::blank(),
            OutputLine::system("TIP: Use \"ls\" to list files in the current directory."),
        ]);
    };
    let (path, suggestions) = resolve_target(target, state, ctx);

    if ctx.fs.is_dir(&path, state) {
        return CommandResult::with_output(vec![
            OutputLine::error(format!("ERROR: {target} is a directory")),
            OutputLine::blank(),
            OutputLine::system(format!("TIP: Use \"cd {target}\" to enter it.")),
            OutputLine::system("TIP: Use \"ls\" to list its contents after entering."),
        ]);
    }

    let file = match ctx.fs.can_access_file(&path, state) {
        Ok(file) => file,
        Err(reason) => {
            let mut output = vec![OutputLine::error(format!("ERROR: {reason}"))];
            if reason == AccessDenied::NotFound && !suggestions.is_empty() {
                output.push(OutputLine::blank());
                output.push(OutputLine::system("Did you mean:"));
                output.extend(suggestions.iter().map(|s| OutputLine::system(format!("  {s}"))));
            }
            let mut result = CommandResult::with_output(output);
            result.patch.detection_level = Some(state.detection_plus(5));
            result.patch.legacy_alert_counter = Some(state.legacy_alert_counter + 1);
            result.add_delay(500);
            return result;
        }
    };

    if TRAP_FILES.contains(&file.name.as_str()) {
        return trap(&path, file, state);
    }
    if state.files_read.contains(&path) {
        return already_read(&path, state, ctx);
    }

    let mut result = CommandResult::default();
    result.target_file = Some(path.clone());

    let (detection, quiet_lines) = quiet_relief(&path, state).unwrap_or_else(|| (state.detection_plus(3), Vec::new()));
    result.patch.detection_level = Some(detection);

    let mut read = state.files_read.clone();
    read.insert(path.clone());
    let read_count = read.len();
    result.patch.files_read = Some(read);
    result.patch.last_opened_file = Some(Some(path.clone()));

    if file.status == FileStatus::Unstable && ctx.rolls.roll() < UNSTABLE_CORRUPTION_CHANCE {
        let line = ctx.rolls.int(5, 15) as usize;
        let mut mutation = state.mutation(&path).cloned().unwrap_or_default();
        if !mutation.corrupted_lines.contains(&line) {
            mutation.corrupted_lines.push(line);
        }
        result.patch.file_mutations.insert(path.clone(), mutation);
        result.patch.session_stability = Some(state.session_stability.saturating_sub(3));
        result.trigger_flicker = true;
    }

    let preview = result.patch.apply_to(state);
    let content = ctx.fs.get_file_content(&path, &preview, true).unwrap_or_default();
    let decrypted = preview.mutation(&path).is_some_and(|m| m.decrypted);
    let locked = file.status == FileStatus::Encrypted && !decrypted;

    let mut notices = Vec::new();
    if !locked {
        let progress = check_truth_progress(&preview, &ctx.fs.get_file_reveals(&path), &path);
        notices = progress.notices;
        result.patch.merge(progress.patch);
    }

    if let Some((_, category)) = CATEGORY_PREFIXES.iter().find(|(p, _)| path.starts_with(p)) {
        let mut categories = state.categories_read.clone();
        categories.insert((*category).to_string());
        if categories.len() >= 3 {
            result.patch.set_flag(flag::READ_MULTIPLE_CATEGORIES);
        }
        result.patch.categories_read = Some(categories);
    }

    let specials = if locked {
        Vec::new()
    } else {
        special_effects(&path, state, &mut result)
    };

    let mut output = vec![
        OutputLine::blank(),
        OutputLine::system(format!("FILE: {path}")),
        OutputLine::blank(),
    ];
    output.extend(file_lines(&content));
    output.extend(notices);
    output.extend(quiet_lines);
    output.extend(specials);

    if read_count == OVERRIDE_HINT_AFTER
        && !state.flag(flag::OVERRIDE_SUGGESTED)
        && !state.flag(flag::ADMIN_UNLOCKED)
    {
        output.extend([
            OutputLine::blank(),
            OutputLine::ufo74("UFO74: youre doing good kid. but the real stuff is locked away."),
            OutputLine::ufo74("       theres an override protocol. the code is hidden in here somewhere."),
        ]);
        result.patch.set_flag(flag::OVERRIDE_SUGGESTED);
    }

    if locked {
        output.extend(lock_hints(file, file_name(&path), ctx));
    } else {
        if let Some(image) = file.image.as_ref().filter(|i| !state.images_shown.contains(&i.src)) {
            let mut shown = state.images_shown.clone();
            shown.insert(image.src.clone());
            result.patch.images_shown = Some(shown);
            result.image = Some(image.clone());
        }
        if let Some(video) = file.video.as_ref().filter(|v| !state.videos_shown.contains(&v.src)) {
            let mut shown = state.videos_shown.clone();
            shown.insert(video.src.clone());
            result.patch.videos_shown = Some(shown);
            result.video = Some(video.clone());
        }
    }

    result.streaming_mode = Some(if file.status == FileStatus::Unstable || result.trigger_flicker {
        StreamingMode::Glitchy
    } else if file.status == FileStatus::Encrypted || file.status.is_restricted() {
        StreamingMode::Slow
    } else if content.len() > 30 {
        StreamingMode::Fast
    } else {
        StreamingMode::Normal
    });
    result.delay_ms = Some(calculate_delay(state));
    result.output = output;
    result
}

/// `last`: re-read the most recent file without cost.
pub(super) fn last(state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    let Some(path) = state.last_opened_file.as_deref() else {
        return CommandResult::with_output(vec![
            OutputLine::error("ERROR: No file has been opened yet."),
            OutputLine::system("TIP: Use \"open <filename>\" to read a file."),
        ]);
    };
    let Some(content) = ctx.fs.get_file_content(path, state, true) else {
        return CommandResult::with_output(vec![OutputLine::error("ERROR: File no longer available.")]);
    };
    let mut output = vec![
        OutputLine::system(format!("[Re-reading: {}]", file_name(path))),
        OutputLine::blank(),
    ];
    output.extend(file_lines(&content));
    CommandResult::with_output(output)
}

/// `bookmark [file]`: toggle a bookmark or list them.
pub(super) fn bookmark(args: &[String], state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    let Some(target) = args.first() else {
        if state.bookmarked_files.is_empty() {
            return CommandResult::with_output(vec![
                OutputLine::system("No bookmarks saved."),
                OutputLine::system("TIP: Use \"bookmark <filename>\" to bookmark a file."),
            ]);
        }
        let mut output = vec![OutputLine::system("BOOKMARKS:")];
        output.extend(
            state
                .bookmarked_files
                .iter()
                .map(|p| OutputLine::output(format!("  ★ {p}"))),
        );
        return CommandResult::with_output(output);
    };

    let (path, _) = resolve_target(target, state, ctx);
    if ctx.fs.get_file(&path, state).is_none() {
        return CommandResult::with_output(vec![OutputLine::error(format!("ERROR: File not found: {target}"))]);
    }
    let mut marks = state.bookmarked_files.clone();
    let line = if marks.remove(&path) {
        format!("Bookmark removed: {path}")
    } else {
        marks.insert(path.clone());
        format!("Bookmarked: {path}")
    };
    let mut result = CommandResult::with_output(vec![OutputLine::system(line)]);
    result.patch.bookmarked_files = Some(marks);
    result
}

fn collect_unread(dir: &str, depth: usize, state: &GameState, ctx: &Ctx<'_>, scanned: &mut usize, out: &mut Vec<String>) {
    if depth > UNREAD_SCAN_DEPTH {
        return;
    }
    let Some(entries) = ctx.fs.list_directory(dir, state) else {
        return;
    };
    for entry in entries {
        if *scanned >= UNREAD_SCAN_LIMIT {
            return;
        }
        let path = join(dir, entry.name.trim_end_matches('/'));
        match entry.kind {
            EntryType::Dir => collect_unread(&path, depth + 1, state, ctx, scanned, out),
            EntryType::File => {
                *scanned += 1;
                if !state.files_read.contains(&path) {
                    out.push(path);
                }
            }
        }
    }
}

/// `unread`: list visible files not yet opened.
pub(super) fn unread(state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    let mut scanned = 0;
    let mut paths = Vec::new();
    collect_unread("/", 0, state, ctx, &mut scanned, &mut paths);
    if paths.is_empty() {
        return CommandResult::with_output(vec![OutputLine::system("All accessible files have been read.")]);
    }
    let mut output = vec![OutputLine::system(format!("UNREAD FILES ({}):", paths.len()))];
    output.extend(paths.iter().take(UNREAD_SHOWN).map(|p| OutputLine::output(format!("  {p}"))));
    if paths.len() > UNREAD_SHOWN {
        output.push(OutputLine::output(format!("  ... and {} more", paths.len() - UNREAD_SHOWN)));
    }
    CommandResult::with_output(output)
}
