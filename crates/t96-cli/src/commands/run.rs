use std::fs;
use std::io::{self, Read};
use std::path::Path;

use colored::Colorize;
use serde_json::json;
use t96_core::{EngineConfig, GameState};
use t96_engine::{CommandResult, Session};

use crate::render;

/// Virtual time between scripted commands.
const STEP_MS: u64 = 20_000;

fn read_script(script: &Path) -> Result<String, String> {
    if script.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map_err(|e| format!("stdin: {e}"))?;
        Ok(text)
    } else {
        fs::read_to_string(script).map_err(|e| format!("{}: {e}", script.display()))
    }
}

fn summary(state: &GameState) -> serde_json::Value {
    json!({
        "path": state.current_path,
        "access": state.access_level,
        "detection": state.detection_level,
        "hostility": state.system_hostility_level,
        "truths": state.truths_discovered.iter().map(|t| t.id()).collect::<Vec<_>>(),
        "game_over": state.is_game_over,
    })
}

fn print_plain(result: &CommandResult) {
    for line in result.output.iter().chain(&result.pending_ufo74) {
        println!("{}", render::styled(line));
    }
    if let Some(image) = &result.image {
        println!("{}", render::media("IMAGE", image));
    }
    if let Some(video) = &result.video {
        println!("{}", render::media("VIDEO", video));
    }
}

fn print_json(input: &str, result: &CommandResult, state: &GameState) {
    let lines: Vec<_> = result
        .output
        .iter()
        .chain(&result.pending_ufo74)
        .map(|line| json!({ "kind": line.kind, "content": line.content }))
        .collect();
    let record = json!({
        "input": input,
        "output": lines,
        "state": summary(state),
    });
    println!("{record}");
}

/// Feed each script line to a fresh session. Blank lines and `#` comments
/// are skipped.
pub fn run(config: EngineConfig, script: &Path, as_json: bool, save: Option<&Path>) -> Result<(), String> {
    let text = read_script(script)?;
    let mut session = Session::new(config);
    tracing::info!(script = %script.display(), seed = session.state().seed, "script_started");

    let boot = session.start();
    if as_json {
        print_json("", &boot, session.state());
    } else {
        print_plain(&boot);
    }

    let mut executed = 0u64;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        executed += 1;
        let result = session.submit_at(trimmed, executed * STEP_MS, false);
        if as_json {
            print_json(trimmed, &result, session.state());
        } else {
            println!("{}", format!("> {trimmed}").bold());
            print_plain(&result);
        }
        if session.is_over() {
            break;
        }
    }

    let state = session.state();
    tracing::info!(executed, detection = state.detection_level, game_over = state.is_game_over, "script_finished");
    if !as_json {
        println!();
        if state.is_game_over {
            let reason = state.game_over_reason.as_deref().unwrap_or("");
            println!("  {} {reason}", "session ended:".red().bold());
        }
        println!(
            "  {executed} commands, detection {}%, truths {}/{}",
            state.detection_level,
            state.truths_discovered.len(),
            t96_core::TRUTH_COUNT
        );
    }

    if let Some(path) = save {
        session.write_save(path).map_err(|e| e.to_string())?;
    }
    Ok(())
}
