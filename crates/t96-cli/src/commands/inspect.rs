use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use t96_core::{SaveSnapshot, TRUTH_COUNT};

pub fn run(file: &Path) -> Result<(), String> {
    let snapshot = SaveSnapshot::read_from(file).map_err(|e| format!("{}: {e}", file.display()))?;
    let state = &snapshot.state;

    let truths = if state.truths_discovered.is_empty() {
        "—".to_string()
    } else {
        state.truths_discovered.iter().map(|t| t.label()).collect::<Vec<_>>().join(", ")
    };
    let ending = match (&state.is_game_over, &state.game_over_reason) {
        (true, Some(reason)) => reason.clone(),
        (true, None) => "ended".to_string(),
        (false, _) => "in progress".to_string(),
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);
    let rows = [
        ("Version", snapshot.version.to_string()),
        ("Saved at", snapshot.saved_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        ("Label", snapshot.label.clone().unwrap_or_else(|| "—".to_string())),
        ("Seed", state.seed.to_string()),
        ("Path", state.current_path.clone()),
        ("Access level", state.access_level.to_string()),
        ("Detection", format!("{}%", state.detection_level)),
        ("Hostility", state.system_hostility_level.to_string()),
        ("Truths", format!("{}/{TRUTH_COUNT} ({truths})", state.truths_discovered.len())),
        ("Files read", state.files_read.len().to_string()),
        ("Invalid attempts", state.legacy_alert_counter.to_string()),
        ("Commands", state.session_command_count.to_string()),
        ("Status", ending),
    ];
    for (field, value) in rows {
        table.add_row(vec![field.to_string(), value]);
    }

    println!("{table}");
    Ok(())
}
