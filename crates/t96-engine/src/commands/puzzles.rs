//! The reconstruction script and the intercepted morse message.

use t96_core::{GameState, flag};

use crate::output::{CommandResult, OutputLine, StreamingMode};

/// Deciphered text of the morse intercept.
pub const MORSE_ANSWER: &str = "UFO RECOVERED";
/// Guesses allowed for the morse intercept.
pub const MORSE_ATTEMPTS: u32 = 3;

fn ufo74(lines: &[&str]) -> Vec<OutputLine> {
    let mut out = vec![OutputLine::blank()];
    out.extend(lines.iter().map(|l| OutputLine::ufo74(*l)));
    out
}

fn syntax_error(reason: &str, state: &GameState) -> CommandResult {
    let mut result = CommandResult::with_output(vec![
        OutputLine::system("Parsing script..."),
        OutputLine::blank(),
        OutputLine::error("SYNTAX ERROR"),
        OutputLine::error(reason),
        OutputLine::blank(),
    ]);
    result.patch.detection_level = Some(state.detection_plus(2));
    result
}

fn script_target(script: &str) -> Option<String> {
    let rest = &script[script.find("TARGET=")? + "TARGET=".len()..];
    let target = rest.split(';').next()?.trim();
    (!target.is_empty()).then(|| target.to_lowercase())
}

/// `script INIT;TARGET=<path>;EXEC`.
pub(super) fn script(args: &[String], state: &GameState) -> CommandResult {
    if args.is_empty() {
        return CommandResult::with_output(vec![
            OutputLine::system("SCRIPT EXECUTOR v1.7"),
            OutputLine::blank(),
            OutputLine::system("Usage: script <script_content>"),
            OutputLine::blank(),
            OutputLine::system("Required format:"),
            OutputLine::system("  INIT;TARGET=<path>;EXEC"),
            OutputLine::blank(),
            OutputLine::system("See /tmp/data_reconstruction.util for available targets."),
        ]);
    }

    let script = args.join(" ").to_uppercase();
    if !script.contains("INIT") || !script.contains("EXEC") {
        return syntax_error("Script must contain INIT and EXEC commands.", state);
    }
    let Some(target) = script_target(&script) else {
        return syntax_error("Script must specify TARGET=<path>", state);
    };

    let running = [
        OutputLine::system("Parsing script..."),
        OutputLine::system("INIT... OK"),
    ];
    if target.contains("neural_fragment") {
        let mut output = running.to_vec();
        output.extend([
            OutputLine::system("TARGET=/admin/neural_fragment.dat... LOCATED"),
            OutputLine::system("EXEC... RUNNING"),
            OutputLine::blank(),
            OutputLine::warning("▓▓▓ RECONSTRUCTION IN PROGRESS ▓▓▓"),
            OutputLine::blank(),
            OutputLine::system("Recovering fragmented sectors..."),
            OutputLine::system("Rebuilding data structure..."),
            OutputLine::system("Validating integrity..."),
            OutputLine::blank(),
            OutputLine::notice("RECONSTRUCTION SUCCESSFUL"),
            OutputLine::blank(),
            OutputLine::system("File /admin/neural_fragment.dat is now accessible."),
        ]);
        let mut result = CommandResult::with_output(output);
        result.patch.set_flag(flag::SCRIPT_EXECUTED);
        result.patch.detection_level = Some(state.detection_plus(10));
        result.trigger_flicker = true;
        result.delay_ms = Some(3000);
        return result;
    }
    if target.contains("psi_residue") || target.contains("/comms/psi") {
        let mut output = running.to_vec();
        output.extend([
            OutputLine::system("TARGET=/comms/psi_residue.log... LOCATED"),
            OutputLine::system("EXEC... RUNNING"),
            OutputLine::blank(),
            OutputLine::warning("▓▓▓ RECONSTRUCTION IN PROGRESS ▓▓▓"),
            OutputLine::blank(),
            OutputLine::system("Recovering fragmented sectors..."),
            OutputLine::error("ERROR: Corruption too severe"),
            OutputLine::error("Partial recovery only:"),
            OutputLine::blank(),
            OutputLine::output("...they see through us..."),
            OutputLine::output("...we are not the first world..."),
            OutputLine::output("...we will not be the last..."),
            OutputLine::blank(),
            OutputLine::warning("RECONSTRUCTION PARTIAL - FILE LOST"),
        ]);
        let mut result = CommandResult::with_output(output);
        result.patch.detection_level = Some(state.detection_plus(10));
        result.delay_ms = Some(2500);
        return result;
    }

    let mut output = running.to_vec();
    output.extend([
        OutputLine::error(format!("TARGET={target}... NOT FOUND")),
        OutputLine::blank(),
        OutputLine::system("No reconstructable data at target."),
    ]);
    let mut result = CommandResult::with_output(output);
    result.patch.detection_level = Some(state.detection_plus(3));
    result.delay_ms = Some(1500);
    result
}

fn is_morse_answer(guess: &str) -> bool {
    let collapsed = guess.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed == MORSE_ANSWER || guess == "UFORECOVERED" || guess == "UFO-RECOVERED"
}

/// `message <text>` and its `morse` alias.
pub(super) fn message(args: &[String], state: &GameState) -> CommandResult {
    if !state.flag(flag::MORSE_FILE_READ) {
        return CommandResult::with_output(vec![
            OutputLine::error("ERROR: No pending message to decipher"),
            OutputLine::blank(),
            OutputLine::output("Read an intercepted signal file first."),
            OutputLine::output("Check /comms/intercepts/ for signal files."),
        ]);
    }
    if args.first().is_some_and(|a| a.eq_ignore_ascii_case("cancel")) {
        return CommandResult::with_output(vec![
            OutputLine::blank(),
            OutputLine::output("Morse code entry cancelled."),
            OutputLine::output("You can try again later with \"morse <message>\"."),
        ]);
    }
    if state.flag(flag::MORSE_DECIPHERED) {
        let mut output = vec![
            OutputLine::blank(),
            OutputLine::output(format!("Message already deciphered: {MORSE_ANSWER}")),
        ];
        output.extend(ufo74(&[
            "UFO74: you already got it, hackerkid.",
            "       someone on the ground confirmed the find.",
        ]));
        return CommandResult::with_output(output);
    }
    if state.morse_message_attempts >= MORSE_ATTEMPTS {
        let mut output = vec![
            OutputLine::blank(),
            OutputLine::error("Decryption attempts exhausted."),
            OutputLine::blank(),
            OutputLine::output(format!("The intercepted message was: {MORSE_ANSWER}")),
        ];
        output.extend(ufo74(&["UFO74: you missed it, kid. but now you know."]));
        return CommandResult::with_output(output);
    }
    if args.is_empty() {
        return CommandResult::with_output(vec![
            OutputLine::blank(),
            OutputLine::output("Enter your deciphered message."),
            OutputLine::output("Usage: message <deciphered text>"),
            OutputLine::blank(),
            OutputLine::system(format!(
                "[Attempts remaining: {}]",
                MORSE_ATTEMPTS - state.morse_message_attempts
            )),
        ]);
    }

    let guess = args.join(" ").trim().to_uppercase();
    if is_morse_answer(&guess) {
        let mut output = vec![
            OutputLine::blank(),
            OutputLine::system("▓▓▓ MESSAGE DECIPHERED ▓▓▓"),
            OutputLine::blank(),
            OutputLine::warning(format!("  DECODED: {MORSE_ANSWER}")),
        ];
        output.extend(ufo74(&[
            "UFO74: you did it hackerkid!",
            "       someone on the ground radioed in the find.",
            "       this proves they KNEW what they found.",
        ]));
        let mut result = CommandResult::with_output(output);
        result.patch.set_flag(flag::MORSE_DECIPHERED);
        result.streaming_mode = Some(StreamingMode::Normal);
        tracing::info!("morse_deciphered");
        return result;
    }

    let used = state.morse_message_attempts + 1;
    let remaining = MORSE_ATTEMPTS.saturating_sub(used);
    let mut result = if remaining == 0 {
        let mut output = vec![
            OutputLine::blank(),
            OutputLine::error("DECRYPTION FAILED"),
            OutputLine::blank(),
            OutputLine::warning(format!("Your answer: {guess}")),
            OutputLine::warning("Maximum attempts exceeded."),
        ];
        output.extend(ufo74(&["UFO74: damn. you ran out of tries hackerkid."]));
        let mut result = CommandResult::with_output(output);
        result.patch.wrong_attempts = Some(state.wrong_attempts + 1);
        result
    } else {
        let mut output = vec![
            OutputLine::blank(),
            OutputLine::warning("INCORRECT"),
            OutputLine::warning(format!("Your answer: {guess}")),
            OutputLine::blank(),
            OutputLine::system(format!("[Attempts remaining: {remaining}]")),
        ];
        output.extend(ufo74(&[
            "UFO74: thats not it hackerkid.",
            "       check the morse reference again.",
        ]));
        CommandResult::with_output(output)
    };
    result.patch.morse_message_attempts = Some(used);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{args, playing};

    #[test]
    fn script_reconstructs_neural_fragment() {
        let state = playing();
        let result = script(&args(&["INIT;TARGET=/admin/neural_fragment.dat;EXEC"]), &state);
        assert!(result.mentions("RECONSTRUCTION SUCCESSFUL"));
        assert!(result.patch.flags.contains_key(flag::SCRIPT_EXECUTED));
        assert_eq!(result.patch.detection_level, Some(10));
    }

    #[test]
    fn script_syntax_errors() {
        let state = playing();
        let missing_exec = script(&args(&["init;target=x"]), &state);
        assert!(missing_exec.mentions("must contain INIT and EXEC"));
        assert_eq!(missing_exec.patch.detection_level, Some(2));
        let missing_target = script(&args(&["INIT;EXEC"]), &state);
        assert!(missing_target.mentions("TARGET=<path>"));
        let unknown = script(&args(&["INIT;TARGET=/tmp/nothing;EXEC"]), &state);
        assert!(unknown.mentions("NOT FOUND"));
        assert_eq!(unknown.patch.detection_level, Some(3));
        assert!(script(&[], &state).mentions("INIT;TARGET=<path>;EXEC"));
    }

    #[test]
    fn message_requires_intercept() {
        assert!(message(&args(&["ufo"]), &playing()).mentions("No pending message"));
    }

    #[test]
    fn message_accepts_variants() {
        let mut state = playing();
        state.flags.set(flag::MORSE_FILE_READ, true);
        for answer in [
            &["ufo", "recovered"][..],
            &["UFORECOVERED"][..],
            &["ufo-recovered"][..],
            &["ufo", "", "recovered"][..],
        ] {
            let result = message(&args(answer), &state);
            assert!(result.patch.flags.contains_key(flag::MORSE_DECIPHERED), "{answer:?}");
        }
    }

    #[test]
    fn wrong_guesses_run_out() {
        let mut state = playing();
        state.flags.set(flag::MORSE_FILE_READ, true);
        for expected in [1, 2] {
            let result = message(&args(&["sos"]), &state);
            state = result.patch.apply_to(&state);
            assert_eq!(state.morse_message_attempts, expected);
            assert_eq!(state.wrong_attempts, 0);
        }
        let last = message(&args(&["sos"]), &state);
        assert!(last.mentions("DECRYPTION FAILED"));
        state = last.patch.apply_to(&state);
        assert_eq!(state.wrong_attempts, 1);
        assert!(message(&args(&["ufo recovered"]), &state).mentions("attempts exhausted"));
    }

    #[test]
    fn morse_cancel() {
        let mut state = playing();
        state.flags.set(flag::MORSE_FILE_READ, true);
        let result = message(&args(&["cancel"]), &state);
        assert!(result.mentions("Morse code entry cancelled."));
        assert!(result.patch.is_empty());
    }
}
