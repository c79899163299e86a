//! Side systems that run after every dispatched command.
//!
//! Stages run in a fixed order. Each one sees the state as it will be once
//! everything accumulated so far is applied, and may append output and
//! extend the turn's patch.

mod alerts;
mod commentary;
mod events;
mod hostility;
mod wandering;

use t96_core::GameState;
use t96_core::flag;

use crate::context::Ctx;
use crate::output::{CommandResult, EntryKind};

pub use alerts::{ALERT_THRESHOLD_REASON, DetectionBand, band};
pub use events::{SingularEvent, SINGULAR_EVENTS};
pub use hostility::filter_hints;

/// Commands after which the early window closes.
pub const EARLY_WINDOW: u32 = 30;

/// One command's journey through the pipeline.
#[derive(Debug)]
pub struct Turn<'t, 'c> {
    /// Lowercased command word.
    pub command: &'t str,
    /// Command arguments.
    pub args: &'t [String],
    /// State the handler ran against.
    pub before: &'t GameState,
    /// Accumulated result.
    pub result: CommandResult,
    /// Execution context.
    pub ctx: &'t mut Ctx<'c>,
}

impl Turn<'_, '_> {
    /// State once the accumulated patch is applied.
    pub fn after(&self) -> GameState {
        self.result.patch.apply_to(self.before)
    }

    /// Whether the handler reported a failure.
    pub fn failed(&self) -> bool {
        self.result.output.iter().any(|l| l.kind == EntryKind::Error)
    }

    /// Whether the command was one of `names`.
    pub fn is(&self, names: &[&str]) -> bool {
        names.contains(&self.command)
    }
}

/// A pipeline stage.
pub trait Stage: std::fmt::Debug + Sync {
    /// Stage name, for logs.
    fn name(&self) -> &'static str;

    /// Inspect and extend the turn.
    fn run(&self, turn: &mut Turn<'_, '_>);
}

#[derive(Debug)]
struct CommandCounter;

impl Stage for CommandCounter {
    fn name(&self) -> &'static str {
        "command_counter"
    }

    fn run(&self, turn: &mut Turn<'_, '_>) {
        let count = turn.after().session_command_count + 1;
        turn.result.patch.session_command_count = Some(count);
        if count >= EARLY_WINDOW && !turn.before.flag(flag::EARLY_WINDOW_PASSED) {
            turn.result.patch.set_flag(flag::EARLY_WINDOW_PASSED);
        }
    }
}

/// Every stage, in execution order.
pub const STAGES: &[&dyn Stage] = &[
    &CommandCounter,
    &events::SingularEvents,
    &hostility::Hostility,
    &alerts::DoomBanner,
    &commentary::Commentary,
    &wandering::Wandering,
    &alerts::DetectionBanners,
    &alerts::DetectionCeiling,
    &alerts::WrongAttempts,
    &alerts::AlertThreshold,
];

/// Stages that end the run when a ceiling is reached.
pub const ENDINGS: &[&dyn Stage] = &[&alerts::DetectionCeiling, &alerts::WrongAttempts, &alerts::AlertThreshold];

/// Run every stage over a handler's result.
pub fn run(command: &str, args: &[String], before: &GameState, result: CommandResult, ctx: &mut Ctx<'_>) -> CommandResult {
    run_stages(STAGES, command, args, before, result, ctx)
}

/// Run only the ending checks, for paths that bypass the full pipeline.
pub fn run_endings(command: &str, before: &GameState, result: CommandResult, ctx: &mut Ctx<'_>) -> CommandResult {
    run_stages(ENDINGS, command, &[], before, result, ctx)
}

fn run_stages(
    stages: &[&dyn Stage],
    command: &str,
    args: &[String],
    before: &GameState,
    result: CommandResult,
    ctx: &mut Ctx<'_>,
) -> CommandResult {
    let mut turn = Turn {
        command,
        args,
        before,
        result,
        ctx,
    };
    for stage in stages {
        let lines = turn.result.output.len();
        stage.run(&mut turn);
        if turn.result.output.len() != lines {
            tracing::debug!(stage = stage.name(), command, "pipeline_stage_output");
        }
    }
    turn.result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputLine;
    use crate::testing::playing;
    use t96_core::{FileSystem, Limits};

    pub(super) fn turn_through(
        stage: &dyn Stage,
        command: &str,
        args: &[&str],
        before: &GameState,
        result: CommandResult,
        now_ms: u64,
    ) -> CommandResult {
        let limits = Limits::default();
        let mut ctx = Ctx::new(FileSystem::standard(), &limits, now_ms, before.rng_state);
        let args: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
        let mut turn = Turn {
            command,
            args: &args,
            before,
            result,
            ctx: &mut ctx,
        };
        stage.run(&mut turn);
        turn.result
    }

    #[test]
    fn counter_closes_early_window() {
        let mut state = playing();
        state.session_command_count = 28;
        let result = turn_through(&CommandCounter, "ls", &[], &state, CommandResult::default(), 0);
        assert_eq!(result.patch.session_command_count, Some(29));
        assert!(result.patch.flags.is_empty());

        state.session_command_count = 29;
        let result = turn_through(&CommandCounter, "ls", &[], &state, CommandResult::default(), 0);
        assert!(result.patch.flags.contains_key(flag::EARLY_WINDOW_PASSED));
    }

    #[test]
    fn full_run_keeps_handler_output_first() {
        let state = playing();
        let limits = Limits::default();
        let mut ctx = Ctx::new(FileSystem::standard(), &limits, 0, state.rng_state);
        let handler = CommandResult::with_output(vec![OutputLine::output("hello")]);
        let result = run("ls", &[], &state, handler, &mut ctx);
        assert_eq!(result.output[0].content, "hello");
        assert_eq!(result.patch.session_command_count, Some(1));
    }
}
