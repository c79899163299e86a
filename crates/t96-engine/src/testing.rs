//! Shared helpers for handler tests.

use t96_core::{FileSystem, GameState, Limits};

use crate::context::Ctx;

/// Run a handler against the standard archive at time zero.
pub(crate) fn run<F, R>(state: &GameState, f: F) -> R
where
    F: FnOnce(&GameState, &mut Ctx<'_>) -> R,
{
    run_at(state, 0, f)
}

/// Run a handler against the standard archive at `now_ms`.
pub(crate) fn run_at<F, R>(state: &GameState, now_ms: u64, f: F) -> R
where
    F: FnOnce(&GameState, &mut Ctx<'_>) -> R,
{
    let limits = Limits::default();
    let mut ctx = Ctx::new(FileSystem::standard(), &limits, now_ms, state.rng_state);
    f(state, &mut ctx)
}

/// Owned argument list.
pub(crate) fn args(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

/// Free-play state with a fixed seed.
pub(crate) fn playing() -> GameState {
    GameState::without_tutorial(1)
}
