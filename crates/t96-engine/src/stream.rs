//! Paced delivery of output lines with a cooperative skip.
//!
//! Lines are handed to a sink one at a time with a pause between them. When
//! the [`SkipSignal`] is set, remaining pauses are dropped and the rest of
//! the lines are flushed in order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use t96_core::Mulberry32;

use crate::output::{OutputLine, StreamingMode};

const POLL: Duration = Duration::from_millis(5);

/// Computes the pause before each line.
pub trait Pacer {
    /// Pause before `line` under `mode`.
    fn delay(&mut self, line: &OutputLine, mode: StreamingMode) -> Duration;
}

/// No pauses at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantPacer;

impl Pacer for InstantPacer {
    fn delay(&mut self, _line: &OutputLine, _mode: StreamingMode) -> Duration {
        Duration::ZERO
    }
}

/// Seeded random pauses within a window, scaled by the streaming mode.
#[derive(Debug, Clone)]
pub struct RandomPacer {
    rng: Mulberry32,
    min_ms: u64,
    max_ms: u64,
}

impl RandomPacer {
    /// Pacer drawing from `[min_ms, max_ms]`.
    pub fn new(seed: u32, min_ms: u64, max_ms: u64) -> Self {
        Self {
            rng: Mulberry32::new(seed),
            min_ms: min_ms.min(max_ms),
            max_ms: max_ms.max(min_ms),
        }
    }
}

impl Pacer for RandomPacer {
    fn delay(&mut self, line: &OutputLine, mode: StreamingMode) -> Duration {
        if line.content.is_empty() || mode == StreamingMode::Instant {
            return Duration::ZERO;
        }
        let base = self.rng.float_range(self.min_ms as f64, self.max_ms as f64 + 1.0);
        let scale = match mode {
            StreamingMode::Slow => 2.0,
            StreamingMode::Fast => 0.4,
            StreamingMode::Glitchy => self.rng.float_range(0.1, 3.0),
            _ => 1.0,
        };
        Duration::from_millis((base * scale) as u64)
    }
}

/// Shared flag asking a running stream to flush.
#[derive(Debug, Clone, Default)]
pub struct SkipSignal(Arc<AtomicBool>);

impl SkipSignal {
    /// Unset signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the stream to flush.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether a flush was asked for.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clear the signal before the next stream.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// How a stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOutcome {
    /// Lines handed to the sink.
    pub delivered: usize,
    /// Whether the skip signal cut the pacing short.
    pub skipped: bool,
}

/// Sleep for `total`, waking early when `skip` is set.
pub fn pause(total: Duration, skip: &SkipSignal) {
    let deadline = Instant::now() + total;
    while !skip.is_set() {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep(POLL.min(deadline - now));
    }
}

/// Deliver `lines` to `sink` in order, pausing between them until `skip`
/// is set.
pub fn stream_lines<P, F>(lines: &[OutputLine], mode: StreamingMode, pacer: &mut P, skip: &SkipSignal, mut sink: F) -> StreamOutcome
where
    P: Pacer + ?Sized,
    F: FnMut(&OutputLine),
{
    let mut skipped = false;
    for line in lines {
        if !skipped {
            let wait = pacer.delay(line, mode);
            if !wait.is_zero() {
                pause(wait, skip);
            }
            skipped = skip.is_set();
        }
        sink(line);
    }
    if skipped {
        tracing::debug!(lines = lines.len(), "stream_skipped");
    }
    StreamOutcome {
        delivered: lines.len(),
        skipped,
    }
}
