//! Per-command execution context.

use t96_core::{FileSystem, Limits, Mulberry32};

/// Sequential rolls for one command, drawn from the threaded RNG state.
///
/// Once any roll is drawn, [`Rolls::finish`] yields the successor state so
/// the next command continues the stream instead of repeating it.
#[derive(Debug, Clone)]
pub struct Rolls {
    rng: Mulberry32,
    used: bool,
}

impl Rolls {
    /// Start from a threaded state.
    pub fn new(rng_state: u32) -> Self {
        Self {
            rng: Mulberry32::new(rng_state),
            used: false,
        }
    }

    /// Float in `[0, 1)`.
    pub fn roll(&mut self) -> f64 {
        self.used = true;
        self.rng.next_f64()
    }

    /// Integer in `[min, max)`.
    pub fn int(&mut self, min: i64, max: i64) -> i64 {
        self.used = true;
        self.rng.int_range(min, max)
    }

    /// Index in `[0, len)`.
    pub fn index(&mut self, len: usize) -> usize {
        usize::try_from(self.int(0, len as i64)).unwrap_or(0)
    }

    /// Pick one element.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.used = true;
        self.rng.pick(items)
    }

    /// Successor state, if anything was drawn.
    pub fn finish(mut self) -> Option<u32> {
        self.used.then(|| self.rng.next_state())
    }
}

/// What a handler may consult besides the state.
#[derive(Debug)]
pub struct Ctx<'a> {
    /// The archive.
    pub fs: &'a FileSystem,
    /// Structure ceilings.
    pub limits: &'a Limits,
    /// Wall-clock time of this command, in milliseconds.
    pub now_ms: u64,
    /// Sequential rolls.
    pub rolls: Rolls,
}

impl<'a> Ctx<'a> {
    /// Context for one command.
    pub fn new(fs: &'a FileSystem, limits: &'a Limits, now_ms: u64, rng_state: u32) -> Self {
        Self {
            fs,
            limits,
            now_ms,
            rolls: Rolls::new(rng_state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_rolls_keep_state() {
        assert_eq!(Rolls::new(5).finish(), None);
    }

    #[test]
    fn drawn_rolls_advance_reproducibly() {
        let mut a = Rolls::new(5);
        let mut b = Rolls::new(5);
        assert_eq!(a.roll().to_bits(), b.roll().to_bits());
        assert_eq!(a.finish(), b.finish());
    }
}
