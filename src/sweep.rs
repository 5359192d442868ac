use serde::{Deserialize, Serialize};

/// How far apart consecutive sweep points are.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, Display)]
pub enum Increment {
    /// Fixed step, independent of the range.
    #[display(fmt = "fixed({})", _0)]
    Fixed(i64),
    /// `(end - start) / steps`, integer division, at least 1.
    #[display(fmt = "proportional({})", _0)]
    Proportional(i64),
}

impl Increment {
    /// Step used by the random-error and block-error experiments.
    pub const FILE_SYNC: Increment = Increment::Fixed(10);
    /// Step used by the repository-tag experiment.
    pub const TAG_DIFF: Increment = Increment::Proportional(100);

    pub fn step(self, start: i64, end: i64) -> i64 {
        match self {
            Increment::Fixed(step) => step.max(1),
            Increment::Proportional(steps) => ((end - start) / steps.max(1)).max(1),
        }
    }
}

/// Inclusive block-size window used when reducing results.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BlockRange {
    pub start: i64,
    pub end: i64,
}

impl BlockRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, x: i64) -> bool {
        self.start <= x && x <= self.end
    }
}

/// Half-open `[start, end)` walk with a fixed increment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SweepSpec {
    pub start: i64,
    pub end: i64,
    pub increment: i64,
}

impl SweepSpec {
    pub fn new(range: BlockRange, increment: Increment) -> Self {
        Self {
            start: range.start,
            end: range.end,
            increment: increment.step(range.start, range.end),
        }
    }

    pub fn points(&self) -> impl Iterator<Item = i64> {
        let end = self.end;
        (self.start..)
            .step_by(self.increment as usize)
            .take_while(move |&x| x < end)
    }
}
