use super::{error::EvaluationError, roller::Roller, tree::DiceRecord, EResult};
use crate::common::*;

pub type DefaultRoller = rand::rngs::ThreadRng;

/// Ceilings that turn absurd requests into errors before anything is allocated.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Limits {
    /// Dice rolled over a whole evaluation; `None` is unbounded.
    pub max_rolls: Option<usize>,
    /// Sides on any single die; `None` allows up to `u32::MAX`.
    pub max_sides: Option<UInt>,
    /// Nesting depth of a compiled expression. Parsing and evaluation both recurse
    /// once per level, so `None` lets hostile input exhaust the stack.
    pub max_depth: Option<usize>,
}

impl Limits {
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    pub const UNBOUNDED: Self = Self {
        max_rolls: None,
        max_sides: None,
        max_depth: None,
    };

    pub const fn new(max_rolls: usize, max_sides: UInt) -> Self {
        Self {
            max_rolls: Some(max_rolls),
            max_sides: Some(max_sides),
            max_depth: Some(Self::DEFAULT_MAX_DEPTH),
        }
    }

    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(1000, 1_000_000)
    }
}

pub struct RollContext<R = DefaultRoller> {
    limits: Limits,
    rolls: usize,
    roller: R,
}

impl<R: Roller> RollContext<R> {
    pub fn new(limits: Limits, roller: R) -> Self {
        Self {
            limits,
            rolls: 0,
            roller,
        }
    }

    pub fn with_roller(roller: R) -> Self {
        Self::new(Limits::default(), roller)
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn roller_mut(&mut self) -> &mut R {
        &mut self.roller
    }

    /// Called at the start of every evaluation.
    pub(crate) fn reset(&mut self) {
        self.rolls = 0;
    }

    fn count_rolls(&mut self, n: usize) -> EResult<()> {
        let rolls = self.rolls.saturating_add(n);
        match self.limits.max_rolls {
            Some(max) if rolls > max => Err(EvaluationError::TooManyRolls { max }),
            _ => {
                self.rolls = rolls;
                Ok(())
            }
        }
    }

    fn check_sides(&self, sides: Int) -> EResult<NonZeroUInt> {
        if sides <= 0 {
            return Err(EvaluationError::NonPositiveSides(sides));
        }
        let max = self.limits.max_sides.unwrap_or(UInt::MAX);
        UInt::try_from(sides)
            .ok()
            .filter(|&s| s <= max)
            .and_then(NonZeroUInt::new)
            .ok_or(EvaluationError::TooManySides { max })
    }

    /// Rolls `count` dice with `sides` faces each, all kept.
    pub(crate) fn roll_dice(&mut self, count: Int, sides: Int) -> EResult<DiceRecord> {
        if count < 0 {
            return Err(EvaluationError::NegativeCount(count));
        }
        let sides = self.check_sides(sides)?;
        let max = self.limits.max_rolls.unwrap_or(usize::MAX);
        let count = usize::try_from(count).map_err(|_| EvaluationError::TooManyRolls { max })?;
        self.count_rolls(count)?;

        let mut faces = Vec::with_capacity(count);
        self.roller.roll_into(count, sides, &mut faces);
        Ok(DiceRecord::new(sides.get(), faces))
    }
}

impl Default for RollContext {
    fn default() -> Self {
        Self::with_roller(rand::thread_rng())
    }
}
