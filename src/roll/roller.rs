use crate::common::{NonZeroUInt, UInt};
use rand::{
    distributions::{Distribution, Uniform},
    Rng,
};

/// A source of die faces.
///
/// Every [rand::Rng] is a `Roller`; tests and demos can use [ScriptedRoller] instead.
pub trait Roller {
    /// Rolls one die, returning a face in `1..=sides`.
    fn roll(&mut self, sides: NonZeroUInt) -> UInt;

    /// Rolls `num` dice, appending the faces to `out`.
    fn roll_into(&mut self, num: usize, sides: NonZeroUInt, out: &mut Vec<UInt>) {
        out.extend((0..num).map(|_| self.roll(sides)));
    }
}

impl<R: Rng> Roller for R {
    fn roll(&mut self, sides: NonZeroUInt) -> UInt {
        self.gen_range(1..=sides.get())
    }

    fn roll_into(&mut self, num: usize, sides: NonZeroUInt, out: &mut Vec<UInt>) {
        out.extend(
            Uniform::new_inclusive(1, sides.get())
                .sample_iter(self)
                .take(num),
        );
    }
}

/// Replays a fixed sequence of faces, starting over when it runs out.
///
/// A scripted value larger than the die is folded into range, so `20` on a d6 shows `2`.
#[derive(Debug, Clone)]
pub struct ScriptedRoller {
    faces: Vec<UInt>,
    next: usize,
}

impl ScriptedRoller {
    /// An empty script rolls `1` every time.
    pub fn new(faces: impl IntoIterator<Item = UInt>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            next: 0,
        }
    }
}

impl Roller for ScriptedRoller {
    fn roll(&mut self, sides: NonZeroUInt) -> UInt {
        let scripted = match self.faces.get(self.next) {
            Some(&face) => {
                self.next = (self.next + 1) % self.faces.len();
                face
            }
            None => 1,
        };
        scripted.saturating_sub(1) % sides.get() + 1
    }
}
