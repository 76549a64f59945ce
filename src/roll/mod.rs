mod ctx;
mod error;
mod roller;
pub(crate) mod stringify;
pub(crate) mod tree;

use crate::common::Int;
use crate::parse::ast::ExpressionTree;
use std::borrow::Cow;

type EResult<T> = Result<T, EvaluationError>;

pub use ctx::{DefaultRoller, Limits, RollContext};
pub use error::EvaluationError;
pub use roller::{Roller, ScriptedRoller};
pub use tree::{DiceRecord, Evaluation, Face, NodeResult, Outcome};

/// An evaluated [ExpressionTree].
#[derive(Debug, Clone)]
pub struct Roll<'t> {
    tree: &'t ExpressionTree,
    evaluation: Cow<'t, Evaluation>,
}

impl<'t> Roll<'t> {
    pub fn tree(&self) -> &'t ExpressionTree {
        self.tree
    }

    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    pub fn into_evaluation(self) -> Evaluation {
        self.evaluation.into_owned()
    }

    pub fn total(&self) -> Int {
        self.evaluation.total()
    }

    pub fn verbose_result(&self) -> String {
        stringify::verbose(self.tree, &self.evaluation)
    }

    pub fn is_critical(&self) -> bool {
        self.evaluation.is_critical()
    }

    pub fn is_fail(&self) -> bool {
        self.evaluation.is_fail()
    }

    pub fn outcome(&self) -> Outcome {
        self.evaluation.outcome()
    }
}

impl ExpressionTree {
    /// Rolls the tree without touching it, so a shared tree can be rolled from anywhere.
    pub fn roll<R: Roller>(&self, ctx: &mut RollContext<R>) -> EResult<Roll<'_>> {
        let evaluation = tree::Evaluator::new(self, ctx).run()?;
        Ok(Roll {
            tree: self,
            evaluation: Cow::Owned(evaluation),
        })
    }

    /// Rolls the tree and keeps the result for [verbose_result](Self::verbose_result),
    /// [is_critical](Self::is_critical) and [is_fail](Self::is_fail).
    ///
    /// Any earlier result is discarded first, even if this evaluation fails.
    pub fn evaluate<R: Roller>(&mut self, ctx: &mut RollContext<R>) -> EResult<Int> {
        self.last = None;
        let evaluation = self.roll(ctx)?.into_evaluation();
        let total = evaluation.total();
        self.last = Some(evaluation);
        Ok(total)
    }

    /// The result of the last successful [evaluate](Self::evaluate).
    pub fn last_roll(&self) -> Option<Roll<'_>> {
        self.last.as_ref().map(|evaluation| Roll {
            tree: self,
            evaluation: Cow::Borrowed(evaluation),
        })
    }

    pub fn verbose_result(&self) -> EResult<String> {
        self.last_roll()
            .map(|roll| roll.verbose_result())
            .ok_or(EvaluationError::NotEvaluated)
    }

    /// `false` until the tree has been evaluated.
    pub fn is_critical(&self) -> bool {
        self.last_roll().map_or(false, |roll| roll.is_critical())
    }

    /// `false` until the tree has been evaluated.
    pub fn is_fail(&self) -> bool {
        self.last_roll().map_or(false, |roll| roll.is_fail())
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.last_roll().map(|roll| roll.outcome())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn scripted(faces: &[u32]) -> RollContext<ScriptedRoller> {
        RollContext::with_roller(ScriptedRoller::new(faces.iter().copied()))
    }

    #[test]
    fn test_evaluate_stores_result() {
        let mut tree = crate::compile("1d20").unwrap();
        assert_eq!(tree.verbose_result(), Err(EvaluationError::NotEvaluated));
        assert!(!tree.is_critical());
        assert!(!tree.is_fail());
        assert_eq!(tree.outcome(), None);

        assert_eq!(tree.evaluate(&mut scripted(&[20])), Ok(20));
        assert_eq!(tree.verbose_result().unwrap(), "1d20 = [20] = 20");
        assert!(tree.is_critical());
        assert!(!tree.is_fail());
        assert_eq!(tree.outcome(), Some(Outcome::Critical));
    }

    #[test]
    fn test_reevaluate_replaces_rolls() {
        let mut tree = crate::compile("2d20kh1").unwrap();
        let mut ctx = scripted(&[20, 3, 1, 1]);

        tree.evaluate(&mut ctx).unwrap();
        assert_eq!(tree.verbose_result().unwrap(), "2d20kh1 = [20, (3)] = 20");
        assert!(tree.is_critical());

        tree.evaluate(&mut ctx).unwrap();
        assert_eq!(tree.verbose_result().unwrap(), "2d20kh1 = [1, (1)] = 1");
        assert!(!tree.is_critical());
        assert!(tree.is_fail());
        let evaluation = tree.last_roll().unwrap().into_evaluation();
        assert_eq!(evaluation.dice().count(), 1);
        assert_eq!(evaluation.dice().next().unwrap().faces().len(), 2);
    }

    #[test]
    fn test_failed_evaluation_clears_result() {
        let mut tree = crate::compile("10 / (1d2 - 1)").unwrap();
        let mut ctx = scripted(&[2, 1]);
        assert_eq!(tree.evaluate(&mut ctx), Ok(10));
        assert_eq!(tree.evaluate(&mut ctx), Err(EvaluationError::ZeroDivision));
        assert_eq!(tree.verbose_result(), Err(EvaluationError::NotEvaluated));
        assert_eq!(tree.evaluate(&mut ctx), Ok(10));
    }

    #[test]
    fn test_roll_leaves_tree_untouched() {
        let tree = crate::compile("3d6").unwrap();
        let mut ctx = scripted(&[1, 2, 3, 4, 5, 6]);
        let first = tree.roll(&mut ctx).unwrap();
        let second = tree.roll(&mut ctx).unwrap();
        assert_eq!(first.total(), 6);
        assert_eq!(second.total(), 15);
        assert!(tree.last_roll().is_none());
    }

    #[test]
    fn test_seeded_rolls_repeat() {
        let tree = crate::compile("10d20kh5 + 2d6").unwrap();
        let a = tree.roll(&mut RollContext::with_roller(StdRng::seed_from_u64(42))).unwrap();
        let b = tree.roll(&mut RollContext::with_roller(StdRng::seed_from_u64(42))).unwrap();
        assert_eq!(a.verbose_result(), b.verbose_result());
        assert!((7..=112).contains(&a.total()));
    }
}
