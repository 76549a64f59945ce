use super::{error::EvaluationError, roller::Roller, EResult, RollContext};
use crate::common::*;
use crate::parse::ast::{self, Evaluate, ExpressionTree, NodeId};

/// One die of a roll.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Face {
    pub value: UInt,
    pub kept: bool,
}

/// The faces produced by one dice node, in the order they were rolled.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DiceRecord {
    sides: UInt,
    faces: Vec<Face>,
}

impl DiceRecord {
    pub(crate) fn new(sides: UInt, values: Vec<UInt>) -> Self {
        Self {
            sides,
            faces: values.into_iter().map(|value| Face { value, kept: true }).collect(),
        }
    }

    pub fn sides(&self) -> UInt {
        self.sides
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn values(&self) -> impl Iterator<Item = UInt> + '_ {
        self.faces.iter().map(|f| f.value)
    }

    pub fn kept(&self) -> impl Iterator<Item = UInt> + '_ {
        self.faces.iter().filter(|f| f.kept).map(|f| f.value)
    }

    pub fn total(&self) -> Int {
        self.kept().map(Int::from).sum()
    }

    fn kept_d20(&self) -> impl Iterator<Item = UInt> + '_ {
        self.kept().filter(move |_| self.sides == 20)
    }

    /// A kept d20 shows 20.
    pub fn is_critical(&self) -> bool {
        self.kept_d20().any(|v| v == 20)
    }

    /// A kept d20 shows 1.
    pub fn is_fumble(&self) -> bool {
        self.kept_d20().any(|v| v == 1)
    }

    /// Keeps or drops `count` of the currently kept faces. Ties go to the earlier die.
    pub(crate) fn select(&mut self, kind: ModifierKind, count: usize) {
        let mut kept: Vec<usize> = (0..self.faces.len())
            .filter(|&i| self.faces[i].kept)
            .collect();
        if kind.highest() {
            kept.sort_by(|&a, &b| self.faces[b].value.cmp(&self.faces[a].value));
        } else {
            kept.sort_by_key(|&i| self.faces[i].value);
        }

        let (chosen, rest) = kept.split_at(count.min(kept.len()));
        let to_drop = if kind.keeps() { rest } else { chosen };
        for &i in to_drop {
            self.faces[i].kept = false;
        }
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct NodeResult {
    pub value: Int,
    pub dice: Option<DiceRecord>,
}

/// The result of one evaluation, stored in parallel with the nodes of the
/// [ExpressionTree] it came from.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Evaluation {
    pub(crate) results: Vec<NodeResult>,
    pub(crate) total: Int,
}

impl Evaluation {
    pub fn total(&self) -> Int {
        self.total
    }

    pub fn result(&self, id: NodeId) -> &NodeResult {
        &self.results[id.index()]
    }

    /// Every dice record, in the order the nodes were built.
    pub fn dice(&self) -> impl Iterator<Item = &DiceRecord> + '_ {
        self.results.iter().filter_map(|r| r.dice.as_ref())
    }

    pub fn is_critical(&self) -> bool {
        self.dice().any(DiceRecord::is_critical)
    }

    pub fn is_fail(&self) -> bool {
        self.dice().any(DiceRecord::is_fumble)
    }

    pub fn outcome(&self) -> Outcome {
        if self.is_critical() {
            Outcome::Critical
        } else if self.is_fail() {
            Outcome::Fail
        } else {
            Outcome::Normal
        }
    }
}

/// How a roll should be presented. A critical outranks a fail when both occur.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Outcome {
    Normal,
    Critical,
    Fail,
}

pub(crate) struct Evaluator<'t, 'c, R> {
    tree: &'t ExpressionTree,
    ctx: &'c mut RollContext<R>,
    results: Vec<NodeResult>,
}

impl<'t, 'c, R: Roller> Evaluator<'t, 'c, R> {
    pub(crate) fn new(tree: &'t ExpressionTree, ctx: &'c mut RollContext<R>) -> Self {
        ctx.reset();
        Self {
            tree,
            ctx,
            results: vec![NodeResult::default(); tree.len()],
        }
    }

    pub(crate) fn run(mut self) -> EResult<Evaluation> {
        let total = self.eval(self.tree.root())?;
        Ok(Evaluation {
            results: self.results,
            total,
        })
    }

    pub(crate) fn eval(&mut self, id: NodeId) -> EResult<Int> {
        let tree = self.tree;
        let value = tree.node(id).evaluate(id, self)?;
        self.results[id.index()].value = value;
        Ok(value)
    }

    fn record(&mut self, id: NodeId, record: DiceRecord) {
        self.results[id.index()].dice = Some(record);
    }
}

impl Evaluate for ast::Literal {
    fn evaluate<R: Roller>(&self, _: NodeId, _: &mut Evaluator<'_, '_, R>) -> EResult<Int> {
        Ok(self.value)
    }
}

impl Evaluate for ast::DiceRoll {
    fn evaluate<R: Roller>(&self, id: NodeId, ev: &mut Evaluator<'_, '_, R>) -> EResult<Int> {
        let count = match self.count {
            Some(count) => ev.eval(count)?,
            None => 1,
        };
        let sides = ev.eval(self.sides)?;

        let record = ev.ctx.roll_dice(count, sides)?;
        let total = record.total();
        ev.record(id, record);
        Ok(total)
    }
}

impl Evaluate for ast::Group {
    fn evaluate<R: Roller>(&self, _: NodeId, ev: &mut Evaluator<'_, '_, R>) -> EResult<Int> {
        ev.eval(self.inner)
    }
}

impl Evaluate for ast::Unary {
    fn evaluate<R: Roller>(&self, _: NodeId, ev: &mut Evaluator<'_, '_, R>) -> EResult<Int> {
        let value = ev.eval(self.value)?;
        match self.op {
            UnaryOperator::Pos => Ok(value),
            UnaryOperator::Neg => value.checked_neg().ok_or(EvaluationError::Overflow),
        }
    }
}

impl Evaluate for ast::Binary {
    fn evaluate<R: Roller>(&self, _: NodeId, ev: &mut Evaluator<'_, '_, R>) -> EResult<Int> {
        use BinaryOperator::*;

        let left = ev.eval(self.left)?;
        let right = ev.eval(self.right)?;
        let value = match self.op {
            Add => left.checked_add(right),
            Sub => left.checked_sub(right),
            Mul => left.checked_mul(right),
            Div => {
                if right == 0 {
                    return Err(EvaluationError::ZeroDivision);
                }
                left.checked_div(right)
            }
            Rem => {
                if right == 0 {
                    return Err(EvaluationError::ZeroModulo);
                }
                left.checked_rem(right)
            }
        };
        value.ok_or(EvaluationError::Overflow)
    }
}

impl Evaluate for ast::Modifier {
    fn evaluate<R: Roller>(&self, _: NodeId, ev: &mut Evaluator<'_, '_, R>) -> EResult<Int> {
        let value = ev.eval(self.operand)?;
        let record = ev
            .tree
            .dice_target(self.operand)
            .and_then(|target| ev.results[target.index()].dice.as_mut());

        Ok(match record {
            Some(record) => {
                record.select(self.kind, self.count);
                record.total()
            }
            None => value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::{Limits, ScriptedRoller};

    fn ctx(faces: &[UInt]) -> RollContext<ScriptedRoller> {
        RollContext::new(Limits::default(), ScriptedRoller::new(faces.iter().copied()))
    }

    fn eval(s: &str, faces: &[UInt]) -> EResult<Evaluation> {
        let tree = crate::compile(s).unwrap();
        Evaluator::new(&tree, &mut ctx(faces)).run()
    }

    fn check(s: &str, faces: &[UInt], expected: Int) {
        assert_eq!(eval(s, faces).unwrap().total(), expected, "{}", s);
    }

    fn check_err(s: &str, expected: EvaluationError) {
        assert_eq!(eval(s, &[1]).unwrap_err(), expected, "{}", s);
    }

    #[test]
    fn test_eval_number() {
        check("14", &[], 14);
        check("0", &[], 0);
    }

    #[test]
    fn test_eval_unary() {
        check("-2", &[], -2);
        check("--2", &[], 2);
        check("+-+2", &[], -2);
    }

    #[test]
    fn test_eval_binary() {
        check("2+3", &[], 5);
        check("2 * (1 - 3)", &[], -4);
        check("1 + 2 * 3", &[], 7);
        check("10 - 4 - 3", &[], 3);
        check("7 / 2", &[], 3);
        check("-7 / 2", &[], -3);
        check("-7 % 3", &[], -1);
        check("100 / 10 / 5", &[], 2);
    }

    #[test]
    fn test_eval_dice() {
        check("1d20 + 4", &[10], 14);
        check("2d4", &[2, 3], 5);
        check("d6", &[5], 5);
        check("3d6 * 2", &[1, 2, 3], 12);
        check("-1d6", &[4], -4);
        check("(1+1)d(2*3)", &[6, 6], 12);
        check("(2-2)d6", &[6], 0);
    }

    #[test]
    fn test_eval_modifiers() {
        check("4d6kh3", &[6, 1, 5, 4], 15);
        check("4d6k3", &[6, 1, 5, 4], 15);
        check("2d20kl1", &[17, 3], 3);
        check("4d6dl1", &[6, 1, 5, 4], 15);
        check("4d6dh1", &[6, 1, 5, 4], 10);
        check("2d6kh5", &[2, 3], 5);
        check("2d6dl5", &[2, 3], 0);
        check("4d6kh3dl1", &[6, 1, 5, 4], 11);
        check("4d6kh3 + 1", &[6, 1, 5, 4], 16);
    }

    #[test]
    fn test_modifier_marks_dropped_faces() {
        let tree = crate::compile("4d6kh3").unwrap();
        let evaluation = Evaluator::new(&tree, &mut ctx(&[6, 1, 5, 4])).run().unwrap();
        let record = evaluation.dice().next().unwrap();
        let kept: Vec<bool> = record.faces().iter().map(|f| f.kept).collect();
        assert_eq!(kept, vec![true, false, true, true]);
        assert_eq!(record.values().collect::<Vec<_>>(), vec![6, 1, 5, 4]);
    }

    #[test]
    fn test_eval_errors() {
        check_err("1 / 0", EvaluationError::ZeroDivision);
        check_err("1 / (2 - 2)", EvaluationError::ZeroDivision);
        check_err("1 % 0", EvaluationError::ZeroModulo);
        check_err("1d(1-1)", EvaluationError::NonPositiveSides(0));
        check_err("(0-2)d6", EvaluationError::NegativeCount(-2));
        check_err("2000d6", EvaluationError::TooManyRolls { max: 1000 });
        check_err("600d6 + 600d6", EvaluationError::TooManyRolls { max: 1000 });
        check_err("9223372036854775807 + 1", EvaluationError::Overflow);
        check_err("-9223372036854775807 - 2", EvaluationError::Overflow);
    }

    #[test]
    fn test_critical_and_fumble() {
        let crit = eval("1d20", &[20]).unwrap();
        assert!(crit.is_critical());
        assert!(!crit.is_fail());
        assert_eq!(crit.outcome(), Outcome::Critical);

        let fail = eval("1d20", &[1]).unwrap();
        assert!(!fail.is_critical());
        assert!(fail.is_fail());
        assert_eq!(fail.outcome(), Outcome::Fail);

        let normal = eval("1d20 + 5", &[12]).unwrap();
        assert_eq!(normal.outcome(), Outcome::Normal);
    }

    #[test]
    fn test_critical_only_for_d20() {
        let max_d6 = eval("1d6", &[6]).unwrap();
        assert!(!max_d6.is_critical());
        let one_d6 = eval("1d6", &[1]).unwrap();
        assert!(!one_d6.is_fail());
        assert!(eval("1d(4*5)", &[20]).unwrap().is_critical());
    }

    #[test]
    fn test_critical_ignores_dropped_dice() {
        let adv = eval("2d20kh1", &[20, 1]).unwrap();
        assert!(adv.is_critical());
        assert!(!adv.is_fail());

        let dis = eval("2d20kl1", &[20, 1]).unwrap();
        assert!(!dis.is_critical());
        assert!(dis.is_fail());
    }

    #[test]
    fn test_critical_outranks_fail() {
        let both = eval("1d20 + 1d20", &[20, 1]).unwrap();
        assert!(both.is_critical());
        assert!(both.is_fail());
        assert_eq!(both.outcome(), Outcome::Critical);
    }
}
