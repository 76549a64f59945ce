use super::tree::{DiceRecord, Evaluation};
use crate::parse::ast::{self, ExpressionTree, NodeId, Render};

/// Renders `tree` as `"<expr> = <value>"`, or `"<expr> = <breakdown> = <value>"` when
/// dice were rolled. Dropped dice are parenthesized in the breakdown.
pub(crate) fn verbose(tree: &ExpressionTree, evaluation: &Evaluation) -> String {
    let expr = tree.source().trim();
    if !tree.has_dice() {
        return format!("{} = {}", expr, evaluation.total());
    }

    let mut breakdown = String::new();
    Breakdown { tree, evaluation }.node(tree.root(), &mut breakdown);
    format!("{} = {} = {}", expr, breakdown, evaluation.total())
}

pub(crate) struct Breakdown<'a> {
    tree: &'a ExpressionTree,
    evaluation: &'a Evaluation,
}

impl Breakdown<'_> {
    pub(crate) fn node(&self, id: NodeId, out: &mut String) {
        self.tree.node(id).render(id, self, out)
    }

    fn dice(&self, record: &DiceRecord, out: &mut String) {
        out.push('[');
        for (i, face) in record.faces().iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if face.kept {
                out.push_str(&face.value.to_string());
            } else {
                out.push('(');
                out.push_str(&face.value.to_string());
                out.push(')');
            }
        }
        out.push(']');
    }
}

impl Render for ast::Literal {
    fn render(&self, _: NodeId, _: &Breakdown<'_>, out: &mut String) {
        out.push_str(&self.value.to_string());
    }
}

impl Render for ast::DiceRoll {
    fn render(&self, id: NodeId, b: &Breakdown<'_>, out: &mut String) {
        // dice rolled for the count or sides would otherwise vanish from the trace
        let mut operands = self.count.into_iter().chain([self.sides]);
        if operands.any(|n| b.tree.rolls_dice(n)) {
            if let Some(count) = self.count {
                b.node(count, out);
            }
            out.push('d');
            b.node(self.sides, out);
        }
        if let Some(record) = &b.evaluation.result(id).dice {
            b.dice(record, out);
        }
    }
}

impl Render for ast::Group {
    fn render(&self, _: NodeId, b: &Breakdown<'_>, out: &mut String) {
        out.push('(');
        b.node(self.inner, out);
        out.push(')');
    }
}

impl Render for ast::Unary {
    fn render(&self, _: NodeId, b: &Breakdown<'_>, out: &mut String) {
        out.push_str(&self.op.to_string());
        b.node(self.value, out);
    }
}

impl Render for ast::Binary {
    fn render(&self, _: NodeId, b: &Breakdown<'_>, out: &mut String) {
        b.node(self.left, out);
        out.push(' ');
        out.push_str(&self.op.to_string());
        out.push(' ');
        b.node(self.right, out);
    }
}

impl Render for ast::Modifier {
    fn render(&self, _: NodeId, b: &Breakdown<'_>, out: &mut String) {
        b.node(self.operand, out);
    }
}
