use crate::common::*;
use crate::roll::Evaluation;

/// Index of a [Node] inside the arena of an [ExpressionTree].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A compiled dice expression.
///
/// Nodes live in a flat arena and refer to their children by [NodeId]; each child has
/// exactly one parent. The tree also remembers the last successful
/// [evaluate](ExpressionTree::evaluate) so that the verbose result and the
/// critical/fail predicates can be read back afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionTree {
    pub(crate) source: String,
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) last: Option<Evaluation>,
}

impl ExpressionTree {
    pub(crate) fn new(source: &str, nodes: Vec<Node>, root: NodeId) -> Self {
        Self {
            source: source.to_owned(),
            nodes,
            root,
            last: None,
        }
    }

    /// The exact string this tree was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether any node of the tree rolls dice.
    pub fn has_dice(&self) -> bool {
        self.nodes.iter().any(|n| matches!(n, Node::Dice(_)))
    }

    /// Whether the subtree under `id` rolls any dice.
    pub fn rolls_dice(&self, id: NodeId) -> bool {
        match self.node(id) {
            Node::Dice(_) => true,
            node => node.children().any(|child| self.rolls_dice(child)),
        }
    }

    /// Follows a chain of modifiers down to the dice roll they select from.
    pub(crate) fn dice_target(&self, mut id: NodeId) -> Option<NodeId> {
        loop {
            match self.node(id) {
                Node::Dice(_) => return Some(id),
                Node::Modifier(m) => id = m.operand,
                _ => return None,
            }
        }
    }
}

/// Computes a node's value, recording dice along the way.
#[enum_dispatch::enum_dispatch]
pub(crate) trait Evaluate {
    fn evaluate<R: crate::roll::Roller>(
        &self,
        id: NodeId,
        ev: &mut crate::roll::tree::Evaluator<'_, '_, R>,
    ) -> Result<Int, crate::roll::EvaluationError>;
}

/// Writes a node's part of the verbose breakdown.
#[enum_dispatch::enum_dispatch]
pub(crate) trait Render {
    fn render(
        &self,
        id: NodeId,
        b: &crate::roll::stringify::Breakdown<'_>,
        out: &mut String,
    );
}

#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch::enum_dispatch(Evaluate, Render)]
pub enum Node {
    Literal(Literal),
    Dice(DiceRoll),
    Group(Group),
    Unary(Unary),
    Binary(Binary),
    Modifier(Modifier),
}

impl Node {
    /// Direct children, in source order.
    pub fn children(&self) -> impl Iterator<Item = NodeId> {
        let (first, second) = match self {
            Node::Literal(_) => (None, None),
            Node::Dice(d) => (d.count, Some(d.sides)),
            Node::Group(g) => (Some(g.inner), None),
            Node::Unary(u) => (Some(u.value), None),
            Node::Binary(b) => (Some(b.left), Some(b.right)),
            Node::Modifier(m) => (Some(m.operand), None),
        };
        first.into_iter().chain(second)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Literal {
    pub value: Int,
}

/// `count d sides`; a missing count means a single die.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DiceRoll {
    pub count: Option<NodeId>,
    pub sides: NodeId,
}

/// A parenthesized sub-expression.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Group {
    pub inner: NodeId,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Unary {
    pub op: UnaryOperator,
    pub value: NodeId,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Binary {
    pub left: NodeId,
    pub op: BinaryOperator,
    pub right: NodeId,
}

/// Keep or drop `count` dice of the roll (or modified roll) in `operand`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub operand: NodeId,
    pub count: usize,
}
