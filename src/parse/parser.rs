use super::{ast::*, error::*, lexer::*};
use crate::common::*;
use crate::roll::Limits;

type PResult<T = NodeId> = Result<T, SyntaxError>;

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    nodes: Vec<Node>,
    /// Height of the subtree under each node, parallel to `nodes`.
    heights: Vec<usize>,
    depth: usize,
    max_depth: Option<usize>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::from_tokens(source, tokenize(source))
    }

    /// `tokens` must come from [tokenize] on `source`.
    pub(crate) fn from_tokens(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            nodes: Vec::new(),
            heights: Vec::new(),
            depth: 0,
            max_depth: Limits::default().max_depth,
        }
    }

    /// Rejects expressions nested deeper than `limits.max_depth`.
    pub fn with_limits(mut self, limits: &Limits) -> Self {
        self.max_depth = limits.max_depth;
        self
    }

    pub fn parse(mut self) -> PResult<ExpressionTree> {
        let root = self.parse_additive()?;
        if !self.matches(TokenKind::EndOfInput) {
            let mut expected = vec1!["an operator"];
            if matches!(self.nodes[root.0], Node::Literal(_) | Node::Group(_)) {
                expected.push("'d'");
            }
            expected.push("end of expression");
            return self.unexpected_token(expected);
        }
        Ok(ExpressionTree::new(self.source, self.nodes, root))
    }

    fn peek(&self) -> &Token {
        // `tokenize` always ends the stream with `EndOfInput`, which is never consumed
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::EndOfInput {
            self.pos += 1;
        }
        token
    }

    fn matches(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn push(&mut self, node: impl Into<Node>) -> PResult {
        let node = node.into();
        let height = 1 + node.children().map(|c| self.heights[c.0]).max().unwrap_or(0);
        if let Some(max) = self.max_depth.filter(|&max| height > max) {
            // every node consumes at least one token
            let offset = self.tokens[self.pos.saturating_sub(1)].offset();
            return self.error(SyntaxErrorKind::TooDeep(max), offset);
        }
        self.nodes.push(node);
        self.heights.push(height);
        Ok(NodeId(self.nodes.len() - 1))
    }

    /// Guards recursion into a unary operand or a parenthesized group.
    fn enter(&mut self) -> PResult<()> {
        self.depth += 1;
        match self.max_depth {
            Some(max) if self.depth > max => {
                self.error(SyntaxErrorKind::TooDeep(max), self.peek().offset())
            }
            _ => Ok(()),
        }
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn error<T>(&self, kind: SyntaxErrorKind, offset: usize) -> PResult<T> {
        Err(SyntaxError::new(kind, self.source, offset))
    }

    /// Reports the next token, which is not one of `expected`.
    fn unexpected_token<T>(&self, expected: NonEmpty<&'static str>) -> PResult<T> {
        let token = self.peek();
        let slice = &self.source[token.span.clone()];
        let kind = match token.kind {
            TokenKind::EndOfInput => SyntaxErrorKind::UnexpectedEnd,
            TokenKind::Error => match slice.chars().next() {
                Some(c) if c.is_ascii_digit() => SyntaxErrorKind::IntegerTooLarge(slice.to_owned()),
                Some(c) => SyntaxErrorKind::InvalidCharacter(c),
                None => SyntaxErrorKind::UnexpectedEnd,
            },
            _ => SyntaxErrorKind::UnexpectedToken {
                found: format!("'{}'", slice),
                expected,
            },
        };
        self.error(kind, token.offset())
    }

    fn consume(&mut self, expected: TokenKind) -> PResult<Token> {
        if self.matches(expected) {
            Ok(self.advance())
        } else {
            self.unexpected_token(vec1![expected.as_str()])
        }
    }

    fn parse_additive(&mut self) -> PResult {
        let mut lhs = self.parse_multiplicative()?;

        while let Some(op) = self.peek().kind.as_additive_op() {
            self.advance();
            let rhs = self.parse_multiplicative()?;

            lhs = self.push(Binary {
                left: lhs,
                op,
                right: rhs,
            })?;
        }

        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> PResult {
        let mut lhs = self.parse_unary()?;

        while let Some(op) = self.peek().kind.as_multiplicative_op() {
            self.advance();
            let rhs = self.parse_unary()?;

            lhs = self.push(Binary {
                left: lhs,
                op,
                right: rhs,
            })?;
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult {
        if let Some(op) = self.peek().kind.as_unary_op() {
            self.enter()?;
            self.advance();
            let value = self.parse_unary()?;
            self.leave();

            self.push(Unary { op, value })
        } else {
            self.parse_dice()
        }
    }

    fn parse_dice(&mut self) -> PResult {
        let count = if self.matches(TokenKind::Dice) {
            None
        } else {
            let count = self.parse_primary()?;
            if !self.matches(TokenKind::Dice) {
                if self.peek().kind.as_modifier().is_some() {
                    return self.error(SyntaxErrorKind::ModifierWithoutDice, self.peek().offset());
                }
                return Ok(count);
            }
            self.reject_zero_literal(count, SyntaxErrorKind::ZeroDice)?;
            Some(count)
        };

        self.consume(TokenKind::Dice)?;
        let sides = self.parse_primary()?;
        self.reject_zero_literal(sides, SyntaxErrorKind::ZeroSides)?;

        let mut roll = self.push(DiceRoll { count, sides })?;
        while let Some(kind) = self.peek().kind.as_modifier() {
            self.advance();
            let count = self.parse_selector_count()?;
            roll = self.push(Modifier {
                kind,
                operand: roll,
                count,
            })?;
        }
        Ok(roll)
    }

    fn parse_selector_count(&mut self) -> PResult<usize> {
        match self.peek().kind {
            TokenKind::Integer(n) => {
                let token = self.advance();
                usize::try_from(n).or_else(|_| {
                    self.error(
                        SyntaxErrorKind::IntegerTooLarge(n.to_string()),
                        token.offset(),
                    )
                })
            }
            _ => self.unexpected_token(vec1![TokenKind::Integer(0).as_str()]),
        }
    }

    fn parse_primary(&mut self) -> PResult {
        match self.peek().kind {
            TokenKind::Integer(value) => {
                self.advance();
                self.push(Literal { value })
            }
            TokenKind::LeftParen => {
                self.enter()?;
                self.advance();
                let inner = self.parse_additive()?;
                self.consume(TokenKind::RightParen)?;
                self.leave();
                self.push(Group { inner })
            }
            _ => self.unexpected_token(vec1![TokenKind::Integer(0).as_str(), TokenKind::LeftParen.as_str()]),
        }
    }

    /// A literal zero count or side count is rejected where it was written; computed
    /// ones are checked when rolled.
    fn reject_zero_literal(&self, id: NodeId, kind: SyntaxErrorKind) -> PResult<()> {
        if self.nodes[id.0] == Node::Literal(Literal { value: 0 }) {
            // the literal is the token just consumed
            let offset = self.tokens[self.pos - 1].offset();
            self.error(kind, offset)
        } else {
            Ok(())
        }
    }
}
