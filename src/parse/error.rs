use crate::common::NonEmpty;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    #[error("Unexpected end of expression.")]
    UnexpectedEnd,
    #[error("Unexpected {found}; expected {}.", .expected.fmt_expected())]
    UnexpectedToken {
        found: String,
        expected: NonEmpty<&'static str>,
    },
    #[error("Unrecognized character {0:?}.")]
    InvalidCharacter(char),
    #[error("Integer {0} is too large.")]
    IntegerTooLarge(String),
    #[error("Cannot roll zero dice.")]
    ZeroDice,
    #[error("Dice must have at least one side.")]
    ZeroSides,
    #[error("Keep and drop modifiers can only follow a dice roll.")]
    ModifierWithoutDice,
    #[error("Expression is nested more than {0} levels deep.")]
    TooDeep(usize),
}

/// Input that does not form a complete dice expression.
///
/// Displays as the message, the source indented by four spaces, and a caret under the
/// offending character:
///
/// ```text
/// Unexpected end of expression.
///     14d
///        ^
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    kind: SyntaxErrorKind,
    expression: String,
    offset: usize,
}

impl SyntaxError {
    const INDENT: usize = 4;

    pub(crate) fn new(kind: SyntaxErrorKind, expression: &str, offset: usize) -> Self {
        Self {
            kind,
            expression: expression.to_owned(),
            offset,
        }
    }

    pub fn kind(&self) -> &SyntaxErrorKind {
        &self.kind
    }

    /// The source string that failed to compile.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Byte offset of the failure in [expression](Self::expression).
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Character column of the failure, for placing the caret.
    pub fn column(&self) -> usize {
        self.expression
            .get(..self.offset)
            .map_or(self.offset, |s| s.chars().count())
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;
        writeln!(f, "{:indent$}{}", "", self.expression, indent = Self::INDENT)?;
        write!(f, "{:>width$}", "^", width = Self::INDENT + self.column() + 1)
    }
}

impl std::error::Error for SyntaxError {}

trait FormatExpected {
    fn fmt_expected(&self) -> String;
}

impl FormatExpected for [&str] {
    fn fmt_expected(&self) -> String {
        match self {
            [] => unreachable!("NonEmpty cannot be empty"),
            [a] => (*a).to_owned(),
            [a, b] => format!("{} or {}", a, b),
            s => format!("{}, or {}", s[..s.len() - 1].join(", "), &s[s.len() - 1]),
        }
    }
}
