pub mod ast;
mod error;
mod lexer;
mod parser;

pub use error::{SyntaxError, SyntaxErrorKind};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::Parser;

use crate::roll::Limits;

pub(crate) fn parse(s: &str, limits: &Limits) -> Result<ast::ExpressionTree, SyntaxError> {
    Parser::new(s).with_limits(limits).parse()
}
