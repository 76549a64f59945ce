use crate::common::*;
use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Splits `source` into tokens, always ending with [`TokenKind::EndOfInput`].
///
/// Characters that start no token come out as [`TokenKind::Error`]; reporting them is
/// left to the parser.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = TokenKind::lexer(source)
        .spanned()
        .map(|(kind, span)| Token { kind, span })
        .collect();

    let end = tokens.last().map_or(0, |t| t.span.end);
    tokens.push(Token {
        kind: TokenKind::EndOfInput,
        span: end..end,
    });
    tokens
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    pub fn offset(&self) -> usize {
        self.span.start
    }
}

#[derive(Logos, Debug, Copy, Clone, PartialEq)]
pub enum TokenKind {
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<Int>().ok())]
    Integer(Int),

    #[regex(r"[dD]")]
    Dice,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    #[regex(r"[kK][hH]?")]
    KeepHighest,
    #[regex(r"[kK][lL]")]
    KeepLowest,
    #[regex(r"[dD][hH]")]
    DropHighest,
    #[regex(r"[dD][lL]")]
    DropLowest,

    EndOfInput,

    #[regex(r"[ \t\r\n]+", logos::skip)]
    #[error]
    Error,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Integer(_) => "an integer",
            Dice => "'d'",
            LeftParen => "'('",
            RightParen => "')'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            KeepHighest => "'kh'",
            KeepLowest => "'kl'",
            DropHighest => "'dh'",
            DropLowest => "'dl'",
            EndOfInput => "end of expression",
            Error => "<error>",
        }
    }

    pub fn as_unary_op(&self) -> Option<UnaryOperator> {
        use UnaryOperator::*;
        Some(match self {
            Self::Plus => Pos,
            Self::Minus => Neg,
            _ => return None,
        })
    }

    pub fn as_additive_op(&self) -> Option<BinaryOperator> {
        use BinaryOperator::*;
        Some(match self {
            Self::Plus => Add,
            Self::Minus => Sub,
            _ => return None,
        })
    }

    pub fn as_multiplicative_op(&self) -> Option<BinaryOperator> {
        use BinaryOperator::*;
        Some(match self {
            Self::Star => Mul,
            Self::Slash => Div,
            Self::Percent => Rem,
            _ => return None,
        })
    }

    pub fn as_modifier(&self) -> Option<ModifierKind> {
        use ModifierKind::*;
        Some(match self {
            Self::KeepHighest => KeepHighest,
            Self::KeepLowest => KeepLowest,
            Self::DropHighest => DropHighest,
            Self::DropLowest => DropLowest,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn kinds(s: &str) -> Vec<TokenKind> {
        tokenize(s).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lex_dice() {
        assert_eq!(kinds("2d6+3"), vec![Integer(2), Dice, Integer(6), Plus, Integer(3), EndOfInput]);
        assert_eq!(kinds("1D20"), vec![Integer(1), Dice, Integer(20), EndOfInput]);
        assert_eq!(kinds("d%"), vec![Dice, Percent, EndOfInput]);
    }

    #[test]
    fn test_lex_modifiers() {
        assert_eq!(
            kinds("4d6kh3"),
            vec![Integer(4), Dice, Integer(6), KeepHighest, Integer(3), EndOfInput]
        );
        assert_eq!(kinds("4d6k3")[3], KeepHighest);
        assert_eq!(kinds("2d20KL1")[3], KeepLowest);
        assert_eq!(kinds("4d6dl1")[3], DropLowest);
        assert_eq!(kinds("4d6dh1")[3], DropHighest);
    }

    #[test]
    fn test_lex_offsets() {
        let tokens = tokenize(" 12 *  (3)");
        let offsets: Vec<_> = tokens.iter().map(Token::offset).collect();
        assert_eq!(offsets, vec![1, 4, 7, 8, 9, 10]);
    }

    #[test]
    fn test_end_of_input_follows_last_token() {
        let tokens = tokenize("14d   ");
        assert_eq!(tokens.last().unwrap().span, 3..3);
        assert_eq!(tokenize("").last().unwrap().span, 0..0);
    }

    #[test]
    fn test_lex_invalid_characters() {
        assert_eq!(kinds("1 $ 2"), vec![Integer(1), Error, Integer(2), EndOfInput]);
        assert_eq!(kinds("99999999999999999999"), vec![Error, EndOfInput]);
    }
}
