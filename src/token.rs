//! Tokens and a tokenizer for program source lines.

use logos::Logos;

use std::fmt;
use std::ops::Range;

use crate::instruction::Kind;

/// Enumeration of all tokens of a source line.
///
/// Tokens are whitespace delimited. Keywords get their own variants, everything else is a
/// [Word](Token::Word) and is interpreted by the parser depending on its position.
#[derive(Logos, Debug, PartialEq, Clone, Copy)]
pub enum Token {
    /// Errorneous token that could not be interpreted as any of the other variants.
    #[error]
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    Error,

    #[token("int")]
    Int,

    #[token("set")]
    Set,

    #[token("begin")]
    Begin,

    #[token("end")]
    End,

    #[token("add")]
    Add,

    #[token("sub")]
    Sub,

    #[token("mult")]
    Mult,

    #[token("div")]
    Div,

    #[token("print")]
    Print,

    #[token("goto")]
    Goto,

    #[token("if")]
    If,

    /// Any other run of non-whitespace characters: line numbers, names, literals and the
    /// free-form text operand of `print`.
    #[regex(r"[^ \t\r\n\f]+")]
    Word,
}

impl Token {
    /// Returns the instruction kind this token names, if it is a keyword.
    pub fn keyword(&self) -> Option<Kind> {
        let kind = match self {
            Token::Int => Kind::Declare,
            Token::Set => Kind::Assign,
            Token::Begin => Kind::Begin,
            Token::End => Kind::End,
            Token::Add => Kind::Add,
            Token::Sub => Kind::Sub,
            Token::Mult => Kind::Mult,
            Token::Div => Kind::Div,
            Token::Print => Kind::Print,
            Token::Goto => Kind::Goto,
            Token::If => Kind::If,
            Token::Word | Token::Error => return None,
        };

        Some(kind)
    }
}

/// A token together with the source text it was lexed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme<'a> {
    pub token: Token,
    pub text: &'a str,
    pub span: Range<usize>,
}

impl<'a> fmt::Display for Lexeme<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Splits a single source line into lexemes.
pub fn tokenize(line: &str) -> Vec<Lexeme> {
    Token::lexer(line)
        .spanned()
        .map(|(token, span)| Lexeme {
            token,
            text: &line[span.clone()],
            span,
        })
        .collect()
}

#[test]
fn test_tokenize_keywords_and_words() {
    let tokens: Vec<_> = tokenize("12 print  x y hello\r\n")
        .into_iter()
        .map(|l| (l.token, l.text))
        .collect();

    assert_eq!(tokens, vec![
        (Token::Word, "12"),
        (Token::Print, "print"),
        (Token::Word, "x"),
        (Token::Word, "y"),
        (Token::Word, "hello"),
    ]);
}

#[test]
fn test_tokenize_keyword_prefixes_are_words() {
    let tokens: Vec<_> = tokenize("integer ifx End end")
        .into_iter()
        .map(|l| l.token)
        .collect();

    assert_eq!(tokens, vec![Token::Word, Token::Word, Token::Word, Token::End]);
}

#[test]
fn test_tokenize_blank() {
    assert!(tokenize("   \t ").is_empty());
}
