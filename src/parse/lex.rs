//! Tokenizing LMC assembly source.
//!
//! Source is line-oriented, so the lexer works one line at a time.
//! A line holds a handful of whitespace-separated words and possibly a
//! comment; each word is either a known [`Mnemonic`] or a free-form label.
//! Resolution of label operands against numeric literals happens later,
//! in the assembler's second pass, so the lexer accepts any non-space run.

use logos::Logos;

use crate::ast::Mnemonic;

/// A token in LMC assembly source.
#[derive(Debug, Logos, PartialEq, Eq, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    /// A word: a mnemonic or a label.
    #[regex(r"[^\s;]+", |lx| Ident::from(lx.slice()))]
    Ident(Ident),

    /// A comment, running from `;` to the end of the line.
    #[regex(r";[^\n]*")]
    Comment,
}

/// A word in source, classified by spelling.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum Ident {
    /// A recognized mnemonic.
    Mnemonic(Mnemonic),
    /// Anything else: a label, or a numeric literal used as an operand.
    Label(String),
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        match Mnemonic::from_name(s) {
            Some(m) => Ident::Mnemonic(m),
            None => Ident::Label(s.to_string()),
        }
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ident::Mnemonic(m) => m.fmt(f),
            Ident::Label(s) => s.fmt(f),
        }
    }
}

/// Splits one source line into its words, dropping the comment.
pub(crate) fn tokenize(line: &str) -> Vec<Ident> {
    Token::lexer(line)
        .filter_map(|t| match t {
            Ok(Token::Ident(id)) => Some(id),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{tokenize, Ident};
    use crate::ast::Mnemonic;

    fn label(s: &str) -> Ident {
        Ident::Label(s.to_string())
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(tokenize("ADD 53"), vec![Ident::Mnemonic(Mnemonic::Add), label("53")]);
        assert_eq!(tokenize("HLT"), vec![Ident::Mnemonic(Mnemonic::Hlt)]);
    }

    #[test]
    fn test_labels() {
        // Mnemonics are case-sensitive, so lowercase spellings are labels.
        assert_eq!(tokenize("add"), vec![label("add")]);
        assert_eq!(
            tokenize("LOOP BRA LOOP"),
            vec![label("LOOP"), Ident::Mnemonic(Mnemonic::Bra), label("LOOP")]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(tokenize("; whole line comment"), vec![]);
        assert_eq!(
            tokenize("INP ; read a value"),
            vec![Ident::Mnemonic(Mnemonic::Inp)]
        );
        // A comment glued to a word still terminates it.
        assert_eq!(tokenize("OUT;x"), vec![Ident::Mnemonic(Mnemonic::Out)]);
    }

    #[test]
    fn test_blank() {
        assert_eq!(tokenize(""), vec![]);
        assert_eq!(tokenize("   \t  "), vec![]);
    }
}
