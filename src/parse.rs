//! Parsing LMC assembly source.
//!
//! Each line of source holds at most one statement: an optional label,
//! a mnemonic, and the operands that follow it. [`parse_line`] classifies
//! one line; the assembler drives it over a whole program and turns any
//! [`ParseErr`] into a diagnostic.

pub mod lex;

use crate::ast::Mnemonic;
use lex::{tokenize, Ident};

/// A parsed statement: one line of assembly.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Stmt {
    /// The label defined on this line, if any.
    pub label: Option<String>,
    /// The instruction mnemonic.
    pub mnemonic: Mnemonic,
    /// The operands following the mnemonic.
    ///
    /// Arity is not checked here. The assembler validates the count
    /// against the mnemonic and reports a diagnostic on mismatch.
    pub args: Vec<Ident>,
}

/// Any error that can occur while parsing a line.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParseErr {
    /// Neither the first nor the second word of the line is a mnemonic.
    UnknownMnemonic,
    /// The first operand is spelled like a mnemonic,
    /// which almost certainly indicates a misplaced label.
    OperandIsMnemonic,
}
impl std::fmt::Display for ParseErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErr::UnknownMnemonic => f.write_str("Unknown mnemonic"),
            ParseErr::OperandIsMnemonic => f.write_str("Label matches a mnemonic"),
        }
    }
}
impl std::error::Error for ParseErr {}

/// Strips the comment (everything from `;` on) from a line.
pub(crate) fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(i) => &line[..i],
        None => line,
    }
}

/// Parses one line of source.
///
/// Returns `None` if the line is blank or holds only a comment.
/// A mnemonic in the first position means the line has no label;
/// otherwise the first word is the label and the second must be
/// the mnemonic.
///
/// ## Example
/// ```
/// use lmc_suite::ast::Mnemonic;
/// use lmc_suite::parse::parse_line;
///
/// let stmt = parse_line("LOOP ADD ONE ; increment").unwrap().unwrap();
/// assert_eq!(stmt.label.as_deref(), Some("LOOP"));
/// assert_eq!(stmt.mnemonic, Mnemonic::Add);
/// ```
pub fn parse_line(line: &str) -> Option<Result<Stmt, ParseErr>> {
    let mut tokens = tokenize(line);
    if tokens.is_empty() {
        return None;
    }

    let (label, mnemonic, args) = match tokens.first() {
        Some(&Ident::Mnemonic(m)) => (None, m, tokens.split_off(1)),
        _ => match tokens.get(1) {
            Some(&Ident::Mnemonic(m)) => {
                let args = tokens.split_off(2);
                let Some(Ident::Label(label)) = tokens.into_iter().next() else {
                    unreachable!("first token is not a mnemonic");
                };
                (Some(label), m, args)
            }
            _ => return Some(Err(ParseErr::UnknownMnemonic)),
        },
    };

    // An operand spelled like a mnemonic means the label and mnemonic
    // are probably swapped. Discard the whole line.
    if matches!(args.first(), Some(Ident::Mnemonic(_))) {
        return Some(Err(ParseErr::OperandIsMnemonic));
    }

    Some(Ok(Stmt { label, mnemonic, args }))
}

#[cfg(test)]
mod tests {
    use super::{parse_line, strip_comment, ParseErr, Stmt};
    use crate::ast::Mnemonic;
    use crate::parse::lex::Ident;

    fn label(s: &str) -> Ident {
        Ident::Label(s.to_string())
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("ADD 53 ; comment"), "ADD 53 ");
        assert_eq!(strip_comment("; all comment"), "");
        assert_eq!(strip_comment("no comment"), "no comment");
    }

    #[test]
    fn test_unlabeled() {
        assert_eq!(
            parse_line("ADD 53"),
            Some(Ok(Stmt {
                label: None,
                mnemonic: Mnemonic::Add,
                args: vec![label("53")],
            }))
        );
    }

    #[test]
    fn test_labeled() {
        assert_eq!(
            parse_line("LOOP BRA LOOP"),
            Some(Ok(Stmt {
                label: Some("LOOP".to_string()),
                mnemonic: Mnemonic::Bra,
                args: vec![label("LOOP")],
            }))
        );
    }

    #[test]
    fn test_blank_lines() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("; just a comment"), None);
    }

    #[test]
    fn test_unknown_mnemonic() {
        assert_eq!(parse_line("LAD 53"), Some(Err(ParseErr::UnknownMnemonic)));
        // Lowercase is not a mnemonic.
        assert_eq!(parse_line("add 53"), Some(Err(ParseErr::UnknownMnemonic)));
        // A lone label with no mnemonic is also unknown.
        assert_eq!(parse_line("LOOP"), Some(Err(ParseErr::UnknownMnemonic)));
    }

    #[test]
    fn test_operand_is_mnemonic() {
        // Label and mnemonic in the wrong order.
        assert_eq!(parse_line("ADD SUB"), Some(Err(ParseErr::OperandIsMnemonic)));
        assert_eq!(parse_line("X ADD SUB"), Some(Err(ParseErr::OperandIsMnemonic)));
        assert_eq!(parse_line("HLT ADD"), Some(Err(ParseErr::OperandIsMnemonic)));
        // Only the first operand is checked.
        assert!(parse_line("ADD X ADD").unwrap().is_ok());
    }

    #[test]
    fn test_extra_args_kept() {
        // Arity problems are the assembler's to report.
        let stmt = parse_line("ADD 1 2 3").unwrap().unwrap();
        assert_eq!(stmt.args, vec![label("1"), label("2"), label("3")]);
    }
}
