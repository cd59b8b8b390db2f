//! Assembling LMC assembly source into machine code.
//!
//! This module covers the two-pass [`Assembler`]:
//! - the first pass parses each line, binds labels to addresses,
//!   and emits an opcode with an unresolved operand token,
//! - the second pass resolves each operand through the [`LabelTable`]
//!   and produces the final machine words.
//!
//! Diagnostics accumulate in a [`MessageQueue`] rather than stopping at
//! the first problem, so one assembly run reports everything it can.
//! Machine code is produced only when no errors occurred.
//!
//! ```
//! use lmc_suite::asm::Assembler;
//!
//! let src = ["INP", "STA FIRST", "INP", "ADD FIRST", "OUT", "HLT", "FIRST DAT"];
//!
//! let mut asm = Assembler::new();
//! assert!(asm.assemble(&src));
//! assert_eq!(asm.code(), &[901, 306, 901, 106, 902, 0, 0]);
//! ```

use std::collections::HashMap;

use crate::ast::Mnemonic;
use crate::err::{count, Abort, MessageQueue};
use crate::parse::{parse_line, strip_comment, Stmt};

/// The number of memory words available to a program.
pub const MEMORY_SIZE: usize = 100;

/// The default error threshold for a new [`Assembler`].
pub const MAX_ERRORS: usize = 10;

/// A label definition and its usage count.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct LabelEntry {
    /// The address the label stands for.
    pub value: u32,
    /// The 1-based source line where the label was defined.
    pub line: usize,
    /// The number of times the label has resolved an operand.
    pub references: u32,
}

/// The table of labels defined by a program.
///
/// Operand resolution goes through [`LabelTable::get`], which also accepts
/// numeric literals: an operand that is not a known label is parsed as an
/// address instead. This is what lets `ADD TOTAL` and `ADD 53` go through
/// the same path.
#[derive(Debug, Default, Clone)]
pub struct LabelTable {
    table: HashMap<String, LabelEntry>,
}

impl LabelTable {
    /// Defines a label, overwriting any previous definition.
    pub fn set(&mut self, name: impl Into<String>, value: u32, line: usize) {
        self.table.insert(name.into(), LabelEntry { value, line, references: 0 });
    }

    /// Resolves an operand token to an address.
    ///
    /// The empty token resolves to 0 without counting as a reference.
    /// A known label resolves to its address and increments its reference
    /// count. Anything else must parse as a nonnegative integer literal.
    pub fn get(&mut self, name: &str) -> Result<u32, std::num::ParseIntError> {
        if name.is_empty() {
            return Ok(0);
        }
        if let Some(entry) = self.table.get_mut(name) {
            entry.references += 1;
            return Ok(entry.value);
        }
        name.parse()
    }

    /// The labels that were defined but never used to resolve an operand,
    /// ordered by defining line.
    pub fn unused(&self) -> Vec<&LabelEntry> {
        let mut out: Vec<_> = self.table.values()
            .filter(|e| e.references == 0)
            .collect();
        out.sort_by_key(|e| e.line);
        out
    }
}

/// An emitted instruction awaiting operand resolution.
#[derive(Debug)]
struct Draft {
    /// Machine code for the mnemonic, without the address digits.
    base: u32,
    /// The operand token, possibly empty.
    operand: String,
    line: usize,
    source: String,
}

/// A two-pass assembler for LMC assembly source.
///
/// One `Assembler` can be reused across programs; each [`assemble`] call
/// starts from a clean slate except for the error threshold.
///
/// [`assemble`]: Assembler::assemble
#[derive(Debug)]
pub struct Assembler {
    labels: LabelTable,
    code: Vec<u32>,
    has_halt: bool,
    messages: MessageQueue,
    max_errors: usize,
}

impl Assembler {
    /// Creates an assembler with the default error threshold.
    pub fn new() -> Self {
        Self::with_max_errors(MAX_ERRORS)
    }

    /// Creates an assembler which aborts after `max_errors` errors.
    pub fn with_max_errors(max_errors: usize) -> Self {
        Self {
            labels: LabelTable::default(),
            code: Vec::new(),
            has_halt: false,
            messages: MessageQueue::new(max_errors),
            max_errors,
        }
    }

    /// Assembles a program, one source line per element.
    ///
    /// Returns true if no errors occurred, in which case [`code`] holds one
    /// machine word per emitted instruction. On an aborted run the partial
    /// code is discarded. Diagnostics are available from [`messages`]
    /// either way.
    ///
    /// [`code`]: Assembler::code
    /// [`messages`]: Assembler::messages
    pub fn assemble<S: AsRef<str>>(&mut self, program: &[S]) -> bool {
        self.labels = LabelTable::default();
        self.code.clear();
        self.has_halt = false;
        self.messages = MessageQueue::new(self.max_errors);

        match self.passes(program) {
            Ok(()) => {
                for entry in self.labels.unused() {
                    let line = entry.line;
                    self.messages.warn("Unused label", Some(line), program[line - 1].as_ref());
                }
                if !self.has_halt {
                    self.messages.warn("No HLT instruction in input", None, "");
                }
            }
            Err(Abort) => self.code.clear(),
        }

        !self.messages.has_error()
    }

    fn passes<S: AsRef<str>>(&mut self, program: &[S]) -> Result<(), Abort> {
        let drafts = self.first_pass(program)?;
        self.second_pass(drafts)
    }

    /// Parses each line, defines labels, and emits unresolved instructions.
    fn first_pass<S: AsRef<str>>(&mut self, program: &[S]) -> Result<Vec<Draft>, Abort> {
        let mut drafts = Vec::new();

        for (i, raw) in program.iter().enumerate() {
            let line = i + 1;
            let source = strip_comment(raw.as_ref());

            let stmt = match parse_line(source) {
                None => continue,
                Some(Err(e)) => {
                    self.messages.error(e.to_string(), Some(line), source)?;
                    continue;
                }
                Some(Ok(stmt)) => stmt,
            };

            if stmt.mnemonic == Mnemonic::Hlt {
                self.has_halt = true;
            }
            // A label stands for the address of the instruction it precedes.
            if let Some(label) = &stmt.label {
                self.labels.set(label.clone(), drafts.len() as u32, line);
            }

            let operand = self.check_arity(&stmt, line, source)?;
            drafts.push(Draft {
                base: stmt.mnemonic.code(),
                operand,
                line,
                source: source.to_string(),
            });

            // Emitted instructions are what must fit in memory, not
            // source lines.
            if drafts.len() > MEMORY_SIZE {
                self.messages.error("Program too long", Some(line), source)?;
                return Err(Abort);
            }
        }

        Ok(drafts)
    }

    /// Validates the operand count and extracts the operand token.
    ///
    /// On a mismatch the instruction is still emitted, with an empty operand.
    fn check_arity(&mut self, stmt: &Stmt, line: usize, source: &str) -> Result<String, Abort> {
        let (required, optional) = stmt.mnemonic.arity();
        let given = stmt.args.len();
        if given < required || given > required + optional {
            let text = format!(
                "{} requires {}, {} given",
                stmt.mnemonic,
                count(required, "argument"),
                given,
            );
            self.messages.error(text, Some(line), source)?;
            return Ok(String::new());
        }
        Ok(stmt.args.first().map(|a| a.to_string()).unwrap_or_default())
    }

    /// Resolves operands and produces the final machine words.
    fn second_pass(&mut self, drafts: Vec<Draft>) -> Result<(), Abort> {
        for draft in drafts {
            let address = match self.labels.get(&draft.operand) {
                Ok(value) => value,
                Err(_) => {
                    self.messages.error("Undefined label", Some(draft.line), &draft.source)?;
                    0
                }
            };
            self.code.push(draft.base + address);
        }
        Ok(())
    }

    /// The machine code produced by the last [`assemble`] call.
    ///
    /// Empty if assembly failed with an abort.
    ///
    /// [`assemble`]: Assembler::assemble
    pub fn code(&self) -> &[u32] {
        &self.code
    }

    /// The diagnostics recorded by the last [`assemble`] call.
    ///
    /// [`assemble`]: Assembler::assemble
    pub fn messages(&self) -> &MessageQueue {
        &self.messages
    }

    /// Writes the machine code as one zero-padded decimal word per line.
    pub fn write_program(&self, mut w: impl std::io::Write) -> std::io::Result<()> {
        for word in &self.code {
            writeln!(w, "{word:03}")?;
        }
        Ok(())
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}
