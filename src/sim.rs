//! Executing LMC machine code.
//!
//! This module covers the [`Simulator`], which owns the machine's memory
//! and registers and executes machine words one [`step`] at a time.
//!
//! Execution is single-threaded and cooperative. A front end attaches a
//! [`Client`] to observe and steer the machine; when the client pauses
//! execution (or asks for input it cannot supply yet), `step` simply
//! returns `false` and the call stack unwinds to whoever called
//! [`resume`]. Calling `resume` again picks up exactly where execution
//! left off, because every register survives the suspension.
//!
//! ```
//! use lmc_suite::asm::Assembler;
//! use lmc_suite::sim::Simulator;
//!
//! let src = ["INP", "STA FIRST", "INP", "ADD FIRST", "OUT", "HLT", "FIRST DAT"];
//! let mut asm = Assembler::new();
//! assert!(asm.assemble(&src));
//!
//! let mut sim = Simulator::default();
//! sim.load_words(asm.code()).unwrap();
//!
//! // Without a client, INP reads whatever the input register holds.
//! sim.input = 123;
//! sim.run().unwrap();
//! assert_eq!(sim.output, 246);
//! ```
//!
//! [`step`]: Simulator::step
//! [`resume`]: Simulator::resume
//! [`Client`]: client::Client

pub mod client;

use std::path::{Path, PathBuf};

use crate::ast::Instr;
use client::{Client, Reply};

/// The number of digits needed to represent `n` different values in `base`.
fn digits(n: u32, base: u32) -> u32 {
    let mut d = 0;
    let mut range = 1u64;
    while range < u64::from(n) {
        range *= u64::from(base);
        d += 1;
    }
    d
}

/// The numeric shape of a machine: a digit radix and a memory size.
///
/// Word sizing is derived from these rather than hardcoded, so the classic
/// decimal 100-word machine with 3-digit words is just the default
/// configuration, not the only one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineSpec {
    /// The numeric base for register and memory contents.
    pub base: u32,
    /// The number of memory cells.
    pub memory_size: usize,
}

impl Default for MachineSpec {
    fn default() -> Self {
        Self { base: 10, memory_size: 100 }
    }
}

/// Any error that can occur while loading a machine-code program.
#[derive(Debug)]
pub enum LoadErr {
    /// The program file does not exist.
    FileNotFound(PathBuf),
    /// The program file could not be read.
    Io(std::io::Error),
    /// A line of the program file is not an integer.
    BadWord {
        /// The memory address the line would have loaded into.
        addr: usize,
        /// The offending line text.
        text: String,
    },
    /// A word does not fit in the machine's word range.
    OutOfRange {
        /// The memory address the word would have loaded into.
        addr: usize,
        /// The offending word.
        word: i64,
        /// The largest value a word can hold.
        max: u32,
    },
    /// The program has more words than the machine has memory.
    TooLong {
        /// The number of words in the program.
        words: usize,
        /// The number of memory cells.
        memory: usize,
    },
}
impl std::fmt::Display for LoadErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadErr::FileNotFound(p) => write!(f, "program file not found: {}", p.display()),
            LoadErr::Io(e) => write!(f, "cannot read program file: {e}"),
            LoadErr::BadWord { addr, text } => {
                write!(f, "address {addr}: {text:?} is not a machine word")
            }
            LoadErr::OutOfRange { addr, word, max } => {
                write!(f, "address {addr}: word {word} out of range, must be 0 to {max}")
            }
            LoadErr::TooLong { words, memory } => {
                write!(f, "program has {words} words, but memory holds only {memory}")
            }
        }
    }
}
impl std::error::Error for LoadErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Any error that can occur during execution.
#[derive(Debug, PartialEq, Eq)]
pub enum SimErr {
    /// An input value does not fit in the machine's word range.
    InputOutOfRange {
        /// The offending value.
        value: i64,
        /// The largest value a word can hold.
        max: u32,
    },
    /// The program counter ran past the end of memory without hitting HLT.
    CounterOutOfBounds {
        /// The counter value at the failed fetch.
        counter: usize,
    },
}
impl std::fmt::Display for SimErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimErr::InputOutOfRange { value, max } => {
                write!(f, "input {value} out of range, must be 0 to {max}")
            }
            SimErr::CounterOutOfBounds { counter } => {
                write!(f, "program counter {counter} ran past the end of memory")
            }
        }
    }
}
impl std::error::Error for SimErr {}

/// The Little Man Computer.
///
/// Registers and memory are public: front ends are expected to read them
/// freely and prime `input` or `accumulator` before a run. The derived
/// word-sizing parameters are read-only.
pub struct Simulator {
    spec: MachineSpec,
    /// Digits needed to address all of memory.
    address_digits: u32,
    /// Digits in a full word: enough for the 10 instruction codes,
    /// plus the address digits.
    word_digits: u32,
    word_range: u32,
    word_max: u32,

    /// The machine's memory, one cell per addressable word.
    pub mem: Vec<u32>,
    /// The input register.
    pub input: u32,
    /// The output register.
    pub output: u32,
    /// The program counter.
    pub counter: usize,
    /// The arithmetic register.
    pub accumulator: u32,

    overflow: bool,
    negative: bool,
    waiting_for_input: bool,
    waiting_for_step: bool,

    client: Option<Box<dyn Client>>,
}

impl Simulator {
    /// Creates a machine with all memory and registers zeroed.
    pub fn new(spec: MachineSpec) -> Self {
        let address_digits = digits(spec.memory_size as u32, spec.base);
        let word_digits = digits(10, spec.base) + address_digits;
        // Saturate rather than wrap for absurdly large configurations.
        let word_range = spec.base.checked_pow(word_digits).unwrap_or(u32::MAX);

        Self {
            spec,
            address_digits,
            word_digits,
            word_range,
            word_max: word_range - 1,
            mem: vec![0; spec.memory_size],
            input: 0,
            output: 0,
            counter: 0,
            accumulator: 0,
            overflow: false,
            negative: false,
            waiting_for_input: false,
            waiting_for_step: false,
            client: None,
        }
    }

    /// The machine's numeric shape.
    pub fn spec(&self) -> MachineSpec {
        self.spec
    }
    /// The number of distinct values a word can hold.
    pub fn word_range(&self) -> u32 {
        self.word_range
    }
    /// The largest value a word can hold.
    pub fn word_max(&self) -> u32 {
        self.word_max
    }
    /// Whether the last arithmetic result exceeded [`word_max`].
    ///
    /// [`word_max`]: Simulator::word_max
    pub fn overflow(&self) -> bool {
        self.overflow
    }
    /// Whether the last arithmetic result was below zero.
    pub fn negative(&self) -> bool {
        self.negative
    }
    /// Whether execution is suspended awaiting [`set_input`].
    ///
    /// [`set_input`]: Simulator::set_input
    pub fn is_waiting_for_input(&self) -> bool {
        self.waiting_for_input
    }
    /// Whether execution is suspended because the client paused it.
    pub fn is_waiting_for_step(&self) -> bool {
        self.waiting_for_step
    }

    /// Attaches the client to be notified when something happens.
    ///
    /// Only one client is attached at a time; the last call wins.
    pub fn connect(&mut self, client: impl Client + 'static) {
        self.client = Some(Box::new(client));
    }

    /// Detaches the client, if any.
    pub fn disconnect(&mut self) {
        self.client = None;
    }

    /// Zeroes all memory, registers, and flags.
    pub fn reset(&mut self) {
        self.mem.fill(0);
        self.input = 0;
        self.output = 0;
        self.counter = 0;
        self.accumulator = 0;
        self.overflow = false;
        self.negative = false;
        self.waiting_for_input = false;
        self.waiting_for_step = false;
    }

    /// Loads a machine-code file: one decimal word per line, into
    /// consecutive addresses starting at 0. Registers are not reset.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadErr> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadErr::FileNotFound(path.to_path_buf()),
            _ => LoadErr::Io(e),
        })?;
        self.load(&text)
    }

    /// Loads machine code from text, one decimal word per line.
    pub fn load(&mut self, text: &str) -> Result<(), LoadErr> {
        for (addr, line) in text.lines().enumerate() {
            let word: i64 = line.trim().parse().map_err(|_| LoadErr::BadWord {
                addr,
                text: line.trim().to_string(),
            })?;
            self.store(addr, word)?;
        }
        Ok(())
    }

    /// Loads machine code from already parsed words.
    pub fn load_words(&mut self, words: &[u32]) -> Result<(), LoadErr> {
        for (addr, &word) in words.iter().enumerate() {
            self.store(addr, i64::from(word))?;
        }
        Ok(())
    }

    fn store(&mut self, addr: usize, word: i64) -> Result<(), LoadErr> {
        if addr >= self.mem.len() {
            return Err(LoadErr::TooLong { words: addr + 1, memory: self.mem.len() });
        }
        if !self.in_word_range(word) {
            return Err(LoadErr::OutOfRange { addr, word, max: self.word_max });
        }
        self.mem[addr] = word as u32;
        Ok(())
    }

    /// Starts the program from the beginning.
    ///
    /// Only the program counter is reset. The other registers retain their
    /// values, so a caller can prime `input` before the run; it is likewise
    /// the programmer's responsibility to not depend on stale register
    /// state when re-running.
    pub fn run(&mut self) -> Result<(), SimErr> {
        self.counter = 0;
        self.resume()
    }

    /// Runs until the program halts or suspends.
    ///
    /// This is also how a front end continues after a suspension: register
    /// state survives the pause, so execution picks up exactly where it
    /// left off.
    pub fn resume(&mut self) -> Result<(), SimErr> {
        while self.step()? {}
        Ok(())
    }

    /// Executes the instruction under the program counter.
    ///
    /// Returns `false` if execution cannot continue: the machine halted,
    /// the client paused it, or input is pending.
    pub fn step(&mut self) -> Result<bool, SimErr> {
        if !self.can_step() {
            return Ok(false);
        }

        let Some(&word) = self.mem.get(self.counter) else {
            return Err(SimErr::CounterOutOfBounds { counter: self.counter });
        };
        self.counter += 1;

        let Some(instr) = Instr::decode(word, self.spec.memory_size) else {
            // Unrecognized words execute as no-ops.
            return Ok(true);
        };

        match instr {
            Instr::Hlt => {
                // Don't step the counter past HLT.
                self.counter -= 1;
                if let Some(client) = &mut self.client {
                    client.notify_halt();
                }
                return Ok(false);
            }
            Instr::Add(arg) => {
                self.set_accumulator(i64::from(self.accumulator) + i64::from(self.mem[arg]));
            }
            Instr::Sub(arg) => {
                self.set_accumulator(i64::from(self.accumulator) - i64::from(self.mem[arg]));
            }
            Instr::Sta(arg) => self.mem[arg] = self.accumulator,
            Instr::Lda(arg) => self.set_accumulator(i64::from(self.mem[arg])),
            Instr::Bra(arg) => self.counter = arg,
            Instr::Brz(arg) => {
                if self.accumulator == 0 {
                    self.counter = arg;
                }
            }
            Instr::Brp(arg) => {
                if !self.negative {
                    self.counter = arg;
                }
            }
            Instr::Inp => return self.input_step(),
            Instr::Out => {
                self.output = self.accumulator;
                if let Some(client) = &mut self.client {
                    client.notify_output(self.output);
                }
            }
        }
        Ok(true)
    }

    fn input_step(&mut self) -> Result<bool, SimErr> {
        let reply = match &mut self.client {
            Some(client) => client.notify_input(),
            // No client: take what's already in the input register.
            None => Reply::Value(i64::from(self.input)),
        };
        match reply {
            Reply::Continue => {
                self.waiting_for_input = false;
                Ok(true)
            }
            Reply::Pause => {
                self.waiting_for_input = true;
                Ok(false)
            }
            Reply::Value(v) => {
                self.set_input(v)?;
                Ok(true)
            }
        }
    }

    /// Consults the client about whether to execute the next instruction.
    fn can_step(&mut self) -> bool {
        // Always step when resuming after a pause, so the instruction the
        // client paused on actually executes.
        if self.waiting_for_step {
            self.waiting_for_step = false;
            return true;
        }
        let Some(client) = &mut self.client else {
            return true;
        };
        self.waiting_for_step = !client.notify_step(self.counter);
        !self.waiting_for_step
    }

    /// Fills the input register, clearing any pending input suspension.
    ///
    /// The value also lands in the accumulator, so INP behaves as
    /// "load input into accumulator".
    pub fn set_input(&mut self, value: i64) -> Result<(), SimErr> {
        self.waiting_for_input = false;
        if !self.in_word_range(value) {
            return Err(SimErr::InputOutOfRange { value, max: self.word_max });
        }
        self.input = value as u32;
        self.set_accumulator(value);
        Ok(())
    }

    /// Loads an arithmetic result into the accumulator, wrapping it into
    /// the word range and recording the overflow and negative flags from
    /// the pre-wrap value.
    fn set_accumulator(&mut self, raw: i64) {
        self.overflow = raw > i64::from(self.word_max);
        self.negative = raw < 0;
        self.accumulator = raw.rem_euclid(i64::from(self.word_range)) as u32;
    }

    fn in_word_range(&self, n: i64) -> bool {
        n >= 0 && n < i64::from(self.word_range)
    }

    /// Formats a register value: zero-padded decimal in base 10, hex
    /// otherwise. Addresses use fewer digits than full words.
    fn format_word(&self, n: usize, address: bool) -> String {
        let width = if address { self.address_digits } else { self.word_digits } as usize;
        if self.spec.base == 10 {
            format!("{n:0width$}")
        } else {
            format!("{n:0width$x}")
        }
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(MachineSpec::default())
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("spec", &self.spec)
            .field("counter", &self.counter)
            .field("accumulator", &self.accumulator)
            .field("input", &self.input)
            .field("output", &self.output)
            .field("overflow", &self.overflow)
            .field("negative", &self.negative)
            .field("waiting_for_input", &self.waiting_for_input)
            .field("waiting_for_step", &self.waiting_for_step)
            .finish_non_exhaustive()
    }
}

/// A register and memory dump, for interactive front ends.
impl std::fmt::Display for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(
            f,
            "      Input: {}    Accumulator: {}",
            self.format_word(self.input as usize, false),
            self.format_word(self.accumulator as usize, false),
        )?;
        writeln!(
            f,
            "     Output: {}        Counter:  {}",
            self.format_word(self.output as usize, false),
            self.format_word(self.counter, true),
        )?;

        let width = if self.spec.base == 10 { 10 } else { 16 };
        for (i, &word) in self.mem.iter().enumerate() {
            if i % width == 0 {
                writeln!(f)?;
            }
            write!(f, " {}", self.format_word(word as usize, false))?;
        }
        Ok(())
    }
}
