//! The instruction set.
//!
//! This module defines the mnemonic table shared by the assembler and the
//! simulator. [`Mnemonic`] carries everything the assembler needs to emit
//! a word (base code and arity), and [`Instr`] is the simulator's decoded
//! view of a word in memory.

/// An assembly mnemonic.
///
/// Mnemonics are recognized case-sensitively in their uppercase form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    /// `HLT`: stop the machine.
    Hlt,
    /// `ADD x`: add the word at address `x` to the accumulator.
    Add,
    /// `SUB x`: subtract the word at address `x` from the accumulator.
    Sub,
    /// `STA x`: store the accumulator at address `x`.
    Sta,
    /// `LDA x`: load the accumulator from address `x`.
    Lda,
    /// `BRA x`: branch to address `x` unconditionally.
    Bra,
    /// `BRZ x`: branch to address `x` if the accumulator is zero.
    Brz,
    /// `BRP x`: branch to address `x` if the last result was not negative.
    Brp,
    /// `INP`: read a value into the accumulator.
    Inp,
    /// `OUT`: write the accumulator to the output register.
    Out,
    /// `DAT [n]`: reserve a word of storage, optionally initialized to `n`.
    Dat,
}

impl Mnemonic {
    /// Looks up a mnemonic by its source spelling.
    ///
    /// Anything that is not an exact uppercase mnemonic is not a mnemonic;
    /// the parser treats it as a label instead.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "HLT" => Some(Mnemonic::Hlt),
            "ADD" => Some(Mnemonic::Add),
            "SUB" => Some(Mnemonic::Sub),
            "STA" => Some(Mnemonic::Sta),
            "LDA" => Some(Mnemonic::Lda),
            "BRA" => Some(Mnemonic::Bra),
            "BRZ" => Some(Mnemonic::Brz),
            "BRP" => Some(Mnemonic::Brp),
            "INP" => Some(Mnemonic::Inp),
            "OUT" => Some(Mnemonic::Out),
            "DAT" => Some(Mnemonic::Dat),
            _ => None,
        }
    }

    /// The base machine code for this mnemonic.
    ///
    /// For addressed instructions this is the opcode times the memory size;
    /// the resolved operand is added to it during the second pass. `INP` and
    /// `OUT` are complete words on their own, and `DAT` contributes nothing
    /// beyond its operand.
    pub fn code(self) -> u32 {
        match self {
            Mnemonic::Dat => 0,
            Mnemonic::Hlt => 0,
            Mnemonic::Add => 100,
            Mnemonic::Sub => 200,
            Mnemonic::Sta => 300,
            Mnemonic::Lda => 500,
            Mnemonic::Bra => 600,
            Mnemonic::Brz => 700,
            Mnemonic::Brp => 800,
            Mnemonic::Inp => 901,
            Mnemonic::Out => 902,
        }
    }

    /// The `(required, optional)` operand counts for this mnemonic.
    pub fn arity(self) -> (usize, usize) {
        match self {
            Mnemonic::Dat => (0, 1),
            Mnemonic::Hlt | Mnemonic::Inp | Mnemonic::Out => (0, 0),
            Mnemonic::Add
            | Mnemonic::Sub
            | Mnemonic::Sta
            | Mnemonic::Lda
            | Mnemonic::Bra
            | Mnemonic::Brz
            | Mnemonic::Brp => (1, 0),
        }
    }
}

impl std::fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Mnemonic::Hlt => "HLT",
            Mnemonic::Add => "ADD",
            Mnemonic::Sub => "SUB",
            Mnemonic::Sta => "STA",
            Mnemonic::Lda => "LDA",
            Mnemonic::Bra => "BRA",
            Mnemonic::Brz => "BRZ",
            Mnemonic::Brp => "BRP",
            Mnemonic::Inp => "INP",
            Mnemonic::Out => "OUT",
            Mnemonic::Dat => "DAT",
        })
    }
}

/// A decoded instruction, as the simulator sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    /// Stop the machine.
    Hlt,
    /// Add memory to the accumulator.
    Add(usize),
    /// Subtract memory from the accumulator.
    Sub(usize),
    /// Store the accumulator.
    Sta(usize),
    /// Load the accumulator.
    Lda(usize),
    /// Unconditional branch.
    Bra(usize),
    /// Branch if the accumulator is zero.
    Brz(usize),
    /// Branch if the last result was not negative.
    Brp(usize),
    /// Read input.
    Inp,
    /// Write output.
    Out,
}

impl Instr {
    /// Decodes a memory word into an instruction.
    ///
    /// The word splits into an opcode (the word divided by the memory size)
    /// and an address (the remainder). Words with no corresponding
    /// instruction decode to `None`; the simulator treats those as no-ops.
    pub fn decode(word: u32, memory_size: usize) -> Option<Instr> {
        let op = word as usize / memory_size;
        let arg = word as usize % memory_size;
        match op {
            // Any opcode-0 word halts; the address digits are ignored.
            0 => Some(Instr::Hlt),
            1 => Some(Instr::Add(arg)),
            2 => Some(Instr::Sub(arg)),
            3 => Some(Instr::Sta(arg)),
            5 => Some(Instr::Lda(arg)),
            6 => Some(Instr::Bra(arg)),
            7 => Some(Instr::Brz(arg)),
            8 => Some(Instr::Brp(arg)),
            9 => match arg {
                1 => Some(Instr::Inp),
                2 => Some(Instr::Out),
                _ => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Instr, Mnemonic};

    #[test]
    fn test_from_name() {
        assert_eq!(Mnemonic::from_name("ADD"), Some(Mnemonic::Add));
        assert_eq!(Mnemonic::from_name("DAT"), Some(Mnemonic::Dat));
        // Mnemonics are case-sensitive.
        assert_eq!(Mnemonic::from_name("add"), None);
        assert_eq!(Mnemonic::from_name("Add"), None);
        assert_eq!(Mnemonic::from_name("LOOP"), None);
    }

    #[test]
    fn test_codes() {
        assert_eq!(Mnemonic::Hlt.code(), 0);
        assert_eq!(Mnemonic::Add.code(), 100);
        assert_eq!(Mnemonic::Lda.code(), 500);
        assert_eq!(Mnemonic::Inp.code(), 901);
        assert_eq!(Mnemonic::Out.code(), 902);
    }

    #[test]
    fn test_decode() {
        assert_eq!(Instr::decode(0, 100), Some(Instr::Hlt));
        assert_eq!(Instr::decode(153, 100), Some(Instr::Add(53)));
        assert_eq!(Instr::decode(306, 100), Some(Instr::Sta(6)));
        assert_eq!(Instr::decode(901, 100), Some(Instr::Inp));
        assert_eq!(Instr::decode(902, 100), Some(Instr::Out));
    }

    #[test]
    fn test_decode_invalid() {
        // Opcode 4 is unassigned.
        assert_eq!(Instr::decode(417, 100), None);
        // 9xx words other than 901/902 do not decode.
        assert_eq!(Instr::decode(900, 100), None);
        assert_eq!(Instr::decode(999, 100), None);
    }

    #[test]
    fn test_decode_halt_ignores_address() {
        assert_eq!(Instr::decode(53, 100), Some(Instr::Hlt));
    }

    #[test]
    fn test_decode_other_memory_size() {
        // With 50 words of memory, ADD 17 encodes as 1 * 50 + 17.
        assert_eq!(Instr::decode(67, 50), Some(Instr::Add(17)));
    }
}
