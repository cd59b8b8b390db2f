//! A Little Man Computer assembler and simulator.
//!
//! The LMC is the classic teaching machine: 100 words of decimal memory,
//! one accumulator, and ten instructions. This crate provides the full
//! pipeline from assembly source to a running machine, plus a client
//! protocol so a front end (batch runner, REPL, GUI) can feed input,
//! observe output, and single-step execution.
//!
//! # Usage
//!
//! Source code is assembled into machine words:
//! ```
//! use lmc_suite::asm::Assembler;
//!
//! let src = [
//!     "; Add two numbers.",
//!     "      INP",
//!     "      STA FIRST",
//!     "      INP",
//!     "      ADD FIRST",
//!     "      OUT",
//!     "      HLT",
//!     "FIRST DAT",
//! ];
//!
//! let mut asm = Assembler::new();
//! assert!(asm.assemble(&src));
//! assert_eq!(asm.code(), &[901, 306, 901, 106, 902, 0, 0]);
//! ```
//!
//! Machine words are then loaded into a simulator and run. A client
//! supplies input and receives output:
//! ```
//! # use lmc_suite::asm::Assembler;
//! # let src = ["INP", "STA FIRST", "INP", "ADD FIRST", "OUT", "HLT", "FIRST DAT"];
//! # let mut asm = Assembler::new();
//! # assert!(asm.assemble(&src));
//! use lmc_suite::sim::Simulator;
//! use lmc_suite::sim::client::BufferedClient;
//!
//! let mut sim = Simulator::default();
//! sim.load_words(asm.code()).unwrap();
//!
//! let client = BufferedClient::with_inputs([123, 123]);
//! sim.connect(client.clone());
//!
//! sim.run().unwrap();
//! assert_eq!(client.take_outputs(), vec![246]);
//! ```
//!
//! If more control is needed, the machine can be stepped one instruction
//! at a time, or paused cooperatively through the client protocol. See
//! the [`sim`] module for more details.
#![warn(missing_docs)]

pub mod parse;
pub mod ast;
pub mod asm;
pub mod sim;
pub mod err;
