//! Instruction decoding: the ModR/M byte decoder (spec §4.3).
//!
//! The teacher's decode-cache machinery (`instruction::DecodedInstruction`,
//! `operands::Operand`) supported a tiered execution model this core drops
//! (see SPEC_FULL.md §A) in favor of decoding and dispatching each
//! instruction inline; `ModRm`'s accessor methods are the entire decode
//! surface the executor needs.

pub mod modrm;

pub use modrm::{AddressingMode, ModRm};
