//! 8086/80186/80286/80386-class real-mode CPU core.
//!
//! A single fetch/prefix/decode/dispatch loop (spec §4.4) replaces the
//! teacher's three-tier dispatch; there is no decode cache or compiled
//! basic-block tier in this design (see SPEC_FULL.md §A).

pub mod alu;
pub mod decode;
pub mod execute;
pub mod executor;
pub mod function_handler;
pub mod harness;
pub mod interrupts;
pub mod recorder;
pub mod stack;
pub mod state;

pub use executor::{Executor, NativeCallHost};
pub use harness::CpuHarness;
pub use state::{Cpu, Flags, RepeatMode, SegmentedAddress};
