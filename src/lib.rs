//! A real-mode, 8086/80186/80286/80386-class CPU emulation core.
//!
//! The crate is the instruction-execution engine only: registers, flags,
//! segmentation, the full one-byte opcode map, interrupts, and the
//! static-address/shadow-call-stack bookkeeping hosts use to overlay native
//! code onto emulated programs. It owns no display, keyboard, disk, or BIOS
//! surface — a host wires a `memory::MemoryBus` and an `io::IoPortHandler`
//! to whatever peripherals it's emulating and drives `cpu::Executor::step`.

pub mod config;
pub mod cpu;
pub mod error;
pub mod io;
pub mod memory;

pub use config::EmulatorConfig;
pub use cpu::{Cpu, CpuHarness, Executor, NativeCallHost};
pub use error::CpuError;
pub use memory::{FlatMemory, MemoryBus};
