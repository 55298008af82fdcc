//! Fallback and no-op handlers: invalid opcodes, NOP, the x87 stub, WAIT.

use crate::cpu::executor::Executor;
use crate::cpu::state::{Cpu, SegmentedAddress};
use crate::error::CpuError;
use crate::memory::MemoryBus;

impl Executor {
    /// An opcode with no defined handler (spec §7: `InvalidOpcode`, fatal).
    pub fn invalid_opcode(&mut self, opcode: u8, at: SegmentedAddress, after_prefix: bool) -> Result<(), CpuError> {
        Err(CpuError::InvalidOpcode {
            opcode,
            at,
            after_prefix,
        })
    }

    pub fn invalid_group_index(&mut self, opcode: u8, index: u8, at: SegmentedAddress) -> Result<(), CpuError> {
        Err(CpuError::InvalidGroupIndex { opcode, index, at })
    }

    pub fn nop(&mut self, _cpu: &mut Cpu, _mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        Ok(())
    }

    /// ESC opcodes 0xD8-0xDF (spec §9(c)): decode as no-ops. A ModR/M byte
    /// always follows, so it must be consumed even though nothing reads it.
    pub fn x87_escape(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        use crate::cpu::decode::ModRm;
        let _ = ModRm::fetch(cpu, mem);
        Ok(())
    }

    /// WAIT (0x9B): in a core with no coprocessor, there is never a pending
    /// FPU exception to wait on, so this is a no-op.
    pub fn wait(&mut self, _cpu: &mut Cpu, _mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        Ok(())
    }
}
