//! Direct flag manipulation: CLC/STC/CMC, CLI/STI, CLD/STD.

use crate::cpu::state::{Cpu, Flags};
use crate::cpu::Executor;
use crate::error::CpuError;
use crate::memory::MemoryBus;

impl Executor {
    pub fn clc(&mut self, cpu: &mut Cpu, _mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        cpu.flags.remove(Flags::CF);
        Ok(())
    }

    pub fn stc(&mut self, cpu: &mut Cpu, _mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        cpu.flags.insert(Flags::CF);
        Ok(())
    }

    /// CMC (0xF5): complement CF.
    pub fn cmc(&mut self, cpu: &mut Cpu, _mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        cpu.flags.toggle(Flags::CF);
        Ok(())
    }

    pub fn cli(&mut self, cpu: &mut Cpu, _mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        cpu.flags.remove(Flags::IF);
        Ok(())
    }

    pub fn sti(&mut self, cpu: &mut Cpu, _mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        cpu.flags.insert(Flags::IF);
        cpu.set_interrupt_delay();
        Ok(())
    }

    pub fn cld(&mut self, cpu: &mut Cpu, _mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        cpu.flags.remove(Flags::DF);
        Ok(())
    }

    pub fn std(&mut self, cpu: &mut Cpu, _mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        cpu.flags.insert(Flags::DF);
        Ok(())
    }
}
