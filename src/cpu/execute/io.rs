//! IN/OUT: immediate port number (0xE4-0xE7) and DX-addressed port (0xEC-0xEF)
//! forms, routed through `Executor::io` (spec §4.5).

use crate::cpu::state::Cpu;
use crate::cpu::Executor;
use crate::error::CpuError;
use crate::memory::MemoryBus;

impl Executor {
    pub fn in_al_imm8(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let port = cpu.fetch_u8(mem) as u16;
        let at = self.current_instruction_start;
        let value = self.io.in8(port, at, &self.config)?;
        cpu.write_reg8(0, value);
        Ok(())
    }

    pub fn in_ax_imm8(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let port = cpu.fetch_u8(mem) as u16;
        let at = self.current_instruction_start;
        let value = self.io.in16(port, at, &self.config)?;
        cpu.write_reg16(0, value);
        Ok(())
    }

    pub fn out_imm8_al(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let port = cpu.fetch_u8(mem) as u16;
        let at = self.current_instruction_start;
        let value = cpu.read_reg8(0);
        self.io.out8(port, value, at, &self.config)
    }

    pub fn out_imm8_ax(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let port = cpu.fetch_u8(mem) as u16;
        let at = self.current_instruction_start;
        let value = cpu.read_reg16(0);
        self.io.out16(port, value, at, &self.config)
    }

    pub fn in_al_dx(&mut self, cpu: &mut Cpu, _mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let port = cpu.read_reg16(2);
        let at = self.current_instruction_start;
        let value = self.io.in8(port, at, &self.config)?;
        cpu.write_reg8(0, value);
        Ok(())
    }

    pub fn in_ax_dx(&mut self, cpu: &mut Cpu, _mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let port = cpu.read_reg16(2);
        let at = self.current_instruction_start;
        let value = self.io.in16(port, at, &self.config)?;
        cpu.write_reg16(0, value);
        Ok(())
    }

    pub fn out_dx_al(&mut self, cpu: &mut Cpu, _mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let port = cpu.read_reg16(2);
        let at = self.current_instruction_start;
        let value = cpu.read_reg8(0);
        self.io.out8(port, value, at, &self.config)
    }

    pub fn out_dx_ax(&mut self, cpu: &mut Cpu, _mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let port = cpu.read_reg16(2);
        let at = self.current_instruction_start;
        let value = cpu.read_reg16(0);
        self.io.out16(port, value, at, &self.config)
    }
}
