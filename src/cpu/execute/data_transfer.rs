//! MOV, XCHG, LEA, LDS/LES, XLAT, PUSH/POP of segment registers, PUSHF/POPF,
//! LAHF/SAHF, CBW/CWD.

use crate::cpu::decode::{AddressingMode, ModRm};
use crate::cpu::executor::Executor;
use crate::cpu::stack;
use crate::cpu::state::{Cpu, SegmentedAddress, SEG_DS};
use crate::error::CpuError;
use crate::memory::MemoryBus;

impl Executor {
    pub fn mov_rm8_r8(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let value = modrm.get_reg8(cpu);
        modrm.set_rm8(cpu, mem, value, &mut self.recorder);
        Ok(())
    }

    pub fn mov_rm16_r16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let value = modrm.get_reg16(cpu);
        modrm.set_rm16(cpu, mem, value, &mut self.recorder);
        Ok(())
    }

    pub fn mov_r8_rm8(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let value = modrm.get_rm8(cpu, mem, &mut self.recorder);
        modrm.set_reg8(cpu, value);
        Ok(())
    }

    pub fn mov_r16_rm16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let value = modrm.get_rm16(cpu, mem, &mut self.recorder);
        modrm.set_reg16(cpu, value);
        Ok(())
    }

    /// MOV r/m16, segreg (0x8C) and MOV segreg, r/m16 (0x8E). The `reg`
    /// sub-field only names 6 segment registers; `reg` 6/7 are reserved.
    pub fn mov_rm16_segreg(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let at = self.current_instruction_start;
        if modrm.reg > 5 {
            return self.invalid_group_index(0x8C, modrm.reg, at);
        }
        let value = modrm.get_seg_reg(cpu);
        modrm.set_rm16(cpu, mem, value, &mut self.recorder);
        Ok(())
    }

    pub fn mov_segreg_rm16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let at = self.current_instruction_start;
        if modrm.reg > 5 {
            return self.invalid_group_index(0x8E, modrm.reg, at);
        }
        let value = modrm.get_rm16(cpu, mem, &mut self.recorder);
        modrm.set_seg_reg(cpu, value);
        Ok(())
    }

    pub fn mov_r8_imm8(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus, reg: u8) -> Result<(), CpuError> {
        let imm = cpu.fetch_u8(mem);
        cpu.write_reg8(reg, imm);
        Ok(())
    }

    pub fn mov_r16_imm16(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus, reg: u8) -> Result<(), CpuError> {
        let imm = cpu.fetch_u16(mem);
        cpu.write_reg16(reg, imm);
        Ok(())
    }

    /// MOV r/m8, imm8 (0xC6), Group 11: the only defined sub-index is 0.
    pub fn mov_rm8_imm8(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let at = self.current_instruction_start;
        if modrm.reg != 0 {
            return self.invalid_group_index(0xC6, modrm.reg, at);
        }
        let imm = cpu.fetch_u8(mem);
        modrm.set_rm8(cpu, mem, imm, &mut self.recorder);
        Ok(())
    }

    /// MOV r/m16, imm16 (0xC7), Group 11: the only defined sub-index is 0.
    pub fn mov_rm16_imm16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let at = self.current_instruction_start;
        if modrm.reg != 0 {
            return self.invalid_group_index(0xC7, modrm.reg, at);
        }
        let imm = cpu.fetch_u16(mem);
        modrm.set_rm16(cpu, mem, imm, &mut self.recorder);
        Ok(())
    }

    /// MOV AL/AX, [moffs] (0xA0/0xA1) and MOV [moffs], AL/AX (0xA2/0xA3):
    /// a direct-addressed memory operand with no ModR/M byte, segment
    /// overridable like any other memory operand.
    pub fn mov_acc8_moffs(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let offset = cpu.fetch_u16(mem);
        let addr = SegmentedAddress::new(cpu.effective_segment(SEG_DS), offset);
        let value = cpu.read_mem8(mem, addr);
        cpu.write_reg8(0, value);
        Ok(())
    }

    pub fn mov_moffs8_acc(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let offset = cpu.fetch_u16(mem);
        let addr = SegmentedAddress::new(cpu.effective_segment(SEG_DS), offset);
        let value = cpu.read_reg8(0);
        cpu.write_mem8(mem, addr, value);
        Ok(())
    }

    pub fn mov_acc16_moffs(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let offset = cpu.fetch_u16(mem);
        let addr = SegmentedAddress::new(cpu.effective_segment(SEG_DS), offset);
        let value = cpu.read_mem16(mem, addr);
        cpu.write_reg16(0, value);
        Ok(())
    }

    pub fn mov_moffs16_acc(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let offset = cpu.fetch_u16(mem);
        let addr = SegmentedAddress::new(cpu.effective_segment(SEG_DS), offset);
        let value = cpu.read_reg16(0);
        cpu.write_mem16(mem, addr, value);
        Ok(())
    }

    pub fn xchg_rm8_r8(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let a = modrm.get_rm8(cpu, mem, &mut self.recorder);
        let b = modrm.get_reg8(cpu);
        modrm.set_rm8(cpu, mem, b, &mut self.recorder);
        modrm.set_reg8(cpu, a);
        Ok(())
    }

    pub fn xchg_rm16_r16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let a = modrm.get_rm16(cpu, mem, &mut self.recorder);
        let b = modrm.get_reg16(cpu);
        modrm.set_rm16(cpu, mem, b, &mut self.recorder);
        modrm.set_reg16(cpu, a);
        Ok(())
    }

    pub fn xchg_ax_r16(&mut self, cpu: &mut Cpu, reg: u8) -> Result<(), CpuError> {
        let ax = cpu.read_reg16(0);
        let other = cpu.read_reg16(reg);
        cpu.write_reg16(0, other);
        cpu.write_reg16(reg, ax);
        Ok(())
    }

    /// LEA r16, m (0x8D): store the computed offset, never dereference it.
    pub fn lea(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let at = self.current_instruction_start;
        match modrm.mode {
            AddressingMode::RegisterDirect { .. } => self.invalid_opcode(0x8D, at, self.current_after_prefix),
            _ => {
                let addr = modrm
                    .get_memory_address(cpu)
                    .expect("non-register ModR/M mode always has an address");
                modrm.set_reg16(cpu, addr.offset);
                Ok(())
            }
        }
    }

    /// LDS/LES r16, m32: load r16 from the low word, the named segment
    /// register from the high word, of a 32-bit far pointer in memory.
    pub fn load_far_pointer(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, seg: u8) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let at = self.current_instruction_start;
        let Some(addr) = modrm.get_memory_address(cpu) else {
            return self.invalid_opcode(0xC4, at, self.current_after_prefix);
        };
        let offset = cpu.read_mem16(mem, addr);
        let segment_value = cpu.read_mem16(mem, SegmentedAddress::new(addr.segment, addr.offset.wrapping_add(2)));
        modrm.set_reg16(cpu, offset);
        cpu.write_seg(seg, segment_value);
        Ok(())
    }

    /// XLAT (0xD7): AL ← [DS:BX + AL], segment overridable.
    pub fn xlat(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let offset = cpu.read_reg16(3).wrapping_add(cpu.read_reg8(0) as u16);
        let addr = SegmentedAddress::new(cpu.effective_segment(SEG_DS), offset);
        let value = cpu.read_mem8(mem, addr);
        cpu.write_reg8(0, value);
        Ok(())
    }

    pub fn push_segreg(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, seg: u8) -> Result<(), CpuError> {
        let value = cpu.read_seg(seg);
        stack::push16(cpu, mem, value);
        Ok(())
    }

    pub fn pop_segreg(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, seg: u8) -> Result<(), CpuError> {
        let value = stack::pop16(cpu, mem);
        cpu.write_seg(seg, value);
        Ok(())
    }

    pub fn push_r16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, reg: u8) -> Result<(), CpuError> {
        let value = cpu.read_reg16(reg);
        stack::push16(cpu, mem, value);
        Ok(())
    }

    pub fn pop_r16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, reg: u8) -> Result<(), CpuError> {
        let value = stack::pop16(cpu, mem);
        cpu.write_reg16(reg, value);
        Ok(())
    }

    pub fn push_rm16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, modrm: &ModRm) -> Result<(), CpuError> {
        let value = modrm.get_rm16(cpu, mem, &mut self.recorder);
        stack::push16(cpu, mem, value);
        Ok(())
    }

    pub fn pop_rm16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, modrm: &ModRm) -> Result<(), CpuError> {
        let value = stack::pop16(cpu, mem);
        modrm.set_rm16(cpu, mem, value, &mut self.recorder);
        Ok(())
    }

    /// POP r/m16 (0x8F), Group 1A: the only defined sub-index is 0.
    pub fn pop_rm16_group(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let at = self.current_instruction_start;
        if modrm.reg != 0 {
            return self.invalid_group_index(0x8F, modrm.reg, at);
        }
        self.pop_rm16(cpu, mem, &modrm)
    }

    pub fn pushf(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let word = cpu.flags.to_word();
        stack::push16(cpu, mem, word);
        Ok(())
    }

    pub fn popf(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let word = stack::pop16(cpu, mem);
        cpu.flags = crate::cpu::state::Flags::from_word(word);
        Ok(())
    }

    /// LAHF (0x9F): AH ← low byte of FLAGS.
    pub fn lahf(&mut self, cpu: &mut Cpu) -> Result<(), CpuError> {
        let word = cpu.flags.to_word();
        cpu.write_reg8(4, word as u8);
        Ok(())
    }

    /// SAHF (0x9E): low byte of FLAGS ← AH.
    pub fn sahf(&mut self, cpu: &mut Cpu) -> Result<(), CpuError> {
        let ah = cpu.read_reg8(4);
        let word = (cpu.flags.to_word() & 0xFF00) | ah as u16;
        cpu.flags = crate::cpu::state::Flags::from_word(word);
        Ok(())
    }

    /// CBW (0x98): sign-extend AL into AX.
    pub fn cbw(&mut self, cpu: &mut Cpu) -> Result<(), CpuError> {
        let al = cpu.read_reg8(0) as i8;
        cpu.write_reg16(0, al as i16 as u16);
        Ok(())
    }

    /// CWD (0x99): sign-extend AX into DX:AX.
    pub fn cwd(&mut self, cpu: &mut Cpu) -> Result<(), CpuError> {
        let ax = cpu.read_reg16(0) as i16;
        let dx = if ax < 0 { 0xFFFF } else { 0x0000 };
        cpu.write_reg16(2, dx);
        Ok(())
    }
}
