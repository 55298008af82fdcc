//! ADD/OR/ADC/SBB/AND/SUB/XOR/CMP (spec §4.2, §4.4 "Group 1"), INC/DEC,
//! NEG, MUL/IMUL/DIV/IDIV (Group 3).

use crate::cpu::alu;
use crate::cpu::decode::ModRm;
use crate::cpu::executor::Executor;
use crate::cpu::state::{Cpu, Flags};
use crate::error::CpuError;
use crate::memory::MemoryBus;

/// The eight Group 1 operations, selected either by `(opcode >> 3) & 7` for
/// the non-grouped 0x00-0x3D range or by a ModR/M reg field for 0x80-0x83.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Or,
    Adc,
    Sbb,
    And,
    Sub,
    Xor,
    Cmp,
}

impl ArithOp {
    pub fn from_reg_field(reg: u8) -> Self {
        match reg & 0b111 {
            0 => ArithOp::Add,
            1 => ArithOp::Or,
            2 => ArithOp::Adc,
            3 => ArithOp::Sbb,
            4 => ArithOp::And,
            5 => ArithOp::Sub,
            6 => ArithOp::Xor,
            _ => ArithOp::Cmp,
        }
    }

    /// CMP (and TEST, handled separately in Group 3) never writes back.
    fn writes_back(self) -> bool {
        !matches!(self, ArithOp::Cmp)
    }

    fn apply8(self, a: u8, b: u8, flags_in: Flags) -> (u8, Flags) {
        let carry_in = flags_in.contains(Flags::CF) as u8;
        match self {
            ArithOp::Add => alu::add8(a, b, 0, flags_in),
            ArithOp::Or => alu::or8(a, b, flags_in),
            ArithOp::Adc => alu::add8(a, b, carry_in, flags_in),
            ArithOp::Sbb => alu::sub8(a, b, carry_in, flags_in),
            ArithOp::And => alu::and8(a, b, flags_in),
            ArithOp::Sub => alu::sub8(a, b, 0, flags_in),
            ArithOp::Xor => alu::xor8(a, b, flags_in),
            ArithOp::Cmp => alu::sub8(a, b, 0, flags_in),
        }
    }

    fn apply16(self, a: u16, b: u16, flags_in: Flags) -> (u16, Flags) {
        let carry_in = flags_in.contains(Flags::CF) as u16;
        match self {
            ArithOp::Add => alu::add16(a, b, 0, flags_in),
            ArithOp::Or => alu::or16(a, b, flags_in),
            ArithOp::Adc => alu::add16(a, b, carry_in, flags_in),
            ArithOp::Sbb => alu::sub16(a, b, carry_in, flags_in),
            ArithOp::And => alu::and16(a, b, flags_in),
            ArithOp::Sub => alu::sub16(a, b, 0, flags_in),
            ArithOp::Xor => alu::xor16(a, b, flags_in),
            ArithOp::Cmp => alu::sub16(a, b, 0, flags_in),
        }
    }
}

impl Executor {
    /// `rm8, r8` / `rm16, r16` forms (opcode low 3 bits == 0 or 1): ModR/M's
    /// r/m is both operand and destination, reg is the other operand.
    pub fn arith_rm_r8(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, op: ArithOp) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let a = modrm.get_rm8(cpu, mem, &mut self.recorder);
        let b = modrm.get_reg8(cpu);
        let (result, flags) = op.apply8(a, b, cpu.flags);
        cpu.flags = flags;
        if op.writes_back() {
            modrm.set_rm8(cpu, mem, result, &mut self.recorder);
        }
        Ok(())
    }

    pub fn arith_rm_r16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, op: ArithOp) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let a = modrm.get_rm16(cpu, mem, &mut self.recorder);
        let b = modrm.get_reg16(cpu);
        let (result, flags) = op.apply16(a, b, cpu.flags);
        cpu.flags = flags;
        if op.writes_back() {
            modrm.set_rm16(cpu, mem, result, &mut self.recorder);
        }
        Ok(())
    }

    /// `r8, rm8` / `r16, rm16` forms (opcode low 3 bits == 2 or 3): ModR/M's
    /// reg is both operand and destination.
    pub fn arith_r_rm8(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, op: ArithOp) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let a = modrm.get_reg8(cpu);
        let b = modrm.get_rm8(cpu, mem, &mut self.recorder);
        let (result, flags) = op.apply8(a, b, cpu.flags);
        cpu.flags = flags;
        if op.writes_back() {
            modrm.set_reg8(cpu, result);
        }
        Ok(())
    }

    pub fn arith_r_rm16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, op: ArithOp) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let a = modrm.get_reg16(cpu);
        let b = modrm.get_rm16(cpu, mem, &mut self.recorder);
        let (result, flags) = op.apply16(a, b, cpu.flags);
        cpu.flags = flags;
        if op.writes_back() {
            modrm.set_reg16(cpu, result);
        }
        Ok(())
    }

    /// `AL, imm8` / `AX, imm16` forms (opcode low 3 bits == 4 or 5).
    pub fn arith_acc_imm8(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus, op: ArithOp) -> Result<(), CpuError> {
        let imm = cpu.fetch_u8(mem);
        let a = cpu.read_reg8(0);
        let (result, flags) = op.apply8(a, imm, cpu.flags);
        cpu.flags = flags;
        if op.writes_back() {
            cpu.write_reg8(0, result);
        }
        Ok(())
    }

    pub fn arith_acc_imm16(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus, op: ArithOp) -> Result<(), CpuError> {
        let imm = cpu.fetch_u16(mem);
        let a = cpu.read_reg16(0);
        let (result, flags) = op.apply16(a, imm, cpu.flags);
        cpu.flags = flags;
        if op.writes_back() {
            cpu.write_reg16(0, result);
        }
        Ok(())
    }

    /// Group 1 (0x80-0x83): immediate form. `opcode` selects whether the
    /// operand is byte/word and whether a word-size immediate is a raw word
    /// (0x81) or a sign-extended byte (0x83); 0x80/0x82 are always byte-wide
    /// and read a single immediate byte.
    pub fn group1(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, opcode: u8) -> Result<(), CpuError> {
        let is_byte = opcode == 0x80 || opcode == 0x82;
        let sign_extend_imm8 = opcode == 0x83;
        let modrm = ModRm::fetch(cpu, mem);
        let op = ArithOp::from_reg_field(modrm.reg);

        if is_byte {
            let imm = cpu.fetch_u8(mem);
            let a = modrm.get_rm8(cpu, mem, &mut self.recorder);
            let (result, flags) = op.apply8(a, imm, cpu.flags);
            cpu.flags = flags;
            if op.writes_back() {
                modrm.set_rm8(cpu, mem, result, &mut self.recorder);
            }
        } else {
            let imm: u16 = if sign_extend_imm8 {
                cpu.fetch_i8(mem) as i16 as u16
            } else {
                cpu.fetch_u16(mem)
            };
            let a = modrm.get_rm16(cpu, mem, &mut self.recorder);
            let (result, flags) = op.apply16(a, imm, cpu.flags);
            cpu.flags = flags;
            if op.writes_back() {
                modrm.set_rm16(cpu, mem, result, &mut self.recorder);
            }
        }
        Ok(())
    }

    pub fn inc_reg16(&mut self, cpu: &mut Cpu, reg: u8) -> Result<(), CpuError> {
        let value = cpu.read_reg16(reg);
        let (result, flags) = alu::inc16(value, cpu.flags);
        cpu.flags = flags;
        cpu.write_reg16(reg, result);
        Ok(())
    }

    pub fn dec_reg16(&mut self, cpu: &mut Cpu, reg: u8) -> Result<(), CpuError> {
        let value = cpu.read_reg16(reg);
        let (result, flags) = alu::dec16(value, cpu.flags);
        cpu.flags = flags;
        cpu.write_reg16(reg, result);
        Ok(())
    }

    pub fn inc_rm8(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, modrm: &ModRm) -> Result<(), CpuError> {
        let value = modrm.get_rm8(cpu, mem, &mut self.recorder);
        let (result, flags) = alu::inc8(value, cpu.flags);
        cpu.flags = flags;
        modrm.set_rm8(cpu, mem, result, &mut self.recorder);
        Ok(())
    }

    pub fn dec_rm8(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, modrm: &ModRm) -> Result<(), CpuError> {
        let value = modrm.get_rm8(cpu, mem, &mut self.recorder);
        let (result, flags) = alu::dec8(value, cpu.flags);
        cpu.flags = flags;
        modrm.set_rm8(cpu, mem, result, &mut self.recorder);
        Ok(())
    }

    pub fn inc_rm16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, modrm: &ModRm) -> Result<(), CpuError> {
        let value = modrm.get_rm16(cpu, mem, &mut self.recorder);
        let (result, flags) = alu::inc16(value, cpu.flags);
        cpu.flags = flags;
        modrm.set_rm16(cpu, mem, result, &mut self.recorder);
        Ok(())
    }

    pub fn dec_rm16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, modrm: &ModRm) -> Result<(), CpuError> {
        let value = modrm.get_rm16(cpu, mem, &mut self.recorder);
        let (result, flags) = alu::dec16(value, cpu.flags);
        cpu.flags = flags;
        modrm.set_rm16(cpu, mem, result, &mut self.recorder);
        Ok(())
    }

    /// Group 3 (0xF6/0xF7): TEST/NOT/NEG/MUL/IMUL/DIV/IDIV, selected by the
    /// ModR/M reg field. Sub-index 1 is reserved (spec §9(b): fail rather
    /// than silently falling through).
    pub fn group3(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, opcode: u8, is_byte: bool) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        match modrm.reg {
            0 => {
                if is_byte {
                    let imm = cpu.fetch_u8(mem);
                    let a = modrm.get_rm8(cpu, mem, &mut self.recorder);
                    let (_, flags) = alu::test8(a, imm, cpu.flags);
                    cpu.flags = flags;
                } else {
                    let imm = cpu.fetch_u16(mem);
                    let a = modrm.get_rm16(cpu, mem, &mut self.recorder);
                    let (_, flags) = alu::test16(a, imm, cpu.flags);
                    cpu.flags = flags;
                }
                Ok(())
            }
            1 => {
                let at = self.current_instruction_start;
                self.invalid_group_index(opcode, 1, at)
            }
            2 => {
                if is_byte {
                    let a = modrm.get_rm8(cpu, mem, &mut self.recorder);
                    modrm.set_rm8(cpu, mem, !a, &mut self.recorder);
                } else {
                    let a = modrm.get_rm16(cpu, mem, &mut self.recorder);
                    modrm.set_rm16(cpu, mem, !a, &mut self.recorder);
                }
                Ok(())
            }
            3 => {
                if is_byte {
                    let a = modrm.get_rm8(cpu, mem, &mut self.recorder);
                    let (result, flags) = alu::neg8(a, cpu.flags);
                    cpu.flags = flags;
                    modrm.set_rm8(cpu, mem, result, &mut self.recorder);
                } else {
                    let a = modrm.get_rm16(cpu, mem, &mut self.recorder);
                    let (result, flags) = alu::neg16(a, cpu.flags);
                    cpu.flags = flags;
                    modrm.set_rm16(cpu, mem, result, &mut self.recorder);
                }
                Ok(())
            }
            4 => self.mul(cpu, mem, &modrm, is_byte),
            5 => self.imul(cpu, mem, &modrm, is_byte),
            6 => self.div(cpu, mem, &modrm, is_byte),
            _ => self.idiv(cpu, mem, &modrm, is_byte),
        }
    }

    fn mul(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, modrm: &ModRm, is_byte: bool) -> Result<(), CpuError> {
        if is_byte {
            let al = cpu.read_reg8(0);
            let b = modrm.get_rm8(cpu, mem, &mut self.recorder);
            let (product, flags) = alu::mul8(al, b, cpu.flags);
            cpu.flags = flags;
            cpu.write_reg16(0, product);
        } else {
            let ax = cpu.read_reg16(0);
            let b = modrm.get_rm16(cpu, mem, &mut self.recorder);
            let (dx, ax_out, flags) = alu::mul16(ax, b, cpu.flags);
            cpu.flags = flags;
            cpu.write_reg16(0, ax_out);
            cpu.write_reg16(2, dx);
        }
        Ok(())
    }

    fn imul(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, modrm: &ModRm, is_byte: bool) -> Result<(), CpuError> {
        if is_byte {
            let al = cpu.read_reg8(0) as i8;
            let b = modrm.get_rm8(cpu, mem, &mut self.recorder) as i8;
            let (product, flags) = alu::imul8(al, b, cpu.flags);
            cpu.flags = flags;
            cpu.write_reg16(0, product);
        } else {
            let ax = cpu.read_reg16(0) as i16;
            let b = modrm.get_rm16(cpu, mem, &mut self.recorder) as i16;
            let (dx, ax_out, flags) = alu::imul16(ax, b, cpu.flags);
            cpu.flags = flags;
            cpu.write_reg16(0, ax_out);
            cpu.write_reg16(2, dx);
        }
        Ok(())
    }

    /// DIV faults (divide-by-zero or quotient overflow) restart the
    /// instruction and dispatch `INT 0` rather than returning an error to
    /// the caller (spec §4.2, §4.7).
    fn div(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, modrm: &ModRm, is_byte: bool) -> Result<(), CpuError> {
        if is_byte {
            let dividend = cpu.read_reg16(0);
            let divisor = modrm.get_rm8(cpu, mem, &mut self.recorder);
            match alu::div8(dividend, divisor) {
                Some((quotient, remainder)) => {
                    cpu.write_reg8(0, quotient);
                    cpu.write_reg8(4, remainder);
                    Ok(())
                }
                None => self.fault_restart_and_interrupt(cpu, mem),
            }
        } else {
            let dividend = ((cpu.read_reg16(2) as u32) << 16) | cpu.read_reg16(0) as u32;
            let divisor = modrm.get_rm16(cpu, mem, &mut self.recorder);
            match alu::div16(dividend, divisor) {
                Some((quotient, remainder)) => {
                    cpu.write_reg16(0, quotient);
                    cpu.write_reg16(2, remainder);
                    Ok(())
                }
                None => self.fault_restart_and_interrupt(cpu, mem),
            }
        }
    }

    /// TEST Eb,Gb / Ev,Gv (0x84/0x85): AND without writeback, register form.
    pub fn test_rm_r8(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let a = modrm.get_rm8(cpu, mem, &mut self.recorder);
        let b = modrm.get_reg8(cpu);
        let (_, flags) = alu::test8(a, b, cpu.flags);
        cpu.flags = flags;
        Ok(())
    }

    pub fn test_rm_r16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let a = modrm.get_rm16(cpu, mem, &mut self.recorder);
        let b = modrm.get_reg16(cpu);
        let (_, flags) = alu::test16(a, b, cpu.flags);
        cpu.flags = flags;
        Ok(())
    }

    /// TEST AL,Ib / AX,Iv (0xA8/0xA9).
    pub fn test_acc_imm8(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let imm = cpu.fetch_u8(mem);
        let a = cpu.read_reg8(0);
        let (_, flags) = alu::test8(a, imm, cpu.flags);
        cpu.flags = flags;
        Ok(())
    }

    pub fn test_acc_imm16(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let imm = cpu.fetch_u16(mem);
        let a = cpu.read_reg16(0);
        let (_, flags) = alu::test16(a, imm, cpu.flags);
        cpu.flags = flags;
        Ok(())
    }

    fn idiv(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, modrm: &ModRm, is_byte: bool) -> Result<(), CpuError> {
        if is_byte {
            let dividend = cpu.read_reg16(0) as i16;
            let divisor = modrm.get_rm8(cpu, mem, &mut self.recorder) as i8;
            match alu::idiv8(dividend, divisor) {
                Some((quotient, remainder)) => {
                    cpu.write_reg8(0, quotient);
                    cpu.write_reg8(4, remainder);
                    Ok(())
                }
                None => self.fault_restart_and_interrupt(cpu, mem),
            }
        } else {
            let dividend = (((cpu.read_reg16(2) as u32) << 16) | cpu.read_reg16(0) as u32) as i32;
            let divisor = modrm.get_rm16(cpu, mem, &mut self.recorder) as i16;
            match alu::idiv16(dividend, divisor) {
                Some((quotient, remainder)) => {
                    cpu.write_reg16(0, quotient);
                    cpu.write_reg16(2, remainder);
                    Ok(())
                }
                None => self.fault_restart_and_interrupt(cpu, mem),
            }
        }
    }
}
