//! JMP, Jcc, LOOP family, CALL/RET (near/far, direct/indirect), INT/INTO/IRET,
//! HLT, and Group 5 (0xFF).

use crate::cpu::decode::ModRm;
use crate::cpu::executor::Executor;
use crate::cpu::function_handler::CallType;
use crate::cpu::stack;
use crate::cpu::state::{Cpu, Flags, SegmentedAddress, SEG_CS};
use crate::error::CpuError;
use crate::memory::MemoryBus;

impl Executor {
    fn jump_rel8(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus, take: bool) {
        let rel = cpu.fetch_i8(mem);
        if take {
            cpu.ip = cpu.ip.wrapping_add(rel as i16 as u16);
        }
    }

    pub fn jmp_short(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        self.jump_rel8(cpu, mem, true);
        Ok(())
    }

    pub fn jmp_near(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let rel = cpu.fetch_i16(mem);
        cpu.ip = cpu.ip.wrapping_add(rel as u16);
        Ok(())
    }

    /// JMP far direct (0xEA): new CS:IP loaded straight from the instruction
    /// stream, no ModR/M byte.
    pub fn jmp_far(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let offset = cpu.fetch_u16(mem);
        let segment = cpu.fetch_u16(mem);
        cpu.ip = offset;
        cpu.write_seg(SEG_CS, segment);
        Ok(())
    }

    /// Opcodes 0x70-0x7F: conditional jump on rel8, one per flag test.
    pub fn jcc(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus, opcode: u8) -> Result<(), CpuError> {
        let f = cpu.flags;
        let take = match opcode & 0x0F {
            0x0 => f.contains(Flags::OF),
            0x1 => !f.contains(Flags::OF),
            0x2 => f.contains(Flags::CF),
            0x3 => !f.contains(Flags::CF),
            0x4 => f.contains(Flags::ZF),
            0x5 => !f.contains(Flags::ZF),
            0x6 => f.contains(Flags::CF) || f.contains(Flags::ZF),
            0x7 => !f.contains(Flags::CF) && !f.contains(Flags::ZF),
            0x8 => f.contains(Flags::SF),
            0x9 => !f.contains(Flags::SF),
            0xA => f.contains(Flags::PF),
            0xB => !f.contains(Flags::PF),
            0xC => f.contains(Flags::SF) != f.contains(Flags::OF),
            0xD => f.contains(Flags::SF) == f.contains(Flags::OF),
            0xE => f.contains(Flags::ZF) || (f.contains(Flags::SF) != f.contains(Flags::OF)),
            _ => !f.contains(Flags::ZF) && (f.contains(Flags::SF) == f.contains(Flags::OF)),
        };
        self.jump_rel8(cpu, mem, take);
        Ok(())
    }

    /// JCXZ (0xE3): jump if CX=0.
    pub fn jcxz(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let take = cpu.read_reg16(1) == 0;
        self.jump_rel8(cpu, mem, take);
        Ok(())
    }

    /// LOOP (0xE2): CX ← CX−1; jump while CX≠0.
    pub fn loop_rel8(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let cx = cpu.read_reg16(1).wrapping_sub(1);
        cpu.write_reg16(1, cx);
        self.jump_rel8(cpu, mem, cx != 0);
        Ok(())
    }

    /// LOOPE/LOOPZ (0xE1): CX ← CX−1; jump while CX≠0 && ZF=1.
    pub fn loope(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let cx = cpu.read_reg16(1).wrapping_sub(1);
        cpu.write_reg16(1, cx);
        self.jump_rel8(cpu, mem, cx != 0 && cpu.flags.contains(Flags::ZF));
        Ok(())
    }

    /// LOOPNE/LOOPNZ (0xE0): CX ← CX−1; jump while CX≠0 && ZF=0.
    pub fn loopne(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let cx = cpu.read_reg16(1).wrapping_sub(1);
        cpu.write_reg16(1, cx);
        self.jump_rel8(cpu, mem, cx != 0 && !cpu.flags.contains(Flags::ZF));
        Ok(())
    }

    /// CALL near relative (0xE8).
    pub fn call_near(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let rel = cpu.fetch_i16(mem);
        let caller = self.current_instruction_start;
        let target_ip = cpu.ip.wrapping_add(rel as u16);
        let callee = SegmentedAddress::new(cpu.read_seg(SEG_CS), target_ip);
        let return_site = SegmentedAddress::new(cpu.read_seg(SEG_CS), cpu.ip);
        let return_ip = cpu.ip;
        self.perform_call(cpu, mem, CallType::Near, caller, callee, return_site, |cpu, mem| {
            stack::push16(cpu, mem, return_ip);
        });
        Ok(())
    }

    /// CALL far direct (0x9A).
    pub fn call_far(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let caller = self.current_instruction_start;
        let new_ip = cpu.fetch_u16(mem);
        let new_cs = cpu.fetch_u16(mem);
        let callee = SegmentedAddress::new(new_cs, new_ip);
        let return_site = SegmentedAddress::new(cpu.read_seg(SEG_CS), cpu.ip);
        let return_cs = cpu.read_seg(SEG_CS);
        let return_ip = cpu.ip;
        self.perform_call(cpu, mem, CallType::Far, caller, callee, return_site, |cpu, mem| {
            stack::push16(cpu, mem, return_cs);
            stack::push16(cpu, mem, return_ip);
        });
        Ok(())
    }

    fn call_rm16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, modrm: &ModRm) -> Result<(), CpuError> {
        let caller = self.current_instruction_start;
        let target_ip = modrm.get_rm16(cpu, mem, &mut self.recorder);
        let callee = SegmentedAddress::new(cpu.read_seg(SEG_CS), target_ip);
        let return_site = SegmentedAddress::new(cpu.read_seg(SEG_CS), cpu.ip);
        let return_ip = cpu.ip;
        self.perform_call(cpu, mem, CallType::Near, caller, callee, return_site, |cpu, mem| {
            stack::push16(cpu, mem, return_ip);
        });
        Ok(())
    }

    fn call_m16_16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, modrm: &ModRm) -> Result<(), CpuError> {
        let caller = self.current_instruction_start;
        let at = self.current_instruction_start;
        let Some(addr) = modrm.get_memory_address(cpu) else {
            return self.invalid_opcode(0xFF, at, self.current_after_prefix);
        };
        let new_ip = cpu.read_mem16(mem, addr);
        let new_cs = cpu.read_mem16(mem, SegmentedAddress::new(addr.segment, addr.offset.wrapping_add(2)));
        let callee = SegmentedAddress::new(new_cs, new_ip);
        let return_site = SegmentedAddress::new(cpu.read_seg(SEG_CS), cpu.ip);
        let return_cs = cpu.read_seg(SEG_CS);
        let return_ip = cpu.ip;
        self.perform_call(cpu, mem, CallType::Far, caller, callee, return_site, |cpu, mem| {
            stack::push16(cpu, mem, return_cs);
            stack::push16(cpu, mem, return_ip);
        });
        Ok(())
    }

    fn jmp_rm16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, modrm: &ModRm) -> Result<(), CpuError> {
        cpu.ip = modrm.get_rm16(cpu, mem, &mut self.recorder);
        Ok(())
    }

    fn jmp_m16_16(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, modrm: &ModRm) -> Result<(), CpuError> {
        let at = self.current_instruction_start;
        let Some(addr) = modrm.get_memory_address(cpu) else {
            return self.invalid_opcode(0xFF, at, self.current_after_prefix);
        };
        let new_ip = cpu.read_mem16(mem, addr);
        let new_cs = cpu.read_mem16(mem, SegmentedAddress::new(addr.segment, addr.offset.wrapping_add(2)));
        cpu.ip = new_ip;
        cpu.write_seg(SEG_CS, new_cs);
        Ok(())
    }

    /// Group 5 (0xFF): INC/DEC/CALL/JMP/PUSH r/m16, dispatched on the ModR/M
    /// reg field. Sub-index 7 is undefined on real hardware.
    pub fn group5(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let at = self.current_instruction_start;
        match modrm.reg {
            0 => self.inc_rm16(cpu, mem, &modrm),
            1 => self.dec_rm16(cpu, mem, &modrm),
            2 => self.call_rm16(cpu, mem, &modrm),
            3 => self.call_m16_16(cpu, mem, &modrm),
            4 => self.jmp_rm16(cpu, mem, &modrm),
            5 => self.jmp_m16_16(cpu, mem, &modrm),
            6 => self.push_rm16(cpu, mem, &modrm),
            _ => self.invalid_group_index(0xFF, modrm.reg, at),
        }
    }

    /// Group 4 (0xFE): INC/DEC r/m8, plus the emulator-specific callback
    /// sequence `FE 38 <imm16>` (sub-index 7, spec §6).
    pub fn group4(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let modrm = ModRm::fetch(cpu, mem);
        let at = self.current_instruction_start;
        match modrm.reg {
            0 => self.inc_rm8(cpu, mem, &modrm),
            1 => self.dec_rm8(cpu, mem, &modrm),
            7 => {
                let index = cpu.fetch_u16(mem);
                if let Some(mut host) = self.native_host.take() {
                    host.run(index, cpu, mem);
                    self.native_host = Some(host);
                } else {
                    log::warn!("callback {index:#06x} invoked with no native host installed");
                }
                Ok(())
            }
            _ => self.invalid_group_index(0xFE, modrm.reg, at),
        }
    }

    pub fn ret_near(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let ip = stack::pop16(cpu, mem);
        let return_site = SegmentedAddress::new(cpu.read_seg(SEG_CS), ip);
        cpu.ip = ip;
        self.active_functions().ret(return_site);
        Ok(())
    }

    pub fn ret_near_imm(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let imm = cpu.fetch_u16(mem);
        let ip = stack::pop16(cpu, mem);
        let return_site = SegmentedAddress::new(cpu.read_seg(SEG_CS), ip);
        cpu.ip = ip;
        cpu.write_reg16(4, cpu.read_reg16(4).wrapping_add(imm));
        self.active_functions().ret(return_site);
        Ok(())
    }

    pub fn ret_far(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let ip = stack::pop16(cpu, mem);
        let cs = stack::pop16(cpu, mem);
        cpu.ip = ip;
        cpu.write_seg(SEG_CS, cs);
        let return_site = SegmentedAddress::new(cs, ip);
        self.active_functions().ret(return_site);
        Ok(())
    }

    pub fn ret_far_imm(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> Result<(), CpuError> {
        let imm = cpu.fetch_u16(mem);
        let ip = stack::pop16(cpu, mem);
        let cs = stack::pop16(cpu, mem);
        cpu.ip = ip;
        cpu.write_seg(SEG_CS, cs);
        cpu.write_reg16(4, cpu.read_reg16(4).wrapping_add(imm));
        let return_site = SegmentedAddress::new(cs, ip);
        self.active_functions().ret(return_site);
        Ok(())
    }

    /// INT3 (0xCC): one-byte breakpoint interrupt, vector 3.
    pub fn int3(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        self.interrupt(cpu, mem, 3, false)
    }

    /// INT imm8 (0xCD).
    pub fn int_imm8(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let vector = cpu.fetch_u8(mem);
        self.interrupt(cpu, mem, vector, false)
    }

    /// INTO (0xCE): INT 4 if OF=1, else a no-op.
    pub fn into_(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        if cpu.flags.contains(Flags::OF) {
            self.interrupt(cpu, mem, 4, false)
        } else {
            Ok(())
        }
    }

    /// HLT (0xF4): stop fetching until an interrupt arrives.
    pub fn hlt(&mut self, cpu: &mut Cpu, _mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        cpu.halted = true;
        Ok(())
    }
}
