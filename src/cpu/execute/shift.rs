//! Group 2: ROL/ROR/RCL/RCR/SHL/SHR/SAR (spec §4.2, §4.4).

use crate::cpu::alu;
use crate::cpu::decode::ModRm;
use crate::cpu::executor::Executor;
use crate::cpu::state::Cpu;
use crate::error::CpuError;
use crate::memory::MemoryBus;

impl Executor {
    /// Group 2 (0xD0-0xD3): bit 1 of the opcode selects CL as the count
    /// source (else a fixed count of 1); bit 0 selects byte vs word. Shift
    /// counts are masked per spec §4.2 (5 bits on 80186+, effectively 9 for
    /// 8-bit through-carry rotates): this core masks 8-bit rol/ror by 0x07,
    /// 16-bit rol/ror by 0x0F, and rcl/rcr by 0x1F before the rotate-through
    /// loop, matching the 80186+ masking policy.
    pub fn group2(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus, opcode: u8) -> Result<(), CpuError> {
        let is_byte = opcode & 1 == 0;
        let count_from_cl = opcode & 0b10 != 0;
        let modrm = ModRm::fetch(cpu, mem);
        let count = if count_from_cl {
            cpu.read_reg8(1) & 0x1F
        } else {
            1
        };

        if is_byte {
            let a = modrm.get_rm8(cpu, mem, &mut self.recorder);
            let (result, flags) = match modrm.reg {
                0 => alu::rol8(a, count & 0x07, cpu.flags),
                1 => alu::ror8(a, count & 0x07, cpu.flags),
                2 => alu::rcl8(a, count, cpu.flags),
                3 => alu::rcr8(a, count, cpu.flags),
                4 | 6 => alu::shl8(a, count, cpu.flags),
                5 => alu::shr8(a, count, cpu.flags),
                _ => alu::sar8(a, count, cpu.flags),
            };
            cpu.flags = flags;
            modrm.set_rm8(cpu, mem, result, &mut self.recorder);
        } else {
            let a = modrm.get_rm16(cpu, mem, &mut self.recorder);
            let (result, flags) = match modrm.reg {
                0 => alu::rol16(a, count & 0x0F, cpu.flags),
                1 => alu::ror16(a, count & 0x0F, cpu.flags),
                2 => alu::rcl16(a, count, cpu.flags),
                3 => alu::rcr16(a, count, cpu.flags),
                4 | 6 => alu::shl16(a, count, cpu.flags),
                5 => alu::shr16(a, count, cpu.flags),
                _ => alu::sar16(a, count, cpu.flags),
            };
            cpu.flags = flags;
            modrm.set_rm16(cpu, mem, result, &mut self.recorder);
        }
        Ok(())
    }
}
