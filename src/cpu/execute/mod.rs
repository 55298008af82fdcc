//! Instruction execution handlers.
//!
//! Each handler is a method on `Executor`, grouped into the files below by
//! instruction family. `dispatch` is the single big match from opcode byte
//! to handler (spec §4.4 step 4, §9); prefix bytes never reach it, having
//! already been folded by `Executor::fold_prefixes`.
//!
//! The teacher's `logic.rs`/`prefix.rs`/`stack.rs` handlers were written
//! against the dropped decode-cache types (`DecodedInstruction`, `Operand`,
//! `RepeatPrefix`) and are not linked in here; AND/OR/XOR/TEST now live in
//! `arithmetic.rs` alongside the rest of Group 1/3, prefix folding lives in
//! `Executor::fold_prefixes`, and stack push/pop live in `cpu::stack`.

pub mod arithmetic;
pub mod control_flow;
pub mod data_transfer;
pub mod flags;
pub mod handlers;
pub mod io;
pub mod shift;
pub mod string;

use crate::cpu::executor::Executor;
use crate::cpu::state::{Cpu, SegmentedAddress, SEG_CS, SEG_DS, SEG_ES, SEG_SS};
use crate::error::CpuError;
use crate::memory::MemoryBus;
use arithmetic::ArithOp;

pub fn dispatch(
    executor: &mut Executor,
    cpu: &mut Cpu,
    mem: &mut dyn MemoryBus,
    opcode: u8,
    instruction_start: SegmentedAddress,
) -> Result<(), CpuError> {
    let after_prefix = executor.current_after_prefix;
    match opcode {
        // ADD/OR/ADC/SBB/AND/SUB/XOR/CMP, 0x00-0x3D. Each group of eight
        // opcodes covers one ArithOp; low 3 bits select the operand form.
        0x00..=0x3D if opcode & 0x07 <= 5 && (opcode >> 3) <= 7 => {
            let op = ArithOp::from_reg_field(opcode >> 3);
            match opcode & 0x07 {
                0 => executor.arith_rm_r8(cpu, mem, op),
                1 => executor.arith_rm_r16(cpu, mem, op),
                2 => executor.arith_r_rm8(cpu, mem, op),
                3 => executor.arith_r_rm16(cpu, mem, op),
                4 => executor.arith_acc_imm8(cpu, mem, op),
                _ => executor.arith_acc_imm16(cpu, mem, op),
            }
        }

        0x06 => executor.push_segreg(cpu, mem, SEG_ES),
        0x07 => executor.pop_segreg(cpu, mem, SEG_ES),
        0x0E => executor.push_segreg(cpu, mem, SEG_CS),
        0x16 => executor.push_segreg(cpu, mem, SEG_SS),
        0x17 => executor.pop_segreg(cpu, mem, SEG_SS),
        0x1E => executor.push_segreg(cpu, mem, SEG_DS),
        0x1F => executor.pop_segreg(cpu, mem, SEG_DS),

        // Two-byte escape, BCD adjusts, 80186+ convenience forms: out of
        // scope for this core.
        0x0F | 0x27 | 0x2F | 0x37 | 0x3F | 0xD4 | 0xD5 | 0xD6 | 0x60..=0x63 | 0x68..=0x6B | 0xC0 | 0xC1 | 0xC8
        | 0xC9 => executor.invalid_opcode(opcode, instruction_start, after_prefix),

        0x40..=0x47 => executor.inc_reg16(cpu, opcode & 0x07),
        0x48..=0x4F => executor.dec_reg16(cpu, opcode & 0x07),

        0x50..=0x57 => executor.push_r16(cpu, mem, opcode & 0x07),
        0x58..=0x5F => executor.pop_r16(cpu, mem, opcode & 0x07),

        0x6C => executor.insb(cpu, mem),
        0x6D => executor.insw(cpu, mem),
        0x6E => executor.outsb(cpu, mem),
        0x6F => executor.outsw(cpu, mem),

        0x70..=0x7F => executor.jcc(cpu, mem, opcode),

        0x80..=0x83 => executor.group1(cpu, mem, opcode),

        0x84 => executor.test_rm_r8(cpu, mem),
        0x85 => executor.test_rm_r16(cpu, mem),
        0x86 => executor.xchg_rm8_r8(cpu, mem),
        0x87 => executor.xchg_rm16_r16(cpu, mem),

        0x88 => executor.mov_rm8_r8(cpu, mem),
        0x89 => executor.mov_rm16_r16(cpu, mem),
        0x8A => executor.mov_r8_rm8(cpu, mem),
        0x8B => executor.mov_r16_rm16(cpu, mem),
        0x8C => executor.mov_rm16_segreg(cpu, mem),
        0x8D => executor.lea(cpu, mem),
        0x8E => executor.mov_segreg_rm16(cpu, mem),
        0x8F => executor.pop_rm16_group(cpu, mem),

        0x90 => executor.nop(cpu, mem),
        0x91..=0x97 => executor.xchg_ax_r16(cpu, opcode & 0x07),

        0x98 => executor.cbw(cpu),
        0x99 => executor.cwd(cpu),
        0x9A => executor.call_far(cpu, mem),
        0x9B => executor.wait(cpu, mem),
        0x9C => executor.pushf(cpu, mem),
        0x9D => executor.popf(cpu, mem),
        0x9E => executor.sahf(cpu),
        0x9F => executor.lahf(cpu),

        0xA0 => executor.mov_acc8_moffs(cpu, mem),
        0xA1 => executor.mov_acc16_moffs(cpu, mem),
        0xA2 => executor.mov_moffs8_acc(cpu, mem),
        0xA3 => executor.mov_moffs16_acc(cpu, mem),
        0xA4 => executor.movsb(cpu, mem),
        0xA5 => executor.movsw(cpu, mem),
        0xA6 => executor.cmpsb(cpu, mem),
        0xA7 => executor.cmpsw(cpu, mem),
        0xA8 => executor.test_acc_imm8(cpu, mem),
        0xA9 => executor.test_acc_imm16(cpu, mem),
        0xAA => executor.stosb(cpu, mem),
        0xAB => executor.stosw(cpu, mem),
        0xAC => executor.lodsb(cpu, mem),
        0xAD => executor.lodsw(cpu, mem),
        0xAE => executor.scasb(cpu, mem),
        0xAF => executor.scasw(cpu, mem),

        0xB0..=0xB7 => executor.mov_r8_imm8(cpu, mem, opcode & 0x07),
        0xB8..=0xBF => executor.mov_r16_imm16(cpu, mem, opcode & 0x07),

        0xC2 => executor.ret_near_imm(cpu, mem),
        0xC3 => executor.ret_near(cpu, mem),
        0xC4 => executor.load_far_pointer(cpu, mem, SEG_ES),
        0xC5 => executor.load_far_pointer(cpu, mem, SEG_DS),
        0xC6 => executor.mov_rm8_imm8(cpu, mem),
        0xC7 => executor.mov_rm16_imm16(cpu, mem),

        0xCA => executor.ret_far_imm(cpu, mem),
        0xCB => executor.ret_far(cpu, mem),
        0xCC => executor.int3(cpu, mem),
        0xCD => executor.int_imm8(cpu, mem),
        0xCE => executor.into_(cpu, mem),
        0xCF => {
            executor.iret(cpu, mem);
            Ok(())
        }

        0xD0..=0xD3 => executor.group2(cpu, mem, opcode),
        0xD7 => executor.xlat(cpu, mem),
        0xD8..=0xDF => executor.x87_escape(cpu, mem),

        0xE0 => executor.loopne(cpu, mem),
        0xE1 => executor.loope(cpu, mem),
        0xE2 => executor.loop_rel8(cpu, mem),
        0xE3 => executor.jcxz(cpu, mem),

        0xE4 => executor.in_al_imm8(cpu, mem),
        0xE5 => executor.in_ax_imm8(cpu, mem),
        0xE6 => executor.out_imm8_al(cpu, mem),
        0xE7 => executor.out_imm8_ax(cpu, mem),

        0xE8 => executor.call_near(cpu, mem),
        0xE9 => executor.jmp_near(cpu, mem),
        0xEA => executor.jmp_far(cpu, mem),
        0xEB => executor.jmp_short(cpu, mem),

        0xEC => executor.in_al_dx(cpu, mem),
        0xED => executor.in_ax_dx(cpu, mem),
        0xEE => executor.out_dx_al(cpu, mem),
        0xEF => executor.out_dx_ax(cpu, mem),

        0xF1 => executor.invalid_opcode(opcode, instruction_start, after_prefix),
        0xF4 => executor.hlt(cpu, mem),
        0xF5 => executor.cmc(cpu, mem),
        0xF6 => executor.group3(cpu, mem, opcode, true),
        0xF7 => executor.group3(cpu, mem, opcode, false),
        0xF8 => executor.clc(cpu, mem),
        0xF9 => executor.stc(cpu, mem),
        0xFA => executor.cli(cpu, mem),
        0xFB => executor.sti(cpu, mem),
        0xFC => executor.cld(cpu, mem),
        0xFD => executor.std(cpu, mem),
        0xFE => executor.group4(cpu, mem),
        0xFF => executor.group5(cpu, mem),

        _ => executor.invalid_opcode(opcode, instruction_start, after_prefix),
    }
}
