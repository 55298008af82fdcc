//! Logical operation tests (AND/OR/XOR/TEST/NOT, part of Group 1/3's ArithOp set)

use core8086::cpu::state::Flags;
use core8086::cpu::CpuHarness;

#[test]
fn test_and_r8_imm_clears_cf_of() {
    let mut harness = CpuHarness::new();
    harness.load_program(&[0xB0, 0xFF, 0x24, 0x0F], 0); // MOV AL, 0xFF; AND AL, 0x0F

    harness.step_n(2).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0x0F);
    assert!(!harness.cpu.flags.contains(Flags::CF));
    assert!(!harness.cpu.flags.contains(Flags::OF));
}

#[test]
fn test_and_zero_result_sets_zf() {
    let mut harness = CpuHarness::new();
    harness.load_program(&[0xB0, 0x0F, 0x24, 0xF0], 0); // MOV AL, 0x0F; AND AL, 0xF0

    harness.step_n(2).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0x00);
    assert!(harness.cpu.flags.contains(Flags::ZF));
}

#[test]
fn test_and_sign_flag() {
    let mut harness = CpuHarness::new();
    harness.load_program(&[0xB0, 0xFF, 0x24, 0x80], 0); // MOV AL, 0xFF; AND AL, 0x80

    harness.step_n(2).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0x80);
    assert!(harness.cpu.flags.contains(Flags::SF));
}

#[test]
fn test_and_parity_flag() {
    let mut harness = CpuHarness::new();
    harness.load_program(&[0xB0, 0xFF, 0x24, 0x03], 0); // MOV AL, 0xFF; AND AL, 0x03

    harness.step_n(2).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0x03);
    assert!(harness.cpu.flags.contains(Flags::PF)); // two bits set: even parity
}

#[test]
fn test_or_rm_r8() {
    let mut harness = CpuHarness::new();
    // MOV AL, 0xF0; MOV CL, 0x0F; OR AL, CL
    harness.load_program(&[0xB0, 0xF0, 0xB1, 0x0F, 0x08, 0xC8], 0);

    harness.step_n(3).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0xFF);
}

#[test]
fn test_xor_r16_rm16_self_clears_and_zeroes() {
    let mut harness = CpuHarness::new();
    // MOV AX, 0x1234; XOR AX, AX
    harness.load_program(&[0xB8, 0x34, 0x12, 0x33, 0xC0], 0);

    harness.step_n(2).unwrap();

    assert_eq!(harness.cpu.regs[0], 0);
    assert!(harness.cpu.flags.contains(Flags::ZF));
    assert!(!harness.cpu.flags.contains(Flags::CF));
}

#[test]
fn test_test_does_not_modify_operand() {
    let mut harness = CpuHarness::new();
    // MOV AL, 0x0F; TEST AL, 0xF0
    harness.load_program(&[0xB0, 0x0F, 0xA8, 0xF0], 0);

    harness.step_n(2).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0x0F);
    assert!(harness.cpu.flags.contains(Flags::ZF));
}

#[test]
fn test_not_rm8_group3() {
    let mut harness = CpuHarness::new();
    // MOV AL, 0x0F; NOT AL (F6 /2)
    harness.load_program(&[0xB0, 0x0F, 0xF6, 0xD0], 0);

    harness.step_n(2).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0xF0);
}
