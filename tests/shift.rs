//! Shift and rotate instruction tests (SHL, SHR, SAR, ROL, ROR, RCL, RCR)

use core8086::cpu::state::Flags;
use core8086::cpu::CpuHarness;

#[test]
fn test_shl_r8_1() {
    let mut harness = CpuHarness::new();
    // MOV AL, 0x55; SHL AL, 1
    harness.load_program(&[0xB0, 0x55, 0xD0, 0xE0], 0);

    harness.step_n(2).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0xAA);
    assert!(!harness.cpu.flags.contains(Flags::CF));
}

#[test]
fn test_shl_r8_1_with_carry() {
    let mut harness = CpuHarness::new();
    // MOV AL, 0x81; SHL AL, 1
    harness.load_program(&[0xB0, 0x81, 0xD0, 0xE0], 0);

    harness.step_n(2).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0x02);
    assert!(harness.cpu.flags.contains(Flags::CF));
}

#[test]
fn test_shl_r16_cl() {
    let mut harness = CpuHarness::new();
    // MOV AX, 1; MOV CL, 8; SHL AX, CL
    harness.load_program(&[0xB8, 0x01, 0x00, 0xB1, 0x08, 0xD3, 0xE0], 0);

    harness.step_n(3).unwrap();

    assert_eq!(harness.cpu.regs[0], 0x0100);
}

#[test]
fn test_shr_r8_1_with_carry() {
    let mut harness = CpuHarness::new();
    // MOV AL, 0x03; SHR AL, 1
    harness.load_program(&[0xB0, 0x03, 0xD0, 0xE8], 0);

    harness.step_n(2).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0x01);
    assert!(harness.cpu.flags.contains(Flags::CF));
}

#[test]
fn test_shr_r16_1_logical() {
    let mut harness = CpuHarness::new();
    // MOV AX, 0x8000; SHR AX, 1
    harness.load_program(&[0xB8, 0x00, 0x80, 0xD1, 0xE8], 0);

    harness.step_n(2).unwrap();

    assert_eq!(harness.cpu.regs[0], 0x4000);
}

#[test]
fn test_sar_r8_1_negative() {
    let mut harness = CpuHarness::new();
    // MOV AL, 0x80; SAR AL, 1
    harness.load_program(&[0xB0, 0x80, 0xD0, 0xF8], 0);

    harness.step_n(2).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0xC0); // sign-extended
}

#[test]
fn test_sar_r8_cl_stays_negative() {
    let mut harness = CpuHarness::new();
    // MOV AL, 0xFF; MOV CL, 3; SAR AL, CL
    harness.load_program(&[0xB0, 0xFF, 0xB1, 0x03, 0xD2, 0xF8], 0);

    harness.step_n(3).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0xFF);
}

#[test]
fn test_rol_r8_1() {
    let mut harness = CpuHarness::new();
    // MOV AL, 0x81; ROL AL, 1
    harness.load_program(&[0xB0, 0x81, 0xD0, 0xC0], 0);

    harness.step_n(2).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0x03);
    assert!(harness.cpu.flags.contains(Flags::CF));
}

#[test]
fn test_ror_r8_1() {
    let mut harness = CpuHarness::new();
    // MOV AL, 0x81; ROR AL, 1
    harness.load_program(&[0xB0, 0x81, 0xD0, 0xC8], 0);

    harness.step_n(2).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0xC0);
    assert!(harness.cpu.flags.contains(Flags::CF));
}

#[test]
fn test_rcl_r8_1_carry_in() {
    let mut harness = CpuHarness::new();
    // STC; MOV AL, 0x80; RCL AL, 1
    harness.load_program(&[0xF9, 0xB0, 0x80, 0xD0, 0xD0], 0);

    harness.step_n(3).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0x01); // old carry rotated into bit 0
    assert!(harness.cpu.flags.contains(Flags::CF)); // bit 7 rotated out
}

#[test]
fn test_rcr_r8_1_carry_in() {
    let mut harness = CpuHarness::new();
    // STC; MOV AL, 0x01; RCR AL, 1
    harness.load_program(&[0xF9, 0xB0, 0x01, 0xD0, 0xD8], 0);

    harness.step_n(3).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0x80); // old carry rotated into bit 7
    assert!(harness.cpu.flags.contains(Flags::CF)); // bit 0 rotated out
}

#[test]
fn test_shl_sets_zero_flag() {
    let mut harness = CpuHarness::new();
    // MOV AL, 0x80; SHL AL, 1
    harness.load_program(&[0xB0, 0x80, 0xD0, 0xE0], 0);

    harness.step_n(2).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0x00);
    assert!(harness.cpu.flags.contains(Flags::ZF));
}
