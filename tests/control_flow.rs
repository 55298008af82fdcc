//! Control flow instruction tests (JMP, Jcc, LOOP family, CALL/RET, INT/IRET)

use core8086::cpu::state::{Flags, SEG_CS};
use core8086::cpu::CpuHarness;
use core8086::memory::MemoryBus;

#[test]
fn test_jmp_short() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0xEB, 0x05, // JMP +5
            0x90, 0x90, 0x90, 0x90, 0x90, // 5 NOPs to skip
            0xB8, 0x34, 0x12, // MOV AX, 0x1234
        ],
        0,
    );

    harness.step().unwrap();
    assert_eq!(harness.cpu.ip, 7);

    harness.step().unwrap();
    assert_eq!(harness.cpu.regs[0], 0x1234);
}

#[test]
fn test_jz_taken() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0xB8, 0x00, 0x00, // MOV AX, 0
            0x04, 0x00, // ADD AL, 0 (sets ZF)
            0x74, 0x02, // JZ +2
            0x90, 0x90,
            0xB8, 0x34, 0x12, // MOV AX, 0x1234
        ],
        0,
    );

    harness.step_n(2).unwrap();
    assert!(harness.cpu.flags.contains(Flags::ZF));

    harness.step().unwrap();
    assert_eq!(harness.cpu.ip, 9);

    harness.step().unwrap();
    assert_eq!(harness.cpu.regs[0], 0x1234);
}

#[test]
fn test_jnz_not_taken() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0xB8, 0x00, 0x00, // MOV AX, 0
            0x04, 0x00, // ADD AL, 0 (sets ZF)
            0x75, 0x02, // JNZ +2
            0xB8, 0x34, 0x12, // MOV AX, 0x1234 (falls through here)
        ],
        0,
    );

    harness.step_n(3).unwrap();
    assert_eq!(harness.cpu.ip, 7);

    harness.step().unwrap();
    assert_eq!(harness.cpu.regs[0], 0x1234);
}

#[test]
fn test_call_near_and_ret() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0xBC, 0x00, 0x10, // MOV SP, 0x1000 (offset 0-2)
            0xE8, 0x03, 0x00, // CALL +3 (offset 3-5, target = 6+3=9)
            0xB8, 0x34, 0x12, // MOV AX, 0x1234 (offset 6-8)
            0xC3, // RET (offset 9)
        ],
        0,
    );

    harness.step_n(2).unwrap();
    assert_eq!(harness.cpu.ip, 9);
    assert_eq!(harness.cpu.regs[4], 0x0FFE);

    let return_addr = harness.mem.read16(0x0FFE);
    assert_eq!(return_addr, 6);

    harness.step().unwrap(); // RET
    assert_eq!(harness.cpu.ip, 6);
    assert_eq!(harness.cpu.regs[4], 0x1000);

    harness.step().unwrap();
    assert_eq!(harness.cpu.regs[0], 0x1234);
}

#[test]
fn test_call_far_and_retf() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0xBC, 0x00, 0x10, // MOV SP, 0x1000 (offset 0-2)
            0x9A, 0x0B, 0x00, 0x00, 0x00, // CALL far 0x0000:0x000B (offset 3-7)
            0xB8, 0x34, 0x12, // MOV AX, 0x1234 (offset 8-10)
            0xCB, // RETF (offset 11)
        ],
        0,
    );

    harness.step_n(2).unwrap();
    assert_eq!(harness.cpu.read_seg(SEG_CS), 0x0000);
    assert_eq!(harness.cpu.ip, 0x000B);
    assert_eq!(harness.cpu.regs[4], 0x0FFC);

    harness.step().unwrap(); // RETF
    assert_eq!(harness.cpu.read_seg(SEG_CS), 0);
    assert_eq!(harness.cpu.ip, 8);
    assert_eq!(harness.cpu.regs[4], 0x1000);
}

#[test]
fn test_call_rm16_register() {
    let mut harness = CpuHarness::new();
    harness.mem.write8(0x0100, 0xB8);
    harness.mem.write8(0x0101, 0x34);
    harness.mem.write8(0x0102, 0x12);

    harness.load_program(
        &[
            0xBC, 0x00, 0x10, // MOV SP, 0x1000
            0xBB, 0x00, 0x01, // MOV BX, 0x0100
            0xFF, 0xD3, // CALL BX
        ],
        0,
    );

    harness.step_n(3).unwrap();

    assert_eq!(harness.cpu.ip, 0x0100);
    assert_eq!(harness.cpu.regs[4], 0x0FFE);
    assert_eq!(harness.mem.read16(0x0FFE), 8);
}

#[test]
fn test_loop_taken_then_falls_through() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0xB9, 0x03, 0x00, // MOV CX, 3
            0x90, // NOP (loop target, offset 3)
            0xE2, 0xFD, // LOOP -3
        ],
        0,
    );

    harness.step().unwrap();
    assert_eq!(harness.cpu.regs[1], 3);

    harness.step_n(2).unwrap();
    assert_eq!(harness.cpu.regs[1], 2);
    assert_eq!(harness.cpu.ip, 3);

    harness.step_n(2).unwrap();
    assert_eq!(harness.cpu.regs[1], 1);
    assert_eq!(harness.cpu.ip, 3);

    harness.step_n(2).unwrap();
    assert_eq!(harness.cpu.regs[1], 0);
    assert_eq!(harness.cpu.ip, 6); // not taken, falls through
}

#[test]
fn test_jcxz_taken() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0xB9, 0x00, 0x00, // MOV CX, 0
            0xE3, 0x02, // JCXZ +2
            0x90, 0x90,
            0xB8, 0x34, 0x12, // MOV AX, 0x1234
        ],
        0,
    );

    harness.step_n(2).unwrap();
    assert_eq!(harness.cpu.ip, 7);

    harness.step().unwrap();
    assert_eq!(harness.cpu.regs[0], 0x1234);
}

#[test]
fn test_int_pushes_flags_cs_ip_and_clears_if_tf() {
    let mut harness = CpuHarness::new();
    harness.mem.write16(0x40, 0x0100);
    harness.mem.write16(0x42, 0x0500);

    harness.load_program(&[0xCD, 0x10], 0x0100); // INT 0x10

    harness.cpu.regs[4] = 0x2000;
    harness.cpu.write_seg(2, 0x0200); // SS
    harness.cpu.flags.insert(Flags::ZF | Flags::CF | Flags::TF | Flags::IF);

    harness.step().unwrap();

    assert_eq!(harness.cpu.read_seg(SEG_CS), 0x0500);
    assert_eq!(harness.cpu.ip, 0x0100);
    assert_eq!(harness.cpu.regs[4], 0x1FFA);

    assert!(!harness.cpu.flags.contains(Flags::TF));
    assert!(!harness.cpu.flags.contains(Flags::IF));
    assert!(harness.cpu.flags.contains(Flags::ZF));
    assert!(harness.cpu.flags.contains(Flags::CF));
}

#[test]
fn test_int_then_iret_round_trips() {
    let mut harness = CpuHarness::new();
    harness.mem.write16(0x80, 0x0100);
    harness.mem.write16(0x82, 0x0300);

    let handler_addr = (0x0300_u32 << 4) + 0x0100;
    harness.mem.write8(handler_addr, 0xCF); // IRET

    harness.load_program(
        &[
            0xCD, 0x20, // INT 0x20
            0xB8, 0x34, 0x12, // MOV AX, 0x1234
        ],
        0x0100,
    );

    harness.cpu.write_seg(2, 0x0200); // SS
    harness.cpu.regs[4] = 0x2000;
    harness.cpu.flags.insert(Flags::ZF | Flags::IF);

    let initial_ip = harness.cpu.ip;

    harness.step().unwrap(); // INT 0x20
    assert_eq!(harness.cpu.read_seg(SEG_CS), 0x0300);
    assert_eq!(harness.cpu.ip, 0x0100);
    assert!(!harness.cpu.flags.contains(Flags::IF));

    harness.step().unwrap(); // IRET
    assert_eq!(harness.cpu.read_seg(SEG_CS), 0x0100);
    assert_eq!(harness.cpu.ip, initial_ip + 2);
    assert!(harness.cpu.flags.contains(Flags::IF));
    assert_eq!(harness.cpu.regs[4], 0x2000);

    harness.step().unwrap();
    assert_eq!(harness.cpu.regs[0], 0x1234);
}

#[test]
fn test_jmp_far_indirect_direct_address() {
    let mut harness = CpuHarness::new();
    harness.mem.write16(0x6000, 0x0200);
    harness.mem.write16(0x6002, 0x3000);

    for i in 0..10u32 {
        harness.mem.write8(0x30000 + 0x0200 + i, 0x90);
    }

    harness.load_program(&[0xFF, 0x2E, 0x00, 0x60], 0); // JMP FAR [0x6000]

    harness.step().unwrap();

    assert_eq!(harness.cpu.read_seg(SEG_CS), 0x3000);
    assert_eq!(harness.cpu.ip, 0x0200);
}
