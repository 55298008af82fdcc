//! Stack operation instruction tests (PUSH, POP)

use core8086::cpu::CpuHarness;

#[test]
fn test_push_pop() {
    let mut harness = CpuHarness::new();
    // MOV SP, 0x1000; MOV AX, 0x1234; PUSH AX; MOV AX, 0; POP AX
    harness.load_program(
        &[
            0xBC, 0x00, 0x10, // MOV SP, 0x1000
            0xB8, 0x34, 0x12, // MOV AX, 0x1234
            0x50, // PUSH AX
            0xB8, 0x00, 0x00, // MOV AX, 0
            0x58, // POP AX
        ],
        0,
    );

    harness.step_n(3).unwrap();
    assert_eq!(harness.cpu.regs[4], 0x0FFE); // SP decremented by 2

    harness.step().unwrap();
    assert_eq!(harness.cpu.regs[0], 0x0000);

    harness.step().unwrap();
    assert_eq!(harness.cpu.regs[0], 0x1234);
    assert_eq!(harness.cpu.regs[4], 0x1000);
}

#[test]
fn test_push_pop_segment_register() {
    let mut harness = CpuHarness::new();
    // MOV SP, 0x1000; MOV AX, 0x2222; MOV DS, AX; PUSH DS; MOV AX, 0; POP ES
    harness.load_program(
        &[
            0xBC, 0x00, 0x10, // MOV SP, 0x1000
            0xB8, 0x22, 0x22, // MOV AX, 0x2222
            0x8E, 0xD8, // MOV DS, AX
            0x1E, // PUSH DS
            0x07, // POP ES
        ],
        0,
    );

    harness.step_n(5).unwrap();

    assert_eq!(harness.cpu.segments[0], 0x2222); // ES
    assert_eq!(harness.cpu.regs[4], 0x1000);
}
