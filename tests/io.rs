//! Tests for IO instructions (IN/OUT)

use core8086::cpu::CpuHarness;
use core8086::io::IoPortHandler;

/// Echoes writes back on reads; registered per-port since `IoDispatcher` has
/// no notion of a port range.
struct EchoDevice {
    value: u8,
}

impl IoPortHandler for EchoDevice {
    fn read_byte(&mut self, _port: u16) -> u8 {
        self.value
    }

    fn write_byte(&mut self, _port: u16, value: u8) {
        self.value = value;
    }
}

#[test]
fn test_out_in_imm8() {
    let mut harness = CpuHarness::new();
    harness.executor.io.register(0x55, Box::new(EchoDevice { value: 0 }));

    harness.load_program(
        &[
            0xB0, 0x42, // MOV AL, 0x42
            0xE6, 0x55, // OUT 0x55, AL
            0xB0, 0x00, // MOV AL, 0x00
            0xE4, 0x55, // IN AL, 0x55
        ],
        0,
    );

    harness.step_n(4).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0x42);
}

#[test]
fn test_out_in_imm16() {
    let mut harness = CpuHarness::new();
    harness.executor.io.register(0x55, Box::new(EchoDevice { value: 0 }));

    harness.load_program(
        &[
            0xB8, 0x34, 0x12, // MOV AX, 0x1234
            0xE7, 0x55, // OUT 0x55, AX
            0xB8, 0x00, 0x00, // MOV AX, 0
            0xE5, 0x55, // IN AX, 0x55
        ],
        0,
    );

    harness.step_n(4).unwrap();

    assert_eq!(harness.cpu.regs[0], 0x1234);
}

#[test]
fn test_out_in_dx() {
    let mut harness = CpuHarness::new();
    harness.executor.io.register(0x55, Box::new(EchoDevice { value: 0 }));

    harness.load_program(
        &[
            0xBA, 0x55, 0x00, // MOV DX, 0x0055
            0xB0, 0x99, // MOV AL, 0x99
            0xEE, // OUT DX, AL
            0xB0, 0x00, // MOV AL, 0
            0xEC, // IN AL, DX
        ],
        0,
    );

    harness.step_n(4).unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0x99);
}

#[test]
fn test_out_in_dx_word() {
    let mut harness = CpuHarness::new();
    harness.executor.io.register(0x55, Box::new(EchoDevice { value: 0 }));

    harness.load_program(
        &[
            0xBA, 0x55, 0x00, // MOV DX, 0x0055
            0xB8, 0xCD, 0xAB, // MOV AX, 0xABCD
            0xEF, // OUT DX, AX
            0xB8, 0x00, 0x00, // MOV AX, 0
            0xED, // IN AX, DX
        ],
        0,
    );

    harness.step_n(4).unwrap();

    assert_eq!(harness.cpu.regs[0], 0xABCD);
}

#[test]
fn test_unmapped_port_reads_high_byte() {
    let mut harness = CpuHarness::new();
    harness.load_program(&[0xE4, 0x20], 0); // IN AL, 0x20 (nothing registered)

    harness.step().unwrap();

    assert_eq!(harness.cpu.read_reg8(0), 0xFF);
}

#[test]
fn test_write_to_unmapped_port_does_not_fail_by_default() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0xB0, 0x42, // MOV AL, 0x42
            0xE6, 0x50, // OUT 0x50, AL (unmapped port)
        ],
        0,
    );

    harness.step_n(2).unwrap();
}
