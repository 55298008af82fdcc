//! A minimal CPU + memory + executor bundle for instruction-level testing.
//!
//! Bypasses any host emulator front-end: load a byte string at a segment,
//! step, inspect registers. See spec §8's scenario format, which this
//! harness exists to make easy to express as a unit test.

use crate::config::EmulatorConfig;
use crate::cpu::executor::Executor;
use crate::cpu::state::{Cpu, SegmentedAddress, SEG_CS};
use crate::error::CpuError;
use crate::memory::FlatMemory;

pub struct CpuHarness {
    pub cpu: Cpu,
    pub mem: FlatMemory,
    pub executor: Executor,
}

impl CpuHarness {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            mem: FlatMemory::new(),
            executor: Executor::new(EmulatorConfig::default()),
        }
    }

    pub fn with_config(config: EmulatorConfig) -> Self {
        Self {
            cpu: Cpu::new(),
            mem: FlatMemory::new(),
            executor: Executor::new(config),
        }
    }

    /// Load `code` at `segment:0000` and point CS:IP at it.
    pub fn load_program(&mut self, code: &[u8], segment: u16) {
        self.mem.load((segment as u32) << 4, code);
        self.cpu.write_seg(SEG_CS, segment);
        self.cpu.ip = 0;
    }

    pub fn step(&mut self) -> Result<(), CpuError> {
        self.executor.step(&mut self.cpu, &mut self.mem)
    }

    pub fn step_n(&mut self, n: usize) -> Result<(), CpuError> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    /// Where the instruction pointer is right now, as a segmented address.
    pub fn pc(&self) -> SegmentedAddress {
        SegmentedAddress::new(self.cpu.read_seg(SEG_CS), self.cpu.ip)
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
    }
}

impl Default for CpuHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_program_and_steps() {
        let mut harness = CpuHarness::new();
        harness.load_program(&[0xB8, 0x34, 0x12], 0x0000); // MOV AX, 0x1234
        harness.step().unwrap();
        assert_eq!(harness.cpu.read_reg16(0), 0x1234);
        assert_eq!(harness.cpu.ip, 3);
    }
}
