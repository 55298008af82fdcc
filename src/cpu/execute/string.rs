//! String primitives: MOVS/CMPS/STOS/LODS/SCAS, byte and word forms, and the
//! REP/REPE/REPNE repetition loop that drives them (spec §4.4 step 4).
//!
//! Each method performs exactly one iteration of its transfer plus the
//! matching SI/DI pointer update. `repeat` is the shared driver: with no
//! repeat prefix active it runs the body once; with one active it loops
//! while CX≠0, decrementing CX each pass, and for the compare primitives
//! (CMPS/SCAS) stops early the instant ZF no longer matches the prefix's
//! continuation condition.

use crate::cpu::state::{Cpu, RepeatMode, SegmentedAddress, SEG_DS, SEG_ES};
use crate::cpu::Executor;
use crate::error::CpuError;
use crate::memory::MemoryBus;

impl Executor {
    fn advance(cpu: &mut Cpu, reg: u8, width: u16) {
        let cur = cpu.read_reg16(reg);
        let next = if cpu.flags.contains(crate::cpu::state::Flags::DF) {
            cur.wrapping_sub(width)
        } else {
            cur.wrapping_add(width)
        };
        cpu.write_reg16(reg, next);
    }

    /// Run `body` once per spec §4.4's non-repeated case, or in a loop driven
    /// by `cpu.repeat_mode` when a REP/REPE/REPNE prefix folded in this
    /// instruction. `is_compare` selects the CMPS/SCAS early-exit rule; other
    /// primitives ignore ZF entirely.
    fn repeat(
        &mut self,
        cpu: &mut Cpu,
        mem: &mut dyn MemoryBus,
        is_compare: bool,
        mut body: impl FnMut(&mut Self, &mut Cpu, &mut dyn MemoryBus),
    ) {
        match cpu.repeat_mode {
            RepeatMode::None => body(self, cpu, mem),
            RepeatMode::RepZ | RepeatMode::RepNz => {
                let continue_on_zf = matches!(cpu.repeat_mode, RepeatMode::RepZ);
                loop {
                    let cx = cpu.read_reg16(1);
                    if cx == 0 {
                        break;
                    }
                    body(self, cpu, mem);
                    let cx = cpu.read_reg16(1).wrapping_sub(1);
                    cpu.write_reg16(1, cx);
                    if cx == 0 {
                        break;
                    }
                    if is_compare && cpu.flags.contains(crate::cpu::state::Flags::ZF) != continue_on_zf {
                        break;
                    }
                }
            }
        }
    }

    pub fn movsb(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        self.repeat(cpu, mem, false, |_, cpu, mem| {
            let src = SegmentedAddress::new(cpu.effective_segment(SEG_DS), cpu.read_reg16(6));
            let dst = SegmentedAddress::new(cpu.read_seg(SEG_ES), cpu.read_reg16(7));
            let byte = cpu.read_mem8(mem, src);
            cpu.write_mem8(mem, dst, byte);
            Self::advance(cpu, 6, 1);
            Self::advance(cpu, 7, 1);
        });
        Ok(())
    }

    pub fn movsw(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        self.repeat(cpu, mem, false, |_, cpu, mem| {
            let src = SegmentedAddress::new(cpu.effective_segment(SEG_DS), cpu.read_reg16(6));
            let dst = SegmentedAddress::new(cpu.read_seg(SEG_ES), cpu.read_reg16(7));
            let word = cpu.read_mem16(mem, src);
            cpu.write_mem16(mem, dst, word);
            Self::advance(cpu, 6, 2);
            Self::advance(cpu, 7, 2);
        });
        Ok(())
    }

    pub fn stosb(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        self.repeat(cpu, mem, false, |_, cpu, mem| {
            let dst = SegmentedAddress::new(cpu.read_seg(SEG_ES), cpu.read_reg16(7));
            let al = cpu.read_reg8(0);
            cpu.write_mem8(mem, dst, al);
            Self::advance(cpu, 7, 1);
        });
        Ok(())
    }

    pub fn stosw(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        self.repeat(cpu, mem, false, |_, cpu, mem| {
            let dst = SegmentedAddress::new(cpu.read_seg(SEG_ES), cpu.read_reg16(7));
            let ax = cpu.read_reg16(0);
            cpu.write_mem16(mem, dst, ax);
            Self::advance(cpu, 7, 2);
        });
        Ok(())
    }

    pub fn lodsb(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        self.repeat(cpu, mem, false, |_, cpu, mem| {
            let src = SegmentedAddress::new(cpu.effective_segment(SEG_DS), cpu.read_reg16(6));
            let byte = cpu.read_mem8(mem, src);
            cpu.write_reg8(0, byte);
            Self::advance(cpu, 6, 1);
        });
        Ok(())
    }

    pub fn lodsw(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        self.repeat(cpu, mem, false, |_, cpu, mem| {
            let src = SegmentedAddress::new(cpu.effective_segment(SEG_DS), cpu.read_reg16(6));
            let word = cpu.read_mem16(mem, src);
            cpu.write_reg16(0, word);
            Self::advance(cpu, 6, 2);
        });
        Ok(())
    }

    pub fn cmpsb(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        self.repeat(cpu, mem, true, |_, cpu, mem| {
            let src = SegmentedAddress::new(cpu.effective_segment(SEG_DS), cpu.read_reg16(6));
            let dst = SegmentedAddress::new(cpu.read_seg(SEG_ES), cpu.read_reg16(7));
            let a = cpu.read_mem8(mem, src);
            let b = cpu.read_mem8(mem, dst);
            let (_, flags) = crate::cpu::alu::sub8(a, b, 0, cpu.flags);
            cpu.flags = flags;
            Self::advance(cpu, 6, 1);
            Self::advance(cpu, 7, 1);
        });
        Ok(())
    }

    pub fn cmpsw(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        self.repeat(cpu, mem, true, |_, cpu, mem| {
            let src = SegmentedAddress::new(cpu.effective_segment(SEG_DS), cpu.read_reg16(6));
            let dst = SegmentedAddress::new(cpu.read_seg(SEG_ES), cpu.read_reg16(7));
            let a = cpu.read_mem16(mem, src);
            let b = cpu.read_mem16(mem, dst);
            let (_, flags) = crate::cpu::alu::sub16(a, b, 0, cpu.flags);
            cpu.flags = flags;
            Self::advance(cpu, 6, 2);
            Self::advance(cpu, 7, 2);
        });
        Ok(())
    }

    pub fn scasb(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        self.repeat(cpu, mem, true, |_, cpu, mem| {
            let dst = SegmentedAddress::new(cpu.read_seg(SEG_ES), cpu.read_reg16(7));
            let al = cpu.read_reg8(0);
            let b = cpu.read_mem8(mem, dst);
            let (_, flags) = crate::cpu::alu::sub8(al, b, 0, cpu.flags);
            cpu.flags = flags;
            Self::advance(cpu, 7, 1);
        });
        Ok(())
    }

    pub fn scasw(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        self.repeat(cpu, mem, true, |_, cpu, mem| {
            let dst = SegmentedAddress::new(cpu.read_seg(SEG_ES), cpu.read_reg16(7));
            let ax = cpu.read_reg16(0);
            let b = cpu.read_mem16(mem, dst);
            let (_, flags) = crate::cpu::alu::sub16(ax, b, 0, cpu.flags);
            cpu.flags = flags;
            Self::advance(cpu, 7, 2);
        });
        Ok(())
    }

    /// OUTSB/OUTSW (0x6E/0x6F): write [DS:SI] to the port in DX.
    pub fn outsb(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let port = cpu.read_reg16(2);
        let mut err = None;
        self.repeat(cpu, mem, false, |exec, cpu, mem| {
            let src = SegmentedAddress::new(cpu.effective_segment(SEG_DS), cpu.read_reg16(6));
            let byte = cpu.read_mem8(mem, src);
            if let Err(e) = exec.io.out8(port, byte, src, &exec.config) {
                err.get_or_insert(e);
            }
            Self::advance(cpu, 6, 1);
        });
        err.map_or(Ok(()), Err)
    }

    pub fn outsw(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let port = cpu.read_reg16(2);
        let mut err = None;
        self.repeat(cpu, mem, false, |exec, cpu, mem| {
            let src = SegmentedAddress::new(cpu.effective_segment(SEG_DS), cpu.read_reg16(6));
            let word = cpu.read_mem16(mem, src);
            if let Err(e) = exec.io.out16(port, word, src, &exec.config) {
                err.get_or_insert(e);
            }
            Self::advance(cpu, 6, 2);
        });
        err.map_or(Ok(()), Err)
    }

    /// INSB/INSW (0x6C/0x6D): read the port in DX into [ES:DI].
    pub fn insb(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let port = cpu.read_reg16(2);
        let mut err = None;
        self.repeat(cpu, mem, false, |exec, cpu, mem| {
            let dst = SegmentedAddress::new(cpu.read_seg(SEG_ES), cpu.read_reg16(7));
            match exec.io.in8(port, dst, &exec.config) {
                Ok(byte) => cpu.write_mem8(mem, dst, byte),
                Err(e) => {
                    err.get_or_insert(e);
                }
            }
            Self::advance(cpu, 7, 1);
        });
        err.map_or(Ok(()), Err)
    }

    pub fn insw(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        let port = cpu.read_reg16(2);
        let mut err = None;
        self.repeat(cpu, mem, false, |exec, cpu, mem| {
            let dst = SegmentedAddress::new(cpu.read_seg(SEG_ES), cpu.read_reg16(7));
            match exec.io.in16(port, dst, &exec.config) {
                Ok(word) => cpu.write_mem16(mem, dst, word),
                Err(e) => {
                    err.get_or_insert(e);
                }
            }
            Self::advance(cpu, 7, 2);
        });
        err.map_or(Ok(()), Err)
    }
}
