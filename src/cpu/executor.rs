//! Top-level fetch/prefix/decode/dispatch loop (spec §4.4) and the
//! interrupt engine (spec §4.7).
//!
//! `Executor` owns everything the architectural `Cpu` doesn't: I/O,
//! the static-address recorder, the two function handlers (normal flow and
//! external-interrupt flow, switched on interrupt entry), and the
//! cross-thread interrupt latch. Opcode handlers live as `impl Executor`
//! blocks split across `cpu::execute::*` so they have direct access to
//! `self.recorder`/`self.io`/`self.functions` without threading a dozen
//! parameters through every call.

use crate::config::EmulatorConfig;
use crate::cpu::function_handler::{CallType, FunctionHandler, FunctionTarget};
use crate::cpu::interrupts::InterruptLatch;
use crate::cpu::recorder::StaticAddressRecorder;
use crate::cpu::stack;
use crate::cpu::state::{Cpu, Flags, RepeatMode, SegmentedAddress, SEG_CS};
use crate::error::CpuError;
use crate::io::IoDispatcher;
use crate::memory::MemoryBus;

/// A host-supplied substitute for emulated code at a CALL target (spec §4.8's
/// "override functions"). Also backs the `FE 38 imm16` callback sequence
/// (spec §6) that lets emulator-specific interrupt handlers interpose on INT
/// without patching the IVT.
pub trait NativeCallHost {
    /// Invoked in place of jumping to the emulated address a
    /// `FunctionTarget::Native(id)` override replaced.
    fn call(&mut self, id: u32, cpu: &mut Cpu, mem: &mut dyn MemoryBus);

    /// Invoked by `FE 38 <imm16>` (Group 4, sub-index 7).
    fn run(&mut self, index: u16, cpu: &mut Cpu, mem: &mut dyn MemoryBus);
}

/// Prefix bytes the fetch loop folds into scratch before reaching an opcode
/// (spec §4.4 step 3): segment overrides ES/CS/SS/DS/FS/GS, LOCK, REPNZ, REPZ.
const PREFIX_BYTES: [u8; 9] = [0x26, 0x2E, 0x36, 0x3E, 0x64, 0x65, 0xF0, 0xF2, 0xF3];

pub struct Executor {
    pub io: IoDispatcher,
    pub recorder: StaticAddressRecorder,
    pub functions: FunctionHandler,
    pub external_functions: FunctionHandler,
    pub active_is_external: bool,
    pub latch: InterruptLatch,
    pub config: EmulatorConfig,
    pub native_host: Option<Box<dyn NativeCallHost>>,

    /// CS:IP of the instruction currently executing, snapshotted before any
    /// prefix/opcode fetch; DIV/IDIV faults restart here (spec §4.7).
    pub current_instruction_start: SegmentedAddress,

    /// Whether `fold_prefixes` consumed at least one prefix byte before the
    /// opcode of the instruction currently executing (spec §7's
    /// `InvalidOpcode::after_prefix`).
    pub current_after_prefix: bool,
}

impl Executor {
    pub fn new(config: EmulatorConfig) -> Self {
        Self {
            io: IoDispatcher::new(),
            recorder: StaticAddressRecorder::new(),
            functions: FunctionHandler::new(),
            external_functions: FunctionHandler::new(),
            active_is_external: false,
            latch: InterruptLatch::new(),
            config,
            native_host: None,
            current_instruction_start: SegmentedAddress::default(),
            current_after_prefix: false,
        }
    }

    pub fn set_native_host(&mut self, host: Box<dyn NativeCallHost>) {
        self.native_host = Some(host);
    }

    /// Perform a CALL: record the shadow frame (spec §4.8), then either jump
    /// into emulated code (pushing the architectural return address via
    /// `push_return`) or, if the target carries a native override, invoke the
    /// host and synthesize an immediate RET without ever touching CS:IP or
    /// the architectural stack.
    pub fn perform_call(
        &mut self,
        cpu: &mut Cpu,
        mem: &mut dyn MemoryBus,
        kind: CallType,
        caller: SegmentedAddress,
        callee: SegmentedAddress,
        return_site: SegmentedAddress,
        push_return: impl FnOnce(&mut Cpu, &mut dyn MemoryBus),
    ) {
        let target = self.active_functions().call(kind, caller, callee, return_site);
        match target {
            FunctionTarget::Emulated(addr) => {
                push_return(cpu, mem);
                cpu.write_seg(SEG_CS, addr.segment);
                cpu.ip = addr.offset;
            }
            FunctionTarget::Native(id) => {
                if let Some(mut host) = self.native_host.take() {
                    host.call(id, cpu, mem);
                    self.native_host = Some(host);
                } else {
                    log::warn!("call to native override {id} with no host installed");
                }
                self.active_functions().ret(return_site);
            }
        }
    }

    /// The function handler in effect for the call currently being
    /// processed: the external-interrupt one while servicing an externally
    /// injected interrupt, otherwise the normal-flow one (spec §3, §4.7).
    pub fn active_functions(&mut self) -> &mut FunctionHandler {
        if self.active_is_external {
            &mut self.external_functions
        } else {
            &mut self.functions
        }
    }

    /// Execute exactly one instruction (spec §4.4's top-level algorithm).
    pub fn step(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        if cpu.halted {
            self.service_pending_interrupt(cpu, mem)?;
            return Ok(());
        }

        let instruction_start = SegmentedAddress::new(cpu.read_seg(SEG_CS), cpu.ip);
        self.current_instruction_start = instruction_start;
        self.recorder.begin_instruction();
        cpu.diagnostics.clear();
        cpu.segment_override = None;
        cpu.repeat_mode = RepeatMode::None;

        let opcode = self.fold_prefixes(cpu, mem);
        self.dispatch(cpu, mem, opcode, instruction_start)?;

        self.recorder.commit();
        cpu.cycle_count += 1;
        self.service_pending_interrupt(cpu, mem)?;
        Ok(())
    }

    /// Consume prefix bytes (spec §4.4 step 3) and return the first
    /// non-prefix byte: the opcode. Records whether any prefix was folded in
    /// `current_after_prefix` for `invalid_opcode` to report.
    fn fold_prefixes(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) -> u8 {
        self.current_after_prefix = false;
        loop {
            let byte = cpu.fetch_u8(mem);
            if !PREFIX_BYTES.contains(&byte) {
                return byte;
            }
            self.current_after_prefix = true;
            match byte {
                0x26 => cpu.segment_override = Some(crate::cpu::state::SEG_ES),
                0x2E => cpu.segment_override = Some(crate::cpu::state::SEG_CS),
                0x36 => cpu.segment_override = Some(crate::cpu::state::SEG_SS),
                0x3E => cpu.segment_override = Some(crate::cpu::state::SEG_DS),
                0x64 => cpu.segment_override = Some(crate::cpu::state::SEG_FS),
                0x65 => cpu.segment_override = Some(crate::cpu::state::SEG_GS),
                0xF0 => { /* LOCK: single-core emulator, no-op */ }
                0xF2 => cpu.repeat_mode = RepeatMode::RepNz,
                0xF3 => cpu.repeat_mode = RepeatMode::RepZ,
                _ => unreachable!("byte came from PREFIX_BYTES"),
            }
        }
    }

    /// Restart the instruction currently executing after a DIV/IDIV fault
    /// (spec §4.7, "Division fault"): set IP back to the instruction's
    /// first byte before dispatching `INT 0`.
    pub fn fault_restart_and_interrupt(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        cpu.ip = self.current_instruction_start.offset;
        self.interrupt(cpu, mem, 0, false)
    }

    /// `interrupt(vector, external?)` per spec §4.7.
    pub fn interrupt(
        &mut self,
        cpu: &mut Cpu,
        mem: &mut dyn MemoryBus,
        vector: u8,
        external: bool,
    ) -> Result<(), CpuError> {
        let ivt_entry = (vector as u32) * 4;
        let target_ip = mem.read16(ivt_entry);
        let target_cs = mem.read16(ivt_entry + 2);

        if target_ip == 0 && target_cs == 0 && self.config.error_on_uninitialized_interrupt_handler {
            return Err(CpuError::UnhandledOperation {
                reason: format!("interrupt vector {vector:#04x} is uninitialized"),
                at: self.current_instruction_start,
            });
        }

        let flags_word = cpu.flags.to_word();
        stack::push16(cpu, mem, flags_word);
        stack::push16(cpu, mem, cpu.read_seg(SEG_CS));
        stack::push16(cpu, mem, cpu.ip);
        cpu.flags.remove(Flags::IF | Flags::TF);

        let caller = SegmentedAddress::new(cpu.read_seg(SEG_CS), cpu.ip);
        let callee = SegmentedAddress::new(target_cs, target_ip);
        let return_site = caller;

        cpu.write_seg(SEG_CS, target_cs);
        cpu.ip = target_ip;

        if external {
            self.active_is_external = true;
            self.external_functions
                .call(CallType::Interrupt, caller, callee, return_site);
        } else {
            self.active_functions()
                .call(CallType::Interrupt, caller, callee, return_site);
        }

        Ok(())
    }

    /// `iret`: pop IP, CS, FLAGS; restore the primary function handler if an
    /// external interrupt was active (spec §4.7).
    pub fn iret(&mut self, cpu: &mut Cpu, mem: &dyn MemoryBus) {
        let ip = stack::pop16(cpu, mem);
        let cs = stack::pop16(cpu, mem);
        let flags_word = stack::pop16(cpu, mem);

        cpu.ip = ip;
        cpu.write_seg(SEG_CS, cs);
        cpu.flags = Flags::from_word(flags_word);

        let return_site = SegmentedAddress::new(cs, ip);
        if self.active_is_external {
            self.external_functions.ret(return_site);
            self.active_is_external = false;
        } else {
            self.functions.ret(return_site);
        }
    }

    /// Service a latched external interrupt if IF=1 (spec §4.4 step 6,
    /// §4.7's latch policy). Also the HLT wake-up path.
    fn service_pending_interrupt(&mut self, cpu: &mut Cpu, mem: &mut dyn MemoryBus) -> Result<(), CpuError> {
        if cpu.delay_interrupt {
            cpu.delay_interrupt = false;
            return Ok(());
        }
        if !cpu.flags.contains(Flags::IF) {
            return Ok(());
        }
        let Some(vector) = self.latch.take() else {
            return Ok(());
        };
        cpu.halted = false;
        log::trace!("servicing external interrupt {vector:#04x}");
        self.interrupt(cpu, mem, vector, true)
    }

    fn dispatch(
        &mut self,
        cpu: &mut Cpu,
        mem: &mut dyn MemoryBus,
        opcode: u8,
        instruction_start: SegmentedAddress,
    ) -> Result<(), CpuError> {
        crate::cpu::execute::dispatch(self, cpu, mem, opcode, instruction_start)
    }
}
