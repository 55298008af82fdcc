//! Static memory-access recorder (spec §3, §4.4).
//!
//! Per instruction the executor records every memory address it touches
//! into a pending buffer, then commits that buffer into the long-lived
//! accumulator once the instruction completes. Callers that only want the
//! current instruction's accesses (diagnostics, a debugger's "what did this
//! instruction touch" view) read the pending buffer directly; `accesses()`
//! returns the full run's history.

use crate::cpu::state::SegmentedAddress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOp {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessSize {
    Byte,
    Word,
    Dword,
    /// A dword-sized pointer load (LDS/LES/segment:offset far pointer reads).
    DwordPtr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressAccess {
    pub address: SegmentedAddress,
    pub op: AccessOp,
    pub size: AccessSize,
}

#[derive(Debug, Default)]
pub struct StaticAddressRecorder {
    pending: Vec<AddressAccess>,
    committed: Vec<AddressAccess>,
}

impl StaticAddressRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the pending buffer; called at the start of each instruction.
    pub fn begin_instruction(&mut self) {
        self.pending.clear();
    }

    pub fn record(&mut self, address: SegmentedAddress, op: AccessOp, size: AccessSize) {
        self.pending.push(AddressAccess { address, op, size });
    }

    /// Move this instruction's accesses into the long-lived history; called
    /// once the instruction (including any REP iterations) finishes.
    pub fn commit(&mut self) {
        self.committed.append(&mut self.pending);
    }

    pub fn pending(&self) -> &[AddressAccess] {
        &self.pending
    }

    pub fn accesses(&self) -> &[AddressAccess] {
        &self.committed
    }
}
