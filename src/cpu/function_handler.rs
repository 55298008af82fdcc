//! Function call/return tracking (spec §4.8, §7).
//!
//! Two independent `FunctionHandler` instances exist per core (normal flow
//! and external-interrupt flow, per spec §4.7); `Executor` switches between
//! them on interrupt entry/exit. A mismatched RET logs a warning and keeps
//! running rather than aborting — this is diagnostic bookkeeping, not an
//! architectural fault, and the teacher's style is to never let bookkeeping
//! take down the emulated program (see its `check_interrupts`'s
//! `#[cfg(debug_assertions)]` logging, generalized here to `log::warn!`).

use std::collections::{HashMap, HashSet};

use crate::cpu::state::SegmentedAddress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallType {
    Near,
    Far,
    Interrupt,
}

/// Where a call transfers control to: an address inside the emulated image,
/// or a native function the host substitutes in its place (spec §4.8's
/// override mechanism, e.g. swapping out a DOS INT 21h handler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionTarget {
    Emulated(SegmentedAddress),
    Native(u32),
}

#[derive(Debug, Clone, Default)]
pub struct FunctionInformation {
    pub name: Option<String>,
    pub callers: HashSet<SegmentedAddress>,
    pub return_sites: HashMap<SegmentedAddress, u32>,
    pub override_target: Option<FunctionTarget>,
}

impl FunctionInformation {
    fn record_call(&mut self, caller: SegmentedAddress) {
        self.callers.insert(caller);
    }

    fn record_return(&mut self, return_site: SegmentedAddress) {
        *self.return_sites.entry(return_site).or_insert(0) += 1;
    }
}

#[derive(Debug, Clone, Copy)]
struct CallFrame {
    kind: CallType,
    target: FunctionTarget,
    expected_return: SegmentedAddress,
}

/// Tracks the live call stack and per-function statistics for one flow
/// (normal execution, or the separate external-interrupt flow spec §4.7
/// requires).
#[derive(Debug, Default)]
pub struct FunctionHandler {
    functions: HashMap<FunctionTarget, FunctionInformation>,
    overrides: HashMap<SegmentedAddress, FunctionTarget>,
    stack: Vec<CallFrame>,
}

impl FunctionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a native override: calls that would land at `address` are
    /// redirected to `target` instead, without disturbing the emulated
    /// image (spec §4.8).
    pub fn set_override(&mut self, address: SegmentedAddress, target: FunctionTarget) {
        self.overrides.insert(address, target);
    }

    pub fn name_function(&mut self, target: FunctionTarget, name: impl Into<String>) {
        self.functions.entry(target).or_default().name = Some(name.into());
    }

    /// Record a call from `caller` to `callee`, returning the target the
    /// executor should actually jump to (the callee itself, or its
    /// override).
    pub fn call(
        &mut self,
        kind: CallType,
        caller: SegmentedAddress,
        callee: SegmentedAddress,
        expected_return: SegmentedAddress,
    ) -> FunctionTarget {
        let target = self
            .overrides
            .get(&callee)
            .copied()
            .unwrap_or(FunctionTarget::Emulated(callee));

        self.functions
            .entry(target)
            .or_default()
            .record_call(caller);

        self.stack.push(CallFrame {
            kind,
            target,
            expected_return,
        });

        target
    }

    /// Record a return to `actual_return`. If it doesn't match the return
    /// site recorded at call time, this is logged and otherwise ignored —
    /// self-modifying code and manually-adjusted stacks are both legal DOS
    /// programs (spec §7's propagation policy: never abort on this).
    pub fn ret(&mut self, actual_return: SegmentedAddress) {
        let Some(frame) = self.stack.pop() else {
            log::warn!("RET with no matching CALL on record (returning to {actual_return})");
            return;
        };

        if frame.expected_return != actual_return {
            log::warn!(
                "RET to {actual_return} does not match CALL's expected return {} (call kind {:?})",
                frame.expected_return,
                frame.kind
            );
        }

        if let Some(info) = self.functions.get_mut(&frame.target) {
            info.record_return(actual_return);
        }
    }

    pub fn function_info(&self, target: FunctionTarget) -> Option<&FunctionInformation> {
        self.functions.get(&target)
    }

    pub fn call_depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_then_ret_tracks_caller_and_return_site() {
        let mut handler = FunctionHandler::new();
        let caller = SegmentedAddress::new(0x1000, 0x0010);
        let callee = SegmentedAddress::new(0x2000, 0x0000);
        let ret_site = SegmentedAddress::new(0x1000, 0x0013);

        let target = handler.call(CallType::Near, caller, callee, ret_site);
        assert_eq!(target, FunctionTarget::Emulated(callee));
        handler.ret(ret_site);

        let info = handler.function_info(FunctionTarget::Emulated(callee)).unwrap();
        assert!(info.callers.contains(&caller));
        assert_eq!(info.return_sites.get(&ret_site), Some(&1));
        assert_eq!(handler.call_depth(), 0);
    }

    #[test]
    fn override_redirects_call_target() {
        let mut handler = FunctionHandler::new();
        let callee = SegmentedAddress::new(0x2000, 0x0000);
        handler.set_override(callee, FunctionTarget::Native(42));

        let target = handler.call(
            CallType::Far,
            SegmentedAddress::new(0, 0),
            callee,
            SegmentedAddress::new(0, 3),
        );
        assert_eq!(target, FunctionTarget::Native(42));
    }

    #[test]
    fn mismatched_return_does_not_panic() {
        let mut handler = FunctionHandler::new();
        let callee = SegmentedAddress::new(0x2000, 0x0000);
        handler.call(
            CallType::Near,
            SegmentedAddress::new(0, 0),
            callee,
            SegmentedAddress::new(0, 3),
        );
        handler.ret(SegmentedAddress::new(0, 0xFFFF));
        assert_eq!(handler.call_depth(), 0);
    }

    #[test]
    fn ret_without_call_logs_and_survives() {
        let mut handler = FunctionHandler::new();
        handler.ret(SegmentedAddress::new(0, 0));
        assert_eq!(handler.call_depth(), 0);
    }
}
