//! Fatal and recoverable error conditions the core can raise.
//!
//! See spec §7. `DivisionFault` is the one recoverable kind: the executor
//! restarts the faulting instruction and dispatches `INT 0` instead of
//! propagating it to the caller.

use thiserror::Error;

use crate::cpu::SegmentedAddress;

#[derive(Debug, Error)]
pub enum CpuError {
    #[error(
        "invalid opcode {opcode:#04x} at {at} (after prefix: {after_prefix})"
    )]
    InvalidOpcode {
        opcode: u8,
        at: SegmentedAddress,
        after_prefix: bool,
    },

    #[error("reserved sub-index {index} for group opcode {opcode:#04x} at {at}")]
    InvalidGroupIndex {
        opcode: u8,
        index: u8,
        at: SegmentedAddress,
    },

    #[error("unhandled operation: {reason} at {at}")]
    UnhandledOperation { reason: String, at: SegmentedAddress },

    #[error("unhandled I/O port {port:#06x} ({direction}) at {at}")]
    UnhandledIoPort {
        port: u16,
        direction: IoDirection,
        at: SegmentedAddress,
    },

    /// Recoverable: DIV/IDIV overflowed or divided by zero. The ALU returns
    /// `None` for these; the executor is responsible for restarting the
    /// instruction and raising `INT 0` rather than surfacing this variant
    /// to a caller.
    #[error("division fault at {at}")]
    DivisionFault { at: SegmentedAddress },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoDirection {
    In,
    Out,
}

impl std::fmt::Display for IoDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoDirection::In => write!(f, "IN"),
            IoDirection::Out => write!(f, "OUT"),
        }
    }
}

impl CpuError {
    /// True for every variant except `DivisionFault`, which the executor
    /// handles internally and never lets escape.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CpuError::DivisionFault { .. })
    }
}
