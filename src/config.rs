//! Emulator-wide configuration.
//!
//! The core never reads these from disk; the host (debugger, loader, test
//! harness) constructs one and passes it in. See spec §6.

/// Knobs that change how strictly the core treats conditions that are
/// usually programmer error (an unmapped I/O port, an uninitialized
/// interrupt vector) rather than architectural faults.
#[derive(Debug, Clone, Copy)]
pub struct EmulatorConfig {
    /// IN/OUT to a port with no registered handler is a fatal
    /// `UnhandledIOPort` error instead of reading 0 / swallowing the write.
    pub fail_on_unhandled_port: bool,

    /// `INT n` where IVT[n] is the zero offset/segment pair is a fatal
    /// `UnhandledOperation` error instead of jumping to 0000:0000.
    pub error_on_uninitialized_interrupt_handler: bool,

    /// Enables the diagnostic scratch (current instruction name, prefix
    /// labels) and `log::trace!`/`log::debug!` output on the hot path.
    pub debug_mode: bool,

    /// Overrides whether logging happens regardless of `debug_mode`; used by
    /// hosts that want `log::warn!`-level diagnostics (function-handler
    /// corruption, etc.) even in a release build. `None` defers to the
    /// `log` crate's own level filtering.
    pub force_log: Option<bool>,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            fail_on_unhandled_port: false,
            error_on_uninitialized_interrupt_handler: false,
            debug_mode: false,
            force_log: None,
        }
    }
}

impl EmulatorConfig {
    /// Whether diagnostic string scratch should be populated this instruction.
    #[inline(always)]
    pub fn wants_diagnostics(&self) -> bool {
        self.force_log.unwrap_or(self.debug_mode)
    }
}
