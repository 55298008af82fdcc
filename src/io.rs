//! I/O-port dispatcher (spec §4.5).
//!
//! IN/OUT address a 64 KiB port space separate from memory. A host registers
//! one `IoPortHandler` per port (or per device, keyed by whatever ports it
//! claims) with `IoDispatcher`; the executor calls through `in8`/`out8` and
//! friends rather than touching handlers directly, so unmapped-port policy
//! (`EmulatorConfig::fail_on_unhandled_port`) lives in one place.

use std::collections::HashMap;

use crate::config::EmulatorConfig;
use crate::cpu::SegmentedAddress;
use crate::error::{CpuError, IoDirection};

/// A single port-mapped device's read/write surface. Byte/word/dword access
/// all route through here; a handler that only cares about bytes can leave
/// the wider methods at their default (byte-at-a-time, little-endian)
/// implementation.
pub trait IoPortHandler {
    fn read_byte(&mut self, port: u16) -> u8;
    fn write_byte(&mut self, port: u16, value: u8);

    fn read_word(&mut self, port: u16) -> u16 {
        let lo = self.read_byte(port) as u16;
        let hi = self.read_byte(port.wrapping_add(1)) as u16;
        lo | (hi << 8)
    }

    fn write_word(&mut self, port: u16, value: u16) {
        self.write_byte(port, value as u8);
        self.write_byte(port.wrapping_add(1), (value >> 8) as u8);
    }

    fn read_dword(&mut self, port: u16) -> u32 {
        let lo = self.read_word(port) as u32;
        let hi = self.read_word(port.wrapping_add(2)) as u32;
        lo | (hi << 16)
    }

    fn write_dword(&mut self, port: u16, value: u32) {
        self.write_word(port, value as u16);
        self.write_word(port.wrapping_add(2), (value >> 16) as u16);
    }
}

/// Maps I/O ports to the handler that owns them and enforces the
/// unhandled-port policy spec §4.5 and §6 describe.
#[derive(Default)]
pub struct IoDispatcher {
    handlers: HashMap<u16, Box<dyn IoPortHandler>>,
}

impl IoDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for `port`. Registering the same port twice
    /// replaces the previous handler, matching how a host re-plugs a device.
    pub fn register(&mut self, port: u16, handler: Box<dyn IoPortHandler>) {
        self.handlers.insert(port, handler);
    }

    fn unhandled(
        &self,
        port: u16,
        direction: IoDirection,
        at: SegmentedAddress,
        config: &EmulatorConfig,
    ) -> Result<(), CpuError> {
        if config.fail_on_unhandled_port {
            Err(CpuError::UnhandledIoPort { port, direction, at })
        } else {
            log::trace!("unhandled I/O port {:#06x} ({}) at {}", port, direction, at);
            Ok(())
        }
    }

    pub fn in8(&mut self, port: u16, at: SegmentedAddress, config: &EmulatorConfig) -> Result<u8, CpuError> {
        match self.handlers.get_mut(&port) {
            Some(handler) => Ok(handler.read_byte(port)),
            None => {
                self.unhandled(port, IoDirection::In, at, config)?;
                Ok(0xFF)
            }
        }
    }

    pub fn out8(
        &mut self,
        port: u16,
        value: u8,
        at: SegmentedAddress,
        config: &EmulatorConfig,
    ) -> Result<(), CpuError> {
        match self.handlers.get_mut(&port) {
            Some(handler) => {
                handler.write_byte(port, value);
                Ok(())
            }
            None => self.unhandled(port, IoDirection::Out, at, config),
        }
    }

    pub fn in16(&mut self, port: u16, at: SegmentedAddress, config: &EmulatorConfig) -> Result<u16, CpuError> {
        match self.handlers.get_mut(&port) {
            Some(handler) => Ok(handler.read_word(port)),
            None => {
                self.unhandled(port, IoDirection::In, at, config)?;
                Ok(0xFFFF)
            }
        }
    }

    pub fn out16(
        &mut self,
        port: u16,
        value: u16,
        at: SegmentedAddress,
        config: &EmulatorConfig,
    ) -> Result<(), CpuError> {
        match self.handlers.get_mut(&port) {
            Some(handler) => {
                handler.write_word(port, value);
                Ok(())
            }
            None => self.unhandled(port, IoDirection::Out, at, config),
        }
    }

    pub fn in32(&mut self, port: u16, at: SegmentedAddress, config: &EmulatorConfig) -> Result<u32, CpuError> {
        match self.handlers.get_mut(&port) {
            Some(handler) => Ok(handler.read_dword(port)),
            None => {
                self.unhandled(port, IoDirection::In, at, config)?;
                Ok(0xFFFF_FFFF)
            }
        }
    }

    pub fn out32(
        &mut self,
        port: u16,
        value: u32,
        at: SegmentedAddress,
        config: &EmulatorConfig,
    ) -> Result<(), CpuError> {
        match self.handlers.get_mut(&port) {
            Some(handler) => {
                handler.write_dword(port, value);
                Ok(())
            }
            None => self.unhandled(port, IoDirection::Out, at, config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(u8);

    impl IoPortHandler for Echo {
        fn read_byte(&mut self, _port: u16) -> u8 {
            self.0
        }

        fn write_byte(&mut self, _port: u16, value: u8) {
            self.0 = value;
        }
    }

    #[test]
    fn registered_port_round_trips() {
        let mut dispatcher = IoDispatcher::new();
        dispatcher.register(0x60, Box::new(Echo(0)));
        let config = EmulatorConfig::default();
        let at = SegmentedAddress::new(0, 0);
        dispatcher.out8(0x60, 0x42, at, &config).unwrap();
        assert_eq!(dispatcher.in8(0x60, at, &config).unwrap(), 0x42);
    }

    #[test]
    fn unhandled_port_fails_closed_when_configured() {
        let mut dispatcher = IoDispatcher::new();
        let mut config = EmulatorConfig::default();
        config.fail_on_unhandled_port = true;
        let at = SegmentedAddress::new(0, 0);
        assert!(dispatcher.in8(0x300, at, &config).is_err());
    }

    #[test]
    fn unhandled_port_reads_high_byte_by_default() {
        let mut dispatcher = IoDispatcher::new();
        let config = EmulatorConfig::default();
        let at = SegmentedAddress::new(0, 0);
        assert_eq!(dispatcher.in8(0x300, at, &config).unwrap(), 0xFF);
    }
}
