//! Register Access Layer: masked and unmasked access to the per-port GPIO
//! controller registers.
//!
//! Every register field exists once per port within an instance, at
//! `field_offset + port * PORT_STRIDE`. The masked alias bank mirrors the
//! same layout at `MASKED_ALIAS_BASE`; a single write there carries both a
//! write-enable mask and the data bits, so one pin can be flipped in a
//! shared eight-pin register without a read-modify-write and without
//! disturbing siblings from another thread.

use crate::consts::gpio::{MASKED_ALIAS_BASE, MASK_SHIFT, PORT_STRIDE};
use crate::platform::{Module, RegisterSpace};
use log::trace;

/// Per-port register fields of one GPIO controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioRegister {
    /// Function select: 1 = GPIO, 0 = SFIO (pinmux function).
    Cnf,
    /// Output enable.
    Oe,
    /// Output data.
    Out,
    /// Input data (read-only).
    In,
    /// Interrupt status.
    IntStatus,
    /// Interrupt enable.
    IntEnable,
    /// Interrupt level/edge/delta configuration.
    IntLevel,
    /// Interrupt clear (write-one-to-clear).
    IntClear,
}

impl GpioRegister {
    fn field_offset(self) -> u32 {
        use crate::consts::gpio::*;
        match self {
            GpioRegister::Cnf => REG_CNF,
            GpioRegister::Oe => REG_OE,
            GpioRegister::Out => REG_OUT,
            GpioRegister::In => REG_IN,
            GpioRegister::IntStatus => REG_INT_STA,
            GpioRegister::IntEnable => REG_INT_ENB,
            GpioRegister::IntLevel => REG_INT_LVL,
            GpioRegister::IntClear => REG_INT_CLR,
        }
    }

    /// Offset of this register for `port` within its instance.
    pub fn offset(self, port: u32) -> u32 {
        self.field_offset() + port * PORT_STRIDE
    }

    /// Offset of this register's masked alias for `port`.
    pub fn masked_offset(self, port: u32) -> u32 {
        MASKED_ALIAS_BASE + self.offset(port)
    }
}

/// Payload of a masked-alias write touching exactly one pin: the pin's
/// write-enable bit plus its data bit.
#[inline]
pub fn masked_value(pin: u32, value: u32) -> u32 {
    (1 << (pin + MASK_SHIFT)) | ((value & 1) << pin)
}

/// Atomically sets or clears one pin's bit in a shared per-port register.
pub fn masked_write(
    hw: &mut dyn RegisterSpace,
    instance: u32,
    port: u32,
    reg: GpioRegister,
    pin: u32,
    value: u32,
) {
    let payload = masked_value(pin, value);
    trace!(
        "masked write inst={instance} port={port} {reg:?} pin={pin} val={value} payload=0x{payload:05X}"
    );
    hw.write(Module::Gpio, instance, reg.masked_offset(port), payload);
}

/// Unmasked full-register read.
pub fn read(hw: &dyn RegisterSpace, instance: u32, port: u32, reg: GpioRegister) -> u32 {
    let value = hw.read(Module::Gpio, instance, reg.offset(port));
    trace!("read inst={instance} port={port} {reg:?} = 0x{value:08X}");
    value
}

/// Unmasked full-register write.
pub fn write(hw: &mut dyn RegisterSpace, instance: u32, port: u32, reg: GpioRegister, value: u32) {
    trace!("write inst={instance} port={port} {reg:?} = 0x{value:08X}");
    hw.write(Module::Gpio, instance, reg.offset(port), value);
}
