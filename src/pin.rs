//! Pin handles, modes, and the per-pin ownership record.

use crate::consts::{IRQ_INVALID, PIN_NONE};

/// Opaque handle to one physical pin.
///
/// Handles are produced by [`Gpio::acquire_pin`] and consumed by every
/// other operation. The three variants route to the three pin classes: the
/// on-chip controller, the camera-VI block, and the off-chip expander. A
/// handle never aliases two different physical pins.
///
/// [`Gpio::acquire_pin`]: crate::Gpio::acquire_pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinHandle {
    /// A pin of an on-chip GPIO controller instance.
    Internal {
        /// Controller instance.
        instance: u8,
        /// Port within the instance.
        port: u8,
        /// Pin within the port.
        pin: u8,
    },
    /// A camera-VI (VGP) pin.
    Camera {
        /// VGP pin index (0-6).
        pin: u8,
    },
    /// A pin owned by the off-chip GPIO expander.
    External {
        /// Expander port number (as passed to acquire).
        port: u8,
        /// Pin within the expander port.
        pin: u8,
    },
}

/// Configurable pin mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Released to the pinmux default, pad tristated.
    Inactive,
    /// Driven output.
    Output,
    /// Plain input.
    InputData,
    /// Interrupt on low level.
    InputInterruptLow,
    /// Interrupt on high level.
    InputInterruptHigh,
    /// Interrupt on any level change.
    InputInterruptAny,
    /// Interrupt on rising edge (edge-capable hardware only).
    InputInterruptRisingEdge,
    /// Interrupt on falling edge (edge-capable hardware only).
    InputInterruptFallingEdge,
    /// Unmask the pin's interrupt line.
    InterruptEnable,
    /// Mask the pin's interrupt line.
    InterruptDisable,
    /// Hand the pad to its SFIO pinmux function.
    Function,
}

/// Electrical pin state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    /// Logic low.
    Low,
    /// Logic high.
    High,
}

impl PinState {
    /// Register bit value of this state.
    #[inline]
    pub fn bit(self) -> u32 {
        match self {
            PinState::Low => 0,
            PinState::High => 1,
        }
    }

    /// State of a register bit.
    #[inline]
    pub fn from_bit(bit: u32) -> Self {
        if bit != 0 {
            PinState::High
        } else {
            PinState::Low
        }
    }
}

/// Per-pin ownership record. One per physical pin, held in the context's
/// table for the context lifetime.
#[derive(Debug, Clone)]
pub(crate) struct PinInfo {
    /// True between a configure-to-active-mode and a return to inactive.
    pub used: bool,
    /// Location of the pin this record tracks.
    pub instance: u8,
    pub port: u8,
    pub pin: u8,
    /// Last configured mode.
    pub mode: PinMode,
    /// Next pin sharing this pin's interrupt line, or `PIN_NONE`.
    pub next_pin: u16,
    /// Assigned logical interrupt number, or `IRQ_INVALID`.
    pub irq_number: u32,
}

impl Default for PinInfo {
    fn default() -> Self {
        PinInfo {
            used: false,
            instance: 0,
            port: 0,
            pin: 0,
            mode: PinMode::Inactive,
            next_pin: PIN_NONE,
            irq_number: IRQ_INVALID,
        }
    }
}

impl PinInfo {
    /// True for every mode that claims the pin.
    pub fn activates(mode: PinMode) -> bool {
        mode != PinMode::Inactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_info_default_is_unused_with_invalid_irq() {
        let info = PinInfo::default();
        assert!(!info.used);
        assert_eq!(info.mode, PinMode::Inactive);
        assert_eq!(info.irq_number, IRQ_INVALID);
        assert_eq!(info.next_pin, PIN_NONE);
    }

    #[test]
    fn every_non_inactive_mode_activates() {
        for mode in [
            PinMode::Output,
            PinMode::InputData,
            PinMode::InputInterruptLow,
            PinMode::InputInterruptHigh,
            PinMode::InputInterruptAny,
            PinMode::InputInterruptRisingEdge,
            PinMode::InputInterruptFallingEdge,
            PinMode::InterruptEnable,
            PinMode::InterruptDisable,
            PinMode::Function,
        ] {
            assert!(PinInfo::activates(mode), "{mode:?} should activate");
        }
        assert!(!PinInfo::activates(PinMode::Inactive));
    }

    #[test]
    fn pin_state_bit_round_trip() {
        assert_eq!(PinState::High.bit(), 1);
        assert_eq!(PinState::Low.bit(), 0);
        assert_eq!(PinState::from_bit(1), PinState::High);
        assert_eq!(PinState::from_bit(0), PinState::Low);
    }
}
