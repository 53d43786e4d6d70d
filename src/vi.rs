//! Camera-VI Pin Manager: ownership and power sequencing for the seven VGP
//! camera-interface pins.
//!
//! The VGP pins live in the VI block's own registers, not in the GPIO
//! controller, and are output-only: the hardware is never configured for
//! electrical input, and the output-data register is shared with sensor
//! pins, so a software shadow of it is kept instead of reading hardware
//! back. All state here is guarded by the context mutex in `gpio.rs`;
//! nothing in this module locks on its own.

use crate::consts::vi::{
    PIN_COUNT, REG_OUTPUT_DATA, REG_OUTPUT_ENABLE, SHIFT_INVALID, VGP12_SHIFT, VGP_AUX_SHIFT,
};
use crate::error::{Error, Result};
use crate::pin::{PinMode, PinState};
use crate::platform::{ClockRouting, Module, Platform, PowerClientId, VoltageRequest};
use crate::power::RailSequencer;
use log::{debug, warn};

/// Maps a VGP pin index to its bit shift in the VI pin registers.
///
/// VGP1 and VGP2 sit together in one field; VGP0 and VGP3..VGP6 fill a
/// second contiguous field. Anything else yields [`SHIFT_INVALID`], which
/// reads as zero and swallows writes.
pub(crate) fn vi_reg_shift(pin: u32) -> u32 {
    match pin {
        1 | 2 => VGP12_SHIFT + (pin - 1),
        0 => VGP_AUX_SHIFT,
        3..=6 => VGP_AUX_SHIFT + (pin - 2),
        _ => SHIFT_INVALID,
    }
}

/// Output-enable mask covering all seven VGP pins.
fn all_pins_output_enable() -> u32 {
    (0..PIN_COUNT).fold(0, |mask, pin| mask | (1 << vi_reg_shift(pin)))
}

/// How far the 0→1 power-on sequence got; drives the reverse-order unwind
/// when a later step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum UpStep {
    Registered,
    Voltage,
    Clock,
    Routing,
    #[cfg(feature = "camera-power-rail")]
    Rail,
}

/// Camera-VI pin ownership table and shared power state.
#[derive(Debug)]
pub(crate) struct ViPins {
    /// Availability per VGP pin; true = free.
    available: [bool; PIN_COUNT as usize],
    /// Pins currently held. Power, clock, and rail are on iff non-zero.
    power_ref: u32,
    /// Power client registered on the 0→1 transition.
    client: Option<PowerClientId>,
    /// Software shadow of the VI output-data register.
    shadow: u32,
    rail: RailSequencer,
}

impl Default for ViPins {
    fn default() -> Self {
        ViPins {
            available: [true; PIN_COUNT as usize],
            power_ref: 0,
            client: None,
            shadow: 0,
            rail: RailSequencer::default(),
        }
    }
}

impl ViPins {
    /// Claims one VGP pin, powering the block up on the first acquisition.
    pub fn acquire(&mut self, pf: &mut Platform, pin: u32) -> Result<()> {
        if pin >= PIN_COUNT {
            return Err(Error::InvalidPin {
                pin,
                max: PIN_COUNT - 1,
            });
        }
        let slot = pin as usize;
        if !self.available[slot] {
            return Err(Error::AlreadyAllocated { pin });
        }
        if self.power_ref == 0 {
            let client = self.power_on(pf)?;
            self.client = Some(client);
        }
        // Re-asserted on every acquire, not just the first; the write is
        // idempotent and covers all seven pins at once.
        pf.regs
            .write(Module::Vi, 0, REG_OUTPUT_ENABLE, all_pins_output_enable());
        self.available[slot] = false;
        self.power_ref += 1;
        debug!("acquired VGP{pin}, power ref {}", self.power_ref);
        Ok(())
    }

    /// Returns one VGP pin, powering the block down on the last release.
    /// Releasing an already-available pin is a no-op.
    pub fn release(&mut self, pf: &mut Platform, pin: u32) -> Result<()> {
        if pin >= PIN_COUNT {
            return Err(Error::InvalidPin {
                pin,
                max: PIN_COUNT - 1,
            });
        }
        let slot = pin as usize;
        if self.available[slot] {
            return Ok(());
        }
        self.available[slot] = true;
        self.power_ref -= 1;
        debug!("released VGP{pin}, power ref {}", self.power_ref);
        if self.power_ref == 0 {
            self.power_off(pf);
        }
        Ok(())
    }

    /// VGP pins are pre-enabled outputs; only `Output` is accepted, as a
    /// no-op. Every other mode is a caller error.
    pub fn check_mode(mode: PinMode) -> Result<()> {
        if mode == PinMode::Output {
            Ok(())
        } else {
            Err(Error::UnsupportedCameraMode { mode })
        }
    }

    /// Reads a VGP pin from the shadow register. Out-of-range pins read
    /// low.
    pub fn read(&self, pin: u32) -> PinState {
        let shift = vi_reg_shift(pin);
        if shift == SHIFT_INVALID {
            return PinState::Low;
        }
        PinState::from_bit((self.shadow >> shift) & 1)
    }

    /// Drives a VGP pin through the shadow register. Out-of-range pins are
    /// silently dropped.
    pub fn write(&mut self, pf: &mut Platform, pin: u32, state: PinState) {
        let shift = vi_reg_shift(pin);
        if shift == SHIFT_INVALID {
            return;
        }
        match state {
            PinState::High => self.shadow |= 1 << shift,
            PinState::Low => self.shadow &= !(1 << shift),
        }
        pf.regs.write(Module::Vi, 0, REG_OUTPUT_DATA, self.shadow);
    }

    /// 0→1 power-on sequence: power client, default voltage, module clock,
    /// clock routing (external clock to pads, internal to core), and the
    /// pad voltage rail when built with `camera-power-rail`. Any failure
    /// unwinds every completed step in reverse order before returning.
    fn power_on(&mut self, pf: &mut Platform) -> Result<PowerClientId> {
        let client = pf.power.register_power_client(Module::Vi)?;
        debug!("camera-VI power on, client {client:?}");
        let mut done = UpStep::Registered;
        if let Err(e) = self.power_on_steps(pf, client, &mut done) {
            warn!("camera-VI power-on failed after {done:?}: {e}; unwinding");
            self.power_unwind(pf, client, done);
            return Err(e);
        }
        Ok(client)
    }

    fn power_on_steps(
        &mut self,
        pf: &mut Platform,
        client: PowerClientId,
        done: &mut UpStep,
    ) -> Result<()> {
        pf.power
            .set_module_voltage(client, Module::Vi, VoltageRequest::Default)?;
        *done = UpStep::Voltage;
        pf.power.set_module_clock(client, Module::Vi, true)?;
        *done = UpStep::Clock;
        pf.power.set_clock_routing(
            Module::Vi,
            ClockRouting {
                external_to_pads: true,
                internal_to_core: true,
            },
        )?;
        *done = UpStep::Routing;
        #[cfg(feature = "camera-power-rail")]
        {
            self.rail
                .configure(pf.power.as_mut(), pf.board.as_ref(), true)?;
            *done = UpStep::Rail;
        }
        Ok(())
    }

    /// Reverse-order unwind of a partially completed power-on. Individual
    /// inverse steps are best-effort; the client is always unregistered.
    fn power_unwind(&mut self, pf: &mut Platform, client: PowerClientId, done: UpStep) {
        #[cfg(feature = "camera-power-rail")]
        if done >= UpStep::Rail {
            if let Err(e) = self
                .rail
                .configure(pf.power.as_mut(), pf.board.as_ref(), false)
            {
                warn!("rail disable during unwind failed: {e}");
            }
        }
        // Clock routing has no inverse.
        if done >= UpStep::Clock {
            if let Err(e) = pf.power.set_module_clock(client, Module::Vi, false) {
                warn!("clock disable during unwind failed: {e}");
            }
        }
        if done >= UpStep::Voltage {
            if let Err(e) = pf.power.set_module_voltage(client, Module::Vi, VoltageRequest::Off) {
                warn!("voltage off during unwind failed: {e}");
            }
        }
        pf.power.unregister_power_client(client);
    }

    /// Exact inverse of the power-on sequence, run when the last pin goes
    /// back. Teardown is best-effort: failures are logged and the
    /// remaining steps still run.
    fn power_off(&mut self, pf: &mut Platform) {
        let Some(client) = self.client.take() else {
            return;
        };
        debug!("camera-VI power off, client {client:?}");
        #[cfg(feature = "camera-power-rail")]
        if let Err(e) = self
            .rail
            .configure(pf.power.as_mut(), pf.board.as_ref(), false)
        {
            warn!("rail disable failed: {e}");
        }
        if let Err(e) = pf.power.set_module_clock(client, Module::Vi, false) {
            warn!("clock disable failed: {e}");
        }
        if let Err(e) = pf.power.set_module_voltage(client, Module::Vi, VoltageRequest::Off) {
            warn!("voltage off failed: {e}");
        }
        pf.power.unregister_power_client(client);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_sentinel_for_out_of_range_pins() {
        assert_eq!(vi_reg_shift(7), SHIFT_INVALID);
        assert_eq!(vi_reg_shift(100), SHIFT_INVALID);
    }

    #[test]
    fn vgp1_and_vgp2_are_adjacent() {
        assert_eq!(vi_reg_shift(2), vi_reg_shift(1) + 1);
    }

    #[test]
    fn aux_block_is_contiguous() {
        // VGP0 then VGP3..VGP6, one shift apart each.
        let shifts: Vec<u32> = [0, 3, 4, 5, 6].iter().map(|&p| vi_reg_shift(p)).collect();
        for pair in shifts.windows(2) {
            assert_eq!(pair[1], pair[0] + 1);
        }
        // The two blocks are disjoint.
        assert!(shifts[0] > vi_reg_shift(2));
    }

    #[test]
    fn output_enable_mask_covers_exactly_the_seven_pins() {
        let mask = all_pins_output_enable();
        assert_eq!(mask.count_ones(), PIN_COUNT);
        for pin in 0..PIN_COUNT {
            assert_ne!(mask & (1 << vi_reg_shift(pin)), 0);
        }
    }
}
