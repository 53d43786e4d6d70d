//! Pin Ownership Table and GPIO Port Manager.
//!
//! [`Gpio`] is the context object for the whole subsystem: it owns the
//! collaborator set, the capability struct, the per-pin ownership table,
//! and the camera-VI manager, all behind one mutex. Cloning the handle is
//! the reference-counted "open"; the table lives until the last clone
//! drops. Holding a single lock across the combined table + camera-VI
//! state keeps the two managers' bookkeeping atomic with respect to each
//! other.

use crate::consts::{CAMERA_PORT, EXTERNAL_PORT_BASE, IRQ_INVALID};
use crate::error::{self, Error, Result};
use crate::pin::{PinHandle, PinInfo, PinMode, PinState};
use crate::platform::{Capabilities, Module, Platform, RegisterSpace};
use crate::regs::{self, GpioRegister};
use crate::vi::ViPins;
use log::{debug, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Splits a flat internal port index into (instance, port-within-instance).
fn split_port(caps: &Capabilities, port: u32) -> (u32, u32) {
    (port / caps.ports_per_instance, port % caps.ports_per_instance)
}

/// Handle to the GPIO subsystem.
///
/// All operations are synchronous and serialized by an internal mutex;
/// the handle is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct Gpio {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug)]
struct Inner {
    platform: Platform,
    caps: Capabilities,
    pins: Vec<PinInfo>,
    vi: ViPins,
}

impl Gpio {
    /// Opens the subsystem: queries the hardware shape from the register
    /// space and sizes the pin-ownership table from it.
    pub fn open(platform: Platform) -> Result<Self> {
        let caps = platform.regs.capabilities();
        if caps.instances == 0
            || caps.ports_per_instance == 0
            || caps.pins_per_port == 0
            || caps.pins_per_port > crate::consts::gpio::MASK_SHIFT
        {
            return Err(Error::UnsupportedFeature(format!(
                "implausible GPIO capability shape: {caps:?}"
            )));
        }
        debug!(
            "opening GPIO subsystem: {} instances x {} ports x {} pins, edge_interrupts={}",
            caps.instances, caps.ports_per_instance, caps.pins_per_port, caps.edge_interrupts
        );
        let pins = vec![PinInfo::default(); caps.total_pins()];
        Ok(Gpio {
            inner: Arc::new(Mutex::new(Inner {
                platform,
                caps,
                pins,
                vi: ViPins::default(),
            })),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The hardware shape queried at open time.
    pub fn capabilities(&self) -> Capabilities {
        self.lock().caps
    }

    /// Acquires a handle to one pin.
    ///
    /// The camera sentinel port routes to the camera-VI manager (which
    /// performs availability and power bookkeeping); ports in the external
    /// range hand back a pass-through handle; everything else is
    /// bounds-checked against the capabilities and encoded. No hardware is
    /// touched on the internal or external paths.
    pub fn acquire_pin(&self, port: u32, pin: u32) -> Result<PinHandle> {
        self.lock().acquire_pin(port, pin)
    }

    /// Releases a batch of handles.
    ///
    /// Releasing a still-configured internal pin invalidates it: the pad
    /// is forced to tristate and the pin returns to its SFIO function (and
    /// a warning is logged, since configuration does not survive release).
    /// Releasing an unconfigured or already-released pin is a no-op.
    pub fn release_pins(&self, handles: &[PinHandle]) -> Result<()> {
        self.lock().release_pins(handles)
    }

    /// Configures a batch of pins to one mode.
    pub fn config_pins(&self, handles: &[PinHandle], mode: PinMode) -> Result<()> {
        self.lock().config_pins(handles, mode)
    }

    /// Reads the current state of a batch of pins. A pin configured as an
    /// output reports the value it drives, not the electrical input.
    pub fn read_pins(&self, handles: &[PinHandle]) -> Result<Vec<PinState>> {
        self.lock().read_pins(handles)
    }

    /// Writes a batch of pins. Consecutive handles within the same
    /// internal port collapse into a single masked register write.
    pub fn write_pins(&self, handles: &[PinHandle], states: &[PinState]) -> Result<()> {
        self.lock().write_pins(handles, states)
    }

    /// Maps each handle to its logical interrupt number. Pure query;
    /// internal controller pins only.
    pub fn irqs(&self, handles: &[PinHandle]) -> Result<Vec<u32>> {
        self.lock().irqs(handles)
    }

    #[cfg(test)]
    pub(crate) fn with_pin_table<R>(&self, f: impl FnOnce(&[PinInfo]) -> R) -> R {
        f(&self.lock().pins)
    }
}

impl Inner {
    /// Bounds-checks an internal location and returns its table index.
    fn check_internal(&self, instance: u32, port: u32, pin: u32) -> Result<usize> {
        if instance >= self.caps.instances || port >= self.caps.ports_per_instance {
            return Err(Error::InvalidPort {
                port: instance * self.caps.ports_per_instance + port,
                max: self.caps.port_count() - 1,
            });
        }
        if pin >= self.caps.pins_per_port {
            return Err(Error::InvalidPin {
                pin,
                max: self.caps.pins_per_port - 1,
            });
        }
        Ok(self.caps.pin_index(instance, port, pin))
    }

    fn acquire_pin(&mut self, port: u32, pin: u32) -> Result<PinHandle> {
        if port == CAMERA_PORT {
            self.vi.acquire(&mut self.platform, pin)?;
            return Ok(PinHandle::Camera { pin: pin as u8 });
        }
        if (EXTERNAL_PORT_BASE..CAMERA_PORT).contains(&port) {
            // Ownership lives with the expander; nothing to book here.
            if pin > u32::from(u8::MAX) {
                return Err(Error::InvalidPin {
                    pin,
                    max: u32::from(u8::MAX),
                });
            }
            return Ok(PinHandle::External {
                port: port as u8,
                pin: pin as u8,
            });
        }
        let max_port = self.caps.port_count() - 1;
        if port > max_port {
            return Err(Error::InvalidPort { port, max: max_port });
        }
        let max_pin = self.caps.pins_per_port - 1;
        if pin > max_pin {
            return Err(Error::InvalidPin { pin, max: max_pin });
        }
        let (instance, sub_port) = split_port(&self.caps, port);
        debug!("acquired pin inst={instance} port={sub_port} pin={pin}");
        Ok(PinHandle::Internal {
            instance: instance as u8,
            port: sub_port as u8,
            pin: pin as u8,
        })
    }

    fn release_pins(&mut self, handles: &[PinHandle]) -> Result<()> {
        for &handle in handles {
            match handle {
                PinHandle::Camera { pin } => {
                    self.vi.release(&mut self.platform, u32::from(pin))?;
                }
                PinHandle::External { .. } => {}
                PinHandle::Internal {
                    instance,
                    port,
                    pin,
                } => {
                    self.invalidate_pin(u32::from(instance), u32::from(port), u32::from(pin))?;
                }
            }
        }
        Ok(())
    }

    /// Release semantic for internal pins: a still-configured pin is
    /// forced back to a tristated SFIO pad. Configuration never survives
    /// release; callers that relied on it must reconfigure after the next
    /// acquire.
    fn invalidate_pin(&mut self, instance: u32, port: u32, pin: u32) -> Result<()> {
        let idx = self.check_internal(instance, port, pin)?;
        if !self.pins[idx].used {
            return Ok(());
        }
        warn!("releasing in-use pin inst={instance} port={port} pin={pin}; forcing tristate");
        self.platform.pads.set_tristate(instance, port, pin, true)?;
        self.platform.pads.set_io_power(instance, port, pin, false)?;
        regs::masked_write(
            self.platform.regs.as_mut(),
            instance,
            port,
            GpioRegister::Cnf,
            pin,
            0,
        );
        let info = &mut self.pins[idx];
        info.used = false;
        info.mode = PinMode::Inactive;
        info.irq_number = IRQ_INVALID;
        Ok(())
    }

    fn config_pins(&mut self, handles: &[PinHandle], mode: PinMode) -> Result<()> {
        for &handle in handles {
            match handle {
                // VGP outputs are pre-enabled at acquire time, so Output is
                // accepted as a no-op; everything else is a caller error.
                PinHandle::Camera { .. } => ViPins::check_mode(mode)?,
                PinHandle::External { port, pin } => {
                    self.platform
                        .external
                        .config_pin(u32::from(port), u32::from(pin), mode)?;
                }
                PinHandle::Internal {
                    instance,
                    port,
                    pin,
                } => {
                    self.config_internal(u32::from(instance), u32::from(port), u32::from(pin), mode)?;
                }
            }
        }
        Ok(())
    }

    fn config_internal(&mut self, instance: u32, port: u32, pin: u32, mode: PinMode) -> Result<()> {
        let idx = self.check_internal(instance, port, pin)?;
        if matches!(
            mode,
            PinMode::InputInterruptRisingEdge | PinMode::InputInterruptFallingEdge
        ) && !self.caps.edge_interrupts
        {
            return Err(error::unsupported_edge_interrupts());
        }

        // Pad bookkeeping happens only on an inactive<->active transition;
        // reconfiguring an active pin must not toggle the pad group again.
        let was_used = self.pins[idx].used;
        let activating = PinInfo::activates(mode);
        if !was_used && activating {
            self.platform.pads.set_tristate(instance, port, pin, false)?;
            self.platform.pads.set_io_power(instance, port, pin, true)?;
        } else if was_used && !activating {
            self.platform.pads.set_tristate(instance, port, pin, true)?;
            self.platform.pads.set_io_power(instance, port, pin, false)?;
        }

        let hw = self.platform.regs.as_mut();
        let mut interrupt_mode = false;
        match mode {
            PinMode::Inactive => {
                regs::masked_write(hw, instance, port, GpioRegister::Oe, pin, 0);
                regs::masked_write(hw, instance, port, GpioRegister::Cnf, pin, 0);
            }
            PinMode::Output => {
                regs::masked_write(hw, instance, port, GpioRegister::Cnf, pin, 1);
                regs::masked_write(hw, instance, port, GpioRegister::Oe, pin, 1);
            }
            PinMode::InputData => {
                regs::masked_write(hw, instance, port, GpioRegister::Oe, pin, 0);
                regs::masked_write(hw, instance, port, GpioRegister::Cnf, pin, 1);
            }
            PinMode::InputInterruptLow => {
                config_interrupt(hw, instance, port, pin, 0, 0, 0);
                interrupt_mode = true;
            }
            PinMode::InputInterruptHigh => {
                config_interrupt(hw, instance, port, pin, 1, 0, 0);
                interrupt_mode = true;
            }
            PinMode::InputInterruptAny => {
                config_interrupt(hw, instance, port, pin, 0, 0, 1);
                interrupt_mode = true;
            }
            PinMode::InputInterruptRisingEdge => {
                config_interrupt(hw, instance, port, pin, 1, 1, 0);
                interrupt_mode = true;
            }
            PinMode::InputInterruptFallingEdge => {
                config_interrupt(hw, instance, port, pin, 0, 1, 0);
                interrupt_mode = true;
            }
            PinMode::InterruptEnable => {
                regs::masked_write(hw, instance, port, GpioRegister::IntEnable, pin, 1);
            }
            PinMode::InterruptDisable => {
                regs::masked_write(hw, instance, port, GpioRegister::IntEnable, pin, 0);
            }
            PinMode::Function => {
                regs::masked_write(hw, instance, port, GpioRegister::Cnf, pin, 0);
            }
        }

        let irq = self.caps.irq_for(instance, port, pin);
        let info = &mut self.pins[idx];
        info.used = activating;
        info.instance = instance as u8;
        info.port = port as u8;
        info.pin = pin as u8;
        info.mode = mode;
        if interrupt_mode {
            info.irq_number = irq;
        } else if mode == PinMode::Inactive {
            info.irq_number = IRQ_INVALID;
        }
        Ok(())
    }

    fn read_pins(&mut self, handles: &[PinHandle]) -> Result<Vec<PinState>> {
        let mut states = Vec::with_capacity(handles.len());
        for &handle in handles {
            let state = match handle {
                PinHandle::Camera { pin } => self.vi.read(u32::from(pin)),
                PinHandle::External { port, pin } => self
                    .platform
                    .external
                    .read_pin(u32::from(port), u32::from(pin))?,
                PinHandle::Internal {
                    instance,
                    port,
                    pin,
                } => {
                    let (instance, port, pin) =
                        (u32::from(instance), u32::from(port), u32::from(pin));
                    self.check_internal(instance, port, pin)?;
                    let hw = self.platform.regs.as_ref();
                    let oe = regs::read(hw, instance, port, GpioRegister::Oe);
                    // An output pin reports its driven value, not the
                    // electrical input.
                    let reg = if oe & (1 << pin) != 0 {
                        GpioRegister::Out
                    } else {
                        GpioRegister::In
                    };
                    PinState::from_bit((regs::read(hw, instance, port, reg) >> pin) & 1)
                }
            };
            states.push(state);
        }
        Ok(states)
    }

    fn write_pins(&mut self, handles: &[PinHandle], states: &[PinState]) -> Result<()> {
        if handles.len() != states.len() {
            return Err(Error::LengthMismatch {
                handles: handles.len(),
                states: states.len(),
            });
        }
        let mut i = 0;
        while i < handles.len() {
            match handles[i] {
                PinHandle::Camera { pin } => {
                    self.vi.write(&mut self.platform, u32::from(pin), states[i]);
                    i += 1;
                }
                PinHandle::External { port, pin } => {
                    self.platform
                        .external
                        .write_pin(u32::from(port), u32::from(pin), states[i])?;
                    i += 1;
                }
                PinHandle::Internal {
                    instance,
                    port,
                    pin,
                } => {
                    let (instance, port) = (u32::from(instance), u32::from(port));
                    self.check_internal(instance, port, u32::from(pin))?;
                    // Coalesce the run of handles in this same port into a
                    // single masked write. The masked payload carries an
                    // independent enable+data bit pair per pin, so one
                    // hardware write covers the whole run.
                    let mut payload = regs::masked_value(u32::from(pin), states[i].bit());
                    i += 1;
                    while i < handles.len() {
                        let PinHandle::Internal {
                            instance: run_instance,
                            port: run_port,
                            pin: run_pin,
                        } = handles[i]
                        else {
                            break;
                        };
                        if u32::from(run_instance) != instance || u32::from(run_port) != port {
                            break;
                        }
                        self.check_internal(instance, port, u32::from(run_pin))?;
                        payload |= regs::masked_value(u32::from(run_pin), states[i].bit());
                        i += 1;
                    }
                    self.platform.regs.write(
                        Module::Gpio,
                        instance,
                        GpioRegister::Out.masked_offset(port),
                        payload,
                    );
                }
            }
        }
        Ok(())
    }

    fn irqs(&self, handles: &[PinHandle]) -> Result<Vec<u32>> {
        handles
            .iter()
            .map(|&handle| match handle {
                PinHandle::Internal {
                    instance,
                    port,
                    pin,
                } => {
                    let (instance, port, pin) =
                        (u32::from(instance), u32::from(port), u32::from(pin));
                    self.check_internal(instance, port, pin)?;
                    Ok(self.caps.irq_for(instance, port, pin))
                }
                _ => Err(error::unsupported_irq_query()),
            })
            .collect()
    }
}

/// Programs one pin's interrupt trigger.
///
/// The write order is load-bearing (controller erratum on trigger
/// reprogramming while the pad drives): output-enable must drop first, the
/// pad must be in GPIO mode, the stale status bit must be cleared, and
/// only then may INT_LVL change. The INT_LVL update is a full
/// read-modify-write because the register packs bit/edge/delta fields for
/// all eight pins; sibling fields must be preserved.
fn config_interrupt(
    hw: &mut dyn RegisterSpace,
    instance: u32,
    port: u32,
    pin: u32,
    bit: u32,
    edge: u32,
    delta: u32,
) {
    use crate::consts::gpio::{INT_LVL_BIT_SHIFT, INT_LVL_DELTA_SHIFT, INT_LVL_EDGE_SHIFT};

    regs::masked_write(hw, instance, port, GpioRegister::Oe, pin, 0);
    regs::masked_write(hw, instance, port, GpioRegister::Cnf, pin, 1);
    regs::masked_write(hw, instance, port, GpioRegister::IntClear, pin, 1);

    let mut lvl = regs::read(hw, instance, port, GpioRegister::IntLevel);
    lvl &= !((1 << (pin + INT_LVL_BIT_SHIFT))
        | (1 << (pin + INT_LVL_EDGE_SHIFT))
        | (1 << (pin + INT_LVL_DELTA_SHIFT)));
    lvl |= (bit << (pin + INT_LVL_BIT_SHIFT))
        | (edge << (pin + INT_LVL_EDGE_SHIFT))
        | (delta << (pin + INT_LVL_DELTA_SHIFT));
    regs::write(hw, instance, port, GpioRegister::IntLevel, lvl);
}
