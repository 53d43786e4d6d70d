//! # tegra-gpio
//!
//! Pin ownership and power sequencing for Tegra-class GPIO controllers:
//! the on-chip GPIO instances, the seven camera-VI (VGP) pins with their
//! reference-counted power/clock/rail bring-up, and pass-through routing
//! to an off-chip GPIO expander.
//!
//! ## Features
//!
//! *   Subsystem open sized from a hardware capability query
//!     ([`Gpio::open`], [`Gpio::capabilities`]).
//! *   Opaque, type-checked pin handles ([`PinHandle`]) covering internal,
//!     camera-VI, and external pins ([`Gpio::acquire_pin`],
//!     [`Gpio::release_pins`]).
//! *   Per-pin mode configuration ([`Gpio::config_pins`]) with
//!     transition-edge pad bookkeeping and ordered interrupt-trigger
//!     programming.
//! *   Race-free single-pin updates through the controller's masked-write
//!     alias registers, with run coalescing in [`Gpio::write_pins`].
//! *   Camera-VI power sequencing: power client, voltage, module clock,
//!     clock routing, and (with the `camera-power-rail` feature) the pad
//!     voltage rail, brought up on first acquire and torn down on last
//!     release, with full reverse-order unwinding on partial failure.
//! *   Logical interrupt-number lookup ([`Gpio::irqs`]).
//!
//! Hardware is reached exclusively through the collaborator traits in
//! [`platform`]; a board crate implements them over its MMIO map, PMU,
//! and board data, which also makes the whole driver testable against an
//! in-memory register file.
//!
//! ## Basic usage
//!
//! ```ignore
//! use tegra_gpio::{Gpio, PinMode, PinState, platform::Platform};
//!
//! let gpio = Gpio::open(Platform {
//!     regs: Box::new(board_regs),
//!     pads: Box::new(board_pads),
//!     power: Box::new(board_pmu),
//!     board: Box::new(board_info),
//!     external: Box::new(expander),
//! })?;
//!
//! // A generic controller pin: flat port index 13, pin 4.
//! let led = gpio.acquire_pin(13, 4)?;
//! gpio.config_pins(&[led], PinMode::Output)?;
//! gpio.write_pins(&[led], &[PinState::High])?;
//!
//! // A camera pin: first acquire powers the VI block up.
//! let flash = gpio.acquire_pin(tegra_gpio::consts::CAMERA_PORT, 3)?;
//! gpio.write_pins(&[flash], &[PinState::High])?;
//!
//! gpio.release_pins(&[led, flash])?;
//! ```
//!
//! ## Pin classes
//!
//! *   **Internal**: flat port indices `0..instances * ports_per_instance`
//!     split into (instance, port) at acquire; full mode/read/write/IRQ
//!     support.
//! *   **Camera-VI**: port [`consts::CAMERA_PORT`], pins 0-6 (VGP0-VGP6).
//!     Output-only; values go through a software shadow of the VI
//!     output-data register.
//! *   **External**: ports [`consts::EXTERNAL_PORT_BASE`] and up;
//!     forwarded to the expander collaborator, no internal bookkeeping.
//!
//! ## Concurrency
//!
//! One mutex inside the [`Gpio`] context serializes every operation
//! across the generic table and the camera-VI state. No operation
//! suspends; the only blocking is the voltage-rail settling wait, which
//! always runs to completion.

pub mod consts;
mod error;
mod gpio;
pub mod pin;
pub mod platform;
mod power;
pub mod regs;
mod vi;

pub use error::{Error, Result};
pub use gpio::Gpio;
pub use pin::{PinHandle, PinMode, PinState};
pub use platform::{Capabilities, Platform};
