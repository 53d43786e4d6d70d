//! Collaborator traits the driver consumes.
//!
//! The subsystem never touches hardware directly; it talks to a register
//! file, the pad-control block, the power manager, board discovery, and an
//! optional off-chip GPIO expander through the traits below. A board crate
//! implements them over its MMIO map and PMU; tests implement them over an
//! in-memory register file.

use crate::error::Result;
use crate::pin::{PinMode, PinState};

/// Hardware block addressed through the register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Module {
    /// The GPIO controller instances.
    Gpio,
    /// The camera video-input block (VGP pin registers).
    Vi,
}

/// Hardware shape reported by the capability query at open time.
///
/// Determines the size of the pin-ownership table and which interrupt
/// trigger modes are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Number of GPIO controller instances.
    pub instances: u32,
    /// Ports per controller instance.
    pub ports_per_instance: u32,
    /// Pins per port.
    pub pins_per_port: u32,
    /// Logical interrupt number of instance 0, port 0, pin 0.
    pub irq_base: u32,
    /// Whether the controller supports edge-triggered interrupts.
    pub edge_interrupts: bool,
}

impl Capabilities {
    /// Total number of internal ports across all instances.
    pub fn port_count(&self) -> u32 {
        self.instances * self.ports_per_instance
    }

    /// Total number of physical pins (the pin-table size).
    pub fn total_pins(&self) -> usize {
        (self.port_count() * self.pins_per_port) as usize
    }

    /// Flat table index of a pin.
    pub(crate) fn pin_index(&self, instance: u32, port: u32, pin: u32) -> usize {
        ((instance * self.ports_per_instance + port) * self.pins_per_port + pin) as usize
    }

    /// Logical interrupt number of a pin.
    pub(crate) fn irq_for(&self, instance: u32, port: u32, pin: u32) -> u32 {
        self.irq_base + self.pin_index(instance, port, pin) as u32
    }
}

/// Flat addressable register file, keyed by `(module, instance, offset)`.
///
/// No error returns: register presence is guaranteed by the capability
/// bounds enforced in the layers above.
pub trait RegisterSpace: Send {
    /// Reports the hardware shape. Queried once, at subsystem open.
    fn capabilities(&self) -> Capabilities;
    /// Unmasked full-register read.
    fn read(&self, module: Module, instance: u32, offset: u32) -> u32;
    /// Unmasked full-register write.
    fn write(&mut self, module: Module, instance: u32, offset: u32, value: u32);
}

/// Pad-group tristate and per-pin IO power-rail control (the pinmux block).
pub trait PinPads: Send {
    /// Tristates (high impedance) or drives the pad group of a pin.
    fn set_tristate(&mut self, instance: u32, port: u32, pin: u32, tristate: bool) -> Result<()>;
    /// Enables or disables the IO power rail feeding a pin's pad group.
    fn set_io_power(&mut self, instance: u32, port: u32, pin: u32, enable: bool) -> Result<()>;
}

/// Opaque power-client registration token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PowerClientId(pub u32);

/// Module voltage request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoltageRequest {
    /// Let the power manager pick the module's default operating voltage.
    Default,
    /// Power the module down.
    Off,
    /// Request an explicit level in millivolts.
    Millivolts(u32),
}

/// Module clock routing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockRouting {
    /// Route the external clock to the pad ring.
    pub external_to_pads: bool,
    /// Route the internal clock to the module core.
    pub internal_to_core: bool,
}

/// Capability descriptor of a board voltage rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RailCapabilities {
    /// Operating voltage the rail requests when enabled.
    pub requested_millivolts: u32,
}

/// Power-management collaborator. Every call is synchronous; settle times
/// are reported back to the caller, which is responsible for waiting them
/// out.
pub trait PowerServices: Send {
    /// Registers a power client for a module. One client per 0→1 power
    /// transition of the camera-VI manager.
    fn register_power_client(&mut self, module: Module) -> Result<PowerClientId>;
    /// Unregisters a power client. Infallible teardown.
    fn unregister_power_client(&mut self, client: PowerClientId);
    /// Requests a module voltage on behalf of a client.
    fn set_module_voltage(
        &mut self,
        client: PowerClientId,
        module: Module,
        request: VoltageRequest,
    ) -> Result<()>;
    /// Gates a module clock on or off.
    fn set_module_clock(
        &mut self,
        client: PowerClientId,
        module: Module,
        enable: bool,
    ) -> Result<()>;
    /// Configures module clock routing.
    fn set_clock_routing(&mut self, module: Module, routing: ClockRouting) -> Result<()>;
    /// Queries a board voltage rail's capability descriptor.
    fn rail_capabilities(&self, rail: u32) -> Result<RailCapabilities>;
    /// Sets a rail voltage (`None` = off). Returns the hardware-mandated
    /// settling time in microseconds; 0 means none required.
    fn set_rail_voltage(&mut self, rail: u32, millivolts: Option<u32>) -> Result<u32>;
}

/// Interface type tag of one board connectivity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusInterface {
    /// A PMU-controlled voltage rail.
    VoltageRail,
    /// An I2C-attached peripheral.
    I2c,
    /// A GPIO-attached peripheral.
    Gpio,
}

/// One address entry of a peripheral connectivity descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RailAddress {
    /// How the entry is reached.
    pub interface: BusInterface,
    /// Bus-specific address (rail id for voltage rails).
    pub address: u32,
}

/// Board-discovered peripheral connectivity descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RailConnectivity {
    /// Address list, in sequencing order.
    pub addresses: Vec<RailAddress>,
}

/// Board-discovery collaborator: GUID to connectivity descriptor.
pub trait BoardInfo: Send {
    /// Resolves a peripheral GUID. `None` if the board has no such entry.
    fn find_connectivity(&self, guid: u64) -> Option<RailConnectivity>;
}

/// Off-chip GPIO expander collaborator. Pins on ports in the external
/// range are owned by this controller; the port manager only forwards.
pub trait ExternalGpio: Send {
    /// Configures an expander pin.
    fn config_pin(&mut self, port: u32, pin: u32, mode: PinMode) -> Result<()>;
    /// Reads an expander pin.
    fn read_pin(&mut self, port: u32, pin: u32) -> Result<PinState>;
    /// Writes an expander pin.
    fn write_pin(&mut self, port: u32, pin: u32, state: PinState) -> Result<()>;
}

/// The full collaborator set a board hands to [`Gpio::open`].
///
/// [`Gpio::open`]: crate::Gpio::open
pub struct Platform {
    /// GPIO and VI register file.
    pub regs: Box<dyn RegisterSpace>,
    /// Pad tristate / IO power control.
    pub pads: Box<dyn PinPads>,
    /// Power, clock, and rail services.
    pub power: Box<dyn PowerServices>,
    /// Board connectivity discovery.
    pub board: Box<dyn BoardInfo>,
    /// Off-chip GPIO expander.
    pub external: Box<dyn ExternalGpio>,
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("capabilities", &self.regs.capabilities())
            .finish_non_exhaustive()
    }
}
