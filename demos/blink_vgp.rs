//! Drives a camera-VI flash pin (VGP3) and a generic controller pin
//! against a simulated platform. Run with `RUST_LOG=debug` to watch the
//! power sequencing and register traffic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tegra_gpio::platform::{
    BoardInfo, BusInterface, Capabilities, ClockRouting, ExternalGpio, Module, PinPads, Platform,
    PowerClientId, PowerServices, RailAddress, RailCapabilities, RailConnectivity, RegisterSpace,
    VoltageRequest,
};
use tegra_gpio::{consts, Gpio, PinMode, PinState, Result};

/// Simulated board: a flat register file and print-through collaborators.
#[derive(Clone, Default)]
struct SimBoard {
    regs: Arc<Mutex<HashMap<(Module, u32, u32), u32>>>,
}

impl RegisterSpace for SimBoard {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            instances: 4,
            ports_per_instance: 4,
            pins_per_port: 8,
            irq_base: 64,
            edge_interrupts: true,
        }
    }
    fn read(&self, module: Module, instance: u32, offset: u32) -> u32 {
        *self
            .regs
            .lock()
            .unwrap()
            .get(&(module, instance, offset))
            .unwrap_or(&0)
    }
    fn write(&mut self, module: Module, instance: u32, offset: u32, value: u32) {
        self.regs
            .lock()
            .unwrap()
            .insert((module, instance, offset), value);
    }
}

impl PinPads for SimBoard {
    fn set_tristate(&mut self, instance: u32, port: u32, pin: u32, tristate: bool) -> Result<()> {
        println!("pads: inst={instance} port={port} pin={pin} tristate={tristate}");
        Ok(())
    }
    fn set_io_power(&mut self, _: u32, _: u32, _: u32, _: bool) -> Result<()> {
        Ok(())
    }
}

impl PowerServices for SimBoard {
    fn register_power_client(&mut self, module: Module) -> Result<PowerClientId> {
        println!("power: register client for {module:?}");
        Ok(PowerClientId(1))
    }
    fn unregister_power_client(&mut self, client: PowerClientId) {
        println!("power: unregister {client:?}");
    }
    fn set_module_voltage(
        &mut self,
        _: PowerClientId,
        module: Module,
        request: VoltageRequest,
    ) -> Result<()> {
        println!("power: {module:?} voltage {request:?}");
        Ok(())
    }
    fn set_module_clock(&mut self, _: PowerClientId, module: Module, enable: bool) -> Result<()> {
        println!("power: {module:?} clock enable={enable}");
        Ok(())
    }
    fn set_clock_routing(&mut self, module: Module, routing: ClockRouting) -> Result<()> {
        println!("power: {module:?} routing {routing:?}");
        Ok(())
    }
    fn rail_capabilities(&self, _: u32) -> Result<RailCapabilities> {
        Ok(RailCapabilities {
            requested_millivolts: 1800,
        })
    }
    fn set_rail_voltage(&mut self, rail: u32, millivolts: Option<u32>) -> Result<u32> {
        println!("power: rail {rail} -> {millivolts:?} mV");
        Ok(100) // 100 us settle
    }
}

impl BoardInfo for SimBoard {
    fn find_connectivity(&self, _guid: u64) -> Option<RailConnectivity> {
        Some(RailConnectivity {
            addresses: vec![RailAddress {
                interface: BusInterface::VoltageRail,
                address: 4,
            }],
        })
    }
}

impl ExternalGpio for SimBoard {
    fn config_pin(&mut self, _: u32, _: u32, _: PinMode) -> Result<()> {
        Ok(())
    }
    fn read_pin(&mut self, _: u32, _: u32) -> Result<PinState> {
        Ok(PinState::Low)
    }
    fn write_pin(&mut self, _: u32, _: u32, _: PinState) -> Result<()> {
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let board = SimBoard::default();
    let gpio = Gpio::open(Platform {
        regs: Box::new(board.clone()),
        pads: Box::new(board.clone()),
        power: Box::new(board.clone()),
        board: Box::new(board.clone()),
        external: Box::new(board),
    })?;
    println!("opened: {:?}", gpio.capabilities());

    // Camera flash on VGP3: the first acquire powers the VI block up.
    let flash = gpio.acquire_pin(consts::CAMERA_PORT, 3)?;
    for _ in 0..3 {
        gpio.write_pins(&[flash], &[PinState::High])?;
        gpio.write_pins(&[flash], &[PinState::Low])?;
    }

    // A generic controller pin, flat port 13 pin 4.
    let led = gpio.acquire_pin(13, 4)?;
    gpio.config_pins(&[led], PinMode::Output)?;
    gpio.write_pins(&[led], &[PinState::High])?;
    println!("led reads {:?}", gpio.read_pins(&[led])?[0]);
    println!("led irq {}", gpio.irqs(&[led])?[0]);

    gpio.release_pins(&[flash, led])?;
    println!("released; VI block powered down");
    Ok(())
}
