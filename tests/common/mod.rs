//! Shared mock platform for integration tests: an in-memory register file
//! that emulates the masked-alias write semantics, plus recording fakes
//! for the pad, power, board, and external-GPIO collaborators.

#![allow(dead_code)] // each test binary uses a subset

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tegra_gpio::consts::gpio::{MASKED_ALIAS_BASE, MASK_SHIFT};
use tegra_gpio::pin::{PinMode, PinState};
use tegra_gpio::platform::{
    BoardInfo, BusInterface, Capabilities, ClockRouting, ExternalGpio, Module, PinPads,
    PowerClientId, PowerServices, RailAddress, RailCapabilities, RailConnectivity, RegisterSpace,
    VoltageRequest,
};
use tegra_gpio::{Error, Gpio, Platform, Result};

pub const RAIL_ADDRESS: u32 = 0x2A;

#[derive(Debug)]
pub struct MockState {
    pub regs: HashMap<(Module, u32, u32), u32>,
    /// Every raw register write, in order: (module, instance, offset, value).
    pub reg_writes: Vec<(Module, u32, u32, u32)>,
    /// (instance, port, pin, tristate)
    pub tristate_events: Vec<(u32, u32, u32, bool)>,
    /// (instance, port, pin, enable)
    pub io_power_events: Vec<(u32, u32, u32, bool)>,
    pub clients_registered: u32,
    pub clients_unregistered: u32,
    pub voltage_requests: Vec<VoltageRequest>,
    pub clock_calls: Vec<bool>,
    pub routing_calls: u32,
    pub rail_queries: u32,
    pub rail_sets: Vec<(u32, Option<u32>)>,
    pub board_lookups: u32,
    pub external_writes: Vec<(u32, u32, PinState)>,
    pub external_configs: Vec<(u32, u32, PinMode)>,
    pub external_level: bool,
    // Failure injection
    pub fail_voltage: bool,
    pub fail_clock_enable: bool,
    pub fail_routing: bool,
    pub fail_rail_enable: bool,
    pub board_present: bool,
    pub rail_settle_us: u32,
    pub rail_millivolts: u32,
}

impl Default for MockState {
    fn default() -> Self {
        MockState {
            regs: HashMap::new(),
            reg_writes: Vec::new(),
            tristate_events: Vec::new(),
            io_power_events: Vec::new(),
            clients_registered: 0,
            clients_unregistered: 0,
            voltage_requests: Vec::new(),
            clock_calls: Vec::new(),
            routing_calls: 0,
            rail_queries: 0,
            rail_sets: Vec::new(),
            board_lookups: 0,
            external_writes: Vec::new(),
            external_configs: Vec::new(),
            external_level: false,
            fail_voltage: false,
            fail_clock_enable: false,
            fail_routing: false,
            fail_rail_enable: false,
            board_present: true,
            rail_settle_us: 0,
            rail_millivolts: 1800,
        }
    }
}

#[derive(Clone)]
pub struct Mock {
    caps: Capabilities,
    pub state: Arc<Mutex<MockState>>,
}

impl Mock {
    pub fn new(caps: Capabilities) -> Self {
        Mock {
            caps,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn platform(&self) -> Platform {
        Platform {
            regs: Box::new(self.clone()),
            pads: Box::new(self.clone()),
            power: Box::new(self.clone()),
            board: Box::new(self.clone()),
            external: Box::new(self.clone()),
        }
    }
}

impl RegisterSpace for Mock {
    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn read(&self, module: Module, instance: u32, offset: u32) -> u32 {
        *self
            .state
            .lock()
            .unwrap()
            .regs
            .get(&(module, instance, offset))
            .unwrap_or(&0)
    }

    fn write(&mut self, module: Module, instance: u32, offset: u32, value: u32) {
        let mut state = self.state.lock().unwrap();
        state.reg_writes.push((module, instance, offset, value));
        // Masked-alias emulation: the payload carries a write-enable mask
        // above the data bits; only enabled pins change in the backing
        // register, like the hardware alias bank.
        if module == Module::Gpio && offset >= MASKED_ALIAS_BASE {
            let backing = offset - MASKED_ALIAS_BASE;
            let enable = (value >> MASK_SHIFT) & 0xFF;
            let data = value & 0xFF;
            let old = *state.regs.get(&(module, instance, backing)).unwrap_or(&0);
            let new = (old & !enable) | (data & enable);
            state.regs.insert((module, instance, backing), new);
        } else {
            state.regs.insert((module, instance, offset), value);
        }
    }
}

impl PinPads for Mock {
    fn set_tristate(&mut self, instance: u32, port: u32, pin: u32, tristate: bool) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .tristate_events
            .push((instance, port, pin, tristate));
        Ok(())
    }

    fn set_io_power(&mut self, instance: u32, port: u32, pin: u32, enable: bool) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .io_power_events
            .push((instance, port, pin, enable));
        Ok(())
    }
}

impl PowerServices for Mock {
    fn register_power_client(&mut self, _module: Module) -> Result<PowerClientId> {
        let mut state = self.state.lock().unwrap();
        state.clients_registered += 1;
        Ok(PowerClientId(state.clients_registered))
    }

    fn unregister_power_client(&mut self, _client: PowerClientId) {
        self.state.lock().unwrap().clients_unregistered += 1;
    }

    fn set_module_voltage(
        &mut self,
        _client: PowerClientId,
        _module: Module,
        request: VoltageRequest,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_voltage && request != VoltageRequest::Off {
            return Err(Error::Power("voltage request rejected".into()));
        }
        state.voltage_requests.push(request);
        Ok(())
    }

    fn set_module_clock(
        &mut self,
        _client: PowerClientId,
        _module: Module,
        enable: bool,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if enable && state.fail_clock_enable {
            return Err(Error::Power("clock enable rejected".into()));
        }
        state.clock_calls.push(enable);
        Ok(())
    }

    fn set_clock_routing(&mut self, _module: Module, _routing: ClockRouting) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_routing {
            return Err(Error::Power("clock routing rejected".into()));
        }
        state.routing_calls += 1;
        Ok(())
    }

    fn rail_capabilities(&self, _rail: u32) -> Result<RailCapabilities> {
        let mut state = self.state.lock().unwrap();
        state.rail_queries += 1;
        Ok(RailCapabilities {
            requested_millivolts: state.rail_millivolts,
        })
    }

    fn set_rail_voltage(&mut self, rail: u32, millivolts: Option<u32>) -> Result<u32> {
        let mut state = self.state.lock().unwrap();
        if millivolts.is_some() && state.fail_rail_enable {
            return Err(Error::Power("rail enable rejected".into()));
        }
        state.rail_sets.push((rail, millivolts));
        Ok(state.rail_settle_us)
    }
}

impl BoardInfo for Mock {
    fn find_connectivity(&self, _guid: u64) -> Option<RailConnectivity> {
        let mut state = self.state.lock().unwrap();
        state.board_lookups += 1;
        if !state.board_present {
            return None;
        }
        Some(RailConnectivity {
            addresses: vec![RailAddress {
                interface: BusInterface::VoltageRail,
                address: RAIL_ADDRESS,
            }],
        })
    }
}

impl ExternalGpio for Mock {
    fn config_pin(&mut self, port: u32, pin: u32, mode: PinMode) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .external_configs
            .push((port, pin, mode));
        Ok(())
    }

    fn read_pin(&mut self, _port: u32, _pin: u32) -> Result<PinState> {
        let state = self.state.lock().unwrap();
        Ok(if state.external_level {
            PinState::High
        } else {
            PinState::Low
        })
    }

    fn write_pin(&mut self, port: u32, pin: u32, state: PinState) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .external_writes
            .push((port, pin, state));
        Ok(())
    }
}

pub fn default_caps() -> Capabilities {
    Capabilities {
        instances: 4,
        ports_per_instance: 4,
        pins_per_port: 8,
        irq_base: 64,
        edge_interrupts: true,
    }
}

/// Opens a subsystem over a fresh mock, returning the handle and the
/// shared state for assertions.
pub fn open(caps: Capabilities) -> (Gpio, Arc<Mutex<MockState>>) {
    let mock = Mock::new(caps);
    let state = mock.state.clone();
    let gpio = Gpio::open(mock.platform()).expect("open failed");
    (gpio, state)
}

/// Opens over a mock whose state was tweaked first (failure injection).
pub fn open_with(caps: Capabilities, setup: impl FnOnce(&mut MockState)) -> (Gpio, Arc<Mutex<MockState>>) {
    let mock = Mock::new(caps);
    setup(&mut mock.state.lock().unwrap());
    let state = mock.state.clone();
    let gpio = Gpio::open(mock.platform()).expect("open failed");
    (gpio, state)
}
