//! Power-Rail Sequencer: board-discovered voltage-rail enable/disable with
//! hardware-mandated settle waits.

use crate::consts::VI_RAIL_GUID;
use crate::error::{Error, Result};
use crate::platform::{BoardInfo, BusInterface, PowerServices, RailConnectivity};
use log::{debug, trace};
use std::thread;
use std::time::Duration;

/// Sequences the camera-VI pad voltage rail. Connectivity is discovered
/// once per context and cached; the rail list is walked in descriptor
/// order on both enable and disable.
#[derive(Debug, Default)]
pub(crate) struct RailSequencer {
    connectivity: Option<RailConnectivity>,
}

impl RailSequencer {
    /// Lazily resolves the VI rail connectivity descriptor. Idempotent.
    fn discover(&mut self, board: &dyn BoardInfo) -> Result<&RailConnectivity> {
        if self.connectivity.is_none() {
            let conn = board
                .find_connectivity(VI_RAIL_GUID)
                .ok_or(Error::ModuleNotPresent)?;
            debug!(
                "discovered VI rail connectivity: {} address entries",
                conn.addresses.len()
            );
            self.connectivity = Some(conn);
        }
        // Populated just above on the None path.
        self.connectivity.as_ref().ok_or(Error::ModuleNotPresent)
    }

    /// Enables or disables every voltage-rail entry of the descriptor.
    ///
    /// On enable, each rail is set to the voltage its capability descriptor
    /// requests; on disable, to off. Any settle time the power manager
    /// reports is waited out in full before the next entry: the wait is a
    /// hardware timing requirement, not a tunable.
    pub fn configure(
        &mut self,
        power: &mut dyn PowerServices,
        board: &dyn BoardInfo,
        enable: bool,
    ) -> Result<()> {
        self.discover(board)?;
        let Some(conn) = self.connectivity.as_ref() else {
            return Err(Error::ModuleNotPresent);
        };
        for entry in &conn.addresses {
            if entry.interface != BusInterface::VoltageRail {
                trace!("skipping non-rail connectivity entry {entry:?}");
                continue;
            }
            let settle_us = if enable {
                let caps = power.rail_capabilities(entry.address)?;
                debug!(
                    "enabling rail {} at {} mV",
                    entry.address, caps.requested_millivolts
                );
                power.set_rail_voltage(entry.address, Some(caps.requested_millivolts))?
            } else {
                debug!("disabling rail {}", entry.address);
                power.set_rail_voltage(entry.address, None)?
            };
            if settle_us > 0 {
                trace!("rail {} settle wait: {} us", entry.address, settle_us);
                thread::sleep(Duration::from_micros(u64::from(settle_us)));
            }
        }
        Ok(())
    }
}
