//! Battery voltage sampling and charger status.

use embedded_hal::digital::InputPin;
use krang_core::battery::{BatteryChargeState, ChargeMonitor};
use log::warn;

pub use krang_core::battery::VoltageDivider;

/// ADC reading plus charger status pin, filtered by a [`ChargeMonitor`].
///
/// `CHG` is the charger's status output, pulled low while charging.
#[derive(Debug)]
pub struct BatterySensor<CHG> {
    charge_detect: CHG,
    monitor: ChargeMonitor,
    pin_fault_logged: bool,
}

impl<CHG> BatterySensor<CHG>
where
    CHG: InputPin,
{
    pub fn new(charge_detect: CHG, divider: VoltageDivider) -> Self {
        Self {
            charge_detect,
            monitor: ChargeMonitor::new(divider),
            pin_fault_logged: false,
        }
    }

    fn is_charging(&mut self) -> bool {
        match self.charge_detect.is_low() {
            Ok(charging) => charging,
            Err(_) => {
                if !self.pin_fault_logged {
                    warn!("battery: charge-detect read failed");
                    self.pin_fault_logged = true;
                }
                false
            }
        }
    }

    /// Feeds one ADC reading taken at the divider tap; see
    /// [`ChargeMonitor::update`].
    pub fn update(&mut self, pin_millivolts: u16) -> Option<BatteryChargeState> {
        let charging = self.is_charging();
        self.monitor.update(pin_millivolts, charging)
    }
}
