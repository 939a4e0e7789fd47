//! Battery snapshot and voltage-to-charge conversion.

use log::debug;

/// Charge level reported by the power monitor.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BatteryChargeState {
    pub charge_percent: u8,
    pub is_charging: bool,
}

impl BatteryChargeState {
    pub const fn new(charge_percent: u8, is_charging: bool) -> Self {
        Self {
            charge_percent: if charge_percent > 100 {
                100
            } else {
                charge_percent
            },
            is_charging,
        }
    }

    /// Percentage the gauge should show; a charging cell always reads full.
    pub const fn display_percent(&self) -> u8 {
        if self.is_charging {
            100
        } else {
            self.charge_percent
        }
    }
}

/// Approximate Li-ion state of charge for a resting cell voltage.
pub fn percent_from_millivolts(millivolts: u32) -> u8 {
    match millivolts {
        0..=3449 => 0,
        3450..=3699 => ((millivolts - 3450) / 5) as u8,
        3700..=4199 => (50 + (millivolts - 3700) / 10) as u8,
        _ => 100,
    }
}

/// Resistor divider between the cell and the ADC pin.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VoltageDivider {
    pub numerator: u32,
    pub denominator: u32,
}

impl VoltageDivider {
    /// Two equal resistors.
    pub const HALF: Self = Self {
        numerator: 2,
        denominator: 1,
    };

    pub const fn cell_millivolts(self, pin_millivolts: u32) -> u32 {
        if self.denominator == 0 {
            return 0;
        }
        pin_millivolts * self.numerator / self.denominator
    }
}

/// Smooths cell-voltage samples and reports only changes in the displayed
/// state.
#[derive(Clone, Copy, Debug)]
pub struct ChargeMonitor {
    divider: VoltageDivider,
    filtered_mv: Option<u32>,
    last: Option<BatteryChargeState>,
}

impl ChargeMonitor {
    pub const fn new(divider: VoltageDivider) -> Self {
        Self {
            divider,
            filtered_mv: None,
            last: None,
        }
    }

    /// Feeds one reading taken at the divider tap. Returns the new state when
    /// it differs from the last reported one.
    pub fn update(&mut self, pin_millivolts: u16, is_charging: bool) -> Option<BatteryChargeState> {
        let cell_mv = self.divider.cell_millivolts(pin_millivolts as u32);
        let filtered = match self.filtered_mv {
            Some(previous) => (previous * 3 + cell_mv) / 4,
            None => cell_mv,
        };
        self.filtered_mv = Some(filtered);

        let state = BatteryChargeState::new(percent_from_millivolts(filtered), is_charging);
        if self.last == Some(state) {
            return None;
        }

        debug!(
            "battery: {} mV -> {}% charging={}",
            filtered, state.charge_percent, state.is_charging
        );
        self.last = Some(state);
        Some(state)
    }
}
