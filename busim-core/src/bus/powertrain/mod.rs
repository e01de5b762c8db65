//! Engines converting traction power into battery charge or fuel

use crate::imports::*;

pub mod battery;
pub mod combustion_engine;
pub mod electric_engine;
pub mod fuel;

pub use battery::{Battery, BatteryState, BatteryStateHistoryVec, DegradationParams};
pub use combustion_engine::CombustionEngine;
pub use electric_engine::ElectricEngine;
pub use fuel::Fuel;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Energy carriers consumed while delivering power over one section
pub struct Consumption {
    /// electrical energy drawn from the battery; negative when regenerating
    pub energy: si::Energy,
    /// charge drawn from the battery; negative when regenerating
    pub charge: si::ElectricCharge,
    /// mean fuel flow
    pub fuel_rate: si::VolumeRate,
    /// fuel burned per kilometer, in L/km; zero for zero distance
    pub fuel_l_per_km: f64,
    /// fuel burned
    pub fuel: si::Volume,
    /// share of the battery cycle life used
    pub battery_degradation: si::Ratio,
}

impl Consumption {
    /// Scales every extensive quantity by `factor`, leaving rates untouched
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            energy: self.energy * factor,
            charge: self.charge * factor,
            fuel: self.fuel * factor,
            battery_degradation: self.battery_degradation * factor,
            ..*self
        }
    }
}

pub trait EngineTrait {
    /// rated power; larger requests are capped
    fn pwr_out_max(&self) -> si::Power;
    fn eta(&self) -> si::Ratio;

    /// Requested power capped at [Self::pwr_out_max] and scaled by [Self::eta]
    fn adjust_pwr(&self, pwr: si::Power) -> si::Power {
        pwr.min(self.pwr_out_max()) * self.eta()
    }

    /// Solves what the engine consumes to deliver `pwr` for `dt` over `dist`,
    /// updating its energy store
    fn solve_consumption(
        &mut self,
        pwr: si::Power,
        dt: si::Time,
        dist: si::Length,
    ) -> anyhow::Result<Consumption>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Wrapper for the engine variants
pub enum Engine {
    /// battery-electric drive
    Electric(ElectricEngine),
    /// internal combustion drive
    Combustion(CombustionEngine),
}

impl Init for Engine {
    fn init(&mut self) -> Result<(), Error> {
        match self {
            Self::Electric(e) => e.init(),
            Self::Combustion(c) => c.init(),
        }
    }
}
impl SerdeAPI for Engine {}

impl Engine {
    pub fn is_electric(&self) -> bool {
        matches!(self, Self::Electric(_))
    }

    pub fn battery(&self) -> Option<&Battery> {
        match self {
            Self::Electric(e) => Some(&e.battery),
            Self::Combustion(_) => None,
        }
    }

    pub fn battery_mut(&mut self) -> Option<&mut Battery> {
        match self {
            Self::Electric(e) => Some(&mut e.battery),
            Self::Combustion(_) => None,
        }
    }

    /// Mass carried by the engine on top of the chassis
    pub fn mass(&self) -> si::Mass {
        self.battery()
            .and_then(Battery::mass)
            .unwrap_or(si::Mass::ZERO)
    }
}

impl EngineTrait for Engine {
    fn pwr_out_max(&self) -> si::Power {
        match self {
            Self::Electric(e) => e.pwr_out_max(),
            Self::Combustion(c) => c.pwr_out_max(),
        }
    }

    fn eta(&self) -> si::Ratio {
        match self {
            Self::Electric(e) => e.eta(),
            Self::Combustion(c) => c.eta(),
        }
    }

    fn solve_consumption(
        &mut self,
        pwr: si::Power,
        dt: si::Time,
        dist: si::Length,
    ) -> anyhow::Result<Consumption> {
        match self {
            Self::Electric(e) => e.solve_consumption(pwr, dt, dist),
            Self::Combustion(c) => c.solve_consumption(pwr, dt, dist),
        }
    }
}
