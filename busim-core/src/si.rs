//! Import uom si system and add unit constants
//! Zero values should be created using standard uom syntax ($Quantity::ZERO) after adding "use crate::imports::*"
//! Non-zero values should be created using standard uom syntax ($Quantity::new::<$unit>($value)) or multiplication syntax ($value * $UNIT_CONSTANT)

use uom::si;

pub use si::acceleration::meter_per_second_squared;
pub use si::angle::{degree, radian};
pub use si::area::square_meter;
pub use si::electric_charge::ampere_hour;
pub use si::electric_current::ampere;
pub use si::electric_potential::volt;
pub use si::energy::{joule, kilowatt_hour, watt_hour};
pub use si::f64::{
    Acceleration, Angle, Area, AvailableEnergy as SpecificEnergy, ElectricCharge,
    ElectricCurrent, ElectricPotential, Energy, Force, Length, Mass, MassDensity, MassRate,
    Power, Pressure, Ratio, Time, Velocity, Volume, VolumeRate,
};
pub use si::force::newton;
pub use si::length::{kilometer, meter};
pub use si::mass::{gram, kilogram};
pub use si::mass_rate::gram_per_second;
pub use si::power::{kilowatt, watt};
pub use si::ratio::{percent, ratio};
pub use si::time::{hour, minute, second};
pub use si::velocity::{kilometer_per_hour, meter_per_second};
pub use si::volume::liter;

/// Energy released per unit volume of fuel.  This has the same dimensions as
/// pressure, which is how `uom` represents it.
pub type EnergyDensity = Pressure;
