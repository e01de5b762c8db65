//! Unit constants for building quantities by multiplication,
//! e.g. `10.0 * uc::MPS` or `uc::KWH * 392.0`.

use crate::si;
use std::marker::PhantomData;

macro_rules! unit_const {
    ($($name:ident: $T:ident = $value:expr;)+) => {
        $(
            pub const $name: si::$T = si::$T {
                dimension: PhantomData,
                units: PhantomData,
                value: $value,
            };
        )+
    };
}

unit_const!(
    R: Ratio = 1.0;
    PERCENT: Ratio = 0.01;

    M: Length = 1.0;
    KM: Length = 1.0e3;
    M2: Area = 1.0;
    L: Volume = 1.0e-3;

    S: Time = 1.0;
    MIN: Time = 60.0;
    HR: Time = 3600.0;

    KG: Mass = 1.0;
    GRAM: Mass = 1.0e-3;
    KGPM3: MassDensity = 1.0;
    KGPL: MassDensity = 1.0e3;

    MPS: Velocity = 1.0;
    KPH: Velocity = 1.0 / 3.6;
    MPS2: Acceleration = 1.0;

    N: Force = 1.0;
    J: Energy = 1.0;
    WH: Energy = 3.6e3;
    KWH: Energy = 3.6e6;
    W: Power = 1.0;
    KW: Power = 1.0e3;

    V: ElectricPotential = 1.0;
    A: ElectricCurrent = 1.0;
    AH: ElectricCharge = 3.6e3;

    RAD: Angle = 1.0;
    DEG: Angle = std::f64::consts::PI / 180.0;

    GPS: MassRate = 1.0e-3;
    LPH: VolumeRate = 1.0e-3 / 3600.0;

    ACC_GRAV: Acceleration = 9.81;
);

/// Air density at sea level and 15 °C
pub fn rho_air() -> si::MassDensity {
    1.225 * KGPM3
}
