//! Road segments between two consecutive route points

use crate::bus::{Bus, Consumption, EngineTrait};
use crate::imports::*;
use crate::route::coord::Coord;
use crate::route::emissions::{Emissions, Pollutants};
use crate::route::resistance::{Resistance, ResistanceCalculator};

pub mod real;
pub mod simulated;

pub use real::RealKinematics;
pub use simulated::{SimulatedKinematics, SolverParams};

/// Speeds and times at both ends of a section, joined by a constant acceleration
pub trait KinematicProfile {
    fn start_speed(&self) -> si::Velocity;
    fn end_speed(&self) -> si::Velocity;
    fn start_time(&self) -> si::Time;
    fn end_time(&self) -> si::Time;

    fn duration(&self) -> si::Time {
        self.end_time() - self.start_time()
    }

    fn avg_speed(&self) -> si::Velocity {
        (self.start_speed() + self.end_speed()) / 2.0
    }

    /// Change in speed over duration; zero when the duration is not positive
    fn accel(&self) -> si::Acceleration {
        let dt = self.duration();
        if dt > si::Time::ZERO {
            (self.end_speed() - self.start_speed()) / dt
        } else {
            si::Acceleration::ZERO
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Observed or solved kinematics of a section
pub enum Kinematics {
    Real(RealKinematics),
    Simulated(SimulatedKinematics),
}

impl KinematicProfile for Kinematics {
    fn start_speed(&self) -> si::Velocity {
        match self {
            Self::Real(k) => k.start_speed(),
            Self::Simulated(k) => k.start_speed(),
        }
    }
    fn end_speed(&self) -> si::Velocity {
        match self {
            Self::Real(k) => k.end_speed(),
            Self::Simulated(k) => k.end_speed(),
        }
    }
    fn start_time(&self) -> si::Time {
        match self {
            Self::Real(k) => k.start_time(),
            Self::Simulated(k) => k.start_time(),
        }
    }
    fn end_time(&self) -> si::Time {
        match self {
            Self::Real(k) => k.end_time(),
            Self::Simulated(k) => k.end_time(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// Forces, work and power derived once from geometry and kinematics
pub struct SectionLoads {
    pub avg_speed: si::Velocity,
    pub accel: si::Acceleration,
    pub res: Resistance,
    /// work against the total resistance along the section
    pub work: si::Energy,
    /// mean power; `None` for sections without a positive duration
    pub pwr: Option<si::Power>,
}

impl SectionLoads {
    pub fn new<K: KinematicProfile>(
        calc: &ResistanceCalculator,
        kinematics: &K,
        length: si::Length,
        grade: si::Angle,
    ) -> Self {
        let avg_speed = kinematics.avg_speed();
        let accel = kinematics.accel();
        let res = calc.calc_res(avg_speed, accel, grade);
        let work: si::Energy = res.total() * length * grade.cos();
        let dt = kinematics.duration();
        Self {
            avg_speed,
            accel,
            res,
            work,
            pwr: (dt > si::Time::ZERO).then(|| work / dt),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// What driving one section cost the bus
pub struct SectionOutcome {
    pub consumption: Consumption,
    pub emission_rates: Pollutants<si::MassRate>,
    pub emissions: Pollutants<si::Mass>,
    pub duration: si::Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub start: Coord,
    pub end: Coord,
    /// geodesic length
    pub length: si::Length,
    pub grade: si::Angle,
    pub kinematics: Kinematics,
    pub loads: SectionLoads,
}

impl Section {
    pub fn new(
        start: Coord,
        end: Coord,
        length: si::Length,
        kinematics: Kinematics,
        calc: &ResistanceCalculator,
    ) -> Self {
        let grade = start.grade_to(&end, length);
        Self {
            start,
            end,
            length,
            grade,
            kinematics,
            loads: SectionLoads::new(calc, &kinematics, length, grade),
        }
    }

    /// Recomputes [Self::loads], e.g. after the bus mass changed
    pub fn refresh_loads(&mut self, calc: &ResistanceCalculator) {
        self.loads = SectionLoads::new(calc, &self.kinematics, self.length, self.grade);
    }

    /// Lowers the end speed of a simulated section to the start speed the
    /// next section settled on, returning this section's start speed if it
    /// had to come down too.  Real sections are left as observed.
    pub(crate) fn brake_into(
        &mut self,
        next_start_speed: si::Velocity,
        calc: &ResistanceCalculator,
        params: &SolverParams,
    ) -> Option<si::Velocity> {
        match &mut self.kinematics {
            Kinematics::Simulated(kin) if kin.end_speed() > next_start_speed => {
                kin.brake_into(next_start_speed, self.length, self.grade, calc, params)
            }
            _ => None,
        }
    }

    /// Moves a simulated section to start at `start_time`, re-deriving its
    /// duration from its speeds, and refreshes [Self::loads]
    pub(crate) fn retime(
        &mut self,
        start_time: si::Time,
        calc: &ResistanceCalculator,
        params: &SolverParams,
    ) {
        if let Kinematics::Simulated(kin) = &mut self.kinematics {
            kin.retime(start_time, self.length, params);
        }
        self.refresh_loads(calc);
    }

    /// Drives the section, drawing energy from the bus engine
    pub fn traverse(&self, bus: &mut Bus, emissions: &Emissions) -> anyhow::Result<SectionOutcome> {
        let Some(pwr) = self.loads.pwr else {
            log::debug!(
                "skipping section without positive duration starting at {:?}",
                self.start
            );
            return Ok(SectionOutcome::default());
        };
        let dt = self.kinematics.duration();
        let consumption = bus
            .engine
            .solve_consumption(pwr, dt, self.length)
            .with_context(|| format_dbg!())?;
        let emission_rates = emissions.calc_rates(pwr, consumption.fuel_rate);
        Ok(SectionOutcome {
            consumption,
            emission_rates,
            emissions: emission_rates.map(|rate| rate * dt),
            duration: dt,
        })
    }
}
