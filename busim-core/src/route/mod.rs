//! Routes built from recorded or speed-limit point sequences

use crate::bus::Bus;
use crate::imports::*;

pub mod charging_point;
pub mod coord;
pub mod emissions;
pub mod input;
pub mod resistance;
pub mod section;

pub use charging_point::{ChargingPoint, ChargingPoints};
pub use coord::Coord;
pub use emissions::{Emissions, EuroStandard, Pollutants};
pub use input::{read_real_points, read_sim_points, RealPoint, SimPoint};
pub use resistance::{Resistance, ResistanceCalculator};
pub use section::*;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Raw points a route is built from
pub enum RoutePoints {
    /// recorded telemetry
    Real(Vec<RealPoint>),
    /// speed limits to synthesize a profile from
    Simulated(Vec<SimPoint>),
}

impl RoutePoints {
    pub fn len(&self) -> usize {
        match self {
            Self::Real(pts) => pts.len(),
            Self::Simulated(pts) => pts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// Totals over one traversal of a route
pub struct Traversal {
    /// electrical energy drawn from the battery
    pub energy: si::Energy,
    pub fuel: si::Volume,
    pub emissions: Pollutants<si::Mass>,
    /// battery cycle life used, summed over sections
    pub battery_degradation: si::Ratio,
    pub duration: si::Time,
}

impl Traversal {
    fn add(&mut self, outcome: &SectionOutcome) {
        self.energy += outcome.consumption.energy;
        self.fuel += outcome.consumption.fuel;
        self.emissions += outcome.emissions;
        self.battery_degradation += outcome.consumption.battery_degradation;
        self.duration += outcome.duration;
    }

    /// Scales consumption, emissions and degradation by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            energy: self.energy * factor,
            fuel: self.fuel * factor,
            emissions: self.emissions.map(|m| m * factor),
            battery_degradation: self.battery_degradation * factor,
            duration: self.duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Ordered sections driven by one bus, plus the chargers it can detour to
pub struct Route {
    pub sections: Vec<Section>,
    pub emissions: Emissions,
    #[serde(default)]
    pub charging_points: ChargingPoints,
}

impl Init for Route {
    fn init(&mut self) -> Result<(), Error> {
        self.charging_points.init()
    }
}
impl SerdeAPI for Route {}

impl Route {
    /// Builds sections between consecutive points.  Simulated sections are
    /// solved strictly in order since each starts from the state the
    /// previous one ends in.
    pub fn new(
        points: &RoutePoints,
        bus: &Bus,
        emissions: Emissions,
        params: &SolverParams,
    ) -> anyhow::Result<Self> {
        ensure!(
            points.len() >= 2,
            "{}\na route needs at least two points",
            format_dbg!(points.len())
        );
        let calc = ResistanceCalculator::from_bus(bus);
        let sections = match points {
            RoutePoints::Real(pts) => real_sections(pts, &calc),
            RoutePoints::Simulated(pts) => simulated_sections(pts, &calc, params),
        };
        log::debug!(
            "built route with {} sections, {:.2} km",
            sections.len(),
            sections
                .iter()
                .map(|s| s.length.get::<si::kilometer>())
                .sum::<f64>()
        );
        Ok(Self {
            sections,
            emissions,
            charging_points: Default::default(),
        })
    }

    pub fn with_charging_points(mut self, charging_points: ChargingPoints) -> Self {
        self.charging_points = charging_points;
        self
    }

    pub fn length(&self) -> si::Length {
        self.sections.iter().map(|s| s.length).sum()
    }

    pub fn duration(&self) -> si::Time {
        self.sections.iter().map(|s| s.kinematics.duration()).sum()
    }

    /// Recomputes section loads for the current bus mass
    pub fn refresh_loads(&mut self, bus: &Bus) {
        let calc = ResistanceCalculator::from_bus(bus);
        for section in self.sections.iter_mut() {
            section.refresh_loads(&calc);
        }
    }

    /// Drives every section in order
    pub fn traverse(&self, bus: &mut Bus) -> anyhow::Result<Traversal> {
        self.traverse_with(bus, |_, _| {})
    }

    /// Drives every section in order, handing each outcome to `inspect`
    pub fn traverse_with<F: FnMut(&Section, &SectionOutcome)>(
        &self,
        bus: &mut Bus,
        mut inspect: F,
    ) -> anyhow::Result<Traversal> {
        let mut traversal = Traversal::default();
        for (i, section) in self.sections.iter().enumerate() {
            let outcome = section
                .traverse(bus, &self.emissions)
                .with_context(|| format!("section {i}"))?;
            inspect(section, &outcome);
            traversal.add(&outcome);
        }
        Ok(traversal)
    }
}

fn real_sections(points: &[RealPoint], calc: &ResistanceCalculator) -> Vec<Section> {
    points
        .windows(2)
        .map(|w| {
            Section::new(
                w[0].coord,
                w[1].coord,
                w[0].coord.distance_to(&w[1].coord),
                Kinematics::Real(RealKinematics::new(&w[0], &w[1])),
                calc,
            )
        })
        .collect()
}

fn simulated_sections(
    points: &[SimPoint],
    calc: &ResistanceCalculator,
    params: &SolverParams,
) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::with_capacity(points.len().saturating_sub(1));
    let mut speed = si::Velocity::ZERO;
    for w in points.windows(2) {
        let (start, end) = (w[0].coord, w[1].coord);
        let length = start.distance_to(&end);
        let grade = start.grade_to(&end, length);
        let kin = SimulatedKinematics::solve(
            length,
            grade,
            w[1].speed_limit,
            speed,
            si::Time::ZERO,
            calc,
            params,
        );
        // braking that cannot fit in this section starts in earlier ones
        let mut target = kin.start_speed();
        for prev in sections.iter_mut().rev() {
            match prev.brake_into(target, calc, params) {
                Some(lowered) => target = lowered,
                None => break,
            }
        }
        speed = kin.end_speed();
        sections.push(Section::new(
            start,
            end,
            length,
            Kinematics::Simulated(kin),
            calc,
        ));
    }
    // speeds are final, so sections can be laid end to end in time
    let mut time = si::Time::ZERO;
    for section in sections.iter_mut() {
        section.retime(time, calc, params);
        time = section.kinematics.end_time();
    }
    sections
}
