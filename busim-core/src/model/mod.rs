//! Multi-day simulation of one bus on one route

use crate::bus::Bus;
use crate::imports::*;
use crate::route::{
    ChargingPoints, Emissions, EuroStandard, Pollutants, Route, RoutePoints, SolverParams,
    Traversal,
};

pub mod cost;
pub mod report;
pub mod sweep;

pub use cost::CostCalculator;
pub use report::{write_section_report, write_summary_csv, SectionRecord, SectionRecordHistoryVec};
pub use sweep::run_models;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Operating parameters of a simulation run
pub struct ModelConfig {
    pub name: String,
    /// charger used whenever the battery runs low
    pub charging_point_id: u32,
    /// SOC below which the bus detours to charge before a trip
    pub min_battery_charge: si::Ratio,
    /// SOC the bus charges up to
    pub max_battery_charge: si::Ratio,
    /// route traversals per simulated day
    pub trips_per_day: u32,
    pub euro_standard: EuroStandard,
    pub solver: SolverParams,
    pub cost: CostCalculator,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "bus".into(),
            charging_point_id: 1,
            min_battery_charge: 20.0 * uc::PERCENT,
            max_battery_charge: 80.0 * uc::PERCENT,
            trips_per_day: 16,
            euro_standard: Default::default(),
            solver: Default::default(),
            cost: Default::default(),
        }
    }
}

impl Init for ModelConfig {
    fn init(&mut self) -> Result<(), Error> {
        check_config(
            self.min_battery_charge >= si::Ratio::ZERO
                && self.min_battery_charge < self.max_battery_charge
                && self.max_battery_charge <= uc::R,
            || {
                format!(
                    "{}\ncharge thresholds must satisfy 0 <= min < max <= 1",
                    format_dbg!((self.min_battery_charge, self.max_battery_charge))
                )
            },
        )?;
        check_config(self.trips_per_day > 0, || {
            format!("{}\nmust be positive", format_dbg!(self.trips_per_day))
        })?;
        self.solver.init()?;
        self.cost.init()?;
        Ok(())
    }
}
impl SerdeAPI for ModelConfig {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Totals over a whole run
pub struct RunSummary {
    pub name: String,
    pub electric: bool,
    /// route traversals simulated
    pub n_iters: u32,
    /// electrical energy drawn from the battery
    pub energy: si::Energy,
    pub fuel: si::Volume,
    pub emissions: Pollutants<si::Mass>,
    /// cycle life used on the road, summed over sections; see `soh_final` for fade
    pub battery_degradation: si::Ratio,
    pub soh_final: Option<si::Ratio>,
    /// euros, electric buses only
    pub bus_cost: Option<f64>,
    /// euros, electric buses only
    pub consumption_cost: Option<f64>,
    /// time in service, net of charging detours
    pub availability_time: si::Time,
    /// time spent charging and driving to and from the charger
    pub unavailability_time: si::Time,
    /// buses needed to keep the route served
    pub n_buses: u32,
    pub n_charges: u32,
    pub time_below_min_soc: si::Time,
}

impl Init for RunSummary {}
impl SerdeAPI for RunSummary {}

impl RunSummary {
    fn new(name: &str, electric: bool, n_iters: u32) -> Self {
        Self {
            name: name.into(),
            electric,
            n_iters,
            n_buses: 1,
            ..Default::default()
        }
    }

    fn add(&mut self, traversal: &Traversal) {
        self.energy += traversal.energy;
        self.fuel += traversal.fuel;
        self.emissions += traversal.emissions;
        self.battery_degradation += traversal.battery_degradation;
    }

    pub fn to_csv_file<P: AsRef<Path>>(&self, filepath: P) -> anyhow::Result<()> {
        write_summary_csv(std::slice::from_ref(self), filepath)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A bus, the route it serves, and how it is operated
pub struct Model {
    pub config: ModelConfig,
    pub bus: Bus,
    pub route: Route,
}

impl Init for Model {
    fn init(&mut self) -> Result<(), Error> {
        self.config.init()?;
        self.bus.init()?;
        self.route.init()?;
        check_config(self.route.emissions.electric == self.bus.is_electric(), || {
            "route emissions and bus powertrain disagree on being electric".into()
        })?;
        if self.bus.is_electric() {
            check_config(
                self.route
                    .charging_points
                    .get(self.config.charging_point_id)
                    .is_ok(),
                || format!("unknown charging point id {}", self.config.charging_point_id),
            )?;
        }
        self.route.refresh_loads(&self.bus);
        Ok(())
    }
}
impl SerdeAPI for Model {}

impl Model {
    pub fn new(config: ModelConfig, bus: Bus, route: Route) -> anyhow::Result<Self> {
        let mut model = Self { config, bus, route };
        model.init().with_context(|| format_dbg!())?;
        Ok(model)
    }

    /// Builds the route from `points` for `bus` and assembles the model
    pub fn from_points(
        config: ModelConfig,
        bus: Bus,
        points: &RoutePoints,
        charging_points: ChargingPoints,
    ) -> anyhow::Result<Self> {
        let emissions = Emissions::new(config.euro_standard, bus.is_electric());
        let route = Route::new(points, &bus, emissions, &config.solver)
            .with_context(|| format_dbg!())?
            .with_charging_points(charging_points);
        Self::new(config, bus, route)
    }

    pub fn n_iters(&self, n_days: u32) -> u32 {
        n_days * self.config.trips_per_day
    }

    /// Battery SOC, `None` for combustion buses
    pub fn soc(&self) -> Option<si::Ratio> {
        self.bus.battery().map(|b| b.soc())
    }

    /// Simulates `n_days` of service
    pub fn run(&mut self, n_days: u32) -> anyhow::Result<RunSummary> {
        let n_iters = self.n_iters(n_days);
        let summary = if self.bus.is_electric() {
            self.run_electric(n_iters)
        } else {
            self.run_combustion(n_iters)
        }
        .with_context(|| format!("model {:?}", self.config.name))?;
        log::info!(
            "{}: {} trips, {:.1} kWh, {:.1} L, {} charges",
            summary.name,
            summary.n_iters,
            summary.energy.get::<si::kilowatt_hour>(),
            summary.fuel.get::<si::liter>(),
            summary.n_charges
        );
        Ok(summary)
    }

    fn run_electric(&mut self, n_iters: u32) -> anyhow::Result<RunSummary> {
        let cp = *self
            .route
            .charging_points
            .get(self.config.charging_point_id)
            .with_context(|| format_dbg!())?;
        let route_length = self.route.length();
        ensure!(
            route_length > si::Length::ZERO,
            "{}\nroute has no length",
            format_dbg!(route_length)
        );
        let detour_factor = ((route_length + cp.detour_distance) / route_length).get::<si::ratio>();
        let route_duration = self.route.duration();
        let mut summary = RunSummary::new(&self.config.name, true, n_iters);

        for iter in 0..n_iters {
            let mut factor = 1.0;
            if self.soc().is_some_and(|soc| soc < self.config.min_battery_charge) {
                let battery = self
                    .bus
                    .battery_mut()
                    .with_context(|| format_dbg!())?;
                let charging_time = battery
                    .charge_in_charging_point(cp.power, self.config.max_battery_charge)
                    .with_context(|| format_dbg!())?;
                summary.unavailability_time += cp.unavailability(charging_time);
                summary.n_buses = 2;
                summary.n_charges += 1;
                factor = detour_factor;
                log::info!(
                    "trip {iter}: charged for {:.1} min at charging point {}",
                    charging_time.get::<si::minute>(),
                    cp.id
                );
            }
            self.update_passengers();
            let traversal = self
                .route
                .traverse(&mut self.bus)
                .with_context(|| format!("trip {iter}"))?;
            summary.add(&traversal.scaled(factor));
            summary.availability_time += route_duration;
        }
        summary.availability_time -= summary.unavailability_time;

        let battery = self.bus.battery().with_context(|| format_dbg!())?;
        summary.time_below_min_soc = battery.state.time_below_min_soc;
        summary.soh_final = Some(battery.state.soh);
        let (bus_cost, consumption_cost) = self
            .config
            .cost
            .calculate_costs(battery.energy_capacity, summary.energy);
        summary.bus_cost = Some(bus_cost);
        summary.consumption_cost = Some(consumption_cost);
        Ok(summary)
    }

    fn run_combustion(&mut self, n_iters: u32) -> anyhow::Result<RunSummary> {
        let route_duration = self.route.duration();
        let mut summary = RunSummary::new(&self.config.name, false, n_iters);
        for iter in 0..n_iters {
            self.update_passengers();
            let traversal = self
                .route
                .traverse(&mut self.bus)
                .with_context(|| format!("trip {iter}"))?;
            summary.add(&traversal);
            summary.availability_time += route_duration;
        }
        Ok(summary)
    }

    /// Draws new passengers and refreshes section loads if the mass changed
    fn update_passengers(&mut self) {
        let n_prev = self.bus.n_passengers;
        if self.bus.update_passengers() != n_prev {
            self.route.refresh_loads(&self.bus);
        }
    }

    /// One traversal of the route on a copy of the bus, recorded per section.
    /// The model itself is left untouched.
    pub fn section_report(&self) -> anyhow::Result<SectionRecordHistoryVec> {
        let mut bus = self.bus.clone();
        let mut records = SectionRecordHistoryVec::new();
        self.route
            .traverse_with(&mut bus, |section, outcome| {
                records.push(SectionRecord::new(section, outcome))
            })
            .with_context(|| format_dbg!())?;
        Ok(records)
    }
}
